use macroquad::prelude::Color;

const A4_MIDI: i32 = 69;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PitchClass {
    C,
    Cs,
    D,
    Ds,
    E,
    F,
    Fs,
    G,
    Gs,
    A,
    As,
    B,
}

impl PitchClass {
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::Cs,
        PitchClass::D,
        PitchClass::Ds,
        PitchClass::E,
        PitchClass::F,
        PitchClass::Fs,
        PitchClass::G,
        PitchClass::Gs,
        PitchClass::A,
        PitchClass::As,
        PitchClass::B,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn letter(self) -> char {
        match self {
            PitchClass::C | PitchClass::Cs => 'C',
            PitchClass::D | PitchClass::Ds => 'D',
            PitchClass::E => 'E',
            PitchClass::F | PitchClass::Fs => 'F',
            PitchClass::G | PitchClass::Gs => 'G',
            PitchClass::A | PitchClass::As => 'A',
            PitchClass::B => 'B',
        }
    }

    pub fn is_sharp(self) -> bool {
        matches!(
            self,
            PitchClass::Cs | PitchClass::Ds | PitchClass::Fs | PitchClass::Gs | PitchClass::As
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::Cs => "C#",
            PitchClass::D => "D",
            PitchClass::Ds => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::Fs => "F#",
            PitchClass::G => "G",
            PitchClass::Gs => "G#",
            PitchClass::A => "A",
            PitchClass::As => "A#",
            PitchClass::B => "B",
        }
    }
}

/// Hue in degrees, saturation and value in percent.
pub fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> Color {
    let h = hue.rem_euclid(360.0) / 60.0;
    let s = saturation.clamp(0.0, 100.0) / 100.0;
    let v = value.clamp(0.0, 100.0) / 100.0;

    let chroma = v * s;
    let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = v - chroma;
    Color::new(r + m, g + m, b + m, 1.0)
}

pub fn hue_for(pitch: PitchClass) -> f32 {
    pitch.index() as f32 / PitchClass::COUNT as f32 * 360.0
}

pub fn midi_number(pitch: PitchClass, octave: i32) -> i32 {
    (octave + 1) * 12 + pitch.index() as i32
}

pub fn frequency(pitch: PitchClass, octave: i32, tuning: f64) -> f64 {
    let semitones = (midi_number(pitch, octave) - A4_MIDI) as f64;
    tuning * 2.0f64.powf(semitones / 12.0)
}
