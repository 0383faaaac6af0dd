use macroquad::prelude::*;

use crate::config::Config;
use crate::conv::{self, PitchClass};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteState {
    Idle,
    Pressed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyEdge {
    Down,
    Up,
}

#[derive(Clone, Debug)]
pub struct Note {
    pitch: PitchClass,
    octave: i32,
    hue: f32,
    key: KeyCode,
    rect: Rect,
    label: Option<usize>,
    state: NoteState,
    highlight: f32,
}

impl Note {
    pub fn new(pitch: PitchClass, octave: i32, key: KeyCode, rect: Rect) -> Self {
        Self {
            pitch,
            octave,
            hue: conv::hue_for(pitch),
            key,
            rect,
            label: None,
            state: NoteState::Idle,
            highlight: 0.0,
        }
    }

    pub fn with_label(mut self, label: Option<usize>) -> Self {
        self.label = label;
        self
    }

    pub fn key_down(&mut self) -> bool {
        if self.state == NoteState::Pressed {
            return false;
        }
        self.state = NoteState::Pressed;
        true
    }

    pub fn key_up(&mut self) -> bool {
        if self.state == NoteState::Idle {
            return false;
        }
        self.state = NoteState::Idle;
        true
    }

    pub fn apply(&mut self, edge: KeyEdge) -> bool {
        match edge {
            KeyEdge::Down => self.key_down(),
            KeyEdge::Up => self.key_up(),
        }
    }

    // Visual only: the logical state is never touched here.
    pub fn update(&mut self, dt_ms: f32, config: &Config) {
        let (target, ramp) = match self.state {
            NoteState::Pressed => (1.0, config.animation.attack_ms),
            NoteState::Idle => (0.0, config.animation.release_ms),
        };
        if ramp <= 0.0 {
            self.highlight = target;
            return;
        }
        let step = dt_ms.max(0.0) / ramp;
        self.highlight = if target > self.highlight {
            (self.highlight + step).min(target)
        } else {
            (self.highlight - step).max(target)
        }
        .clamp(0.0, 1.0);
    }

    pub fn pitch(&self) -> PitchClass {
        self.pitch
    }

    pub fn octave(&self) -> i32 {
        self.octave
    }

    pub fn key(&self) -> KeyCode {
        self.key
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn label(&self) -> Option<usize> {
        self.label
    }

    pub fn state(&self) -> NoteState {
        self.state
    }

    pub fn is_pressed(&self) -> bool {
        self.state == NoteState::Pressed
    }

    pub fn highlight(&self) -> f32 {
        self.highlight
    }

    pub fn frequency(&self, tuning: f64) -> f64 {
        conv::frequency(self.pitch, self.octave, tuning)
    }

    pub fn fill_color(&self, config: &Config) -> Color {
        let style = &config.rectangle;
        let saturation =
            style.saturation + (style.pressed_saturation - style.saturation) * self.highlight();
        conv::hsv_to_rgb(self.hue, saturation, style.value)
    }

    pub fn outline_color(&self, config: &Config) -> Color {
        let style = &config.rectangle;
        conv::hsv_to_rgb(self.hue, style.pressed_saturation, style.outline_value)
    }

    pub fn guide_line(&self, config: &Config) -> Rect {
        let x = self.rect.x + self.rect.w * 0.5 - config.line.thickness * 0.5;
        Rect::new(
            x,
            config.padding,
            config.line.thickness,
            config.window_height - config.padding * 2.0,
        )
    }
}
