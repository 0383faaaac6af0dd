use anyhow::{Result, bail};
use macroquad::prelude::Color;

use crate::conv::hsv_to_rgb;

pub const ROWS: usize = 3;
pub const COLUMNS: usize = 12;
pub const NOTE_COUNT: usize = ROWS * COLUMNS;

const MAX_SCRIPT_LEN: usize = 16 * 1024;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub idle: Color,
    pub hovered: Color,
    pub active: Color,
}

impl Palette {
    fn from_hue(hue: f32) -> Self {
        Self {
            idle: hsv_to_rgb(hue, 37.0, 40.0),
            hovered: hsv_to_rgb(hue, 40.0, 67.0),
            active: hsv_to_rgb(hue, 37.0, 80.0),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RectangleStyle {
    pub size: f32,
    /// Negative values draw the outline inside the key.
    pub outline: f32,
    pub saturation: f32,
    pub pressed_saturation: f32,
    pub value: f32,
    pub outline_value: f32,
}

#[derive(Clone, Debug)]
pub struct TextStyle {
    pub size: u16,
    pub spacing: f32,
    pub color_value: f32,
    pub background_value: f32,
}

#[derive(Clone, Debug)]
pub struct LineStyle {
    pub thickness: f32,
    pub color: Color,
}

#[derive(Clone, Debug)]
pub struct AtlasConfig {
    pub first_octave: i32,
    pub precomputed_octaves: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Debug)]
pub struct AnimationConfig {
    pub attack_ms: f32,
    pub release_ms: f32,
}

#[derive(Clone, Debug)]
pub struct GuiConfig {
    pub width: f32,
    pub font_size: u16,
    pub alpha: f32,
    pub menu_bar_offset: f32,
    pub mode_spacing: f32,
    pub live: Palette,
    pub write: Palette,
    pub playback: Palette,
    pub tabs: Palette,
    pub volume_step: i32,
    pub exponential_strength_min: f64,
    pub exponential_strength_max: f64,
}

#[derive(Clone, Debug)]
pub struct ScriptConfig {
    pub path: String,
    pub max_len: usize,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub update_milliseconds: u64,
    pub background: Color,
    pub rectangle: RectangleStyle,
    pub text: TextStyle,
    pub line: LineStyle,
    pub padding: f32,
    pub atlas: AtlasConfig,
    pub animation: AnimationConfig,
    pub gui: GuiConfig,
    pub script: ScriptConfig,
    pub standard_tuning: f64,
    pub font_path: Option<String>,
    pub window_height: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            update_milliseconds: 16,
            background: Color::from_rgba(16, 16, 16, 255),
            rectangle: RectangleStyle {
                size: 50.0,
                outline: -2.0,
                saturation: 10.0,
                pressed_saturation: 59.0,
                value: 97.0,
                outline_value: 78.0,
            },
            text: TextStyle {
                size: 19,
                spacing: -1.0,
                color_value: 15.0,
                background_value: 96.0,
            },
            line: LineStyle {
                thickness: 2.0,
                color: Color::from_rgba(30, 30, 30, 255),
            },
            padding: 10.0,
            atlas: AtlasConfig {
                first_octave: 1,
                precomputed_octaves: 5,
                width: 4000,
                height: 500,
            },
            animation: AnimationConfig {
                attack_ms: 60.0,
                release_ms: 240.0,
            },
            gui: GuiConfig {
                width: 500.0,
                font_size: 18,
                alpha: 0.5,
                menu_bar_offset: 25.0,
                mode_spacing: 11.0,
                live: Palette::from_hue(60.0),
                write: Palette::from_hue(345.0),
                playback: Palette::from_hue(150.0),
                tabs: Palette::from_hue(0.0),
                volume_step: 500,
                exponential_strength_min: 1.0,
                exponential_strength_max: 1000.0,
            },
            script: ScriptConfig {
                path: "wave.lua".into(),
                max_len: MAX_SCRIPT_LEN,
            },
            standard_tuning: 440.0,
            font_path: None,
            window_height: 700.0,
        }
    }
}

impl Config {
    pub fn notes_view_width(&self) -> f32 {
        self.padding + COLUMNS as f32 * (self.rectangle.size + self.padding)
    }

    pub fn window_width(&self) -> f32 {
        self.notes_view_width() + self.padding + self.gui.width
    }

    pub fn last_octave(&self) -> i32 {
        self.atlas.first_octave + self.atlas.precomputed_octaves - 1
    }

    pub fn validate(&self) -> Result<()> {
        if self.update_milliseconds == 0 {
            bail!("fixed timestep must be at least one millisecond");
        }
        if self.rectangle.size <= 0.0 {
            bail!("key size must be positive, got {}", self.rectangle.size);
        }
        if self.atlas.precomputed_octaves <= 0 {
            bail!(
                "atlas octave range is empty ({} octaves)",
                self.atlas.precomputed_octaves
            );
        }
        if self.atlas.width == 0 || self.atlas.height == 0 {
            bail!(
                "atlas surface {}x{} has a zero dimension",
                self.atlas.width,
                self.atlas.height
            );
        }
        if self.text.size == 0 {
            bail!("label font size must be positive");
        }
        if self.script.max_len == 0 {
            bail!("script buffer bound must be positive");
        }
        Ok(())
    }
}
