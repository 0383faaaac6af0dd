use std::fmt;

use anyhow::{Context, Result};
use macroquad::prelude::*;

use crate::config::Config;
use crate::conv::{PitchClass, hsv_to_rgb};

const MAX_SURFACE_SIDE: u32 = 8192;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphBounds {
    pub width: f32,
    pub height: f32,
    /// Distance from the top of the run to its baseline.
    pub offset_y: f32,
}

pub trait GlyphRasterizer {
    fn measure(&self, text: &str) -> GlyphBounds;
    fn draw(&mut self, text: &str, x: f32, y: f32);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoteLabel {
    pub pitch: PitchClass,
    pub octave: i32,
}

impl NoteLabel {
    /// Letter, optional sharp sign, octave digits.
    pub fn components(&self) -> Vec<String> {
        let mut parts = vec![self.pitch.letter().to_string()];
        if self.pitch.is_sharp() {
            parts.push("#".to_string());
        }
        parts.push(self.octave.to_string());
        parts
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AtlasEntry {
    pub origin_x: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AtlasError {
    EmptySurface { width: u32, height: u32 },
    SurfaceTooLarge { width: u32, height: u32 },
    Overflow { needed: f32, available: f32 },
}

impl fmt::Display for AtlasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtlasError::EmptySurface { width, height } => {
                write!(f, "atlas surface {width}x{height} is empty")
            }
            AtlasError::SurfaceTooLarge { width, height } => write!(
                f,
                "atlas surface {width}x{height} exceeds {MAX_SURFACE_SIDE} px"
            ),
            AtlasError::Overflow { needed, available } => write!(
                f,
                "labels need {needed} px but the atlas is {available} px wide"
            ),
        }
    }
}

impl std::error::Error for AtlasError {}

pub fn note_vocabulary(first_octave: i32, octaves: i32) -> Vec<NoteLabel> {
    (first_octave..first_octave + octaves.max(0))
        .flat_map(|octave| {
            PitchClass::ALL
                .iter()
                .map(move |pitch| NoteLabel {
                    pitch: *pitch,
                    octave,
                })
        })
        .collect()
}

pub fn check_surface(width: u32, height: u32) -> Result<(), AtlasError> {
    if width == 0 || height == 0 {
        return Err(AtlasError::EmptySurface { width, height });
    }
    if width > MAX_SURFACE_SIDE || height > MAX_SURFACE_SIDE {
        return Err(AtlasError::SurfaceTooLarge { width, height });
    }
    Ok(())
}

pub fn layout_labels<R: GlyphRasterizer>(
    rasterizer: &mut R,
    vocabulary: &[NoteLabel],
    spacing: f32,
    surface_width: f32,
) -> Result<Vec<AtlasEntry>, AtlasError> {
    let mut entries = Vec::with_capacity(vocabulary.len());
    let mut cursor = 0.0;

    for label in vocabulary {
        let parts = label.components();
        let bounds: Vec<GlyphBounds> = parts.iter().map(|part| rasterizer.measure(part)).collect();

        let gaps = bounds.len().saturating_sub(1) as f32;
        // Whole pixels, so a source rect never samples its neighbour.
        let width = (bounds.iter().map(|b| b.width).sum::<f32>() + spacing * gaps).ceil();
        let height = bounds.iter().map(|b| b.height).fold(0.0, f32::max).ceil();

        if cursor + width > surface_width {
            return Err(AtlasError::Overflow {
                needed: cursor + width,
                available: surface_width,
            });
        }

        let mut x = cursor;
        for (part, bound) in parts.iter().zip(&bounds) {
            rasterizer.draw(part, x, bound.offset_y);
            x += bound.width + spacing;
        }

        entries.push(AtlasEntry {
            origin_x: cursor,
            width,
            height,
        });
        cursor += width;
    }

    Ok(entries)
}

struct MacroquadRasterizer<'a> {
    font: Option<&'a Font>,
    font_size: u16,
    color: Color,
}

impl GlyphRasterizer for MacroquadRasterizer<'_> {
    fn measure(&self, text: &str) -> GlyphBounds {
        let dims = measure_text(text, self.font, self.font_size, 1.0);
        GlyphBounds {
            width: dims.width,
            height: dims.height,
            offset_y: dims.offset_y,
        }
    }

    fn draw(&mut self, text: &str, x: f32, y: f32) {
        draw_text_ex(
            text,
            x,
            y,
            TextParams {
                font: self.font,
                font_size: self.font_size,
                color: self.color,
                ..Default::default()
            },
        );
    }
}

pub struct NoteAtlas {
    texture: Texture2D,
    entries: Vec<AtlasEntry>,
    first_octave: i32,
    octaves: i32,
}

impl NoteAtlas {
    pub fn build(font: Option<&Font>, config: &Config) -> Result<Self> {
        let (width, height) = (config.atlas.width, config.atlas.height);
        check_surface(width, height).context("cannot create the note label surface")?;

        let target = render_target(width, height);
        target.texture.set_filter(FilterMode::Nearest);
        // Render targets are y-up, so zoom with a positive y to keep labels upright.
        let camera = Camera2D {
            zoom: vec2(2.0 / width as f32, 2.0 / height as f32),
            target: vec2(width as f32 * 0.5, height as f32 * 0.5),
            render_target: Some(target.clone()),
            ..Default::default()
        };

        let vocabulary = note_vocabulary(config.atlas.first_octave, config.atlas.precomputed_octaves);
        let mut rasterizer = MacroquadRasterizer {
            font,
            font_size: config.text.size,
            color: hsv_to_rgb(0.0, 0.0, config.text.color_value),
        };

        set_camera(&camera);
        clear_background(hsv_to_rgb(0.0, 0.0, config.text.background_value));
        let entries = layout_labels(
            &mut rasterizer,
            &vocabulary,
            config.text.spacing,
            width as f32,
        );
        set_default_camera();
        let entries = entries.context("note labels do not fit the atlas")?;

        log::info!(
            "note atlas built: {} labels for octaves {}..={}, {:.0} px used of {width}",
            entries.len(),
            config.atlas.first_octave,
            config.last_octave(),
            entries.last().map(|e| e.origin_x + e.width).unwrap_or(0.0)
        );

        Ok(Self {
            texture: target.texture,
            entries,
            first_octave: config.atlas.first_octave,
            octaves: config.atlas.precomputed_octaves,
        })
    }

    pub fn index_of(&self, pitch: PitchClass, octave: i32) -> Option<usize> {
        label_index(self.first_octave, self.octaves, pitch, octave)
    }

    pub fn texture(&self) -> &Texture2D {
        &self.texture
    }

    pub fn source_rect(&self, index: usize) -> Option<Rect> {
        self.entries
            .get(index)
            .map(|entry| Rect::new(entry.origin_x, 0.0, entry.width, entry.height))
    }
}

pub fn label_index(first_octave: i32, octaves: i32, pitch: PitchClass, octave: i32) -> Option<usize> {
    let offset = octave - first_octave;
    if offset < 0 || offset >= octaves {
        return None;
    }
    Some(offset as usize * PitchClass::COUNT + pitch.index())
}
