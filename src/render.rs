use macroquad::prelude::*;

use crate::atlas::NoteAtlas;
use crate::config::Config;
use crate::note::Note;

pub fn draw_frame(notes: &[Note], atlas: &NoteAtlas, config: &Config) {
    clear_background(config.background);

    for note in notes {
        let line = note.guide_line(config);
        draw_rectangle(line.x, line.y, line.w, line.h, config.line.color);
    }
    for note in notes {
        draw_note(note, atlas, config);
    }
}

fn draw_note(note: &Note, atlas: &NoteAtlas, config: &Config) {
    let rect = note.rect();
    draw_rectangle(rect.x, rect.y, rect.w, rect.h, note.fill_color(config));

    let outline = config.rectangle.outline;
    if outline != 0.0 {
        let thickness = outline.abs();
        // Positive outlines grow outward, negative ones eat into the key.
        let frame = if outline > 0.0 {
            Rect::new(
                rect.x - thickness,
                rect.y - thickness,
                rect.w + thickness * 2.0,
                rect.h + thickness * 2.0,
            )
        } else {
            rect
        };
        draw_rectangle_lines(
            frame.x,
            frame.y,
            frame.w,
            frame.h,
            thickness * 2.0,
            note.outline_color(config),
        );
    }

    let Some(source) = note.label().and_then(|index| atlas.source_rect(index)) else {
        return;
    };
    let x = (rect.x + (rect.w - source.w) * 0.5).round();
    let y = (rect.y + (rect.h - source.h) * 0.5).round();
    draw_texture_ex(
        atlas.texture(),
        x,
        y,
        WHITE,
        DrawTextureParams {
            source: Some(source),
            ..Default::default()
        },
    );
}
