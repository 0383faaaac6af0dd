use std::collections::HashMap;
use std::fmt;

use macroquad::prelude::*;

use crate::config::{COLUMNS, ROWS};
use crate::note::{KeyEdge, Note};

#[derive(Clone, Debug)]
pub struct KeyRow {
    pub octave: i32,
    pub keys: Vec<KeyCode>,
}

#[derive(Clone, Debug)]
pub struct KeyboardLayout {
    rows: Vec<KeyRow>,
}

impl KeyboardLayout {
    pub fn new(rows: Vec<KeyRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[KeyRow] {
        &self.rows
    }
}

impl Default for KeyboardLayout {
    fn default() -> Self {
        let number_row = vec![
            KeyCode::Key1,
            KeyCode::Key2,
            KeyCode::Key3,
            KeyCode::Key4,
            KeyCode::Key5,
            KeyCode::Key6,
            KeyCode::Key7,
            KeyCode::Key8,
            KeyCode::Key9,
            KeyCode::Key0,
            KeyCode::Minus,
            KeyCode::Equal,
        ];
        let top_row = vec![
            KeyCode::Q,
            KeyCode::W,
            KeyCode::E,
            KeyCode::R,
            KeyCode::T,
            KeyCode::Y,
            KeyCode::U,
            KeyCode::I,
            KeyCode::O,
            KeyCode::P,
            KeyCode::LeftBracket,
            KeyCode::RightBracket,
        ];
        let home_row = vec![
            KeyCode::A,
            KeyCode::S,
            KeyCode::D,
            KeyCode::F,
            KeyCode::G,
            KeyCode::H,
            KeyCode::J,
            KeyCode::K,
            KeyCode::L,
            KeyCode::Semicolon,
            KeyCode::Apostrophe,
            KeyCode::Enter,
        ];

        Self::new(vec![
            KeyRow {
                octave: 4,
                keys: number_row,
            },
            KeyRow {
                octave: 3,
                keys: top_row,
            },
            KeyRow {
                octave: 2,
                keys: home_row,
            },
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    DuplicateBinding {
        key: KeyCode,
        first: usize,
        second: usize,
    },
    WrongShape {
        rows: usize,
        keys: usize,
    },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::DuplicateBinding { key, first, second } => write!(
                f,
                "key {key:?} is bound to both note {first} and note {second}"
            ),
            LayoutError::WrongShape { rows, keys } => write!(
                f,
                "layout has {rows} rows and {keys} keys, expected {ROWS} rows of {COLUMNS}"
            ),
        }
    }
}

impl std::error::Error for LayoutError {}

pub fn check_shape(layout: &KeyboardLayout) -> Result<(), LayoutError> {
    let keys = layout.rows().iter().map(|row| row.keys.len()).sum();
    let well_formed =
        layout.rows().len() == ROWS && layout.rows().iter().all(|row| row.keys.len() == COLUMNS);
    if well_formed {
        Ok(())
    } else {
        Err(LayoutError::WrongShape {
            rows: layout.rows().len(),
            keys,
        })
    }
}

pub struct Router {
    lookup: HashMap<KeyCode, usize>,
}

impl Router {
    /// `bindings[i]` is the key bound to note `i`.
    pub fn new(bindings: &[KeyCode]) -> Result<Self, LayoutError> {
        let mut lookup = HashMap::with_capacity(bindings.len());
        for (index, keycode) in bindings.iter().enumerate() {
            if let Some(first) = lookup.insert(*keycode, index) {
                return Err(LayoutError::DuplicateBinding {
                    key: *keycode,
                    first,
                    second: index,
                });
            }
        }
        Ok(Self { lookup })
    }

    pub fn note_for(&self, keycode: KeyCode) -> Option<usize> {
        self.lookup.get(&keycode).copied()
    }

    pub fn bound_keys(&self) -> usize {
        self.lookup.len()
    }

    pub fn dispatch(&self, notes: &mut [Note], keycode: KeyCode, edge: KeyEdge) -> Option<usize> {
        let index = self.note_for(keycode)?;
        let note = notes.get_mut(index)?;
        if !note.apply(edge) {
            log::trace!("redundant {edge:?} for {keycode:?}, note stays {:?}", note.state());
        }
        Some(index)
    }
}
