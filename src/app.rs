use std::collections::VecDeque;
use std::time::Duration;

use anyhow::Result;
use macroquad::prelude::*;

use crate::config::{Config, NOTE_COUNT, ROWS};
use crate::conv::PitchClass;
use crate::events::{EventSource, HostEvent};
use crate::keyboard::{self, KeyboardLayout, LayoutError, Router};
use crate::note::{KeyEdge, Note};
use crate::script::ScriptBuffer;
use crate::timestep::FixedTimestep;
use crate::ui::UiAction;

const VOLUME_MAX: i32 = 10_000;
const CATCH_UP_WARN_STEPS: u32 = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Live,
    Write,
    Playback,
}

impl Mode {
    pub const VALUES: [Mode; 3] = [Mode::Live, Mode::Write, Mode::Playback];

    pub fn label(&self) -> &'static str {
        match self {
            Mode::Live => "Playing",
            Mode::Write => "Writing",
            Mode::Playback => "Replaying",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tab {
    Settings,
    Wave,
}

impl Tab {
    pub fn label(&self) -> &'static str {
        match self {
            Tab::Settings => "Settings",
            Tab::Wave => "Wave",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VfcMode {
    Linear,
    Exponential,
    SquareRoot,
}

impl VfcMode {
    pub const VALUES: [VfcMode; 3] = [VfcMode::Linear, VfcMode::Exponential, VfcMode::SquareRoot];

    pub fn next(self) -> Self {
        let index = Self::VALUES
            .iter()
            .position(|mode| *mode == self)
            .unwrap_or(0);
        Self::VALUES[(index + 1) % Self::VALUES.len()]
    }

    pub fn label(&self) -> &'static str {
        match self {
            VfcMode::Linear => "Linear",
            VfcMode::Exponential => "Exponential",
            VfcMode::SquareRoot => "Square Root",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Confirmation {
    New,
    Reopen,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub volume: i32,
    pub vfc_enabled: bool,
    pub vfc_mode: VfcMode,
    pub exponential_strength: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            volume: 5000,
            vfc_enabled: true,
            vfc_mode: VfcMode::Linear,
            exponential_strength: 100.0,
        }
    }
}

pub fn build_notes<F>(
    config: &Config,
    layout: &KeyboardLayout,
    labels: F,
) -> Result<Vec<Note>, LayoutError>
where
    F: Fn(PitchClass, i32) -> Option<usize>,
{
    keyboard::check_shape(layout)?;
    let size = config.rectangle.size;
    let cell = size + config.padding;

    let mut notes = Vec::with_capacity(NOTE_COUNT);
    for (row_index, row) in layout.rows().iter().enumerate() {
        let rows_below = (ROWS - row_index - 1) as f32;
        let y = config.window_height - config.padding - size - rows_below * cell;
        for (column, keycode) in row.keys.iter().enumerate() {
            let pitch_class = PitchClass::ALL[column % PitchClass::COUNT];
            let x = config.padding + column as f32 * cell;
            let label = labels(pitch_class, row.octave);
            if label.is_none() {
                log::warn!(
                    "no atlas label for {}{}",
                    pitch_class.label(),
                    row.octave
                );
            }
            notes.push(
                Note::new(
                    pitch_class,
                    row.octave,
                    *keycode,
                    Rect::new(x, y, size, size),
                )
                .with_label(label),
            );
        }
    }
    Ok(notes)
}

pub struct App {
    config: Config,
    notes: Vec<Note>,
    router: Router,
    timestep: FixedTimestep,
    pending: VecDeque<(KeyCode, KeyEdge)>,
    mode: Mode,
    tab: Tab,
    settings: Settings,
    script: ScriptBuffer,
    confirmation: Option<Confirmation>,
    last_played: Option<usize>,
    editor_focused: bool,
    quit: bool,
}

impl App {
    pub fn new<F>(
        config: Config,
        layout: &KeyboardLayout,
        labels: F,
        script: ScriptBuffer,
    ) -> Result<Self>
    where
        F: Fn(PitchClass, i32) -> Option<usize>,
    {
        config.validate()?;
        let notes = build_notes(&config, layout, labels)?;
        let bindings: Vec<KeyCode> = notes.iter().map(Note::key).collect();
        let router = Router::new(&bindings)?;
        log::info!("{} notes bound to {} keys", notes.len(), router.bound_keys());

        Ok(Self {
            timestep: FixedTimestep::new(config.update_milliseconds),
            config,
            notes,
            router,
            pending: VecDeque::new(),
            mode: Mode::Live,
            tab: Tab::Settings,
            settings: Settings::default(),
            script,
            confirmation: None,
            last_played: None,
            editor_focused: false,
            quit: false,
        })
    }

    pub fn frame<E: EventSource>(&mut self, real_time: Duration, events: &mut E) -> u32 {
        while let Some(event) = events.poll() {
            match event {
                HostEvent::Close => {
                    if !self.quit {
                        log::info!("close requested");
                    }
                    self.quit = true;
                }
                // Typing into the script editor must not play notes. Releases still
                // pass so a key held before the editor took focus cannot stick.
                HostEvent::KeyDown(_) if self.editor_focused => {}
                HostEvent::KeyDown(key) => self.pending.push_back((key, KeyEdge::Down)),
                HostEvent::KeyUp(key) => self.pending.push_back((key, KeyEdge::Up)),
            }
        }

        let notes = &mut self.notes;
        let pending = &mut self.pending;
        let router = &self.router;
        let config = &self.config;
        let last_played = &mut self.last_played;
        let steps = self.timestep.catch_up(real_time, |step| {
            let dt_ms = step.as_secs_f32() * 1000.0;
            while let Some((key, edge)) = pending.pop_front() {
                let Some(index) = router.dispatch(notes, key, edge) else {
                    continue;
                };
                if edge == KeyEdge::Down && notes[index].is_pressed() {
                    *last_played = Some(index);
                }
            }
            for note in notes.iter_mut() {
                note.update(dt_ms, config);
            }
        });

        if steps > CATCH_UP_WARN_STEPS {
            log::debug!("caught up {steps} steps in one frame");
        }
        steps
    }

    pub fn apply(&mut self, action: UiAction) {
        match action {
            UiAction::Quit => self.quit = true,
            UiAction::SetMode(mode) => {
                if self.mode != mode {
                    log::info!("mode: {}", mode.label());
                }
                self.mode = mode;
            }
            UiAction::SelectTab(tab) => {
                self.tab = tab;
                if tab != Tab::Wave {
                    self.editor_focused = false;
                }
            }
            // A pending confirmation owns the script until it is answered.
            UiAction::RequestNew | UiAction::RequestReopen | UiAction::ScriptSave
                if self.confirmation.is_some() =>
            {
                log::debug!("{action:?} ignored while a confirmation is pending");
            }
            UiAction::RequestNew => self.request(Confirmation::New),
            UiAction::RequestReopen => self.request(Confirmation::Reopen),
            UiAction::Cancel => self.confirmation = None,
            UiAction::Confirm => match self.confirmation.take() {
                Some(Confirmation::New) => self.script.reset_to_default(),
                Some(Confirmation::Reopen) => {
                    if let Err(err) = self.script.reopen() {
                        log::error!("{err:#}");
                    }
                }
                None => {}
            },
            UiAction::ScriptSave => {
                if let Err(err) = self.script.save() {
                    log::error!("{err:#}");
                }
            }
            UiAction::Compile => {
                log::info!("compile requested ({} bytes)", self.script.text().len());
            }
            UiAction::EditorFocus(focused) => self.editor_focused = focused,
            UiAction::ToggleVfc => self.settings.vfc_enabled = !self.settings.vfc_enabled,
            UiAction::CycleVfcMode => self.settings.vfc_mode = self.settings.vfc_mode.next(),
            UiAction::AdjustVolume(delta) => {
                self.settings.volume = (self.settings.volume + delta).clamp(0, VOLUME_MAX);
            }
            UiAction::AdjustStrength(factor) => {
                let gui = &self.config.gui;
                self.settings.exponential_strength = (self.settings.exponential_strength
                    * factor)
                    .clamp(gui.exponential_strength_min, gui.exponential_strength_max);
            }
        }
    }

    fn request(&mut self, confirmation: Confirmation) {
        self.confirmation = Some(confirmation);
        self.editor_focused = false;
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn last_played(&self) -> Option<&Note> {
        self.last_played.and_then(|index| self.notes.get(index))
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn confirmation(&self) -> Option<Confirmation> {
        self.confirmation
    }

    pub fn editor_focused(&self) -> bool {
        self.editor_focused
    }

    pub fn script(&self) -> &ScriptBuffer {
        &self.script
    }

    pub fn script_mut(&mut self) -> &mut ScriptBuffer {
        &mut self.script
    }

    pub fn simulated_time(&self) -> Duration {
        self.timestep.simulated_time()
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::label_index;
    use crate::config::COLUMNS;
    use crate::keyboard::KeyRow;
    use crate::note::NoteState;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    fn app() -> (App, TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let script = ScriptBuffer::open(dir.path().join("wave.lua"), "-- wave", 1024).expect("script");
        let app = App::new(
            Config::default(),
            &KeyboardLayout::default(),
            |pitch, octave| label_index(1, 5, pitch, octave),
            script,
        )
        .expect("app");
        (app, dir)
    }

    fn note_at(app: &App, row: usize, column: usize) -> Option<&Note> {
        if column >= COLUMNS {
            return None;
        }
        app.notes().get(row * COLUMNS + column)
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn pressed(app: &App) -> Vec<usize> {
        app.notes()
            .iter()
            .enumerate()
            .filter(|(_, note)| note.is_pressed())
            .map(|(index, _)| index)
            .collect()
    }

    #[test]
    fn grid_has_three_rows_of_twelve() {
        let (app, _dir) = app();
        assert_eq!(app.notes().len(), 36);

        let q = note_at(&app, 1, 0).expect("note");
        assert_eq!(q.key(), KeyCode::Q);
        assert_eq!(q.pitch(), PitchClass::C);
        assert_eq!(q.octave(), 3);
        assert_eq!(q.label(), Some(24));

        let bottom_right = note_at(&app, 2, 11).expect("note");
        assert_relative_eq!(bottom_right.rect().x, 10.0 + 11.0 * 60.0);
        assert_relative_eq!(bottom_right.rect().y, 700.0 - 10.0 - 50.0);
        let top_left = note_at(&app, 0, 0).expect("note");
        assert_relative_eq!(top_left.rect().y, 640.0 - 120.0);
        assert!(note_at(&app, 0, 12).is_none());
    }

    #[test]
    fn q_presses_only_its_note() {
        let (mut app, _dir) = app();
        let mut events = VecDeque::from([HostEvent::KeyDown(KeyCode::Q)]);
        app.frame(ms(16), &mut events);
        assert_eq!(pressed(&app), vec![12]);
        assert_eq!(note_at(&app, 1, 0).map(Note::state), Some(NoteState::Pressed));

        let mut events = VecDeque::from([HostEvent::KeyUp(KeyCode::Q)]);
        app.frame(ms(32), &mut events);
        assert!(pressed(&app).is_empty());
    }

    #[test]
    fn events_wait_for_the_next_whole_step() {
        let (mut app, _dir) = app();
        let mut events = VecDeque::from([HostEvent::KeyDown(KeyCode::A)]);
        assert_eq!(app.frame(ms(10), &mut events), 0);
        assert!(pressed(&app).is_empty());

        assert_eq!(app.frame(ms(17), &mut VecDeque::new()), 1);
        assert_eq!(pressed(&app), vec![24]);
    }

    #[test]
    fn catch_up_after_stall() {
        let (mut app, _dir) = app();
        let mut events = VecDeque::from([HostEvent::KeyDown(KeyCode::Key1)]);
        assert_eq!(app.frame(ms(50), &mut events), 3);
        assert_eq!(app.simulated_time(), ms(48));

        let note = note_at(&app, 0, 0).expect("note");
        assert_relative_eq!(note.highlight(), 48.0 / 60.0, epsilon = 1e-5);
    }

    #[test]
    fn unbound_and_redundant_edges_are_ignored() {
        let (mut app, _dir) = app();
        let mut events = VecDeque::from([
            HostEvent::KeyDown(KeyCode::Z),
            HostEvent::KeyUp(KeyCode::W),
            HostEvent::KeyDown(KeyCode::W),
            HostEvent::KeyDown(KeyCode::W),
        ]);
        app.frame(ms(16), &mut events);
        assert_eq!(pressed(&app), vec![13]);
    }

    #[test]
    fn close_sets_quit() {
        let (mut app, _dir) = app();
        let mut events = VecDeque::from([HostEvent::Close]);
        app.frame(ms(1), &mut events);
        assert!(app.should_quit());
    }

    #[test]
    fn duplicate_key_in_layout_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let script = ScriptBuffer::open(dir.path().join("wave.lua"), "", 64).expect("script");
        let mut layout = KeyboardLayout::default();
        let mut rows: Vec<KeyRow> = layout.rows().to_vec();
        rows[2].keys[0] = KeyCode::Q;
        layout = KeyboardLayout::new(rows);

        let result = App::new(Config::default(), &layout, |_, _| None, script);
        let err = result.err().expect("duplicate binding");
        assert!(matches!(
            err.downcast_ref::<LayoutError>(),
            Some(LayoutError::DuplicateBinding {
                key: KeyCode::Q,
                first: 12,
                second: 24
            })
        ));
    }

    #[test]
    fn ui_actions_update_state() {
        let (mut app, _dir) = app();
        app.apply(UiAction::SetMode(Mode::Write));
        app.apply(UiAction::SelectTab(Tab::Wave));
        app.apply(UiAction::ToggleVfc);
        app.apply(UiAction::CycleVfcMode);
        app.apply(UiAction::AdjustVolume(20_000));
        app.apply(UiAction::AdjustStrength(0.001));

        assert_eq!(app.mode(), Mode::Write);
        assert_eq!(app.tab(), Tab::Wave);
        assert_eq!(
            app.settings(),
            &Settings {
                volume: VOLUME_MAX,
                vfc_enabled: false,
                vfc_mode: VfcMode::Exponential,
                exponential_strength: 1.0,
            }
        );

        app.apply(UiAction::Quit);
        assert!(app.should_quit());
    }

    #[test]
    fn script_actions_round_trip() {
        let (mut app, _dir) = app();
        app.script_mut().edit(|text| *text = "return 1".to_string());
        app.apply(UiAction::ScriptSave);

        app.apply(UiAction::RequestNew);
        assert_eq!(app.confirmation(), Some(Confirmation::New));
        assert_eq!(app.script().text(), "return 1");
        app.apply(UiAction::Confirm);
        assert_eq!(app.script().text(), "-- wave");
        assert_eq!(app.confirmation(), None);

        app.apply(UiAction::RequestReopen);
        app.apply(UiAction::Confirm);
        assert_eq!(app.script().text(), "return 1");
    }

    #[test]
    fn cancel_keeps_the_edits() {
        let (mut app, _dir) = app();
        app.script_mut().edit(|text| *text = "unsaved".to_string());
        app.apply(UiAction::RequestNew);
        app.apply(UiAction::Cancel);
        app.apply(UiAction::Confirm);
        assert_eq!(app.script().text(), "unsaved");
    }

    #[test]
    fn pending_confirmation_cannot_be_replaced_or_bypassed() {
        let (mut app, _dir) = app();
        app.script_mut().edit(|text| *text = "return 1".to_string());
        app.apply(UiAction::ScriptSave);
        app.script_mut().edit(|text| *text = "draft".to_string());

        app.apply(UiAction::RequestNew);
        app.apply(UiAction::RequestReopen);
        app.apply(UiAction::ScriptSave);
        assert_eq!(app.confirmation(), Some(Confirmation::New));
        let on_disk = std::fs::read_to_string(app.script().path()).expect("read");
        assert_eq!(on_disk, "return 1");

        app.apply(UiAction::Confirm);
        assert_eq!(app.script().text(), "-- wave");
        assert_eq!(app.confirmation(), None);
    }

    #[test]
    fn focused_editor_swallows_key_presses() {
        let (mut app, _dir) = app();
        app.apply(UiAction::EditorFocus(true));
        let mut events = VecDeque::from([HostEvent::KeyDown(KeyCode::Q)]);
        app.frame(ms(16), &mut events);
        assert!(pressed(&app).is_empty());

        app.apply(UiAction::EditorFocus(false));
        let mut events = VecDeque::from([HostEvent::KeyDown(KeyCode::Q)]);
        app.frame(ms(32), &mut events);
        assert_eq!(pressed(&app), vec![12]);

        // A release while typing still lets go of the held note.
        app.apply(UiAction::EditorFocus(true));
        let mut events = VecDeque::from([HostEvent::KeyUp(KeyCode::Q)]);
        app.frame(ms(48), &mut events);
        assert!(pressed(&app).is_empty());
    }

    #[test]
    fn leaving_the_wave_tab_drops_editor_focus() {
        let (mut app, _dir) = app();
        app.apply(UiAction::SelectTab(Tab::Wave));
        app.apply(UiAction::EditorFocus(true));
        app.apply(UiAction::SelectTab(Tab::Settings));
        assert!(!app.editor_focused());
    }

    #[test]
    fn vfc_mode_cycles() {
        assert_eq!(VfcMode::SquareRoot.next(), VfcMode::Linear);
    }
}
