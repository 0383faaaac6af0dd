use macroquad::prelude::*;
use macroquad::ui::{hash, root_ui, widgets};

use crate::app::{App, Confirmation, Mode, Tab};
use crate::config::{Config, Palette};
use crate::script::ScriptBuffer;

const BUTTON_HEIGHT: f32 = 24.0;
const BUTTON_PADDING: f32 = 8.0;
const ITEM_SPACING: f32 = 4.0;
const ROW_SPACING: f32 = 8.0;
const TAB_BAR_HEIGHT: f32 = 40.0;
const EDITOR_LINES: f32 = 16.0;
const ERROR_COLOR: Color = Color {
    r: 1.0,
    g: 0.3,
    b: 0.3,
    a: 1.0,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UiAction {
    Quit,
    SetMode(Mode),
    SelectTab(Tab),
    RequestNew,
    RequestReopen,
    Confirm,
    Cancel,
    ScriptSave,
    Compile,
    ToggleVfc,
    CycleVfcMode,
    AdjustVolume(i32),
    AdjustStrength(f64),
    EditorFocus(bool),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ButtonSpec {
    pub label: String,
    pub palette: Palette,
    pub active: bool,
    pub action: UiAction,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Item {
    Button(ButtonSpec),
    Text { text: String, color: Color },
    Gap(f32),
    Break,
    ScriptEditor,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Panel {
    pub title: Option<&'static str>,
    pub rect: Rect,
    pub alpha: f32,
    // False while a modal panel sits on top.
    pub interactive: bool,
    pub items: Vec<Item>,
}

fn button(label: impl Into<String>, palette: Palette, active: bool, action: UiAction) -> Item {
    Item::Button(ButtonSpec {
        label: label.into(),
        palette,
        active,
        action,
    })
}

fn text(text: impl Into<String>) -> Item {
    Item::Text {
        text: text.into(),
        color: WHITE,
    }
}

pub fn describe(app: &App) -> Vec<Panel> {
    let config = app.config();
    let mut panels = vec![menu_bar(app, config), tab_bar(app, config)];
    match app.tab() {
        Tab::Settings => panels.push(settings_panel(app, config)),
        Tab::Wave => panels.push(wave_panel(app, config)),
    }
    if let Some(confirmation) = app.confirmation() {
        for panel in &mut panels {
            panel.interactive = false;
        }
        panels.push(confirm_panel(confirmation, config));
    }
    panels
}

fn menu_bar(app: &App, config: &Config) -> Panel {
    let gui = &config.gui;
    let mut items = vec![
        button("Quit", gui.tabs, false, UiAction::Quit),
        Item::Gap(gui.mode_spacing),
    ];
    for mode in Mode::VALUES {
        let palette = match mode {
            Mode::Live => gui.live,
            Mode::Write => gui.write,
            Mode::Playback => gui.playback,
        };
        items.push(button(
            mode.label(),
            palette,
            app.mode() == mode,
            UiAction::SetMode(mode),
        ));
    }
    Panel {
        title: None,
        rect: Rect::new(0.0, 0.0, config.window_width(), gui.menu_bar_offset),
        alpha: 1.0,
        interactive: true,
        items,
    }
}

fn side_x(config: &Config) -> f32 {
    config.window_width() - config.gui.width - config.padding
}

fn tab_bar(app: &App, config: &Config) -> Panel {
    let gui = &config.gui;
    let items = [Tab::Wave, Tab::Settings]
        .into_iter()
        .map(|tab| button(tab.label(), gui.tabs, app.tab() == tab, UiAction::SelectTab(tab)))
        .collect();
    Panel {
        title: None,
        rect: Rect::new(
            side_x(config),
            config.padding + gui.menu_bar_offset,
            gui.width,
            TAB_BAR_HEIGHT,
        ),
        alpha: gui.alpha,
        interactive: true,
        items,
    }
}

fn settings_panel(app: &App, config: &Config) -> Panel {
    let gui = &config.gui;
    let settings = app.settings();
    let step = gui.volume_step;
    let top = config.padding + gui.menu_bar_offset + TAB_BAR_HEIGHT + config.padding;
    let items = vec![
        text(format!("Volume: {}", settings.volume)),
        button("-", gui.tabs, false, UiAction::AdjustVolume(-step)),
        button("+", gui.tabs, false, UiAction::AdjustVolume(step)),
        Item::Break,
        text("Velocity curve:"),
        button(
            if settings.vfc_enabled { "On" } else { "Off" },
            gui.tabs,
            settings.vfc_enabled,
            UiAction::ToggleVfc,
        ),
        button(
            settings.vfc_mode.label(),
            gui.tabs,
            false,
            UiAction::CycleVfcMode,
        ),
        Item::Break,
        text(format!(
            "Exponential strength: {:.1}",
            settings.exponential_strength
        )),
        button("/2", gui.tabs, false, UiAction::AdjustStrength(0.5)),
        button("x2", gui.tabs, false, UiAction::AdjustStrength(2.0)),
        Item::Break,
        text(last_played_text(app, config)),
    ];
    Panel {
        title: Some("Settings"),
        rect: Rect::new(
            side_x(config),
            top,
            gui.width,
            config.window_height - top - config.padding,
        ),
        alpha: gui.alpha,
        interactive: true,
        items,
    }
}

fn last_played_text(app: &App, config: &Config) -> String {
    match app.last_played() {
        Some(note) => format!(
            "Last note: {}{} ({:.2} Hz)",
            note.pitch().label(),
            note.octave(),
            note.frequency(config.standard_tuning)
        ),
        None => "Last note: -".to_string(),
    }
}

fn wave_panel(app: &App, config: &Config) -> Panel {
    let gui = &config.gui;
    let script = app.script();
    let mut items = vec![
        button("New", gui.tabs, false, UiAction::RequestNew),
        button("Save", gui.tabs, false, UiAction::ScriptSave),
        button("Reopen", gui.tabs, false, UiAction::RequestReopen),
        Item::Gap(gui.mode_spacing),
        button("Compile", gui.tabs, false, UiAction::Compile),
        Item::Gap(gui.mode_spacing),
        text(format!(
            "{} {}/{} bytes",
            script.path().display(),
            script.text().len(),
            script.max_len()
        )),
        Item::Break,
    ];
    if let Some(error) = script.last_error() {
        items.push(Item::Text {
            text: error.to_string(),
            color: ERROR_COLOR,
        });
        items.push(Item::Break);
    }
    if app.editor_focused() {
        items.push(text("Keys type into the script. Click outside it to play."));
        items.push(Item::Break);
    }
    items.push(Item::ScriptEditor);
    Panel {
        title: Some("Wave"),
        rect: Rect::new(
            config.padding,
            config.padding + gui.menu_bar_offset,
            config.window_width() - gui.width - config.padding * 3.0,
            400.0,
        ),
        alpha: gui.alpha,
        interactive: true,
        items,
    }
}

fn confirm_panel(confirmation: Confirmation, config: &Config) -> Panel {
    let title = match confirmation {
        Confirmation::New => "Start over?",
        Confirmation::Reopen => "Discard changes?",
    };
    let size = vec2(440.0, 120.0);
    Panel {
        title: Some(title),
        rect: Rect::new(
            (config.window_width() - size.x) * 0.5,
            (config.window_height - size.y) * 0.5,
            size.x,
            size.y,
        ),
        alpha: 1.0,
        interactive: true,
        items: vec![
            text("Your changes will be overwritten and discarded."),
            Item::Break,
            text("This operation cannot be undone!"),
            Item::Break,
            button("OK", config.gui.tabs, false, UiAction::Confirm),
            button("Cancel", config.gui.tabs, false, UiAction::Cancel),
        ],
    }
}

pub fn evaluate(panels: &[Panel], script: &mut ScriptBuffer, font_size: u16) -> Vec<UiAction> {
    let mouse = Vec2::from(mouse_position());
    let clicked = is_mouse_button_pressed(MouseButton::Left);
    // Only the topmost panel under the cursor takes the click, and only if it is live.
    let target = panels
        .iter()
        .rposition(|panel| panel.rect.contains(mouse))
        .filter(|index| panels[*index].interactive);

    let mut actions = Vec::new();
    let mut editor_hit = false;
    for (index, panel) in panels.iter().enumerate() {
        let hot = target == Some(index);
        editor_hit |= draw_panel(panel, script, font_size, mouse, hot && clicked, &mut actions);
    }
    if clicked {
        if !editor_hit {
            root_ui().clear_input_focus();
        }
        actions.push(UiAction::EditorFocus(editor_hit));
    }
    actions
}

fn draw_panel(
    panel: &Panel,
    script: &mut ScriptBuffer,
    font_size: u16,
    mouse: Vec2,
    clicked: bool,
    actions: &mut Vec<UiAction>,
) -> bool {
    let rect = panel.rect;
    let mut editor_hit = false;
    draw_rectangle(
        rect.x,
        rect.y,
        rect.w,
        rect.h,
        Color::new(0.06, 0.06, 0.06, panel.alpha),
    );
    draw_rectangle_lines(rect.x, rect.y, rect.w, rect.h, 1.0, Color::new(0.4, 0.4, 0.4, 1.0));

    let left = rect.x + ITEM_SPACING;
    let mut cursor = vec2(left, rect.y + ITEM_SPACING);
    if let Some(title) = panel.title {
        let dims = measure_text(title, None, font_size, 1.0);
        draw_text_ex(
            title,
            left,
            cursor.y + dims.offset_y,
            TextParams {
                font_size,
                color: WHITE,
                ..Default::default()
            },
        );
        cursor.y += dims.height + ROW_SPACING;
    }

    for item in &panel.items {
        match item {
            Item::Button(spec) => {
                let dims = measure_text(&spec.label, None, font_size, 1.0);
                let bounds = Rect::new(
                    cursor.x,
                    cursor.y,
                    dims.width + BUTTON_PADDING * 2.0,
                    BUTTON_HEIGHT.min(rect.h - ITEM_SPACING),
                );
                let hovered = bounds.contains(mouse);
                let fill = if spec.active {
                    spec.palette.active
                } else if hovered {
                    spec.palette.hovered
                } else {
                    spec.palette.idle
                };
                draw_rectangle(bounds.x, bounds.y, bounds.w, bounds.h, fill);
                draw_text_ex(
                    &spec.label,
                    bounds.x + BUTTON_PADDING,
                    bounds.y + (bounds.h + dims.height) * 0.5,
                    TextParams {
                        font_size,
                        color: WHITE,
                        ..Default::default()
                    },
                );
                if hovered && clicked {
                    actions.push(spec.action);
                }
                cursor.x += bounds.w + ITEM_SPACING;
            }
            Item::Text { text, color } => {
                let dims = measure_text(text, None, font_size, 1.0);
                draw_text_ex(
                    text,
                    cursor.x,
                    cursor.y + (BUTTON_HEIGHT + dims.height) * 0.5,
                    TextParams {
                        font_size,
                        color: *color,
                        ..Default::default()
                    },
                );
                cursor.x += dims.width + ITEM_SPACING * 2.0;
            }
            Item::Gap(width) => cursor.x += width,
            Item::Break => {
                cursor.x = left;
                cursor.y += BUTTON_HEIGHT + ROW_SPACING;
            }
            Item::ScriptEditor => {
                let line_height = font_size as f32;
                let size = vec2(
                    rect.w - ITEM_SPACING * 2.0,
                    (line_height * EDITOR_LINES).min(rect.y + rect.h - cursor.y - ITEM_SPACING),
                );
                let position = cursor;
                if panel.interactive {
                    let bounds = Rect::new(position.x, position.y, size.x, size.y);
                    editor_hit = clicked && bounds.contains(mouse);
                    script.edit(|text| {
                        widgets::Editbox::new(hash!(), size)
                            .position(position)
                            .multiline(true)
                            .ui(&mut root_ui(), text);
                    });
                } else {
                    draw_script_preview(script.text(), position, size, font_size);
                }
                cursor.y += size.y + ROW_SPACING;
            }
        }
    }
    editor_hit
}

fn draw_script_preview(text: &str, position: Vec2, size: Vec2, font_size: u16) {
    draw_rectangle(position.x, position.y, size.x, size.y, Color::new(0.0, 0.0, 0.0, 0.4));
    let line_height = font_size as f32;
    let visible = (size.y / line_height) as usize;
    for (row, line) in text.lines().take(visible).enumerate() {
        draw_text_ex(
            line,
            position.x + ITEM_SPACING,
            position.y + line_height * (row as f32 + 1.0),
            TextParams {
                font_size,
                color: GRAY,
                ..Default::default()
            },
        );
    }
}
