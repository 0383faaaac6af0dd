mod app;
mod atlas;
mod config;
mod conv;
mod events;
mod keyboard;
mod note;
mod render;
mod script;
mod timestep;
mod ui;

use std::time::Duration;

use anyhow::{Result, anyhow};
use macroquad::prelude::*;

use app::App;
use atlas::NoteAtlas;
use config::Config;
use events::MacroquadEvents;
use keyboard::KeyboardLayout;
use script::{DEFAULT_WAVE_SCRIPT, ScriptBuffer};

const WINDOW_TITLE: &str = "sythin2";
const ANTIALIASING: i32 = 6;

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();
    if let Err(err) = run(Config::default()).await {
        log::error!("startup failed: {err:#}");
        std::process::exit(1);
    }
}

fn window_conf() -> Conf {
    let config = Config::default();
    Conf {
        window_title: WINDOW_TITLE.into(),
        fullscreen: false,
        sample_count: ANTIALIASING,
        window_width: config.window_width() as i32,
        window_height: config.window_height as i32,
        window_resizable: false,
        high_dpi: false,
        ..Default::default()
    }
}

async fn run(config: Config) -> Result<()> {
    config.validate()?;

    let font = match &config.font_path {
        Some(path) => Some(
            load_ttf_font(path)
                .await
                .map_err(|err| anyhow!("cannot load font {path}: {err:?}"))?,
        ),
        None => None,
    };

    let atlas = NoteAtlas::build(font.as_ref(), &config)?;
    let script = ScriptBuffer::open(
        &config.script.path,
        DEFAULT_WAVE_SCRIPT,
        config.script.max_len,
    )?;
    let font_size = config.gui.font_size;
    let mut app = App::new(
        config,
        &KeyboardLayout::default(),
        |pitch, octave| atlas.index_of(pitch, octave),
        script,
    )?;
    let mut events = MacroquadEvents::new();

    loop {
        events.gather();
        let real_time = Duration::from_secs_f64(get_time().max(0.0));
        app.frame(real_time, &mut events);
        if app.should_quit() {
            break;
        }

        render::draw_frame(app.notes(), &atlas, app.config());
        let panels = ui::describe(&app);
        for action in ui::evaluate(&panels, app.script_mut(), font_size) {
            app.apply(action);
        }
        if app.should_quit() {
            break;
        }

        next_frame().await;
    }

    log::info!(
        "window closed after {:.1}s of simulated time",
        app.simulated_time().as_secs_f32()
    );
    Ok(())
}
