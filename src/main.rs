/// Entry point and frame loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::time::{Duration, Instant};

use config::GameConfig;
use domain::entity::FrameInput;
use sim::event::GameEvent;
use sim::level;
use sim::session::{GameSession, GameState};
use ui::gamepad::GamepadState;
use ui::input::{self, InputState};
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const LOG_FILE: &str = "dashlite.log";

fn main() {
    init_logging();

    let config = GameConfig::load();
    let levels = level::load_levels(&config.levels_dir);
    let mut session = GameSession::new(levels, config.physics.clone());

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        let _ = renderer.cleanup();
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut session, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        log::error!("game loop failed: {e}");
        eprintln!("Game error: {e}");
    }
}

/// Log to a file in the temp directory; stdout belongs to the renderer.
/// Filter comes from `RUST_LOG`, default `warn`.
fn init_logging() {
    let path = std::env::temp_dir().join(LOG_FILE);
    let file = match File::create(&path) {
        Ok(f) => f,
        Err(_) => return,
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init();
}

fn game_loop(
    session: &mut GameSession,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = renderer.reports_key_release();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    if gp.connected {
        log::info!("gamepad detected at start-up");
    }

    let frame = Duration::from_millis(config.frame_ms);
    let mut next_frame = Instant::now();

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || kb.any_pressed(input::QUIT_KEYS) {
            break;
        }

        // Step before commands: a start key that is also a jump key is then
        // already in the edge cache when play begins.
        let events = session.step(frame_input(&kb, &gp));
        log_progress(&events);
        if let Some(sfx) = sound {
            sfx.play_events(&events);
        }
        handle_commands(session, &kb, &gp);

        renderer.render(session)?;

        // Fixed step: one simulation frame per `frame_ms`.
        next_frame += frame;
        let now = Instant::now();
        if next_frame > now {
            std::thread::sleep(next_frame - now);
        } else {
            next_frame = now;
        }
    }

    Ok(())
}

fn log_progress(events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::LevelCleared { index } => log::debug!("level {} cleared", index + 1),
            GameEvent::LevelLoaded { index } => log::debug!("level {} on screen", index + 1),
            _ => {}
        }
    }
}

/// Session commands bound to menu keys.
fn handle_commands(session: &mut GameSession, kb: &InputState, gp: &GamepadState) {
    if kb.any_pressed(input::RESTART_KEYS) || gp.restart_pressed() {
        session.restart_game();
        return;
    }
    if session.state == GameState::Start
        && (kb.any_pressed(input::START_KEYS) || gp.confirm_pressed())
    {
        session.start_game();
    }
}

/// Keyboard and gamepad merged into one frame of buttons.
fn frame_input(kb: &InputState, gp: &GamepadState) -> FrameInput {
    let keys = kb.frame_input();
    FrameInput {
        move_left: keys.move_left || gp.left_held(),
        move_right: keys.move_right || gp.right_held(),
        jump_held: keys.jump_held || gp.jump_held(),
        dash_held: keys.dash_held || gp.dash_held(),
    }
}
