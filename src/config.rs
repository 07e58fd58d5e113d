/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
/// Physics defaults are the tuning of the original game, in pixels and
/// frames at 60 Hz.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub physics: PhysicsConfig,
    pub gamepad: GamepadConfig,
    pub levels_dir: PathBuf,
    pub frame_ms: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsConfig {
    pub tile_size: f32,
    pub actor_width: f32,
    pub actor_height: f32,
    pub move_speed: f32,
    pub jump_impulse: f32,
    pub gravity: f32,
    pub max_fall_speed: f32,
    pub dash_frames: u32,
    pub dash_speed: f32,
    pub dash_decay: f32, // vx multiplier per dash frame
    pub epsilon: f32,    // wall clearance after a horizontal snap
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub dash: Vec<String>,
    pub confirm: Vec<String>,
    pub restart: Vec<String>,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        PhysicsConfig {
            tile_size: default_tile_size(),
            actor_width: default_actor_width(),
            actor_height: default_actor_height(),
            move_speed: default_move_speed(),
            jump_impulse: default_jump_impulse(),
            gravity: default_gravity(),
            max_fall_speed: default_max_fall(),
            dash_frames: default_dash_frames(),
            dash_speed: default_dash_speed(),
            dash_decay: default_dash_decay(),
            epsilon: default_epsilon(),
        }
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_tile_size")]
    tile_size: f32,
    #[serde(default = "default_actor_width")]
    actor_width: f32,
    #[serde(default = "default_actor_height")]
    actor_height: f32,
    #[serde(default = "default_move_speed")]
    move_speed: f32,
    #[serde(default = "default_jump_impulse")]
    jump_impulse: f32,
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_max_fall")]
    max_fall_speed: f32,
    #[serde(default = "default_dash_frames")]
    dash_frames: u32,
    #[serde(default = "default_dash_speed")]
    dash_speed: f32,
    #[serde(default = "default_dash_decay")]
    dash_decay: f32,
    #[serde(default = "default_epsilon")]
    epsilon: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_jump_buttons")]
    jump: Vec<String>,
    #[serde(default = "default_dash_buttons")]
    dash: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_restart")]
    restart: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_frame_ms")]
    frame_ms: u64,
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
}

// ── Defaults ──

fn default_tile_size() -> f32 { 32.0 }
fn default_actor_width() -> f32 { 22.0 }
fn default_actor_height() -> f32 { 26.0 }
fn default_move_speed() -> f32 { 3.0 }
fn default_jump_impulse() -> f32 { 9.5 }
fn default_gravity() -> f32 { 0.55 }
fn default_max_fall() -> f32 { 12.0 }
fn default_dash_frames() -> u32 { 10 }
fn default_dash_speed() -> f32 { 8.5 }
fn default_dash_decay() -> f32 { 0.98 }
fn default_epsilon() -> f32 { 0.001 }

fn default_jump_buttons() -> Vec<String> { vec!["A".into()] }
fn default_dash_buttons() -> Vec<String> { vec!["X".into(), "R1".into()] }
fn default_confirm() -> Vec<String> { vec!["Start".into()] }
fn default_restart() -> Vec<String> { vec!["Select".into()] }
fn default_frame_ms() -> u64 { 16 } // ~60 Hz
fn default_levels_dir() -> String { "levels".into() }

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            tile_size: default_tile_size(),
            actor_width: default_actor_width(),
            actor_height: default_actor_height(),
            move_speed: default_move_speed(),
            jump_impulse: default_jump_impulse(),
            gravity: default_gravity(),
            max_fall_speed: default_max_fall(),
            dash_frames: default_dash_frames(),
            dash_speed: default_dash_speed(),
            dash_decay: default_dash_decay(),
            epsilon: default_epsilon(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_jump_buttons(),
            dash: default_dash_buttons(),
            confirm: default_confirm(),
            restart: default_restart(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            frame_ms: default_frame_ms(),
            levels_dir: default_levels_dir(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::from_toml(toml_cfg, &search_dirs)
    }

    /// Parse config text directly (no filesystem search for config.toml).
    #[cfg(test)]
    fn from_toml_str(text: &str) -> Self {
        let toml_cfg = toml::from_str::<TomlConfig>(text).unwrap_or_default();
        Self::from_toml(toml_cfg, &[])
    }

    fn from_toml(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        // Resolve levels directory
        let levels_dir_str = &toml_cfg.general.levels_dir;
        let levels_dir = if PathBuf::from(levels_dir_str).is_absolute() {
            PathBuf::from(levels_dir_str)
        } else {
            search_dirs.iter()
                .map(|d| d.join(levels_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(levels_dir_str))
        };

        let p = toml_cfg.physics;
        let physics = PhysicsConfig {
            tile_size: p.tile_size,
            actor_width: p.actor_width,
            actor_height: p.actor_height,
            move_speed: p.move_speed,
            jump_impulse: p.jump_impulse,
            gravity: p.gravity,
            max_fall_speed: p.max_fall_speed,
            dash_frames: p.dash_frames,
            dash_speed: p.dash_speed,
            dash_decay: p.dash_decay,
            epsilon: p.epsilon,
        };

        GameConfig {
            physics: validated(physics),
            gamepad: GamepadConfig {
                jump: toml_cfg.gamepad.jump,
                dash: toml_cfg.gamepad.dash,
                confirm: toml_cfg.gamepad.confirm,
                restart: toml_cfg.gamepad.restart,
            },
            levels_dir,
            frame_ms: toml_cfg.general.frame_ms.max(1),
        }
    }
}

/// Reject tuning that would break the collision invariants: the actor must
/// be a positive box no larger than one tile, all rates finite, and no
/// per-frame displacement may reach a full tile, or a sweep could step
/// over a one-tile wall.
fn validated(p: PhysicsConfig) -> PhysicsConfig {
    let floats = [
        p.tile_size, p.actor_width, p.actor_height, p.move_speed, p.jump_impulse,
        p.gravity, p.max_fall_speed, p.dash_speed, p.dash_decay, p.epsilon,
    ];
    let geometry_ok = p.tile_size > 0.0
        && p.actor_width > 0.0
        && p.actor_height > 0.0
        && p.actor_width <= p.tile_size
        && p.actor_height <= p.tile_size;
    let below_tile = |v: f32| v < p.tile_size;
    let rates_ok = p.max_fall_speed > 0.0
        && p.move_speed >= 0.0
        && p.dash_speed >= 0.0
        && p.jump_impulse >= 0.0
        && [p.move_speed, p.dash_speed, p.jump_impulse, p.max_fall_speed]
            .into_iter()
            .all(below_tile)
        && p.gravity > 0.0
        && p.dash_decay > 0.0
        && p.dash_decay <= 1.0
        && p.epsilon >= 0.0
        && p.epsilon < p.tile_size;

    if floats.iter().all(|v| v.is_finite()) && geometry_ok && rates_ok {
        p
    } else {
        log::warn!("config.toml: invalid [physics] values {p:?}, using defaults");
        PhysicsConfig::default()
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => {
                        log::info!("loaded {}", path.display());
                        return cfg;
                    }
                    Err(e) => {
                        log::warn!("config.toml parse error: {e}; using default settings");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    log::warn!("could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
