/// GameSession: the single owner of everything a running game mutates.
///
/// ## State machine
///
/// ```text
///   Start --start_game--> Play --last goal--> Win
///     ^                    |                   |
///     +----restart_game----+-------------------+
/// ```
///
/// Start and Win run no physics. `step` still records the frame's input in
/// those states so the edge cache is current when play begins.
///
/// ## Level load
///
/// `load_level` swaps the grid, re-resolves the spawn, re-seeds the edge
/// cache from the last seen input (a key held across the load does not
/// fire again), respawns the actor and runs the recovery guard once.

use crate::config::PhysicsConfig;
use crate::domain::actor::Actor;
use crate::domain::entity::{EdgeCache, FrameInput};
use crate::domain::grid::TileGrid;
use crate::domain::spawn::{self, SpawnPoint};
use super::event::GameEvent;
use super::level::{self, LevelDef};
use super::recovery;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameState {
    Start,
    Play,
    Win,
}

pub struct GameSession {
    // ── Level data ──
    pub(super) levels: Vec<LevelDef>,
    pub current_level: usize,
    pub grid: TileGrid,
    pub spawn: SpawnPoint,

    // ── Entities ──
    pub actor: Actor,

    // ── Meta ──
    pub state: GameState,
    pub(super) physics: PhysicsConfig,

    // ── Input edge detection ──
    pub(super) edges: EdgeCache,
    pub(super) last_input: FrameInput,

    /// Events raised by commands between frames, drained by the next `step`.
    pub(super) pending: Vec<GameEvent>,
}

// ── Construction ──

impl GameSession {
    /// New session on the Start screen with level 0 loaded.
    /// An empty level list falls back to the built-in levels.
    pub fn new(levels: Vec<LevelDef>, physics: PhysicsConfig) -> Self {
        let levels = if levels.is_empty() { level::embedded_levels() } else { levels };
        let mut session = GameSession {
            grid: TileGrid::from_codes(&[], physics.tile_size),
            spawn: SpawnPoint { x: physics.tile_size, y: physics.tile_size },
            actor: Actor::new(physics.actor_width, physics.actor_height),
            levels,
            current_level: 0,
            state: GameState::Start,
            physics,
            edges: EdgeCache::default(),
            last_input: FrameInput::default(),
            pending: Vec::new(),
        };
        session.load_level(0);
        session
    }
}

// ── Commands ──

impl GameSession {
    pub fn load_level(&mut self, index: usize) {
        self.current_level = index.min(self.levels.len().saturating_sub(1));
        self.grid = TileGrid::from_codes(&self.levels[self.current_level].codes, self.physics.tile_size);
        self.spawn = spawn::resolve(&self.grid, self.actor.w, self.actor.h);

        self.edges = EdgeCache::from_input(&self.last_input);

        self.respawn();
        if recovery::guard(&mut self.actor, &self.grid, &mut self.spawn) {
            self.pending.push(GameEvent::Recovered);
        }

        let (rows, cols) = self.grid.dimensions();
        log::info!(
            "level {} loaded: \"{}\" ({cols}x{rows}), spawn ({:.1}, {:.1})",
            self.current_level + 1, self.level_name(), self.spawn.x, self.spawn.y,
        );
        self.pending.push(GameEvent::LevelLoaded { index: self.current_level });
    }

    pub fn respawn(&mut self) {
        self.actor.respawn(self.spawn, &self.grid);
        log::debug!("respawn at ({:.1}, {:.1})", self.actor.x, self.actor.y);
    }

    /// Start -> Play. Ignored in any other state.
    pub fn start_game(&mut self) {
        if self.state == GameState::Start {
            self.state = GameState::Play;
            log::info!("game started");
        }
    }

    /// Back to the Start screen with level 0 reloaded.
    pub fn restart_game(&mut self) {
        self.state = GameState::Start;
        log::info!("game restarted");
        self.load_level(0);
    }

    /// The current level is cleared: load the next one, or win.
    pub fn advance(&mut self) {
        let cleared = self.current_level;
        if cleared + 1 < self.levels.len() {
            self.pending.push(GameEvent::LevelCleared { index: cleared });
            self.load_level(cleared + 1);
        } else {
            self.state = GameState::Win;
            self.pending.push(GameEvent::GameWon);
            log::info!("all {} levels cleared", self.levels.len());
        }
    }

    /// Run one frame. See `sim::step`.
    pub fn step(&mut self, input: FrameInput) -> Vec<GameEvent> {
        super::step::step(self, input)
    }
}

// ── Queries ──

impl GameSession {
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn level_name(&self) -> &str {
        &self.levels[self.current_level].name
    }

    pub fn can_dash(&self) -> bool {
        self.actor.can_dash
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::DashPhase;

    fn def(name: &str, rows: &[&str]) -> LevelDef {
        LevelDef {
            name: name.to_string(),
            codes: rows.iter().map(|r| r.bytes().map(|b| b - b'0').collect()).collect(),
        }
    }

    /// Solid border, spawn at (1,1), goal at (1,22), flat floor under row 1.
    fn corridor(name: &str) -> LevelDef {
        def(name, &[
            "111111111111111111111111",
            "140000000000000000000031",
            "111111111111111111111111",
        ])
    }

    fn right() -> FrameInput {
        FrameInput { move_right: true, ..Default::default() }
    }

    fn playing(levels: Vec<LevelDef>) -> GameSession {
        let mut s = GameSession::new(levels, PhysicsConfig::default());
        s.start_game();
        s
    }

    /// Step until the predicate holds, bounded.
    fn run_until(s: &mut GameSession, input: FrameInput, mut done: impl FnMut(&GameSession) -> bool) -> usize {
        for frame in 1..=2000 {
            s.step(input);
            if done(s) {
                return frame;
            }
        }
        panic!("condition not reached in 2000 frames");
    }

    #[test]
    fn new_session_waits_on_start_screen() {
        let mut s = GameSession::new(vec![corridor("A")], PhysicsConfig::default());
        assert_eq!(s.state, GameState::Start);
        assert_eq!(s.current_level, 0);
        assert_eq!(s.spawn, SpawnPoint { x: 32.0 + 5.0, y: 32.0 + 6.0 });

        let before = s.actor.clone();
        for _ in 0..10 {
            s.step(right());
        }
        assert_eq!(s.actor, before);
    }

    #[test]
    fn empty_level_list_uses_builtins() {
        let s = GameSession::new(vec![], PhysicsConfig::default());
        assert_eq!(s.level_count(), 2);
        assert_eq!(s.level_name(), "Level 1");
    }

    #[test]
    fn load_level_clamps_index() {
        let mut s = GameSession::new(vec![corridor("A"), corridor("B")], PhysicsConfig::default());
        s.load_level(99);
        assert_eq!(s.current_level, 1);
        assert_eq!(s.level_name(), "B");
    }

    #[test]
    fn start_only_leaves_start() {
        let mut s = playing(vec![corridor("A")]);
        assert_eq!(s.state, GameState::Play);
        s.state = GameState::Win;
        s.start_game();
        assert_eq!(s.state, GameState::Win);
    }

    #[test]
    fn scenario_a_single_level_walk_to_goal_wins() {
        let mut s = playing(vec![corridor("A")]);
        run_until(&mut s, right(), |s| s.state != GameState::Play);
        assert_eq!(s.state, GameState::Win);

        let events = s.step(right());
        assert!(events.is_empty());
        let frozen = s.actor.clone();
        s.step(right());
        assert_eq!(s.actor, frozen, "no physics after the win");
    }

    #[test]
    fn scenario_a_multi_level_walk_to_goal_advances() {
        let mut s = playing(vec![corridor("A"), corridor("B")]);
        run_until(&mut s, right(), |s| s.current_level == 1);
        assert_eq!(s.state, GameState::Play);
        assert_eq!(s.actor.x, s.spawn.x);
        assert_eq!(s.actor.vx, 0.0);

        // Clearing the final level wins.
        run_until(&mut s, right(), |s| s.state == GameState::Win);
    }

    #[test]
    fn goal_frame_reports_clear_and_load() {
        let mut s = playing(vec![corridor("A"), corridor("B")]);
        let mut events = vec![];
        for _ in 0..2000 {
            events = s.step(right());
            if s.current_level == 1 {
                break;
            }
        }
        assert!(events.contains(&GameEvent::LevelCleared { index: 0 }));
        assert!(events.contains(&GameEvent::LevelLoaded { index: 1 }));
    }

    #[test]
    fn scenario_b_hazard_resets_within_frame() {
        let mut s = playing(vec![def("spikes", &[
            "11111111",
            "14002031",
            "11111111",
        ])]);
        let mut hit = false;
        for _ in 0..500 {
            let events = s.step(right());
            if events.contains(&GameEvent::HazardHit) {
                hit = true;
                break;
            }
        }
        assert!(hit);

        let mut expected = Actor::new(22.0, 26.0);
        expected.facing = s.actor.facing;
        expected.respawn(s.spawn, &s.grid);
        assert_eq!(s.actor, expected);
        assert_eq!(s.current_level, 0);
        assert_eq!(s.state, GameState::Play);
    }

    #[test]
    fn scenario_c_no_spawn_uses_first_empty() {
        let s = GameSession::new(vec![def("nospawn", &[
            "11111",
            "11101",
            "10001",
            "11111",
        ])], PhysicsConfig::default());
        // First '0' in row-major order is (1,3).
        assert_eq!(s.spawn, SpawnPoint { x: 96.0 + 5.0, y: 32.0 + 6.0 });
        assert_eq!((s.actor.x, s.actor.y), (s.spawn.x, s.spawn.y));
    }

    #[test]
    fn scenario_d_airborne_dash_without_intent_uses_facing() {
        let mut s = playing(vec![def("room", &[
            "111111111111",
            "100000000001",
            "100000000001",
            "100000000001",
            "100040000001",
            "111111111111",
        ])]);
        // Face left, then settle on the floor.
        let left = FrameInput { move_left: true, ..Default::default() };
        s.step(left);
        run_until(&mut s, FrameInput::default(), |s| s.actor.on_ground);

        s.step(FrameInput { jump_held: true, ..Default::default() });
        assert!(!s.actor.on_ground);
        s.step(FrameInput::default());

        s.step(FrameInput { dash_held: true, ..Default::default() });
        assert_eq!(s.actor.vx, -8.5 * 0.98);
        assert_eq!(s.actor.dash_phase(), DashPhase::Dashing);
    }

    #[test]
    fn dash_charge_stays_spent_until_ground() {
        let mut s = playing(vec![def("room", &[
            "111111111111",
            "100000000001",
            "100000000001",
            "100000000001",
            "100000000001",
            "100000000001",
            "100000400001",
            "111111111111",
        ])]);
        run_until(&mut s, FrameInput::default(), |s| s.actor.on_ground);
        assert!(s.can_dash());

        s.step(FrameInput { jump_held: true, ..Default::default() });
        s.step(FrameInput { dash_held: true, ..Default::default() });
        assert!(!s.can_dash());

        let mut frames = 0;
        while !s.actor.on_ground {
            assert!(!s.can_dash(), "charge re-armed mid-air");
            s.step(FrameInput::default());
            frames += 1;
            assert!(frames < 500);
        }
        assert!(s.can_dash());
    }

    #[test]
    fn landing_in_final_goal_rearms_dash() {
        let mut s = playing(vec![def("end", &["11111", "14031", "11111"])]);
        // Charge spent by an earlier air dash, about to touch down on the goal.
        s.actor.x = 101.0;
        s.actor.y = 37.7;
        s.actor.can_dash = false;

        let events = s.step(FrameInput::default());
        assert!(events.contains(&GameEvent::GameWon));
        assert_eq!(s.state, GameState::Win);
        assert!(s.actor.on_ground);
        assert!(s.can_dash());
    }

    #[test]
    fn held_jump_across_level_load_does_not_fire() {
        let mut s = playing(vec![corridor("A"), corridor("B")]);
        let held = FrameInput { move_right: true, jump_held: true, ..Default::default() };
        run_until(&mut s, held, |s| s.current_level == 1);

        run_until(&mut s, held, |s| s.actor.on_ground);
        let events = s.step(held);
        assert!(!events.contains(&GameEvent::Jumped));
        assert!(s.actor.on_ground);
    }

    #[test]
    fn start_key_does_not_jump_on_first_frame() {
        let mut s = GameSession::new(vec![corridor("A")], PhysicsConfig::default());
        let space = FrameInput { jump_held: true, ..Default::default() };
        s.step(space);
        s.start_game();
        run_until(&mut s, space, |s| s.actor.on_ground);
        let events = s.step(space);
        assert!(!events.contains(&GameEvent::Jumped));
    }

    #[test]
    fn restart_returns_to_start_on_level_zero() {
        let mut s = playing(vec![corridor("A"), corridor("B")]);
        run_until(&mut s, right(), |s| s.current_level == 1);
        s.restart_game();
        assert_eq!(s.state, GameState::Start);
        assert_eq!(s.current_level, 0);
        assert_eq!((s.actor.x, s.actor.y), (s.spawn.x, s.spawn.y));
    }

    #[test]
    fn respawn_is_idempotent() {
        let mut s = playing(vec![corridor("A")]);
        for _ in 0..20 {
            s.step(right());
        }
        s.respawn();
        let once = s.actor.clone();
        s.respawn();
        assert_eq!(s.actor, once);
    }

    #[test]
    fn nan_actor_is_recovered_before_physics() {
        let mut s = playing(vec![corridor("A")]);
        s.actor.x = f32::NAN;
        let events = s.step(FrameInput::default());
        assert!(events.contains(&GameEvent::Recovered));
        assert!(s.actor.x.is_finite());
        assert!(recovery::actor_is_valid(&s.actor, &s.grid));
    }

    #[test]
    fn builtin_levels_are_loadable() {
        let mut s = GameSession::new(vec![], PhysicsConfig::default());
        for i in 0..s.level_count() {
            s.load_level(i);
            assert_eq!(s.grid.dimensions(), (16, 24));
            assert_eq!(s.spawn, SpawnPoint { x: 37.0, y: 38.0 });
        }
    }
}
