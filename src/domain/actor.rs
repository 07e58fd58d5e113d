/// The controllable actor and its per-frame controller.
///
/// ## Frame order
///
///   1. Horizontal intent from input; facing follows any non-zero intent
///   2. Rising edges for jump and dash
///   3. Dash trigger (needs a charge): fixed-speed burst, charge spent
///   4. Active dash: timer ticks down, vx decays, gravity and jump suspended
///   5. Otherwise: walk, jump from the ground, gravity up to terminal speed
///   6. Collision: X sweep, then Y sweep (Y sweep owns `on_ground`)
///   7. Contact: hazard beats goal
///   8. Grounded frames re-arm the dash, whatever the contact
///
/// Hazard and goal contact are reported, not acted on: the session owns
/// respawn and level changes.
///
/// ## Dash charge
///
/// `can_dash` is re-armed on every frame that ends on the ground, not only
/// on the landing frame. A dash started from the ground spends the charge
/// and clears `on_ground` (vy stays 0, so the Y sweep finds no floor), so the
/// charge stays spent until the dash ends and the actor lands again.

use crate::config::PhysicsConfig;

use super::collision::{self, Rect};
use super::entity::{DashPhase, Facing, InputSnapshot};
use super::grid::TileGrid;
use super::spawn::{self, SpawnPoint};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Contact {
    None,
    Hazard,
    Goal,
}

/// What happened to the actor during one frame.
#[derive(Clone, Copy, Debug)]
pub struct StepOutcome {
    pub contact: Contact,
    pub jumped: bool,
    pub dashed: bool,
    pub landed: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Actor {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub w: f32,
    pub h: f32,
    pub facing: Facing,
    pub on_ground: bool,
    pub can_dash: bool,
    /// Frames left in the active dash; 0 = not dashing.
    pub dash_timer: u32,
}

impl Actor {
    pub fn new(w: f32, h: f32) -> Self {
        Actor {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            w,
            h,
            facing: Facing::Right,
            on_ground: false,
            can_dash: true,
            dash_timer: 0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    /// Reset to the spawn point: motion and dash state cleared, charge
    /// restored, position clamped into the world. Facing is kept.
    pub fn respawn(&mut self, at: SpawnPoint, grid: &TileGrid) {
        let (x, y) = spawn::clamp_to_world(grid, at.x, at.y, self.w, self.h);
        self.x = x;
        self.y = y;
        self.vx = 0.0;
        self.vy = 0.0;
        self.dash_timer = 0;
        self.can_dash = true;
        self.on_ground = false;
    }

    pub fn is_dashing(&self) -> bool {
        self.dash_timer > 0
    }

    pub fn dash_phase(&self) -> DashPhase {
        if self.is_dashing() {
            DashPhase::Dashing
        } else if !self.can_dash {
            DashPhase::AirborneSpent
        } else if self.on_ground {
            DashPhase::GroundedArmed
        } else {
            DashPhase::AirborneArmed
        }
    }

    /// Run one frame of actor physics against `grid`.
    pub fn advance(&mut self, grid: &TileGrid, input: &InputSnapshot, cfg: &PhysicsConfig) -> StepOutcome {
        let was_grounded = self.on_ground;
        let mut jumped = false;
        let mut dashed = false;

        let intent = input.intent();
        if intent < 0 {
            self.facing = Facing::Left;
        } else if intent > 0 {
            self.facing = Facing::Right;
        }

        if input.dash_triggered() && self.can_dash {
            let dir = if intent != 0 { intent as f32 } else { self.facing.sign() };
            self.dash_timer = cfg.dash_frames;
            self.vx = dir * cfg.dash_speed;
            self.vy = 0.0;
            self.can_dash = false;
            dashed = true;
        }

        if self.dash_timer > 0 {
            self.dash_timer -= 1;
            self.vx *= cfg.dash_decay;
        } else {
            self.vx = intent as f32 * cfg.move_speed;
            if input.jump_triggered() && self.on_ground {
                self.vy = -cfg.jump_impulse;
                self.on_ground = false;
                jumped = true;
            }
            self.vy = (self.vy + cfg.gravity).min(cfg.max_fall_speed);
        }

        let mut rect = self.rect();
        collision::sweep_x(grid, &mut rect, &mut self.vx, cfg.epsilon);
        self.on_ground = collision::sweep_y(grid, &mut rect, &mut self.vy);
        self.x = rect.x;
        self.y = rect.y;

        let landed = self.on_ground && !was_grounded;
        let contact = self.contact(grid);
        // Re-armed on every grounded frame, goal frames included.
        if self.on_ground {
            self.can_dash = true;
        }

        StepOutcome { contact, jumped, dashed, landed }
    }

    /// Hazard takes precedence over goal when both are touched.
    pub fn contact(&self, grid: &TileGrid) -> Contact {
        let rect = self.rect();
        if collision::touches(grid, &rect, |t| t.is_hazard()) {
            Contact::Hazard
        } else if collision::touches(grid, &rect, |t| t.is_goal()) {
            Contact::Goal
        } else {
            Contact::None
        }
    }
}
