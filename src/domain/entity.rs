/// Input types and small shared enums.
///
/// Movement is continuous (held keys). Jump and dash are one-shot actions
/// fired on the rising edge of their button, so the snapshot carries the
/// previous frame's state for those two buttons alongside the current one.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

/// Raw per-frame button state supplied by the host.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct FrameInput {
    pub move_left: bool,
    pub move_right: bool,
    pub jump_held: bool,
    pub dash_held: bool,
}

/// Previous-frame state of the edge-triggered buttons.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct EdgeCache {
    pub jump_held: bool,
    pub dash_held: bool,
}

impl EdgeCache {
    /// Seed from a raw input so buttons already held do not count as pressed.
    pub fn from_input(input: &FrameInput) -> Self {
        EdgeCache { jump_held: input.jump_held, dash_held: input.dash_held }
    }
}

/// Frame-local input snapshot: current buttons plus previous jump/dash.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct InputSnapshot {
    pub now: FrameInput,
    pub prev: EdgeCache,
}

impl InputSnapshot {
    pub fn new(now: FrameInput, prev: EdgeCache) -> Self {
        InputSnapshot { now, prev }
    }

    /// Horizontal intent: -1, 0 or +1. Opposing keys cancel.
    pub fn intent(&self) -> i8 {
        self.now.move_right as i8 - self.now.move_left as i8
    }

    pub fn jump_triggered(&self) -> bool {
        self.now.jump_held && !self.prev.jump_held
    }

    pub fn dash_triggered(&self) -> bool {
        self.now.dash_held && !self.prev.dash_held
    }

    /// Edge cache to carry into the next frame.
    pub fn carry(&self) -> EdgeCache {
        EdgeCache::from_input(&self.now)
    }
}

/// Dash subsystem state, derived from actor fields (never stored).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DashPhase {
    GroundedArmed,
    AirborneArmed,
    Dashing,
    AirborneSpent,
}
