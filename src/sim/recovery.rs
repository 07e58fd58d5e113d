/// Recovery guard: invariant restoration for the actor.
///
/// Runs before physics on every playing frame and once after each level
/// load. An actor whose position or velocity is not finite, or whose
/// position lies more than one tile outside the world, is moved to the
/// first empty cell of the level and respawned there. That point also
/// becomes the level's spawn from then on.

use crate::domain::actor::Actor;
use crate::domain::grid::TileGrid;
use crate::domain::spawn::{self, SpawnPoint};

/// Is the actor in a state physics can continue from?
pub fn actor_is_valid(actor: &Actor, grid: &TileGrid) -> bool {
    let finite = actor.x.is_finite()
        && actor.y.is_finite()
        && actor.vx.is_finite()
        && actor.vy.is_finite();
    if !finite {
        return false;
    }

    let ts = grid.tile_size();
    let (ww, wh) = grid.world_size();
    actor.x >= -ts && actor.x <= ww + ts && actor.y >= -ts && actor.y <= wh + ts
}

/// Force a safe respawn if the actor is invalid. Returns true if it acted.
pub fn guard(actor: &mut Actor, grid: &TileGrid, spawn: &mut SpawnPoint) -> bool {
    if actor_is_valid(actor, grid) {
        return false;
    }

    log::warn!(
        "actor recovered from invalid state: pos=({}, {}) vel=({}, {})",
        actor.x, actor.y, actor.vx, actor.vy,
    );
    *spawn = spawn::first_empty(grid, actor.w, actor.h);
    actor.respawn(*spawn, grid);
    true
}
