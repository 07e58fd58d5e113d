/// Tile types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.
///
/// Only `Solid` blocks movement. Spawn and goal markers are open space
/// the actor can stand in; hazards hurt on contact but never push back.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Tile {
    #[default]
    Empty,
    Solid,
    Hazard, // Spikes: respawn on contact
    Goal,   // Level exit
    Spawn,  // Designated start cell
}

impl Tile {
    /// Decode a level tile code. Codes outside 0..=4 read as empty air.
    pub fn from_code(code: u8) -> Tile {
        match code {
            1 => Tile::Solid,
            2 => Tile::Hazard,
            3 => Tile::Goal,
            4 => Tile::Spawn,
            _ => Tile::Empty,
        }
    }

    /// Does this tile block the actor? (the only collidable tile)
    pub fn is_solid(self) -> bool {
        matches!(self, Tile::Solid)
    }

    pub fn is_hazard(self) -> bool {
        matches!(self, Tile::Hazard)
    }

    pub fn is_goal(self) -> bool {
        matches!(self, Tile::Goal)
    }

    pub fn is_spawn(self) -> bool {
        matches!(self, Tile::Spawn)
    }

    pub fn is_empty(self) -> bool {
        matches!(self, Tile::Empty)
    }
}
