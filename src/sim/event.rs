/// Events emitted during a simulation step or session command.
/// The host consumes these for sound and progress logging; no game logic
/// reads them.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameEvent {
    Jumped,
    Dashed,
    Landed,
    HazardHit,
    LevelCleared { index: usize },
    LevelLoaded { index: usize },
    GameWon,
    Recovered,
}
