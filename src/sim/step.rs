/// The step function: advances the session by one frame.
///
/// Processing order (Play only):
///   1. Recovery guard (invalid actor -> safe respawn)
///   2. Input snapshot from this frame's buttons + previous edge cache
///   3. Actor physics: intent, dash, walk/jump/gravity, X sweep, Y sweep
///   4. Contact: hazard -> respawn; goal -> next level or win
///
/// Start and Win only record the input. Events raised by session commands
/// since the previous frame are returned first.

use crate::domain::actor::Contact;
use crate::domain::entity::{EdgeCache, FrameInput, InputSnapshot};
use super::event::GameEvent;
use super::recovery;
use super::session::{GameSession, GameState};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(session: &mut GameSession, input: FrameInput) -> Vec<GameEvent> {
    let mut events = std::mem::take(&mut session.pending);
    session.last_input = input;

    if session.state != GameState::Play {
        session.edges = EdgeCache::from_input(&input);
        return events;
    }

    if recovery::guard(&mut session.actor, &session.grid, &mut session.spawn) {
        events.push(GameEvent::Recovered);
    }

    let snapshot = InputSnapshot::new(input, session.edges);
    session.edges = snapshot.carry();

    let outcome = session.actor.advance(&session.grid, &snapshot, &session.physics);
    if outcome.dashed {
        log::debug!("dash {:?} from ({:.1}, {:.1})", session.actor.facing, session.actor.x, session.actor.y);
        events.push(GameEvent::Dashed);
    }
    if outcome.jumped {
        events.push(GameEvent::Jumped);
    }
    if outcome.landed {
        events.push(GameEvent::Landed);
    }

    match outcome.contact {
        Contact::Hazard => {
            session.respawn();
            events.push(GameEvent::HazardHit);
        }
        Contact::Goal => session.advance(),
        Contact::None => {}
    }

    events.append(&mut session.pending);
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConfig;
    use crate::sim::level::LevelDef;

    fn session(rows: &[&str]) -> GameSession {
        let def = LevelDef {
            name: "t".into(),
            codes: rows.iter().map(|r| r.bytes().map(|b| b - b'0').collect()).collect(),
        };
        let mut s = GameSession::new(vec![def], PhysicsConfig::default());
        s.start_game();
        s
    }

    fn room() -> GameSession {
        session(&[
            "11111111",
            "10000001",
            "10000001",
            "10040001",
            "11111111",
        ])
    }

    #[test]
    fn command_events_are_delivered_on_next_frame() {
        let mut s = room();
        let first = s.step(FrameInput::default());
        assert_eq!(first[0], GameEvent::LevelLoaded { index: 0 });
        let second = s.step(FrameInput::default());
        assert!(!second.contains(&GameEvent::LevelLoaded { index: 0 }));
    }

    #[test]
    fn landing_then_jump_events() {
        let mut s = room();
        let events = s.step(FrameInput::default());
        assert!(events.contains(&GameEvent::Landed));

        let events = s.step(FrameInput { jump_held: true, ..Default::default() });
        assert_eq!(events, vec![GameEvent::Jumped]);
        assert!(s.actor.vy < 0.0);
    }

    #[test]
    fn holding_jump_fires_once() {
        let mut s = room();
        s.step(FrameInput::default());
        let jump = FrameInput { jump_held: true, ..Default::default() };
        let mut jumps = 0;
        for _ in 0..120 {
            jumps += s.step(jump).iter().filter(|e| **e == GameEvent::Jumped).count();
        }
        assert_eq!(jumps, 1);
    }

    #[test]
    fn dash_event_and_single_charge() {
        let mut s = room();
        s.step(FrameInput::default());
        s.step(FrameInput { jump_held: true, ..Default::default() });

        let dash = FrameInput { dash_held: true, ..Default::default() };
        assert!(s.step(dash).contains(&GameEvent::Dashed));
        s.step(FrameInput::default());
        assert!(!s.step(dash).contains(&GameEvent::Dashed), "charge already spent");
    }

    #[test]
    fn win_state_only_records_input() {
        let mut s = room();
        s.state = GameState::Win;
        let before = s.actor.clone();
        let held = FrameInput { jump_held: true, dash_held: true, ..Default::default() };
        s.step(FrameInput::default());
        assert!(s.step(held).is_empty());
        assert_eq!(s.actor, before);
        assert_eq!(s.edges, EdgeCache { jump_held: true, dash_held: true });
    }

    #[test]
    fn hazard_overlap_respawns_exactly() {
        let mut s = session(&[
            "1111111",
            "1000001",
            "1000001",
            "1040201",
            "1111111",
        ]);
        let right = FrameInput { move_right: true, ..Default::default() };
        let mut hit = false;
        for _ in 0..200 {
            if s.step(right).contains(&GameEvent::HazardHit) {
                hit = true;
                break;
            }
        }
        assert!(hit);
        assert_eq!((s.actor.x, s.actor.y), (s.spawn.x, s.spawn.y));
        assert_eq!((s.actor.vx, s.actor.vy), (0.0, 0.0));
        assert_eq!(s.actor.dash_timer, 0);
        assert!(s.actor.can_dash);
    }
}
