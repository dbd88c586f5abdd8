//! Game progression state machine
//!
//! Modes form a cyclic machine with no terminal state: even `GameComplete`
//! acknowledgment loops back to aiming (with the level index and score
//! reset). The transition table lives here, separate from any UI side
//! effects - collaborators derive overlay copy from the (mode, level,
//! score) tuple, the engine never produces text.
//!
//! There is no lives system: a miss always lands in `LevelRestart`, which
//! replays the same level on acknowledgment.

use serde::{Deserialize, Serialize};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Fresh session, nothing moving yet
    Ready,
    /// Ball rests on the paddle; aim angle tracks the input target
    Aiming,
    /// Ball in flight
    Playing,
    /// Board cleared below the final level; awaiting acknowledgment
    LevelComplete,
    /// Kept for collaborator-facing parity; the engine itself never emits
    /// this (a miss restarts the level instead of ending the game)
    GameOver,
    /// Final level cleared
    GameComplete,
    /// Ball crossed the bottom boundary; same level replays on ack
    LevelRestart,
}

impl Mode {
    /// True while the simulation step advances entities
    pub fn is_stepping(self) -> bool {
        matches!(self, Mode::Aiming | Mode::Playing)
    }

    /// True when an overlay is waiting for explicit acknowledgment
    pub fn awaits_ack(self) -> bool {
        matches!(
            self,
            Mode::LevelComplete | Mode::LevelRestart | Mode::GameComplete | Mode::GameOver
        )
    }
}

/// Events that drive mode transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeEvent {
    /// Explicit start command from the session owner
    Start,
    /// Launch trigger while the ball rests on the paddle
    Launch,
    /// Block list became empty
    BoardCleared { last_level: bool },
    /// Ball crossed the bottom boundary
    Miss,
    /// Overlay acknowledgment
    Acknowledge,
}

/// The transition table. Returns `None` for pairs with no defined
/// transition; callers treat that as "stay put".
pub fn transition(mode: Mode, event: ModeEvent) -> Option<Mode> {
    match (mode, event) {
        (Mode::Ready, ModeEvent::Start) => Some(Mode::Aiming),
        (Mode::Aiming, ModeEvent::Launch) => Some(Mode::Playing),
        (Mode::Playing, ModeEvent::BoardCleared { last_level: false }) => Some(Mode::LevelComplete),
        (Mode::Playing, ModeEvent::BoardCleared { last_level: true }) => Some(Mode::GameComplete),
        (Mode::Playing, ModeEvent::Miss) => Some(Mode::LevelRestart),
        (m, ModeEvent::Acknowledge) if m.awaits_ack() => Some(Mode::Aiming),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let m = transition(Mode::Ready, ModeEvent::Start).unwrap();
        assert_eq!(m, Mode::Aiming);
        let m = transition(m, ModeEvent::Launch).unwrap();
        assert_eq!(m, Mode::Playing);
        let m = transition(m, ModeEvent::BoardCleared { last_level: false }).unwrap();
        assert_eq!(m, Mode::LevelComplete);
        let m = transition(m, ModeEvent::Acknowledge).unwrap();
        assert_eq!(m, Mode::Aiming);
    }

    #[test]
    fn test_final_level_completes_game() {
        assert_eq!(
            transition(Mode::Playing, ModeEvent::BoardCleared { last_level: true }),
            Some(Mode::GameComplete)
        );
    }

    #[test]
    fn test_miss_restarts_level() {
        assert_eq!(
            transition(Mode::Playing, ModeEvent::Miss),
            Some(Mode::LevelRestart)
        );
        assert_eq!(
            transition(Mode::LevelRestart, ModeEvent::Acknowledge),
            Some(Mode::Aiming)
        );
    }

    #[test]
    fn test_undefined_pairs_stay_put() {
        assert_eq!(transition(Mode::Ready, ModeEvent::Launch), None);
        assert_eq!(transition(Mode::Aiming, ModeEvent::Miss), None);
        assert_eq!(transition(Mode::Playing, ModeEvent::Start), None);
        assert_eq!(transition(Mode::LevelComplete, ModeEvent::Launch), None);
    }

    #[test]
    fn test_machine_is_cyclic() {
        // Every ack-waiting mode returns to aiming, including GameComplete
        for m in [
            Mode::LevelComplete,
            Mode::LevelRestart,
            Mode::GameComplete,
            Mode::GameOver,
        ] {
            assert_eq!(transition(m, ModeEvent::Acknowledge), Some(Mode::Aiming));
        }
    }
}
