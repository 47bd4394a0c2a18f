use serde::{Deserialize, Serialize};

/// Lifecycle phase of a battle.
///
/// ```text
/// idle -> initializing -> round_start -> preparation -> execution -> round_end
///                              ^                                         |
///                              +------------------------------------------+-> completed
/// ```
/// Any active phase may fall into the terminal `error`. Only `reset` leaves
/// `completed` or `error`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BattlePhase {
    #[default]
    Idle,
    Initializing,
    RoundStart,
    Preparation,
    Execution,
    RoundEnd,
    Completed,
    Error,
}

impl BattlePhase {
    pub fn can_transition(self, to: BattlePhase) -> bool {
        use BattlePhase::*;
        matches!(
            (self, to),
            (Idle, Initializing)
                | (Initializing, RoundStart)
                | (RoundStart, Preparation)
                | (Preparation, Execution)
                | (Execution, RoundEnd)
                | (RoundEnd, RoundStart)
                | (RoundEnd, Completed)
        ) || (to == Error && self.is_active())
    }

    /// Phases between a successful `initialize` and the end of the battle.
    pub fn is_active(self) -> bool {
        !matches!(
            self,
            BattlePhase::Idle | BattlePhase::Completed | BattlePhase::Error
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BattlePhase::Completed | BattlePhase::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_the_declared_graph() {
        assert!(BattlePhase::Idle.can_transition(BattlePhase::Initializing));
        assert!(BattlePhase::RoundEnd.can_transition(BattlePhase::RoundStart));
        assert!(!BattlePhase::Preparation.can_transition(BattlePhase::RoundEnd));
        assert!(!BattlePhase::Idle.can_transition(BattlePhase::Preparation));
        assert!(!BattlePhase::Completed.can_transition(BattlePhase::RoundStart));
    }

    #[test]
    fn only_active_phases_fail() {
        assert!(BattlePhase::Execution.can_transition(BattlePhase::Error));
        assert!(!BattlePhase::Idle.can_transition(BattlePhase::Error));
        assert!(!BattlePhase::Error.can_transition(BattlePhase::Error));
    }

    #[test]
    fn displays_snake_case() {
        assert_eq!(BattlePhase::RoundStart.to_string(), "round_start");
    }
}
