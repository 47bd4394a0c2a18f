//! Terminal battle results and reward computation.

use super::{BattleUnit, Team};

/// Outcome from the player's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ResultKind {
    Victory,
    Defeat,
    Draw,
}

/// Why the battle ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum EndReason {
    AllEnemiesDefeated,
    AllPlayersDefeated,
    /// Both sides were wiped in the same pass; reported as a defeat.
    MutualDefeat,
    RoundLimitReached,
}

/// Experience and gold granted on victory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rewards {
    pub experience: u32,
    pub gold: u32,
}

impl Rewards {
    pub const EXPERIENCE_PER_LEVEL: u32 = 10;
    pub const GOLD_PER_LEVEL: u32 = 5;

    /// Rewards for a victory over the given enemy units.
    pub fn for_defeated<'a>(enemies: impl IntoIterator<Item = &'a BattleUnit>) -> Self {
        enemies
            .into_iter()
            .filter(|u| u.team() == Team::Enemy && u.is_defeated())
            .fold(Self::default(), |acc, u| Self {
                experience: acc
                    .experience
                    .saturating_add(u.level.saturating_mul(Self::EXPERIENCE_PER_LEVEL)),
                gold: acc
                    .gold
                    .saturating_add(u.level.saturating_mul(Self::GOLD_PER_LEVEL)),
            })
    }
}

/// Computes the rewards attached to a finished battle.
pub trait RewardPolicy: Send + Sync {
    fn rewards(&self, kind: ResultKind, units: &[&BattleUnit]) -> Rewards;
}

/// Level-scaled rewards for defeated enemies, granted on victory only.
#[derive(Clone, Copy, Debug, Default)]
pub struct LevelScaledRewards;

impl RewardPolicy for LevelScaledRewards {
    fn rewards(&self, kind: ResultKind, units: &[&BattleUnit]) -> Rewards {
        match kind {
            ResultKind::Victory => Rewards::for_defeated(units.iter().copied()),
            ResultKind::Defeat | ResultKind::Draw => Rewards::default(),
        }
    }
}

/// Final, immutable result of a battle.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleResult {
    pub kind: ResultKind,
    pub reason: EndReason,
    pub rounds: u32,
    pub rewards: Rewards,
    /// Milliseconds on the engine clock when the result was produced.
    pub timestamp_ms: u64,
}

/// Decides the terminal outcome from team survival, if any.
///
/// The player side is checked first: when both teams are wiped in the same
/// pass the battle is a defeat.
pub fn decide_outcome(players_alive: bool, enemies_alive: bool) -> Option<(ResultKind, EndReason)> {
    match (players_alive, enemies_alive) {
        (false, false) => Some((ResultKind::Defeat, EndReason::MutualDefeat)),
        (false, true) => Some((ResultKind::Defeat, EndReason::AllPlayersDefeated)),
        (true, false) => Some((ResultKind::Victory, EndReason::AllEnemiesDefeated)),
        (true, true) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutual_wipe_is_a_defeat() {
        assert_eq!(
            decide_outcome(false, false),
            Some((ResultKind::Defeat, EndReason::MutualDefeat))
        );
    }

    #[test]
    fn rewards_only_on_victory() {
        use crate::state::{GridCell, Stats, UnitId, UnitSpec};

        let mut orc = BattleUnit::from_spec(
            UnitId::new("orc"),
            UnitSpec::new("Orc", Stats::default()).with_level(3),
            Team::Enemy,
            GridCell::new(0, 0),
        );
        orc.set_hp(0);
        let units = [&orc];
        assert_eq!(
            LevelScaledRewards.rewards(ResultKind::Victory, &units),
            Rewards {
                experience: 30,
                gold: 15
            }
        );
        assert_eq!(
            LevelScaledRewards.rewards(ResultKind::Draw, &units),
            Rewards::default()
        );
    }

    #[test]
    fn rewards_saturate_on_huge_levels() {
        use crate::state::{GridCell, Stats, UnitId, UnitSpec};

        let giants: Vec<BattleUnit> = (0..2)
            .map(|column| {
                let mut giant = BattleUnit::from_spec(
                    UnitId::new(format!("giant{column}")),
                    UnitSpec::new("Giant", Stats::default()).with_level(u32::MAX),
                    Team::Enemy,
                    GridCell::new(0, column),
                );
                giant.set_hp(0);
                giant
            })
            .collect();

        let rewards = Rewards::for_defeated(&giants);
        assert_eq!(rewards.experience, u32::MAX);
        assert_eq!(rewards.gold, u32::MAX);
    }

    #[test]
    fn ongoing_battle_has_no_outcome() {
        assert_eq!(decide_outcome(true, true), None);
    }
}
