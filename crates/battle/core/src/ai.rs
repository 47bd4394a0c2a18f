//! Action selection for units not controlled by the player.

use crate::buff;
use crate::env::{BattleEnv, RandomSource, TargetSide};
use crate::skill::{valid_attack_targets, valid_skill_targets};
use crate::state::{Action, BattleUnit, Roster, UnitId};

/// Chooses an action for a unit.
///
/// Implementations must draw every random decision from `rng` so that
/// battles replay identically under the same seed.
pub trait DecisionPolicy: Send + Sync {
    fn decide(
        &self,
        unit_id: &UnitId,
        roster: &Roster,
        env: BattleEnv<'_>,
        rng: &mut dyn RandomSource,
    ) -> Action;
}

/// Weighted heuristic driven by [`AiTables`](crate::env::AiTables).
///
/// 1. Below the low-HP threshold, defend with some probability.
/// 2. With enough MP, sometimes cast a random affordable skill at the
///    valid target with the lowest HP ratio.
/// 3. Otherwise attack: usually the weakest valid target, sometimes a random one.
/// 4. With nothing to attack, defend.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicAi;

impl HeuristicAi {
    fn weakest<'r>(roster: &'r Roster, candidates: &[UnitId]) -> Option<&'r BattleUnit> {
        candidates
            .iter()
            .filter_map(|id| roster.get(id))
            .min_by(|a, b| a.hp_ratio().total_cmp(&b.hp_ratio()))
    }

    fn try_skill(
        unit: &BattleUnit,
        roster: &Roster,
        env: BattleEnv<'_>,
        rng: &mut dyn RandomSource,
    ) -> Option<Action> {
        let ai = env.tables().ai();
        if unit.skill_set.is_empty()
            || unit.current_mp < ai.min_skill_mp
            || !buff::can_unit_use_skill(unit)
        {
            return None;
        }

        let castable: Vec<_> = unit
            .skill_set
            .iter()
            .filter_map(|id| env.skill(id))
            .filter(|skill| skill.mp_cost <= unit.current_mp)
            .collect();
        if castable.is_empty() || !rng.chance(ai.skill_chance) {
            return None;
        }

        let skill = castable[rng.index(castable.len())];
        let target = if skill.target_side == TargetSide::Caster {
            unit.id.clone()
        } else {
            let candidates = valid_skill_targets(roster, unit, skill);
            Self::weakest(roster, &candidates)?.id.clone()
        };
        Some(Action::skill(unit.id.clone(), skill.id.clone(), [target]))
    }
}

impl DecisionPolicy for HeuristicAi {
    fn decide(
        &self,
        unit_id: &UnitId,
        roster: &Roster,
        env: BattleEnv<'_>,
        rng: &mut dyn RandomSource,
    ) -> Action {
        let Some(unit) = roster.get(unit_id) else {
            return Action::defend(unit_id.clone());
        };
        let ai = env.tables().ai();

        if unit.hp_ratio() < ai.low_hp_ratio && rng.chance(ai.defend_chance) {
            return Action::defend(unit_id.clone());
        }

        if let Some(action) = Self::try_skill(unit, roster, env, rng) {
            return action;
        }

        let targets = valid_attack_targets(roster, unit, env.combat().range_policy);
        if targets.is_empty() {
            return Action::defend(unit_id.clone());
        }

        let target = if rng.chance(ai.focus_weakest_chance) {
            Self::weakest(roster, &targets).map(|u| u.id.clone())
        } else {
            targets.get(rng.index(targets.len())).cloned()
        };
        match target {
            Some(target) => Action::attack(unit_id.clone(), target),
            None => Action::defend(unit_id.clone()),
        }
    }
}
