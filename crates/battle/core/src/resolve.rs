//! Pure action resolution.
//!
//! [`resolve_action`] never mutates the live battle: it works on a draft copy
//! of the roster and hands back the draft together with the outcome. The
//! caller commits the draft in a single write.

use crate::buff;
use crate::combat::{self, CombatError, DamageType};
use crate::env::{BattleEnv, RandomSource};
use crate::skill::{self, SkillError};
use crate::state::{Action, ActionKind, ActionOutcome, Roster, SkipReason, UnitId};

/// Updated roster plus the record of what happened.
#[derive(Clone, Debug)]
pub struct Resolution {
    pub outcome: ActionOutcome,
    pub roster: Roster,
}

impl Resolution {
    fn skipped(roster: &Roster, action: &Action, reason: SkipReason) -> Self {
        Self {
            outcome: ActionOutcome::skipped(action, reason),
            roster: roster.clone(),
        }
    }
}

/// Resolves one declared action against `roster`.
///
/// Returns `Err` only for lookups that validated actions cannot fail; every
/// legitimate reason for an action to do nothing is reported as a skip.
pub fn resolve_action(
    roster: &Roster,
    action: &Action,
    env: BattleEnv<'_>,
    rng: &mut dyn RandomSource,
) -> Result<Resolution, CombatError> {
    let actor = roster
        .get(&action.unit_id)
        .ok_or_else(|| CombatError::UnitNotFound(action.unit_id.clone()))?;

    if actor.is_defeated() {
        return Ok(Resolution::skipped(roster, action, SkipReason::ActorDefeated));
    }
    if !buff::can_unit_act(actor) {
        return Ok(Resolution::skipped(roster, action, SkipReason::Incapacitated));
    }

    match action.kind {
        ActionKind::Defend => {
            let mut draft = roster.clone();
            if let Some(unit) = draft.get_mut(&action.unit_id) {
                unit.is_defending = true;
            }
            Ok(Resolution {
                outcome: ActionOutcome::new(action),
                roster: draft,
            })
        }
        ActionKind::Attack => resolve_attack(roster, action, env, rng),
        ActionKind::Skill => resolve_skill(roster, action, env, rng),
    }
}

fn resolve_attack(
    roster: &Roster,
    action: &Action,
    env: BattleEnv<'_>,
    rng: &mut dyn RandomSource,
) -> Result<Resolution, CombatError> {
    let actor = roster
        .get(&action.unit_id)
        .ok_or_else(|| CombatError::UnitNotFound(action.unit_id.clone()))?;
    let tables = env.combat();

    let target = buff::forced_target(actor, roster).or_else(|| action.primary_target().cloned());
    let Some(target) = target.filter(|target| {
        skill::validate_attack_target(roster, actor, target, tables.range_policy).is_ok()
    }) else {
        return Ok(Resolution::skipped(roster, action, SkipReason::NoValidTargets));
    };

    let mut draft = roster.clone();
    let strike = combat::strike(
        &mut draft,
        &action.unit_id,
        &target,
        DamageType::Physical,
        1.0,
        &tables,
        rng,
    )?;
    let mut outcome = ActionOutcome::new(action);
    skill::record_strike(&mut outcome, strike);
    Ok(Resolution {
        outcome,
        roster: draft,
    })
}

fn resolve_skill(
    roster: &Roster,
    action: &Action,
    env: BattleEnv<'_>,
    rng: &mut dyn RandomSource,
) -> Result<Resolution, CombatError> {
    let skill_id = action
        .skill_id
        .as_ref()
        .ok_or_else(|| CombatError::MissingSkill(action.unit_id.clone()))?;
    let definition = env
        .skill(skill_id)
        .ok_or_else(|| CombatError::UnknownSkill(skill_id.clone()))?;

    let mut draft = roster.clone();
    let mut outcome = ActionOutcome::new(action);
    let cast = skill::execute_skill(
        &mut draft,
        &action.unit_id,
        definition,
        &action.targets,
        env,
        rng,
        &mut outcome,
    );

    let reason = match cast {
        Ok(()) => {
            return Ok(Resolution {
                outcome,
                roster: draft,
            });
        }
        Err(SkillError::Silenced(_)) => SkipReason::Silenced,
        Err(SkillError::InsufficientMp { .. }) => SkipReason::InsufficientMp,
        Err(SkillError::NoValidTargets) => SkipReason::NoValidTargets,
        Err(SkillError::NotKnown { skill, .. }) => return Err(CombatError::UnknownSkill(skill)),
        Err(SkillError::Combat(err)) => return Err(err),
    };
    Ok(Resolution::skipped(roster, action, reason))
}

/// Units defeated between two roster snapshots, in id order.
pub fn newly_defeated(before: &Roster, after: &Roster) -> Vec<UnitId> {
    after
        .iter()
        .filter(|unit| unit.is_defeated())
        .filter(|unit| before.get(&unit.id).is_some_and(|prev| prev.is_alive()))
        .map(|unit| unit.id.clone())
        .collect()
}
