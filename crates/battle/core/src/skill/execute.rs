//! Skill execution pipeline: checks, cost, then damage, heal and buff entries.

use crate::buff;
use crate::combat::{self, CombatError};
use crate::env::{BattleEnv, EntryTarget, RandomSource, SkillDefinition};
use crate::state::{ActionOutcome, BuffChange, HealRecord, Roster, UnitId};

use super::SkillError;
use super::targeting::resolve_skill_targets;

/// Checks that `caster_id` may cast `skill` right now.
pub fn check_castable(
    roster: &Roster,
    caster_id: &UnitId,
    skill: &SkillDefinition,
) -> Result<(), SkillError> {
    let caster = roster
        .get(caster_id)
        .ok_or_else(|| CombatError::UnitNotFound(caster_id.clone()))?;
    if !caster.knows_skill(&skill.id) {
        return Err(SkillError::NotKnown {
            unit: caster_id.clone(),
            skill: skill.id.clone(),
        });
    }
    if !buff::can_unit_use_skill(caster) {
        return Err(SkillError::Silenced(caster_id.clone()));
    }
    if caster.current_mp < skill.mp_cost {
        return Err(SkillError::InsufficientMp {
            required: skill.mp_cost,
            available: caster.current_mp,
        });
    }
    Ok(())
}

/// Casts `skill` from `caster_id` at the declared targets, recording every
/// effect in `outcome`.
///
/// MP is only spent once the cast is known to affect at least one unit.
pub fn execute_skill(
    roster: &mut Roster,
    caster_id: &UnitId,
    skill: &SkillDefinition,
    declared: &[UnitId],
    env: BattleEnv<'_>,
    rng: &mut dyn RandomSource,
    outcome: &mut ActionOutcome,
) -> Result<(), SkillError> {
    check_castable(roster, caster_id, skill)?;

    let caster = roster
        .get(caster_id)
        .ok_or_else(|| CombatError::UnitNotFound(caster_id.clone()))?;
    let targets = resolve_skill_targets(roster, caster, skill, declared);
    if targets.is_empty() {
        return Err(SkillError::NoValidTargets);
    }

    let caster = roster
        .get_mut(caster_id)
        .ok_or_else(|| CombatError::UnitNotFound(caster_id.clone()))?;
    caster.spend_mp(skill.mp_cost);
    outcome.mp_spent = skill.mp_cost;

    let tables = env.combat();
    for target_id in &targets {
        if !is_alive(roster, caster_id) {
            break;
        }

        if let Some(damage) = skill.damage {
            if is_alive(roster, target_id) {
                let result = combat::strike(
                    roster,
                    caster_id,
                    target_id,
                    damage.damage_type,
                    damage.power,
                    &tables,
                    &mut *rng,
                )?;
                record_strike(outcome, result);
            }
        }

        if let Some(heal) = skill.heal {
            heal_target(
                roster,
                caster_id,
                target_id,
                &heal,
                tables.heal_variance,
                &mut *rng,
                outcome,
            )?;
        }

        apply_entries(
            roster,
            caster_id,
            target_id,
            skill,
            EntryTarget::Targets,
            env,
            &mut *rng,
            outcome,
        )?;
    }

    apply_entries(roster, caster_id, caster_id, skill, EntryTarget::Caster, env, rng, outcome)?;
    Ok(())
}

fn is_alive(roster: &Roster, id: &UnitId) -> bool {
    roster.get(id).is_some_and(|u| u.is_alive())
}

/// Appends a strike's hit records and side effects to the outcome.
pub(crate) fn record_strike(outcome: &mut ActionOutcome, result: combat::StrikeResult) {
    for hit in std::iter::once(result.hit).chain(result.reflected) {
        if hit.target_defeated && !hit.missed && !outcome.defeated.contains(&hit.target) {
            outcome.defeated.push(hit.target.clone());
        }
        outcome.hits.push(hit);
    }
    outcome
        .buffs_removed
        .extend(result.removed_buffs.into_iter().map(|(target, buff_id)| BuffChange {
            target,
            buff_id,
            stacks: 0,
        }));
}

fn heal_target(
    roster: &mut Roster,
    caster_id: &UnitId,
    target_id: &UnitId,
    heal: &crate::env::HealEntry,
    variance: f64,
    rng: &mut dyn RandomSource,
    outcome: &mut ActionOutcome,
) -> Result<(), CombatError> {
    let caster = roster
        .get(caster_id)
        .ok_or_else(|| CombatError::UnitNotFound(caster_id.clone()))?;
    let target = roster
        .get(target_id)
        .ok_or_else(|| CombatError::UnitNotFound(target_id.clone()))?;
    if target.is_defeated() {
        return Ok(());
    }
    let amount = combat::heal_amount(caster, target, heal, variance, rng);

    let target = roster
        .get_mut(target_id)
        .ok_or_else(|| CombatError::UnitNotFound(target_id.clone()))?;
    let restored = target.restore_hp(amount);
    outcome.heals.push(HealRecord {
        source: caster_id.clone(),
        target: target_id.clone(),
        amount: restored,
    });
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn apply_entries(
    roster: &mut Roster,
    caster_id: &UnitId,
    recipient_id: &UnitId,
    skill: &SkillDefinition,
    scope: EntryTarget,
    env: BattleEnv<'_>,
    rng: &mut dyn RandomSource,
    outcome: &mut ActionOutcome,
) -> Result<(), CombatError> {
    for entry in skill.apply_buffs.iter().filter(|e| e.target == scope) {
        if !is_alive(roster, recipient_id) || !rng.chance(entry.chance) {
            continue;
        }
        let definition = env
            .buff(&entry.buff_id)
            .ok_or_else(|| CombatError::UnknownBuff(entry.buff_id.clone()))?;
        let recipient = roster
            .get_mut(recipient_id)
            .ok_or_else(|| CombatError::UnitNotFound(recipient_id.clone()))?;
        let applied = buff::apply_buff(recipient, definition, caster_id, entry.level, entry.duration);
        if let Some(stacks) = applied.stacks() {
            outcome.buffs_applied.push(BuffChange {
                target: recipient_id.clone(),
                buff_id: entry.buff_id.clone(),
                stacks,
            });
        }
    }

    for entry in skill.remove_buffs.iter().filter(|e| e.target == scope) {
        if !is_alive(roster, recipient_id) || !rng.chance(entry.chance) {
            continue;
        }
        let recipient = roster
            .get_mut(recipient_id)
            .ok_or_else(|| CombatError::UnitNotFound(recipient_id.clone()))?;
        for removed in buff::remove_selected(recipient, &entry.selector) {
            outcome.buffs_removed.push(BuffChange {
                target: recipient_id.clone(),
                buff_id: removed.buff_id,
                stacks: removed.stacks,
            });
        }
    }
    Ok(())
}
