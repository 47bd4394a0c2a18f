//! Target validation for normal attacks and skills.

use crate::buff;
use crate::env::{RangePolicy, SkillDefinition, TargetSide};
use crate::error::{BattleError, ErrorSeverity};
use crate::state::{BattleUnit, Roster, UnitId};

use super::area::expand_area;

/// Why a unit cannot be targeted.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("unknown target {0}")]
    UnknownTarget(UnitId),

    #[error("target {0} is already defeated")]
    TargetDefeated(UnitId),

    #[error("target {0} cannot be targeted")]
    NotTargetable(UnitId),

    #[error("target {0} is on the wrong side")]
    WrongSide(UnitId),

    #[error("target {0} is out of range")]
    OutOfRange(UnitId),

    #[error("taunted: must target {required}")]
    Taunted { required: UnitId },

    #[error("no targets declared")]
    NoTargets,
}

impl BattleError for TargetError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::TargetDefeated(_) | Self::NotTargetable(_) | Self::OutOfRange(_) => {
                ErrorSeverity::Recoverable
            }
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownTarget(_) => "TARGET_UNKNOWN",
            Self::TargetDefeated(_) => "TARGET_DEFEATED",
            Self::NotTargetable(_) => "TARGET_NOT_TARGETABLE",
            Self::WrongSide(_) => "TARGET_WRONG_SIDE",
            Self::OutOfRange(_) => "TARGET_OUT_OF_RANGE",
            Self::Taunted { .. } => "TARGET_TAUNTED",
            Self::NoTargets => "TARGET_NONE",
        }
    }
}

/// Whether `target` is within normal-attack range of `attacker`.
pub fn in_range(attacker: &BattleUnit, target: &BattleUnit, policy: RangePolicy) -> bool {
    match policy {
        RangePolicy::Unrestricted => true,
        RangePolicy::ColumnDistance { max } => {
            attacker.grid_position.col + target.grid_position.col <= max
        }
    }
}

fn lookup<'r>(roster: &'r Roster, id: &UnitId) -> Result<&'r BattleUnit, TargetError> {
    roster
        .get(id)
        .ok_or_else(|| TargetError::UnknownTarget(id.clone()))
}

fn check_targetable(actor: &BattleUnit, target: &BattleUnit) -> Result<(), TargetError> {
    if target.is_defeated() {
        return Err(TargetError::TargetDefeated(target.id.clone()));
    }
    if !buff::can_unit_be_targeted(target, actor) {
        return Err(TargetError::NotTargetable(target.id.clone()));
    }
    Ok(())
}

/// Checks a normal-attack target: a living, targetable opponent in range,
/// and the taunt source when the attacker is taunted.
pub fn validate_attack_target(
    roster: &Roster,
    attacker: &BattleUnit,
    target_id: &UnitId,
    policy: RangePolicy,
) -> Result<(), TargetError> {
    let target = lookup(roster, target_id)?;
    if target.team() == attacker.team() {
        return Err(TargetError::WrongSide(target_id.clone()));
    }
    check_targetable(attacker, target)?;
    if let Some(required) = buff::forced_target(attacker, roster) {
        if &required != target_id {
            return Err(TargetError::Taunted { required });
        }
        // A taunt overrides the positional gate.
        return Ok(());
    }
    if !in_range(attacker, target, policy) {
        return Err(TargetError::OutOfRange(target_id.clone()));
    }
    Ok(())
}

/// Every unit `attacker` may currently attack.
pub fn valid_attack_targets(roster: &Roster, attacker: &BattleUnit, policy: RangePolicy) -> Vec<UnitId> {
    roster
        .living(attacker.team().opponent())
        .filter(|target| validate_attack_target(roster, attacker, &target.id, policy).is_ok())
        .map(|target| target.id.clone())
        .collect()
}

/// Checks one declared skill target against the skill's side.
pub fn validate_skill_target(
    roster: &Roster,
    caster: &BattleUnit,
    skill: &SkillDefinition,
    target_id: &UnitId,
) -> Result<(), TargetError> {
    let target = lookup(roster, target_id)?;
    match skill.target_side {
        TargetSide::Enemy => {
            if target.team() == caster.team() {
                return Err(TargetError::WrongSide(target_id.clone()));
            }
            check_targetable(caster, target)?;
            match buff::forced_target(caster, roster) {
                Some(required) if &required != target_id => Err(TargetError::Taunted { required }),
                _ => Ok(()),
            }
        }
        TargetSide::Ally => {
            if target.team() != caster.team() {
                return Err(TargetError::WrongSide(target_id.clone()));
            }
            check_targetable(caster, target)
        }
        TargetSide::Caster => {
            if target_id != &caster.id {
                return Err(TargetError::WrongSide(target_id.clone()));
            }
            Ok(())
        }
    }
}

/// Every unit `caster` may aim `skill` at.
pub fn valid_skill_targets(
    roster: &Roster,
    caster: &BattleUnit,
    skill: &SkillDefinition,
) -> Vec<UnitId> {
    roster
        .iter()
        .filter(|unit| validate_skill_target(roster, caster, skill, &unit.id).is_ok())
        .map(|unit| unit.id.clone())
        .collect()
}

/// Resolves the units a skill actually affects.
///
/// The first still-valid declared target anchors the area; every living unit
/// inside the expanded area that the caster may target is affected. Self-only
/// skills always affect the caster. Returns an empty list when no declared
/// target remains valid.
pub fn resolve_skill_targets(
    roster: &Roster,
    caster: &BattleUnit,
    skill: &SkillDefinition,
    declared: &[UnitId],
) -> Vec<UnitId> {
    if skill.target_side == TargetSide::Caster {
        return vec![caster.id.clone()];
    }

    let Some(anchor) = declared
        .iter()
        .filter_map(|id| roster.get(id))
        .find(|unit| validate_skill_target(roster, caster, skill, &unit.id).is_ok())
    else {
        return Vec::new();
    };

    let mut affected = Vec::new();
    for position in expand_area(anchor.grid_position, skill.area, caster.grid_position) {
        let Some(unit) = roster.unit_at(position) else {
            continue;
        };
        let eligible = if unit.id == anchor.id || unit.id == caster.id {
            unit.is_alive()
        } else {
            unit.is_alive() && buff::can_unit_be_targeted(unit, caster)
        };
        if eligible && !affected.contains(&unit.id) {
            affected.push(unit.id.clone());
        }
    }
    affected
}
