//! Declared unit actions and their resolved outcomes.

use super::{BuffId, SkillId, UnitId};

/// Kind of action a unit declares for the round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ActionKind {
    Attack,
    Skill,
    Defend,
}

/// A unit's declared intent for the current round.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Action {
    pub unit_id: UnitId,
    pub kind: ActionKind,
    pub skill_id: Option<SkillId>,
    pub targets: Vec<UnitId>,
}

impl Action {
    pub fn attack(unit: impl Into<UnitId>, target: impl Into<UnitId>) -> Self {
        Self {
            unit_id: unit.into(),
            kind: ActionKind::Attack,
            skill_id: None,
            targets: vec![target.into()],
        }
    }

    pub fn skill(
        unit: impl Into<UnitId>,
        skill: impl Into<SkillId>,
        targets: impl IntoIterator<Item = UnitId>,
    ) -> Self {
        Self {
            unit_id: unit.into(),
            kind: ActionKind::Skill,
            skill_id: Some(skill.into()),
            targets: targets.into_iter().collect(),
        }
    }

    pub fn defend(unit: impl Into<UnitId>) -> Self {
        Self {
            unit_id: unit.into(),
            kind: ActionKind::Defend,
            skill_id: None,
            targets: Vec::new(),
        }
    }

    /// The first declared target, which AoE shapes expand around.
    pub fn primary_target(&self) -> Option<&UnitId> {
        self.targets.first()
    }
}

/// Why an action produced no effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum SkipReason {
    /// The acting unit was defeated before its turn.
    ActorDefeated,
    /// The acting unit is stunned, frozen or asleep.
    Incapacitated,
    /// The unit is silenced and tried to cast.
    Silenced,
    /// Not enough MP to cast.
    InsufficientMp,
    /// Every declared target was invalid when the action resolved.
    NoValidTargets,
}

/// Damage dealt to one unit by one strike.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitRecord {
    pub source: UnitId,
    pub target: UnitId,
    /// HP actually removed.
    pub damage: u32,
    /// Damage soaked by shields.
    pub absorbed: u32,
    pub critical: bool,
    pub missed: bool,
    /// True for reflect-damage retaliation hits.
    pub reflected: bool,
    pub target_defeated: bool,
}

/// Healing received by one unit.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealRecord {
    pub source: UnitId,
    pub target: UnitId,
    pub amount: u32,
}

/// A buff added to or removed from a unit.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuffChange {
    pub target: UnitId,
    pub buff_id: BuffId,
    pub stacks: u32,
}

/// Complete result of resolving one action.
///
/// Produced by [`resolve_action`](crate::resolve::resolve_action) and consumed
/// by the presentation queue to build the animation sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionOutcome {
    pub unit_id: UnitId,
    pub kind: ActionKind,
    pub skill_id: Option<SkillId>,
    pub skipped: bool,
    pub skip_reason: Option<SkipReason>,
    pub mp_spent: u32,
    pub hits: Vec<HitRecord>,
    pub heals: Vec<HealRecord>,
    pub buffs_applied: Vec<BuffChange>,
    pub buffs_removed: Vec<BuffChange>,
    /// Units that went from alive to defeated during this action, in order.
    pub defeated: Vec<UnitId>,
}

impl ActionOutcome {
    pub fn new(action: &Action) -> Self {
        Self {
            unit_id: action.unit_id.clone(),
            kind: action.kind,
            skill_id: action.skill_id.clone(),
            skipped: false,
            skip_reason: None,
            mp_spent: 0,
            hits: Vec::new(),
            heals: Vec::new(),
            buffs_applied: Vec::new(),
            buffs_removed: Vec::new(),
            defeated: Vec::new(),
        }
    }

    pub fn skipped(action: &Action, reason: SkipReason) -> Self {
        Self {
            skipped: true,
            skip_reason: Some(reason),
            ..Self::new(action)
        }
    }

    /// Total HP damage dealt to `target` by non-reflected hits.
    pub fn damage_to(&self, target: &UnitId) -> u32 {
        self.hits
            .iter()
            .filter(|h| &h.target == target && !h.reflected)
            .map(|h| h.damage)
            .sum()
    }

    /// True when the action resolved but touched nothing.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
            && self.heals.is_empty()
            && self.buffs_applied.is_empty()
            && self.buffs_removed.is_empty()
            && self.kind != ActionKind::Defend
    }
}
