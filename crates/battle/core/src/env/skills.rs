//! Skill definitions and the oracle that serves them.

use crate::combat::DamageType;
use crate::state::{BuffId, SkillId, StatKind};

/// Oracle providing skill definitions by id.
pub trait SkillOracle: Send + Sync {
    fn skill(&self, id: &SkillId) -> Option<&SkillDefinition>;
}

/// Which units a skill may be aimed at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum TargetSide {
    #[default]
    Enemy,
    Ally,
    /// The caster only.
    Caster,
}

/// Sub-shape of a `group` area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum GroupShape {
    /// Centre plus its 4-neighbourhood.
    Cross,
    Row,
    Column,
    /// 3×3 around the centre, clamped to the grid.
    Square,
    /// Fallback when no sub-shape is named: centre plus adjacent-4.
    #[default]
    Adjacent,
}

/// Area a skill covers around its chosen cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum AreaShape {
    #[default]
    Single,
    Group(GroupShape),
    /// The caster's own cell, regardless of declared targets.
    #[cfg_attr(feature = "serde", serde(rename = "none"))]
    CasterCell,
}

/// Damage component of a skill.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageEntry {
    pub damage_type: DamageType,
    /// Skill power coefficient applied after the defense curve.
    pub power: f64,
}

/// Healing component of a skill: `caster[scaling] × power`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealEntry {
    pub power: f64,
    pub scaling: StatKind,
}

/// Who an entry applies to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum EntryTarget {
    /// Every unit covered by the skill area.
    #[default]
    Targets,
    Caster,
}

/// A buff applied by a skill with an independent trigger chance.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuffApplyEntry {
    pub buff_id: BuffId,
    /// Trigger probability in `[0, 1]`.
    #[cfg_attr(feature = "serde", serde(default = "always"))]
    pub chance: f64,
    /// Overrides the definition's default duration.
    #[cfg_attr(feature = "serde", serde(default))]
    pub duration: Option<i32>,
    #[cfg_attr(feature = "serde", serde(default = "first_level"))]
    pub level: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: EntryTarget,
}

/// Which effects a removal entry strips.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum BuffSelector {
    Id(BuffId),
    /// Every dispellable debuff.
    AllDebuffs,
    /// Every dispellable buff.
    AllBuffs,
}

/// A buff removal performed by a skill with an independent trigger chance.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuffRemoveEntry {
    pub selector: BuffSelector,
    #[cfg_attr(feature = "serde", serde(default = "always"))]
    pub chance: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: EntryTarget,
}

#[cfg(feature = "serde")]
fn always() -> f64 {
    1.0
}

#[cfg(feature = "serde")]
fn first_level() -> u32 {
    1
}

/// Static description of a skill.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillDefinition {
    pub id: SkillId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub mp_cost: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target_side: TargetSide,
    #[cfg_attr(feature = "serde", serde(default))]
    pub area: AreaShape,
    #[cfg_attr(feature = "serde", serde(default))]
    pub damage: Option<DamageEntry>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub heal: Option<HealEntry>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub apply_buffs: Vec<BuffApplyEntry>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub remove_buffs: Vec<BuffRemoveEntry>,
}

impl SkillDefinition {
    pub fn new(id: impl Into<SkillId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mp_cost: 0,
            target_side: TargetSide::Enemy,
            area: AreaShape::Single,
            damage: None,
            heal: None,
            apply_buffs: Vec::new(),
            remove_buffs: Vec::new(),
        }
    }

    #[must_use]
    pub fn cost(mut self, mp: u32) -> Self {
        self.mp_cost = mp;
        self
    }

    #[must_use]
    pub fn targeting(mut self, side: TargetSide, area: AreaShape) -> Self {
        self.target_side = side;
        self.area = area;
        self
    }

    #[must_use]
    pub fn dealing(mut self, damage_type: DamageType, power: f64) -> Self {
        self.damage = Some(DamageEntry { damage_type, power });
        self
    }

    #[must_use]
    pub fn healing(mut self, power: f64, scaling: StatKind) -> Self {
        self.heal = Some(HealEntry { power, scaling });
        self
    }

    #[must_use]
    pub fn applying(mut self, buff_id: impl Into<BuffId>, chance: f64, target: EntryTarget) -> Self {
        self.apply_buffs.push(BuffApplyEntry {
            buff_id: buff_id.into(),
            chance,
            duration: None,
            level: 1,
            target,
        });
        self
    }

    #[must_use]
    pub fn removing(mut self, selector: BuffSelector, chance: f64, target: EntryTarget) -> Self {
        self.remove_buffs.push(BuffRemoveEntry {
            selector,
            chance,
            target,
        });
        self
    }

    /// True when the skill can only help its targets.
    pub fn is_supportive(&self) -> bool {
        self.damage.is_none() && self.target_side != TargetSide::Enemy
    }
}
