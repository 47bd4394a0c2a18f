//! In-memory skill and buff registry.

use std::collections::BTreeMap;

use battle_core::{
    BuffDefinition, BuffId, BuffOracle, BuffSelector, SkillDefinition, SkillId, SkillOracle,
};

/// Content inconsistencies found by [`ContentRegistry::validate`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("skill {skill} references unknown buff {buff}")]
    UnknownBuff { skill: SkillId, buff: BuffId },

    #[error("skill {0} has an entry chance outside [0, 1]")]
    InvalidChance(SkillId),

    #[error("buff {0} has a duration below -1")]
    InvalidDuration(BuffId),
}

/// Skill and buff definitions keyed by id.
///
/// Implements both [`SkillOracle`] and [`BuffOracle`], so one registry can be
/// handed to the engine for both roles.
#[derive(Clone, Debug, Default)]
pub struct ContentRegistry {
    skills: BTreeMap<SkillId, SkillDefinition>,
    buffs: BTreeMap<BuffId, BuffDefinition>,
}

impl ContentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from definition lists. Later duplicates win.
    pub fn from_parts(
        skills: impl IntoIterator<Item = SkillDefinition>,
        buffs: impl IntoIterator<Item = BuffDefinition>,
    ) -> Self {
        let mut registry = Self::new();
        for skill in skills {
            registry.insert_skill(skill);
        }
        for buff in buffs {
            registry.insert_buff(buff);
        }
        registry
    }

    pub fn insert_skill(&mut self, skill: SkillDefinition) -> Option<SkillDefinition> {
        self.skills.insert(skill.id.clone(), skill)
    }

    pub fn insert_buff(&mut self, buff: BuffDefinition) -> Option<BuffDefinition> {
        self.buffs.insert(buff.id.clone(), buff)
    }

    pub fn skills(&self) -> impl Iterator<Item = &SkillDefinition> {
        self.skills.values()
    }

    pub fn buffs(&self) -> impl Iterator<Item = &BuffDefinition> {
        self.buffs.values()
    }

    pub fn skill_count(&self) -> usize {
        self.skills.len()
    }

    pub fn buff_count(&self) -> usize {
        self.buffs.len()
    }

    /// Checks cross references and value ranges.
    pub fn validate(&self) -> Result<(), RegistryError> {
        for buff in self.buffs.values() {
            if buff.duration < battle_core::PERMANENT {
                return Err(RegistryError::InvalidDuration(buff.id.clone()));
            }
        }

        for skill in self.skills.values() {
            let chances = skill
                .apply_buffs
                .iter()
                .map(|e| e.chance)
                .chain(skill.remove_buffs.iter().map(|e| e.chance));
            for chance in chances {
                if !(0.0..=1.0).contains(&chance) {
                    return Err(RegistryError::InvalidChance(skill.id.clone()));
                }
            }

            let referenced = skill
                .apply_buffs
                .iter()
                .map(|e| &e.buff_id)
                .chain(skill.remove_buffs.iter().filter_map(|e| match &e.selector {
                    BuffSelector::Id(id) => Some(id),
                    BuffSelector::AllDebuffs | BuffSelector::AllBuffs => None,
                }));
            for buff in referenced {
                if !self.buffs.contains_key(buff) {
                    return Err(RegistryError::UnknownBuff {
                        skill: skill.id.clone(),
                        buff: buff.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl SkillOracle for ContentRegistry {
    fn skill(&self, id: &SkillId) -> Option<&SkillDefinition> {
        self.skills.get(id)
    }
}

impl BuffOracle for ContentRegistry {
    fn buff(&self, id: &BuffId) -> Option<&BuffDefinition> {
        self.buffs.get(id)
    }
}
