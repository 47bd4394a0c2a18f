//! Environment oracles: read-only content and balance data.
//!
//! The battle never looks definitions up in global registries. Hosts build a
//! [`BattleEnv`] from oracle implementations and pass it to every rule that
//! needs content, so tests can run against isolated registries.

mod buffs;
mod rng;
mod skills;
mod tables;

pub use buffs::{BuffDefinition, BuffOracle};
pub use rng::{PcgRng, RandomSource, ScriptedRng};
pub use skills::{
    AreaShape, BuffApplyEntry, BuffRemoveEntry, BuffSelector, DamageEntry, EntryTarget,
    GroupShape, HealEntry, SkillDefinition, SkillOracle, TargetSide,
};
pub use tables::{AiTables, BalanceTables, CombatTables, RangePolicy, TablesOracle};

/// Bundle of oracles consulted while resolving a battle.
#[derive(Clone, Copy)]
pub struct BattleEnv<'a> {
    skills: &'a dyn SkillOracle,
    buffs: &'a dyn BuffOracle,
    tables: &'a dyn TablesOracle,
}

impl<'a> BattleEnv<'a> {
    pub fn new(
        skills: &'a dyn SkillOracle,
        buffs: &'a dyn BuffOracle,
        tables: &'a dyn TablesOracle,
    ) -> Self {
        Self {
            skills,
            buffs,
            tables,
        }
    }

    pub fn skills(&self) -> &'a dyn SkillOracle {
        self.skills
    }

    pub fn buffs(&self) -> &'a dyn BuffOracle {
        self.buffs
    }

    pub fn tables(&self) -> &'a dyn TablesOracle {
        self.tables
    }

    pub fn skill(&self, id: &crate::state::SkillId) -> Option<&'a SkillDefinition> {
        self.skills.skill(id)
    }

    pub fn buff(&self, id: &crate::state::BuffId) -> Option<&'a BuffDefinition> {
        self.buffs.buff(id)
    }

    pub fn combat(&self) -> CombatTables {
        self.tables.combat()
    }
}

/// Oracle with no content, for battles that only use normal attacks.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyContent;

impl SkillOracle for EmptyContent {
    fn skill(&self, _id: &crate::state::SkillId) -> Option<&SkillDefinition> {
        None
    }
}

impl BuffOracle for EmptyContent {
    fn buff(&self, _id: &crate::state::BuffId) -> Option<&BuffDefinition> {
        None
    }
}
