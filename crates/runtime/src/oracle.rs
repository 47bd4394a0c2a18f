//! Shared content handed to the engine.
//!
//! Definitions are immutable for the lifetime of an engine; the manager keeps
//! them behind `Arc`s and lends a [`BattleEnv`] view on demand.
use std::sync::Arc;

use battle_content::{ContentFactory, ContentRegistry, LoadResult};
use battle_core::{
    AiTables, BalanceTables, BattleEnv, BuffOracle, CombatTables, EmptyContent, RangePolicy,
    SkillOracle, TablesOracle,
};

#[derive(Clone)]
pub struct OracleManager {
    skills: Arc<dyn SkillOracle>,
    buffs: Arc<dyn BuffOracle>,
    tables: Arc<dyn TablesOracle>,
}

impl OracleManager {
    pub fn new(
        skills: Arc<dyn SkillOracle>,
        buffs: Arc<dyn BuffOracle>,
        tables: Arc<dyn TablesOracle>,
    ) -> Self {
        Self {
            skills,
            buffs,
            tables,
        }
    }

    /// One registry serving both skills and buffs.
    pub fn from_registry(registry: ContentRegistry, tables: BalanceTables) -> Self {
        let registry = Arc::new(registry);
        Self {
            skills: registry.clone(),
            buffs: registry,
            tables: Arc::new(tables),
        }
    }

    /// The content embedded in `battle-content`.
    pub fn builtin() -> LoadResult<Self> {
        Ok(Self::from_registry(
            ContentFactory::builtin_registry()?,
            ContentFactory::builtin_tables()?,
        ))
    }

    /// No skills or buffs; normal attacks only.
    pub fn attacks_only(tables: BalanceTables) -> Self {
        Self {
            skills: Arc::new(EmptyContent),
            buffs: Arc::new(EmptyContent),
            tables: Arc::new(tables),
        }
    }

    /// Replaces the attack range policy of the current tables.
    pub fn with_range_policy(mut self, policy: RangePolicy) -> Self {
        self.tables = Arc::new(RangeOverride {
            inner: self.tables,
            policy,
        });
        self
    }

    pub fn env(&self) -> BattleEnv<'_> {
        BattleEnv::new(self.skills.as_ref(), self.buffs.as_ref(), self.tables.as_ref())
    }
}

struct RangeOverride {
    inner: Arc<dyn TablesOracle>,
    policy: RangePolicy,
}

impl TablesOracle for RangeOverride {
    fn combat(&self) -> CombatTables {
        CombatTables {
            range_policy: self.policy,
            ..self.inner.combat()
        }
    }

    fn ai(&self) -> AiTables {
        self.inner.ai()
    }
}

impl Default for OracleManager {
    fn default() -> Self {
        Self::attacks_only(BalanceTables::default())
    }
}
