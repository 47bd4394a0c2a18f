//! Deterministic battle rules and data types.
//!
//! `battle-core` holds the canonical rules of a grid battle: unit state,
//! damage and healing math, status effects, skill targeting, the heuristic AI
//! and turn ordering. Everything here is synchronous and side-effect free
//! apart from the [`RandomSource`] passed in; sequencing, events and pacing
//! live in the runtime crate.
pub mod ai;
pub mod buff;
pub mod combat;
pub mod config;
pub mod env;
pub mod error;
pub mod resolve;
pub mod skill;
pub mod state;
pub mod turn_order;

pub use ai::{DecisionPolicy, HeuristicAi};
pub use combat::{CombatError, DamageType};
pub use config::BattleConfig;
pub use env::{
    AiTables, AreaShape, BalanceTables, BattleEnv, BuffApplyEntry, BuffDefinition, BuffOracle,
    BuffRemoveEntry, BuffSelector, CombatTables, DamageEntry, EmptyContent, EntryTarget,
    GroupShape, HealEntry, PcgRng, RandomSource, RangePolicy, ScriptedRng, SkillDefinition,
    SkillOracle, TablesOracle, TargetSide,
};
pub use error::{BattleError, ErrorSeverity};
pub use resolve::{Resolution, newly_defeated, resolve_action};
pub use skill::{SkillError, TargetError};
pub use state::{
    Action, ActionKind, ActionOutcome, BattleResult, BattleSetup, BattleUnit, BuffCategory,
    BuffChange, BuffId, ControlFlags, EffectType, EndReason, Formation, GridCell, GridPosition,
    HealRecord, HitRecord, LevelScaledRewards, PERMANENT, ResultKind, RewardPolicy, Rewards,
    Roster, SetupError, SkillId, SkipReason, StackPolicy, StatKind, Stats, StatusEffect,
    StatusEffects, Team, UnitId, UnitSpec, decide_outcome,
};
pub use turn_order::TurnOrder;
