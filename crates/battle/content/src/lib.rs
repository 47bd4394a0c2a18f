//! Data-driven battle content and loaders.
//!
//! This crate houses static battle content and provides loaders for RON/TOML data files:
//! - Skill catalogs (data-driven via RON)
//! - Buff / status effect catalogs (data-driven via RON)
//! - Balance tables (data-driven via TOML)
//! - Battle scenarios (data-driven via RON)
//!
//! Content is consumed through the `SkillOracle`/`BuffOracle`/`TablesOracle`
//! traits of `battle-core` and never appears in battle state.

pub mod registry;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use registry::{ContentRegistry, RegistryError};

#[cfg(feature = "loaders")]
pub use loaders::{
    BuffLoader, ContentFactory, LoadResult, Scenario, ScenarioLoader, SkillLoader, TablesLoader,
};
