//! Battle scenario loader.

use std::path::Path;

use battle_core::BattleSetup;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// A named battle setup with optional run parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Overrides the engine's round limit when set.
    #[serde(default)]
    pub max_rounds: Option<u32>,
    /// Fixes the RNG seed when set.
    #[serde(default)]
    pub seed: Option<u64>,
    pub setup: BattleSetup,
}

/// Loader for scenarios from RON files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    /// Load a scenario from a RON file.
    pub fn load(path: &Path) -> LoadResult<Scenario> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse a scenario from RON source.
    pub fn parse(source: &str) -> LoadResult<Scenario> {
        let scenario: Scenario = ron::from_str(source)
            .map_err(|e| anyhow::anyhow!("Failed to parse scenario RON: {}", e))?;
        Ok(scenario)
    }
}
