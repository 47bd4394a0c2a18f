//! Balance tables loader.

use std::path::Path;

use battle_core::BalanceTables;

use crate::loaders::{LoadResult, read_file};

/// Loader for combat and AI balance tables from TOML files.
///
/// Missing sections fall back to the built-in defaults.
pub struct TablesLoader;

impl TablesLoader {
    /// Load balance tables from a TOML file.
    pub fn load(path: &Path) -> LoadResult<BalanceTables> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse balance tables from TOML source.
    pub fn parse(source: &str) -> LoadResult<BalanceTables> {
        let tables: BalanceTables = toml::from_str(source)
            .map_err(|e| anyhow::anyhow!("Failed to parse tables TOML: {}", e))?;
        Ok(tables)
    }
}
