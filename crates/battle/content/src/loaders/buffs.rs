//! Buff catalog loader.

use std::path::Path;

use battle_core::BuffDefinition;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Buff catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuffCatalog {
    pub buffs: Vec<BuffDefinition>,
}

/// Loader for buff catalogs from RON files.
pub struct BuffLoader;

impl BuffLoader {
    /// Load a buff catalog from a RON file.
    pub fn load(path: &Path) -> LoadResult<Vec<BuffDefinition>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse a buff catalog from RON source.
    pub fn parse(source: &str) -> LoadResult<Vec<BuffDefinition>> {
        let catalog: BuffCatalog = ron::from_str(source)
            .map_err(|e| anyhow::anyhow!("Failed to parse buff catalog RON: {}", e))?;
        Ok(catalog.buffs)
    }
}
