//! Content loaders for reading battle data from files.
//!
//! Skills, buffs and scenarios are RON; balance tables are TOML. Every loader
//! has a `load(path)` form for data directories and a `parse(str)` form used
//! for the catalogs embedded in the crate.

pub mod buffs;
pub mod factory;
pub mod scenario;
pub mod skills;
pub mod tables;

pub use buffs::BuffLoader;
pub use factory::ContentFactory;
pub use scenario::{Scenario, ScenarioLoader};
pub use skills::SkillLoader;
pub use tables::TablesLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
