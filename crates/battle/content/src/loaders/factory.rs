//! Content factory for building oracles from data files.

use std::path::{Path, PathBuf};

use anyhow::Context;
use battle_core::BalanceTables;

use crate::loaders::{BuffLoader, LoadResult, Scenario, ScenarioLoader, SkillLoader, TablesLoader};
use crate::registry::ContentRegistry;

const BUILTIN_SKILLS: &str = include_str!("../../data/skills.ron");
const BUILTIN_BUFFS: &str = include_str!("../../data/buffs.ron");
const BUILTIN_TABLES: &str = include_str!("../../data/tables.toml");

/// Scenarios shipped with the crate, by name.
const BUILTIN_SCENARIOS: &[(&str, &str)] = &[
    ("demo", include_str!("../../data/scenarios/demo.ron")),
    ("duel", include_str!("../../data/scenarios/duel.ron")),
];

/// Content factory that loads battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── tables.toml
/// ├── skills.ron
/// ├── buffs.ron
/// └── scenarios/
///     ├── demo.ron
///     └── duel.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load balance tables from `tables.toml`.
    pub fn load_tables(&self) -> LoadResult<BalanceTables> {
        TablesLoader::load(&self.data_dir.join("tables.toml"))
    }

    /// Load skills and buffs into a validated registry.
    pub fn load_registry(&self) -> LoadResult<ContentRegistry> {
        let skills = SkillLoader::load(&self.data_dir.join("skills.ron"))?;
        let buffs = BuffLoader::load(&self.data_dir.join("buffs.ron"))?;
        let registry = ContentRegistry::from_parts(skills, buffs);
        registry
            .validate()
            .with_context(|| format!("Invalid content in {}", self.data_dir.display()))?;
        Ok(registry)
    }

    /// Load a scenario from `scenarios/{name}.ron`.
    pub fn load_scenario(&self, name: &str) -> LoadResult<Scenario> {
        let path = self.data_dir.join("scenarios").join(format!("{}.ron", name));
        ScenarioLoader::load(&path)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Registry built from the catalogs embedded in this crate.
    pub fn builtin_registry() -> LoadResult<ContentRegistry> {
        let skills = SkillLoader::parse(BUILTIN_SKILLS).context("builtin skills.ron")?;
        let buffs = BuffLoader::parse(BUILTIN_BUFFS).context("builtin buffs.ron")?;
        let registry = ContentRegistry::from_parts(skills, buffs);
        registry.validate().context("builtin content")?;
        Ok(registry)
    }

    /// Balance tables embedded in this crate.
    pub fn builtin_tables() -> LoadResult<BalanceTables> {
        TablesLoader::parse(BUILTIN_TABLES).context("builtin tables.toml")
    }

    /// An embedded scenario by name.
    pub fn builtin_scenario(name: &str) -> LoadResult<Scenario> {
        let (_, source) = BUILTIN_SCENARIOS
            .iter()
            .find(|(builtin, _)| *builtin == name)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown builtin scenario '{}' (available: {})",
                    name,
                    Self::builtin_scenario_names().collect::<Vec<_>>().join(", ")
                )
            })?;
        ScenarioLoader::parse(source).with_context(|| format!("builtin scenario {}", name))
    }

    pub fn builtin_scenario_names() -> impl Iterator<Item = &'static str> {
        BUILTIN_SCENARIOS.iter().map(|(name, _)| *name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{
        AreaShape, BuffId, BuffOracle, DamageType, EffectType, GroupShape, Roster, SkillId,
        SkillOracle, StatKind, UnitId,
    };

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn builtin_registry_is_consistent() {
        let registry = ContentFactory::builtin_registry().unwrap();
        assert!(registry.skill_count() >= 15);

        let fireball = registry.skill(&SkillId::new("fireball")).unwrap();
        assert_eq!(fireball.area, AreaShape::Group(GroupShape::Cross));
        assert_eq!(fireball.damage.unwrap().damage_type, DamageType::Magical);

        let shot = registry.skill(&SkillId::new("piercing_shot")).unwrap();
        assert_eq!(shot.damage.unwrap().damage_type, DamageType::True);

        let war_cry = registry.skill(&SkillId::new("war_cry")).unwrap();
        assert_eq!(war_cry.area, AreaShape::CasterCell);

        let haste = registry.buff(&BuffId::new("haste")).unwrap();
        assert_eq!(haste.effect_type, EffectType::StatBoost(StatKind::Speed));
        assert_eq!(registry.buff(&BuffId::new("iron_skin")).unwrap().duration, -1);
    }

    #[test]
    fn builtin_tables_match_defaults() {
        assert_eq!(
            ContentFactory::builtin_tables().unwrap(),
            BalanceTables::default()
        );
    }

    #[test]
    fn builtin_scenarios_build_rosters() {
        let registry = ContentFactory::builtin_registry().unwrap();
        for name in ContentFactory::builtin_scenario_names() {
            let scenario = ContentFactory::builtin_scenario(name).unwrap();
            for spec in scenario
                .setup
                .player_units
                .values()
                .chain(scenario.setup.enemy_units.values())
            {
                for skill in &spec.skills {
                    assert!(registry.skill(skill).is_some(), "{name}: unknown skill {skill}");
                }
            }
            let roster = Roster::from_setup(scenario.setup).unwrap();
            assert!(!roster.is_empty());
        }
    }

    #[test]
    fn duel_matches_training_numbers() {
        let scenario = ContentFactory::builtin_scenario("duel").unwrap();
        let p1 = &scenario.setup.player_units[&UnitId::new("p1")];
        assert_eq!(p1.stats.p_atk, 50);
        assert_eq!(p1.stats.speed, 20);
        assert_eq!(scenario.seed, Some(1));
    }

    #[test]
    fn unknown_builtin_scenario_is_an_error() {
        let err = ContentFactory::builtin_scenario("nope").unwrap_err();
        assert!(err.to_string().contains("available"));
    }
}
