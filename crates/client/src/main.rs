//! Headless battle simulator.
//!
//! Loads a scenario (built-in name or RON file), runs it to completion with
//! the heuristic AI declaring for both sides, and prints the outcome.
//!
//! ```bash
//! cargo run -p battle-sim -- demo --seed 42
//! cargo run -p battle-sim -- path/to/scenario.ron --json
//! RUST_LOG=battle::queue=trace cargo run -p battle-sim -- duel --paced --speed 4
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use battle_content::{ContentFactory, Scenario, ScenarioLoader};
use battle_runtime::{
    BattleEngine, EngineOptions, InstantPresenter, OracleManager, PacedPresenter, spawn_presenter,
};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Run a turn-based battle scenario headlessly
#[derive(Parser)]
#[command(name = "battle-sim")]
#[command(version, long_about = None)]
struct Cli {
    /// Built-in scenario name or path to a scenario RON file
    #[arg(default_value = "demo")]
    scenario: String,

    /// RNG seed (overrides BATTLE_SEED and the scenario)
    #[arg(long)]
    seed: Option<u64>,

    /// Round limit (overrides the scenario)
    #[arg(long)]
    max_rounds: Option<u32>,

    /// Wait out animation durations instead of acknowledging instantly
    #[arg(long)]
    paced: bool,

    /// Playback speed multiplier for --paced
    #[arg(long, default_value_t = 1.0)]
    speed: f64,

    /// Print the final battle snapshot as JSON
    #[arg(long)]
    json: bool,

    /// List built-in scenarios and exit
    #[arg(long)]
    list: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if cli.list {
        for name in ContentFactory::builtin_scenario_names() {
            println!("{name}");
        }
        return Ok(());
    }

    let scenario = load_scenario(&cli.scenario)?;
    let options = engine_options(&cli, &scenario);
    let oracles = OracleManager::builtin().context("loading built-in content")?;
    let mut engine = BattleEngine::builder()
        .options(options)
        .oracles(oracles)
        .build();

    let presenter = if cli.paced {
        spawn_presenter(engine.bus(), PacedPresenter::with_speed(cli.speed))
    } else {
        spawn_presenter(engine.bus(), InstantPresenter)
    };

    info!(
        scenario = %scenario.name,
        seed = engine.seed(),
        max_rounds = engine.options().max_rounds,
        "starting battle"
    );
    engine
        .initialize(scenario.setup)
        .with_context(|| format!("scenario {}", scenario.name))?;

    while !engine.phase().is_terminal() {
        for unit in engine.pending_units() {
            engine.submit_ai_action(unit)?;
        }
        engine.advance().await?;
    }
    presenter.abort();

    let snapshot = engine.state();
    if cli.json {
        println!("{}", snapshot.to_json()?);
        return Ok(());
    }

    for entry in &snapshot.log {
        println!("[round {:>2}] {}", entry.round, entry.message);
    }
    println!();
    for unit in &snapshot.units {
        let side = if unit.is_player_unit { "player" } else { "enemy" };
        println!(
            "{:<8} {:<12} {:>4}/{:<4} HP",
            side,
            unit.name,
            unit.current_hp(),
            unit.max_hp()
        );
    }
    if let Some(result) = &snapshot.result {
        println!(
            "\n{} ({}) after {} rounds, {} exp, {} gold",
            result.kind, result.reason, result.rounds, result.rewards.experience, result.rewards.gold
        );
    }
    Ok(())
}

fn load_scenario(name: &str) -> Result<Scenario> {
    let path = Path::new(name);
    if path.extension().is_some_and(|ext| ext == "ron") || path.exists() {
        ScenarioLoader::load(path)
    } else {
        ContentFactory::builtin_scenario(name)
    }
}

/// Flags win over the scenario; an explicit `BATTLE_SEED` wins over the scenario seed.
fn engine_options(cli: &Cli, scenario: &Scenario) -> EngineOptions {
    let mut options = EngineOptions::from_env()
        .with_auto_advance(true)
        .with_auto_enemy_actions(true);

    if options.seed.is_none()
        && let Some(seed) = scenario.seed
    {
        options = options.with_seed(seed);
    }
    if let Some(rounds) = scenario.max_rounds {
        options = options.with_max_rounds(rounds);
    }
    if let Some(seed) = cli.seed {
        options = options.with_seed(seed);
    }
    if let Some(rounds) = cli.max_rounds {
        options = options.with_max_rounds(rounds);
    }
    options
}
