//! Engine construction options.
use std::env;

use battle_core::RangePolicy;
use serde::{Deserialize, Serialize};

/// Options fixed for the lifetime of a [`BattleEngine`](crate::BattleEngine).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Emit the engine's info-level narration through `tracing`.
    pub enable_logging: bool,
    /// Keep stepping through phases until input is needed or the battle ends.
    pub auto_advance: bool,
    /// Round after which an undecided battle ends in a draw.
    pub max_rounds: u32,
    /// RNG seed; a random seed is drawn at construction when absent.
    pub seed: Option<u64>,
    /// Let the AI declare actions for enemy units at round start.
    pub auto_enemy_actions: bool,
    pub timings: AnimationTimings,
    pub bus: BusConfig,
    /// Overrides the attack range policy of the balance tables.
    pub range_policy: Option<RangePolicy>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            enable_logging: true,
            auto_advance: false,
            max_rounds: 30,
            seed: None,
            auto_enemy_actions: true,
            timings: AnimationTimings::default(),
            bus: BusConfig::default(),
            range_policy: None,
        }
    }
}

impl EngineOptions {
    /// Construct options from environment variables.
    ///
    /// Environment variables:
    /// - `BATTLE_MAX_ROUNDS` - Round limit (default: 30, minimum 1)
    /// - `BATTLE_SEED` - Fixed RNG seed
    /// - `BATTLE_AUTO_ADVANCE` - `true`/`false`
    /// - `BATTLE_LOGGING` - `true`/`false`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`EngineOptions::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut options = Self::default();

        if let Some(rounds) = parse::<u32>(lookup("BATTLE_MAX_ROUNDS")) {
            options.max_rounds = rounds.max(1);
        }
        if let Some(seed) = parse::<u64>(lookup("BATTLE_SEED")) {
            options.seed = Some(seed);
        }
        if let Some(auto) = parse::<bool>(lookup("BATTLE_AUTO_ADVANCE")) {
            options.auto_advance = auto;
        }
        if let Some(logging) = parse::<bool>(lookup("BATTLE_LOGGING")) {
            options.enable_logging = logging;
        }

        options
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_rounds(mut self, rounds: u32) -> Self {
        self.max_rounds = rounds.max(1);
        self
    }

    pub fn with_auto_advance(mut self, auto: bool) -> Self {
        self.auto_advance = auto;
        self
    }

    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }

    pub fn with_auto_enemy_actions(mut self, enabled: bool) -> Self {
        self.auto_enemy_actions = enabled;
        self
    }

    pub fn with_timings(mut self, timings: AnimationTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn with_bus(mut self, bus: BusConfig) -> Self {
        self.bus = bus;
        self
    }

    pub fn with_range_policy(mut self, policy: RangePolicy) -> Self {
        self.range_policy = Some(policy);
        self
    }
}

fn parse<T: std::str::FromStr>(value: Option<String>) -> Option<T> {
    value?.trim().parse().ok()
}

/// Declared durations of the presentation events, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationTimings {
    pub attack_ms: u64,
    pub hit_ms: u64,
    pub death_ms: u64,
    pub skill_ms: u64,
    pub heal_ms: u64,
    pub defend_ms: u64,
    /// Point of the attack (0..=1) at which the hit lands.
    pub hit_fraction: f64,
    /// Extra wait granted past `delay + duration` before an
    /// unacknowledged animation is abandoned.
    pub completion_grace_ms: u64,
}

impl AnimationTimings {
    /// Delay of the hit event relative to the start of its attack.
    pub fn hit_delay_ms(&self, attack_ms: u64) -> u64 {
        (attack_ms as f64 * self.hit_fraction.clamp(0.0, 1.0)).round() as u64
    }
}

impl Default for AnimationTimings {
    fn default() -> Self {
        Self {
            attack_ms: 500,
            hit_ms: 300,
            death_ms: 800,
            skill_ms: 800,
            heal_ms: 400,
            defend_ms: 300,
            hit_fraction: 0.6,
            completion_grace_ms: 1_000,
        }
    }
}

/// Event bus sizing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    pub history_limit: usize,
    /// Window in which identical keyed events are dropped; 0 disables it.
    pub dedup_window_ms: u64,
    /// Buffer of the async broadcast channel.
    pub channel_capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            history_limit: 1_000,
            dedup_window_ms: 100,
            channel_capacity: 256,
        }
    }
}
