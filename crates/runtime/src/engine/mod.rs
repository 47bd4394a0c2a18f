//! Battle engine: the phase state machine and its command API.
//!
//! The engine exclusively owns the roster. Commands validate against the
//! current phase and either succeed or return an error without touching
//! state. Action resolution works on a draft (see
//! [`battle_core::resolve_action`]) that the engine commits in one write, and
//! the only suspension point is the animation wait inside execution.

mod log;
mod phase;
mod snapshot;

pub use log::{BattleLog, LOG_LIMIT, LogEntry};
pub use phase::BattlePhase;
pub use snapshot::{AdvanceReport, BattleSnapshot};

use std::collections::BTreeMap;
use std::sync::Arc;

use battle_core::buff;
use battle_core::{
    Action, ActionKind, ActionOutcome, BattleEnv, BattleResult, BattleSetup, BattleUnit,
    DecisionPolicy, EndReason, HeuristicAi, LevelScaledRewards, PcgRng, Resolution, ResultKind,
    RewardPolicy, Roster, Team, TurnOrder, UnitId, decide_outcome, resolve_action,
};
use tracing::{debug, error, info, warn};

use crate::clock::{Clock, TokioClock};
use crate::config::EngineOptions;
use crate::error::{ActionRejection, EngineError, Result, RuntimeFailure};
use crate::events::{BattleEvent, Event, EventBus, EventKind, ListenerResult, Subscription};
use crate::oracle::OracleManager;
use crate::queue::BattleQueueManager;

/// Mutable state of one battle, reset wholesale by [`BattleEngine::reset`].
struct BattleData {
    round: u32,
    roster: Roster,
    turn_order: TurnOrder,
    actions: BTreeMap<UnitId, Action>,
    active_units: Vec<UnitId>,
    log: BattleLog,
    rng: PcgRng,
    /// Outcome reached mid-execution; settled at round end.
    decided: Option<(ResultKind, EndReason)>,
    narrate: bool,
}

impl BattleData {
    fn new(seed: u64, narrate: bool) -> Self {
        Self {
            round: 0,
            roster: Roster::default(),
            turn_order: TurnOrder::default(),
            actions: BTreeMap::new(),
            active_units: Vec::new(),
            log: BattleLog::default(),
            rng: PcgRng::seeded(seed),
            decided: None,
            narrate,
        }
    }

    fn note(&mut self, message: String) {
        if self.narrate {
            info!(target: "battle::engine", round = self.round, "{}", message);
        }
        self.log.push(self.round, message);
    }

    fn hp_of(&self, unit: &UnitId) -> u32 {
        self.roster.get(unit).map_or(0, BattleUnit::current_hp)
    }

    fn pending_units(&self) -> Vec<UnitId> {
        self.active_units
            .iter()
            .filter(|id| !self.actions.contains_key(*id))
            .cloned()
            .collect()
    }

    fn validate(
        &self,
        env: BattleEnv<'_>,
        unit_id: &UnitId,
        action: &Action,
    ) -> std::result::Result<(), ActionRejection> {
        let unit = self
            .roster
            .get(unit_id)
            .ok_or_else(|| ActionRejection::UnknownUnit(unit_id.clone()))?;
        if &action.unit_id != unit_id {
            return Err(ActionRejection::ActorMismatch {
                submitter: unit_id.clone(),
                declared: action.unit_id.clone(),
            });
        }
        if unit.is_defeated() {
            return Err(ActionRejection::UnitDefeated(unit_id.clone()));
        }
        if !self.active_units.contains(unit_id) || !buff::can_unit_act(unit) {
            return Err(ActionRejection::CannotAct(unit_id.clone()));
        }

        match action.kind {
            ActionKind::Skill => {
                let skill_id = action
                    .skill_id
                    .as_ref()
                    .ok_or_else(|| ActionRejection::MissingSkill(unit_id.clone()))?;
                if env.skill(skill_id).is_none() {
                    return Err(ActionRejection::UnknownSkill(skill_id.clone()));
                }
                if !unit.knows_skill(skill_id) {
                    return Err(ActionRejection::SkillNotKnown {
                        unit: unit_id.clone(),
                        skill: skill_id.clone(),
                    });
                }
            }
            ActionKind::Attack if action.targets.is_empty() => {
                return Err(ActionRejection::MissingTarget(unit_id.clone()));
            }
            ActionKind::Attack | ActionKind::Defend => {}
        }
        if let Some(target) = action.targets.iter().find(|t| !self.roster.contains(t)) {
            return Err(ActionRejection::UnknownTarget(target.clone()));
        }

        if self.actions.contains_key(unit_id) {
            return Err(ActionRejection::Duplicate(unit_id.clone()));
        }
        Ok(())
    }

    fn store(&mut self, bus: &EventBus, action: Action) {
        let unit_id = action.unit_id.clone();
        debug!(target: "battle::engine", unit = %unit_id, kind = %action.kind, "action stored");
        bus.emit(BattleEvent::ActionSubmitted {
            round: self.round,
            unit_id: unit_id.clone(),
            kind: action.kind,
        });
        self.actions.insert(unit_id, action);
    }

    /// Lets `policy` declare for `unit_id`, defending if its choice is invalid.
    fn declare_with(
        &mut self,
        policy: &dyn DecisionPolicy,
        env: BattleEnv<'_>,
        bus: &EventBus,
        unit_id: &UnitId,
    ) -> std::result::Result<(), ActionRejection> {
        let chosen = policy.decide(unit_id, &self.roster, env, &mut self.rng);
        let action = match self.validate(env, unit_id, &chosen) {
            Ok(()) => chosen,
            Err(rejection) => {
                warn!(
                    target: "battle::engine",
                    unit = %unit_id,
                    error = %rejection,
                    "policy chose an invalid action, defending instead"
                );
                Action::defend(unit_id.clone())
            }
        };
        self.validate(env, unit_id, &action)?;
        self.store(bus, action);
        Ok(())
    }

    fn start_round(
        &mut self,
        env: BattleEnv<'_>,
        bus: &EventBus,
        policy: &dyn DecisionPolicy,
        auto_enemy_actions: bool,
    ) {
        self.round += 1;
        self.turn_order = TurnOrder::compute(&self.roster, &mut self.rng);

        for unit in self.roster.iter_mut() {
            unit.is_defending = false;
        }
        let mut ticks = Vec::new();
        for unit in self.roster.iter_mut() {
            ticks.extend(buff::tick_round_start(unit));
        }
        for tick in ticks {
            let amount = u32::try_from(tick.delta).unwrap_or(0);
            bus.emit(BattleEvent::UnitHealed {
                unit_id: tick.unit_id.clone(),
                source: None,
                amount,
                current_hp: self.hp_of(&tick.unit_id),
            });
            self.note(format!(
                "{} recovers {} HP from {}",
                tick.unit_id, amount, tick.buff_id
            ));
        }

        self.actions.clear();
        self.active_units = self
            .turn_order
            .active()
            .iter()
            .filter(|id| {
                self.roster
                    .get(id)
                    .is_some_and(|u| u.is_alive() && buff::can_unit_act(u))
            })
            .cloned()
            .collect();

        bus.emit(BattleEvent::RoundStarted {
            round: self.round,
            turn_order: self.turn_order.order().to_vec(),
        });
        self.note(format!("Round {} begins", self.round));

        if auto_enemy_actions {
            let enemies: Vec<UnitId> = self
                .active_units
                .iter()
                .filter(|id| self.roster.get(id).is_some_and(|u| u.team() == Team::Enemy))
                .cloned()
                .collect();
            for unit_id in enemies {
                if let Err(rejection) = self.declare_with(policy, env, bus, &unit_id) {
                    warn!(target: "battle::engine", unit = %unit_id, error = %rejection, "enemy action dropped");
                }
            }
        }
    }

    fn execute(
        &mut self,
        action: &Action,
        env: BattleEnv<'_>,
        bus: &EventBus,
    ) -> std::result::Result<ActionOutcome, RuntimeFailure> {
        let Resolution { outcome, roster } =
            resolve_action(&self.roster, action, env, &mut self.rng)?;
        self.roster = roster;
        self.announce(&outcome, bus);

        if self.decided.is_none() {
            self.decided = decide_outcome(
                self.roster.is_team_alive(Team::Player),
                self.roster.is_team_alive(Team::Enemy),
            );
        }
        Ok(outcome)
    }

    fn announce(&mut self, outcome: &ActionOutcome, bus: &EventBus) {
        bus.emit(BattleEvent::ActionExecuted {
            round: self.round,
            outcome: outcome.clone(),
        });

        let actor = &outcome.unit_id;
        if let Some(reason) = outcome.skip_reason {
            self.note(format!("{actor} loses the turn ({reason})"));
            return;
        }
        match (&outcome.kind, &outcome.skill_id) {
            (ActionKind::Defend, _) => self.note(format!("{actor} defends")),
            (ActionKind::Skill, Some(skill)) => self.note(format!("{actor} casts {skill}")),
            _ => {}
        }

        for hit in &outcome.hits {
            if hit.missed {
                self.note(format!("{} misses {}", hit.source, hit.target));
                continue;
            }
            bus.emit(BattleEvent::UnitDamaged {
                unit_id: hit.target.clone(),
                source: Some(hit.source.clone()),
                amount: hit.damage,
                absorbed: hit.absorbed,
                critical: hit.critical,
                remaining_hp: self.hp_of(&hit.target),
            });
            let critical = if hit.critical { " (critical)" } else { "" };
            self.note(format!(
                "{} hits {} for {}{}",
                hit.source, hit.target, hit.damage, critical
            ));
        }
        for heal in &outcome.heals {
            bus.emit(BattleEvent::UnitHealed {
                unit_id: heal.target.clone(),
                source: Some(heal.source.clone()),
                amount: heal.amount,
                current_hp: self.hp_of(&heal.target),
            });
            self.note(format!("{} heals {} for {}", heal.source, heal.target, heal.amount));
        }
        for change in &outcome.buffs_applied {
            bus.emit(BattleEvent::BuffApplied {
                unit_id: change.target.clone(),
                buff_id: change.buff_id.clone(),
                stacks: change.stacks,
            });
            self.note(format!("{} gains {}", change.target, change.buff_id));
        }
        for change in &outcome.buffs_removed {
            bus.emit(BattleEvent::BuffRemoved {
                unit_id: change.target.clone(),
                buff_id: change.buff_id.clone(),
            });
            self.note(format!("{} loses {}", change.target, change.buff_id));
        }
        for unit in &outcome.defeated {
            bus.emit(BattleEvent::UnitDefeated {
                unit_id: unit.clone(),
            });
            self.note(format!("{unit} is defeated"));
        }
    }

    /// End-of-round ticks and win check.
    ///
    /// Ticks run even when execution already decided the battle; the recorded
    /// outcome still stands.
    fn end_round(&mut self, bus: &EventBus) -> Option<(ResultKind, EndReason)> {
        let mut ticks = Vec::new();
        for unit in self.roster.iter_mut() {
            ticks.push((unit.id.clone(), buff::tick_round_end(unit)));
        }
        for (unit_id, tick) in ticks {
            for periodic in &tick.periodic {
                let amount = u32::try_from(-periodic.delta).unwrap_or(0);
                bus.emit(BattleEvent::UnitDamaged {
                    unit_id: unit_id.clone(),
                    source: None,
                    amount,
                    absorbed: 0,
                    critical: false,
                    remaining_hp: self.hp_of(&unit_id),
                });
                self.note(format!(
                    "{unit_id} takes {amount} damage from {}",
                    periodic.buff_id
                ));
            }
            for effect in &tick.expired {
                bus.emit(BattleEvent::BuffExpired {
                    unit_id: unit_id.clone(),
                    buff_id: effect.buff_id.clone(),
                });
            }
            if tick.defeated {
                bus.emit(BattleEvent::UnitDefeated {
                    unit_id: unit_id.clone(),
                });
                self.note(format!("{unit_id} is defeated"));
            }
        }

        self.actions.clear();
        bus.emit(BattleEvent::RoundEnded { round: self.round });

        self.decided.or_else(|| {
            decide_outcome(
                self.roster.is_team_alive(Team::Player),
                self.roster.is_team_alive(Team::Enemy),
            )
        })
    }
}

/// Turn-based battle engine.
///
/// Drive it with [`initialize`](Self::initialize),
/// [`submit_action`](Self::submit_action) and [`advance`](Self::advance);
/// observe it through [`state`](Self::state) and the event bus.
pub struct BattleEngine {
    options: EngineOptions,
    oracles: OracleManager,
    policy: Arc<dyn DecisionPolicy>,
    rewards: Arc<dyn RewardPolicy>,
    clock: Arc<dyn Clock>,
    bus: EventBus,
    queue: BattleQueueManager,
    seed: u64,
    phase: BattlePhase,
    battle: BattleData,
    result: Option<BattleResult>,
}

impl BattleEngine {
    pub fn new(options: EngineOptions, oracles: OracleManager) -> Self {
        Self::builder().options(options).oracles(oracles).build()
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Validates the setup, places the units and starts the battle.
    ///
    /// Only allowed in `idle`. With `auto_advance`, the first round start runs
    /// immediately and the engine waits in `preparation`.
    pub fn initialize(&mut self, setup: BattleSetup) -> Result<()> {
        if self.phase != BattlePhase::Idle {
            return Err(EngineError::EngineState {
                operation: "initialize",
                phase: self.phase,
            });
        }
        let roster = Roster::from_setup(setup)?;

        let started = self.transition(BattlePhase::Initializing);
        self.check(started)?;

        self.battle = BattleData::new(self.seed, self.options.enable_logging);
        self.battle.roster = roster;
        self.battle.turn_order = TurnOrder::compute(&self.battle.roster, &mut self.battle.rng);

        let team = |team: Team| -> Vec<UnitId> {
            self.battle
                .roster
                .team(team)
                .map(|u| u.id.clone())
                .collect()
        };
        let players = team(Team::Player);
        let enemies = team(Team::Enemy);
        self.battle.note(format!(
            "Battle initialized: {} players vs {} enemies (seed {})",
            players.len(),
            enemies.len(),
            self.seed
        ));
        self.bus
            .emit(BattleEvent::BattleInitialized { players, enemies });

        let ready = self.transition(BattlePhase::RoundStart);
        self.check(ready)?;

        if self.options.auto_advance {
            let round = self.step_round_start();
            self.check(round)?;
        }
        Ok(())
    }

    /// Stores a unit's action for the current round.
    pub fn submit_action(&mut self, unit_id: impl Into<UnitId>, action: Action) -> Result<()> {
        let unit_id = unit_id.into();
        self.require_preparation("submit_action")?;
        self.battle
            .validate(self.oracles.env(), &unit_id, &action)?;
        self.battle.store(&self.bus, action);
        Ok(())
    }

    /// Declares an action for `unit_id` with the engine's decision policy.
    pub fn submit_ai_action(&mut self, unit_id: impl Into<UnitId>) -> Result<()> {
        let unit_id = unit_id.into();
        self.require_preparation("submit_ai_action")?;
        let env = self.oracles.env();
        self.battle
            .declare_with(self.policy.as_ref(), env, &self.bus, &unit_id)?;
        Ok(())
    }

    fn require_preparation(&self, operation: &'static str) -> Result<()> {
        if self.phase == BattlePhase::Preparation {
            Ok(())
        } else {
            Err(EngineError::EngineState {
                operation,
                phase: self.phase,
            })
        }
    }

    /// Runs the current phase and moves to the next one.
    ///
    /// With `auto_advance` the engine keeps stepping until it needs actions
    /// or the battle is over. From `preparation`, the call is rejected while
    /// any active unit has no stored action.
    pub async fn advance(&mut self) -> Result<AdvanceReport> {
        let from = self.phase;
        let mut steps = 0;

        loop {
            self.step().await?;
            steps += 1;

            if !self.options.auto_advance || self.phase.is_terminal() {
                break;
            }
            if self.phase == BattlePhase::Preparation && !self.battle.pending_units().is_empty() {
                break;
            }
        }

        Ok(AdvanceReport {
            from,
            phase: self.phase,
            round: self.battle.round,
            steps,
            awaiting: self.pending_units(),
            result: self.result.clone(),
        })
    }

    async fn step(&mut self) -> Result<()> {
        let stepped = match self.phase {
            BattlePhase::Idle | BattlePhase::Completed | BattlePhase::Error => {
                return Err(EngineError::EngineState {
                    operation: "advance",
                    phase: self.phase,
                });
            }
            BattlePhase::Preparation => {
                let pending = self.battle.pending_units();
                if !pending.is_empty() {
                    return Err(EngineError::ActionsPending { pending });
                }
                self.transition(BattlePhase::Execution)
            }
            BattlePhase::Initializing => self.transition(BattlePhase::RoundStart),
            BattlePhase::RoundStart => self.step_round_start(),
            BattlePhase::Execution => self.step_execution().await,
            BattlePhase::RoundEnd => self.step_round_end(),
        };
        self.check(stepped)
    }

    fn step_round_start(&mut self) -> std::result::Result<(), RuntimeFailure> {
        let env = self.oracles.env();
        self.battle.start_round(
            env,
            &self.bus,
            self.policy.as_ref(),
            self.options.auto_enemy_actions,
        );
        self.transition(BattlePhase::Preparation)
    }

    async fn step_execution(&mut self) -> std::result::Result<(), RuntimeFailure> {
        let queue = &mut self.queue;
        let battle = &mut self.battle;
        let bus = &self.bus;
        let env = self.oracles.env();

        queue.load_round(&battle.turn_order, &battle.actions);
        while queue.has_next() {
            queue
                .execute_next(bus, |action| battle.execute(action, env, bus))
                .await?;
            if battle.decided.is_some() {
                queue.abort_round();
                break;
            }
        }

        self.transition(BattlePhase::RoundEnd)
    }

    fn step_round_end(&mut self) -> std::result::Result<(), RuntimeFailure> {
        if let Some((kind, reason)) = self.battle.end_round(&self.bus) {
            return self.finish(kind, reason);
        }
        if self.battle.round >= self.options.max_rounds {
            return self.finish(ResultKind::Draw, EndReason::RoundLimitReached);
        }
        self.transition(BattlePhase::RoundStart)
    }

    fn finish(
        &mut self,
        kind: ResultKind,
        reason: EndReason,
    ) -> std::result::Result<(), RuntimeFailure> {
        let units: Vec<&BattleUnit> = self.battle.roster.iter().collect();
        let result = BattleResult {
            kind,
            reason,
            rounds: self.battle.round,
            rewards: self.rewards.rewards(kind, &units),
            timestamp_ms: self.clock.now_ms(),
        };

        self.transition(BattlePhase::Completed)?;
        self.battle
            .note(format!("Battle over after {} rounds: {kind} ({reason})", result.rounds));
        self.result = Some(result.clone());
        self.bus.emit(BattleEvent::BattleCompleted { result });
        Ok(())
    }

    fn transition(&mut self, to: BattlePhase) -> std::result::Result<(), RuntimeFailure> {
        let from = self.phase;
        if !from.can_transition(to) {
            return Err(RuntimeFailure::IllegalTransition { from, to });
        }
        self.phase = to;
        debug!(target: "battle::engine", %from, %to, round = self.battle.round, "phase changed");
        self.bus.emit(BattleEvent::PhaseChanged {
            from,
            to,
            round: self.battle.round,
        });
        Ok(())
    }

    /// Moves the engine to `error` on internal failure.
    fn check<T>(&mut self, result: std::result::Result<T, RuntimeFailure>) -> Result<T> {
        result.map_err(|failure| self.fail(failure))
    }

    fn fail(&mut self, failure: RuntimeFailure) -> EngineError {
        let from = self.phase;
        error!(target: "battle::engine", phase = %from, error = %failure, "battle engine failed");
        self.queue.abort_round();
        self.phase = BattlePhase::Error;
        self.battle.note(format!("Engine failure: {failure}"));
        self.bus.emit(BattleEvent::PhaseChanged {
            from,
            to: BattlePhase::Error,
            round: self.battle.round,
        });
        self.bus.emit(BattleEvent::EngineFailed {
            message: failure.to_string(),
        });
        EngineError::Runtime(failure)
    }

    /// Returns to `idle` from any phase, discarding the battle.
    ///
    /// The RNG is reseeded with the engine's seed, so a reset engine replays
    /// the same battle given the same input. Listeners stay registered.
    pub fn reset(&mut self) {
        let from = self.phase;
        self.queue.abort_round();
        self.battle = BattleData::new(self.seed, self.options.enable_logging);
        self.result = None;
        self.phase = BattlePhase::Idle;
        self.bus.clear();
        if from != BattlePhase::Idle {
            self.bus.emit(BattleEvent::PhaseChanged {
                from,
                to: BattlePhase::Idle,
                round: 0,
            });
        }
        debug!(target: "battle::engine", %from, "engine reset");
    }

    pub fn state(&self) -> BattleSnapshot {
        BattleSnapshot {
            phase: self.phase,
            round: self.battle.round,
            seed: self.seed,
            units: self.battle.roster.iter().cloned().collect(),
            actions: self.battle.actions.values().cloned().collect(),
            turn_order: self.battle.turn_order.clone(),
            active_units: self.battle.active_units.clone(),
            pending_units: self.pending_units(),
            log: self.battle.log.entries().cloned().collect(),
            result: self.result.clone(),
        }
    }

    pub fn result(&self) -> Option<&BattleResult> {
        self.result.as_ref()
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.battle.round
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn unit(&self, id: &UnitId) -> Option<&BattleUnit> {
        self.battle.roster.get(id)
    }

    /// Active units still missing an action; empty outside `preparation`.
    pub fn pending_units(&self) -> Vec<UnitId> {
        if self.phase == BattlePhase::Preparation {
            self.battle.pending_units()
        } else {
            Vec::new()
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn subscribe<F>(&self, kind: EventKind, callback: F) -> Subscription
    where
        F: Fn(&Event) -> ListenerResult + Send + Sync + 'static,
    {
        self.bus.subscribe(kind, callback)
    }
}

/// Builder for [`BattleEngine`].
pub struct EngineBuilder {
    options: EngineOptions,
    oracles: Option<OracleManager>,
    clock: Option<Arc<dyn Clock>>,
    policy: Option<Arc<dyn DecisionPolicy>>,
    rewards: Option<Arc<dyn RewardPolicy>>,
}

impl EngineBuilder {
    fn new() -> Self {
        Self {
            options: EngineOptions::default(),
            oracles: None,
            clock: None,
            policy: None,
            rewards: None,
        }
    }

    pub fn options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Content and tables. Defaults to normal attacks only.
    pub fn oracles(mut self, oracles: OracleManager) -> Self {
        self.oracles = Some(oracles);
        self
    }

    /// Time source for timestamps and animation waits. Defaults to [`TokioClock`].
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Decision policy for AI-declared actions. Defaults to [`HeuristicAi`].
    pub fn policy(mut self, policy: impl DecisionPolicy + 'static) -> Self {
        self.policy = Some(Arc::new(policy));
        self
    }

    /// Reward computation. Defaults to [`LevelScaledRewards`].
    pub fn rewards(mut self, rewards: impl RewardPolicy + 'static) -> Self {
        self.rewards = Some(Arc::new(rewards));
        self
    }

    pub fn build(self) -> BattleEngine {
        let options = self.options;
        let seed = options.seed.unwrap_or_else(rand::random::<u64>);
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(TokioClock::new()) as Arc<dyn Clock>);
        let mut oracles = self.oracles.unwrap_or_default();
        if let Some(policy) = options.range_policy {
            oracles = oracles.with_range_policy(policy);
        }

        BattleEngine {
            bus: EventBus::new(options.bus, Arc::clone(&clock)),
            queue: BattleQueueManager::new(options.timings),
            policy: self.policy.unwrap_or_else(|| Arc::new(HeuristicAi)),
            rewards: self.rewards.unwrap_or_else(|| Arc::new(LevelScaledRewards)),
            battle: BattleData::new(seed, options.enable_logging),
            phase: BattlePhase::Idle,
            result: None,
            oracles,
            clock,
            seed,
            options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{BalanceTables, Stats, UnitSpec};

    fn engine() -> BattleEngine {
        BattleEngine::builder()
            .options(EngineOptions::default().with_seed(11).with_logging(false))
            .oracles(OracleManager::attacks_only(BalanceTables::deterministic()))
            .build()
    }

    fn setup() -> BattleSetup {
        BattleSetup::new()
            .player("p1", UnitSpec::new("p", Stats::default()))
            .enemy("e1", UnitSpec::new("e", Stats::default()))
    }

    #[test]
    fn builder_uses_the_configured_seed() {
        let engine = engine();
        assert_eq!(engine.seed(), 11);
        assert_eq!(engine.phase(), BattlePhase::Idle);
        assert!(engine.pending_units().is_empty());
    }

    #[test]
    fn initialize_without_auto_advance_stops_at_round_start() {
        let mut engine = engine();
        engine.initialize(setup()).unwrap();
        assert_eq!(engine.phase(), BattlePhase::RoundStart);
        assert_eq!(engine.round(), 0);
        assert_eq!(engine.state().units.len(), 2);
    }

    #[test]
    fn range_policy_option_reaches_the_tables() {
        let engine = BattleEngine::builder()
            .options(
                EngineOptions::default()
                    .with_range_policy(battle_core::RangePolicy::ColumnDistance { max: 1 }),
            )
            .build();
        assert_eq!(
            engine.oracles.env().combat().range_policy,
            battle_core::RangePolicy::ColumnDistance { max: 1 }
        );
    }

    #[test]
    fn reset_from_idle_is_silent() {
        let mut engine = engine();
        engine.reset();
        assert!(engine.bus().history().is_empty());
    }
}
