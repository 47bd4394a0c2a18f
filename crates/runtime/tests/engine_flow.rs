use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use battle_content::{ContentFactory, ContentRegistry};
use battle_core::{
    Action, ActionKind, AreaShape, BalanceTables, BattleSetup, BuffDefinition, EffectType,
    EndReason, EntryTarget, ResultKind, SkillDefinition, SkillId, SkillOracle, Stats,
    TargetSide, UnitId, UnitSpec,
};
use battle_runtime::{
    ActionRejection, BattleEngine, BattleEvent, BattlePhase, EngineError, EngineOptions,
    EventKind, OracleManager, RuntimeFailure,
};

fn options() -> EngineOptions {
    EngineOptions::default()
        .with_seed(7)
        .with_auto_advance(true)
        .with_auto_enemy_actions(false)
        .with_logging(false)
}

fn engine_with(options: EngineOptions) -> BattleEngine {
    BattleEngine::builder()
        .options(options)
        .oracles(OracleManager::attacks_only(BalanceTables::deterministic()))
        .build()
}

fn fighter(hp: u32, p_atk: u32, speed: u32) -> UnitSpec {
    UnitSpec::new(
        "fighter",
        Stats {
            hp,
            p_atk,
            speed,
            ..Stats::default()
        },
    )
}

fn duel(player: UnitSpec, enemy: UnitSpec) -> BattleSetup {
    BattleSetup::new().player("p1", player).enemy("e1", enemy)
}

fn hp(engine: &BattleEngine, id: &str) -> u32 {
    engine.unit(&UnitId::new(id)).map_or(0, |u| u.current_hp())
}

async fn trade_blows(engine: &mut BattleEngine) {
    engine.submit_action("p1", Action::attack("p1", "e1")).unwrap();
    engine.submit_action("e1", Action::attack("e1", "p1")).unwrap();
    engine.advance().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn stronger_player_wins_while_enemy_hp_keeps_dropping() {
    let mut engine = engine_with(options());
    engine
        .initialize(duel(fighter(100, 50, 20), fighter(100, 0, 10)))
        .unwrap();
    assert_eq!(engine.phase(), BattlePhase::Preparation);

    let mut last = hp(&engine, "e1");
    while engine.phase() == BattlePhase::Preparation {
        trade_blows(&mut engine).await;
        let now = hp(&engine, "e1");
        assert!(now < last, "enemy hp went from {last} to {now}");
        last = now;
    }

    let result = engine.result().expect("battle finished");
    assert_eq!(engine.phase(), BattlePhase::Completed);
    assert_eq!(result.kind, ResultKind::Victory);
    assert_eq!(result.reason, EndReason::AllEnemiesDefeated);
    assert_eq!(result.rounds, 2);
    assert_eq!(hp(&engine, "p1"), 100);
    assert!(result.rewards.experience > 0);
    assert_eq!(engine.bus().history_of(EventKind::BattleCompleted).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn enemy_action_after_the_wipe_is_not_executed() {
    let mut engine = engine_with(options());
    engine
        .initialize(duel(fighter(100, 200, 20), fighter(100, 500, 10)))
        .unwrap();
    trade_blows(&mut engine).await;

    assert_eq!(engine.result().map(|r| r.kind), Some(ResultKind::Victory));
    assert_eq!(hp(&engine, "p1"), 100);
    let executed = engine.bus().history_of(EventKind::ActionExecuted);
    assert_eq!(executed.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn reflected_damage_wiping_both_sides_is_a_defeat() {
    let oracles = OracleManager::from_registry(
        ContentFactory::builtin_registry().unwrap(),
        BalanceTables::deterministic(),
    );
    let mut engine = BattleEngine::builder()
        .options(options())
        .oracles(oracles)
        .build();

    let guard = UnitSpec::new(
        "guard",
        Stats {
            hp: 100,
            mp: 20,
            p_atk: 0,
            speed: 20,
            ..Stats::default()
        },
    )
    .with_skills([SkillId::new("thorn_guard")]);
    engine
        .initialize(duel(fighter(20, 100, 10), guard))
        .unwrap();

    engine
        .submit_action("e1", Action::skill("e1", "thorn_guard", Vec::new()))
        .unwrap();
    engine.submit_action("p1", Action::attack("p1", "e1")).unwrap();
    engine.advance().await.unwrap();

    let result = engine.result().expect("battle finished");
    assert_eq!(result.kind, ResultKind::Defeat);
    assert_eq!(result.reason, EndReason::MutualDefeat);
    assert_eq!(result.rewards.experience, 0);
    assert_eq!(hp(&engine, "p1"), 0);
    assert_eq!(hp(&engine, "e1"), 0);
}

#[tokio::test(start_paused = true)]
async fn defending_halves_physical_damage_for_one_round() {
    let mut engine = engine_with(options());
    engine
        .initialize(duel(fighter(100, 0, 20), fighter(100, 40, 10)))
        .unwrap();

    engine.submit_action("p1", Action::defend("p1")).unwrap();
    engine.submit_action("e1", Action::attack("e1", "p1")).unwrap();
    engine.advance().await.unwrap();
    assert_eq!(hp(&engine, "p1"), 80);

    let snapshot = engine.state();
    assert_eq!(snapshot.round, 2);
    assert!(!snapshot.unit(&UnitId::new("p1")).unwrap().is_defending);

    trade_blows(&mut engine).await;
    assert_eq!(hp(&engine, "p1"), 40);
}

#[tokio::test(start_paused = true)]
async fn same_seed_and_actions_replay_identically() {
    let run = || async {
        let mut engine = BattleEngine::builder()
            .options(options().with_seed(99))
            .oracles(OracleManager::attacks_only(BalanceTables::default()))
            .build();
        engine
            .initialize(duel(fighter(120, 30, 10), fighter(120, 30, 10)))
            .unwrap();
        while engine.phase() == BattlePhase::Preparation {
            trade_blows(&mut engine).await;
        }
        let snapshot = engine.state();
        (snapshot.units, snapshot.result.map(|r| (r.kind, r.reason, r.rounds)))
    };

    let first = run().await;
    let second = run().await;
    assert_eq!(first, second);
}

#[tokio::test(start_paused = true)]
async fn round_limit_ends_in_a_draw() {
    let mut engine = engine_with(options().with_max_rounds(3));
    engine
        .initialize(duel(fighter(100, 0, 10), fighter(100, 0, 12)))
        .unwrap();
    while engine.phase() == BattlePhase::Preparation {
        trade_blows(&mut engine).await;
    }

    let result = engine.result().expect("battle finished");
    assert_eq!(result.kind, ResultKind::Draw);
    assert_eq!(result.reason, EndReason::RoundLimitReached);
    assert_eq!(result.rounds, 3);
}

#[tokio::test(start_paused = true)]
async fn advance_refuses_while_actions_are_missing() {
    let mut engine = engine_with(options());
    engine
        .initialize(duel(fighter(100, 10, 10), fighter(100, 10, 5)))
        .unwrap();
    engine.submit_action("p1", Action::attack("p1", "e1")).unwrap();

    let err = engine.advance().await.unwrap_err();
    match err {
        EngineError::ActionsPending { pending } => assert_eq!(pending, vec![UnitId::new("e1")]),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(engine.phase(), BattlePhase::Preparation);
    assert_eq!(engine.pending_units(), vec![UnitId::new("e1")]);
}

#[tokio::test(start_paused = true)]
async fn invalid_submissions_are_rejected_without_side_effects() {
    let mut engine = engine_with(options());
    let err = engine
        .submit_action("p1", Action::attack("p1", "e1"))
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::EngineState {
            phase: BattlePhase::Idle,
            ..
        }
    ));

    engine
        .initialize(duel(fighter(100, 10, 10), fighter(100, 10, 5)))
        .unwrap();

    let rejection = |err: EngineError| match err {
        EngineError::ActionValidation(rejection) => rejection,
        other => panic!("expected a rejected action, got {other}"),
    };

    let err = engine
        .submit_action("ghost", Action::attack("ghost", "e1"))
        .unwrap_err();
    assert!(matches!(rejection(err), ActionRejection::UnknownUnit(_)));

    let err = engine
        .submit_action("p1", Action::attack("p1", "nobody"))
        .unwrap_err();
    assert!(matches!(rejection(err), ActionRejection::UnknownTarget(_)));

    let err = engine
        .submit_action("p1", Action::attack("e1", "p1"))
        .unwrap_err();
    assert!(matches!(rejection(err), ActionRejection::ActorMismatch { .. }));

    let no_skill = Action {
        unit_id: UnitId::new("p1"),
        kind: ActionKind::Skill,
        skill_id: None,
        targets: vec![UnitId::new("e1")],
    };
    let err = engine.submit_action("p1", no_skill).unwrap_err();
    assert!(matches!(rejection(err), ActionRejection::MissingSkill(_)));

    let err = engine
        .submit_action("p1", Action::skill("p1", "fireball", [UnitId::new("e1")]))
        .unwrap_err();
    assert!(matches!(rejection(err), ActionRejection::UnknownSkill(_)));

    assert!(engine.state().actions.is_empty());

    engine.submit_action("p1", Action::attack("p1", "e1")).unwrap();
    let err = engine
        .submit_action("p1", Action::defend("p1"))
        .unwrap_err();
    assert!(matches!(rejection(err), ActionRejection::Duplicate(_)));
    assert_eq!(engine.state().actions, vec![Action::attack("p1", "e1")]);

    let err = engine
        .initialize(duel(fighter(1, 1, 1), fighter(1, 1, 1)))
        .unwrap_err();
    assert!(matches!(err, EngineError::EngineState { operation: "initialize", .. }));
}

#[tokio::test(start_paused = true)]
async fn bad_setup_leaves_the_engine_idle() {
    let mut engine = engine_with(options());
    let err = engine.initialize(BattleSetup::new()).unwrap_err();
    assert!(matches!(err, EngineError::ConfigValidation(_)));
    assert_eq!(engine.phase(), BattlePhase::Idle);
    assert!(engine.bus().history().is_empty());
}

#[tokio::test(start_paused = true)]
async fn manual_stepping_visits_every_phase() {
    let mut engine = engine_with(options().with_auto_advance(false));
    engine
        .initialize(duel(fighter(100, 10, 10), fighter(100, 10, 5)))
        .unwrap();
    assert_eq!(engine.phase(), BattlePhase::RoundStart);

    let report = engine.advance().await.unwrap();
    assert_eq!(report.phase, BattlePhase::Preparation);
    assert_eq!(report.steps, 1);
    assert_eq!(report.awaiting.len(), 2);

    engine.submit_action("p1", Action::attack("p1", "e1")).unwrap();
    engine.submit_action("e1", Action::attack("e1", "p1")).unwrap();
    assert_eq!(engine.advance().await.unwrap().phase, BattlePhase::Execution);
    assert_eq!(engine.advance().await.unwrap().phase, BattlePhase::RoundEnd);
    assert_eq!(engine.advance().await.unwrap().phase, BattlePhase::RoundStart);

    let phases: Vec<(BattlePhase, BattlePhase)> = engine
        .bus()
        .history_of(EventKind::PhaseChanged)
        .into_iter()
        .filter_map(|event| match event.payload {
            BattleEvent::PhaseChanged { from, to, .. } => Some((from, to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        vec![
            (BattlePhase::Idle, BattlePhase::Initializing),
            (BattlePhase::Initializing, BattlePhase::RoundStart),
            (BattlePhase::RoundStart, BattlePhase::Preparation),
            (BattlePhase::Preparation, BattlePhase::Execution),
            (BattlePhase::Execution, BattlePhase::RoundEnd),
            (BattlePhase::RoundEnd, BattlePhase::RoundStart),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn enemies_declare_automatically_when_enabled() {
    let mut engine = engine_with(options().with_auto_enemy_actions(true));
    engine
        .initialize(duel(fighter(100, 10, 10), fighter(100, 10, 5)))
        .unwrap();

    assert_eq!(engine.pending_units(), vec![UnitId::new("p1")]);
    engine.submit_ai_action("p1").unwrap();
    assert!(engine.pending_units().is_empty());
    engine.advance().await.unwrap();
    assert_eq!(engine.round(), 2);
}

#[tokio::test(start_paused = true)]
async fn reset_replays_the_same_battle() {
    let mut engine = engine_with(options());
    let setup = duel(fighter(100, 30, 20), fighter(100, 20, 10));

    engine.initialize(setup.clone()).unwrap();
    while engine.phase() == BattlePhase::Preparation {
        trade_blows(&mut engine).await;
    }
    let first = engine.state();

    engine.reset();
    assert_eq!(engine.phase(), BattlePhase::Idle);
    assert_eq!(engine.round(), 0);
    assert!(engine.result().is_none());
    assert_eq!(engine.bus().history_of(EventKind::BattleCompleted).len(), 0);

    engine.initialize(setup).unwrap();
    while engine.phase() == BattlePhase::Preparation {
        trade_blows(&mut engine).await;
    }
    let second = engine.state();
    assert_eq!(first.units, second.units);
    assert_eq!(
        first.result.map(|r| (r.kind, r.rounds)),
        second.result.map(|r| (r.kind, r.rounds))
    );
}

/// Guaranteed periodic effects: `curse` (50 per round), `sting` (10 per
/// round) and the self-cast `mend` (heals 10 at round start).
fn afflictions() -> BattleEngine {
    let registry = ContentRegistry::from_parts(
        [
            SkillDefinition::new("curse", "Curse").applying("venom", 1.0, EntryTarget::Targets),
            SkillDefinition::new("sting", "Sting").applying("toxin", 1.0, EntryTarget::Targets),
            SkillDefinition::new("mend", "Mend")
                .targeting(TargetSide::Caster, AreaShape::CasterCell)
                .applying("mending", 1.0, EntryTarget::Caster),
        ],
        [
            BuffDefinition::new("venom", "Venom", EffectType::DamageOverTime, 2, 50.0).debuff(),
            BuffDefinition::new("toxin", "Toxin", EffectType::DamageOverTime, 3, 10.0).debuff(),
            BuffDefinition::new("mending", "Mending", EffectType::HealOverTime, 2, 10.0),
        ],
    );

    BattleEngine::builder()
        .options(options())
        .oracles(OracleManager::from_registry(
            registry,
            BalanceTables::deterministic(),
        ))
        .build()
}

fn with_skill(spec: UnitSpec, skill: &str) -> UnitSpec {
    spec.with_skills([SkillId::new(skill)])
}

fn periodic_damage(engine: &BattleEngine, id: &str) -> Vec<u32> {
    engine
        .bus()
        .history_of(EventKind::UnitDamaged)
        .into_iter()
        .filter_map(|event| match event.payload {
            BattleEvent::UnitDamaged {
                unit_id,
                source: None,
                amount,
                ..
            } if unit_id.as_str() == id => Some(amount),
            _ => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn poison_finishing_the_last_enemy_at_round_end_is_a_victory() {
    let mut engine = afflictions();
    engine
        .initialize(duel(
            with_skill(fighter(100, 0, 20), "curse"),
            fighter(50, 0, 10),
        ))
        .unwrap();

    engine
        .submit_action("p1", Action::skill("p1", "curse", [UnitId::new("e1")]))
        .unwrap();
    engine.submit_action("e1", Action::defend("e1")).unwrap();
    engine.advance().await.unwrap();

    assert_eq!(engine.phase(), BattlePhase::Completed);
    let result = engine.result().expect("battle finished");
    assert_eq!(result.kind, ResultKind::Victory);
    assert_eq!(result.reason, EndReason::AllEnemiesDefeated);
    assert_eq!(result.rounds, 1);
    assert_eq!(result.rewards.experience, 10);
    assert_eq!(hp(&engine, "e1"), 0);
    assert_eq!(periodic_damage(&engine, "e1"), vec![50]);
    assert_eq!(engine.bus().history_of(EventKind::UnitDefeated).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn poison_wiping_both_sides_at_round_end_is_a_defeat() {
    let mut engine = afflictions();
    engine
        .initialize(duel(
            with_skill(fighter(50, 0, 20), "curse"),
            with_skill(fighter(50, 0, 10), "curse"),
        ))
        .unwrap();

    engine
        .submit_action("p1", Action::skill("p1", "curse", [UnitId::new("e1")]))
        .unwrap();
    engine
        .submit_action("e1", Action::skill("e1", "curse", [UnitId::new("p1")]))
        .unwrap();
    engine.advance().await.unwrap();

    let result = engine.result().expect("battle finished");
    assert_eq!(result.kind, ResultKind::Defeat);
    assert_eq!(result.reason, EndReason::MutualDefeat);
    assert_eq!(result.rewards.experience, 0);
    assert_eq!(hp(&engine, "p1"), 0);
    assert_eq!(hp(&engine, "e1"), 0);
    assert_eq!(engine.bus().history_of(EventKind::UnitDefeated).len(), 2);
}

#[tokio::test(start_paused = true)]
async fn heal_over_time_ticks_when_the_next_round_starts() {
    let mut engine = afflictions();
    engine
        .initialize(duel(
            with_skill(fighter(100, 0, 20), "mend"),
            fighter(100, 30, 10),
        ))
        .unwrap();

    engine
        .submit_action("p1", Action::skill("p1", "mend", Vec::new()))
        .unwrap();
    engine.submit_action("e1", Action::attack("e1", "p1")).unwrap();
    engine.advance().await.unwrap();

    assert_eq!(engine.round(), 2);
    assert_eq!(engine.phase(), BattlePhase::Preparation);
    let hit = engine
        .bus()
        .history_of(EventKind::UnitDamaged)
        .into_iter()
        .find_map(|event| match event.payload {
            BattleEvent::UnitDamaged {
                source: Some(_),
                amount,
                ..
            } => Some(amount),
            _ => None,
        })
        .expect("enemy attack landed");
    assert!(hit > 10);

    let heals: Vec<(u32, u32)> = engine
        .bus()
        .history_of(EventKind::UnitHealed)
        .into_iter()
        .filter_map(|event| match event.payload {
            BattleEvent::UnitHealed {
                source: None,
                amount,
                current_hp,
                ..
            } => Some((amount, current_hp)),
            _ => None,
        })
        .collect();
    assert_eq!(heals, vec![(10, 100 - hit + 10)]);
    assert_eq!(hp(&engine, "p1"), 100 - hit + 10);
}

#[tokio::test(start_paused = true)]
async fn round_end_ticks_still_run_after_an_execution_victory() {
    let mut engine = afflictions();
    engine
        .initialize(duel(
            fighter(100, 100, 10),
            with_skill(fighter(50, 0, 20), "sting"),
        ))
        .unwrap();

    engine
        .submit_action("e1", Action::skill("e1", "sting", [UnitId::new("p1")]))
        .unwrap();
    engine.submit_action("p1", Action::attack("p1", "e1")).unwrap();
    engine.advance().await.unwrap();

    let result = engine.result().expect("battle finished");
    assert_eq!(result.kind, ResultKind::Victory);
    assert_eq!(result.reason, EndReason::AllEnemiesDefeated);
    assert_eq!(periodic_damage(&engine, "p1"), vec![10]);
    assert_eq!(hp(&engine, "p1"), 90);
    assert_eq!(hp(&engine, "e1"), 0);
}

struct FlakySkills {
    inner: ContentRegistry,
    available: Arc<AtomicBool>,
}

impl SkillOracle for FlakySkills {
    fn skill(&self, id: &SkillId) -> Option<&SkillDefinition> {
        if self.available.load(Ordering::SeqCst) {
            self.inner.skill(id)
        } else {
            None
        }
    }
}

#[tokio::test(start_paused = true)]
async fn resolution_failure_moves_the_engine_to_error() {
    let available = Arc::new(AtomicBool::new(true));
    let skills = FlakySkills {
        inner: ContentFactory::builtin_registry().unwrap(),
        available: Arc::clone(&available),
    };
    let oracles = OracleManager::new(
        Arc::new(skills),
        Arc::new(ContentFactory::builtin_registry().unwrap()),
        Arc::new(BalanceTables::deterministic()),
    );
    let mut engine = BattleEngine::builder()
        .options(options())
        .oracles(oracles)
        .build();

    let caster = UnitSpec::new(
        "caster",
        Stats {
            mp: 30,
            speed: 20,
            ..Stats::default()
        },
    )
    .with_skills([SkillId::new("power_strike")]);
    engine
        .initialize(duel(caster, fighter(100, 10, 5)))
        .unwrap();
    engine
        .submit_action("p1", Action::skill("p1", "power_strike", [UnitId::new("e1")]))
        .unwrap();
    engine.submit_action("e1", Action::attack("e1", "p1")).unwrap();

    available.store(false, Ordering::SeqCst);
    let err = engine.advance().await.unwrap_err();
    assert!(matches!(err, EngineError::Runtime(RuntimeFailure::Combat(_))));
    assert_eq!(engine.phase(), BattlePhase::Error);
    assert_eq!(engine.bus().history_of(EventKind::EngineFailed).len(), 1);

    let err = engine.advance().await.unwrap_err();
    assert!(matches!(err, EngineError::EngineState { phase: BattlePhase::Error, .. }));

    engine.reset();
    assert_eq!(engine.phase(), BattlePhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn snapshot_serializes_to_json() {
    let mut engine = engine_with(options());
    engine
        .initialize(duel(fighter(100, 10, 10), fighter(100, 10, 5)))
        .unwrap();
    trade_blows(&mut engine).await;

    let json = engine.state().to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["phase"], "preparation");
    assert_eq!(value["round"], 2);
    assert_eq!(value["units"].as_array().map(Vec::len), Some(2));
    assert!(!engine.state().log.is_empty());
}
