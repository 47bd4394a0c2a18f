//! Bridge between the animation queue and whatever renders the battle.
//!
//! A presenter watches for `AnimationStarted`, plays the animation, and the
//! bridge acknowledges it with `AnimationCompleted` carrying the same id. The
//! engine proceeds after a timeout when no acknowledgement arrives, so running
//! without any presenter only costs wall time.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use battle_core::UnitId;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::events::{AnimationData, AnimationKind, BattleEvent, EventBus};

/// One animation as seen by a presenter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimationCue {
    pub anim_id: u64,
    pub kind: AnimationKind,
    pub unit_id: UnitId,
    pub duration_ms: u64,
    pub delay_ms: u64,
    pub data: AnimationData,
}

impl AnimationCue {
    fn from_event(event: &BattleEvent) -> Option<Self> {
        match event {
            BattleEvent::AnimationStarted {
                anim_id,
                kind,
                unit_id,
                duration_ms,
                delay_ms,
                data,
            } => Some(Self {
                anim_id: *anim_id,
                kind: *kind,
                unit_id: unit_id.clone(),
                duration_ms: *duration_ms,
                delay_ms: *delay_ms,
                data: data.clone(),
            }),
            _ => None,
        }
    }
}

/// Renders animations.
///
/// `present` returns once the animation finished playing; the bridge then
/// emits the completion event.
#[async_trait]
pub trait Presenter: Send + Sync + 'static {
    async fn present(&self, cue: &AnimationCue);
}

/// Acknowledges every animation immediately.
#[derive(Clone, Copy, Debug, Default)]
pub struct InstantPresenter;

#[async_trait]
impl Presenter for InstantPresenter {
    async fn present(&self, _cue: &AnimationCue) {}
}

/// Waits out each animation's declared duration, scaled by `speed`.
#[derive(Clone, Copy, Debug)]
pub struct PacedPresenter {
    speed: f64,
}

impl PacedPresenter {
    pub fn new() -> Self {
        Self { speed: 1.0 }
    }

    /// Playback speed multiplier; 2.0 plays twice as fast.
    pub fn with_speed(speed: f64) -> Self {
        Self {
            speed: if speed > 0.0 { speed } else { 1.0 },
        }
    }
}

impl Default for PacedPresenter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Presenter for PacedPresenter {
    async fn present(&self, cue: &AnimationCue) {
        let ms = (cue.duration_ms as f64 / self.speed).round() as u64;
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

/// Runs `presenter` against the bus; abort the returned handle to stop it.
///
/// Every started animation is presented on its own task, so animations of one
/// action overlap the way the queue schedules them.
pub fn spawn_presenter<P: Presenter>(bus: &EventBus, presenter: P) -> JoinHandle<()> {
    let presenter = Arc::new(presenter);
    let mut receiver = bus.receiver();
    let bus = bus.clone();

    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let Some(cue) = AnimationCue::from_event(&event.payload) else {
                        continue;
                    };
                    let presenter = Arc::clone(&presenter);
                    let bus = bus.clone();
                    tokio::spawn(async move {
                        presenter.present(&cue).await;
                        bus.emit(BattleEvent::AnimationCompleted {
                            anim_id: cue.anim_id,
                        });
                    });
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(target: "battle::presenter", skipped, "presenter fell behind; animations will time out");
                }
                Err(RecvError::Closed) => {
                    debug!(target: "battle::presenter", "event bus closed, presenter stopping");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TokioClock;
    use crate::config::BusConfig;
    use crate::events::EventKind;

    fn started(anim_id: u64, duration_ms: u64) -> BattleEvent {
        BattleEvent::AnimationStarted {
            anim_id,
            kind: AnimationKind::Attack,
            unit_id: UnitId::new("p1"),
            duration_ms,
            delay_ms: 0,
            data: AnimationData::None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn instant_presenter_acknowledges() {
        let bus = EventBus::new(BusConfig::default(), Arc::new(TokioClock::new()));
        let _task = spawn_presenter(&bus, InstantPresenter);
        tokio::task::yield_now().await;

        let waiter = bus.wait_for_matching(
            EventKind::AnimationCompleted,
            |e| e.payload == BattleEvent::AnimationCompleted { anim_id: 3 },
            Duration::from_secs(1),
        );
        let emitter = bus.clone();
        let (done, _) = tokio::join!(waiter, async move {
            emitter.emit(started(3, 500));
        });
        assert!(done.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn paced_presenter_takes_the_declared_time() {
        let clock = Arc::new(TokioClock::new());
        let bus = EventBus::new(BusConfig::default(), clock.clone());
        let _task = spawn_presenter(&bus, PacedPresenter::with_speed(2.0));
        tokio::task::yield_now().await;

        let mut receiver = bus.receiver();
        bus.emit(started(1, 400));
        loop {
            let event = receiver.recv().await.unwrap();
            if event.kind() == EventKind::AnimationCompleted {
                assert_eq!(event.timestamp_ms, 200);
                break;
            }
        }
    }
}
