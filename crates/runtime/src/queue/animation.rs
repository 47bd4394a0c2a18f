//! Presentation pacing for resolved actions.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use battle_core::{ActionKind, ActionOutcome, UnitId};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::config::AnimationTimings;
use crate::events::{AnimationData, AnimationKind, BattleEvent, EventBus};

/// One timed presentation step.
///
/// `delay_ms` is relative to the moment the sequence starts playing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimationEvent {
    pub kind: AnimationKind,
    pub unit_id: UnitId,
    pub duration_ms: u64,
    pub delay_ms: u64,
    pub data: AnimationData,
}

/// What happened while playing a sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayReport {
    pub played: usize,
    pub completed: usize,
    pub timed_out: usize,
    /// Starts the bus refused (disabled or deduplicated); never awaited.
    pub dropped: usize,
}

/// Turns action outcomes into animation sequences and plays them.
#[derive(Debug)]
pub struct AnimationPlayQueue {
    timings: AnimationTimings,
    queued: Vec<AnimationEvent>,
    next_anim_id: u64,
}

impl AnimationPlayQueue {
    pub fn new(timings: AnimationTimings) -> Self {
        Self {
            timings,
            queued: Vec::new(),
            next_anim_id: 1,
        }
    }

    pub fn timings(&self) -> &AnimationTimings {
        &self.timings
    }

    /// Maps a resolved action to its presentation events.
    ///
    /// Skipped or effect-free actions produce an empty sequence.
    pub fn generate_sequence(&self, outcome: &ActionOutcome) -> Vec<AnimationEvent> {
        if outcome.skipped {
            return Vec::new();
        }
        let t = &self.timings;
        let actor = &outcome.unit_id;

        match outcome.kind {
            ActionKind::Defend => vec![AnimationEvent {
                kind: AnimationKind::Defend,
                unit_id: actor.clone(),
                duration_ms: t.defend_ms,
                delay_ms: 0,
                data: AnimationData::None,
            }],
            ActionKind::Attack => {
                let Some(first) = outcome.hits.iter().find(|h| !h.reflected) else {
                    return Vec::new();
                };
                let mut sequence = vec![AnimationEvent {
                    kind: AnimationKind::Attack,
                    unit_id: actor.clone(),
                    duration_ms: t.attack_ms,
                    delay_ms: 0,
                    data: AnimationData::Strike {
                        target: first.target.clone(),
                    },
                }];
                self.push_impacts(&mut sequence, outcome, t.hit_delay_ms(t.attack_ms));
                sequence
            }
            ActionKind::Skill => {
                if outcome.is_empty() {
                    return Vec::new();
                }
                let mut targets: Vec<UnitId> = Vec::new();
                let touched = outcome
                    .hits
                    .iter()
                    .filter(|h| !h.reflected)
                    .map(|h| &h.target)
                    .chain(outcome.heals.iter().map(|h| &h.target))
                    .chain(outcome.buffs_applied.iter().map(|b| &b.target))
                    .chain(outcome.buffs_removed.iter().map(|b| &b.target));
                for id in touched {
                    if !targets.contains(id) {
                        targets.push(id.clone());
                    }
                }

                let mut sequence = vec![AnimationEvent {
                    kind: AnimationKind::Skill,
                    unit_id: actor.clone(),
                    duration_ms: t.skill_ms,
                    delay_ms: 0,
                    data: match &outcome.skill_id {
                        Some(skill_id) => AnimationData::Cast {
                            skill_id: skill_id.clone(),
                            targets,
                        },
                        None => AnimationData::None,
                    },
                }];
                self.push_impacts(&mut sequence, outcome, t.hit_delay_ms(t.skill_ms));
                sequence
            }
        }
    }

    /// Hit, heal and death events, all anchored on `impact_ms`.
    fn push_impacts(&self, sequence: &mut Vec<AnimationEvent>, outcome: &ActionOutcome, impact_ms: u64) {
        let t = &self.timings;

        for hit in &outcome.hits {
            sequence.push(AnimationEvent {
                kind: AnimationKind::Hit,
                unit_id: hit.target.clone(),
                duration_ms: t.hit_ms,
                delay_ms: impact_ms,
                data: AnimationData::Damage {
                    source: hit.source.clone(),
                    amount: hit.damage,
                    critical: hit.critical,
                    missed: hit.missed,
                },
            });
        }
        for heal in &outcome.heals {
            sequence.push(AnimationEvent {
                kind: AnimationKind::Heal,
                unit_id: heal.target.clone(),
                duration_ms: t.heal_ms,
                delay_ms: impact_ms,
                data: AnimationData::Heal {
                    source: heal.source.clone(),
                    amount: heal.amount,
                },
            });
        }
        for unit in &outcome.defeated {
            sequence.push(AnimationEvent {
                kind: AnimationKind::Death,
                unit_id: unit.clone(),
                duration_ms: t.death_ms,
                delay_ms: impact_ms + t.hit_ms,
                data: AnimationData::None,
            });
        }
    }

    pub fn enqueue(&mut self, events: impl IntoIterator<Item = AnimationEvent>) {
        self.queued.extend(events);
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }

    /// Plays every queued event concurrently and waits for all of them.
    ///
    /// Each start is emitted once its delay has elapsed. An event counts as
    /// finished when its `AnimationCompleted` arrives, or is abandoned at
    /// `delay + duration + grace`.
    pub async fn play_all(&mut self, bus: &EventBus) -> PlayReport {
        let mut events = std::mem::take(&mut self.queued);
        let mut report = PlayReport::default();
        if events.is_empty() {
            return report;
        }
        events.sort_by_key(|e| e.delay_ms);
        let mut waiting: VecDeque<AnimationEvent> = events.into();

        let clock = Arc::clone(bus.clock());
        // Subscribe before the first start so no acknowledgement is missed.
        let mut receiver = bus.receiver();
        let started = clock.now_ms();
        let mut pending: BTreeMap<u64, u64> = BTreeMap::new();

        loop {
            let elapsed = clock.now_ms().saturating_sub(started);

            while waiting.front().is_some_and(|e| e.delay_ms <= elapsed) {
                let Some(event) = waiting.pop_front() else {
                    break;
                };
                let anim_id = self.next_anim_id;
                self.next_anim_id += 1;
                report.played += 1;

                let deadline =
                    event.delay_ms + event.duration_ms + self.timings.completion_grace_ms;
                let emitted = bus.emit(BattleEvent::AnimationStarted {
                    anim_id,
                    kind: event.kind,
                    unit_id: event.unit_id,
                    duration_ms: event.duration_ms,
                    delay_ms: event.delay_ms,
                    data: event.data,
                });
                if emitted.is_some() {
                    pending.insert(anim_id, deadline);
                } else {
                    report.dropped += 1;
                }
            }

            pending.retain(|anim_id, deadline| {
                if *deadline > elapsed {
                    return true;
                }
                warn!(target: "battle::queue", anim_id, "animation not acknowledged, moving on");
                report.timed_out += 1;
                false
            });

            if waiting.is_empty() && pending.is_empty() {
                break;
            }

            let next_start = waiting.front().map(|e| e.delay_ms);
            let next_deadline = pending.values().min().copied();
            let wake = next_start
                .into_iter()
                .chain(next_deadline)
                .min()
                .unwrap_or(elapsed);
            let sleep_for = Duration::from_millis(wake.saturating_sub(elapsed));

            tokio::select! {
                biased;
                received = receiver.recv() => match received {
                    Ok(event) => {
                        if let BattleEvent::AnimationCompleted { anim_id } = event.payload
                            && pending.remove(&anim_id).is_some()
                        {
                            report.completed += 1;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(target: "battle::queue", skipped, "animation waiter lagged");
                    }
                    Err(RecvError::Closed) => {
                        report.timed_out += pending.len();
                        pending.clear();
                    }
                },
                _ = clock.sleep(sleep_for) => {}
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{Action, HealRecord, HitRecord, SkipReason};

    fn hit(source: &str, target: &str, damage: u32, defeated: bool) -> HitRecord {
        HitRecord {
            source: UnitId::new(source),
            target: UnitId::new(target),
            damage,
            absorbed: 0,
            critical: false,
            missed: false,
            reflected: false,
            target_defeated: defeated,
        }
    }

    fn queue() -> AnimationPlayQueue {
        AnimationPlayQueue::new(AnimationTimings::default())
    }

    #[test]
    fn attack_yields_attack_hit_and_death() {
        let mut outcome = ActionOutcome::new(&Action::attack("p1", "e1"));
        outcome.hits.push(hit("p1", "e1", 40, true));
        outcome.defeated.push(UnitId::new("e1"));

        let sequence = queue().generate_sequence(&outcome);
        let t = AnimationTimings::default();
        let kinds: Vec<_> = sequence.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![AnimationKind::Attack, AnimationKind::Hit, AnimationKind::Death]
        );
        assert_eq!(sequence[1].delay_ms, t.hit_delay_ms(t.attack_ms));
        assert_eq!(sequence[2].delay_ms, sequence[1].delay_ms + t.hit_ms);
        assert_eq!(sequence[2].unit_id, UnitId::new("e1"));
    }

    #[test]
    fn survivor_gets_no_death_event() {
        let mut outcome = ActionOutcome::new(&Action::attack("p1", "e1"));
        outcome.hits.push(hit("p1", "e1", 10, false));
        let sequence = queue().generate_sequence(&outcome);
        assert!(sequence.iter().all(|e| e.kind != AnimationKind::Death));
    }

    #[test]
    fn skipped_action_has_no_animation() {
        let outcome =
            ActionOutcome::skipped(&Action::attack("p1", "e1"), SkipReason::ActorDefeated);
        assert!(queue().generate_sequence(&outcome).is_empty());
    }

    #[test]
    fn heal_skill_yields_skill_and_heal() {
        let mut outcome = ActionOutcome::new(&Action::skill("p1", "heal", [UnitId::new("p2")]));
        outcome.heals.push(HealRecord {
            source: UnitId::new("p1"),
            target: UnitId::new("p2"),
            amount: 30,
        });
        let sequence = queue().generate_sequence(&outcome);
        assert_eq!(sequence[0].kind, AnimationKind::Skill);
        assert_eq!(sequence[1].kind, AnimationKind::Heal);
        assert_eq!(sequence[1].unit_id, UnitId::new("p2"));
    }

    #[test]
    fn defend_is_a_single_event() {
        let outcome = ActionOutcome::new(&Action::defend("p1"));
        let sequence = queue().generate_sequence(&outcome);
        assert_eq!(sequence.len(), 1);
        assert_eq!(sequence[0].kind, AnimationKind::Defend);
    }
}
