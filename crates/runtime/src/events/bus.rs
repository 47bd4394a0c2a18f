//! Synchronous pub/sub bus with history, dedup and an async tap.

use std::collections::{HashMap, VecDeque};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, trace, warn};

use super::types::{BattleEvent, Event, EventKind};
use crate::clock::Clock;
use crate::config::BusConfig;
use crate::error::BusError;

/// Error type listeners may return; it is recorded, never propagated.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;
pub type ListenerResult = Result<(), ListenerError>;

type Callback = Arc<dyn Fn(&Event) -> ListenerResult + Send + Sync>;

/// Dedup entries are pruned once the table grows past this size.
const DEDUP_PRUNE_THRESHOLD: usize = 256;

#[derive(Clone)]
enum Filter {
    All,
    Kinds(Vec<EventKind>),
}

impl Filter {
    fn matches(&self, kind: EventKind) -> bool {
        match self {
            Filter::All => true,
            Filter::Kinds(kinds) => kinds.contains(&kind),
        }
    }
}

struct Listener {
    id: u64,
    filter: Filter,
    once: bool,
    callback: Callback,
}

/// A listener that failed while handling an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListenerFault {
    pub listener_id: u64,
    pub event_id: u64,
    pub kind: EventKind,
    pub message: String,
    pub panicked: bool,
}

struct BusState {
    enabled: bool,
    listeners: Vec<Listener>,
    history: VecDeque<Event>,
    recent: HashMap<String, u64>,
    faults: VecDeque<ListenerFault>,
    next_event_id: u64,
    next_listener_id: u64,
    suppressed: u64,
}

struct BusInner {
    state: Mutex<BusState>,
    sender: broadcast::Sender<Event>,
    clock: Arc<dyn Clock>,
    config: BusConfig,
}

impl BusInner {
    fn lock(&self) -> MutexGuard<'_, BusState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn remove_listener(&self, id: u64) -> bool {
        let mut state = self.lock();
        let before = state.listeners.len();
        state.listeners.retain(|l| l.id != id);
        state.listeners.len() != before
    }
}

/// Event bus shared by the engine, its queues and presenters.
///
/// Callbacks run synchronously inside [`EventBus::emit`], after the internal
/// lock is released, so a listener may emit further events. Every emitted
/// event is also pushed to a tokio broadcast channel for async consumers.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    pub fn new(config: BusConfig, clock: Arc<dyn Clock>) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            inner: Arc::new(BusInner {
                state: Mutex::new(BusState {
                    enabled: true,
                    listeners: Vec::new(),
                    history: VecDeque::new(),
                    recent: HashMap::new(),
                    faults: VecDeque::new(),
                    next_event_id: 1,
                    next_listener_id: 1,
                    suppressed: 0,
                }),
                sender,
                clock,
                config,
            }),
        }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.inner.clock
    }

    /// Publishes an event.
    ///
    /// Returns `None` when the bus is disabled or the event was suppressed as
    /// a duplicate within the dedup window.
    pub fn emit(&self, payload: BattleEvent) -> Option<Event> {
        let now = self.inner.clock.now_ms();
        let kind = payload.kind();

        let (event, callbacks) = {
            let mut state = self.inner.lock();
            if !state.enabled {
                return None;
            }

            let window = self.inner.config.dedup_window_ms;
            if window > 0
                && let Some(key) = payload.dedup_key()
            {
                let seen = state.recent.get(&key).copied();
                if let Some(seen) = seen
                    && now.saturating_sub(seen) < window
                {
                    state.suppressed += 1;
                    trace!(target: "battle::bus", %kind, key = %key, "duplicate event suppressed");
                    return None;
                }
                if state.recent.len() >= DEDUP_PRUNE_THRESHOLD {
                    state.recent.retain(|_, seen| now.saturating_sub(*seen) < window);
                }
                state.recent.insert(key, now);
            }

            let event = Event {
                id: state.next_event_id,
                timestamp_ms: now,
                payload,
            };
            state.next_event_id += 1;

            state.history.push_back(event.clone());
            while state.history.len() > self.inner.config.history_limit {
                state.history.pop_front();
            }

            let mut callbacks = Vec::new();
            state.listeners.retain(|listener| {
                if !listener.filter.matches(kind) {
                    return true;
                }
                callbacks.push((listener.id, Arc::clone(&listener.callback)));
                !listener.once
            });
            (event, callbacks)
        };

        // No receivers is the normal case for headless runs.
        let _ = self.inner.sender.send(event.clone());

        for (listener_id, callback) in callbacks {
            let fault = match catch_unwind(AssertUnwindSafe(|| callback(&event))) {
                Ok(Ok(())) => None,
                Ok(Err(error)) => Some((error.to_string(), false)),
                Err(panic) => Some((panic_message(panic.as_ref()), true)),
            };
            if let Some((message, panicked)) = fault {
                warn!(
                    target: "battle::bus",
                    listener_id,
                    %kind,
                    panicked,
                    error = %message,
                    "listener failed, continuing"
                );
                let mut state = self.inner.lock();
                state.faults.push_back(ListenerFault {
                    listener_id,
                    event_id: event.id,
                    kind,
                    message,
                    panicked,
                });
                while state.faults.len() > self.inner.config.history_limit {
                    state.faults.pop_front();
                }
            }
        }

        Some(event)
    }

    /// Registers `callback` for one event kind.
    pub fn subscribe<F>(&self, kind: EventKind, callback: F) -> Subscription
    where
        F: Fn(&Event) -> ListenerResult + Send + Sync + 'static,
    {
        self.register(Filter::Kinds(vec![kind]), false, Arc::new(callback))
    }

    /// Registers one callback for several event kinds.
    pub fn subscribe_multiple<F>(&self, kinds: &[EventKind], callback: F) -> Subscription
    where
        F: Fn(&Event) -> ListenerResult + Send + Sync + 'static,
    {
        self.register(Filter::Kinds(kinds.to_vec()), false, Arc::new(callback))
    }

    /// Registers `callback` for every event.
    pub fn subscribe_all<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Event) -> ListenerResult + Send + Sync + 'static,
    {
        self.register(Filter::All, false, Arc::new(callback))
    }

    /// Registers `callback` for the next event of `kind` only.
    pub fn once<F>(&self, kind: EventKind, callback: F) -> Subscription
    where
        F: Fn(&Event) -> ListenerResult + Send + Sync + 'static,
    {
        self.register(Filter::Kinds(vec![kind]), true, Arc::new(callback))
    }

    fn register(&self, filter: Filter, once: bool, callback: Callback) -> Subscription {
        let mut state = self.inner.lock();
        let id = state.next_listener_id;
        state.next_listener_id += 1;
        state.listeners.push(Listener {
            id,
            filter,
            once,
            callback,
        });
        Subscription {
            id,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Removes a listener by id. Returns whether it was registered.
    pub fn unsubscribe(&self, listener_id: u64) -> bool {
        self.inner.remove_listener(listener_id)
    }

    /// Async receiver of every event emitted from now on.
    pub fn receiver(&self) -> broadcast::Receiver<Event> {
        self.inner.sender.subscribe()
    }

    /// Waits for the next event of `kind`.
    pub async fn wait_for(&self, kind: EventKind, timeout: Duration) -> Result<Event, BusError> {
        self.wait_for_matching(kind, |_| true, timeout).await
    }

    /// Waits for the next event of `kind` accepted by `predicate`.
    ///
    /// Only events emitted after this call are considered.
    pub async fn wait_for_matching<P>(
        &self,
        kind: EventKind,
        predicate: P,
        timeout: Duration,
    ) -> Result<Event, BusError>
    where
        P: Fn(&Event) -> bool,
    {
        let mut receiver = self.receiver();
        let wait = async {
            loop {
                match receiver.recv().await {
                    Ok(event) if event.kind() == kind && predicate(&event) => return Ok(event),
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(target: "battle::bus", skipped, "waiter lagged behind");
                    }
                    Err(broadcast::error::RecvError::Closed) => return Err(BusError::Closed),
                }
            }
        };

        tokio::select! {
            biased;
            result = wait => result,
            _ = self.inner.clock.sleep(timeout) => Err(BusError::Timeout {
                kind,
                waited_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.inner.lock().enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.lock().enabled
    }

    pub fn history(&self) -> Vec<Event> {
        self.inner.lock().history.iter().cloned().collect()
    }

    pub fn history_of(&self, kind: EventKind) -> Vec<Event> {
        self.inner
            .lock()
            .history
            .iter()
            .filter(|e| e.kind() == kind)
            .cloned()
            .collect()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }

    /// Most recent listener failures, oldest first, capped like the history.
    pub fn listener_faults(&self) -> Vec<ListenerFault> {
        self.inner.lock().faults.iter().cloned().collect()
    }

    /// Number of emissions dropped by the dedup window.
    pub fn suppressed_count(&self) -> u64 {
        self.inner.lock().suppressed
    }

    /// Forgets history, dedup keys and recorded faults. Listeners stay.
    pub fn clear(&self) {
        let mut state = self.inner.lock();
        state.history.clear();
        state.recent.clear();
        state.faults.clear();
        state.suppressed = 0;
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "listener panicked".to_owned()
    }
}

/// Handle returned by the subscribe methods.
///
/// Dropping the handle keeps the listener registered; call
/// [`Subscription::unsubscribe`] to remove it.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    bus: Weak<BusInner>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Removes the listener. Returns false if it was already gone.
    pub fn unsubscribe(self) -> bool {
        self.bus
            .upgrade()
            .is_some_and(|bus| bus.remove_listener(self.id))
    }
}
