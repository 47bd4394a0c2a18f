//! Battle events and the bus that carries them.
//!
//! Listeners registered on the [`EventBus`] run synchronously at emit time;
//! async consumers (presenters, waiters) read the broadcast tap instead.

mod bus;
mod types;

pub use bus::{EventBus, ListenerError, ListenerFault, ListenerResult, Subscription};
pub use types::{AnimationData, AnimationKind, BattleEvent, Event, EventKind};
