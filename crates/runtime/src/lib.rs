//! Async runtime for turn-based battles.
//!
//! [`BattleEngine`] owns the battle and walks it through its phases:
//! `idle → initializing → round_start → preparation → execution → round_end`,
//! looping until one side is defeated or the round limit is reached. Every
//! state change is published on the [`EventBus`]; resolved actions are paced
//! through the animation queue, which waits for a [`Presenter`] to acknowledge
//! each animation or times out.
//!
//! Modules are organized by responsibility:
//! - [`engine`] hosts the phase state machine and its command API
//! - [`events`] provides the kind-filtered event bus
//! - [`queue`] holds the action and animation queues
//! - [`presenter`] bridges animations to a renderer
//! - [`oracle`] lends skill, buff and balance content to the engine
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod oracle;
pub mod presenter;
pub mod queue;

pub use clock::{Clock, ManualClock, TokioClock};
pub use config::{AnimationTimings, BusConfig, EngineOptions};
pub use engine::{
    AdvanceReport, BattleEngine, BattleLog, BattlePhase, BattleSnapshot, EngineBuilder, LogEntry,
};
pub use error::{ActionRejection, BusError, EngineError, Result, RuntimeFailure};
pub use events::{
    AnimationData, AnimationKind, BattleEvent, Event, EventBus, EventKind, ListenerFault,
    ListenerResult, Subscription,
};
pub use oracle::OracleManager;
pub use presenter::{
    AnimationCue, InstantPresenter, PacedPresenter, Presenter, spawn_presenter,
};
pub use queue::{AnimationEvent, AnimationPlayQueue, BattleQueueManager, PlayReport};
