//! Dual execution queue.
//!
//! [`UnitActionQueue`] fixes the logical order of the round;
//! [`AnimationPlayQueue`] paces presentation of each resolved action against
//! acknowledgements arriving on the event bus. [`BattleQueueManager`] drives
//! both one action at a time.

mod actions;
mod animation;
mod manager;

pub use actions::UnitActionQueue;
pub use animation::{AnimationEvent, AnimationPlayQueue, PlayReport};
pub use manager::BattleQueueManager;
