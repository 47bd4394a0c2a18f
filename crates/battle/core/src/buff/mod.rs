//! Buff and status effect management.
//!
//! - [`apply_buff`] attaches an effect according to its stack policy.
//! - [`tick_round_start`] / [`tick_round_end`] run periodic effects and expiry.
//! - Query helpers turn active effects into stat values, damage multipliers
//!   and gating decisions.

mod apply;
mod query;
mod remove;
mod tick;

pub use apply::{ApplyOutcome, apply_buff, instantiate, level_multiplier};
pub use query::{
    can_unit_act, can_unit_be_targeted, can_unit_use_skill, effective_stat, flat_reduction_bonus,
    forced_target, heal_bonus, incoming_damage_multiplier, outgoing_damage_multiplier,
    reflect_ratio,
};
pub use remove::{break_sleep, remove_buff, remove_by_category, remove_selected};
pub use tick::{PeriodicTick, RoundEndTick, tick_round_end, tick_round_start};
