//! Planning - turns a free-text request into an ordered plan
//!
//! The executor only consumes [`Plan`]s, so any planner that implements
//! [`Planner`] can be swapped in.

mod rules;

pub use rules::RulePlanner;

use crate::core::Plan;

/// Maps a request to a plan. Implementations must be pure and never return
/// an empty plan.
pub trait Planner {
    fn plan(&self, app_name: &str, request: &str) -> Plan;
}
