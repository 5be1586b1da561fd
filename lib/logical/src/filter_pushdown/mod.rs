mod conjunction;
mod equality;
mod heuristic;
mod relocation;
mod rule;

pub use heuristic::{should_attempt_push_down, PushdownCapabilities};
pub use rule::FilterPushdownRule;

/// The name of the filter pushdown rule. Used as the `actor` of log events.
pub(crate) const FILTER_PUSHDOWN: &str = "filter-pushdown";
