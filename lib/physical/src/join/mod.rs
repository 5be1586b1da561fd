//! Joining bindings streams.
//!
//! A [JoinAction] is handed to a [JoinMediator], which asks every registered [JoinActor] whether
//! it can execute the action and at which cost. The cheapest applicable actor runs the join.

mod action;
mod actor;
mod coefficients;
mod hash;
mod mediator;

pub use action::{JoinAction, JoinActionMetadata, JoinEntry, JoinOutput, JoinType};
pub use actor::JoinActor;
pub use coefficients::{estimate_join_coefficients, JoinCoefficients};
pub use hash::HashJoinActor;
pub use mediator::JoinMediator;
