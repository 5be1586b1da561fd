//! The query algebra consumed and produced by the optimizer.

mod display;
mod expression;
mod operation;
mod tree_node;

pub use expression::{AggregateKind, Expression, Operator};
pub use operation::{OrderExpression, Operation, QuadPattern};
