mod binding;
mod metadata;

pub use binding::*;
pub use metadata::*;

// Re-export some oxrdf types.
pub use oxrdf::vocab;
pub use oxrdf::{
    BlankNode, BlankNodeRef, Literal, LiteralRef, NamedNode, NamedNodeRef, Subject, Term, TermRef,
    Triple, Variable, VariableRef,
};

// Re-export the spargebra types used by the query algebra.
pub use spargebra::algebra::{AggregateFunction, Function, GraphTarget, PropertyPathExpression};
pub use spargebra::term::{NamedNodePattern, TermPattern, TriplePattern};
