extern crate core;

pub mod algebra;
pub mod filter_pushdown;
mod optimizer;
mod overlap;
mod variables;

pub use optimizer::{AlgebraOptimizerRule, QueryOptimizer};
pub use overlap::{classify_overlap, intersects, is_subset_of, OverlapPartition};
pub use variables::{expression_variables, referenced_variables};

use rdf_federation_common::DFResult;
