use crate::algebra::Operation;
use rdf_federation_model::Variable;

/// The children of an operation, partitioned by how their variables overlap with the variables
/// of an expression.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct OverlapPartition {
    /// Children whose in-scope variables contain all variables.
    pub full: Vec<Operation>,
    /// Children that share some, but not all, variables.
    pub partial: Vec<Operation>,
    /// Children that share no variable.
    pub none: Vec<Operation>,
}

/// Partitions `children` by the overlap of their in-scope variables with `variables`.
///
/// The order of the children is retained within each partition.
pub fn classify_overlap(children: Vec<Operation>, variables: &[Variable]) -> OverlapPartition {
    let mut partition = OverlapPartition::default();
    for child in children {
        let child_variables = child.in_scope_variables();
        if is_subset_of(variables, &child_variables) {
            partition.full.push(child);
        } else if intersects(variables, &child_variables) {
            partition.partial.push(child);
        } else {
            partition.none.push(child);
        }
    }
    partition
}

/// Returns whether `a` and `b` share at least one variable.
pub fn intersects(a: &[Variable], b: &[Variable]) -> bool {
    a.iter().any(|variable| b.contains(variable))
}

/// Returns whether every variable of `needles` is contained in `haystack`.
pub fn is_subset_of(needles: &[Variable], haystack: &[Variable]) -> bool {
    needles.len() <= haystack.len() && needles.iter().all(|needle| haystack.contains(needle))
}
