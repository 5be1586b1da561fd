use rdf_federation_common::JoinCostWeights;
use rdf_federation_model::BindingsMetadata;

/// Describes the estimated effort of executing a join.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JoinCoefficients {
    /// The number of iterations over bindings.
    pub iterations: f64,
    /// The number of bindings held in memory.
    pub persisted_items: f64,
    /// The number of bindings that must be consumed before the first result is produced.
    pub blocking_items: f64,
    /// The time spent waiting for the sources of both inputs.
    pub request_time: f64,
}

impl JoinCoefficients {
    /// Combines the coefficients into a single cost value.
    pub fn cost(&self, weights: &JoinCostWeights) -> f64 {
        self.iterations * weights.cpu
            + self.persisted_items * weights.memory
            + self.blocking_items * weights.time
            + self.request_time * weights.io
    }
}

/// Estimates the coefficients of a hash join of two inputs.
///
/// The input with the smaller cardinality becomes the build side, so the result does not depend
/// on the order of the arguments.
pub fn estimate_join_coefficients(
    left: &BindingsMetadata,
    right: &BindingsMetadata,
    can_handle_undefs: bool,
) -> JoinCoefficients {
    let (build, probe) = if right.cardinality().value() < left.cardinality().value() {
        (right, left)
    } else {
        (left, right)
    };

    let build_cardinality = build.cardinality().value();
    let probe_cardinality = probe.cardinality().value();

    let mut iterations = build_cardinality + probe_cardinality;
    if !can_handle_undefs {
        iterations *= 0.8;
    }

    JoinCoefficients {
        iterations,
        persisted_items: build_cardinality,
        blocking_items: build_cardinality,
        request_time: build.request_initial_time()
            + build_cardinality * build.request_item_time()
            + probe.request_initial_time()
            + probe_cardinality * probe.request_item_time(),
    }
}
