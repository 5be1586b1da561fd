/// Configures the filter pushdown rule.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(
    clippy::struct_excessive_bools,
    reason = "Each flag toggles an independent rewrite"
)]
pub struct FilterPushdownConfig {
    /// Push filters down even if the cost heuristic advises against it.
    pub aggressive_pushdown: bool,
    /// The maximum number of whole-tree passes.
    pub max_iterations: usize,
    /// Split conjunctions into separate filters before pushing them down.
    pub split_conjunctive: bool,
    /// Merge filters that end up stacked on top of each other into a single conjunction.
    pub merge_conjunctive: bool,
    /// Allow pushing filters into the required side of a left join.
    pub push_into_left_joins: bool,
    /// Allow substituting `?var = <constant>` filters into patterns.
    pub push_equality_into_patterns: bool,
}

impl Default for FilterPushdownConfig {
    fn default() -> Self {
        Self {
            aggressive_pushdown: false,
            max_iterations: 10,
            split_conjunctive: true,
            merge_conjunctive: true,
            push_into_left_joins: true,
            push_equality_into_patterns: true,
        }
    }
}

impl FilterPushdownConfig {
    #[must_use]
    pub fn with_aggressive_pushdown(mut self, aggressive_pushdown: bool) -> Self {
        self.aggressive_pushdown = aggressive_pushdown;
        self
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    #[must_use]
    pub fn with_split_conjunctive(mut self, split_conjunctive: bool) -> Self {
        self.split_conjunctive = split_conjunctive;
        self
    }

    #[must_use]
    pub fn with_merge_conjunctive(mut self, merge_conjunctive: bool) -> Self {
        self.merge_conjunctive = merge_conjunctive;
        self
    }

    #[must_use]
    pub fn with_push_into_left_joins(mut self, push_into_left_joins: bool) -> Self {
        self.push_into_left_joins = push_into_left_joins;
        self
    }

    #[must_use]
    pub fn with_push_equality_into_patterns(mut self, push_equality_into_patterns: bool) -> Self {
        self.push_equality_into_patterns = push_equality_into_patterns;
        self
    }
}

/// The weights used for turning join coefficients into a single cost value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JoinCostWeights {
    /// Weight of the number of iterations.
    pub cpu: f64,
    /// Weight of the number of items kept in memory.
    pub memory: f64,
    /// Weight of the number of items that must be consumed before the first result.
    pub time: f64,
    /// Weight of the time spent waiting for requests.
    pub io: f64,
}

impl Default for JoinCostWeights {
    fn default() -> Self {
        Self {
            cpu: 1.0,
            memory: 1.0,
            time: 10.0,
            io: 100.0,
        }
    }
}
