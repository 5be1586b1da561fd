use crate::algebra::Expression;
use rdf_federation_common::{OperationKind, SourceAnnotation};
use rdf_federation_model::{
    GraphTarget, NamedNode, NamedNodePattern, PropertyPathExpression, Term, TermPattern,
    TriplePattern, Variable,
};
use std::fmt::{Display, Formatter};

/// A quad pattern. A missing `graph` refers to the active graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QuadPattern {
    pub subject: TermPattern,
    pub predicate: NamedNodePattern,
    pub object: TermPattern,
    pub graph: Option<NamedNodePattern>,
}

impl QuadPattern {
    /// Creates a new [QuadPattern] in the active graph.
    pub fn new(
        subject: impl Into<TermPattern>,
        predicate: impl Into<NamedNodePattern>,
        object: impl Into<TermPattern>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
            graph: None,
        }
    }

    #[must_use]
    pub fn with_graph(mut self, graph: impl Into<NamedNodePattern>) -> Self {
        self.graph = Some(graph.into());
        self
    }

    /// Returns the variables of the pattern, including those nested in quoted triples.
    pub fn variables(&self) -> Vec<Variable> {
        let mut result = Vec::new();
        collect_term_pattern_variables(&self.subject, &mut result);
        collect_named_node_pattern_variables(&self.predicate, &mut result);
        collect_term_pattern_variables(&self.object, &mut result);
        if let Some(graph) = &self.graph {
            collect_named_node_pattern_variables(graph, &mut result);
        }
        result
    }
}

impl From<TriplePattern> for QuadPattern {
    fn from(value: TriplePattern) -> Self {
        Self {
            subject: value.subject,
            predicate: value.predicate,
            object: value.object,
            graph: None,
        }
    }
}

impl Display for QuadPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)?;
        if let Some(graph) = &self.graph {
            write!(f, " {graph}")?;
        }
        Ok(())
    }
}

/// A sort key of an [Operation::OrderBy].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OrderExpression {
    Asc(Expression),
    Desc(Expression),
}

impl Display for OrderExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderExpression::Asc(expression) => write!(f, "ASC({expression})"),
            OrderExpression::Desc(expression) => write!(f, "DESC({expression})"),
        }
    }
}

/// A node of the query algebra.
///
/// Operations are immutable value trees. Rewrites consume an operation and build a new one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    /// A single quad pattern, optionally annotated with the source that must answer it.
    Pattern {
        pattern: QuadPattern,
        source: Option<SourceAnnotation>,
    },
    /// A property path between `subject` and `object`.
    Path {
        subject: TermPattern,
        path: PropertyPathExpression,
        object: TermPattern,
        graph: Option<NamedNodePattern>,
        source: Option<SourceAnnotation>,
    },
    Bgp {
        patterns: Vec<QuadPattern>,
    },
    Join {
        inputs: Vec<Operation>,
    },
    LeftJoin {
        left: Box<Operation>,
        right: Box<Operation>,
        expression: Option<Expression>,
    },
    Union {
        inputs: Vec<Operation>,
    },
    Minus {
        left: Box<Operation>,
        right: Box<Operation>,
    },
    Filter {
        inner: Box<Operation>,
        expression: Expression,
    },
    Extend {
        inner: Box<Operation>,
        variable: Variable,
        expression: Expression,
    },
    Project {
        inner: Box<Operation>,
        variables: Vec<Variable>,
    },
    /// Inline data. Each row has one entry per variable. [None] leaves the variable unbound.
    Values {
        variables: Vec<Variable>,
        bindings: Vec<Vec<Option<Term>>>,
    },
    Group {
        inner: Box<Operation>,
        variables: Vec<Variable>,
        aggregates: Vec<(Variable, Expression)>,
    },
    OrderBy {
        inner: Box<Operation>,
        expressions: Vec<OrderExpression>,
    },
    Slice {
        inner: Box<Operation>,
        start: usize,
        length: Option<usize>,
    },
    Distinct {
        inner: Box<Operation>,
    },
    Reduced {
        inner: Box<Operation>,
    },
    Graph {
        name: NamedNodePattern,
        inner: Box<Operation>,
    },
    /// Evaluates `inner` against the given dataset.
    From {
        inner: Box<Operation>,
        default: Vec<NamedNode>,
        named: Vec<NamedNode>,
    },
    Service {
        name: NamedNodePattern,
        inner: Box<Operation>,
        silent: bool,
    },
    Ask {
        inner: Box<Operation>,
    },
    Construct {
        inner: Box<Operation>,
        template: Vec<QuadPattern>,
    },
    Describe {
        inner: Box<Operation>,
        terms: Vec<TermPattern>,
    },
    DeleteInsert {
        delete: Vec<QuadPattern>,
        insert: Vec<QuadPattern>,
        where_clause: Option<Box<Operation>>,
    },
    Load {
        silent: bool,
        source: NamedNode,
        destination: Option<NamedNode>,
    },
    Clear {
        silent: bool,
        target: GraphTarget,
    },
    Create {
        silent: bool,
        graph: NamedNode,
    },
    Drop {
        silent: bool,
        target: GraphTarget,
    },
    Add {
        silent: bool,
        from: GraphTarget,
        to: GraphTarget,
    },
    Move {
        silent: bool,
        from: GraphTarget,
        to: GraphTarget,
    },
    Copy {
        silent: bool,
        from: GraphTarget,
        to: GraphTarget,
    },
    CompositeUpdate {
        updates: Vec<Operation>,
    },
    /// An operation without any result.
    Nop,
}

impl Operation {
    /// Creates a pattern without a source annotation.
    pub fn pattern(pattern: QuadPattern) -> Self {
        Self::Pattern {
            pattern,
            source: None,
        }
    }

    /// Creates a pattern that must be answered by `source`.
    pub fn pattern_from(pattern: QuadPattern, source: SourceAnnotation) -> Self {
        Self::Pattern {
            pattern,
            source: Some(source),
        }
    }

    /// Joins `inputs`. Nested joins are flattened and a single input is returned as is.
    pub fn join(inputs: Vec<Operation>) -> Self {
        let mut inputs = flatten(inputs, |op| match op {
            Operation::Join { inputs } => Ok(inputs),
            op => Err(op),
        });
        if inputs.len() == 1 {
            if let Some(input) = inputs.pop() {
                return input;
            }
        }
        Self::Join { inputs }
    }

    /// Creates the union of `inputs`. Nested unions are flattened and a single input is returned
    /// as is.
    pub fn union(inputs: Vec<Operation>) -> Self {
        let mut inputs = flatten(inputs, |op| match op {
            Operation::Union { inputs } => Ok(inputs),
            op => Err(op),
        });
        if inputs.len() == 1 {
            if let Some(input) = inputs.pop() {
                return input;
            }
        }
        Self::Union { inputs }
    }

    /// Returns an operation that never produces a solution.
    pub fn empty() -> Self {
        Self::Union { inputs: Vec::new() }
    }

    pub fn left_join(left: Operation, right: Operation, expression: Option<Expression>) -> Self {
        Self::LeftJoin {
            left: Box::new(left),
            right: Box::new(right),
            expression,
        }
    }

    pub fn minus(left: Operation, right: Operation) -> Self {
        Self::Minus {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn filter(inner: Operation, expression: Expression) -> Self {
        Self::Filter {
            inner: Box::new(inner),
            expression,
        }
    }

    pub fn extend(inner: Operation, variable: Variable, expression: Expression) -> Self {
        Self::Extend {
            inner: Box::new(inner),
            variable,
            expression,
        }
    }

    pub fn project(inner: Operation, variables: Vec<Variable>) -> Self {
        Self::Project {
            inner: Box::new(inner),
            variables,
        }
    }

    pub fn values(variables: Vec<Variable>, bindings: Vec<Vec<Option<Term>>>) -> Self {
        Self::Values {
            variables,
            bindings,
        }
    }

    pub fn bgp(patterns: Vec<QuadPattern>) -> Self {
        Self::Bgp { patterns }
    }

    /// Returns whether the operation never produces a solution.
    pub fn is_empty_union(&self) -> bool {
        matches!(self, Operation::Union { inputs } if inputs.is_empty())
    }

    /// Returns the kind of the operation.
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Pattern { .. } => OperationKind::Pattern,
            Operation::Path { .. } => OperationKind::Path,
            Operation::Bgp { .. } => OperationKind::Bgp,
            Operation::Join { .. } => OperationKind::Join,
            Operation::LeftJoin { .. } => OperationKind::LeftJoin,
            Operation::Union { .. } => OperationKind::Union,
            Operation::Minus { .. } => OperationKind::Minus,
            Operation::Filter { .. } => OperationKind::Filter,
            Operation::Extend { .. } => OperationKind::Extend,
            Operation::Project { .. } => OperationKind::Project,
            Operation::Values { .. } => OperationKind::Values,
            Operation::Group { .. } => OperationKind::Group,
            Operation::OrderBy { .. } => OperationKind::OrderBy,
            Operation::Slice { .. } => OperationKind::Slice,
            Operation::Distinct { .. } => OperationKind::Distinct,
            Operation::Reduced { .. } => OperationKind::Reduced,
            Operation::Graph { .. } => OperationKind::Graph,
            Operation::From { .. } => OperationKind::From,
            Operation::Service { .. } => OperationKind::Service,
            Operation::Ask { .. } => OperationKind::Ask,
            Operation::Construct { .. } => OperationKind::Construct,
            Operation::Describe { .. } => OperationKind::Describe,
            Operation::DeleteInsert { .. } => OperationKind::DeleteInsert,
            Operation::Load { .. } => OperationKind::Load,
            Operation::Clear { .. } => OperationKind::Clear,
            Operation::Create { .. } => OperationKind::Create,
            Operation::Drop { .. } => OperationKind::Drop,
            Operation::Add { .. } => OperationKind::Add,
            Operation::Move { .. } => OperationKind::Move,
            Operation::Copy { .. } => OperationKind::Copy,
            Operation::CompositeUpdate { .. } => OperationKind::CompositeUpdate,
            Operation::Nop => OperationKind::Nop,
        }
    }

    /// Returns the direct children of the operation.
    pub fn children(&self) -> Vec<&Operation> {
        match self {
            Operation::Join { inputs }
            | Operation::Union { inputs }
            | Operation::CompositeUpdate { updates: inputs } => inputs.iter().collect(),
            Operation::LeftJoin { left, right, .. } | Operation::Minus { left, right } => {
                vec![left.as_ref(), right.as_ref()]
            }
            Operation::Filter { inner, .. }
            | Operation::Extend { inner, .. }
            | Operation::Project { inner, .. }
            | Operation::Group { inner, .. }
            | Operation::OrderBy { inner, .. }
            | Operation::Slice { inner, .. }
            | Operation::Distinct { inner }
            | Operation::Reduced { inner }
            | Operation::Graph { inner, .. }
            | Operation::From { inner, .. }
            | Operation::Service { inner, .. }
            | Operation::Ask { inner }
            | Operation::Construct { inner, .. }
            | Operation::Describe { inner, .. } => vec![inner.as_ref()],
            Operation::DeleteInsert { where_clause, .. } => {
                where_clause.as_deref().into_iter().collect()
            }
            Operation::Pattern { .. }
            | Operation::Path { .. }
            | Operation::Bgp { .. }
            | Operation::Values { .. }
            | Operation::Load { .. }
            | Operation::Clear { .. }
            | Operation::Create { .. }
            | Operation::Drop { .. }
            | Operation::Add { .. }
            | Operation::Move { .. }
            | Operation::Copy { .. }
            | Operation::Nop => Vec::new(),
        }
    }

    /// Returns the variables that may be bound by the solutions of this operation, in the order
    /// of their first occurrence.
    pub fn in_scope_variables(&self) -> Vec<Variable> {
        let mut result = Vec::new();
        self.collect_in_scope_variables(&mut result);
        result
    }

    fn collect_in_scope_variables(&self, result: &mut Vec<Variable>) {
        match self {
            Operation::Pattern { pattern, .. } => {
                for variable in pattern.variables() {
                    push_unique(result, variable);
                }
            }
            Operation::Path {
                subject,
                object,
                graph,
                ..
            } => {
                collect_term_pattern_variables(subject, result);
                collect_term_pattern_variables(object, result);
                if let Some(graph) = graph {
                    collect_named_node_pattern_variables(graph, result);
                }
            }
            Operation::Bgp { patterns } => {
                for variable in patterns.iter().flat_map(QuadPattern::variables) {
                    push_unique(result, variable);
                }
            }
            Operation::Join { inputs } | Operation::Union { inputs } => {
                for input in inputs {
                    input.collect_in_scope_variables(result);
                }
            }
            Operation::LeftJoin { left, right, .. } => {
                left.collect_in_scope_variables(result);
                right.collect_in_scope_variables(result);
            }
            Operation::Minus { left, .. } => left.collect_in_scope_variables(result),
            Operation::Extend {
                inner, variable, ..
            } => {
                inner.collect_in_scope_variables(result);
                push_unique(result, variable.clone());
            }
            Operation::Project { variables, .. } | Operation::Values { variables, .. } => {
                for variable in variables {
                    push_unique(result, variable.clone());
                }
            }
            Operation::Group {
                variables,
                aggregates,
                ..
            } => {
                for variable in variables.iter().chain(aggregates.iter().map(|(v, _)| v)) {
                    push_unique(result, variable.clone());
                }
            }
            Operation::Graph { name, inner } => {
                collect_named_node_pattern_variables(name, result);
                inner.collect_in_scope_variables(result);
            }
            Operation::Filter { inner, .. }
            | Operation::OrderBy { inner, .. }
            | Operation::Slice { inner, .. }
            | Operation::Distinct { inner }
            | Operation::Reduced { inner }
            | Operation::From { inner, .. }
            | Operation::Service { inner, .. } => inner.collect_in_scope_variables(result),
            Operation::Ask { .. }
            | Operation::Construct { .. }
            | Operation::Describe { .. }
            | Operation::DeleteInsert { .. }
            | Operation::Load { .. }
            | Operation::Clear { .. }
            | Operation::Create { .. }
            | Operation::Drop { .. }
            | Operation::Add { .. }
            | Operation::Move { .. }
            | Operation::Copy { .. }
            | Operation::CompositeUpdate { .. }
            | Operation::Nop => {}
        }
    }

    /// Returns the distinct sources annotated on the leaves of this operation.
    pub fn sources(&self) -> Vec<SourceAnnotation> {
        let mut result = Vec::new();
        self.collect_sources(&mut result);
        result
    }

    fn collect_sources(&self, result: &mut Vec<SourceAnnotation>) {
        match self {
            Operation::Pattern {
                source: Some(source),
                ..
            }
            | Operation::Path {
                source: Some(source),
                ..
            } => push_unique(result, source.clone()),
            _ => {
                for child in self.children() {
                    child.collect_sources(result);
                }
            }
        }
    }
}

fn flatten(
    inputs: Vec<Operation>,
    nested: impl Fn(Operation) -> Result<Vec<Operation>, Operation>,
) -> Vec<Operation> {
    let mut result = Vec::with_capacity(inputs.len());
    for input in inputs {
        match nested(input) {
            Ok(children) => result.extend(children),
            Err(input) => result.push(input),
        }
    }
    result
}

fn push_unique<T: PartialEq>(result: &mut Vec<T>, value: T) {
    if !result.contains(&value) {
        result.push(value);
    }
}

fn collect_term_pattern_variables(pattern: &TermPattern, result: &mut Vec<Variable>) {
    match pattern {
        TermPattern::Variable(variable) => push_unique(result, variable.clone()),
        TermPattern::Triple(triple) => {
            collect_term_pattern_variables(&triple.subject, result);
            collect_named_node_pattern_variables(&triple.predicate, result);
            collect_term_pattern_variables(&triple.object, result);
        }
        TermPattern::NamedNode(_) | TermPattern::BlankNode(_) | TermPattern::Literal(_) => {}
    }
}

fn collect_named_node_pattern_variables(
    pattern: &NamedNodePattern,
    result: &mut Vec<Variable>,
) {
    if let NamedNodePattern::Variable(variable) = pattern {
        push_unique(result, variable.clone());
    }
}
