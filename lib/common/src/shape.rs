use rdf_federation_model::NamedNode;
use std::fmt::{Display, Formatter};

/// The kind of an algebra operation.
///
/// Used by sources to describe which operations they can evaluate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Pattern,
    Path,
    Bgp,
    Join,
    LeftJoin,
    Union,
    Minus,
    Filter,
    Extend,
    Project,
    Values,
    Group,
    OrderBy,
    Slice,
    Distinct,
    Reduced,
    Graph,
    From,
    Service,
    Ask,
    Construct,
    Describe,
    DeleteInsert,
    Load,
    Clear,
    Create,
    Drop,
    Add,
    Move,
    Copy,
    CompositeUpdate,
    Nop,
}

impl OperationKind {
    /// Returns the lowercase name of the operation kind.
    pub fn name(self) -> &'static str {
        match self {
            OperationKind::Pattern => "pattern",
            OperationKind::Path => "path",
            OperationKind::Bgp => "bgp",
            OperationKind::Join => "join",
            OperationKind::LeftJoin => "leftjoin",
            OperationKind::Union => "union",
            OperationKind::Minus => "minus",
            OperationKind::Filter => "filter",
            OperationKind::Extend => "extend",
            OperationKind::Project => "project",
            OperationKind::Values => "values",
            OperationKind::Group => "group",
            OperationKind::OrderBy => "orderby",
            OperationKind::Slice => "slice",
            OperationKind::Distinct => "distinct",
            OperationKind::Reduced => "reduced",
            OperationKind::Graph => "graph",
            OperationKind::From => "from",
            OperationKind::Service => "service",
            OperationKind::Ask => "ask",
            OperationKind::Construct => "construct",
            OperationKind::Describe => "describe",
            OperationKind::DeleteInsert => "deleteinsert",
            OperationKind::Load => "load",
            OperationKind::Clear => "clear",
            OperationKind::Create => "create",
            OperationKind::Drop => "drop",
            OperationKind::Add => "add",
            OperationKind::Move => "move",
            OperationKind::Copy => "copy",
            OperationKind::CompositeUpdate => "compositeupdate",
            OperationKind::Nop => "nop",
        }
    }
}

impl Display for OperationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The operations accepted by a [SelectorShape::Operation].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShapeOperation {
    /// Only operations of the given kind.
    Kind(OperationKind),
    /// Any operation.
    Wildcard,
}

/// Describes which requests a query source can answer.
///
/// A source that only supports triple pattern fragments, for example, declares the shape
/// `SelectorShape::pattern()`. A SPARQL endpoint declares `SelectorShape::wildcard()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectorShape {
    Operation {
        operation: ShapeOperation,
        /// The IRIs of the extension functions that the source can evaluate.
        extension_functions: Vec<NamedNode>,
    },
    /// All children must accept a request.
    Conjunction(Vec<SelectorShape>),
    /// At least one child must accept a request.
    Disjunction(Vec<SelectorShape>),
}

impl SelectorShape {
    /// The shape of a source that only answers single patterns.
    pub fn pattern() -> Self {
        Self::Operation {
            operation: ShapeOperation::Kind(OperationKind::Pattern),
            extension_functions: Vec::new(),
        }
    }

    /// The shape of a source that answers any operation.
    pub fn wildcard() -> Self {
        Self::Operation {
            operation: ShapeOperation::Wildcard,
            extension_functions: Vec::new(),
        }
    }

    /// Returns a new shape that also declares support for `extension_functions`.
    ///
    /// Composite shapes are returned unchanged.
    #[must_use]
    pub fn with_extension_functions(self, extension_functions: Vec<NamedNode>) -> Self {
        match self {
            Self::Operation { operation, .. } => Self::Operation {
                operation,
                extension_functions,
            },
            shape => shape,
        }
    }

    /// Returns whether the shape accepts operations of the given `kind`.
    pub fn accepts(&self, kind: OperationKind) -> bool {
        match self {
            Self::Operation { operation, .. } => match operation {
                ShapeOperation::Kind(accepted) => *accepted == kind,
                ShapeOperation::Wildcard => true,
            },
            Self::Conjunction(children) => children.iter().all(|c| c.accepts(kind)),
            Self::Disjunction(children) => children.iter().any(|c| c.accepts(kind)),
        }
    }

    /// Returns whether the source can evaluate the extension function `name`.
    pub fn supports_extension_function(&self, name: &NamedNode) -> bool {
        match self {
            Self::Operation {
                extension_functions,
                ..
            } => extension_functions.contains(name),
            Self::Conjunction(children) => children
                .iter()
                .all(|c| c.supports_extension_function(name)),
            Self::Disjunction(children) => children
                .iter()
                .any(|c| c.supports_extension_function(name)),
        }
    }

    /// Returns whether the shape only accepts a single pattern type.
    pub fn is_bare_pattern(&self) -> bool {
        matches!(
            self,
            Self::Operation {
                operation: ShapeOperation::Kind(OperationKind::Pattern),
                ..
            }
        )
    }
}
