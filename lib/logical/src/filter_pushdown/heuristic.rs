use crate::algebra::{Expression, Operation};
use crate::filter_pushdown::FILTER_PUSHDOWN;
use rdf_federation_common::{
    FilterPushdownConfig, OperationKind, QueryContext, SelectorShape, SourceAnnotation,
};
use rdf_federation_model::NamedNode;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// The capabilities of the engine and of the sources of a query.
///
/// Resolved once per query. A source whose shape could not be obtained and a function that
/// could not be resolved are both treated as unsupported.
#[derive(Debug, Default, Clone)]
pub struct PushdownCapabilities {
    shapes: HashMap<SourceAnnotation, SelectorShape>,
    resolvable_functions: HashSet<NamedNode>,
}

impl PushdownCapabilities {
    /// Creates a new [PushdownCapabilities].
    pub fn new(
        shapes: HashMap<SourceAnnotation, SelectorShape>,
        resolvable_functions: HashSet<NamedNode>,
    ) -> Self {
        Self {
            shapes,
            resolvable_functions,
        }
    }

    /// Obtains the shapes of all sources in `operation` and resolves all extension functions
    /// used in its filters.
    pub async fn resolve(operation: &Operation, context: &QueryContext) -> Self {
        let mut shapes = HashMap::new();
        for source in operation.sources() {
            match source.source().selector_shape(context).await {
                Ok(shape) => {
                    shapes.insert(source, shape);
                }
                Err(error) => {
                    debug!(actor = FILTER_PUSHDOWN, source = source.name(), %error, "Could not obtain selector shape");
                }
            }
        }

        let mut resolvable_functions = HashSet::new();
        if let Some(registry) = context.extension_functions() {
            for name in filter_functions(operation) {
                match registry.resolve(&name).await {
                    Ok(Some(_)) => {
                        resolvable_functions.insert(name);
                    }
                    Ok(None) => {}
                    Err(error) => {
                        debug!(actor = FILTER_PUSHDOWN, function = %name, %error, "Could not resolve extension function");
                    }
                }
            }
        }

        Self::new(shapes, resolvable_functions)
    }

    pub fn shape(&self, source: &SourceAnnotation) -> Option<&SelectorShape> {
        self.shapes.get(source)
    }

    pub fn is_resolvable(&self, function: &NamedNode) -> bool {
        self.resolvable_functions.contains(function)
    }
}

/// Collects the extension functions referenced by all filters in `operation`.
fn filter_functions(operation: &Operation) -> Vec<NamedNode> {
    let mut result = Vec::new();
    collect_filter_functions(operation, &mut result);
    result
}

fn collect_filter_functions(operation: &Operation, result: &mut Vec<NamedNode>) {
    if let Operation::Filter { expression, .. } = operation {
        for name in expression.named_functions() {
            if !result.contains(name) {
                result.push(name.clone());
            }
        }
    }
    for child in operation.children() {
        collect_filter_functions(child, result);
    }
}

/// Decides whether pushing down the filter `expression` into an operation that is answered by
/// `sources` is worthwhile.
pub fn should_attempt_push_down(
    config: &FilterPushdownConfig,
    expression: &Expression,
    sources: &[SourceAnnotation],
    capabilities: &PushdownCapabilities,
) -> bool {
    if config.aggressive_pushdown {
        return true;
    }

    // Equalities with a constant are highly selective.
    if expression.as_variable_equality().is_some() {
        return true;
    }

    for function in expression.named_functions() {
        if !capabilities.is_resolvable(function) {
            debug!(actor = FILTER_PUSHDOWN, %function, "Extension function is unknown to the engine");
            return false;
        }

        let supported_by_sources = sources.iter().all(|source| {
            capabilities
                .shape(source)
                .is_some_and(|shape| shape.supports_extension_function(function))
        });
        if !supported_by_sources {
            debug!(actor = FILTER_PUSHDOWN, %function, "Extension function is not supported by all sources");
            return false;
        }
    }

    match sources {
        [] => false,
        [source] => {
            if capabilities.shape(source).is_some_and(SelectorShape::is_bare_pattern) {
                debug!(actor = FILTER_PUSHDOWN, source = source.name(), "Source only accepts patterns");
            }
            false
        }
        sources => sources.iter().any(|source| {
            capabilities.shape(source).is_some_and(|shape| {
                [OperationKind::Filter, OperationKind::Join, OperationKind::Pattern]
                    .into_iter()
                    .all(|kind| shape.accepts(kind))
            })
        }),
    }
}
