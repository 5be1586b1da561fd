use crate::test_utils::{iri, push_down, quad, var_expr};
use async_trait::async_trait;
use datafusion::error::DataFusionError;
use rdf_federation_common::{
    DFResult, ExtensionFunction, ExtensionFunctionTable, QueryContext, QuerySource,
    SelectorShape, SourceAnnotation, StaticQuerySource,
};
use rdf_federation_logical::algebra::{Expression, Operation};
use rdf_federation_logical::QueryOptimizer;
use std::sync::Arc;

fn source(name: &str, shape: SelectorShape) -> SourceAnnotation {
    StaticQuerySource::new(name, shape).into_annotation()
}

fn federated_join(first: SourceAnnotation, second: SourceAnnotation) -> Operation {
    Operation::join(vec![
        Operation::pattern_from(quad("s", "p", "o1"), first),
        Operation::pattern_from(quad("s", "p2", "o2"), second),
    ])
}

#[derive(Debug)]
struct UnreachableSource;

#[async_trait]
impl QuerySource for UnreachableSource {
    fn name(&self) -> &str {
        "unreachable"
    }

    async fn selector_shape(&self, _context: &QueryContext) -> DFResult<SelectorShape> {
        Err(DataFusionError::Execution(String::from("source is unreachable")))
    }
}

#[tokio::test]
async fn test_push_into_federated_join() -> DFResult<()> {
    let operation = Operation::filter(
        federated_join(
            source("a", SelectorShape::pattern()),
            source("b", SelectorShape::wildcard()),
        ),
        var_expr("s"),
    );

    let result = push_down(operation, &QueryContext::default()).await?;

    insta::assert_snapshot!(result, @r"
    Join
      Filter: ?s
        Pattern: ?s ?p ?o1 @a
      Filter: ?s
        Pattern: ?s ?p2 ?o2 @b
    ");
    Ok(())
}

#[tokio::test]
async fn test_single_pattern_source_is_not_pushed() -> DFResult<()> {
    let shared = source("a", SelectorShape::pattern());
    let operation = Operation::filter(federated_join(shared.clone(), shared), var_expr("s"));

    let result = push_down(operation.clone(), &QueryContext::default()).await?;

    assert_eq!(result, operation);
    Ok(())
}

#[tokio::test]
async fn test_sources_without_filter_support_are_not_pushed() -> DFResult<()> {
    let operation = Operation::filter(
        federated_join(
            source("a", SelectorShape::pattern()),
            source("b", SelectorShape::pattern()),
        ),
        var_expr("s"),
    );

    let result = push_down(operation.clone(), &QueryContext::default()).await?;

    assert_eq!(result, operation);
    Ok(())
}

#[tokio::test]
async fn test_unreachable_source_is_treated_as_unsupported() -> DFResult<()> {
    let operation = Operation::filter(
        federated_join(
            SourceAnnotation::new(Arc::new(UnreachableSource)),
            source("b", SelectorShape::pattern()),
        ),
        var_expr("s"),
    );

    let result = push_down(operation.clone(), &QueryContext::default()).await?;

    assert_eq!(result, operation);
    Ok(())
}

#[tokio::test]
async fn test_extension_function_requires_registry_and_sources() -> DFResult<()> {
    let function = iri("http://example.com/fn");
    let shape = SelectorShape::wildcard().with_extension_functions(vec![function.clone()]);
    let operation = Operation::filter(
        federated_join(source("a", shape.clone()), source("b", shape)),
        Expression::named_function(function.clone(), vec![var_expr("s")]),
    );

    let unresolved = push_down(operation.clone(), &QueryContext::default()).await?;
    assert_eq!(unresolved, operation);

    let registry = ExtensionFunctionTable::new()
        .with_function(ExtensionFunction::new(function, |args| args.first().cloned()));
    let context = QueryContext::default().with_extension_functions(Arc::new(registry));
    let result = push_down(operation, &context).await?;

    insta::assert_snapshot!(result, @r"
    Join
      Filter: <http://example.com/fn>(?s)
        Pattern: ?s ?p ?o1 @a
      Filter: <http://example.com/fn>(?s)
        Pattern: ?s ?p2 ?o2 @b
    ");
    Ok(())
}

#[tokio::test]
async fn test_optimizer_runs_filter_pushdown() -> DFResult<()> {
    let operation = Operation::filter(
        federated_join(
            source("a", SelectorShape::wildcard()),
            source("b", SelectorShape::wildcard()),
        ),
        var_expr("s"),
    );

    let optimizer = QueryOptimizer::default();
    assert_eq!(optimizer.rules().len(), 1);
    assert_eq!(optimizer.rules()[0].name(), "filter-pushdown");

    let (result, _) = optimizer.optimize(operation, QueryContext::default()).await?;

    assert!(matches!(result, Operation::Join { ref inputs } if inputs.len() == 2));
    Ok(())
}
