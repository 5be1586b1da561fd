use rdf_federation_common::{DFResult, FilterPushdownConfig, QueryContext};
use rdf_federation_logical::algebra::{Expression, Operation, QuadPattern};
use rdf_federation_logical::filter_pushdown::FilterPushdownRule;
use rdf_federation_logical::AlgebraOptimizerRule;
use rdf_federation_model::{NamedNode, Variable};

pub fn var(name: &str) -> Variable {
    Variable::new_unchecked(name)
}

pub fn var_expr(name: &str) -> Expression {
    Expression::variable(var(name))
}

pub fn iri(value: &str) -> NamedNode {
    NamedNode::new_unchecked(value)
}

pub fn quad(s: &str, p: &str, o: &str) -> QuadPattern {
    QuadPattern::new(var(s), var(p), var(o))
}

pub fn pattern(s: &str, p: &str, o: &str) -> Operation {
    Operation::pattern(quad(s, p, o))
}

pub fn aggressive() -> QueryContext {
    QueryContext::default()
        .with_filter_pushdown(FilterPushdownConfig::default().with_aggressive_pushdown(true))
}

pub async fn push_down(operation: Operation, context: &QueryContext) -> DFResult<Operation> {
    let result = FilterPushdownRule::new().rewrite(operation, context).await?;
    Ok(result.data)
}
