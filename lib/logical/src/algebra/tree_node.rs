use crate::algebra::Operation;
use crate::DFResult;
use datafusion::common::internal_datafusion_err;
use datafusion::common::tree_node::{Transformed, TreeNode, TreeNodeRecursion};

impl TreeNode for Operation {
    fn apply_children<'n, F: FnMut(&'n Self) -> DFResult<TreeNodeRecursion>>(
        &'n self,
        mut f: F,
    ) -> DFResult<TreeNodeRecursion> {
        for child in self.children() {
            if f(child)? == TreeNodeRecursion::Stop {
                return Ok(TreeNodeRecursion::Stop);
            }
        }
        Ok(TreeNodeRecursion::Continue)
    }

    fn map_children<F: FnMut(Self) -> DFResult<Transformed<Self>>>(
        self,
        mut f: F,
    ) -> DFResult<Transformed<Self>> {
        Ok(match self {
            Operation::Join { inputs } => {
                map_all(inputs, &mut f)?.update_data(|inputs| Operation::Join { inputs })
            }
            Operation::Union { inputs } => {
                map_all(inputs, &mut f)?.update_data(|inputs| Operation::Union { inputs })
            }
            Operation::CompositeUpdate { updates } => {
                map_all(updates, &mut f)?.update_data(|updates| Operation::CompositeUpdate { updates })
            }
            Operation::LeftJoin {
                left,
                right,
                expression,
            } => map_all(vec![*left, *right], &mut f)?.map_data(|inputs| {
                let [left, right] = into_pair(inputs)?;
                Ok(Operation::left_join(left, right, expression))
            })?,
            Operation::Minus { left, right } => map_all(vec![*left, *right], &mut f)?
                .map_data(|inputs| {
                    let [left, right] = into_pair(inputs)?;
                    Ok(Operation::minus(left, right))
                })?,
            Operation::Filter { inner, expression } => {
                f(*inner)?.update_data(|inner| Operation::filter(inner, expression))
            }
            Operation::Extend {
                inner,
                variable,
                expression,
            } => f(*inner)?.update_data(|inner| Operation::extend(inner, variable, expression)),
            Operation::Project { inner, variables } => {
                f(*inner)?.update_data(|inner| Operation::project(inner, variables))
            }
            Operation::Group {
                inner,
                variables,
                aggregates,
            } => f(*inner)?.update_data(|inner| Operation::Group {
                inner: Box::new(inner),
                variables,
                aggregates,
            }),
            Operation::OrderBy { inner, expressions } => {
                f(*inner)?.update_data(|inner| Operation::OrderBy {
                    inner: Box::new(inner),
                    expressions,
                })
            }
            Operation::Slice {
                inner,
                start,
                length,
            } => f(*inner)?.update_data(|inner| Operation::Slice {
                inner: Box::new(inner),
                start,
                length,
            }),
            Operation::Distinct { inner } => f(*inner)?.update_data(|inner| Operation::Distinct {
                inner: Box::new(inner),
            }),
            Operation::Reduced { inner } => f(*inner)?.update_data(|inner| Operation::Reduced {
                inner: Box::new(inner),
            }),
            Operation::Graph { name, inner } => f(*inner)?.update_data(|inner| Operation::Graph {
                name,
                inner: Box::new(inner),
            }),
            Operation::From {
                inner,
                default,
                named,
            } => f(*inner)?.update_data(|inner| Operation::From {
                inner: Box::new(inner),
                default,
                named,
            }),
            Operation::Service {
                name,
                inner,
                silent,
            } => f(*inner)?.update_data(|inner| Operation::Service {
                name,
                inner: Box::new(inner),
                silent,
            }),
            Operation::Ask { inner } => f(*inner)?.update_data(|inner| Operation::Ask {
                inner: Box::new(inner),
            }),
            Operation::Construct { inner, template } => {
                f(*inner)?.update_data(|inner| Operation::Construct {
                    inner: Box::new(inner),
                    template,
                })
            }
            Operation::Describe { inner, terms } => {
                f(*inner)?.update_data(|inner| Operation::Describe {
                    inner: Box::new(inner),
                    terms,
                })
            }
            Operation::DeleteInsert {
                delete,
                insert,
                where_clause: Some(where_clause),
            } => f(*where_clause)?.update_data(|where_clause| Operation::DeleteInsert {
                delete,
                insert,
                where_clause: Some(Box::new(where_clause)),
            }),
            leaf @ (Operation::Pattern { .. }
            | Operation::Path { .. }
            | Operation::Bgp { .. }
            | Operation::Values { .. }
            | Operation::DeleteInsert { .. }
            | Operation::Load { .. }
            | Operation::Clear { .. }
            | Operation::Create { .. }
            | Operation::Drop { .. }
            | Operation::Add { .. }
            | Operation::Move { .. }
            | Operation::Copy { .. }
            | Operation::Nop) => Transformed::no(leaf),
        })
    }
}

/// Applies `f` to all `inputs` until one of them stops the traversal.
fn map_all<F: FnMut(Operation) -> DFResult<Transformed<Operation>>>(
    inputs: Vec<Operation>,
    f: &mut F,
) -> DFResult<Transformed<Vec<Operation>>> {
    let mut tnr = TreeNodeRecursion::Continue;
    let mut transformed = false;
    let data = inputs
        .into_iter()
        .map(|input| {
            if tnr == TreeNodeRecursion::Stop {
                return Ok(input);
            }
            let result = f(input)?;
            tnr = result.tnr;
            transformed |= result.transformed;
            Ok(result.data)
        })
        .collect::<DFResult<Vec<_>>>()?;
    Ok(Transformed::new(data, transformed, tnr))
}

fn into_pair(inputs: Vec<Operation>) -> DFResult<[Operation; 2]> {
    <[Operation; 2]>::try_from(inputs).map_err(|inputs| {
        internal_datafusion_err!("Expected two rewritten children, got {}", inputs.len())
    })
}
