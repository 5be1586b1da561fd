mod build_probe;
mod symmetric;

use crate::join::hash::build_probe::BuildProbeHashJoinStream;
use crate::join::hash::symmetric::SymmetricHashJoinStream;
use crate::join::{
    estimate_join_coefficients, JoinAction, JoinActionMetadata, JoinActor, JoinCoefficients,
    JoinEntry, JoinOutput, JoinType,
};
use async_trait::async_trait;
use rdf_federation_common::error::{JoinError, JoinPrecheckError};
use rdf_federation_common::{BindingsStream, MetadataAccessor, QueryContext};
use rdf_federation_model::{BindingsMetadata, Cardinality};
use tracing::debug;

/// Joins two bindings streams by hashing the terms of their shared variables.
///
/// The strict variant rejects inputs whose variables may be unbound and streams both inputs
/// symmetrically. The undef-tolerant variant first builds an index over the smaller input and
/// then probes it with the other input.
#[derive(Debug, Clone)]
pub struct HashJoinActor {
    name: &'static str,
    can_handle_undefs: bool,
}

impl HashJoinActor {
    /// Creates the strict hash join actor.
    pub fn strict() -> Self {
        Self {
            name: "inner-hash",
            can_handle_undefs: false,
        }
    }

    /// Creates the hash join actor that supports unbound join variables.
    pub fn undef_tolerant() -> Self {
        Self {
            name: "inner-hash-undef",
            can_handle_undefs: true,
        }
    }

    pub fn can_handle_undefs(&self) -> bool {
        self.can_handle_undefs
    }

    /// Checks the action and returns the metadata of both entries.
    async fn precheck(
        &self,
        action: &JoinActionMetadata,
    ) -> Result<(BindingsMetadata, BindingsMetadata), JoinError> {
        if action.join_type != JoinType::Inner {
            return Err(JoinPrecheckError::UnsupportedJoinType {
                actor: self.name.to_owned(),
                join_type: action.join_type.to_string(),
            }
            .into());
        }

        let [left, right] = action.entries.as_slice() else {
            return Err(JoinPrecheckError::EntryCount {
                actor: self.name.to_owned(),
                expected: 2,
                actual: action.entries.len(),
            }
            .into());
        };

        let left = left.get().await.map_err(JoinError::Metadata)?;
        let right = right.get().await.map_err(JoinError::Metadata)?;

        if !self.can_handle_undefs && (left.contains_undefs() || right.contains_undefs()) {
            return Err(JoinPrecheckError::Undefs {
                actor: self.name.to_owned(),
            }
            .into());
        }

        if BindingsMetadata::overlapping_variables(&[left.clone(), right.clone()]).is_empty() {
            return Err(JoinPrecheckError::NoSharedVariables {
                actor: self.name.to_owned(),
            }
            .into());
        }

        Ok((left, right))
    }
}

#[async_trait]
impl JoinActor for HashJoinActor {
    fn name(&self) -> &str {
        self.name
    }

    async fn test(
        &self,
        action: &JoinActionMetadata,
        _context: &QueryContext,
    ) -> Result<JoinCoefficients, JoinError> {
        let (left, right) = self.precheck(action).await?;
        Ok(estimate_join_coefficients(
            &left,
            &right,
            self.can_handle_undefs,
        ))
    }

    async fn run(
        &self,
        action: JoinAction,
        _context: &QueryContext,
    ) -> Result<JoinOutput, JoinError> {
        let (left_metadata, right_metadata) = self.precheck(&action.metadata()).await?;
        let [left, right] = <[JoinEntry; 2]>::try_from(action.entries).map_err(|entries| {
            JoinPrecheckError::EntryCount {
                actor: self.name.to_owned(),
                expected: 2,
                actual: entries.len(),
            }
        })?;

        // The smaller input is indexed first.
        let (build, probe) = if right_metadata.cardinality().value()
            < left_metadata.cardinality().value()
        {
            ((right.stream, right_metadata), (left.stream, left_metadata))
        } else {
            ((left.stream, left_metadata), (right.stream, right_metadata))
        };

        let metadatas = [build.1, probe.1];
        let variables = BindingsMetadata::overlapping_variables(&metadatas);
        debug!(actor = self.name, ?variables, "Running hash join");

        let stream: BindingsStream = if self.can_handle_undefs {
            Box::pin(BuildProbeHashJoinStream::new(build.0, probe.0, variables))
        } else {
            Box::pin(SymmetricHashJoinStream::new(build.0, probe.0, variables))
        };

        let cardinality =
            metadatas[0].cardinality().value() * metadatas[1].cardinality().value();
        let metadata = BindingsMetadata::new(
            Cardinality::estimate(cardinality),
            BindingsMetadata::join_variables(&metadatas),
        );

        Ok(JoinOutput {
            stream,
            metadata: MetadataAccessor::ready(metadata),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datafusion::common::exec_err;
    use datafusion::error::DataFusionError;
    use futures::{stream, StreamExt, TryStreamExt};
    use rdf_federation_common::DFResult;
    use rdf_federation_model::{Binding, Literal, MetadataVariable, Term, Variable};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn binding(entries: &[(&str, &str)]) -> Binding {
        entries
            .iter()
            .map(|(variable, value)| {
                (
                    Variable::new_unchecked(*variable),
                    Term::from(Literal::new_simple_literal(*value)),
                )
            })
            .collect()
    }

    fn schema(variables: &[(&str, bool)], cardinality: f64) -> BindingsMetadata {
        BindingsMetadata::new(
            Cardinality::exact(cardinality),
            variables
                .iter()
                .map(|(name, can_be_undef)| {
                    MetadataVariable::new(Variable::new_unchecked(*name), *can_be_undef)
                })
                .collect(),
        )
    }

    fn entry(bindings: Vec<Binding>, metadata: BindingsMetadata) -> JoinEntry {
        let stream = stream::iter(bindings.into_iter().map(Ok::<_, DataFusionError>));
        JoinEntry::new(Box::pin(stream), MetadataAccessor::ready(metadata))
    }

    async fn collect_sorted(output: JoinOutput) -> DFResult<Vec<String>> {
        let mut result = output
            .stream
            .map_ok(|binding| binding.to_string())
            .try_collect::<Vec<_>>()
            .await?;
        result.sort();
        Ok(result)
    }

    /// A stream that never produces a binding and records whether it has been dropped.
    struct DropFlagStream(Arc<AtomicBool>);

    impl futures::Stream for DropFlagStream {
        type Item = DFResult<Binding>;

        fn poll_next(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<Option<Self::Item>> {
            std::task::Poll::Pending
        }
    }

    impl Drop for DropFlagStream {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_undef_join_with_unbound_shared_variable() -> DFResult<()> {
        let action = JoinAction::inner(vec![
            entry(
                vec![binding(&[("a", "1"), ("b", "2")])],
                schema(&[("a", true), ("b", false)], 1.0),
            ),
            entry(
                vec![binding(&[("c", "4")])],
                schema(&[("a", true), ("c", false)], 1.0),
            ),
        ]);

        let output = HashJoinActor::undef_tolerant()
            .run(action, &QueryContext::default())
            .await?;

        assert_eq!(
            collect_sorted(output).await?,
            vec![r#"{?a -> "1", ?b -> "2", ?c -> "4"}"#]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_strict_rejects_undefs() {
        let action = JoinAction::inner(vec![
            entry(Vec::new(), schema(&[("a", true), ("b", false)], 1.0)),
            entry(Vec::new(), schema(&[("a", false), ("c", false)], 1.0)),
        ]);

        let result = HashJoinActor::strict()
            .test(&action.metadata(), &QueryContext::default())
            .await;

        let error = result.expect_err("strict hash join must reject undefs");
        assert_eq!(
            error.to_string(),
            "Actor inner-hash can not join streams containing undefs"
        );
    }

    #[tokio::test]
    async fn test_prechecks() {
        let context = QueryContext::default();
        let actor = HashJoinActor::undef_tolerant();

        let single = JoinAction::inner(vec![entry(Vec::new(), schema(&[("a", false)], 1.0))]);
        let disjoint = JoinAction::inner(vec![
            entry(Vec::new(), schema(&[("a", false)], 1.0)),
            entry(Vec::new(), schema(&[("b", false)], 1.0)),
        ]);
        let optional = JoinAction::new(
            JoinType::Optional,
            vec![
                entry(Vec::new(), schema(&[("a", false)], 1.0)),
                entry(Vec::new(), schema(&[("a", false)], 1.0)),
            ],
        );

        let mut messages = Vec::new();
        for action in [single, disjoint, optional] {
            let message = match actor.test(&action.metadata(), &context).await {
                Ok(_) => String::from("accepted"),
                Err(error) => error.to_string(),
            };
            messages.push(message);
        }

        assert_eq!(
            messages,
            vec![
                "Actor inner-hash-undef can only join 2 entries, got 1",
                "Actor inner-hash-undef can only join entries with at least one common variable",
                "Actor inner-hash-undef can only handle logical join type 'inner', got 'optional'",
            ]
        );
    }

    #[tokio::test]
    async fn test_run_reports_entry_count() {
        let action = JoinAction::inner(vec![
            entry(Vec::new(), schema(&[("a", false)], 1.0)),
            entry(Vec::new(), schema(&[("a", false)], 1.0)),
            entry(Vec::new(), schema(&[("a", false)], 1.0)),
        ]);

        let error = HashJoinActor::strict()
            .run(action, &QueryContext::default())
            .await
            .expect_err("three entries must be rejected");

        assert_eq!(
            error.to_string(),
            "Actor inner-hash can only join 2 entries, got 3"
        );
    }

    #[tokio::test]
    async fn test_strict_join_is_commutative() -> DFResult<()> {
        let left = || {
            entry(
                vec![
                    binding(&[("a", "1"), ("b", "x")]),
                    binding(&[("a", "2"), ("b", "y")]),
                    binding(&[("a", "1"), ("b", "z")]),
                ],
                schema(&[("a", false), ("b", false)], 3.0),
            )
        };
        let right = || {
            entry(
                vec![binding(&[("a", "1"), ("c", "u")]), binding(&[("a", "3"), ("c", "v")])],
                schema(&[("a", false), ("c", false)], 2.0),
            )
        };

        let actor = HashJoinActor::strict();
        let context = QueryContext::default();
        let forward = actor
            .run(JoinAction::inner(vec![left(), right()]), &context)
            .await?;
        let backward = actor
            .run(JoinAction::inner(vec![right(), left()]), &context)
            .await?;

        let forward = collect_sorted(forward).await?;
        assert_eq!(
            forward,
            vec![
                r#"{?a -> "1", ?b -> "x", ?c -> "u"}"#,
                r#"{?a -> "1", ?b -> "z", ?c -> "u"}"#,
            ]
        );
        assert_eq!(forward, collect_sorted(backward).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_output_metadata() -> DFResult<()> {
        let action = JoinAction::inner(vec![
            entry(Vec::new(), schema(&[("a", true), ("b", false)], 3.0)),
            entry(Vec::new(), schema(&[("a", false), ("c", true)], 5.0)),
        ]);

        let output = HashJoinActor::undef_tolerant()
            .run(action, &QueryContext::default())
            .await?;
        let metadata = output.metadata.get().await?;

        assert_eq!(metadata.cardinality(), Cardinality::estimate(15.0));
        let mut variables = metadata.variables().to_vec();
        variables.sort_by(|lhs, rhs| lhs.variable.as_str().cmp(rhs.variable.as_str()));
        assert_eq!(
            variables,
            vec![
                MetadataVariable::new(Variable::new_unchecked("a"), true),
                MetadataVariable::new(Variable::new_unchecked("b"), false),
                MetadataVariable::new(Variable::new_unchecked("c"), true),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_conflicting_bindings_are_dropped() -> DFResult<()> {
        let action = JoinAction::inner(vec![
            entry(
                vec![binding(&[("b", "2")]), binding(&[("a", "1"), ("b", "3")])],
                schema(&[("a", true), ("b", false)], 2.0),
            ),
            entry(
                vec![binding(&[("a", "1"), ("b", "2")]), binding(&[("a", "2"), ("b", "3")])],
                schema(&[("a", false), ("b", false)], 2.0),
            ),
        ]);

        let output = HashJoinActor::undef_tolerant()
            .run(action, &QueryContext::default())
            .await?;

        assert_eq!(
            collect_sorted(output).await?,
            vec![r#"{?a -> "1", ?b -> "2"}"#]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_upstream_error_terminates_join() -> DFResult<()> {
        let failing = || {
            stream::iter(vec![
                Ok(binding(&[("a", "1")])),
                exec_err!("source failed"),
                Ok(binding(&[("a", "2")])),
            ])
        };
        for actor in [HashJoinActor::strict(), HashJoinActor::undef_tolerant()] {
            let failing = JoinEntry::new(
                Box::pin(failing()),
                MetadataAccessor::ready(schema(&[("a", false)], 1.0)),
            );
            let action = JoinAction::inner(vec![
                failing,
                entry(
                    vec![binding(&[("a", "1")]), binding(&[("a", "2")])],
                    schema(&[("a", false)], 2.0),
                ),
            ]);

            let mut output = actor.run(action, &QueryContext::default()).await?.stream;
            let mut error = None;
            while let Some(item) = output.next().await {
                if let Err(item) = item {
                    error = Some(item);
                    break;
                }
            }

            assert!(
                error.is_some_and(|error| error.to_string().contains("source failed")),
                "{} must forward the upstream error",
                actor.name()
            );
            assert!(output.next().await.is_none(), "{} must terminate", actor.name());
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_dropping_output_releases_inputs() -> DFResult<()> {
        for actor in [HashJoinActor::strict(), HashJoinActor::undef_tolerant()] {
            let left_dropped = Arc::new(AtomicBool::new(false));
            let right_dropped = Arc::new(AtomicBool::new(false));
            let action = JoinAction::inner(vec![
                JoinEntry::new(
                    Box::pin(DropFlagStream(Arc::clone(&left_dropped))),
                    MetadataAccessor::ready(schema(&[("a", false)], 1.0)),
                ),
                JoinEntry::new(
                    Box::pin(DropFlagStream(Arc::clone(&right_dropped))),
                    MetadataAccessor::ready(schema(&[("a", false)], 2.0)),
                ),
            ]);

            let mut output = actor.run(action, &QueryContext::default()).await?.stream;
            assert!(futures::poll!(output.next()).is_pending());
            drop(output);

            assert!(left_dropped.load(Ordering::SeqCst));
            assert!(right_dropped.load(Ordering::SeqCst));
        }
        Ok(())
    }
}
