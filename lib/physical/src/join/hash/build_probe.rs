use crate::index::{create_bindings_index, BindingsIndex};
use futures::{Stream, StreamExt};
use rdf_federation_common::{BindingsStream, DFResult};
use rdf_federation_model::{Binding, Variable};
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

type BindingsBuckets = Box<dyn BindingsIndex<Vec<Binding>>>;

/// A hash join that tolerates unbound join variables.
///
/// The build input is fully consumed into an undef-tolerant index before the first binding of the
/// probe input is requested. Each probe binding is then joined with all compatible build
/// bindings.
pub(super) struct BuildProbeHashJoinStream {
    state: BuildProbeState,
    output: VecDeque<Binding>,
}

enum BuildProbeState {
    Building {
        build: BindingsStream,
        probe: BindingsStream,
        index: BindingsBuckets,
        is_empty: bool,
    },
    Probing {
        probe: BindingsStream,
        index: BindingsBuckets,
    },
    Done,
}

impl BuildProbeHashJoinStream {
    /// Creates a new [BuildProbeHashJoinStream] that joins on `variables`.
    pub(super) fn new(build: BindingsStream, probe: BindingsStream, variables: Vec<Variable>) -> Self {
        Self {
            state: BuildProbeState::Building {
                build,
                probe,
                index: create_bindings_index(variables, true),
                is_empty: true,
            },
            output: VecDeque::new(),
        }
    }

    fn poll_inner(&mut self, cx: &mut Context<'_>) -> Poll<Option<DFResult<Binding>>> {
        loop {
            if let Some(binding) = self.output.pop_front() {
                return Poll::Ready(Some(Ok(binding)));
            }

            match &mut self.state {
                BuildProbeState::Building {
                    build,
                    index,
                    is_empty,
                    ..
                } => match ready!(build.poll_next_unpin(cx)) {
                    Some(Ok(binding)) => {
                        *is_empty = false;
                        match index.get_exact_mut(&binding) {
                            Some(bucket) => bucket.push(binding),
                            None => index.put(&binding, vec![binding.clone()]),
                        }
                    }
                    Some(Err(error)) => {
                        self.state = BuildProbeState::Done;
                        return Poll::Ready(Some(Err(error)));
                    }
                    None => {
                        self.state = match std::mem::replace(&mut self.state, BuildProbeState::Done) {
                            // Nothing can join with an empty build input.
                            BuildProbeState::Building { is_empty: true, .. } => BuildProbeState::Done,
                            BuildProbeState::Building { probe, index, .. } => {
                                BuildProbeState::Probing { probe, index }
                            }
                            state => state,
                        };
                    }
                },
                BuildProbeState::Probing { probe, index } => {
                    match ready!(probe.poll_next_unpin(cx)) {
                        Some(Ok(binding)) => {
                            let joined = index
                                .get(&binding)
                                .into_iter()
                                .flatten()
                                .filter_map(|candidate| binding.merge(candidate));
                            self.output.extend(joined);
                        }
                        Some(Err(error)) => {
                            self.state = BuildProbeState::Done;
                            return Poll::Ready(Some(Err(error)));
                        }
                        None => {
                            self.state = BuildProbeState::Done;
                        }
                    }
                }
                BuildProbeState::Done => return Poll::Ready(None),
            }
        }
    }
}

impl Stream for BuildProbeHashJoinStream {
    type Item = DFResult<Binding>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        this.poll_inner(cx)
    }
}
