use crate::index::{BindingsIndex, BindingsIndexDef};
use futures::{Stream, StreamExt};
use rdf_federation_common::{BindingsStream, DFResult};
use rdf_federation_model::{Binding, Variable};
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

impl Side {
    fn other(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// A symmetric hash join of two streams that never contain unbound join variables.
///
/// Both inputs are consumed alternately. Every binding is probed against the bindings of the
/// other input seen so far and is then remembered for the bindings of the other input that are
/// yet to come. Results are therefore produced as early as possible.
pub(super) struct SymmetricHashJoinStream {
    left: Option<BindingsStream>,
    right: Option<BindingsStream>,
    left_index: BindingsIndexDef<Vec<Binding>>,
    right_index: BindingsIndexDef<Vec<Binding>>,
    /// The side that is polled first in the next round.
    next_side: Side,
    /// Joined bindings that have not been emitted yet.
    output: VecDeque<Binding>,
}

impl SymmetricHashJoinStream {
    /// Creates a new [SymmetricHashJoinStream] that joins on `variables`.
    pub(super) fn new(left: BindingsStream, right: BindingsStream, variables: Vec<Variable>) -> Self {
        Self {
            left: Some(left),
            right: Some(right),
            left_index: BindingsIndexDef::new(variables.clone()),
            right_index: BindingsIndexDef::new(variables),
            next_side: Side::Left,
            output: VecDeque::new(),
        }
    }

    fn input(&mut self, side: Side) -> Option<&mut BindingsStream> {
        match side {
            Side::Left => self.left.as_mut(),
            Side::Right => self.right.as_mut(),
        }
    }

    fn is_open(&self, side: Side) -> bool {
        match side {
            Side::Left => self.left.is_some(),
            Side::Right => self.right.is_some(),
        }
    }

    fn poll_inner(&mut self, cx: &mut Context<'_>) -> Poll<Option<DFResult<Binding>>> {
        loop {
            if let Some(binding) = self.output.pop_front() {
                return Poll::Ready(Some(Ok(binding)));
            }

            if self.left.is_none() && self.right.is_none() {
                return Poll::Ready(None);
            }

            let mut progress = false;
            for side in [self.next_side, self.next_side.other()] {
                let Some(input) = self.input(side) else {
                    continue;
                };

                match input.poll_next_unpin(cx) {
                    Poll::Ready(Some(Ok(binding))) => {
                        self.on_binding(side, binding);
                        self.next_side = side.other();
                    }
                    Poll::Ready(Some(Err(error))) => {
                        self.terminate();
                        return Poll::Ready(Some(Err(error)));
                    }
                    Poll::Ready(None) => self.on_end(side),
                    Poll::Pending => continue,
                }
                progress = true;
                break;
            }

            if !progress {
                return Poll::Pending;
            }
        }
    }

    fn on_binding(&mut self, side: Side, binding: Binding) {
        let other_open = self.is_open(side.other());
        let (own_index, other_index) = match side {
            Side::Left => (&mut self.left_index, &self.right_index),
            Side::Right => (&mut self.right_index, &self.left_index),
        };

        if let Some(candidates) = other_index.get_first(&binding, false) {
            self.output.extend(
                candidates
                    .iter()
                    .filter_map(|candidate| binding.merge(candidate)),
            );
        }

        // Only bindings of the other input will ever probe this index.
        if other_open {
            match own_index.get_exact_mut(&binding) {
                Some(bucket) => bucket.push(binding),
                None => own_index.put(&binding, vec![binding.clone()]),
            }
        }
    }

    fn on_end(&mut self, side: Side) {
        match side {
            Side::Left => {
                self.left = None;
                self.right_index = BindingsIndexDef::new(Vec::new());
                if self.left_index.is_empty() {
                    self.right = None;
                }
            }
            Side::Right => {
                self.right = None;
                self.left_index = BindingsIndexDef::new(Vec::new());
                if self.right_index.is_empty() {
                    self.left = None;
                }
            }
        }
    }

    /// Releases both inputs and all buffered bindings.
    fn terminate(&mut self) {
        self.left = None;
        self.right = None;
        self.left_index = BindingsIndexDef::new(Vec::new());
        self.right_index = BindingsIndexDef::new(Vec::new());
        self.output.clear();
    }
}

impl Stream for SymmetricHashJoinStream {
    type Item = DFResult<Binding>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        this.poll_inner(cx)
    }
}
