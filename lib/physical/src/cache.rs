//! Caching of bindings streams that are requested multiple times within a query.

use datafusion::common::exec_datafusion_err;
use datafusion::error::DataFusionError;
use futures::{Stream, StreamExt};
use rdf_federation_common::{BindingsStream, DFResult, SourceAnnotation};
use rdf_federation_logical::algebra::QuadPattern;
use rdf_federation_model::Binding;
use rustc_hash::FxHashMap;
use std::fmt::{Debug, Formatter};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Waker};

/// Returns the key under which the bindings of `pattern`, evaluated on `source`, are cached.
pub fn pattern_signature(pattern: &QuadPattern, source: Option<&SourceAnnotation>) -> String {
    match source {
        Some(source) => format!("{pattern} {source}"),
        None => pattern.to_string(),
    }
}

/// Caches [ReplayableBindings] by the signature of the pattern that produced them.
#[derive(Debug, Default)]
pub struct BindingsStreamCache {
    entries: FxHashMap<String, ReplayableBindings>,
}

impl BindingsStreamCache {
    /// Creates an empty [BindingsStreamCache].
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a replay of the bindings cached under `signature`.
    ///
    /// If nothing is cached yet, the stream returned by `create` is cached first.
    pub fn get_or_insert_with(
        &mut self,
        signature: impl Into<String>,
        create: impl FnOnce() -> BindingsStream,
    ) -> BindingsStream {
        self.entries
            .entry(signature.into())
            .or_insert_with(|| ReplayableBindings::new(create()))
            .replay()
    }

    /// Returns a replay of the bindings cached under `signature`, if any.
    pub fn get(&self, signature: &str) -> Option<BindingsStream> {
        self.entries.get(signature).map(ReplayableBindings::replay)
    }

    pub fn contains(&self, signature: &str) -> bool {
        self.entries.contains_key(signature)
    }

    /// Removes the entry for `signature`. Existing replays stay valid.
    pub fn remove(&mut self, signature: &str) -> bool {
        self.entries.remove(signature).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// A bindings stream that can be consumed any number of times.
///
/// The upstream is consumed at most once, by whichever replay needs the next binding first. All
/// bindings are buffered so that every replay observes the complete sequence, including a
/// terminating error.
#[derive(Clone)]
pub struct ReplayableBindings {
    state: Arc<Mutex<ReplayState>>,
}

struct ReplayState {
    /// Dropped once the upstream has finished.
    upstream: Option<BindingsStream>,
    buffer: Vec<Result<Binding, Arc<DataFusionError>>>,
    /// Replays waiting for the next upstream item.
    waiters: Vec<Waker>,
}

impl ReplayState {
    fn wake_waiters(&mut self) {
        for waker in self.waiters.drain(..) {
            waker.wake();
        }
    }
}

impl ReplayableBindings {
    /// Creates a new [ReplayableBindings] over `upstream`.
    pub fn new(upstream: BindingsStream) -> Self {
        Self {
            state: Arc::new(Mutex::new(ReplayState {
                upstream: Some(upstream),
                buffer: Vec::new(),
                waiters: Vec::new(),
            })),
        }
    }

    /// Creates a new stream that starts at the first binding.
    pub fn replay(&self) -> BindingsStream {
        Box::pin(ReplayStream {
            state: Arc::clone(&self.state),
            position: 0,
        })
    }
}

impl Debug for ReplayableBindings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("ReplayableBindings");
        if let Ok(state) = self.state.lock() {
            debug
                .field("buffered", &state.buffer.len())
                .field("finished", &state.upstream.is_none());
        }
        debug.finish_non_exhaustive()
    }
}

struct ReplayStream {
    state: Arc<Mutex<ReplayState>>,
    /// The index of the next buffered item.
    position: usize,
}

impl ReplayStream {
    fn poll_inner(&mut self, cx: &mut Context<'_>) -> Poll<Option<DFResult<Binding>>> {
        let Ok(mut state) = self.state.lock() else {
            return Poll::Ready(Some(Err(exec_datafusion_err!(
                "Bindings replay buffer is poisoned."
            ))));
        };

        if let Some(item) = state.buffer.get(self.position) {
            self.position += 1;
            return Poll::Ready(Some(item.clone().map_err(DataFusionError::Shared)));
        }

        let Some(upstream) = state.upstream.as_mut() else {
            return Poll::Ready(None);
        };

        match upstream.poll_next_unpin(cx) {
            Poll::Ready(Some(item)) => {
                let item = item.map_err(Arc::new);
                if item.is_err() {
                    state.upstream = None;
                }
                state.buffer.push(item.clone());
                state.wake_waiters();
                self.position += 1;
                Poll::Ready(Some(item.map_err(DataFusionError::Shared)))
            }
            Poll::Ready(None) => {
                state.upstream = None;
                state.wake_waiters();
                Poll::Ready(None)
            }
            Poll::Pending => {
                state.waiters.push(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

impl Stream for ReplayStream {
    type Item = DFResult<Binding>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        this.poll_inner(cx)
    }
}
