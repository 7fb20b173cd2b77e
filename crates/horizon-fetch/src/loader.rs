//! Generic loader lifecycle.
//!
//! A [`Loader`] owns a URL, a loading flag, the last successfully loaded
//! content and a signal channel. The transport-specific part is supplied
//! by a [`LoaderBackend`], which receives a [`LoadCycle`] handle for every
//! load and reports the outcome through it.
//!
//! # States
//!
//! ```text
//! Idle ──load/send──▶ Loading ──▶ Completed
//!                        │  └───▶ Failed
//!                        └──────▶ Cancelled
//! ```
//!
//! Every state other than `Loading` is idle: the loader can be reused
//! immediately. Starting a new cycle while one is in flight cancels the old
//! one first.
//!
//! # Superseded cycles
//!
//! Each cycle is tagged with a generation number. Cancelling or starting a
//! new cycle bumps the generation, and every callback delivered through an
//! older [`LoadCycle`] is dropped without touching state or emitting events.
//!
//! # Execution context
//!
//! Outcomes reported through a [`LoadCycle`] are posted to the loader's
//! [`TaskQueue`] and applied when the host drains it (see
//! [`Loader::process_events`]). Only `Start` is emitted synchronously, from
//! inside `load`/`send`.

use std::sync::{Arc, Weak};

use horizon_fetch_core::{Signal, TaskQueue};
use parking_lot::Mutex;

use crate::content::Content;
use crate::error::{LoaderError, UsageError};
use crate::transport::TransferProgress;

/// Lifecycle state of a loader.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadState {
    /// Never started.
    #[default]
    Idle,
    /// A cycle is in flight.
    Loading,
    /// The last cycle completed.
    Completed,
    /// The last cycle failed.
    Failed,
    /// The last cycle was cancelled.
    Cancelled,
}

impl LoadState {
    /// Whether a cycle is in flight.
    pub fn is_loading(self) -> bool {
        self == Self::Loading
    }
}

/// Events published on a loader's signal channel.
#[derive(Clone, Debug, PartialEq)]
pub enum LoaderEvent<T> {
    /// A cycle started.
    Start,
    /// The transport reported transfer progress.
    Progress(TransferProgress),
    /// The cycle completed with the decoded content.
    Complete(T),
    /// The cycle failed.
    Fail(LoaderError),
}

impl<T> LoaderEvent<T> {
    /// Whether this event ends a cycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete(_) | Self::Fail(_))
    }
}

/// Transport-specific half of a loader.
///
/// `load` must arrange for exactly one terminal report (`deliver`,
/// `complete` or `fail`) on the given cycle, now or later. `cancel` is called
/// when an in-flight cycle is abandoned and must tolerate a transport that has
/// already finished.
pub trait LoaderBackend<T: Content>: Send {
    /// Start loading `url`.
    fn load(&mut self, url: &str, cycle: LoadCycle<T>);

    /// Abort the in-flight operation, if the transport can.
    fn cancel(&mut self);
}

struct LoaderShared<T> {
    state: Mutex<SharedState<T>>,
    events: Signal<LoaderEvent<T>>,
    tasks: TaskQueue,
}

struct SharedState<T> {
    state: LoadState,
    generation: u64,
    content: Option<T>,
}

impl<T: Content> LoaderShared<T> {
    fn is_current(&self, generation: u64) -> bool {
        let state = self.state.lock();
        state.state.is_loading() && state.generation == generation
    }

    /// Apply a terminal outcome if `generation` is still the live cycle.
    fn finish(&self, generation: u64, outcome: std::result::Result<T, LoaderError>) {
        let event = {
            let mut state = self.state.lock();
            if !state.state.is_loading() || state.generation != generation {
                tracing::trace!(target: "horizon_fetch::loader", generation, "dropping outcome of superseded cycle");
                return;
            }
            match outcome {
                Ok(content) => {
                    state.state = LoadState::Completed;
                    state.content = Some(content.clone());
                    LoaderEvent::Complete(content)
                }
                Err(err) => {
                    state.state = LoadState::Failed;
                    LoaderEvent::Fail(err)
                }
            }
        };

        match &event {
            LoaderEvent::Fail(err) => {
                tracing::debug!(target: "horizon_fetch::loader", generation, kind = ?err.kind(), "load failed: {err}");
            }
            _ => tracing::debug!(target: "horizon_fetch::loader", generation, "load completed"),
        }
        self.events.emit(event);
    }
}

/// Handle through which a backend reports the outcome of one cycle.
///
/// Handles are cheap to clone and may be sent to other threads. Every report
/// is posted to the loader's task queue; when it runs, it is ignored unless
/// this handle's cycle is still the loader's live cycle. Reports made after
/// the loader has been dropped are ignored as well.
pub struct LoadCycle<T> {
    shared: Weak<LoaderShared<T>>,
    tasks: TaskQueue,
    generation: u64,
}

impl<T> Clone for LoadCycle<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
            tasks: self.tasks.clone(),
            generation: self.generation,
        }
    }
}

impl<T> std::fmt::Debug for LoadCycle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadCycle")
            .field("generation", &self.generation)
            .finish()
    }
}

impl<T: Content> LoadCycle<T> {
    /// The generation number of this cycle.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether this cycle is still the loader's live cycle.
    pub fn is_current(&self) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|shared| shared.is_current(self.generation))
    }

    /// Run `task` on the loader's execution context, only if this cycle is
    /// still live at that point.
    pub fn defer<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let shared = self.shared.clone();
        let generation = self.generation;
        self.tasks.post(move || {
            if shared
                .upgrade()
                .is_some_and(|shared| shared.is_current(generation))
            {
                task();
            }
        });
    }

    /// Report raw content. It is decoded into `T` when applied; a decoding
    /// error fails the cycle.
    pub fn deliver(&self, raw: String) {
        let shared = self.shared.clone();
        let generation = self.generation;
        self.tasks.post(move || {
            if let Some(shared) = shared.upgrade() {
                if shared.is_current(generation) {
                    shared.finish(generation, T::decode(raw));
                }
            }
        });
    }

    /// Report already decoded content.
    pub fn complete(&self, content: T) {
        self.post_outcome(Ok(content));
    }

    /// Report a failure.
    pub fn fail(&self, error: LoaderError) {
        self.post_outcome(Err(error));
    }

    /// Report transfer progress.
    pub fn progress(&self, progress: TransferProgress) {
        let shared = self.shared.clone();
        let generation = self.generation;
        self.tasks.post(move || {
            if let Some(shared) = shared.upgrade() {
                if shared.is_current(generation) {
                    shared.events.emit(LoaderEvent::Progress(progress));
                }
            }
        });
    }

    fn post_outcome(&self, outcome: std::result::Result<T, LoaderError>) {
        let shared = self.shared.clone();
        let generation = self.generation;
        self.tasks.post(move || {
            if let Some(shared) = shared.upgrade() {
                shared.finish(generation, outcome);
            }
        });
    }
}

/// A content loader: a lifecycle state machine over a backend `B` producing
/// content of type `T`.
pub struct Loader<T, B> {
    url: Option<String>,
    shared: Arc<LoaderShared<T>>,
    pub(crate) backend: B,
}

impl<T: Content, B: LoaderBackend<T>> Loader<T, B> {
    /// Create a loader over `backend` with its own task queue.
    pub fn with_backend(url: Option<String>, backend: B) -> Self {
        Self::with_task_queue(url, backend, TaskQueue::new())
    }

    /// Create a loader that resumes on a shared task queue.
    pub fn with_task_queue(url: Option<String>, backend: B, tasks: TaskQueue) -> Self {
        Self {
            url,
            shared: Arc::new(LoaderShared {
                state: Mutex::new(SharedState {
                    state: LoadState::Idle,
                    generation: 0,
                    content: None,
                }),
                events: Signal::new(),
                tasks,
            }),
            backend,
        }
    }

    /// The URL the next cycle will load.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Set the URL for the next cycle. An in-flight cycle is unaffected.
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = Some(url.into());
    }

    /// Clear the URL.
    pub fn clear_url(&mut self) {
        self.url = None;
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LoadState {
        self.shared.state.lock().state
    }

    /// Whether a cycle is in flight.
    pub fn is_loading(&self) -> bool {
        self.state().is_loading()
    }

    /// The content of the last completed cycle.
    pub fn content(&self) -> Option<T> {
        self.shared.state.lock().content.clone()
    }

    /// The signal channel publishing this loader's lifecycle.
    pub fn events(&self) -> &Signal<LoaderEvent<T>> {
        &self.shared.events
    }

    /// The execution context this loader's callbacks resume on.
    pub fn task_queue(&self) -> &TaskQueue {
        &self.shared.tasks
    }

    /// Drain the task queue, applying every pending callback.
    ///
    /// Returns the number of tasks processed.
    pub fn process_events(&self) -> usize {
        self.shared.tasks.process_all()
    }

    /// The backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the backend.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Start loading the configured URL.
    ///
    /// A cycle already in flight is cancelled first. Emits `Start` before
    /// returning; the outcome arrives later through the task queue.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::MissingUrl`] without side effects if no URL is set.
    pub fn load(&mut self) -> std::result::Result<(), UsageError> {
        let url = self.url.clone().ok_or(UsageError::MissingUrl)?;
        let cycle = self.begin();
        tracing::debug!(target: "horizon_fetch::loader", generation = cycle.generation(), %url, "load started");
        self.backend.load(&url, cycle);
        Ok(())
    }

    /// Abandon the in-flight cycle, if any.
    ///
    /// No event is emitted. Late callbacks from the abandoned cycle are
    /// ignored even when the backend cannot stop the transport.
    pub fn cancel(&mut self) {
        let cancelled = {
            let mut state = self.shared.state.lock();
            if state.state.is_loading() {
                state.state = LoadState::Cancelled;
                state.generation += 1;
                true
            } else {
                false
            }
        };

        if cancelled {
            tracing::debug!(target: "horizon_fetch::loader", "load cancelled");
            self.backend.cancel();
        }
    }

    /// Enter `Loading` for a new cycle and emit `Start`.
    pub(crate) fn begin(&mut self) -> LoadCycle<T> {
        if self.is_loading() {
            self.cancel();
        }

        let generation = {
            let mut state = self.shared.state.lock();
            state.generation += 1;
            state.state = LoadState::Loading;
            state.generation
        };

        self.shared.events.emit(LoaderEvent::Start);

        LoadCycle {
            shared: Arc::downgrade(&self.shared),
            tasks: self.shared.tasks.clone(),
            generation,
        }
    }
}

impl<T, B> std::fmt::Debug for Loader<T, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("Loader")
            .field("url", &self.url)
            .field("state", &state.state)
            .field("generation", &state.generation)
            .finish()
    }
}
