//! Deferred task queue.
//!
//! A [`TaskQueue`] is the execution context loaders resume on. Transports
//! may finish on any thread; their callbacks are posted here and run when the
//! host drains the queue, so every state change and every signal emission for
//! a loader happens on whichever thread pumps its queue.
//!
//! The queue is a cheap, cloneable handle. Clones share the same pending
//! tasks, which lets several loaders resume on one host loop.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::error::{CoreError, Result};

/// A unique identifier for a deferred task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    /// Get the raw u64 value of this task ID.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Global counter for generating unique task IDs.
static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

fn next_task_id() -> TaskId {
    TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
}

/// A boxed task closure.
type BoxedTask = Box<dyn FnOnce() + Send + 'static>;

/// Internal task data.
struct TaskData {
    id: TaskId,
    task: BoxedTask,
}

/// Shared FIFO of deferred tasks.
#[derive(Clone)]
pub struct TaskQueue {
    tasks: Arc<Mutex<VecDeque<TaskData>>>,
}

impl TaskQueue {
    /// Create a new, empty task queue.
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Post a task to be executed the next time the queue is processed.
    ///
    /// Returns the task ID that can be used to cancel the task.
    pub fn post<F>(&self, task: F) -> TaskId
    where
        F: FnOnce() + Send + 'static,
    {
        let id = next_task_id();
        self.tasks.lock().push_back(TaskData {
            id,
            task: Box::new(task),
        });
        tracing::trace!(target: "horizon_fetch_core::task", task = id.as_u64(), "task posted");
        id
    }

    /// Cancel a pending task.
    pub fn cancel(&self, id: TaskId) -> Result<()> {
        let mut tasks = self.tasks.lock();
        match tasks.iter().position(|t| t.id == id) {
            Some(pos) => {
                tasks.remove(pos);
                Ok(())
            }
            None => Err(CoreError::InvalidTask),
        }
    }

    /// Check if there are any pending tasks.
    pub fn has_pending(&self) -> bool {
        !self.tasks.lock().is_empty()
    }

    /// Get the number of pending tasks.
    pub fn pending_count(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Process up to `max` tasks in FIFO order.
    ///
    /// Tasks posted while processing are queued behind the existing ones.
    /// Returns the number of tasks processed.
    pub fn process_batch(&self, max: usize) -> usize {
        let mut processed = 0;
        while processed < max {
            // The lock is released before running the task so tasks can post.
            let Some(task_data) = self.tasks.lock().pop_front() else {
                break;
            };
            (task_data.task)();
            processed += 1;
        }
        processed
    }

    /// Process tasks until the queue is empty, including tasks posted by
    /// the tasks being processed.
    ///
    /// Returns the number of tasks processed.
    #[tracing::instrument(skip_all, target = "horizon_fetch_core::task", level = "trace")]
    pub fn process_all(&self) -> usize {
        let processed = self.process_batch(usize::MAX);
        if processed > 0 {
            tracing::trace!(target: "horizon_fetch_core::task", processed, "task queue drained");
        }
        processed
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue")
            .field("pending", &self.pending_count())
            .finish()
    }
}
