//! Core systems for Horizon Fetch.
//!
//! This crate provides the foundational pieces the loaders are built on:
//!
//! - **Signal/Slot System**: Type-safe notification of lifecycle events
//! - **Task Queue**: Deferred callbacks pumped by the host's execution context
//! - **Logging**: `tracing` targets and span names for log filtering
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_fetch_core::Signal;
//!
//! // Create a signal that notifies when a value changes
//! let value_changed = Signal::<i32>::new();
//!
//! // Connect a slot to handle the signal
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! // Emit the signal
//! value_changed.emit(42);
//!
//! // Disconnect when done
//! value_changed.disconnect(conn_id);
//! ```
//!
//! # Task Queue Example
//!
//! ```
//! use horizon_fetch_core::TaskQueue;
//!
//! let queue = TaskQueue::new();
//! queue.post(|| println!("runs later"));
//!
//! // Nothing has run yet; the host drains the queue from its own loop.
//! assert_eq!(queue.pending_count(), 1);
//! queue.process_all();
//! ```

mod error;
pub mod logging;
pub mod signal;
pub mod task;

pub use error::{CoreError, Result};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use task::{TaskId, TaskQueue};
