//! HTTP loading.
//!
//! [`HttpLoader`] is a [`Loader`](crate::Loader) whose backend speaks HTTP
//! through a [`Transport`](crate::Transport), falling back to local files or
//! bundled assets for non-network URLs depending on the
//! [`Platform`](crate::Platform).
//!
//! # Example
//!
//! ```no_run
//! use horizon_fetch::{HttpLoader, LoaderEvent};
//!
//! let mut loader: HttpLoader<serde_json::Value> =
//!     HttpLoader::with_url("https://example.com/api/items");
//! loader.set_header("Accept", "application/json");
//!
//! loader.events().connect(|event| match event {
//!     LoaderEvent::Complete(items) => println!("loaded {items}"),
//!     LoaderEvent::Fail(err) => eprintln!("failed: {err}"),
//!     _ => {}
//! });
//!
//! loader.send(serde_json::json!({"page": 1})).unwrap();
//!
//! // From the host's loop:
//! while loader.is_loading() {
//!     loader.process_events();
//!     std::thread::sleep(std::time::Duration::from_millis(10));
//! }
//! ```

mod backend;
mod loader;

pub use backend::{CONTENT_TYPE, ConfigureHook, HttpBackend};
pub use loader::{HttpLoader, HttpLoaderBuilder};
