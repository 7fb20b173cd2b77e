//! Cross-platform content loaders for Horizon.
//!
//! This crate fetches a resource named by a URL-like string and publishes the
//! outcome on a signal channel:
//!
//! - **Loader lifecycle**: `Idle → Loading → Completed | Failed | Cancelled`,
//!   with exactly one terminal event per cycle
//! - **HTTP loading**: GET through `load`, POST through `send` with
//!   `Content-Type` negotiated from the payload
//! - **Platform dispatch**: local files on native targets, bundled assets on
//!   packaged targets, HTTP everywhere for `http:`/`https:` URLs
//! - **Typed content**: responses decode into `String`, `Bytes`, JSON values
//!   or any `serde` type
//!
//! # Loading a file
//!
//! ```
//! use horizon_fetch::{HttpLoader, LoaderEvent, Platform};
//!
//! let path = std::env::temp_dir().join("horizon-fetch-doc.txt");
//! std::fs::write(&path, "hello").unwrap();
//!
//! let mut loader: HttpLoader<String> = HttpLoader::builder()
//!     .url(path.to_str().unwrap())
//!     .platform(Platform::native())
//!     .build()
//!     .unwrap();
//!
//! loader.events().connect(|event| {
//!     if let LoaderEvent::Complete(text) = event {
//!         println!("loaded: {text}");
//!     }
//! });
//!
//! loader.load().unwrap();
//! loader.process_events();
//! assert_eq!(loader.content().as_deref(), Some("hello"));
//! ```
//!
//! # Execution model
//!
//! `load` and `send` return immediately after emitting `Start`. Transport
//! callbacks may arrive on any thread; they are queued on the loader's
//! [`TaskQueue`] and take effect when the host calls
//! [`Loader::process_events`] (or drains a shared queue). Callbacks from a
//! cycle that was cancelled or superseded are dropped.
//!
//! # Failures
//!
//! Operational failures never surface as return values: they arrive as
//! [`LoaderEvent::Fail`] carrying a [`LoaderError`]. Only programming
//! errors, such as loading without a URL, are returned as [`UsageError`].

mod content;
mod error;
pub mod http;
mod loader;
mod payload;
pub mod platform;
pub mod runtime;
pub mod transport;

pub use content::{Content, Json, Xml};
pub use error::{FailureKind, LoaderError, PayloadError, Result, TransportError, UsageError};
pub use http::{HttpBackend, HttpLoader, HttpLoaderBuilder};
pub use loader::{LoadCycle, LoadState, Loader, LoaderBackend, LoaderEvent};
pub use payload::{
    CONTENT_TYPE_JSON, CONTENT_TYPE_OCTET_STREAM, CONTENT_TYPE_XML, Markup, Payload,
};
pub use platform::{
    ASSET_PREFIX, AssetSource, EmbeddedAssets, FileSystem, LocalFileSystem, MemoryAssets,
    Platform,
};
pub use transport::{
    ReqwestTransport, ReqwestTransportBuilder, ReqwestTransportConfig, TransferProgress,
    Transport, TransportSink,
};

pub use horizon_fetch_core::{ConnectionGuard, ConnectionId, Signal, TaskQueue};
