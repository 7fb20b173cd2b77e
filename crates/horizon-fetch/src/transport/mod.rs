//! HTTP transport capability.
//!
//! A [`Transport`] is the primitive an HTTP loader drives: the loader stages a
//! URL, headers and an optional body, then calls [`Transport::request`]. The
//! transport answers later through the [`TransportSink`] it was handed,
//! reporting a status code, then either the response text or an error
//! message.
//!
//! `request` may also refuse synchronously by returning a
//! [`TransportError`]. The loader turns such refusals into a `Fail` event
//! classified as security; they never escape as panics or errors of `load`.
//!
//! [`ReqwestTransport`] is the network implementation used by default. Tests
//! and embedders can inject any other implementation.

mod client;

use std::sync::Arc;

pub use client::{ReqwestTransport, ReqwestTransportBuilder, ReqwestTransportConfig};

pub use crate::error::TransportError;

/// Progress information for a transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferProgress {
    /// Number of bytes transferred so far.
    pub bytes_transferred: u64,
    /// Total number of bytes, if known.
    pub total_bytes: Option<u64>,
}

impl TransferProgress {
    /// Get the progress as a fraction (0.0 to 1.0), if total is known.
    pub fn fraction(&self) -> Option<f64> {
        self.total_bytes.map(|total| {
            if total == 0 {
                1.0
            } else {
                self.bytes_transferred as f64 / total as f64
            }
        })
    }

    /// Get the progress as a percentage (0 to 100), if total is known.
    pub fn percent(&self) -> Option<u8> {
        self.fraction().map(|f| (f * 100.0).min(100.0) as u8)
    }
}

/// Receiver of transport callbacks.
pub trait ResponseHandler: Send + Sync {
    /// The full response body arrived.
    fn on_data(&self, content: String);

    /// The request failed at the transport level.
    fn on_error(&self, message: String);

    /// The response status line arrived.
    fn on_status(&self, code: u16);

    /// Part of the body arrived.
    fn on_progress(&self, _progress: TransferProgress) {}
}

/// Cloneable callback handle given to a transport for one request.
#[derive(Clone)]
pub struct TransportSink {
    handler: Arc<dyn ResponseHandler>,
}

impl TransportSink {
    /// Wrap a handler.
    pub fn new(handler: impl ResponseHandler + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Report the response body.
    pub fn data(&self, content: impl Into<String>) {
        self.handler.on_data(content.into());
    }

    /// Report a transport-level error.
    pub fn error(&self, message: impl Into<String>) {
        self.handler.on_error(message.into());
    }

    /// Report the HTTP status code.
    pub fn status(&self, code: u16) {
        self.handler.on_status(code);
    }

    /// Report transfer progress.
    pub fn progress(&self, progress: TransferProgress) {
        self.handler.on_progress(progress);
    }
}

impl std::fmt::Debug for TransportSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportSink").finish_non_exhaustive()
    }
}

/// The HTTP client primitive behind an HTTP loader.
///
/// Staged state (URL, headers, body) applies to the next `request` call and
/// is consumed by it.
pub trait Transport: Send {
    /// Stage the request URL.
    fn set_url(&mut self, url: &str);

    /// Stage a request header, replacing an earlier value for the same name.
    fn set_header(&mut self, name: &str, value: &str);

    /// Stage the request body. `None` clears it.
    fn set_post_data(&mut self, data: Option<String>);

    /// Choose whether `request` waits for the response before returning.
    ///
    /// Callbacks are delivered through the sink either way. Transports that
    /// cannot block ignore this.
    fn set_blocking(&mut self, _blocking: bool) {}

    /// Issue the staged request as a POST (`post == true`) or a GET.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be issued at all. In that case
    /// no sink callback is made.
    fn request(&mut self, post: bool, sink: TransportSink) -> Result<(), TransportError>;

    /// Whether `cancel` can abort a request in flight.
    fn supports_cancel(&self) -> bool {
        false
    }

    /// Abort the request in flight. Must be harmless when nothing is in flight.
    fn cancel(&mut self) {}
}

impl std::fmt::Debug for dyn Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("supports_cancel", &self.supports_cancel())
            .finish()
    }
}
