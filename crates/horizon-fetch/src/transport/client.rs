//! Network transport built on reqwest.

use std::sync::mpsc;
use std::time::Duration;

use http::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use tokio::sync::oneshot;

use super::{TransferProgress, Transport, TransportSink};
use crate::error::TransportError;
use crate::runtime;

/// Configuration for the reqwest transport.
#[derive(Clone, Debug)]
pub struct ReqwestTransportConfig {
    /// Request timeout.
    pub timeout: Option<Duration>,
    /// Connect timeout.
    pub connect_timeout: Option<Duration>,
    /// User agent sent with every request.
    pub user_agent: Option<String>,
}

impl Default for ReqwestTransportConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            connect_timeout: Some(Duration::from_secs(10)),
            user_agent: Some(format!("HorizonFetch/{} (Rust)", env!("CARGO_PKG_VERSION"))),
        }
    }
}

/// Builder for a [`ReqwestTransport`] with custom configuration.
#[derive(Debug, Default)]
pub struct ReqwestTransportBuilder {
    config: ReqwestTransportConfig,
}

impl ReqwestTransportBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Disable request timeout.
    pub fn no_timeout(mut self) -> Self {
        self.config.timeout = None;
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    /// Build the transport.
    pub fn build(self) -> Result<ReqwestTransport, TransportError> {
        let mut builder = reqwest::Client::builder().redirect(Policy::none());

        if let Some(timeout) = self.config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = self.config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        if let Some(ref ua) = self.config.user_agent {
            builder = builder.user_agent(ua);
        }

        Ok(ReqwestTransport {
            client: builder.build()?,
            config: self.config,
            url: None,
            headers: Vec::new(),
            post_data: None,
            blocking: false,
            in_flight: None,
        })
    }
}

/// [`Transport`] that performs real HTTP requests on the global runtime.
///
/// Requests run on [`runtime::get`]; callbacks are made from a runtime worker
/// thread. Issuing a new request aborts the previous one, as does dropping
/// the transport.
pub struct ReqwestTransport {
    client: reqwest::Client,
    config: ReqwestTransportConfig,
    url: Option<String>,
    headers: Vec<(String, String)>,
    post_data: Option<String>,
    blocking: bool,
    in_flight: Option<oneshot::Sender<()>>,
}

impl ReqwestTransport {
    /// Create a transport with default configuration.
    ///
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialized.
    pub fn new() -> Self {
        ReqwestTransportBuilder::new()
            .build()
            .expect("Failed to create HTTP transport with default configuration")
    }

    /// Create a builder for configuring a new transport.
    pub fn builder() -> ReqwestTransportBuilder {
        ReqwestTransportBuilder::new()
    }

    /// Get the transport's configuration.
    pub fn config(&self) -> &ReqwestTransportConfig {
        &self.config
    }

    fn build_request(&mut self, post: bool) -> Result<reqwest::RequestBuilder, TransportError> {
        let url = self.url.take().ok_or(TransportError::MissingUrl)?;
        let staged_headers = std::mem::take(&mut self.headers);
        let body = self.post_data.take();

        let url = url::Url::parse(&url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(TransportError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }

        let mut headers = HeaderMap::new();
        for (name, value) in &staged_headers {
            headers.insert(
                HeaderName::from_bytes(name.as_bytes())?,
                HeaderValue::from_str(value)?,
            );
        }

        let method = if post {
            reqwest::Method::POST
        } else {
            reqwest::Method::GET
        };
        let mut builder = self.client.request(method, url).headers(headers);
        if post {
            if let Some(body) = body {
                builder = builder.body(body);
            }
        }
        Ok(builder)
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for ReqwestTransport {
    fn set_url(&mut self, url: &str) {
        self.url = Some(url.to_string());
    }

    fn set_header(&mut self, name: &str, value: &str) {
        match self.headers.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    fn set_post_data(&mut self, data: Option<String>) {
        self.post_data = data;
    }

    fn set_blocking(&mut self, blocking: bool) {
        self.blocking = blocking;
    }

    fn request(&mut self, post: bool, sink: TransportSink) -> Result<(), TransportError> {
        let request = match self.build_request(post) {
            Ok(request) => request,
            Err(err) => {
                tracing::warn!(target: "horizon_fetch::transport", "request refused: {err}");
                return Err(err);
            }
        };

        let (cancel_tx, cancel_rx) = oneshot::channel();
        // Replacing the sender drops the previous one, which aborts its request.
        self.in_flight = Some(cancel_tx);

        let (done_tx, done_rx) = mpsc::channel();
        runtime::spawn(async move {
            tokio::select! {
                _ = perform(request, &sink) => {}
                _ = cancel_rx => {
                    tracing::trace!(target: "horizon_fetch::transport", "request aborted");
                }
            }
            let _ = done_tx.send(());
        });

        if self.blocking {
            let _ = done_rx.recv();
        }
        Ok(())
    }

    fn supports_cancel(&self) -> bool {
        true
    }

    fn cancel(&mut self) {
        if let Some(tx) = self.in_flight.take() {
            let _ = tx.send(());
        }
    }
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("config", &self.config)
            .field("blocking", &self.blocking)
            .field("in_flight", &self.in_flight.is_some())
            .finish()
    }
}

/// Run one request to completion, reporting through `sink`.
async fn perform(request: reqwest::RequestBuilder, sink: &TransportSink) {
    let mut response = match request.send().await {
        Ok(response) => response,
        Err(err) => {
            sink.error(err.to_string());
            return;
        }
    };

    let status = response.status();
    sink.status(status.as_u16());
    if status.is_client_error() || status.is_server_error() {
        sink.error(format!("HTTP error {}", status.as_u16()));
        return;
    }

    let total_bytes = response.content_length();
    let mut body = Vec::new();
    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                body.extend_from_slice(&chunk);
                sink.progress(TransferProgress {
                    bytes_transferred: body.len() as u64,
                    total_bytes,
                });
            }
            Ok(None) => break,
            Err(err) => {
                sink.error(err.to_string());
                return;
            }
        }
    }

    match String::from_utf8(body) {
        Ok(text) => sink.data(text),
        Err(err) => sink.error(format!("Response body is not valid UTF-8: {err}")),
    }
}
