//! The HTTP loader backend: request configuration and platform dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use horizon_fetch_core::logging::span_names;
use parking_lot::Mutex;

use crate::content::Content;
use crate::error::LoaderError;
use crate::loader::{LoadCycle, LoaderBackend};
use crate::payload::Payload;
use crate::platform::{AssetSource, FileSystem, Platform, is_network_url};
use crate::transport::{ResponseHandler, TransferProgress, Transport, TransportSink};

/// Name of the header negotiated by `send`.
pub const CONTENT_TYPE: &str = "Content-Type";

/// Hook run on the transport before headers are applied.
pub type ConfigureHook = Box<dyn FnMut(&mut dyn Transport) + Send>;

/// Routes transport callbacks into a load cycle.
struct CycleHandler<T> {
    cycle: LoadCycle<T>,
    status: Arc<Mutex<Option<u16>>>,
}

impl<T: Content> ResponseHandler for CycleHandler<T> {
    fn on_data(&self, content: String) {
        self.cycle.deliver(content);
    }

    fn on_error(&self, message: String) {
        self.cycle.fail(LoaderError::io(message));
    }

    fn on_status(&self, code: u16) {
        let status = self.status.clone();
        self.cycle.defer(move || *status.lock() = Some(code));
    }

    fn on_progress(&self, progress: TransferProgress) {
        self.cycle.progress(progress);
    }
}

/// [`LoaderBackend`] that loads over HTTP, from local files or from bundled
/// assets depending on the URL and the [`Platform`].
pub struct HttpBackend {
    transport: Box<dyn Transport>,
    pub(crate) headers: HashMap<String, String>,
    status: Arc<Mutex<Option<u16>>>,
    platform: Platform,
    configure: Option<ConfigureHook>,
    /// Content-Type value last written by negotiation, not by the caller.
    inferred_content_type: Option<String>,
}

impl HttpBackend {
    /// Create a backend over `transport`.
    pub fn new(transport: Box<dyn Transport>, platform: Platform) -> Self {
        Self {
            transport,
            headers: HashMap::new(),
            status: Arc::new(Mutex::new(None)),
            platform,
            configure: None,
            inferred_content_type: None,
        }
    }

    /// The transport.
    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// The platform strategy chosen at construction.
    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Last HTTP status code observed, across cycles.
    pub fn status_code(&self) -> Option<u16> {
        *self.status.lock()
    }

    pub(crate) fn set_configure(&mut self, hook: Option<ConfigureHook>) {
        self.configure = hook;
    }

    /// Record that the caller took ownership of the Content-Type header.
    pub(crate) fn forget_inferred(&mut self, name: &str) {
        if name.eq_ignore_ascii_case(CONTENT_TYPE) {
            self.inferred_content_type = None;
        }
    }

    /// Write `inferred` as the Content-Type unless the caller set one.
    pub(crate) fn negotiate_content_type(&mut self, inferred: &str) {
        let existing = self
            .headers
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(CONTENT_TYPE));

        match existing {
            None => {
                self.headers
                    .insert(CONTENT_TYPE.to_string(), inferred.to_string());
            }
            Some((_, value)) if self.inferred_content_type.as_deref() == Some(value.as_str()) => {
                *value = inferred.to_string();
            }
            Some(_) => {
                tracing::trace!(target: "horizon_fetch::http", "keeping caller Content-Type");
                return;
            }
        }
        self.inferred_content_type = Some(inferred.to_string());
    }

    /// Stage the URL, run the configure hook, then copy every header.
    fn prepare(&mut self, url: &str) {
        self.transport.set_url(url);
        if let Some(configure) = self.configure.as_mut() {
            configure(self.transport.as_mut());
        }
        for (name, value) in &self.headers {
            self.transport.set_header(name, value);
        }
    }

    fn sink<T: Content>(&self, cycle: &LoadCycle<T>) -> TransportSink {
        TransportSink::new(CycleHandler {
            cycle: cycle.clone(),
            status: self.status.clone(),
        })
    }

    /// Issue the staged request; a synchronous refusal fails the cycle.
    fn issue<T: Content>(&mut self, post: bool, cycle: LoadCycle<T>) {
        let sink = self.sink(&cycle);
        if let Err(err) = self.transport.request(post, sink) {
            tracing::warn!(target: "horizon_fetch::http", generation = cycle.generation(), "transport refused request: {err}");
            cycle.fail(err.into());
        }
    }

    fn get<T: Content>(&mut self, url: &str, cycle: LoadCycle<T>) {
        self.prepare(url);
        self.transport.set_post_data(None);
        self.issue(false, cycle);
    }

    /// POST `payload` to `url`.
    pub(crate) fn post<T: Content>(&mut self, url: &str, payload: Payload, cycle: LoadCycle<T>) {
        let _span = tracing::debug_span!(span_names::LOAD_CYCLE, generation = cycle.generation(), method = "POST").entered();
        self.negotiate_content_type(payload.content_type());
        self.prepare(url);
        self.transport.set_post_data(Some(payload.into_body()));
        self.issue(true, cycle);
    }
}

impl<T: Content> LoaderBackend<T> for HttpBackend {
    fn load(&mut self, url: &str, cycle: LoadCycle<T>) {
        let _span = tracing::debug_span!(span_names::LOAD_CYCLE, generation = cycle.generation(), method = "GET").entered();
        let network = is_network_url(url);
        tracing::trace!(target: "horizon_fetch::http", platform = self.platform.name(), network, "dispatching load");

        match &self.platform {
            Platform::Packaged { assets, prefix } if !network => {
                read_asset(assets.clone(), format!("{prefix}{url}"), cycle);
            }
            Platform::Native { fs } if !network => read_file(fs.as_ref(), url, cycle),
            Platform::Native { .. } => {
                self.transport.set_blocking(true);
                self.get(url, cycle);
                self.transport.set_blocking(false);
            }
            _ => self.get(url, cycle),
        }
    }

    fn cancel(&mut self) {
        if self.transport.supports_cancel() {
            tracing::trace!(target: "horizon_fetch::http", "cancelling transport");
            self.transport.cancel();
        }
    }
}

/// Read a bundled asset on the loader's execution context.
fn read_asset<T: Content>(assets: Arc<dyn AssetSource>, path: String, cycle: LoadCycle<T>) {
    let deferred = cycle.clone();
    cycle.defer(move || match assets.get_text(&path) {
        Some(text) => deferred.deliver(text),
        None => {
            tracing::warn!(target: "horizon_fetch::platform", %path, "asset not found");
            deferred.fail(LoaderError::io(format!("Asset not found: {path}")));
        }
    });
}

fn read_file<T: Content>(fs: &dyn FileSystem, path: &str, cycle: LoadCycle<T>) {
    if !fs.exists(path) {
        tracing::debug!(target: "horizon_fetch::platform", %path, "file not found");
        cycle.fail(LoaderError::io(format!("File not found: {path}")));
        return;
    }
    match fs.read_all_text(path) {
        Ok(text) => cycle.deliver(text),
        Err(err) => cycle.fail(LoaderError::io(format!("{path}: {err}"))),
    }
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("transport", &self.transport)
            .field("headers", &self.headers)
            .field("status_code", &self.status_code())
            .field("platform", &self.platform)
            .field("configure", &self.configure.is_some())
            .finish()
    }
}
