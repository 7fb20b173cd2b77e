//! The `HttpLoader` surface.

use std::collections::HashMap;
use std::marker::PhantomData;

use horizon_fetch_core::TaskQueue;

use super::backend::{ConfigureHook, HttpBackend};
use crate::content::Content;
use crate::error::{TransportError, UsageError};
use crate::loader::Loader;
use crate::payload::Payload;
use crate::platform::Platform;
use crate::transport::{ReqwestTransport, Transport};

/// A loader for HTTP resources, local files and bundled assets.
pub type HttpLoader<T> = Loader<T, HttpBackend>;

impl<T: Content> Loader<T, HttpBackend> {
    /// Create a loader with an optional URL and an optional transport.
    ///
    /// Without a transport, a [`ReqwestTransport`] with default configuration
    /// is used. The platform is [`Platform::Browser`]; use
    /// [`HttpLoader::builder`] to choose another.
    ///
    /// # Panics
    ///
    /// Panics if no transport is given and the default one cannot be created.
    pub fn new(url: Option<String>, transport: Option<Box<dyn Transport>>) -> Self {
        let transport = transport.unwrap_or_else(|| Box::new(ReqwestTransport::new()));
        Self::with_backend(url, HttpBackend::new(transport, Platform::default()))
    }

    /// Create a loader for `url` over the default transport.
    ///
    /// # Panics
    ///
    /// Panics if the default transport cannot be created.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self::new(Some(url.into()), None)
    }

    /// Create a loader over an injected transport.
    pub fn with_transport(url: Option<String>, transport: impl Transport + 'static) -> Self {
        Self::new(url, Some(Box::new(transport)))
    }

    /// Create a builder for configuring a new loader.
    pub fn builder() -> HttpLoaderBuilder<T> {
        HttpLoaderBuilder::new()
    }

    /// POST `payload` to the configured URL.
    ///
    /// A cycle already in flight is cancelled first. The `Content-Type`
    /// header is inferred from the payload's shape unless the caller set it.
    /// Emits `Start` before returning.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::MissingUrl`] without side effects if no URL is set.
    pub fn send(&mut self, payload: impl Into<Payload>) -> Result<(), UsageError> {
        let url = self.url().ok_or(UsageError::MissingUrl)?.to_string();
        let payload = payload.into();
        let cycle = self.begin();
        tracing::debug!(
            target: "horizon_fetch::loader",
            generation = cycle.generation(),
            %url,
            content_type = payload.content_type(),
            "send started"
        );
        self.backend.post(&url, payload, cycle);
        Ok(())
    }

    /// Headers copied onto the transport for every request.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.backend.headers
    }

    /// Mutable access to the header table.
    ///
    /// A `Content-Type` whose value differs from the last inferred one is
    /// treated as set by the caller on the next `send`.
    pub fn headers_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.backend.headers
    }

    /// Set a header, replacing the value for the same name.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.backend.forget_inferred(&name);
        self.backend.headers.insert(name, value.into());
    }

    /// The value of header `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.backend.headers.get(name).map(String::as_str)
    }

    /// Remove header `name`, returning its value.
    pub fn remove_header(&mut self, name: &str) -> Option<String> {
        self.backend.forget_inferred(name);
        self.backend.headers.remove(name)
    }

    /// Last HTTP status code observed. Persists across cycles.
    pub fn status_code(&self) -> Option<u16> {
        self.backend.status_code()
    }

    /// Install a hook run on the transport before headers are applied, for
    /// every `load` and `send`.
    pub fn set_configure<F>(&mut self, hook: F)
    where
        F: FnMut(&mut dyn Transport) + Send + 'static,
    {
        self.backend.set_configure(Some(Box::new(hook)));
    }

    /// Remove the configure hook.
    pub fn clear_configure(&mut self) {
        self.backend.set_configure(None);
    }

    /// The platform strategy.
    pub fn platform(&self) -> &Platform {
        self.backend.platform()
    }
}

/// Builder for an [`HttpLoader`].
///
/// ```
/// use horizon_fetch::{HttpLoader, MemoryAssets, Platform};
///
/// let assets = MemoryAssets::new();
/// assets.insert("assets/config.json", r#"{"debug":false}"#);
///
/// let loader: HttpLoader<serde_json::Value> = HttpLoader::builder()
///     .url("config.json")
///     .platform(Platform::packaged(assets))
///     .header("Accept", "application/json")
///     .build()
///     .unwrap();
/// assert_eq!(loader.platform().name(), "packaged");
/// ```
pub struct HttpLoaderBuilder<T> {
    url: Option<String>,
    transport: Option<Box<dyn Transport>>,
    platform: Platform,
    tasks: Option<TaskQueue>,
    configure: Option<ConfigureHook>,
    headers: HashMap<String, String>,
    _content: PhantomData<fn() -> T>,
}

impl<T: Content> Default for HttpLoaderBuilder<T> {
    fn default() -> Self {
        Self {
            url: None,
            transport: None,
            platform: Platform::default(),
            tasks: None,
            configure: None,
            headers: HashMap::new(),
            _content: PhantomData,
        }
    }
}

impl<T: Content> HttpLoaderBuilder<T> {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Use `transport` instead of the default reqwest transport.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Choose the platform strategy.
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Resume callbacks on a shared task queue.
    pub fn task_queue(mut self, tasks: TaskQueue) -> Self {
        self.tasks = Some(tasks);
        self
    }

    /// Install a configure hook.
    pub fn configure<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&mut dyn Transport) + Send + 'static,
    {
        self.configure = Some(Box::new(hook));
        self
    }

    /// Add an initial header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Build the loader.
    ///
    /// # Errors
    ///
    /// Returns an error if no transport was given and the default transport
    /// cannot be created.
    pub fn build(self) -> Result<HttpLoader<T>, TransportError> {
        let transport: Box<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Box::new(ReqwestTransport::builder().build()?),
        };

        let mut backend = HttpBackend::new(transport, self.platform);
        backend.headers = self.headers;
        backend.set_configure(self.configure);

        Ok(Loader::with_task_queue(
            self.url,
            backend,
            self.tasks.unwrap_or_default(),
        ))
    }
}

impl<T> std::fmt::Debug for HttpLoaderBuilder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpLoaderBuilder")
            .field("url", &self.url)
            .field("transport", &self.transport.is_some())
            .field("platform", &self.platform)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}
