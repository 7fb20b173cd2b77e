//! Fakes shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::sync::Arc;

use horizon_fetch::{
    Content, FileSystem, Loader, LoaderBackend, LoaderEvent, TransportError, TransportSink,
    Transport,
};
use parking_lot::Mutex;

/// One request issued through a [`FakeTransport`].
#[derive(Clone, Debug)]
pub struct Issued {
    pub post: bool,
    pub url: Option<String>,
    pub headers: HashMap<String, String>,
    /// Header writes in the order the loader made them.
    pub header_writes: Vec<(String, String)>,
    pub body: Option<String>,
    pub blocking: bool,
    pub sink: TransportSink,
}

#[derive(Default)]
struct State {
    url: Option<String>,
    header_writes: Vec<(String, String)>,
    body: Option<String>,
    blocking: bool,
    issued: Vec<Issued>,
    cancels: usize,
    refusal: Option<TransportError>,
    cancellable: bool,
}

/// In-memory transport. Clones share state, so a test keeps one clone as a
/// probe after moving the other into a loader.
#[derive(Clone, Default)]
pub struct FakeTransport {
    state: Arc<Mutex<State>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport that supports mid-flight cancellation.
    pub fn cancellable() -> Self {
        let transport = Self::new();
        transport.state.lock().cancellable = true;
        transport
    }

    /// Make every following `request` fail synchronously with `err`.
    pub fn refuse_with(&self, err: TransportError) {
        self.state.lock().refusal = Some(err);
    }

    pub fn issued(&self) -> Vec<Issued> {
        self.state.lock().issued.clone()
    }

    pub fn last(&self) -> Issued {
        self.state
            .lock()
            .issued
            .last()
            .cloned()
            .expect("no request was issued")
    }

    pub fn cancels(&self) -> usize {
        self.state.lock().cancels
    }
}

impl Transport for FakeTransport {
    fn set_url(&mut self, url: &str) {
        self.state.lock().url = Some(url.to_string());
    }

    fn set_header(&mut self, name: &str, value: &str) {
        self.state
            .lock()
            .header_writes
            .push((name.to_string(), value.to_string()));
    }

    fn set_post_data(&mut self, data: Option<String>) {
        self.state.lock().body = data;
    }

    fn set_blocking(&mut self, blocking: bool) {
        self.state.lock().blocking = blocking;
    }

    fn request(&mut self, post: bool, sink: TransportSink) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        let header_writes = std::mem::take(&mut state.header_writes);
        let url = state.url.take();
        let body = state.body.take();
        if let Some(err) = state.refusal.clone() {
            return Err(err);
        }

        let headers = header_writes.iter().cloned().collect();
        let blocking = state.blocking;
        state.issued.push(Issued {
            post,
            url,
            headers,
            header_writes,
            body,
            blocking,
            sink,
        });
        Ok(())
    }

    fn supports_cancel(&self) -> bool {
        self.state.lock().cancellable
    }

    fn cancel(&mut self) {
        self.state.lock().cancels += 1;
    }
}

/// In-memory filesystem.
#[derive(Clone, Default)]
pub struct FakeFileSystem {
    files: Arc<Mutex<HashMap<String, String>>>,
}

impl FakeFileSystem {
    pub fn with_file(path: &str, text: &str) -> Self {
        let fs = Self::default();
        fs.files.lock().insert(path.to_string(), text.to_string());
        fs
    }
}

impl FileSystem for FakeFileSystem {
    fn exists(&self, path: &str) -> bool {
        self.files.lock().contains_key(path)
    }

    fn read_all_text(&self, path: &str) -> io::Result<String> {
        self.files
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.to_string()))
    }
}

/// Record every event `loader` emits.
pub fn record<T, B>(loader: &Loader<T, B>) -> Arc<Mutex<Vec<LoaderEvent<T>>>>
where
    T: Content,
    B: LoaderBackend<T>,
{
    let events = Arc::new(Mutex::new(Vec::new()));
    let events_clone = events.clone();
    loader.events().connect(move |event: &LoaderEvent<T>| {
        events_clone.lock().push(event.clone());
    });
    events
}

/// Number of terminal events in `events`.
pub fn terminal_count<T>(events: &[LoaderEvent<T>]) -> usize {
    events.iter().filter(|event| event.is_terminal()).count()
}
