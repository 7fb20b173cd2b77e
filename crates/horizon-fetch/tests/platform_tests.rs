//! Integration tests for platform-dependent dispatch.

mod common;

use std::io::Write;

use common::{FakeFileSystem, FakeTransport, record, terminal_count};
use horizon_fetch::{
    FailureKind, HttpLoader, LoadState, LoaderEvent, MemoryAssets, Platform, TransportError,
};

fn native_loader(url: &str, fs: FakeFileSystem, transport: &FakeTransport) -> HttpLoader<String> {
    HttpLoader::builder()
        .url(url)
        .transport(transport.clone())
        .platform(Platform::with_filesystem(fs))
        .build()
        .unwrap()
}

#[test]
fn test_native_missing_file_end_to_end() {
    let transport = FakeTransport::new();
    let mut loader = native_loader("local/missing.txt", FakeFileSystem::default(), &transport);
    let events = record(&loader);

    loader.load().unwrap();
    loader.process_events();

    let events = events.lock();
    assert_eq!(terminal_count(&events), 1);
    match events.last() {
        Some(LoaderEvent::Fail(err)) => {
            assert_eq!(err.kind(), FailureKind::Io);
            assert!(err.message().contains("local/missing.txt"));
        }
        other => panic!("expected a failure, got {other:?}"),
    }
    assert!(!events.iter().any(|e| matches!(e, LoaderEvent::Complete(_))));
    assert_eq!(loader.content(), None);
    assert!(transport.issued().is_empty());
}

#[test]
fn test_native_existing_file_is_loaded() {
    let transport = FakeTransport::new();
    let fs = FakeFileSystem::with_file("data/config.ini", "[main]\nkey = value\n");
    let mut loader = native_loader("data/config.ini", fs, &transport);
    let events = record(&loader);

    loader.load().unwrap();
    // The outcome waits for the host to pump the queue.
    assert_eq!(*events.lock(), vec![LoaderEvent::Start]);
    loader.process_events();

    assert_eq!(loader.content().as_deref(), Some("[main]\nkey = value\n"));
    assert_eq!(loader.state(), LoadState::Completed);
    assert_eq!(terminal_count(&events.lock()), 1);
    assert!(transport.issued().is_empty());
}

#[test]
fn test_native_reads_real_files() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "exact\r\ncontents\t ").unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let mut loader: HttpLoader<String> = HttpLoader::builder()
        .url(path.clone())
        .transport(FakeTransport::new())
        .platform(Platform::native())
        .build()
        .unwrap();

    loader.load().unwrap();
    loader.process_events();
    assert_eq!(loader.content().as_deref(), Some("exact\r\ncontents\t "));

    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("gone.txt");
    loader.set_url(missing.to_str().unwrap());
    loader.load().unwrap();
    loader.process_events();

    assert_eq!(loader.state(), LoadState::Failed);
    // The last good content survives a failed cycle.
    assert_eq!(loader.content().as_deref(), Some("exact\r\ncontents\t "));
}

#[test]
fn test_native_http_url_uses_blocking_transport() {
    let transport = FakeTransport::new();
    let mut loader = native_loader("http://example.com/a", FakeFileSystem::default(), &transport);

    loader.load().unwrap();

    let issued = transport.last();
    assert!(issued.blocking);
    assert!(!issued.post);
    issued.sink.data("remote");
    loader.process_events();
    assert_eq!(loader.content().as_deref(), Some("remote"));

    // Blocking is scoped to the native GET.
    loader.send("x").unwrap();
    assert!(!transport.last().blocking);
}

#[test]
fn test_native_http_refusal_is_security_failure() {
    let transport = FakeTransport::new();
    transport.refuse_with(TransportError::InvalidUrl("bad host".into()));
    let mut loader = native_loader("HTTP://bad host/", FakeFileSystem::default(), &transport);
    let events = record(&loader);

    loader.load().unwrap();
    loader.process_events();

    assert!(matches!(
        events.lock().last(),
        Some(LoaderEvent::Fail(err)) if err.kind() == FailureKind::Security
    ));
}

#[test]
fn test_packaged_asset_is_read_under_prefix() {
    let assets = MemoryAssets::new();
    assets.insert("assets/levels/one.json", r#"{"tiles":[1,2]}"#);
    let transport = FakeTransport::new();

    let mut loader: HttpLoader<serde_json::Value> = HttpLoader::builder()
        .url("levels/one.json")
        .transport(transport.clone())
        .platform(Platform::packaged(assets))
        .build()
        .unwrap();
    let events = record(&loader);

    loader.load().unwrap();
    assert!(loader.is_loading());
    loader.process_events();

    assert_eq!(loader.content(), Some(serde_json::json!({"tiles": [1, 2]})));
    assert_eq!(terminal_count(&events.lock()), 1);
    assert!(transport.issued().is_empty());
}

#[test]
fn test_packaged_custom_prefix_and_missing_asset() {
    let assets = MemoryAssets::new();
    assets.insert("bundle/a.txt", "A");

    let mut loader: HttpLoader<String> = HttpLoader::builder()
        .url("a.txt")
        .transport(FakeTransport::new())
        .platform(Platform::packaged_with_prefix(assets, "bundle/"))
        .build()
        .unwrap();
    let events = record(&loader);

    loader.load().unwrap();
    loader.process_events();
    assert_eq!(loader.content().as_deref(), Some("A"));

    loader.set_url("b.txt");
    loader.load().unwrap();
    loader.process_events();

    match events.lock().last() {
        Some(LoaderEvent::Fail(err)) => {
            assert_eq!(err.kind(), FailureKind::Io);
            assert!(err.message().contains("bundle/b.txt"));
        }
        other => panic!("expected a failure, got {other:?}"),
    }
}

#[test]
fn test_packaged_asset_read_is_dropped_when_cancelled() {
    let assets = MemoryAssets::new();
    assets.insert("assets/a.txt", "A");

    let mut loader: HttpLoader<String> = HttpLoader::builder()
        .url("a.txt")
        .transport(FakeTransport::new())
        .platform(Platform::packaged(assets))
        .build()
        .unwrap();
    let events = record(&loader);

    loader.load().unwrap();
    loader.cancel();
    loader.process_events();

    assert_eq!(loader.content(), None);
    assert_eq!(*events.lock(), vec![LoaderEvent::Start]);
}

#[test]
fn test_packaged_network_url_goes_to_transport() {
    let transport = FakeTransport::new();
    let mut loader: HttpLoader<String> = HttpLoader::builder()
        .url("https://cdn.example.com/a.txt")
        .transport(transport.clone())
        .platform(Platform::packaged(MemoryAssets::new()))
        .build()
        .unwrap();

    loader.load().unwrap();

    let issued = transport.last();
    assert!(!issued.blocking);
    assert_eq!(issued.url.as_deref(), Some("https://cdn.example.com/a.txt"));
}

#[test]
fn test_browser_sends_everything_to_transport() {
    let transport = FakeTransport::new();
    let mut loader: HttpLoader<String> =
        HttpLoader::with_transport(Some("relative/path.txt".into()), transport.clone());
    assert_eq!(loader.platform().name(), "browser");

    loader.load().unwrap();

    assert_eq!(transport.last().url.as_deref(), Some("relative/path.txt"));
}
