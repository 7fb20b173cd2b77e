//! Load a URL or local file and print the result.
//!
//! ```text
//! cargo run -p horizon-fetch --example fetch -- https://example.com/
//! cargo run -p horizon-fetch --example fetch -- Cargo.toml
//! RUST_LOG=horizon_fetch=trace cargo run -p horizon-fetch --example fetch -- Cargo.toml
//! ```

use std::time::Duration;

use horizon_fetch::{HttpLoader, LoaderEvent, Platform};
use tracing_subscriber::EnvFilter;

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://example.com/".to_string());

    let mut loader: HttpLoader<String> = HttpLoader::builder()
        .url(url)
        .platform(Platform::native())
        .header("Accept", "text/plain, text/html;q=0.9, */*;q=0.1")
        .build()
        .expect("Failed to create loader");

    loader.events().connect(|event| match event {
        LoaderEvent::Start => println!("started"),
        LoaderEvent::Progress(progress) => match progress.percent() {
            Some(percent) => println!("{percent}%"),
            None => println!("{} bytes", progress.bytes_transferred),
        },
        LoaderEvent::Complete(text) => println!("{text}"),
        LoaderEvent::Fail(err) => eprintln!("failed ({:?}): {}", err.kind(), err.message()),
    });

    loader.load().expect("URL is set");
    while loader.is_loading() {
        loader.process_events();
        std::thread::sleep(Duration::from_millis(10));
    }

    if let Some(status) = loader.status_code() {
        println!("status: {status}");
    }
}
