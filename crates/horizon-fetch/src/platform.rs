//! Runtime selection of the non-network load path.
//!
//! The HTTP loader always speaks HTTP for `http:`/`https:` URLs. What happens
//! to every other URL depends on the [`Platform`] chosen at construction:
//!
//! - [`Platform::Browser`] hands everything to the transport.
//! - [`Platform::Native`] reads local files through a [`FileSystem`].
//! - [`Platform::Packaged`] reads bundled text through an [`AssetSource`],
//!   under a path prefix ([`ASSET_PREFIX`] by default).

use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::Arc;

use include_dir::Dir;
use parking_lot::RwLock;

/// Default path prefix for bundled assets.
pub const ASSET_PREFIX: &str = "assets/";

/// Whether `url` must be fetched over the network.
///
/// The scheme check is case-insensitive and covers `http:` and `https:`.
pub fn is_network_url(url: &str) -> bool {
    has_scheme(url, "http:") || has_scheme(url, "https:")
}

fn has_scheme(url: &str, scheme: &str) -> bool {
    url.get(..scheme.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
}

/// Synchronous read access to local files.
pub trait FileSystem: Send + Sync {
    /// Whether `path` names an existing file.
    fn exists(&self, path: &str) -> bool;

    /// Read the whole file at `path` as text.
    fn read_all_text(&self, path: &str) -> io::Result<String>;
}

/// [`FileSystem`] over `std::fs`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn exists(&self, path: &str) -> bool {
        Path::new(path).is_file()
    }

    fn read_all_text(&self, path: &str) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Read access to text bundled with the application.
pub trait AssetSource: Send + Sync {
    /// The text stored at `path`, if any.
    fn get_text(&self, path: &str) -> Option<String>;
}

/// Assets embedded at compile time with `include_dir!`.
///
/// ```ignore
/// use include_dir::{include_dir, Dir};
/// use horizon_fetch::EmbeddedAssets;
///
/// static ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/bundle");
/// let assets = EmbeddedAssets::new(&ASSETS);
/// ```
#[derive(Clone, Copy)]
pub struct EmbeddedAssets {
    dir: &'static Dir<'static>,
}

impl EmbeddedAssets {
    /// Wrap an embedded directory.
    pub const fn new(dir: &'static Dir<'static>) -> Self {
        Self { dir }
    }

    /// Whether a file exists at `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.dir.get_file(path).is_some()
    }
}

impl AssetSource for EmbeddedAssets {
    fn get_text(&self, path: &str) -> Option<String> {
        self.dir
            .get_file(path)
            .and_then(|file| file.contents_utf8())
            .map(str::to_string)
    }
}

impl std::fmt::Debug for EmbeddedAssets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddedAssets")
            .field("path", &self.dir.path())
            .finish()
    }
}

/// Assets registered at runtime.
#[derive(Debug, Default)]
pub struct MemoryAssets {
    files: RwLock<HashMap<String, String>>,
}

impl MemoryAssets {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `text` at `path`, replacing any previous entry.
    pub fn insert(&self, path: impl Into<String>, text: impl Into<String>) {
        self.files.write().insert(path.into(), text.into());
    }

    /// Remove the entry at `path`.
    pub fn remove(&self, path: &str) -> Option<String> {
        self.files.write().remove(path)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }
}

impl AssetSource for MemoryAssets {
    fn get_text(&self, path: &str) -> Option<String> {
        self.files.read().get(path).cloned()
    }
}

/// Where non-network URLs are loaded from.
#[derive(Clone, Default)]
pub enum Platform {
    /// Every URL goes through the transport.
    #[default]
    Browser,
    /// Non-network URLs are local file paths.
    Native {
        /// The filesystem to read from.
        fs: Arc<dyn FileSystem>,
    },
    /// Non-network URLs name bundled assets.
    Packaged {
        /// The asset store to read from.
        assets: Arc<dyn AssetSource>,
        /// Prefix joined in front of the URL to form the asset path.
        prefix: String,
    },
}

impl Platform {
    /// Native platform over the local filesystem.
    pub fn native() -> Self {
        Self::with_filesystem(LocalFileSystem)
    }

    /// Native platform over a custom filesystem.
    pub fn with_filesystem(fs: impl FileSystem + 'static) -> Self {
        Self::Native { fs: Arc::new(fs) }
    }

    /// Packaged platform reading under [`ASSET_PREFIX`].
    pub fn packaged(assets: impl AssetSource + 'static) -> Self {
        Self::packaged_with_prefix(assets, ASSET_PREFIX)
    }

    /// Packaged platform with a custom asset prefix.
    pub fn packaged_with_prefix(
        assets: impl AssetSource + 'static,
        prefix: impl Into<String>,
    ) -> Self {
        Self::Packaged {
            assets: Arc::new(assets),
            prefix: prefix.into(),
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::Native { .. } => "native",
            Self::Packaged { .. } => "packaged",
        }
    }
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Packaged { prefix, .. } => f
                .debug_struct("Packaged")
                .field("prefix", prefix)
                .finish_non_exhaustive(),
            other => f.write_str(other.name()),
        }
    }
}
