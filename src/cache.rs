//! Content cache shared between build steps.
//!
//! Raw tiles and compiled templates live in one keyed store under separate
//! namespaces: `tiles/<source-name>` for fetched raw content and
//! `templates/<name>.xml` for merged artifacts. The builder writes each key
//! at most once per build; descendants read their ancestors' entries.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

/// Key prefix for raw tile content.
pub const TILE_PREFIX: &str = "tiles/";

/// Key prefix for compiled template artifacts.
pub const TEMPLATE_PREFIX: &str = "templates/";

/// Shared handle to cached content bytes.
pub type ContentHandle = Arc<Vec<u8>>;

/// Cache key of a raw tile.
pub fn tile_key(source_name: &str) -> String {
    format!("{TILE_PREFIX}{source_name}")
}

/// Cache key of a compiled template.
pub fn template_key(name: &str) -> String {
    format!("{TEMPLATE_PREFIX}{name}.xml")
}

/// Keyed blob store for raw tiles and compiled templates.
pub trait ContentCache: Send + Sync {
    fn contains(&self, key: &str) -> bool;

    /// Read the content under `key`, `None` when absent.
    fn read(&self, key: &str) -> Option<ContentHandle>;

    /// Store `content` under `key`, replacing any previous entry.
    fn write(&self, key: &str, content: Vec<u8>);
}

/// In-memory reference cache.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, ContentHandle>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all entries, e.g. between rebuilds.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl ContentCache for MemoryCache {
    fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    fn read(&self, key: &str) -> Option<ContentHandle> {
        self.entries.read().get(key).cloned()
    }

    fn write(&self, key: &str, content: Vec<u8>) {
        self.entries.write().insert(key.to_string(), Arc::new(content));
    }
}
