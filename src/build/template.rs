//! Compiled template artifacts.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::cache::{ContentCache, ContentHandle, template_key, tile_key};

/// Visibility tier of a built template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Renderable and exposed as a top-level build result.
    Concrete,
    /// Inheritable only; its compiled-content step is skipped.
    Abstract,
    /// Renderable but not exposed as a top-level build result.
    Internal,
}

/// A built template: resolved metadata plus a handle to its compiled
/// content in the shared cache.
///
/// Built exactly once per name, in dependency order; immutable afterwards
/// and reusable by descendants within the same build.
#[derive(Clone)]
pub struct Template {
    name: String,
    tier: Tier,
    source_name: Option<String>,
    inclusions: HashMap<String, String>,
    cache: Arc<dyn ContentCache>,
}

impl Template {
    pub(crate) fn new(
        name: String,
        tier: Tier,
        source_name: Option<String>,
        inclusions: HashMap<String, String>,
        cache: Arc<dyn ContentCache>,
    ) -> Self {
        Self {
            name,
            tier,
            source_name,
            inclusions,
            cache,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Resolved raw-source identity, own or inherited. `None` for pure
    /// marker templates.
    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    /// Resolved inclusion map: parent entries overridden by own entries.
    pub fn inclusions(&self) -> &HashMap<String, String> {
        &self.inclusions
    }

    /// Compiled document content. `None` when the template has no source,
    /// or when its tier skipped the merge step.
    pub fn content(&self) -> Option<ContentHandle> {
        self.source_name.as_ref()?;
        self.cache.read(&template_key(&self.name))
    }

    /// Whether the raw source behind this template is already cached.
    /// Templates without a source have nothing to fetch.
    pub(crate) fn has_raw_source(&self) -> bool {
        match &self.source_name {
            None => true,
            Some(source) => self.cache.contains(&tile_key(source)),
        }
    }

    pub(crate) fn raw_source(&self) -> Option<ContentHandle> {
        let source = self.source_name.as_ref()?;
        self.cache.read(&tile_key(source))
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("name", &self.name)
            .field("tier", &self.tier)
            .field("source_name", &self.source_name)
            .field("inclusions", &self.inclusions)
            .finish_non_exhaustive()
    }
}
