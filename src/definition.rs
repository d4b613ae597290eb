//! Template definitions and the TOML definition file.
//!
//! A definition declares a template's name, tier flags, parent, source tile
//! and inclusion map, prior to compilation. Definitions are immutable once
//! parsed.
//!
//! # Definition file
//!
//! ```toml
//! [sources]
//! site = "tiles"              # origin name -> directory
//!
//! [[templates]]
//! name = "base"
//! abstract = true
//! source = "site:base.xml"
//!
//! [templates.inclusions]
//! header = "blank"
//!
//! [[templates]]
//! name = "home"
//! extends = "base"
//!
//! [templates.inclusions]
//! header = "home-header"
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;

/// Source-level declaration of a single template.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateDefinition {
    /// Unique template name.
    pub name: String,

    /// Renderable but not exposed as a top-level build result.
    #[serde(default)]
    pub internal: bool,

    /// Inheritable only, never merged or rendered.
    #[serde(default, rename = "abstract")]
    pub abstract_tier: bool,

    /// Name of the parent template whose source and inclusions are inherited.
    #[serde(default)]
    pub extends: Option<String>,

    /// Raw content locator, `"<origin>:<tile-name>"`.
    #[serde(default)]
    pub source: Option<String>,

    /// Inclusion-slot name -> referenced template name.
    #[serde(default)]
    pub inclusions: HashMap<String, String>,
}

impl TemplateDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            internal: false,
            abstract_tier: false,
            extends: None,
            source: None,
            inclusions: HashMap::new(),
        }
    }

    pub fn with_source(mut self, locator: impl Into<String>) -> Self {
        self.source = Some(locator.into());
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.extends = Some(parent.into());
        self
    }

    pub fn with_inclusion(mut self, slot: impl Into<String>, template: impl Into<String>) -> Self {
        self.inclusions.insert(slot.into(), template.into());
        self
    }

    pub fn internal(mut self) -> Self {
        self.internal = true;
        self
    }

    pub fn abstract_tier(mut self) -> Self {
        self.abstract_tier = true;
        self
    }

    /// A pure marker/grouping definition: no own content and no parent.
    pub fn is_empty(&self) -> bool {
        self.source.is_none() && self.extends.is_none()
    }
}

/// Parsed definition file: tile-source directories plus template definitions.
#[derive(Debug, Default, Deserialize)]
pub struct DefinitionFile {
    /// Origin name -> tile directory, resolved relative to the file.
    #[serde(default)]
    pub sources: HashMap<String, PathBuf>,

    #[serde(default)]
    pub templates: Vec<TemplateDefinition>,
}

impl DefinitionFile {
    /// Read and parse a definition file, resolving source directories
    /// relative to the file's own location.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut file: Self = toml::from_str(&content)?;

        if let Some(base) = path.parent() {
            for dir in file.sources.values_mut() {
                if dir.is_relative() {
                    *dir = base.join(&*dir);
                }
            }
        }

        Ok(file)
    }
}
