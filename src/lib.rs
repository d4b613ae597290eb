//! Weft - tile-based template assembly and expansion engine.
//!
//! Templates are declared as definitions (name, tier, parent, inclusion
//! map) over raw XML fragments called tiles. Building resolves the
//! inheritance/inclusion graph into a dependency-ordered chain, then
//! splices each template's inclusion content into its source stream to
//! produce compiled documents. At render time, a compiled document is
//! expanded in a single event-stream pass with one-token lookahead,
//! nested binding scopes and a deferred-action mechanism that lets
//! handlers re-enter user logic mid-stream.
//!
//! # Build
//!
//! ```
//! use std::sync::Arc;
//! use weft::{MemoryCache, MemoryTileSource, TemplateBuilder, TemplateDefinition};
//!
//! # fn main() -> weft::Result<()> {
//! let tiles = MemoryTileSource::new()
//!     .with("page.xml", r#"<html xmlns:w="urn:weft:stdlib"><w:include name="body"/></html>"#)
//!     .with("body.xml", "<p>hello</p>");
//!
//! let mut builder = TemplateBuilder::new(Arc::new(MemoryCache::new()));
//! builder.add_tile_source("site", tiles);
//! builder.add_definitions([
//!     TemplateDefinition::new("body").with_source("site:body.xml"),
//!     TemplateDefinition::new("page")
//!         .with_source("site:page.xml")
//!         .with_inclusion("body", "body"),
//! ]);
//!
//! let templates = builder.build()?;
//! let page = templates.iter().find(|t| t.name() == "page").unwrap();
//! assert!(page.content().is_some());
//! # Ok(())
//! # }
//! ```

pub mod build;
pub mod cache;
pub mod definition;
pub mod error;
pub mod expand;
pub mod graph;
pub mod logger;
pub mod render;
pub mod tiles;
pub mod xml;

pub use build::{Merger, Template, TemplateBuilder, Tier};
pub use cache::{ContentCache, ContentHandle, MemoryCache};
pub use definition::{DefinitionFile, TemplateDefinition};
pub use error::{Error, Result};
pub use expand::{BindingContext, BindingResolver, Expansion};
pub use graph::{DependencyGraph, DependencyNode};
pub use render::{
    Action, AttributeHandler, Bindings, ElementHandler, EventHandle, ExpansionContext,
    HandlerRegistry, QName, Value,
};
pub use tiles::{DirectoryTileSource, MemoryTileSource, TileSource};
