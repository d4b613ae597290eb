//! Tile-based template building.
//!
//! The builder turns a set of template definitions into compiled
//! artifacts:
//!
//! 1. definitions are ordered into a build chain (parents and inclusion
//!    targets strictly first);
//! 2. per definition, the source identity and inclusion map are resolved:
//!    inherited from the parent where one is named, otherwise fetched from
//!    the definition's tile locator (raw content is fetched at most once
//!    per source);
//! 3. unless the template is abstract, every inclusion slot is resolved to
//!    the referenced template's compiled content and the merger splices
//!    them into the source.
//!
//! Compiled artifacts land in the shared content cache; `build()` returns
//! the concrete templates in chain order.

pub mod merge;
pub mod template;

pub use merge::Merger;
pub use template::{Template, Tier};

use std::collections::HashMap;
use std::sync::Arc;

use crate::cache::{ContentCache, template_key, tile_key};
use crate::definition::TemplateDefinition;
use crate::error::{Error, Result};
use crate::graph::{DependencyGraph, DependencyNode};
use crate::tiles::TileSource;
use crate::xml::create_writer;

impl DependencyNode for TemplateDefinition {
    fn id(&self) -> &str {
        &self.name
    }

    fn dependencies(&self) -> Vec<String> {
        let mut deps: Vec<String> = self.inclusions.values().cloned().collect();
        if let Some(parent) = &self.extends {
            deps.push(parent.clone());
        }
        deps
    }
}

/// Builds compiled templates from definitions, tile sources and a cache.
pub struct TemplateBuilder {
    cache: Arc<dyn ContentCache>,
    tile_sources: HashMap<String, Box<dyn TileSource>>,
    definitions: Vec<TemplateDefinition>,
}

impl TemplateBuilder {
    pub fn new(cache: Arc<dyn ContentCache>) -> Self {
        Self {
            cache,
            tile_sources: HashMap::new(),
            definitions: Vec::new(),
        }
    }

    /// Register a tile source under an origin name. Definitions reference
    /// it as `"<origin>:<tile-name>"`.
    pub fn add_tile_source(&mut self, origin: impl Into<String>, source: impl TileSource + 'static) {
        self.tile_sources.insert(origin.into(), Box::new(source));
    }

    pub fn add_definition(&mut self, definition: TemplateDefinition) {
        self.definitions.push(definition);
    }

    pub fn add_definitions(&mut self, definitions: impl IntoIterator<Item = TemplateDefinition>) {
        self.definitions.extend(definitions);
    }

    /// Resolve the build chain without building anything.
    pub fn build_order(&self) -> Result<Vec<&str>> {
        let mut graph = DependencyGraph::new();
        graph.add_all(self.definitions.iter());
        Ok(graph
            .build_chain()?
            .into_iter()
            .copied()
            .map(|def| def.name.as_str())
            .collect())
    }

    /// Build every definition in dependency order.
    ///
    /// Returns the concrete templates in chain order. Abstract and internal
    /// templates are built (where applicable) and stay reachable through
    /// the cache, but are not exposed as top-level results.
    pub fn build(&self) -> Result<Vec<Template>> {
        let mut graph = DependencyGraph::new();
        graph.add_all(self.definitions.iter());
        let chain: Vec<&TemplateDefinition> = graph.build_chain()?.into_iter().copied().collect();

        let mut built: HashMap<String, Template> = HashMap::new();
        let mut order: Vec<String> = Vec::with_capacity(chain.len());

        for def in chain {
            let template = self.build_template(def, &built)?;
            order.push(template.name().to_string());
            built.insert(template.name().to_string(), template);
        }

        Ok(order
            .into_iter()
            .filter_map(|name| built.remove(&name))
            .filter(|t| t.tier() == Tier::Concrete)
            .collect())
    }

    fn build_template(
        &self,
        def: &TemplateDefinition,
        built: &HashMap<String, Template>,
    ) -> Result<Template> {
        let tier = if def.internal {
            Tier::Internal
        } else if def.abstract_tier {
            Tier::Abstract
        } else {
            Tier::Concrete
        };

        // pure marker/grouping template
        if def.is_empty() {
            return Ok(Template::new(
                def.name.clone(),
                tier,
                None,
                HashMap::new(),
                self.cache.clone(),
            ));
        }

        let mut source_name = None;
        let mut inclusions = HashMap::new();

        if let Some(parent) = &def.extends {
            // inherit source identity and inclusions from the parent
            let parent_template = built
                .get(parent)
                .ok_or_else(|| Error::TemplateNotBuilt(parent.clone()))?;
            source_name = parent_template.source_name().map(str::to_string);
            inclusions.extend(parent_template.inclusions().clone());
        } else if let Some(locator) = &def.source {
            source_name = Some(locator.replace(':', "-"));
        }

        // own entries win over inherited ones
        inclusions.extend(
            def.inclusions
                .iter()
                .map(|(slot, target)| (slot.clone(), target.clone())),
        );

        let template = Template::new(
            def.name.clone(),
            tier,
            source_name,
            inclusions,
            self.cache.clone(),
        );

        // fetch raw content once; later templates on the same source reuse it
        if !template.has_raw_source()
            && let Some(locator) = &def.source
        {
            self.read_tile(locator)?;
        }

        if template.tier() != Tier::Abstract
            && let Some(raw) = template.raw_source()
        {
            let mut handles = HashMap::new();
            for (slot, target) in template.inclusions() {
                let target_template = built
                    .get(target)
                    .ok_or_else(|| Error::TemplateNotBuilt(target.clone()))?;
                handles.insert(slot.clone(), target_template.content());
            }

            let mut writer = create_writer();
            Merger::new(&def.name, &handles).merge(&raw, &mut writer)?;
            self.cache
                .write(&template_key(&def.name), writer.into_inner().into_inner());
        }

        Ok(template)
    }

    /// Fetch a raw tile through its origin's source and commit it to the
    /// cache. A failed fetch leaves no partial entry behind.
    fn read_tile(&self, locator: &str) -> Result<()> {
        let Some((origin, tile)) = locator.split_once(':') else {
            return Err(Error::TileLocator(locator.to_string()));
        };

        let source = self
            .tile_sources
            .get(origin)
            .ok_or_else(|| Error::UnknownTileSource(origin.to_string()))?;

        let mut sink = Vec::new();
        if !source.read_tile(tile, &mut sink)? {
            return Err(Error::MissingTile(locator.to_string()));
        }

        self.cache.write(&tile_key(&locator.replace(':', "-")), sink);
        Ok(())
    }
}
