//! Error types for template building and render-time expansion.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while resolving, building, or expanding templates.
///
/// All of these are structural or configuration defects: none of them can
/// succeed on retry without a change to the definitions or tiles, so no
/// recovery is attempted anywhere.
#[derive(Debug, Error)]
pub enum Error {
    #[error("dependency cycle detected: {0}")]
    DependencyCycle(String),

    #[error("unresolved dependency `{dependency}` required by `{node}`")]
    UnresolvedDependency { node: String, dependency: String },

    #[error("inclusion point in template `{template}` must specify a name")]
    MissingInclusionName { template: String },

    #[error("unknown inclusion `{slot}` for template `{template}`")]
    UnknownInclusion { template: String, slot: String },

    #[error("unclosed inclusion point in template `{template}`")]
    UnclosedInclusion { template: String },

    #[error("tile `{0}` does not name a tile source")]
    TileLocator(String),

    #[error("no such tile source: {0}")]
    UnknownTileSource(String),

    #[error("no such tile: {0}")]
    MissingTile(String),

    #[error("template `{0}` was not built before its dependents")]
    TemplateNotBuilt(String),

    #[error("no action registered under id {0}")]
    NoSuchAction(u64),

    #[error("binding scope popped without a matching push")]
    ScopeUnderflow,

    #[error("definition file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("XML error")]
    Xml(#[from] quick_xml::Error),

    #[error("IO error")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_carries_context() {
        let err = Error::UnknownInclusion {
            template: "page".to_string(),
            slot: "header".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("page"));
        assert!(display.contains("header"));

        let err = Error::UnresolvedDependency {
            node: "child".to_string(),
            dependency: "ghost".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("child"));
        assert!(display.contains("ghost"));
    }
}
