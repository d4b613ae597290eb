//! Element and attribute handler registry.
//!
//! Handlers are keyed by qualified tag identity and resolved by exact
//! match. The registry is an explicit object owned by the embedder and
//! passed to its dispatch loop; there is no process-wide registration.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::render::event::EventHandle;
use crate::xml::NS_STDLIB;

/// Qualified tag identity: optional namespace plus local name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub namespace: Option<String>,
    pub local: String,
}

impl QName {
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local: local.into(),
        }
    }

    /// A name with no namespace.
    pub fn local(local: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local: local.into(),
        }
    }

    /// A name in the stdlib marker namespace.
    pub fn stdlib(local: impl Into<String>) -> Self {
        Self::new(NS_STDLIB, local)
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{ns}}}{}", self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

/// Handler invoked for an element event.
pub trait ElementHandler {
    fn handle(&self, event: &mut EventHandle<'_>) -> Result<()>;
}

/// Handler invoked for a recognized attribute on an element event.
pub trait AttributeHandler {
    fn handle(&self, event: &mut EventHandle<'_>, value: &str) -> Result<()>;
}

/// Exact-match lookup from qualified tag identity to handler.
#[derive(Default)]
pub struct HandlerRegistry {
    elements: FxHashMap<QName, Box<dyn ElementHandler>>,
    attributes: FxHashMap<QName, Box<dyn AttributeHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_element(&mut self, tag: QName, handler: impl ElementHandler + 'static) {
        self.elements.insert(tag, Box::new(handler));
    }

    pub fn register_attribute(&mut self, attribute: QName, handler: impl AttributeHandler + 'static) {
        self.attributes.insert(attribute, Box::new(handler));
    }

    pub fn element(&self, tag: &QName) -> Option<&dyn ElementHandler> {
        self.elements.get(tag).map(|h| &**h)
    }

    pub fn attribute(&self, attribute: &QName) -> Option<&dyn AttributeHandler> {
        self.attributes.get(attribute).map(|h| &**h)
    }

    /// Fold another registry's handlers into this one; `other`'s entries
    /// win on conflicting keys.
    pub fn extend(&mut self, other: HandlerRegistry) {
        self.elements.extend(other.elements);
        self.attributes.extend(other.attributes);
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.attributes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::context::ExpansionContext;
    use serde_json::json;

    struct SetFlag(&'static str);

    impl ElementHandler for SetFlag {
        fn handle(&self, event: &mut EventHandle<'_>) -> Result<()> {
            event.bindings_mut().set(self.0, json!(true));
            Ok(())
        }
    }

    struct RecordValue;

    impl AttributeHandler for RecordValue {
        fn handle(&self, event: &mut EventHandle<'_>, value: &str) -> Result<()> {
            event.bindings_mut().set("recorded", json!(value));
            Ok(())
        }
    }

    #[test]
    fn test_exact_match_lookup() {
        let mut registry = HandlerRegistry::new();
        registry.register_element(QName::stdlib("if"), SetFlag("seen"));

        assert!(registry.element(&QName::stdlib("if")).is_some());
        assert!(registry.element(&QName::local("if")).is_none());
        assert!(registry.element(&QName::new("urn:other", "if")).is_none());
    }

    #[test]
    fn test_element_handler_receives_handle() {
        let mut registry = HandlerRegistry::new();
        registry.register_element(QName::stdlib("if"), SetFlag("seen"));

        let mut ctx = ExpansionContext::new("<root/>".as_bytes());
        let event = ctx.next_event().unwrap().unwrap();
        let mut te = EventHandle::new(&mut ctx, event);

        registry
            .element(&QName::stdlib("if"))
            .unwrap()
            .handle(&mut te)
            .unwrap();
        assert_eq!(te.bindings().get("seen"), Some(&json!(true)));
    }

    #[test]
    fn test_attribute_handler_receives_value() {
        let mut registry = HandlerRegistry::new();
        registry.register_attribute(QName::stdlib("bind"), RecordValue);

        let mut ctx = ExpansionContext::new("<root/>".as_bytes());
        let event = ctx.next_event().unwrap().unwrap();
        let mut te = EventHandle::new(&mut ctx, event);

        registry
            .attribute(&QName::stdlib("bind"))
            .unwrap()
            .handle(&mut te, "user.name")
            .unwrap();
        assert_eq!(te.bindings().get("recorded"), Some(&json!("user.name")));
    }

    #[test]
    fn test_extend_prefers_new_entries() {
        let mut base = HandlerRegistry::new();
        base.register_element(QName::stdlib("if"), SetFlag("old"));

        let mut extra = HandlerRegistry::new();
        extra.register_element(QName::stdlib("if"), SetFlag("new"));
        base.extend(extra);

        let mut ctx = ExpansionContext::new("<root/>".as_bytes());
        let event = ctx.next_event().unwrap().unwrap();
        let mut te = EventHandle::new(&mut ctx, event);

        base.element(&QName::stdlib("if")).unwrap().handle(&mut te).unwrap();
        assert!(te.bindings().contains("new"));
        assert!(!te.bindings().contains("old"));
    }

    #[test]
    fn test_display() {
        assert_eq!(QName::stdlib("include").to_string(), "{urn:weft:stdlib}include");
        assert_eq!(QName::local("div").to_string(), "div");
    }
}
