//! Nested variable-binding scopes for render-time expansion.
//!
//! Frames live in a stack; each frame optionally refers back to an
//! enclosing frame for fallback lookup. The back-reference is an index,
//! never an ownership relation: a child frame does not control its
//! parent's lifetime. A "top-level" frame simply omits the reference, so
//! names from enclosing scopes stop resolving inside it.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Variable value carried by a binding frame.
pub type Value = serde_json::Value;

#[derive(Debug, Default)]
struct Frame {
    vars: HashMap<String, Value>,
    parent: Option<usize>,
}

/// Stack of binding frames; the innermost frame is the current scope.
///
/// Constructed with one base frame that is never popped.
#[derive(Debug)]
pub struct Bindings {
    frames: Vec<Frame>,
}

impl Bindings {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::default()],
        }
    }

    /// Push a new frame: a fresh top-level frame when `top_level` is true,
    /// otherwise a child of the currently-innermost frame.
    pub fn start_scope(&mut self, top_level: bool) {
        let parent = if top_level {
            None
        } else {
            Some(self.frames.len() - 1)
        };
        self.frames.push(Frame {
            vars: HashMap::new(),
            parent,
        });
    }

    /// Pop the innermost frame. Popping the base frame is a programming
    /// error.
    pub fn end_scope(&mut self) -> Result<()> {
        if self.frames.len() == 1 {
            return Err(Error::ScopeUnderflow);
        }
        self.frames.pop();
        Ok(())
    }

    /// Define `name` in the innermost frame.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let innermost = self.frames.len() - 1;
        self.frames[innermost].vars.insert(name.into(), value);
    }

    /// Update `name` in the nearest frame along the parent chain that
    /// already defines it; define it in the innermost frame otherwise.
    pub fn assign(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        let mut index = Some(self.frames.len() - 1);
        while let Some(i) = index {
            if self.frames[i].vars.contains_key(&name) {
                self.frames[i].vars.insert(name, value);
                return;
            }
            index = self.frames[i].parent;
        }
        self.set(name, value);
    }

    /// Resolve `name`, delegating unbound names along the parent chain.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let mut index = Some(self.frames.len() - 1);
        while let Some(i) = index {
            let frame = &self.frames[i];
            if let Some(value) = frame.vars.get(name) {
                return Some(value);
            }
            index = frame.parent;
        }
        None
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of live frames, including the base frame.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

impl Default for Bindings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_child_frame_delegates_to_parent() {
        let mut bindings = Bindings::new();
        bindings.set("title", json!("base"));

        bindings.start_scope(false);
        assert_eq!(bindings.get("title"), Some(&json!("base")));

        bindings.set("title", json!("inner"));
        assert_eq!(bindings.get("title"), Some(&json!("inner")));

        bindings.end_scope().unwrap();
        assert_eq!(bindings.get("title"), Some(&json!("base")));
    }

    #[test]
    fn test_top_level_frame_hides_enclosing_names() {
        let mut bindings = Bindings::new();
        bindings.set("title", json!("base"));

        bindings.start_scope(true);
        assert_eq!(bindings.get("title"), None);
        assert!(!bindings.contains("title"));

        bindings.end_scope().unwrap();
        assert!(bindings.contains("title"));
    }

    #[test]
    fn test_lookup_walks_whole_chain() {
        let mut bindings = Bindings::new();
        bindings.set("a", json!(1));
        bindings.start_scope(false);
        bindings.set("b", json!(2));
        bindings.start_scope(false);
        bindings.set("c", json!(3));

        assert_eq!(bindings.get("a"), Some(&json!(1)));
        assert_eq!(bindings.get("b"), Some(&json!(2)));
        assert_eq!(bindings.get("c"), Some(&json!(3)));
        assert_eq!(bindings.depth(), 3);
    }

    #[test]
    fn test_assign_updates_defining_frame() {
        let mut bindings = Bindings::new();
        bindings.set("count", json!(1));
        bindings.start_scope(false);

        bindings.assign("count", json!(2));
        bindings.end_scope().unwrap();
        // the outer definition was updated, not shadowed
        assert_eq!(bindings.get("count"), Some(&json!(2)));
    }

    #[test]
    fn test_assign_defines_innermost_when_unbound() {
        let mut bindings = Bindings::new();
        bindings.start_scope(false);
        bindings.assign("fresh", json!("x"));
        assert_eq!(bindings.get("fresh"), Some(&json!("x")));

        bindings.end_scope().unwrap();
        assert_eq!(bindings.get("fresh"), None);
    }

    #[test]
    fn test_assign_stops_at_top_level_frame() {
        let mut bindings = Bindings::new();
        bindings.set("count", json!(1));
        bindings.start_scope(true);

        // the chain ends at the top-level frame, so this is a definition
        bindings.assign("count", json!(2));
        bindings.end_scope().unwrap();
        assert_eq!(bindings.get("count"), Some(&json!(1)));
    }

    #[test]
    fn test_pop_below_base_is_an_error() {
        let mut bindings = Bindings::new();
        bindings.start_scope(false);
        bindings.end_scope().unwrap();

        assert!(matches!(bindings.end_scope(), Err(Error::ScopeUnderflow)));
    }

    #[test]
    fn test_reopened_scope_starts_clean() {
        let mut bindings = Bindings::new();
        bindings.start_scope(false);
        bindings.set("x", json!(1));
        bindings.end_scope().unwrap();

        bindings.start_scope(false);
        assert_eq!(bindings.get("x"), None);
    }
}
