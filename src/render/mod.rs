//! Render-time expansion runtime.
//!
//! A single pass over a compiled template's event stream, driven by an
//! embedder-owned dispatch loop:
//!
//! - **context**: per-render state (lookahead event queue, binding-scope
//!   stack, deferred-action registry)
//! - **event**: the handle passed into every invoked handler, plus
//!   child/sibling stream-walking helpers
//! - **bindings**: nested variable scopes with parent-chain lookup
//! - **handler**: the qualified-tag handler registry consulted by the
//!   dispatch loop

pub mod bindings;
pub mod context;
pub mod event;
pub mod handler;

pub use bindings::{Bindings, Value};
pub use context::{Action, ExpansionContext, action_id, is_action_end, is_action_start};
pub use event::{
    EventHandle, end_scope_action, read_children, read_siblings, skip_children, skip_siblings,
};
pub use handler::{AttributeHandler, ElementHandler, HandlerRegistry, QName};
