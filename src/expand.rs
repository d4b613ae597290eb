//! Embedded-expression expansion.
//!
//! An expansion is a tree of literal text, compound sequences and binding
//! expressions. A binding expression pairs a resolver prefix with a nested
//! compound expression: the nested part is flattened to a string first,
//! then `(prefix, flattened, bindings)` is handed to the pluggable
//! resolver. The expression grammar itself is the resolver's concern;
//! this module only drives resolution and output assembly.

use std::fmt;

use crate::render::bindings::{Bindings, Value};

/// Pluggable resolution capability behind binding expressions.
///
/// A `None` result means "no output produced"; any escaping of the
/// produced value is the resolver's responsibility.
pub trait BindingResolver {
    fn resolve(&self, prefix: &str, expression: &str, bindings: &Bindings) -> Option<Value>;
}

/// Everything a resolution pass needs: the current binding frames and the
/// resolver to delegate to.
pub struct BindingContext<'a> {
    pub bindings: &'a Bindings,
    pub resolver: &'a dyn BindingResolver,
}

impl<'a> BindingContext<'a> {
    pub fn new(bindings: &'a Bindings, resolver: &'a dyn BindingResolver) -> Self {
        Self { bindings, resolver }
    }
}

/// A parsed embedded expression.
#[derive(Debug, Clone)]
pub enum Expansion {
    /// Literal text, appended verbatim.
    Text(String),
    /// A sequence of expansions resolved in order.
    Compound(Vec<Expansion>),
    /// A resolver-delegated expression with a fixed prefix.
    Binding { prefix: String, inner: Box<Expansion> },
}

impl Expansion {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn binding(prefix: impl Into<String>, inner: Expansion) -> Self {
        Self::Binding {
            prefix: prefix.into(),
            inner: Box::new(inner),
        }
    }

    /// Resolve this expansion into `out`.
    pub fn resolve(&self, out: &mut String, ctx: &BindingContext<'_>) {
        match self {
            Self::Text(text) => out.push_str(text),
            Self::Compound(parts) => {
                for part in parts {
                    part.resolve(out, ctx);
                }
            }
            Self::Binding { prefix, inner } => {
                // flatten the nested expression before delegating
                let mut flattened = String::new();
                inner.resolve(&mut flattened, ctx);

                if let Some(value) = ctx.resolver.resolve(prefix, &flattened, ctx.bindings) {
                    match value {
                        Value::String(s) => out.push_str(&s),
                        other => out.push_str(&other.to_string()),
                    }
                }
            }
        }
    }

    /// Resolve into a fresh string.
    pub fn resolve_to_string(&self, ctx: &BindingContext<'_>) -> String {
        let mut out = String::new();
        self.resolve(&mut out, ctx);
        out
    }
}

impl fmt::Display for Expansion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{text}"),
            Self::Compound(parts) => {
                for part in parts {
                    write!(f, "{part}")?;
                }
                Ok(())
            }
            Self::Binding { inner, .. } => write!(f, "${{ {inner} }}"),
        }
    }
}
