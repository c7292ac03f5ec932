//! Embedded sub-documents.
//!
//! The algebra never looks inside an embed. When two embeds with the same
//! key meet during compose, transform or invert, the work is delegated to
//! the [`EmbedHandler`] registered under that key in an [`EmbedRegistry`].
//!
//! The registry is owned by the caller and starts empty. Register handlers
//! once at startup and pass the registry by reference to the `*_with`
//! variants of the algebra; nothing is registered implicitly.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::codec::json::{from_json, to_json};
use crate::error::{DeltaError, Result};

/// Merges and undoes sub-changes for one kind of embed.
pub trait EmbedHandler: Send + Sync {
    /// Combine payload `a` followed by sub-change `b`. `keep_null` is set
    /// when `a` is itself a sub-change rather than embedded content.
    fn compose(&self, a: &Value, b: &Value, keep_null: bool, embeds: &EmbedRegistry)
        -> Result<Value>;

    /// The sub-change undoing `change` when it was applied to `base`.
    fn invert(&self, change: &Value, base: &Value, embeds: &EmbedRegistry) -> Result<Value>;

    /// Rewrite sub-change `b` to follow the concurrent sub-change `a`.
    ///
    /// Defaults to keeping `b` unchanged, treating the payloads as atomic.
    fn transform(
        &self,
        _a: &Value,
        b: &Value,
        _priority: bool,
        _embeds: &EmbedRegistry,
    ) -> Result<Value> {
        Ok(b.clone())
    }
}

#[derive(Clone, Default)]
pub struct EmbedRegistry {
    handlers: HashMap<String, Arc<dyn EmbedHandler>>,
}

impl EmbedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `kind`, replacing any previous handler.
    pub fn register(&mut self, kind: impl Into<String>, handler: impl EmbedHandler + 'static) {
        let kind = kind.into();
        debug!(kind = %kind, "registered embed handler");
        self.handlers.insert(kind, Arc::new(handler));
    }

    /// Remove the handler for `kind`. Returns whether one was registered.
    pub fn unregister(&mut self, kind: &str) -> bool {
        let removed = self.handlers.remove(kind).is_some();
        debug!(kind, removed, "unregistered embed handler");
        removed
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.handlers.contains_key(kind)
    }

    pub fn get(&self, kind: &str) -> Option<&dyn EmbedHandler> {
        self.handlers.get(kind).map(|handler| handler.as_ref())
    }

    /// Like [`get`](Self::get), failing for unregistered keys.
    pub fn handler(&self, kind: &str) -> Result<&dyn EmbedHandler> {
        self.get(kind)
            .ok_or_else(|| DeltaError::UnregisteredEmbed(kind.to_string()))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for EmbedRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<&String> = self.handlers.keys().collect();
        kinds.sort();
        f.debug_struct("EmbedRegistry").field("kinds", &kinds).finish()
    }
}

/// Handler for embeds whose payload is itself a change in wire form, e.g.
/// `{"delta": [{"insert": "a"}]}`. Runs the same algebra recursively with
/// the registry it is called with.
#[derive(Debug, Clone, Copy, Default)]
pub struct NestedDelta;

impl EmbedHandler for NestedDelta {
    fn compose(
        &self,
        a: &Value,
        b: &Value,
        _keep_null: bool,
        embeds: &EmbedRegistry,
    ) -> Result<Value> {
        let composed = from_json(a)?.compose_with(&from_json(b)?, embeds)?;
        Ok(to_json(&composed))
    }

    fn invert(&self, change: &Value, base: &Value, embeds: &EmbedRegistry) -> Result<Value> {
        let inverted = from_json(change)?.invert_with(&from_json(base)?, embeds)?;
        Ok(to_json(&inverted))
    }

    fn transform(
        &self,
        a: &Value,
        b: &Value,
        priority: bool,
        embeds: &EmbedRegistry,
    ) -> Result<Value> {
        let transformed = from_json(a)?.transform_with(&from_json(b)?, priority, embeds)?;
        Ok(to_json(&transformed))
    }
}
