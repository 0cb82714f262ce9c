//! In-memory overlay handler
//!
//! Two-tier map over the `(file, property, context)` keyspace: a general tier
//! for context-less entries and a per-context tier for overrides. Used
//! standalone as a non-persistent backend, and embedded by every persistent
//! handler as its read cache. Context fallback is not this component's
//! business - the resolver owns that.

use crate::errors::Result;
use crate::handler::Handler;
use crate::value::codec::{self, TypeTag};
use serde_json::Value;
use std::collections::HashMap;

/// An entry's storage form: the encoded string (absent for stored nulls) and
/// the tag that reconstructs its original kind.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredValue {
    pub stored: Option<String>,
    pub tag: TypeTag,
}

type Tier = HashMap<String, HashMap<String, StoredValue>>;

/// Non-persistent settings handler backed by process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryHandler {
    /// file -> property -> stored entry
    general: Tier,
    /// context -> file -> property -> stored entry
    contexts: HashMap<String, Tier>,
}

impl MemoryHandler {
    /// Create an empty overlay
    pub fn new() -> Self {
        Self::default()
    }

    fn tier(&self, context: Option<&str>) -> Option<&Tier> {
        match context {
            None => Some(&self.general),
            Some(ctx) => self.contexts.get(ctx),
        }
    }

    /// Check presence by exact key existence, independent of the stored value.
    pub fn has_stored(&self, file: &str, property: &str, context: Option<&str>) -> bool {
        self.tier(context)
            .and_then(|tier| tier.get(file))
            .is_some_and(|entries| entries.contains_key(property))
    }

    /// Fetch and decode an entry; `Ok(None)` when absent.
    pub fn get_stored(
        &self,
        file: &str,
        property: &str,
        context: Option<&str>,
    ) -> Result<Option<Value>> {
        let entry = self
            .tier(context)
            .and_then(|tier| tier.get(file))
            .and_then(|entries| entries.get(property));

        match entry {
            None => Ok(None),
            Some(stored) => codec::decode(stored.stored.as_deref(), stored.tag).map(Some),
        }
    }

    /// Encode and store a value, overwriting any prior entry for the triple.
    pub fn set_stored(&mut self, file: &str, property: &str, value: &Value, context: Option<&str>) {
        let (stored, tag) = codec::encode(value);
        self.store_raw(file, property, stored, tag, context);
    }

    /// Store an already-encoded pair directly (the hydration path - loaded
    /// rows carry their storage form and must not be re-encoded).
    pub fn store_raw(
        &mut self,
        file: &str,
        property: &str,
        stored: Option<String>,
        tag: TypeTag,
        context: Option<&str>,
    ) {
        let tier = match context {
            None => &mut self.general,
            Some(ctx) => self.contexts.entry(ctx.to_string()).or_default(),
        };
        tier.entry(file.to_string())
            .or_default()
            .insert(property.to_string(), StoredValue { stored, tag });
    }

    /// Drop the exact triple if present.
    pub fn forget_stored(&mut self, file: &str, property: &str, context: Option<&str>) {
        let tier = match context {
            None => &mut self.general,
            Some(ctx) => match self.contexts.get_mut(ctx) {
                Some(tier) => tier,
                None => return,
            },
        };
        if let Some(entries) = tier.get_mut(file) {
            entries.remove(property);
        }
    }

    /// Drop both tiers entirely.
    pub fn clear(&mut self) {
        self.general.clear();
        self.contexts.clear();
    }
}

impl Handler for MemoryHandler {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn has(&mut self, file: &str, property: &str, context: Option<&str>) -> Result<bool> {
        Ok(self.has_stored(file, property, context))
    }

    fn get(&mut self, file: &str, property: &str, context: Option<&str>) -> Result<Option<Value>> {
        self.get_stored(file, property, context)
    }

    fn set(
        &mut self,
        file: &str,
        property: &str,
        value: Value,
        context: Option<&str>,
    ) -> Result<()> {
        self.set_stored(file, property, &value, context);
        Ok(())
    }

    fn forget(&mut self, file: &str, property: &str, context: Option<&str>) -> Result<()> {
        self.forget_stored(file, property, context);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.clear();
        Ok(())
    }
}
