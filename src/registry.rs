//! Resource registry: exact and wildcard lookup with synthesized defaults.
//!
//! The registry is populated by the surrounding system (directly or through
//! an adapter's `register_resource`) and treated as read-only at request
//! time. Lookup order:
//!
//! 1. exact match on the identifier;
//! 2. wildcard pattern match, most specific (longest literal prefix) first;
//! 3. a synthesized default resource carrying the identifier as both id and
//!    name, with medium sensitivity.
//!
//! Resolution never fails.
//!
//! # Pattern semantics
//!
//! Registry keys containing `*` are compiled as glob patterns and matched
//! with literal path separators: `/api/admin/*` matches `/api/admin/users`
//! but neither `/api/admin-x` nor `/api/admin/users/42`. Use `**` for a
//! subtree key.

use authgate_model::{Resource, ResourceType, ValidationError};
use dashmap::DashMap;
use glob::{MatchOptions, Pattern};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, trace};

/// A compiled wildcard registry entry.
#[derive(Debug, Clone)]
struct PatternEntry {
    /// The original registry key, e.g. `/api/admin/*`.
    key: String,
    /// Length of the literal text before the first wildcard; entries are
    /// kept sorted by this, descending, so the most specific pattern wins.
    literal_len: usize,
    pattern: Pattern,
    resource: Arc<Resource>,
}

/// Read-mostly map from identifier (or identifier pattern) to resource.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    exact: DashMap<String, Arc<Resource>>,
    patterns: RwLock<Vec<PatternEntry>>,
}

fn match_options() -> MatchOptions {
    MatchOptions {
        require_literal_separator: true,
        ..MatchOptions::default()
    }
}

impl ResourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            exact: DashMap::new(),
            patterns: RwLock::new(Vec::new()),
        }
    }

    /// Register a resource under `key`.
    ///
    /// Keys containing `*` become wildcard entries; everything else is an
    /// exact key. Fails with a [`ValidationError`] when a wildcard key does
    /// not compile as a pattern.
    pub fn insert(&self, key: impl Into<String>, resource: Resource) -> Result<(), ValidationError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ValidationError::new("key"));
        }
        let resource = Arc::new(resource);

        if key.contains('*') {
            let pattern = Pattern::new(&key).map_err(|_| ValidationError::new("key"))?;
            let literal_len = key.find('*').unwrap_or(key.len());
            let mut patterns = self.patterns.write();
            // Replace an existing entry for the same key rather than stacking.
            patterns.retain(|entry| entry.key != key);
            patterns.push(PatternEntry {
                key,
                literal_len,
                pattern,
                resource,
            });
            patterns.sort_by(|a, b| b.literal_len.cmp(&a.literal_len));
        } else {
            self.exact.insert(key, resource);
        }
        Ok(())
    }

    /// Resolve an identifier to a registered resource, or synthesize a
    /// default of the given type. Never fails.
    pub fn resolve(&self, identifier: &str, default_type: ResourceType) -> Arc<Resource> {
        if let Some(entry) = self.exact.get(identifier) {
            trace!(identifier, resource = %entry.value().id, "resource resolved (exact)");
            return entry.value().clone();
        }

        {
            let patterns = self.patterns.read();
            for entry in patterns.iter() {
                if entry.pattern.matches_with(identifier, match_options()) {
                    trace!(identifier, key = %entry.key, resource = %entry.resource.id, "resource resolved (pattern)");
                    return entry.resource.clone();
                }
            }
        }

        debug!(identifier, "no registry entry, synthesizing default resource");
        Arc::new(synthesize_default(identifier, default_type))
    }

    /// Look up an exact key without falling back to patterns or defaults.
    pub fn get(&self, key: &str) -> Option<Arc<Resource>> {
        self.exact.get(key).map(|e| e.value().clone())
    }

    /// Number of registered entries (exact and pattern).
    pub fn len(&self) -> usize {
        self.exact.len() + self.patterns.read().len()
    }

    /// Whether the registry has no entries.
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.patterns.read().is_empty()
    }
}

/// The default resource for an unregistered identifier: id and name equal
/// the identifier, sensitivity medium.
fn synthesize_default(identifier: &str, resource_type: ResourceType) -> Resource {
    Resource {
        id: identifier.to_string(),
        resource_type,
        name: identifier.to_string(),
        sensitivity: authgate_model::Sensitivity::Medium,
        owner: None,
        managers: Default::default(),
    }
}
