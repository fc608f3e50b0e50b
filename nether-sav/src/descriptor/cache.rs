//! Per-session struct definition cache

use std::sync::Arc;

use hashbrown::HashMap;

use super::StructDescriptor;

/// Struct definitions seen so far in one decode session, keyed by name.
///
/// Later predefined references resolve through here. Each decoder owns its
/// own cache; nothing is shared between sessions.
#[derive(Debug, Default)]
pub struct StructCache {
    defs: HashMap<String, Arc<StructDescriptor>>,
}

impl StructCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Definition registered under `name`, if any
    pub fn get(&self, name: &str) -> Option<&Arc<StructDescriptor>> {
        self.defs.get(name)
    }

    /// Register a definition, replacing any earlier one with the same name
    pub fn insert(&mut self, desc: Arc<StructDescriptor>) {
        if let Some(old) = self.defs.insert(desc.name.clone(), desc) {
            tracing::trace!(name = %old.name, "Struct definition replaced");
        }
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
