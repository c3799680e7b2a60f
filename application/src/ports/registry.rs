//! Registry of configured model backends.
//!
//! Maps identifiers to backends and owns the externally-configured
//! default speaking order and recorder designation. Lookup is
//! case-insensitive because [`ModelId`] normalizes on construction.

use crate::ports::backend::ModelBackend;
use roundtable_domain::ModelId;
use std::collections::HashMap;
use std::sync::Arc;

/// All configured backends plus the default speaking order and the
/// designated recorder.
pub struct ModelRegistry {
    backends: HashMap<ModelId, Arc<dyn ModelBackend>>,
    default_order: Vec<ModelId>,
    recorder: ModelId,
}

impl ModelRegistry {
    pub fn new(default_order: Vec<ModelId>, recorder: ModelId) -> Self {
        Self {
            backends: HashMap::new(),
            default_order,
            recorder,
        }
    }

    /// Register a backend under its own id.
    pub fn register(&mut self, backend: Arc<dyn ModelBackend>) {
        self.backends.insert(backend.id().clone(), backend);
    }

    pub fn get(&self, id: &ModelId) -> Option<Arc<dyn ModelBackend>> {
        self.backends.get(id).cloned()
    }

    /// The recorder backend: the configured one, falling back to the
    /// first registered backend in the default order.
    pub fn recorder(&self) -> Option<Arc<dyn ModelBackend>> {
        self.get(&self.recorder).or_else(|| {
            self.default_order
                .iter()
                .find_map(|id| self.get(id))
        })
    }

    pub fn default_order(&self) -> &[ModelId] {
        &self.default_order
    }

    /// Ids of every registered backend (for the command parser).
    pub fn known_ids(&self) -> Vec<ModelId> {
        self.backends.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}
