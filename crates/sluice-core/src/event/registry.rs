// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The process-wide table of event cords.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::cord::EventCord;
use super::types::CordKey;

/// Maps [`CordKey`]s to their [`EventCord`].
///
/// Owned by the [`EventPipeline`](super::EventPipeline). It is created
/// together with the event queue and cleared before the queue on shutdown,
/// so no cord can route into a queue that is being torn down.
#[derive(Debug, Default)]
pub struct CordRegistry {
    cords: RwLock<HashMap<CordKey, Arc<EventCord>>>,
}

impl CordRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cord for `(category, sub_category)`, creating it on first use.
    pub fn get_or_create(&self, category: u32, sub_category: u32) -> Arc<EventCord> {
        let key = CordKey::new(category, sub_category);
        if let Some(cord) = self.find(key) {
            return cord;
        }

        let mut cords = self.cords.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(cords.entry(key).or_insert_with(|| {
            log::debug!("CordRegistry: created cord {key}");
            Arc::new(EventCord::new(category, sub_category))
        }))
    }

    /// Returns the cord for `key`, if one has been created.
    pub fn find(&self, key: CordKey) -> Option<Arc<EventCord>> {
        self.cords
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    /// Removes and returns the cord for `key`.
    pub fn remove(&self, key: CordKey) -> Option<Arc<EventCord>> {
        let removed = self
            .cords
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
        if removed.is_some() {
            log::debug!("CordRegistry: removed cord {key}");
        }
        removed
    }

    /// Removes every cord, returning how many there were.
    pub fn clear(&self) -> usize {
        let drained: Vec<_> = self
            .cords
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .collect();
        drained.len()
    }

    /// Number of registered cords.
    pub fn len(&self) -> usize {
        self.cords.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if no cord has been created.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The keys of every registered cord, sorted.
    pub fn keys(&self) -> Vec<CordKey> {
        let mut keys: Vec<_> = self
            .cords
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_or_create_returns_the_same_cord() {
        let registry = CordRegistry::new();
        let a = registry.get_or_create(1, 0);
        let b = registry.get_or_create(1, 0);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn find_does_not_create() {
        let registry = CordRegistry::new();
        assert!(registry.find(CordKey::new(3, 3)).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn remove_and_clear() {
        let registry = CordRegistry::new();
        registry.get_or_create(1, 0);
        registry.get_or_create(1, 1);
        registry.get_or_create(2, 0);
        assert_eq!(
            registry.keys(),
            vec![CordKey::new(1, 0), CordKey::new(1, 1), CordKey::new(2, 0)]
        );

        assert!(registry.remove(CordKey::new(1, 1)).is_some());
        assert!(registry.remove(CordKey::new(1, 1)).is_none());
        assert_eq!(registry.clear(), 2);
        assert!(registry.is_empty());
    }
}
