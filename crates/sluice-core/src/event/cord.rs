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

//! Priority-ordered interception lists for one (category, sub-category).
//!
//! A cord gives its listeners first refusal on every event routed under its
//! [`CordKey`]. Listeners run from the highest priority down; listeners with
//! equal priority run in insertion order. Delivery continues down the list
//! unless a listener returns [`Propagation::Stop`].
//!
//! The listener list is copy-on-write. Dispatch takes an `Arc` snapshot
//! under the cord lock and invokes listeners after releasing it, so a
//! listener may insert or remove entries (or post new events) without
//! deadlocking.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use super::listener::{EventListener, Propagation};
use super::types::{CordKey, Event};
use crate::sync::{AtomicWord, SpinLock};

/// Identifies one registration in a cord, for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle {
    key: CordKey,
    id: u64,
}

impl ListenerHandle {
    /// The key of the cord this handle belongs to.
    pub fn cord_key(&self) -> CordKey {
        self.key
    }
}

#[derive(Clone)]
struct CordEntry {
    id: u64,
    priority: i32,
    listener: Weak<dyn EventListener>,
}

/// An interception list for a single [`CordKey`].
///
/// The cord only keeps weak references: it never extends a listener's
/// lifetime. Owners unregister explicitly with [`remove`](Self::remove) or
/// [`remove_handle`](Self::remove_handle) at teardown; entries whose
/// listener has already been dropped are skipped and pruned.
pub struct EventCord {
    key: CordKey,
    entries: SpinLock<Arc<[CordEntry]>>,
    pass: AtomicBool,
    pass_overridden: AtomicBool,
    next_id: AtomicU64,
}

impl EventCord {
    /// Creates an empty cord that passes events on to the queue.
    pub fn new(category: u32, sub_category: u32) -> Self {
        Self {
            key: CordKey::new(category, sub_category),
            entries: SpinLock::new(Arc::from(Vec::<CordEntry>::new())),
            pass: AtomicBool::new(true),
            pass_overridden: AtomicBool::new(false),
            next_id: AtomicU64::new(0),
        }
    }

    /// The cord's key.
    pub fn key(&self) -> CordKey {
        self.key
    }

    /// The cord's category.
    pub fn category(&self) -> u32 {
        self.key.category
    }

    /// The cord's sub-category.
    pub fn sub_category(&self) -> u32 {
        self.key.sub_category
    }

    /// Registers `listener` with the given priority. Higher runs first.
    pub fn insert(&self, listener: &Arc<dyn EventListener>, priority: i32) -> ListenerHandle {
        let id = self.next_id.increment(1);
        let entry = CordEntry {
            id,
            priority,
            listener: Arc::downgrade(listener),
        };

        self.update(|entries| {
            // After every entry of equal or higher priority: stable for ties.
            let position = entries
                .iter()
                .position(|e| e.priority < priority)
                .unwrap_or(entries.len());
            entries.insert(position, entry.clone());
            true
        });

        log::debug!(
            "EventCord {}: inserted '{}' (priority={priority})",
            self.key,
            listener.name()
        );
        ListenerHandle { key: self.key, id }
    }

    /// Removes the first entry that refers to `listener`.
    ///
    /// Returns `false` if the listener was not registered here.
    pub fn remove(&self, listener: &Arc<dyn EventListener>) -> bool {
        let target = Arc::as_ptr(listener);
        let removed = self.update(|entries| {
            match entries
                .iter()
                .position(|e| std::ptr::addr_eq(e.listener.as_ptr(), target))
            {
                Some(position) => {
                    entries.remove(position);
                    true
                }
                None => false,
            }
        });
        if removed {
            log::debug!("EventCord {}: removed '{}'", self.key, listener.name());
        }
        removed
    }

    /// Removes the entry created by the [`insert`](Self::insert) call that
    /// returned `handle`.
    pub fn remove_handle(&self, handle: ListenerHandle) -> bool {
        if handle.key != self.key {
            return false;
        }
        self.update(|entries| match entries.iter().position(|e| e.id == handle.id) {
            Some(position) => {
                entries.remove(position);
                true
            }
            None => false,
        })
    }

    /// Drops entries whose listener no longer exists. Returns how many.
    pub fn prune(&self) -> usize {
        let mut pruned = 0;
        self.update(|entries| {
            let before = entries.len();
            entries.retain(|e| e.listener.strong_count() > 0);
            pruned = before - entries.len();
            pruned > 0
        });
        if pruned > 0 {
            log::debug!("EventCord {}: pruned {pruned} dead listeners", self.key);
        }
        pruned
    }

    /// Sets whether events are also queued after the listeners have run.
    pub fn set_pass(&self, pass: bool) {
        self.pass.store(pass, Ordering::Release);
        self.pass_overridden.store(true, Ordering::Release);
    }

    /// Returns the pass flag. Lock-free; advisory under concurrent writes.
    pub fn pass(&self) -> bool {
        self.pass.load(Ordering::Acquire)
    }

    /// Number of registered entries, including dead ones not yet pruned.
    pub fn listener_count(&self) -> usize {
        self.snapshot().len()
    }

    /// Returns `true` if the cord has listeners or an explicit pass setting.
    ///
    /// An inactive cord routes exactly like a missing one.
    pub fn is_active(&self) -> bool {
        self.listener_count() > 0 || self.pass_overridden.load(Ordering::Acquire)
    }

    /// Offers `event` to every listener in priority order.
    ///
    /// Returns `true` if the event should still go to the general queue:
    /// the pass flag is set and no listener stopped it. Broadcast events
    /// cannot be stopped and always reach every listener.
    pub fn dispatch(&self, event: &Event) -> bool {
        let snapshot = self.snapshot();
        let can_stop = !event.is_broadcast();
        let mut consumed = false;
        let mut dead = 0usize;

        for entry in snapshot.iter() {
            let Some(listener) = entry.listener.upgrade() else {
                dead += 1;
                continue;
            };
            if listener.handle_event(event) == Propagation::Stop && can_stop {
                log::trace!(
                    "EventCord {}: '{}' stopped {:?}",
                    self.key,
                    listener.name(),
                    event.kind()
                );
                consumed = true;
                break;
            }
        }

        drop(snapshot);
        if dead > 0 {
            self.prune();
        }

        self.pass() && !consumed
    }

    fn snapshot(&self) -> Arc<[CordEntry]> {
        Arc::clone(&self.entries.lock())
    }

    /// Applies `edit` to a copy of the list and installs it if no other
    /// update landed in the meantime. `edit` returns `false` to abandon.
    fn update(&self, mut edit: impl FnMut(&mut Vec<CordEntry>) -> bool) -> bool {
        loop {
            let snapshot = self.snapshot();
            let mut next = snapshot.to_vec();
            if !edit(&mut next) {
                return false;
            }
            let next: Arc<[CordEntry]> = Arc::from(next);

            let mut current = self.entries.lock();
            if Arc::ptr_eq(&current, &snapshot) {
                let retired = std::mem::replace(&mut *current, next);
                drop(current);
                drop(retired);
                return true;
            }
        }
    }
}

impl std::fmt::Debug for EventCord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventCord")
            .field("key", &self.key)
            .field("listeners", &self.listener_count())
            .field("pass", &self.pass())
            .finish()
    }
}
