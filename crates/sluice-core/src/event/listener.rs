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

//! The listener contract shared by cords, outlets and the system driver.

use super::types::Event;

/// What a listener wants to happen after it has seen an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Propagation {
    /// Let lower-priority listeners (and possibly the queue) see the event.
    #[default]
    Continue,
    /// The event is handled; suppress further delivery.
    ///
    /// Ignored for broadcast events, which always reach every listener.
    Stop,
}

impl Propagation {
    /// Returns `true` for [`Propagation::Stop`].
    pub fn is_stop(self) -> bool {
        self == Propagation::Stop
    }
}

/// A component that wants to see events.
///
/// Implementations are invoked from whatever thread routes or drains the
/// event, and never while any pipeline lock is held, so they may freely
/// post new events.
pub trait EventListener: Send + Sync {
    /// Handles one event.
    fn handle_event(&self, event: &Event) -> Propagation;

    /// A human-readable name used in log messages.
    fn name(&self) -> &str {
        "anonymous"
    }
}

/// Adapts a closure into an [`EventListener`].
pub struct FnListener<F> {
    name: String,
    f: F,
}

impl<F> FnListener<F>
where
    F: Fn(&Event) -> Propagation + Send + Sync,
{
    /// Wraps `f` under the given name.
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> EventListener for FnListener<F>
where
    F: Fn(&Event) -> Propagation + Send + Sync,
{
    fn handle_event(&self, event: &Event) -> Propagation {
        (self.f)(event)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<F> std::fmt::Debug for FnListener<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnListener").field("name", &self.name).finish()
    }
}
