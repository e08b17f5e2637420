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

//! Events and the pipeline that carries them.
//!
//! Producers report stimuli through an [`EventOutlet`]. Each event is looked
//! up by its [`CordKey`]; a matching [`EventCord`] offers it to its listeners
//! in priority order and, unless they stop it or the cord's pass flag is
//! cleared, the event then lands in the general [`EventQueue`] where the
//! frame loop drains it.

mod codes;
mod cord;
mod flags;
mod listener;
mod outlet;
mod pipeline;
mod plug;
mod queue;
mod registry;
mod types;

pub use codes::{keys, CommandCode};
pub use cord::{EventCord, ListenerHandle};
pub use flags::{EventFlags, EventMask, Modifiers};
pub use listener::{EventListener, FnListener, Propagation};
pub use outlet::EventOutlet;
pub use pipeline::{Delivery, EventPipeline};
pub use plug::EventPlug;
pub use queue::{EventQueue, QueueStats};
pub use registry::CordRegistry;
pub use types::{CordKey, Event, EventKind, EventPayload};
