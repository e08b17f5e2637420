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

//! # Sluice Core
//!
//! The concurrency core of an in-process event pipeline: atomic primitives,
//! a spin lock, a growable FIFO event queue and priority-ordered event cords
//! that let listeners intercept events before they reach the queue.

#![warn(missing_docs)]

pub mod config;
pub mod event;
pub mod input;
pub mod sync;
pub mod time;

pub use config::{ConfigError, SluiceConfig};
pub use event::{Event, EventOutlet, EventPipeline};
