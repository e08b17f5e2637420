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

//! # Sluice Runtime
//!
//! The system driver that owns a [`sluice_core::EventPipeline`], drains it
//! once per frame and hands events to registered handlers.

#![warn(missing_docs)]

pub mod config;
pub mod driver;
pub mod error;
pub mod tap;

pub use config::{load_config, load_config_or_default, RuntimeConfig};
pub use driver::SystemDriver;
pub use error::{Result, RuntimeError};
pub use tap::EventTap;
