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

//! Runtime configuration and loading it from disk.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sluice_core::SluiceConfig;

use crate::error::{Result, RuntimeError};

/// Settings for the system driver.
///
/// The pipeline settings sit at the top level of the file next to the
/// driver's own:
///
/// ```json
/// { "queue": { "initial_capacity": 64 }, "frame_interval_ms": 16 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Queue, mouse and keyboard settings.
    #[serde(flatten)]
    pub pipeline: SluiceConfig,
    /// Minimum duration of a frame in [`SystemDriver::run`](crate::SystemDriver::run).
    /// Zero runs frames back to back.
    pub frame_interval_ms: u64,
}

impl RuntimeConfig {
    /// The frame interval as a [`Duration`], `None` when frames are unpaced.
    pub fn frame_interval(&self) -> Option<Duration> {
        (self.frame_interval_ms > 0).then(|| Duration::from_millis(self.frame_interval_ms))
    }
}

/// Reads, parses and validates a JSON configuration file.
///
/// Missing fields take their default values.
pub fn load_config(path: &Path) -> Result<RuntimeConfig> {
    let text = fs::read_to_string(path).map_err(|source| RuntimeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: RuntimeConfig =
        serde_json::from_str(&text).map_err(|source| RuntimeError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    config
        .pipeline
        .validate()
        .map_err(|source| RuntimeError::Config {
            path: path.to_path_buf(),
            source,
        })?;
    log::info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Loads `path` if given, otherwise returns the default configuration.
pub fn load_config_or_default(path: Option<&Path>) -> Result<RuntimeConfig> {
    match path {
        Some(path) => load_config(path),
        None => {
            log::debug!("No configuration file given, using defaults");
            Ok(RuntimeConfig::default())
        }
    }
}
