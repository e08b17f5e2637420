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

//! Errors surfaced by the runtime.

use std::path::PathBuf;

use sluice_core::ConfigError;
use thiserror::Error;

/// Result alias for runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Everything that can go wrong while setting up or driving the pipeline.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for the configuration.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// The offending file.
        path: PathBuf,
        /// The parser error.
        #[source]
        source: serde_json::Error,
    },

    /// The configuration file parsed but breaks a pipeline invariant.
    #[error("invalid config file {path}: {source}")]
    Config {
        /// The offending file.
        path: PathBuf,
        /// What was wrong with it.
        #[source]
        source: ConfigError,
    },

    /// The driver was used after its pipeline shut down.
    #[error("the event pipeline has been shut down")]
    ShutDown,
}
