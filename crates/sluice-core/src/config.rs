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

//! Configuration for the event pipeline.
//!
//! All structs deserialise with `#[serde(default)]`, so a configuration file
//! only needs to mention the values it changes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Smallest queue capacity that can hold an element while keeping one slot
/// free to tell "full" from "empty".
pub const MIN_QUEUE_CAPACITY: usize = 2;

/// How the event queue grows when a `put` finds it full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthPolicy {
    /// Double the capacity.
    #[default]
    Double,
    /// Add a fixed number of slots. Must be at least 1.
    Fixed(usize),
}

impl GrowthPolicy {
    /// Returns the capacity that follows `capacity`. Always strictly larger.
    pub fn next_capacity(self, capacity: usize) -> usize {
        let grown = match self {
            GrowthPolicy::Double => capacity.saturating_mul(2),
            GrowthPolicy::Fixed(step) => capacity.saturating_add(step),
        };
        grown.max(capacity.saturating_add(1))
    }
}

/// Event queue sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Number of slots allocated up front. At least [`MIN_QUEUE_CAPACITY`].
    pub initial_capacity: usize,
    /// Growth applied on overflow.
    pub growth: GrowthPolicy,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 256,
            growth: GrowthPolicy::Double,
        }
    }
}

/// Mouse driver tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MouseConfig {
    /// Maximum delay between two presses to count as a double click.
    pub double_click_time_ms: u64,
    /// Maximum pointer travel (per axis) between the two presses.
    pub double_click_distance: i32,
}

impl Default for MouseConfig {
    fn default() -> Self {
        Self {
            double_click_time_ms: 300,
            double_click_distance: 2,
        }
    }
}

/// Keyboard driver tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardConfig {
    /// Synthesize a cooked character when a producer passes `'\0'`.
    pub synthesize_characters: bool,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            synthesize_characters: true,
        }
    }
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SluiceConfig {
    /// Event queue sizing.
    pub queue: QueueConfig,
    /// Mouse driver tuning.
    pub mouse: MouseConfig,
    /// Keyboard driver tuning.
    pub keyboard: KeyboardConfig,
}

impl SluiceConfig {
    /// Parses a JSON document and validates the result.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants the pipeline relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue.initial_capacity < MIN_QUEUE_CAPACITY {
            return Err(ConfigError::CapacityTooSmall {
                requested: self.queue.initial_capacity,
            });
        }
        if self.queue.growth == GrowthPolicy::Fixed(0) {
            return Err(ConfigError::ZeroGrowth);
        }
        if self.mouse.double_click_distance < 0 {
            return Err(ConfigError::NegativeDistance(
                self.mouse.double_click_distance,
            ));
        }
        Ok(())
    }
}

/// An invalid or unreadable configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The document is not valid JSON for [`SluiceConfig`].
    Parse(String),
    /// The queue could never hold an element.
    CapacityTooSmall {
        /// The configured capacity.
        requested: usize,
    },
    /// A fixed growth step of zero would never make room.
    ZeroGrowth,
    /// The double-click distance is negative.
    NegativeDistance(i32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(details) => write!(f, "Invalid configuration: {details}"),
            ConfigError::CapacityTooSmall { requested } => write!(
                f,
                "Queue capacity {requested} is below the minimum of {MIN_QUEUE_CAPACITY}"
            ),
            ConfigError::ZeroGrowth => write!(f, "Queue growth step must be at least 1"),
            ConfigError::NegativeDistance(distance) => {
                write!(f, "Double-click distance {distance} must not be negative")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SluiceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.queue.initial_capacity, 256);
        assert_eq!(config.mouse.double_click_time_ms, 300);
        assert_eq!(config.mouse.double_click_distance, 2);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            SluiceConfig::from_json_str(r#"{ "queue": { "growth": { "fixed": 8 } } }"#).unwrap();
        assert_eq!(config.queue.growth, GrowthPolicy::Fixed(8));
        assert_eq!(config.queue.initial_capacity, 256);
        assert_eq!(config.mouse, MouseConfig::default());
    }

    #[test]
    fn rejects_unusable_queue_settings() {
        let err = SluiceConfig::from_json_str(r#"{ "queue": { "initial_capacity": 1 } }"#)
            .unwrap_err();
        assert_eq!(err, ConfigError::CapacityTooSmall { requested: 1 });

        let err = SluiceConfig::from_json_str(r#"{ "queue": { "growth": { "fixed": 0 } } }"#)
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroGrowth);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = SluiceConfig::from_json_str("{ queue").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn growth_always_makes_progress() {
        assert_eq!(GrowthPolicy::Double.next_capacity(2), 4);
        assert_eq!(GrowthPolicy::Fixed(3).next_capacity(2), 5);
        assert_eq!(GrowthPolicy::Fixed(0).next_capacity(2), 3);
        assert_eq!(GrowthPolicy::Double.next_capacity(0), 1);
    }
}
