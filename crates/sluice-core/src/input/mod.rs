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

//! Input device state shared by the outlets that report input events.
//!
//! Outlets update this state before building an event so that modifiers,
//! autorepeat detection and double clicks are derived consistently no matter
//! which plug reported the stimulus.

mod joystick;
mod keyboard;
mod mouse;

pub use joystick::{JoystickState, MAX_JOYSTICKS, MAX_JOYSTICK_BUTTONS};
pub use keyboard::{cook_character, KeyboardState};
pub use mouse::{MouseState, MAX_MOUSE_BUTTONS};

use crate::config::MouseConfig;

/// Keyboard, mouse and joystick state for one pipeline.
#[derive(Debug, Default)]
pub struct InputState {
    /// Keyboard state.
    pub keyboard: KeyboardState,
    /// Mouse state.
    pub mouse: MouseState,
    /// Joystick state.
    pub joystick: JoystickState,
}

impl InputState {
    /// Creates input state with the given mouse settings.
    pub fn new(mouse: MouseConfig) -> Self {
        Self {
            keyboard: KeyboardState::new(),
            mouse: MouseState::new(mouse),
            joystick: JoystickState::new(),
        }
    }

    /// Releases every key and button on every device.
    pub fn reset(&self) {
        log::debug!("Resetting input state");
        self.keyboard.reset();
        self.mouse.reset();
        self.joystick.reset();
    }
}
