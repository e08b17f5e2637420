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

//! Joystick state.

use std::sync::{Mutex, PoisonError};

/// Number of joysticks tracked, numbered `0..MAX_JOYSTICKS`.
pub const MAX_JOYSTICKS: u32 = 2;
/// Buttons per joystick, numbered `1..=MAX_JOYSTICK_BUTTONS`.
pub const MAX_JOYSTICK_BUTTONS: u32 = 10;

#[derive(Debug, Default, Clone, Copy)]
struct Stick {
    x: i32,
    y: i32,
    buttons: [bool; MAX_JOYSTICK_BUTTONS as usize],
}

/// Axis positions and held buttons for every joystick.
#[derive(Debug, Default)]
pub struct JoystickState {
    sticks: Mutex<[Stick; MAX_JOYSTICKS as usize]>,
}

impl JoystickState {
    /// Creates a state with every stick centred and no button held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records axis motion. Returns `false` for an unknown joystick.
    pub fn motion(&self, number: u32, x: i32, y: i32) -> bool {
        let Some(stick) = stick_index(number) else {
            return false;
        };
        let mut sticks = self.lock();
        sticks[stick].x = x;
        sticks[stick].y = y;
        true
    }

    /// Records a button transition. Returns `false` for an unknown joystick
    /// or button.
    pub fn button(&self, number: u32, button: u32, down: bool, x: i32, y: i32) -> bool {
        let (Some(stick), Some(index)) = (stick_index(number), button_index(button)) else {
            return false;
        };
        let mut sticks = self.lock();
        let state = &mut sticks[stick];
        state.x = x;
        state.y = y;
        state.buttons[index] = down;
        true
    }

    /// The last recorded axis position of `number`.
    pub fn position(&self, number: u32) -> Option<(i32, i32)> {
        let stick = stick_index(number)?;
        let sticks = self.lock();
        Some((sticks[stick].x, sticks[stick].y))
    }

    /// Returns `true` if `button` is held on joystick `number`.
    pub fn is_pressed(&self, number: u32, button: u32) -> bool {
        match (stick_index(number), button_index(button)) {
            (Some(stick), Some(index)) => self.lock()[stick].buttons[index],
            _ => false,
        }
    }

    /// Releases every button on every joystick.
    pub fn reset(&self) {
        for stick in self.lock().iter_mut() {
            stick.buttons = [false; MAX_JOYSTICK_BUTTONS as usize];
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, [Stick; MAX_JOYSTICKS as usize]> {
        self.sticks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn stick_index(number: u32) -> Option<usize> {
    if number < MAX_JOYSTICKS {
        usize::try_from(number).ok()
    } else {
        None
    }
}

fn button_index(button: u32) -> Option<usize> {
    if (1..=MAX_JOYSTICK_BUTTONS).contains(&button) {
        usize::try_from(button - 1).ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_each_stick_separately() {
        let joystick = JoystickState::new();
        assert!(joystick.motion(0, 5, -5));
        assert!(joystick.button(1, 3, true, 1, 1));

        assert_eq!(joystick.position(0), Some((5, -5)));
        assert_eq!(joystick.position(1), Some((1, 1)));
        assert!(joystick.is_pressed(1, 3));
        assert!(!joystick.is_pressed(0, 3));
    }

    #[test]
    fn rejects_unknown_sticks_and_buttons() {
        let joystick = JoystickState::new();
        assert!(!joystick.motion(MAX_JOYSTICKS, 0, 0));
        assert!(!joystick.button(0, 0, true, 0, 0));
        assert!(!joystick.button(0, MAX_JOYSTICK_BUTTONS + 1, true, 0, 0));
        assert_eq!(joystick.position(MAX_JOYSTICKS), None);
    }

    #[test]
    fn reset_releases_buttons() {
        let joystick = JoystickState::new();
        joystick.button(0, 1, true, 0, 0);
        joystick.reset();
        assert!(!joystick.is_pressed(0, 1));
    }
}
