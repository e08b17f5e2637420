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

//! Mouse state and double-click detection.

use std::sync::{Mutex, PoisonError};

use crate::config::MouseConfig;

/// Highest mouse button number. Buttons are numbered from 1; 0 means motion.
pub const MAX_MOUSE_BUTTONS: u32 = 10;

#[derive(Debug, Clone, Copy)]
struct Click {
    button: u32,
    timestamp: u64,
    x: i32,
    y: i32,
}

#[derive(Debug, Default)]
struct MouseInner {
    x: i32,
    y: i32,
    buttons: [bool; MAX_MOUSE_BUTTONS as usize],
    last_click: Option<Click>,
}

/// Pointer position, held buttons and the last click for double-click
/// detection.
#[derive(Debug)]
pub struct MouseState {
    config: MouseConfig,
    inner: Mutex<MouseInner>,
}

impl MouseState {
    /// Creates a state using `config` for double-click detection.
    pub fn new(config: MouseConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(MouseInner::default()),
        }
    }

    /// Records pointer motion.
    pub fn motion(&self, x: i32, y: i32) {
        let mut inner = self.lock();
        inner.x = x;
        inner.y = y;
    }

    /// Records a button transition at `(x, y)` and returns `true` if this
    /// press completes a double click.
    ///
    /// Two presses of the same button count as a double click when they are
    /// at most `double_click_time_ms` apart and within
    /// `double_click_distance` pixels on each axis. The click that completes
    /// a double click does not start a new one.
    ///
    /// `timestamp` is in microseconds. Buttons outside `1..=MAX_MOUSE_BUTTONS`
    /// are ignored.
    pub fn button(&self, button: u32, down: bool, x: i32, y: i32, timestamp: u64) -> bool {
        let Some(index) = button_index(button) else {
            return false;
        };

        let mut inner = self.lock();
        inner.x = x;
        inner.y = y;
        inner.buttons[index] = down;
        if !down {
            return false;
        }

        let window = self.config.double_click_time_ms.saturating_mul(1_000);
        let reach = u32::try_from(self.config.double_click_distance).unwrap_or(0);
        let double = inner.last_click.is_some_and(|last| {
            last.button == button
                && timestamp.saturating_sub(last.timestamp) <= window
                && x.abs_diff(last.x) <= reach
                && y.abs_diff(last.y) <= reach
        });

        inner.last_click = if double {
            None
        } else {
            Some(Click {
                button,
                timestamp,
                x,
                y,
            })
        };
        double
    }

    /// The last recorded pointer position.
    pub fn position(&self) -> (i32, i32) {
        let inner = self.lock();
        (inner.x, inner.y)
    }

    /// Returns `true` if `button` is held.
    pub fn is_pressed(&self, button: u32) -> bool {
        button_index(button).is_some_and(|index| self.lock().buttons[index])
    }

    /// Releases every button and forgets the last click. Keeps the position.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.buttons = [false; MAX_MOUSE_BUTTONS as usize];
        inner.last_click = None;
    }

    /// The double-click settings in use.
    pub fn config(&self) -> MouseConfig {
        self.config
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MouseInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MouseState {
    fn default() -> Self {
        Self::new(MouseConfig::default())
    }
}

/// Maps a 1-based button number to an array index.
pub(crate) fn button_index(button: u32) -> Option<usize> {
    if (1..=MAX_MOUSE_BUTTONS).contains(&button) {
        usize::try_from(button - 1).ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: u64 = 1_000;

    #[test]
    fn two_quick_presses_make_a_double_click() {
        let mouse = MouseState::default();
        assert!(!mouse.button(1, true, 10, 10, 0));
        assert!(!mouse.button(1, false, 10, 10, 50 * MS));
        assert!(mouse.button(1, true, 11, 9, 200 * MS));
    }

    #[test]
    fn slow_far_or_different_presses_do_not() {
        let mouse = MouseState::default();
        mouse.button(1, true, 0, 0, 0);
        assert!(!mouse.button(1, true, 0, 0, 301 * MS), "too slow");
        assert!(!mouse.button(1, true, 5, 0, 310 * MS), "too far");
        assert!(!mouse.button(2, true, 5, 0, 320 * MS), "other button");
    }

    #[test]
    fn presses_at_opposite_extremes_are_not_a_double_click() {
        let mouse = MouseState::default();
        assert!(!mouse.button(1, true, -10, 0, 0));
        assert!(!mouse.button(1, true, i32::MAX, 0, 10 * MS));
        assert!(!mouse.button(1, true, i32::MIN, i32::MAX, 20 * MS));
        assert!(!mouse.button(1, true, i32::MAX, i32::MIN, 30 * MS));
    }

    #[test]
    fn third_click_starts_over() {
        let mouse = MouseState::default();
        mouse.button(1, true, 0, 0, 0);
        assert!(mouse.button(1, true, 0, 0, 100 * MS));
        assert!(!mouse.button(1, true, 0, 0, 150 * MS));
        assert!(mouse.button(1, true, 0, 0, 200 * MS));
    }

    #[test]
    fn tracks_buttons_and_position() {
        let mouse = MouseState::default();
        mouse.motion(3, 4);
        assert_eq!(mouse.position(), (3, 4));
        mouse.button(2, true, 7, 8, 0);
        assert!(mouse.is_pressed(2));
        assert_eq!(mouse.position(), (7, 8));

        mouse.reset();
        assert!(!mouse.is_pressed(2));
        assert_eq!(mouse.position(), (7, 8));
    }

    #[test]
    fn out_of_range_buttons_are_ignored() {
        let mouse = MouseState::default();
        assert!(!mouse.button(0, true, 0, 0, 0));
        assert!(!mouse.button(MAX_MOUSE_BUTTONS + 1, true, 0, 0, 0));
        assert!(!mouse.is_pressed(0));
    }
}
