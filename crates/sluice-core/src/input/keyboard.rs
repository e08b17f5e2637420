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

//! Keyboard state: pressed keys, modifiers and character synthesis.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use crate::event::{keys, Modifiers};

#[derive(Debug, Default)]
struct KeyboardInner {
    pressed: HashSet<u32>,
    shift: bool,
    ctrl: bool,
    alt: bool,
}

impl KeyboardInner {
    fn modifiers(&self) -> Modifiers {
        let mut modifiers = Modifiers::empty();
        modifiers.set(Modifiers::SHIFT, self.shift);
        modifiers.set(Modifiers::CTRL, self.ctrl);
        modifiers.set(Modifiers::ALT, self.alt);
        modifiers
    }
}

/// Tracks which keys are held down.
#[derive(Debug, Default)]
pub struct KeyboardState {
    inner: Mutex<KeyboardInner>,
}

impl KeyboardState {
    /// Creates a state with no key held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a key transition and returns the modifiers for its event.
    ///
    /// [`Modifiers::FIRST`] is set on a press of a key that was not already
    /// held, and clear on autorepeat presses and on releases.
    pub fn key(&self, code: u32, down: bool) -> Modifiers {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let first = if down {
            inner.pressed.insert(code)
        } else {
            inner.pressed.remove(&code);
            false
        };

        match code {
            keys::SHIFT => inner.shift = down,
            keys::CTRL => inner.ctrl = down,
            keys::ALT => inner.alt = down,
            _ => {}
        }

        let mut modifiers = inner.modifiers();
        modifiers.set(Modifiers::FIRST, first);
        modifiers
    }

    /// Returns `true` if `code` is currently held.
    pub fn is_pressed(&self, code: u32) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pressed
            .contains(&code)
    }

    /// The modifier keys currently held.
    pub fn modifiers(&self) -> Modifiers {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .modifiers()
    }

    /// Forgets every held key, e.g. after the application loses focus.
    pub fn reset(&self) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = KeyboardInner::default();
    }
}

/// Derives the character a raw key code produces under `modifiers`.
///
/// Covers ASCII with a US layout: shift selects the upper-case letter or
/// shifted symbol, ctrl maps letters to control codes. Keys without a
/// character (arrows, function keys, bare modifiers) yield `'\0'`.
pub fn cook_character(code: u32, modifiers: Modifiers) -> char {
    if keys::is_control_key(code) {
        return '\0';
    }
    let Some(raw) = char::from_u32(code) else {
        return '\0';
    };
    if !raw.is_ascii() {
        return raw;
    }

    if modifiers.contains(Modifiers::CTRL) && raw.is_ascii_alphabetic() {
        let control = (raw.to_ascii_uppercase() as u8) & 0x1f;
        return char::from(control);
    }
    if modifiers.contains(Modifiers::SHIFT) {
        return shifted(raw);
    }
    raw
}

fn shifted(raw: char) -> char {
    match raw {
        'a'..='z' => raw.to_ascii_uppercase(),
        '1' => '!',
        '2' => '@',
        '3' => '#',
        '4' => '$',
        '5' => '%',
        '6' => '^',
        '7' => '&',
        '8' => '*',
        '9' => '(',
        '0' => ')',
        '-' => '_',
        '=' => '+',
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        ';' => ':',
        '\'' => '"',
        ',' => '<',
        '.' => '>',
        '/' => '?',
        '`' => '~',
        other => other,
    }
}
