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

//! The event record and its closed set of payloads.

use std::fmt;

use super::codes::CommandCode;
use super::flags::{EventFlags, EventMask, Modifiers};

/// The closed set of event kinds. The discriminant is the kind code used as
/// the default cord category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum EventKind {
    /// Empty event, used for per-frame hooks.
    Nothing = 0,
    /// A key has been pressed.
    KeyDown = 1,
    /// A key has been released.
    KeyUp = 2,
    /// The pointer has moved.
    MouseMove = 3,
    /// A mouse button has been pressed.
    MouseDown = 4,
    /// A mouse button has been released.
    MouseUp = 5,
    /// A mouse button has been clicked twice.
    MouseDoubleClick = 6,
    /// A joystick axis has moved.
    JoystickMove = 7,
    /// A joystick button has been pressed.
    JoystickDown = 8,
    /// A joystick button has been released.
    JoystickUp = 9,
    /// A targeted command.
    Command = 10,
    /// A command addressed to every handler.
    Broadcast = 11,
}

impl EventKind {
    /// Every kind, in code order.
    pub const ALL: [EventKind; 12] = [
        EventKind::Nothing,
        EventKind::KeyDown,
        EventKind::KeyUp,
        EventKind::MouseMove,
        EventKind::MouseDown,
        EventKind::MouseUp,
        EventKind::MouseDoubleClick,
        EventKind::JoystickMove,
        EventKind::JoystickDown,
        EventKind::JoystickUp,
        EventKind::Command,
        EventKind::Broadcast,
    ];

    /// The numeric kind code.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Looks a kind up by its numeric code.
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.get(usize::try_from(code).ok()?).copied()
    }

    /// The single-bit mask for this kind.
    pub const fn mask(self) -> EventMask {
        EventMask::from_bits_retain(1 << self as u32)
    }
}

/// The payload of an event, keyed by its [`EventKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPayload {
    /// No payload (`Nothing` events).
    None,
    /// Keyboard payload.
    Key {
        /// Raw key code: the unshifted character, or one of [`keys`](super::keys).
        code: u32,
        /// The character after applying modifiers, `'\0'` if none.
        character: char,
        /// Modifier keys held at the time.
        modifiers: Modifiers,
    },
    /// Mouse payload. `button` is 0 for motion, otherwise `1..=MAX_BUTTONS`.
    Mouse {
        /// The button involved.
        button: u32,
        /// Pointer x coordinate.
        x: i32,
        /// Pointer y coordinate.
        y: i32,
        /// Modifier keys held at the time.
        modifiers: Modifiers,
    },
    /// Joystick payload. `button` is 0 for motion.
    Joystick {
        /// Joystick number.
        number: u32,
        /// The button involved.
        button: u32,
        /// X axis position.
        x: i32,
        /// Y axis position.
        y: i32,
        /// Modifier keys held at the time.
        modifiers: Modifiers,
    },
    /// Command or broadcast payload.
    Command {
        /// The command code.
        code: CommandCode,
        /// Opaque, pointer-sized argument. Never interpreted by the pipeline.
        info: isize,
    },
}

/// The two-level key used to look up an event cord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CordKey {
    /// Top-level category.
    pub category: u32,
    /// Sub-category within `category`.
    pub sub_category: u32,
}

impl CordKey {
    /// Creates a key.
    pub const fn new(category: u32, sub_category: u32) -> Self {
        Self {
            category,
            sub_category,
        }
    }
}

impl fmt::Display for CordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.category, self.sub_category)
    }
}

/// An immutable event record.
///
/// Events are built by an [`EventOutlet`](super::EventOutlet) when a
/// stimulus occurs and are owned by whichever container holds them next: a
/// cord dispatch, a queue slot, or the consumer that drained it.
///
/// The default cord key is derived from the payload: the category is the
/// kind code, the sub-category is 0 for keys, the button for mouse events,
/// the joystick number for joystick events and the command code for
/// command and broadcast events. [`Event::with_key`] overrides it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    kind: EventKind,
    key: CordKey,
    flags: EventFlags,
    timestamp: u64,
    payload: EventPayload,
}

impl Event {
    fn build(kind: EventKind, sub_category: u32, timestamp: u64, payload: EventPayload) -> Self {
        let flags = if kind == EventKind::Broadcast {
            EventFlags::BROADCAST
        } else {
            EventFlags::empty()
        };
        Self {
            kind,
            key: CordKey::new(kind.code(), sub_category),
            flags,
            timestamp,
            payload,
        }
    }

    /// An empty event.
    pub fn nothing(timestamp: u64) -> Self {
        Self::build(EventKind::Nothing, 0, timestamp, EventPayload::None)
    }

    /// A key press or release.
    pub fn key(timestamp: u64, code: u32, character: char, down: bool, modifiers: Modifiers) -> Self {
        let kind = if down { EventKind::KeyDown } else { EventKind::KeyUp };
        Self::build(
            kind,
            0,
            timestamp,
            EventPayload::Key {
                code,
                character,
                modifiers,
            },
        )
    }

    /// Pointer motion to `(x, y)`.
    pub fn mouse_move(timestamp: u64, x: i32, y: i32, modifiers: Modifiers) -> Self {
        Self::mouse(EventKind::MouseMove, timestamp, 0, x, y, modifiers)
    }

    /// A mouse button press or release at `(x, y)`.
    pub fn mouse_button(
        timestamp: u64,
        button: u32,
        down: bool,
        x: i32,
        y: i32,
        modifiers: Modifiers,
    ) -> Self {
        let kind = if down {
            EventKind::MouseDown
        } else {
            EventKind::MouseUp
        };
        Self::mouse(kind, timestamp, button, x, y, modifiers)
    }

    /// A double click of `button` at `(x, y)`.
    pub fn mouse_double_click(timestamp: u64, button: u32, x: i32, y: i32, modifiers: Modifiers) -> Self {
        Self::mouse(EventKind::MouseDoubleClick, timestamp, button, x, y, modifiers)
    }

    fn mouse(kind: EventKind, timestamp: u64, button: u32, x: i32, y: i32, modifiers: Modifiers) -> Self {
        Self::build(
            kind,
            button,
            timestamp,
            EventPayload::Mouse {
                button,
                x,
                y,
                modifiers,
            },
        )
    }

    /// Joystick axis motion.
    pub fn joystick_move(timestamp: u64, number: u32, x: i32, y: i32, modifiers: Modifiers) -> Self {
        Self::joystick(EventKind::JoystickMove, timestamp, number, 0, x, y, modifiers)
    }

    /// A joystick button press or release.
    pub fn joystick_button(
        timestamp: u64,
        number: u32,
        button: u32,
        down: bool,
        x: i32,
        y: i32,
        modifiers: Modifiers,
    ) -> Self {
        let kind = if down {
            EventKind::JoystickDown
        } else {
            EventKind::JoystickUp
        };
        Self::joystick(kind, timestamp, number, button, x, y, modifiers)
    }

    fn joystick(
        kind: EventKind,
        timestamp: u64,
        number: u32,
        button: u32,
        x: i32,
        y: i32,
        modifiers: Modifiers,
    ) -> Self {
        Self::build(
            kind,
            number,
            timestamp,
            EventPayload::Joystick {
                number,
                button,
                x,
                y,
                modifiers,
            },
        )
    }

    /// A targeted command.
    pub fn command(timestamp: u64, code: CommandCode, info: isize) -> Self {
        Self::build(
            EventKind::Command,
            code.0,
            timestamp,
            EventPayload::Command { code, info },
        )
    }

    /// A broadcast command. Carries [`EventFlags::BROADCAST`].
    pub fn broadcast(timestamp: u64, code: CommandCode, info: isize) -> Self {
        Self::build(
            EventKind::Broadcast,
            code.0,
            timestamp,
            EventPayload::Command { code, info },
        )
    }

    /// Returns the same event routed under a different cord key.
    pub fn with_key(mut self, category: u32, sub_category: u32) -> Self {
        self.key = CordKey::new(category, sub_category);
        self
    }

    /// The event kind.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// The cord category.
    pub fn category(&self) -> u32 {
        self.key.category
    }

    /// The cord sub-category.
    pub fn sub_category(&self) -> u32 {
        self.key.sub_category
    }

    /// The full cord key.
    pub fn cord_key(&self) -> CordKey {
        self.key
    }

    /// Per-event flags.
    pub fn flags(&self) -> EventFlags {
        self.flags
    }

    /// Returns `true` if handlers cannot stop this event's delivery.
    pub fn is_broadcast(&self) -> bool {
        self.flags.contains(EventFlags::BROADCAST)
    }

    /// Microseconds since the pipeline clock's epoch.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// The payload.
    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    /// The command code, for command and broadcast events.
    pub fn command_code(&self) -> Option<CommandCode> {
        match self.payload {
            EventPayload::Command { code, .. } => Some(code),
            _ => None,
        }
    }

    /// The command argument, for command and broadcast events.
    pub fn command_info(&self) -> Option<isize> {
        match self.payload {
            EventPayload::Command { info, .. } => Some(info),
            _ => None,
        }
    }

    /// The modifier keys, for input events.
    pub fn modifiers(&self) -> Modifiers {
        match self.payload {
            EventPayload::Key { modifiers, .. }
            | EventPayload::Mouse { modifiers, .. }
            | EventPayload::Joystick { modifiers, .. } => modifiers,
            EventPayload::None | EventPayload::Command { .. } => Modifiers::empty(),
        }
    }
}
