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

//! Bit sets describing event kinds, per-event flags and modifier keys.

use bitflags::bitflags;

bitflags! {
    /// A set of [`EventKind`](super::EventKind)s, one bit per kind.
    ///
    /// Handlers registered with the system driver declare the kinds they
    /// want to receive with a mask. Registering for [`EventMask::NOTHING`]
    /// has a special meaning: the handler is called once before and once
    /// after the queue is drained on every frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EventMask: u32 {
        /// Per-frame pre/post processing.
        const NOTHING            = 1 << 0;
        /// Key presses.
        const KEY_DOWN           = 1 << 1;
        /// Key releases.
        const KEY_UP             = 1 << 2;
        /// Pointer motion.
        const MOUSE_MOVE         = 1 << 3;
        /// Mouse button presses.
        const MOUSE_DOWN         = 1 << 4;
        /// Mouse button releases.
        const MOUSE_UP           = 1 << 5;
        /// Two presses of the same button in quick succession.
        const MOUSE_DOUBLE_CLICK = 1 << 6;
        /// Joystick axis motion.
        const JOYSTICK_MOVE      = 1 << 7;
        /// Joystick button presses.
        const JOYSTICK_DOWN      = 1 << 8;
        /// Joystick button releases.
        const JOYSTICK_UP        = 1 << 9;
        /// Targeted commands.
        const COMMAND            = 1 << 10;
        /// Commands addressed to every handler.
        const BROADCAST          = 1 << 11;

        /// Any keyboard event.
        const KEYBOARD = Self::KEY_DOWN.bits() | Self::KEY_UP.bits();
        /// Any mouse event.
        const MOUSE = Self::MOUSE_MOVE.bits()
            | Self::MOUSE_DOWN.bits()
            | Self::MOUSE_UP.bits()
            | Self::MOUSE_DOUBLE_CLICK.bits();
        /// Any joystick event.
        const JOYSTICK = Self::JOYSTICK_MOVE.bits()
            | Self::JOYSTICK_DOWN.bits()
            | Self::JOYSTICK_UP.bits();
        /// Any input device event.
        const INPUT = Self::KEYBOARD.bits() | Self::MOUSE.bits() | Self::JOYSTICK.bits();
    }
}

bitflags! {
    /// Miscellaneous per-event properties.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EventFlags: u32 {
        /// Delivery cannot be stopped by a handler returning
        /// [`Propagation::Stop`](super::Propagation::Stop).
        const BROADCAST = 0x0000_0001;
    }
}

bitflags! {
    /// Modifier keys held down when an input event occurred.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u32 {
        /// Either shift key.
        const SHIFT = 0x0000_0001;
        /// Either control key.
        const CTRL  = 0x0000_0002;
        /// Either alt key.
        const ALT   = 0x0000_0004;
        /// All three shift-like keys.
        const ALL_SHIFTS = Self::SHIFT.bits() | Self::CTRL.bits() | Self::ALT.bits();
        /// The key went down for the first time (not an autorepeat).
        const FIRST = 0x8000_0000;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_masks_cover_their_members() {
        assert!(EventMask::INPUT.contains(EventMask::MOUSE_DOUBLE_CLICK));
        assert!(EventMask::INPUT.contains(EventMask::JOYSTICK_UP));
        assert!(!EventMask::INPUT.contains(EventMask::BROADCAST));
        assert_eq!(EventMask::KEYBOARD.bits(), 0b110);
    }

    #[test]
    fn all_shifts_excludes_first_flag() {
        let held = Modifiers::SHIFT | Modifiers::FIRST;
        assert_eq!(held & Modifiers::ALL_SHIFTS, Modifiers::SHIFT);
    }
}
