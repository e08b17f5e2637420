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

//! Well-known command codes and key codes.

use std::fmt;

/// The code carried by command and broadcast events.
///
/// Codes below [`CommandCode::USER_BASE`] are reserved for the engine;
/// applications define their own codes at or above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CommandCode(pub u32);

impl CommandCode {
    /// No command.
    pub const NOTHING: Self = Self(0);
    /// Leave the main loop for good. Never reset once seen.
    pub const QUIT: Self = Self(1);
    /// Leave the innermost main loop only.
    pub const QUIT_LOOP: Self = Self(2);
    /// The application gained (`info != 0`) or lost (`info == 0`) focus.
    pub const FOCUS_CHANGED: Self = Self(3);
    /// Sent once every driver has been opened.
    pub const SYSTEM_OPEN: Self = Self(4);
    /// Sent right before drivers start closing.
    pub const SYSTEM_CLOSE: Self = Self(5);
    /// A graphics context has been resized.
    pub const CONTEXT_RESIZE: Self = Self(6);
    /// A graphics context is being destroyed.
    pub const CONTEXT_CLOSE: Self = Self(7);
    /// Every handler should describe its command-line switches.
    pub const COMMAND_LINE_HELP: Self = Self(8);
    /// Per-frame hook sent before the queue is drained.
    pub const PRE_PROCESS: Self = Self(9);
    /// Per-frame hook sent after the queue is drained.
    pub const POST_PROCESS: Self = Self(10);

    /// First code available to applications.
    pub const USER_BASE: u32 = 0x8000_0000;

    /// Returns a code in the application range, `USER_BASE + offset`.
    pub const fn user(offset: u32) -> Self {
        Self(Self::USER_BASE.wrapping_add(offset))
    }

    /// Returns `true` if this code lies in the application range.
    pub const fn is_user(self) -> bool {
        self.0 >= Self::USER_BASE
    }

    fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::NOTHING => "Nothing",
            Self::QUIT => "Quit",
            Self::QUIT_LOOP => "QuitLoop",
            Self::FOCUS_CHANGED => "FocusChanged",
            Self::SYSTEM_OPEN => "SystemOpen",
            Self::SYSTEM_CLOSE => "SystemClose",
            Self::CONTEXT_RESIZE => "ContextResize",
            Self::CONTEXT_CLOSE => "ContextClose",
            Self::COMMAND_LINE_HELP => "CommandLineHelp",
            Self::PRE_PROCESS => "PreProcess",
            Self::POST_PROCESS => "PostProcess",
            _ => return None,
        })
    }
}

impl fmt::Display for CommandCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None if self.is_user() => write!(f, "User({:#x})", self.0 - Self::USER_BASE),
            None => write!(f, "Command({})", self.0),
        }
    }
}

/// Key codes for keys that do not produce a printable character.
///
/// Printable keys are identified by the character they emit with no
/// modifiers held (`'a'`, `'/'`, ...).
pub mod keys {
    /// Escape.
    pub const ESC: u32 = 27;
    /// Enter.
    pub const ENTER: u32 = '\n' as u32;
    /// Tab.
    pub const TAB: u32 = '\t' as u32;
    /// Backspace.
    pub const BACKSPACE: u32 = 8;
    /// Space bar.
    pub const SPACE: u32 = ' ' as u32;
    /// Arrow up.
    pub const UP: u32 = 1000;
    /// Arrow down.
    pub const DOWN: u32 = 1001;
    /// Arrow left.
    pub const LEFT: u32 = 1002;
    /// Arrow right.
    pub const RIGHT: u32 = 1003;
    /// Page up.
    pub const PGUP: u32 = 1004;
    /// Page down.
    pub const PGDN: u32 = 1005;
    /// Home.
    pub const HOME: u32 = 1006;
    /// End.
    pub const END: u32 = 1007;
    /// Insert.
    pub const INS: u32 = 1008;
    /// Delete.
    pub const DEL: u32 = 1009;
    /// Either control key.
    pub const CTRL: u32 = 1010;
    /// Either alt key.
    pub const ALT: u32 = 1011;
    /// Either shift key.
    pub const SHIFT: u32 = 1012;
    /// Function key F1; F2..F12 follow consecutively.
    pub const F1: u32 = 1013;
    /// Function key F12.
    pub const F12: u32 = 1024;
    /// Keypad centre ("5").
    pub const CENTER: u32 = 1025;
    /// Keypad plus.
    pub const PAD_PLUS: u32 = 1026;
    /// Keypad minus.
    pub const PAD_MINUS: u32 = 1027;
    /// Keypad multiply.
    pub const PAD_MULT: u32 = 1028;
    /// Keypad divide.
    pub const PAD_DIV: u32 = 1029;

    /// First non-character key code.
    pub const FIRST: u32 = UP;
    /// Last non-character key code.
    pub const LAST: u32 = PAD_DIV;

    /// Returns function key `Fn` for `n` in `1..=12`.
    pub const fn function(n: u32) -> Option<u32> {
        if n >= 1 && n <= 12 {
            Some(F1 + n - 1)
        } else {
            None
        }
    }

    /// Returns `true` for codes in the `FIRST..=LAST` range.
    pub const fn is_control_key(code: u32) -> bool {
        code >= FIRST && code <= LAST
    }
}
