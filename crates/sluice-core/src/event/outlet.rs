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

//! The producer-facing facade of the pipeline.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use super::codes::CommandCode;
use super::flags::{EventMask, Modifiers};
use super::pipeline::{Delivery, EventPipeline};
use super::plug::EventPlug;
use super::types::{Event, EventKind};
use crate::input::{cook_character, MAX_MOUSE_BUTTONS};

struct Attachment {
    id: u64,
    plug: Arc<dyn EventPlug>,
    enabled: Arc<AtomicU32>,
}

/// Turns raw stimuli into [`Event`]s and routes them.
///
/// Every method timestamps the event with the pipeline clock, updates the
/// shared input state and then routes the event through its cord and into
/// the queue. Outlets are `Send + Sync` and may be used from any thread.
///
/// An outlet created for a plug only reports the kinds arbitration left
/// enabled for that plug; the rest are dropped. Dropping the outlet detaches
/// the plug.
pub struct EventOutlet {
    pipeline: Arc<EventPipeline>,
    attachment: Option<Attachment>,
}

impl EventOutlet {
    pub(crate) fn attached(
        pipeline: Arc<EventPipeline>,
        plug: Arc<dyn EventPlug>,
        id: u64,
        enabled: Arc<AtomicU32>,
    ) -> Self {
        Self {
            pipeline,
            attachment: Some(Attachment { id, plug, enabled }),
        }
    }

    pub(crate) fn system(pipeline: Arc<EventPipeline>) -> Self {
        Self {
            pipeline,
            attachment: None,
        }
    }

    /// Reports a key press or release.
    ///
    /// When `character` is `'\0'` and character synthesis is enabled, the
    /// cooked character is derived from `code` and the held modifiers.
    pub fn key(&self, code: u32, character: char, down: bool) -> Delivery {
        let kind = if down {
            EventKind::KeyDown
        } else {
            EventKind::KeyUp
        };
        if !self.reports(kind) {
            return Delivery::Dropped;
        }

        let modifiers = self.pipeline.input().keyboard.key(code, down);
        let character = if character == '\0' && self.pipeline.config().keyboard.synthesize_characters {
            cook_character(code, modifiers)
        } else {
            character
        };

        let event = Event::key(self.now(), code, character, down, modifiers);
        self.pipeline.route(event)
    }

    /// Reports mouse activity. Button 0 is pointer motion to `(x, y)`.
    ///
    /// A press that completes a double click is followed by a
    /// [`EventKind::MouseDoubleClick`] event. Returns the delivery of the
    /// press itself.
    pub fn mouse(&self, button: u32, down: bool, x: i32, y: i32) -> Delivery {
        let modifiers = self.modifiers();
        if button == 0 {
            if !self.reports(EventKind::MouseMove) {
                return Delivery::Dropped;
            }
            self.pipeline.input().mouse.motion(x, y);
            return self.pipeline.route(Event::mouse_move(self.now(), x, y, modifiers));
        }

        if button > MAX_MOUSE_BUTTONS {
            log::warn!("Ignoring mouse button {} (max {})", button, MAX_MOUSE_BUTTONS);
            return Delivery::Dropped;
        }
        let kind = if down {
            EventKind::MouseDown
        } else {
            EventKind::MouseUp
        };
        if !self.reports(kind) {
            return Delivery::Dropped;
        }

        let timestamp = self.now();
        let double = self
            .pipeline
            .input()
            .mouse
            .button(button, down, x, y, timestamp);
        let delivery = self.pipeline.route(Event::mouse_button(
            timestamp, button, down, x, y, modifiers,
        ));

        if double && self.reports(EventKind::MouseDoubleClick) {
            self.pipeline.route(Event::mouse_double_click(
                self.now(),
                button,
                x,
                y,
                modifiers,
            ));
        }
        delivery
    }

    /// Reports joystick activity. Button 0 is axis motion to `(x, y)`.
    pub fn joystick(&self, number: u32, button: u32, down: bool, x: i32, y: i32) -> Delivery {
        let modifiers = self.modifiers();
        let joystick = &self.pipeline.input().joystick;

        if button == 0 {
            if !self.reports(EventKind::JoystickMove) {
                return Delivery::Dropped;
            }
            if !joystick.motion(number, x, y) {
                log::warn!("Ignoring motion of unknown joystick {}", number);
                return Delivery::Dropped;
            }
            return self
                .pipeline
                .route(Event::joystick_move(self.now(), number, x, y, modifiers));
        }

        let kind = if down {
            EventKind::JoystickDown
        } else {
            EventKind::JoystickUp
        };
        if !self.reports(kind) {
            return Delivery::Dropped;
        }
        if !joystick.button(number, button, down, x, y) {
            log::warn!("Ignoring button {} of joystick {}", button, number);
            return Delivery::Dropped;
        }
        self.pipeline.route(Event::joystick_button(
            self.now(),
            number,
            button,
            down,
            x,
            y,
            modifiers,
        ))
    }

    /// Routes a targeted command.
    pub fn command(&self, code: CommandCode, info: isize) -> Delivery {
        if !self.reports(EventKind::Command) {
            return Delivery::Dropped;
        }
        self.pipeline.route(Event::command(self.now(), code, info))
    }

    /// Routes a broadcast to every interested handler.
    pub fn broadcast(&self, code: CommandCode, info: isize) -> Delivery {
        if !self.reports(EventKind::Broadcast) {
            return Delivery::Dropped;
        }
        self.pipeline.route(Event::broadcast(self.now(), code, info))
    }

    /// Delivers a broadcast synchronously to the immediate handler,
    /// bypassing cords and the queue. The event is fully processed when
    /// this returns.
    pub fn immediate_broadcast(&self, code: CommandCode, info: isize) -> bool {
        log::debug!("Immediate broadcast {}", code);
        let event = Event::broadcast(self.now(), code, info);
        self.pipeline.dispatch_immediate(&event)
    }

    /// Routes a prebuilt event, e.g. one carrying a custom cord key.
    pub fn post(&self, event: Event) -> Delivery {
        if !self.reports(event.kind()) {
            return Delivery::Dropped;
        }
        self.pipeline.route(event)
    }

    /// A fresh timestamp from the pipeline clock, for prebuilt events.
    pub fn now(&self) -> u64 {
        self.pipeline.clock().now()
    }

    /// The kinds this outlet currently reports.
    pub fn enabled_events(&self) -> EventMask {
        match &self.attachment {
            Some(attachment) => {
                EventMask::from_bits_retain(attachment.enabled.load(Ordering::Acquire))
            }
            None => EventMask::all(),
        }
    }

    /// The plug this outlet reports for, if any.
    pub fn plug(&self) -> Option<&Arc<dyn EventPlug>> {
        self.attachment.as_ref().map(|attachment| &attachment.plug)
    }

    /// The pipeline this outlet feeds.
    pub fn pipeline(&self) -> &Arc<EventPipeline> {
        &self.pipeline
    }

    fn reports(&self, kind: EventKind) -> bool {
        let enabled = self.enabled_events().contains(kind.mask());
        if !enabled {
            log::trace!("Outlet drops disabled {:?}", kind);
        }
        enabled
    }

    fn modifiers(&self) -> Modifiers {
        self.pipeline.input().keyboard.modifiers()
    }
}

impl Drop for EventOutlet {
    fn drop(&mut self) {
        if let Some(attachment) = &self.attachment {
            self.pipeline.detach_plug(attachment.id);
        }
    }
}

impl std::fmt::Debug for EventOutlet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventOutlet")
            .field("plug", &self.plug().map(|plug| plug.name()))
            .field("enabled", &self.enabled_events())
            .finish()
    }
}
