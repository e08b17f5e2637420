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

//! Event plugs and the arbitration between plugs that report the same kind.
//!
//! Two drivers may both be able to produce, say, keyboard events (a native
//! window and a remote console). Each plug declares which kinds it considers
//! conflicting and a priority per kind; for every conflicting kind only the
//! plug with the highest priority keeps it enabled. Equal priorities favour
//! the plug registered first.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use super::flags::EventMask;
use super::types::EventKind;

/// A source of events attached to the pipeline through an
/// [`EventOutlet`](super::EventOutlet).
pub trait EventPlug: Send + Sync {
    /// A human-readable name used in log messages.
    fn name(&self) -> &str;

    /// Kinds this plug produces that another plug may also produce.
    fn conflicting_events(&self) -> EventMask {
        EventMask::empty()
    }

    /// The plug's claim on `kind`; higher wins.
    fn event_priority(&self, _kind: EventKind) -> u32 {
        0
    }

    /// Called when arbitration enables or disables kinds for this plug.
    fn enable_events(&self, _events: EventMask, _enable: bool) {}
}

/// An enable/disable notification owed to a plug.
pub(crate) struct PlugNotice {
    plug: Arc<dyn EventPlug>,
    events: EventMask,
    enable: bool,
}

impl PlugNotice {
    /// Delivers the notification. Call without holding the board lock.
    pub(crate) fn deliver(self) {
        log::debug!(
            "{} {:?} for plug '{}'",
            if self.enable { "Enabling" } else { "Disabling" },
            self.events,
            self.plug.name()
        );
        self.plug.enable_events(self.events, self.enable);
    }
}

struct PlugSlot {
    id: u64,
    plug: Arc<dyn EventPlug>,
    enabled: Arc<AtomicU32>,
}

/// The set of plugs attached to a pipeline.
#[derive(Default)]
pub(crate) struct PlugBoard {
    next_id: u64,
    slots: Vec<PlugSlot>,
}

impl PlugBoard {
    /// Adds `plug` and rearbitrates. Returns its id, the mask its outlet
    /// reads, and the notifications to deliver.
    pub(crate) fn attach(
        &mut self,
        plug: Arc<dyn EventPlug>,
    ) -> (u64, Arc<AtomicU32>, Vec<PlugNotice>) {
        let id = self.next_id;
        self.next_id += 1;
        let enabled = Arc::new(AtomicU32::new(EventMask::all().bits()));
        log::debug!("Attaching plug '{}' as #{}", plug.name(), id);
        self.slots.push(PlugSlot {
            id,
            plug,
            enabled: Arc::clone(&enabled),
        });
        let notices = self.arbitrate();
        (id, enabled, notices)
    }

    /// Removes plug `id` and rearbitrates so the runner-up takes over.
    pub(crate) fn detach(&mut self, id: u64) -> Vec<PlugNotice> {
        let before = self.slots.len();
        self.slots.retain(|slot| slot.id != id);
        if self.slots.len() == before {
            return Vec::new();
        }
        log::debug!("Detached plug #{}", id);
        self.arbitrate()
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Recomputes every plug's enabled mask.
    fn arbitrate(&mut self) -> Vec<PlugNotice> {
        let mut winners = Vec::with_capacity(EventKind::ALL.len());
        for kind in EventKind::ALL {
            let mut best: Option<(u64, u32)> = None;
            for slot in &self.slots {
                if !slot.plug.conflicting_events().contains(kind.mask()) {
                    continue;
                }
                let priority = slot.plug.event_priority(kind);
                if best.map_or(true, |(_, top)| priority > top) {
                    best = Some((slot.id, priority));
                }
            }
            winners.push(best.map(|(id, _)| id));
        }

        let mut notices = Vec::new();
        for slot in &self.slots {
            let conflicting = slot.plug.conflicting_events();
            let mut mask = EventMask::all();
            for (kind, winner) in EventKind::ALL.iter().zip(&winners) {
                if conflicting.contains(kind.mask()) && *winner != Some(slot.id) {
                    mask.remove(kind.mask());
                }
            }

            let previous = EventMask::from_bits_retain(slot.enabled.swap(mask.bits(), Ordering::AcqRel));
            let lost = previous - mask;
            let gained = mask - previous;
            if !lost.is_empty() {
                notices.push(PlugNotice {
                    plug: Arc::clone(&slot.plug),
                    events: lost,
                    enable: false,
                });
            }
            if !gained.is_empty() {
                notices.push(PlugNotice {
                    plug: Arc::clone(&slot.plug),
                    events: gained,
                    enable: true,
                });
            }
        }
        notices
    }
}

impl std::fmt::Debug for PlugBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.slots.iter().map(|slot| (slot.id, slot.plug.name())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct TestPlug {
        name: &'static str,
        conflicts: EventMask,
        priority: u32,
        log: Mutex<Vec<(EventMask, bool)>>,
    }

    impl TestPlug {
        fn new(name: &'static str, conflicts: EventMask, priority: u32) -> Arc<Self> {
            Arc::new(Self {
                name,
                conflicts,
                priority,
                log: Mutex::new(Vec::new()),
            })
        }
    }

    impl EventPlug for TestPlug {
        fn name(&self) -> &str {
            self.name
        }
        fn conflicting_events(&self) -> EventMask {
            self.conflicts
        }
        fn event_priority(&self, _kind: EventKind) -> u32 {
            self.priority
        }
        fn enable_events(&self, events: EventMask, enable: bool) {
            self.log.lock().unwrap().push((events, enable));
        }
    }

    fn mask(enabled: &AtomicU32) -> EventMask {
        EventMask::from_bits_retain(enabled.load(Ordering::Acquire))
    }

    #[test]
    fn higher_priority_plug_wins_conflicting_kinds() {
        let mut board = PlugBoard::default();
        let low = TestPlug::new("low", EventMask::KEYBOARD, 10);
        let high = TestPlug::new("high", EventMask::KEYBOARD, 100);

        let (_, low_mask, notices) = board.attach(low.clone());
        notices.into_iter().for_each(PlugNotice::deliver);
        assert!(mask(&low_mask).contains(EventMask::KEYBOARD));

        let (_, high_mask, notices) = board.attach(high.clone());
        notices.into_iter().for_each(PlugNotice::deliver);
        assert!(mask(&high_mask).contains(EventMask::KEYBOARD));
        assert!(!mask(&low_mask).intersects(EventMask::KEYBOARD));
        assert!(mask(&low_mask).contains(EventMask::MOUSE));
        assert_eq!(*low.log.lock().unwrap(), vec![(EventMask::KEYBOARD, false)]);
    }

    #[test]
    fn detaching_the_winner_reenables_the_runner_up() {
        let mut board = PlugBoard::default();
        let low = TestPlug::new("low", EventMask::MOUSE, 1);
        let high = TestPlug::new("high", EventMask::MOUSE, 2);
        let (_, low_mask, _) = board.attach(low.clone());
        let (high_id, _, notices) = board.attach(high);
        notices.into_iter().for_each(PlugNotice::deliver);

        board.detach(high_id).into_iter().for_each(PlugNotice::deliver);
        assert!(mask(&low_mask).contains(EventMask::MOUSE));
        assert_eq!(
            *low.log.lock().unwrap(),
            vec![(EventMask::MOUSE, false), (EventMask::MOUSE, true)]
        );
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn ties_favour_the_first_plug() {
        let mut board = PlugBoard::default();
        let (_, first, _) = board.attach(TestPlug::new("a", EventMask::JOYSTICK, 5));
        let (_, second, _) = board.attach(TestPlug::new("b", EventMask::JOYSTICK, 5));
        assert!(mask(&first).contains(EventMask::JOYSTICK));
        assert!(!mask(&second).intersects(EventMask::JOYSTICK));
    }

    #[test]
    fn non_conflicting_plugs_keep_everything() {
        let mut board = PlugBoard::default();
        let (_, quiet, notices) = board.attach(TestPlug::new("quiet", EventMask::empty(), 0));
        assert!(notices.is_empty());
        board.attach(TestPlug::new("loud", EventMask::all(), 9));
        assert_eq!(mask(&quiet), EventMask::all());
    }
}
