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

//! The process-wide event pipeline: queue, cords, clock and input state.

use std::sync::atomic::{fence, AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};

use super::cord::EventCord;
use super::listener::EventListener;
use super::outlet::EventOutlet;
use super::plug::{EventPlug, PlugBoard, PlugNotice};
use super::queue::{EventQueue, QueueStats};
use super::registry::CordRegistry;
use super::types::Event;
use crate::config::SluiceConfig;
use crate::input::InputState;
use crate::time::Clock;

/// Where [`EventPipeline::route`] delivered an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The event went to the general queue.
    Queued,
    /// A cord intercepted the event and kept it out of the queue.
    Intercepted,
    /// The pipeline is shut down; the event was dropped.
    Dropped,
}

/// Owns every piece of shared event state for one process.
///
/// Producers talk to it through [`EventOutlet`]s; the frame loop drains it
/// with [`EventPipeline::next_event`]. The pipeline is shared behind an
/// [`Arc`] and created once at startup.
///
/// Teardown order is explicit: [`EventPipeline::shutdown`] tears down the
/// cord registry first, so no listener can observe an event after the queue
/// has been cleared.
pub struct EventPipeline {
    config: SluiceConfig,
    queue: EventQueue<Event>,
    cords: CordRegistry,
    clock: Clock,
    input: InputState,
    immediate: RwLock<Option<Weak<dyn EventListener>>>,
    plugs: Mutex<PlugBoard>,
    shut_down: AtomicBool,
}

impl EventPipeline {
    /// Creates a pipeline. `config` is assumed valid, see
    /// [`SluiceConfig::validate`].
    pub fn new(config: SluiceConfig) -> Arc<Self> {
        log::info!(
            "Creating event pipeline (queue capacity {}, growth {:?})",
            config.queue.initial_capacity,
            config.queue.growth
        );
        Arc::new(Self {
            config,
            queue: EventQueue::with_config(config.queue),
            cords: CordRegistry::new(),
            clock: Clock::new(),
            input: InputState::new(config.mouse),
            immediate: RwLock::new(None),
            plugs: Mutex::new(PlugBoard::default()),
            shut_down: AtomicBool::new(false),
        })
    }

    /// Attaches `plug` and returns the outlet it should report through.
    ///
    /// Kind arbitration against the other attached plugs runs immediately;
    /// dropping the outlet detaches the plug again.
    pub fn create_outlet(self: &Arc<Self>, plug: Arc<dyn EventPlug>) -> EventOutlet {
        let (id, enabled, notices) = self.plug_board().attach(Arc::clone(&plug));
        notices.into_iter().for_each(PlugNotice::deliver);
        EventOutlet::attached(Arc::clone(self), plug, id, enabled)
    }

    /// An outlet for system-generated events. It is never filtered by plug
    /// arbitration.
    pub fn system_outlet(self: &Arc<Self>) -> EventOutlet {
        EventOutlet::system(Arc::clone(self))
    }

    pub(crate) fn detach_plug(&self, id: u64) {
        let notices = self.plug_board().detach(id);
        notices.into_iter().for_each(PlugNotice::deliver);
    }

    /// Number of attached plugs.
    pub fn plug_count(&self) -> usize {
        self.plug_board().len()
    }

    fn plug_board(&self) -> MutexGuard<'_, PlugBoard> {
        self.plugs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Routes `event` through its cord, if any, and into the queue.
    ///
    /// A missing cord is pass-through. Listeners run on the calling thread,
    /// outside every pipeline lock.
    pub fn route(&self, event: Event) -> Delivery {
        if self.is_shut_down() {
            log::trace!("Pipeline shut down, dropping {:?}", event.kind());
            return Delivery::Dropped;
        }

        let forward = match self.cords.find(event.cord_key()) {
            Some(cord) => cord.dispatch(&event),
            None => true,
        };

        if !forward {
            return Delivery::Intercepted;
        }

        self.queue.put(event);
        // Pairs with the fence in `shutdown`: either its clear sees this
        // event, or this load sees the flag.
        fence(Ordering::SeqCst);
        if self.is_shut_down() {
            self.queue.clear();
            return Delivery::Dropped;
        }
        Delivery::Queued
    }

    /// Hands `event` straight to the immediate handler, bypassing cords and
    /// the queue. Returns `true` if the handler asked to stop propagation.
    pub fn dispatch_immediate(&self, event: &Event) -> bool {
        let handler = self
            .immediate
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(Weak::upgrade);

        match handler {
            Some(handler) => handler.handle_event(event).is_stop(),
            None => {
                log::warn!(
                    "No immediate handler installed, {:?} {:?} not delivered",
                    event.kind(),
                    event.command_code()
                );
                false
            }
        }
    }

    /// Installs the process-wide handler used by immediate dispatch.
    ///
    /// Only a weak reference is kept; the owner stays responsible for the
    /// handler's lifetime.
    pub fn set_immediate_handler(&self, handler: &Arc<dyn EventListener>) {
        log::debug!("Installing immediate handler '{}'", handler.name());
        *self
            .immediate
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::downgrade(handler));
    }

    /// Removes the immediate handler.
    pub fn clear_immediate_handler(&self) {
        *self
            .immediate
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Returns the cord for `(category, sub_category)`, creating it if
    /// needed. Components register their listeners on it.
    pub fn intercept(&self, category: u32, sub_category: u32) -> Arc<EventCord> {
        self.cords.get_or_create(category, sub_category)
    }

    /// Takes the oldest queued event.
    pub fn next_event(&self) -> Option<Event> {
        self.queue.get()
    }

    /// Tears the pipeline down: cords first, then the queue.
    ///
    /// Routing after shutdown drops events. Calling this twice is harmless.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        fence(Ordering::SeqCst);
        self.clear_immediate_handler();
        let cords = self.cords.clear();
        let events = self.queue.clear();
        log::info!(
            "Event pipeline shut down ({} cords removed, {} pending events dropped)",
            cords,
            events
        );
    }

    /// Returns `true` once [`EventPipeline::shutdown`] has run.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    /// The configuration the pipeline was built with.
    pub fn config(&self) -> &SluiceConfig {
        &self.config
    }

    /// The general event queue.
    pub fn queue(&self) -> &EventQueue<Event> {
        &self.queue
    }

    /// Queue counters.
    pub fn queue_stats(&self) -> QueueStats {
        self.queue.stats()
    }

    /// The cord registry.
    pub fn cords(&self) -> &CordRegistry {
        &self.cords
    }

    /// The event clock.
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Keyboard, mouse and joystick state.
    pub fn input(&self) -> &InputState {
        &self.input
    }
}

impl std::fmt::Debug for EventPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventPipeline")
            .field("queue", &self.queue)
            .field("cords", &self.cords.len())
            .field("plugs", &self.plug_count())
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}
