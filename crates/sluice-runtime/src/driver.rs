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

//! The system driver: owns the pipeline and runs the frame loop.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread;
use std::time::Instant;

use sluice_core::event::{
    CommandCode, EventKind, EventListener, EventMask, EventPlug, Propagation,
};
use sluice_core::{Event, EventOutlet, EventPipeline};

use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};

struct Handler {
    listener: Arc<dyn EventListener>,
    mask: EventMask,
}

/// Drives the event pipeline one frame at a time.
///
/// Each frame sends a [`CommandCode::PRE_PROCESS`] broadcast to handlers
/// that asked for [`EventMask::NOTHING`], drains the queue through
/// [`SystemDriver::handle_event`], then sends [`CommandCode::POST_PROCESS`].
///
/// The driver installs itself as the pipeline's immediate handler, so
/// [`EventOutlet::immediate_broadcast`] is processed before it returns.
pub struct SystemDriver {
    config: RuntimeConfig,
    pipeline: Arc<EventPipeline>,
    outlet: EventOutlet,
    handlers: RwLock<Vec<Handler>>,
    opened: AtomicBool,
    shutdown: AtomicBool,
    exit_loop: AtomicBool,
    frames: AtomicU64,
}

impl SystemDriver {
    /// Builds the pipeline from `config` and a driver around it.
    pub fn new(config: RuntimeConfig) -> Arc<Self> {
        let pipeline = EventPipeline::new(config.pipeline);
        let outlet = pipeline.system_outlet();
        let driver = Arc::new(Self {
            config,
            pipeline,
            outlet,
            handlers: RwLock::new(Vec::new()),
            opened: AtomicBool::new(false),
            shutdown: AtomicBool::new(false),
            exit_loop: AtomicBool::new(false),
            frames: AtomicU64::new(0),
        });

        let immediate: Arc<dyn EventListener> = driver.clone();
        driver.pipeline.set_immediate_handler(&immediate);
        driver
    }

    /// Registers `handler` for the event kinds in `mask`.
    ///
    /// Handlers run in registration order. Registering the same handler
    /// again replaces its mask.
    pub fn register_handler(&self, handler: Arc<dyn EventListener>, mask: EventMask) {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = handlers
            .iter_mut()
            .find(|entry| Arc::ptr_eq(&entry.listener, &handler))
        {
            log::debug!("Handler '{}' now listens to {:?}", handler.name(), mask);
            existing.mask = mask;
            return;
        }
        log::debug!("Registered handler '{}' for {:?}", handler.name(), mask);
        handlers.push(Handler {
            listener: handler,
            mask,
        });
    }

    /// Removes `handler`. Returns `false` if it was not registered.
    pub fn unregister_handler(&self, handler: &Arc<dyn EventListener>) -> bool {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        let before = handlers.len();
        handlers.retain(|entry| !Arc::ptr_eq(&entry.listener, handler));
        handlers.len() != before
    }

    /// Number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Announces startup with an immediate [`CommandCode::SYSTEM_OPEN`]
    /// broadcast. Opening twice is a no-op.
    pub fn open(&self) -> Result<()> {
        if self.pipeline.is_shut_down() {
            return Err(RuntimeError::ShutDown);
        }
        if self.opened.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        log::info!("Opening system driver");
        self.outlet.immediate_broadcast(CommandCode::SYSTEM_OPEN, 0);
        Ok(())
    }

    /// Announces teardown with an immediate [`CommandCode::SYSTEM_CLOSE`]
    /// broadcast, if the driver is open.
    pub fn close(&self) {
        if !self.opened.swap(false, Ordering::AcqRel) {
            return;
        }
        log::info!("Closing system driver");
        self.outlet.immediate_broadcast(CommandCode::SYSTEM_CLOSE, 0);
    }

    /// Runs one frame and returns `true` while the driver should keep going.
    pub fn next_frame(&self) -> bool {
        let frame = self.frames.fetch_add(1, Ordering::AcqRel) + 1;
        log::trace!("Frame {frame} begins");

        self.frame_hook(CommandCode::PRE_PROCESS);
        let mut drained = 0usize;
        while let Some(event) = self.pipeline.next_event() {
            self.handle_event(&event);
            drained += 1;
        }
        self.frame_hook(CommandCode::POST_PROCESS);

        log::trace!("Frame {frame} handled {drained} events");
        !self.is_shutdown_requested()
    }

    fn frame_hook(&self, code: CommandCode) {
        let event = Event::broadcast(self.pipeline.clock().now(), code, 0);
        for listener in self.snapshot(EventMask::NOTHING) {
            listener.handle_event(&event);
        }
    }

    /// Runs frames until a [`CommandCode::QUIT`] or [`CommandCode::QUIT_LOOP`]
    /// is handled, opening the driver first if needed. Returns the number of
    /// frames run by this call.
    pub fn run(&self) -> Result<u64> {
        self.open()?;
        self.exit_loop.store(false, Ordering::Release);
        let start = self.frame_count();
        let interval = self.config.frame_interval();

        log::info!("Entering frame loop");
        loop {
            let frame_start = Instant::now();
            if !self.next_frame() || self.exit_loop.swap(false, Ordering::AcqRel) {
                break;
            }
            match interval {
                Some(interval) => {
                    if let Some(rest) = interval.checked_sub(frame_start.elapsed()) {
                        thread::sleep(rest);
                    }
                }
                None => thread::yield_now(),
            }
        }

        let frames = self.frame_count() - start;
        log::info!("Left frame loop after {frames} frames");
        Ok(frames)
    }

    /// Closes the driver and tears down the pipeline. Idempotent.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
        self.close();
        self.pipeline.shutdown();
    }

    /// Returns `true` once a [`CommandCode::QUIT`] has been handled or
    /// [`SystemDriver::shutdown`] was called.
    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Total frames run so far.
    pub fn frame_count(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    /// The outlet for system-generated events.
    pub fn outlet(&self) -> &EventOutlet {
        &self.outlet
    }

    /// Attaches a plug to the pipeline. See [`EventPipeline::create_outlet`].
    pub fn create_outlet(&self, plug: Arc<dyn EventPlug>) -> EventOutlet {
        self.pipeline.create_outlet(plug)
    }

    /// The pipeline the driver owns.
    pub fn pipeline(&self) -> &Arc<EventPipeline> {
        &self.pipeline
    }

    fn snapshot(&self, mask: EventMask) -> Vec<Arc<dyn EventListener>> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|entry| entry.mask.intersects(mask))
            .map(|entry| Arc::clone(&entry.listener))
            .collect()
    }

    fn observe(&self, event: &Event) {
        let (Some(code), Some(info)) = (event.command_code(), event.command_info()) else {
            return;
        };
        match code {
            CommandCode::QUIT => {
                log::info!("Quit requested");
                self.shutdown.store(true, Ordering::Release);
            }
            CommandCode::QUIT_LOOP => {
                log::debug!("Frame loop exit requested");
                self.exit_loop.store(true, Ordering::Release);
            }
            CommandCode::FOCUS_CHANGED if info == 0 => {
                log::debug!("Focus lost");
                self.pipeline.input().reset();
            }
            _ => {}
        }
    }
}

impl EventListener for SystemDriver {
    /// Reacts to system commands, then offers `event` to every handler whose
    /// mask covers its kind until one returns [`Propagation::Stop`].
    /// Broadcasts always reach every matching handler.
    fn handle_event(&self, event: &Event) -> Propagation {
        if matches!(event.kind(), EventKind::Command | EventKind::Broadcast) {
            self.observe(event);
        }

        let can_stop = !event.is_broadcast();
        for listener in self.snapshot(event.kind().mask()) {
            if listener.handle_event(event).is_stop() && can_stop {
                log::trace!("'{}' handled {:?}", listener.name(), event.kind());
                return Propagation::Stop;
            }
        }
        Propagation::Continue
    }

    fn name(&self) -> &str {
        "system-driver"
    }
}

impl Drop for SystemDriver {
    fn drop(&mut self) {
        self.pipeline.shutdown();
    }
}

impl std::fmt::Debug for SystemDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemDriver")
            .field("pipeline", &self.pipeline)
            .field("handlers", &self.handler_count())
            .field("frames", &self.frame_count())
            .field("shutdown", &self.is_shutdown_requested())
            .finish()
    }
}
