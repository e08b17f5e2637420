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

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use sluice_core::event::{
    keys, CommandCode, EventKind, EventListener, EventMask, FnListener, Propagation,
};
use sluice_core::Event;
use sluice_runtime::{EventTap, RuntimeConfig, RuntimeError, SystemDriver};

/// Records `(kind, command code)` for every event it sees.
fn recorder(
    name: &'static str,
    result: Propagation,
) -> (Arc<dyn EventListener>, Arc<Mutex<Vec<(EventKind, Option<CommandCode>)>>>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    let listener: Arc<dyn EventListener> = Arc::new(FnListener::new(name, move |event: &Event| {
        sink.lock().unwrap().push((event.kind(), event.command_code()));
        result
    }));
    (listener, log)
}

#[test]
fn test_open_and_close_broadcast_immediately() {
    let driver = SystemDriver::new(RuntimeConfig::default());
    let (listener, log) = recorder("lifecycle", Propagation::Continue);
    driver.register_handler(listener, EventMask::BROADCAST);

    driver.open().unwrap();
    driver.open().unwrap();
    assert_eq!(
        *log.lock().unwrap(),
        vec![(EventKind::Broadcast, Some(CommandCode::SYSTEM_OPEN))]
    );

    driver.close();
    driver.close();
    assert_eq!(log.lock().unwrap().len(), 2);
    assert_eq!(log.lock().unwrap()[1].1, Some(CommandCode::SYSTEM_CLOSE));
    assert!(driver.pipeline().queue().is_empty());
}

#[test]
fn test_frame_wraps_queued_events_in_pre_and_post_process() {
    // --- 1. ARRANGE ---
    let driver = SystemDriver::new(RuntimeConfig::default());
    let (listener, log) = recorder("frame", Propagation::Continue);
    driver.register_handler(listener, EventMask::NOTHING | EventMask::KEYBOARD);
    driver.outlet().key('x' as u32, '\0', true);
    driver.outlet().mouse(0, false, 1, 1);

    // --- 2. ACT ---
    let keep_going = driver.next_frame();

    // --- 3. ASSERT ---
    assert!(keep_going);
    assert_eq!(driver.frame_count(), 1);
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            (EventKind::Broadcast, Some(CommandCode::PRE_PROCESS)),
            (EventKind::KeyDown, None),
            (EventKind::Broadcast, Some(CommandCode::POST_PROCESS)),
        ]
    );
    assert!(driver.pipeline().queue().is_empty());
}

#[test]
fn test_quit_requests_shutdown() {
    let driver = SystemDriver::new(RuntimeConfig::default());
    driver.outlet().broadcast(CommandCode::QUIT, 0);

    assert!(!driver.next_frame());
    assert!(driver.is_shutdown_requested());

    driver.shutdown();
    assert!(matches!(driver.open(), Err(RuntimeError::ShutDown)));
}

#[test]
fn test_losing_focus_resets_input_state() {
    let driver = SystemDriver::new(RuntimeConfig::default());
    driver.outlet().key(keys::SHIFT, '\0', true);
    driver.outlet().mouse(1, true, 0, 0);
    driver.next_frame();
    let input = driver.pipeline().input();
    assert!(input.keyboard.is_pressed(keys::SHIFT));

    driver.outlet().broadcast(CommandCode::FOCUS_CHANGED, 1);
    driver.next_frame();
    assert!(input.keyboard.is_pressed(keys::SHIFT));

    driver.outlet().broadcast(CommandCode::FOCUS_CHANGED, 0);
    driver.next_frame();
    assert!(!input.keyboard.is_pressed(keys::SHIFT));
    assert!(!input.mouse.is_pressed(1));
}

#[test]
fn test_stop_ends_command_delivery_but_not_broadcasts() {
    let driver = SystemDriver::new(RuntimeConfig::default());
    let (first, _) = recorder("first", Propagation::Stop);
    let (second, second_log) = recorder("second", Propagation::Continue);
    driver.register_handler(first, EventMask::COMMAND | EventMask::BROADCAST);
    driver.register_handler(second, EventMask::COMMAND | EventMask::BROADCAST);

    driver.outlet().command(CommandCode::user(1), 0);
    driver.outlet().broadcast(CommandCode::user(2), 0);
    driver.next_frame();

    assert_eq!(
        *second_log.lock().unwrap(),
        vec![(EventKind::Broadcast, Some(CommandCode::user(2)))]
    );
}

#[test]
fn test_immediate_broadcast_is_handled_before_returning() {
    let driver = SystemDriver::new(RuntimeConfig::default());
    let (listener, log) = recorder("now", Propagation::Continue);
    driver.register_handler(listener, EventMask::BROADCAST);

    driver
        .outlet()
        .immediate_broadcast(CommandCode::CONTEXT_CLOSE, 7);

    assert_eq!(
        *log.lock().unwrap(),
        vec![(EventKind::Broadcast, Some(CommandCode::CONTEXT_CLOSE))]
    );
    assert!(driver.pipeline().queue().is_empty());
    assert_eq!(driver.frame_count(), 0);
}

#[test]
fn test_unregistered_handlers_stop_receiving() {
    let driver = SystemDriver::new(RuntimeConfig::default());
    let (listener, log) = recorder("gone", Propagation::Continue);
    driver.register_handler(Arc::clone(&listener), EventMask::all());
    driver.register_handler(Arc::clone(&listener), EventMask::COMMAND);
    assert_eq!(driver.handler_count(), 1);

    assert!(driver.unregister_handler(&listener));
    assert!(!driver.unregister_handler(&listener));
    driver.outlet().command(CommandCode::user(0), 0);
    driver.next_frame();
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn test_run_leaves_loop_on_quit_loop() {
    let driver = SystemDriver::new(RuntimeConfig::default());
    let tap = Arc::new(EventTap::new("tap"));
    let seen = tap.receiver();
    driver.register_handler(tap, EventMask::MOUSE);

    let frames_with_events = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&frames_with_events);
    let hook: Arc<dyn EventListener> = Arc::new(FnListener::new("post", move |event: &Event| {
        if event.command_code() == Some(CommandCode::POST_PROCESS) {
            counter.fetch_add(1, Ordering::SeqCst);
        }
        Propagation::Continue
    }));
    driver.register_handler(hook, EventMask::NOTHING);

    let outlet = driver.pipeline().system_outlet();
    let producer = thread::spawn(move || {
        for i in 0..10 {
            outlet.mouse(0, false, i, i);
        }
        thread::sleep(Duration::from_millis(20));
        outlet.broadcast(CommandCode::QUIT_LOOP, 0);
    });

    let frames = driver.run().unwrap();
    producer.join().unwrap();

    assert!(frames >= 1);
    assert!(!driver.is_shutdown_requested());
    assert_eq!(frames_with_events.load(Ordering::SeqCst) as u64, frames);
    assert_eq!(seen.len(), 10);
}
