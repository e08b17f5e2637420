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

//! Demo binary: a few producer threads feed the pipeline while the driver
//! runs frames until one of them asks to quit.
//!
//! Usage: `sluice-runtime [config.json]`

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use sluice_core::event::{
    keys, CommandCode, EventKind, EventListener, EventMask, EventPayload, FnListener, Propagation,
};
use sluice_core::Event;
use sluice_runtime::{load_config_or_default, EventTap, SystemDriver};

const PRODUCERS: u32 = 4;
const EVENTS_PER_PRODUCER: u32 = 250;

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = load_config_or_default(path.as_deref()).context("Failed to load configuration")?;
    let driver = SystemDriver::new(config);

    let tap = Arc::new(EventTap::new("input-tap"));
    let input = tap.receiver();
    driver.register_handler(tap, EventMask::INPUT);

    let lifecycle: Arc<dyn EventListener> = Arc::new(FnListener::new("lifecycle", |event: &Event| {
        if let Some(code) = event.command_code() {
            log::info!("Lifecycle broadcast {code}");
        }
        Propagation::Continue
    }));
    driver.register_handler(lifecycle, EventMask::BROADCAST);

    // Escape is swallowed before it reaches the queue.
    let escape: Arc<dyn EventListener> = Arc::new(FnListener::new("escape-filter", |event: &Event| {
        match event.payload() {
            EventPayload::Key { code, .. } if *code == keys::ESC => Propagation::Stop,
            _ => Propagation::Continue,
        }
    }));
    driver
        .pipeline()
        .intercept(EventKind::KeyDown.code(), 0)
        .insert(&escape, 10);

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|id| {
            let outlet = driver.pipeline().system_outlet();
            thread::Builder::new()
                .name(format!("producer-{id}"))
                .spawn(move || {
                    for i in 0..EVENTS_PER_PRODUCER {
                        match i % 3 {
                            0 => {
                                outlet.key(u32::from(b'a') + i % 26, '\0', true);
                                outlet.key(u32::from(b'a') + i % 26, '\0', false);
                            }
                            1 => {
                                outlet.mouse(0, false, i as i32, id as i32);
                            }
                            _ => {
                                outlet.key(keys::ESC, '\0', true);
                            }
                        }
                    }
                })
        })
        .collect::<std::io::Result<_>>()
        .context("Failed to spawn producer threads")?;

    let quitter = {
        let outlet = driver.pipeline().system_outlet();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            outlet.broadcast(CommandCode::QUIT, 0);
        })
    };

    let frames = driver.run().context("Frame loop failed")?;

    for producer in producers {
        if producer.join().is_err() {
            log::error!("A producer thread panicked");
        }
    }
    if quitter.join().is_err() {
        log::error!("The quit thread panicked");
    }

    let stats = driver.pipeline().queue_stats();
    driver.shutdown();

    log::info!(
        "Ran {} frames: {} input events observed, {} queued in total, {} resizes, peak length {}",
        frames,
        input.len(),
        stats.puts,
        stats.resizes,
        stats.peak_len
    );
    Ok(())
}
