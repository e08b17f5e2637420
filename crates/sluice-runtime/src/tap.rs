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

//! A listener that copies events onto a channel.

use sluice_core::event::{EventListener, Propagation};
use sluice_core::Event;

/// Forwards a copy of every event it sees to a channel.
///
/// Register it on the driver or on a cord to observe events from another
/// thread without slowing down the frame loop. It never stops propagation.
#[derive(Debug)]
pub struct EventTap {
    name: String,
    sender: flume::Sender<Event>,
    receiver: flume::Receiver<Event>,
}

impl EventTap {
    /// Creates a tap with an unbounded channel.
    ///
    /// ## Arguments
    /// * `name` - The name the tap reports in log messages.
    pub fn new(name: impl Into<String>) -> Self {
        let (sender, receiver) = flume::unbounded();
        let name = name.into();
        log::debug!("EventTap '{name}' initialized.");
        Self {
            name,
            sender,
            receiver,
        }
    }

    /// Returns a clone of the receiving end of the channel.
    ///
    /// ## Returns
    /// A receiver that yields every event the tap has seen, in order.
    pub fn receiver(&self) -> flume::Receiver<Event> {
        self.receiver.clone()
    }

    /// Number of events waiting on the channel.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }
}

impl EventListener for EventTap {
    fn handle_event(&self, event: &Event) -> Propagation {
        if let Err(e) = self.sender.send(event.clone()) {
            log::error!("EventTap '{}' failed to forward event: {e}", self.name);
        }
        Propagation::Continue
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flume::TryRecvError;
    use sluice_core::event::CommandCode;
    use std::{thread, time::Duration};

    #[test]
    fn forwards_events_in_order() {
        let tap = EventTap::new("test");
        let receiver = tap.receiver();

        for info in 0..3 {
            assert_eq!(
                tap.handle_event(&Event::command(info as u64, CommandCode::user(0), info)),
                Propagation::Continue
            );
        }

        let infos: Vec<_> = receiver
            .try_iter()
            .filter_map(|event| event.command_info())
            .collect();
        assert_eq!(infos, vec![0, 1, 2]);
        assert!(matches!(receiver.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn can_be_read_from_another_thread() {
        let tap = EventTap::new("threaded");
        let receiver = tap.receiver();
        let reader = thread::spawn(move || receiver.recv_timeout(Duration::from_secs(1)));

        tap.handle_event(&Event::nothing(1));
        let event = reader.join().unwrap().expect("event should arrive");
        assert_eq!(event, Event::nothing(1));
    }
}
