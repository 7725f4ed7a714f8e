// SPDX-FileCopyrightText: 2026 Runo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide termination broadcast.
//!
//! Events carry no addressing; every subscriber sees every event and filters
//! by its own identifiers.

use runo_core::TerminationEvent;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Buffered events per subscriber before the slowest one starts lagging.
pub const DEFAULT_BUS_CAPACITY: usize = 256;

/// Publish side of the termination broadcast. Cheap to clone.
#[derive(Debug, Clone)]
pub struct TerminationBus {
    sender: broadcast::Sender<TerminationEvent>,
}

impl TerminationBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUS_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Delivers `event` to every live subscriber and returns how many received it.
    pub fn publish(&self, event: TerminationEvent) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(event)) => {
                debug!(?event, "termination event published with no subscribers");
                0
            }
        }
    }

    pub fn subscribe(&self) -> TerminationSubscription {
        TerminationSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for TerminationBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Receive side of the termination broadcast. Dropping it unsubscribes.
#[derive(Debug)]
pub struct TerminationSubscription {
    receiver: broadcast::Receiver<TerminationEvent>,
}

impl TerminationSubscription {
    /// Next event, skipping over any lag. `None` once every publisher is gone.
    pub async fn recv(&mut self) -> Option<TerminationEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "termination subscriber lagged; events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Explicit unsubscribe, equivalent to dropping.
    pub fn unsubscribe(self) {}
}
