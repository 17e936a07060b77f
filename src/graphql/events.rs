// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process pin event topic.
//!
//! Mutation resolvers publish here; subscription resolvers subscribe and
//! filter. A single broadcast channel carries all three event kinds so a
//! mutation is observed by every subscriber in publish order.

use crate::models::Pin;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 1024;

/// A change to the shared pin collection.
#[derive(Debug, Clone)]
pub enum PinEvent {
    Added(Pin),
    Deleted(Pin),
    /// Pin contents changed (today: a comment was appended). Carries the
    /// whole updated pin.
    Updated(Pin),
}

/// Broadcast topic for pin events.
#[derive(Clone)]
pub struct PinEventBus {
    tx: broadcast::Sender<PinEvent>,
}

impl PinEventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Subscribe to all pin events from this point on.
    pub fn subscribe(&self) -> broadcast::Receiver<PinEvent> {
        self.tx.subscribe()
    }

    /// Publish an event to all current subscribers.
    ///
    /// Publishing never fails; with no subscribers the event is dropped.
    pub fn publish(&self, event: PinEvent) {
        let receivers = self.tx.receiver_count();
        match self.tx.send(event) {
            Ok(_) => {
                tracing::debug!(receivers, "Published pin event");
            }
            Err(_) => {
                tracing::debug!("No subscribers for pin event");
            }
        }
    }
}

impl Default for PinEventBus {
    fn default() -> Self {
        Self::new()
    }
}
