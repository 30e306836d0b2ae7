// Copyright (c) 2026 Rota Maintainers
// SPDX-License-Identifier: AGPL-3.0
// Event Bus Implementation - Pub/Sub for Scheduling Events
//
// In-memory fan-out over a tokio broadcast channel. Services publish only
// after their transaction commits. Events are lost on restart.

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::domain::events::SchedulingEvent;
use crate::domain::swap_request::SwapRequestId;

/// Event bus for publishing and subscribing to scheduling events
#[derive(Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<SchedulingEvent>>,
}

impl EventBus {
    /// Capacity is how many events are buffered before slow receivers lag.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(1000)
    }

    pub fn publish(&self, event: SchedulingEvent) {
        debug!("Publishing event: {:?}", event);

        // send() only fails when nobody is subscribed
        let receiver_count = self.sender.send(event).unwrap_or(0);
        if receiver_count == 0 {
            debug!("No subscribers listening to event");
        }
    }

    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.sender.subscribe(),
        }
    }

    /// Subscribe to the events of a single swap request.
    pub fn subscribe_swap_request(&self, swap_request_id: SwapRequestId) -> SwapRequestEventReceiver {
        SwapRequestEventReceiver {
            receiver: self.sender.subscribe(),
            swap_request_id,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

fn map_recv_error(e: broadcast::error::RecvError) -> EventBusError {
    match e {
        broadcast::error::RecvError::Closed => EventBusError::Closed,
        broadcast::error::RecvError::Lagged(n) => {
            warn!("Event receiver lagged by {} events", n);
            EventBusError::Lagged(n)
        }
    }
}

pub struct EventReceiver {
    receiver: broadcast::Receiver<SchedulingEvent>,
}

impl EventReceiver {
    pub async fn recv(&mut self) -> Result<SchedulingEvent, EventBusError> {
        self.receiver.recv().await.map_err(map_recv_error)
    }

    pub fn try_recv(&mut self) -> Result<SchedulingEvent, EventBusError> {
        self.receiver.try_recv().map_err(|e| match e {
            broadcast::error::TryRecvError::Empty => EventBusError::Empty,
            broadcast::error::TryRecvError::Closed => EventBusError::Closed,
            broadcast::error::TryRecvError::Lagged(n) => {
                warn!("Event receiver lagged by {} events", n);
                EventBusError::Lagged(n)
            }
        })
    }
}

/// Receiver filtered to one swap request
pub struct SwapRequestEventReceiver {
    receiver: broadcast::Receiver<SchedulingEvent>,
    swap_request_id: SwapRequestId,
}

impl SwapRequestEventReceiver {
    pub async fn recv(&mut self) -> Result<SchedulingEvent, EventBusError> {
        loop {
            let event = self.receiver.recv().await.map_err(map_recv_error)?;
            if event.swap_request_id() == Some(self.swap_request_id) {
                return Ok(event);
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    #[error("Event bus is closed")]
    Closed,

    #[error("No events available")]
    Empty,

    #[error("Receiver lagged by {0} events (events were dropped)")]
    Lagged(u64),
}
