// Copyright (c) 2026 Rota Maintainers
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::directory::{EventId, UserId, VolunteerId};
use crate::domain::schedule::ScheduleId;
use crate::domain::swap_request::SwapRequestId;

/// Facts published after a scheduling change has been committed.
///
/// Nothing is published for work that rolled back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchedulingEvent {
    ScheduleCreated {
        schedule_id: ScheduleId,
        event_id: EventId,
        volunteer_id: VolunteerId,
        created_at: DateTime<Utc>,
    },
    ScheduleDeleted {
        schedule_id: ScheduleId,
        deleted_at: DateTime<Utc>,
    },
    SwapRequestCreated {
        swap_request_id: SwapRequestId,
        requestor_schedule_id: ScheduleId,
        created_at: DateTime<Utc>,
    },
    SwapRequestApproved {
        swap_request_id: SwapRequestId,
        requestor_schedule_id: ScheduleId,
        approved_at: DateTime<Utc>,
    },
    SwapRequestRejected {
        swap_request_id: SwapRequestId,
        rejected_at: DateTime<Utc>,
    },
    NotificationDeliveryFailed {
        swap_request_id: SwapRequestId,
        recipient: Option<UserId>,
        reason: String,
        failed_at: DateTime<Utc>,
    },
}

impl SchedulingEvent {
    /// Swap request the event concerns, if any.
    pub fn swap_request_id(&self) -> Option<SwapRequestId> {
        match self {
            Self::SwapRequestCreated { swap_request_id, .. }
            | Self::SwapRequestApproved { swap_request_id, .. }
            | Self::SwapRequestRejected { swap_request_id, .. }
            | Self::NotificationDeliveryFailed { swap_request_id, .. } => Some(*swap_request_id),
            Self::ScheduleCreated { .. } | Self::ScheduleDeleted { .. } => None,
        }
    }
}
