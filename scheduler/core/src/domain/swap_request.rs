// Copyright (c) 2026 Rota Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! # Swap Request Aggregate
//!
//! A petition to change who is assigned to a schedule. The state machine is
//! deliberately small:
//!
//! ```text
//! pending ──approve──▶ approved   (terminal)
//!    └─────reject────▶ rejected   (terminal)
//! ```
//!
//! Both target columns are optional and may be set together. When they are,
//! the target schedule wins; [`SwapRequest::target`] is the single place that
//! rule lives.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::directory::VolunteerId;
use crate::domain::schedule::ScheduleId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SwapRequestId(pub i64);

impl fmt::Display for SwapRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SwapRequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl SwapRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for SwapRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwapRequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown swap request status '{}'", other)),
        }
    }
}

/// What an approved request does to the requestor's schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapTarget {
    /// Cancel the requestor's schedule.
    None,
    /// Exchange volunteers with another schedule.
    Schedule(ScheduleId),
    /// Hand the requestor's schedule to another volunteer.
    Volunteer(VolunteerId),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SwapRequestError {
    #[error("swap request {id} is already {status}; only pending requests can be {action}")]
    NotPending {
        id: SwapRequestId,
        status: SwapRequestStatus,
        action: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub id: SwapRequestId,
    pub requestor_schedule_id: ScheduleId,
    pub target_schedule_id: Option<ScheduleId>,
    pub target_volunteer_id: Option<VolunteerId>,
    pub reason: String,
    pub status: SwapRequestStatus,
    pub created_at: DateTime<Utc>,
}

impl SwapRequest {
    pub fn target(&self) -> SwapTarget {
        match (self.target_schedule_id, self.target_volunteer_id) {
            (Some(schedule_id), _) => SwapTarget::Schedule(schedule_id),
            (None, Some(volunteer_id)) => SwapTarget::Volunteer(volunteer_id),
            (None, None) => SwapTarget::None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == SwapRequestStatus::Pending
    }

    pub fn approve(&mut self) -> Result<(), SwapRequestError> {
        self.transition(SwapRequestStatus::Approved, "approved")
    }

    pub fn reject(&mut self) -> Result<(), SwapRequestError> {
        self.transition(SwapRequestStatus::Rejected, "rejected")
    }

    fn transition(&mut self, to: SwapRequestStatus, action: &'static str) -> Result<(), SwapRequestError> {
        if self.status.is_terminal() {
            return Err(SwapRequestError::NotPending {
                id: self.id,
                status: self.status,
                action,
            });
        }
        self.status = to;
        Ok(())
    }
}

/// Fields supplied when filing a swap request. New requests always start
/// `pending`; there is no way to create one in another state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSwapRequest {
    pub requestor_schedule_id: ScheduleId,
    pub target_schedule_id: Option<ScheduleId>,
    pub target_volunteer_id: Option<VolunteerId>,
    pub reason: String,
}

impl NewSwapRequest {
    pub fn into_swap_request(self, id: SwapRequestId, created_at: DateTime<Utc>) -> SwapRequest {
        SwapRequest {
            id,
            requestor_schedule_id: self.requestor_schedule_id,
            target_schedule_id: self.target_schedule_id,
            target_volunteer_id: self.target_volunteer_id,
            reason: self.reason,
            status: SwapRequestStatus::Pending,
            created_at,
        }
    }
}
