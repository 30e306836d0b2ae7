// Copyright (c) 2026 Rota Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! # Schedule Aggregate
//!
//! A schedule assigns exactly one volunteer to one event. At most one
//! schedule may exist per (event, volunteer) pair; the stores enforce this
//! and report violations as `RepositoryError::Conflict`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::directory::{EventId, UserId, VolunteerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleId(pub i64);

impl fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    #[default]
    Confirmed,
    Pending,
    Cancelled,
}

impl ScheduleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Pending => "pending",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScheduleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(Self::Confirmed),
            "pending" => Ok(Self::Pending),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown schedule status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: ScheduleId,
    pub event_id: EventId,
    pub volunteer_id: VolunteerId,
    pub status: ScheduleStatus,
    pub trainee_partner_id: Option<VolunteerId>,
    pub created_by_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when filing a schedule; the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSchedule {
    pub event_id: EventId,
    pub volunteer_id: VolunteerId,
    pub status: ScheduleStatus,
    pub trainee_partner_id: Option<VolunteerId>,
    pub created_by_id: UserId,
}

impl NewSchedule {
    pub fn into_schedule(self, id: ScheduleId, created_at: DateTime<Utc>) -> Schedule {
        Schedule {
            id,
            event_id: self.event_id,
            volunteer_id: self.volunteer_id,
            status: self.status,
            trainee_partner_id: self.trainee_partner_id,
            created_by_id: self.created_by_id,
            created_at,
        }
    }
}

/// One of a volunteer's existing schedules, joined with its event's date.
/// This is the input to the conflict rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commitment {
    pub schedule_id: ScheduleId,
    pub event_id: EventId,
    pub event_date: DateTime<Utc>,
}
