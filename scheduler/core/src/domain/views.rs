// Copyright (c) 2026 Rota Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! # Read Models
//!
//! Schedules and swap requests joined with the directory data the listings
//! show. The aggregate's own fields are flattened in, so each view
//! serializes as the bare entity plus a few display columns.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::directory::{TeamId, UserId};
use crate::domain::schedule::Schedule;
use crate::domain::swap_request::SwapRequest;

/// A schedule on an event's roster, with who fills it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDetail {
    #[serde(flatten)]
    pub schedule: Schedule,
    pub user_id: UserId,
    pub user_name: String,
    pub team_id: TeamId,
    pub team_name: String,
    pub role_name: String,
    pub is_trainee: bool,
}

/// A schedule in a volunteer's agenda, with the event it is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerScheduleDetail {
    #[serde(flatten)]
    pub schedule: Schedule,
    pub event_title: String,
    pub event_date: DateTime<Utc>,
    pub location: String,
    pub event_type: String,
}

/// A swap request with the requestor's event and name, and the
/// counterpart's when there is one. `target_name` follows the same
/// precedence as approval: the target schedule's volunteer, else the target
/// volunteer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequestDetail {
    #[serde(flatten)]
    pub request: SwapRequest,
    pub requestor_event_title: String,
    pub requestor_event_date: DateTime<Utc>,
    pub requestor_name: String,
    pub target_event_title: Option<String>,
    pub target_event_date: Option<DateTime<Utc>>,
    pub target_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::directory::{EventId, VolunteerId};
    use crate::domain::schedule::{ScheduleId, ScheduleStatus};
    use crate::domain::swap_request::{SwapRequestId, SwapRequestStatus};
    use chrono::TimeZone;

    fn schedule() -> Schedule {
        Schedule {
            id: ScheduleId(4),
            event_id: EventId(2),
            volunteer_id: VolunteerId(9),
            status: ScheduleStatus::Confirmed,
            trainee_partner_id: None,
            created_by_id: UserId(1),
            created_at: Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_schedule_detail_flattens_schedule() {
        let detail = ScheduleDetail {
            schedule: schedule(),
            user_id: UserId(30),
            user_name: "Ana".to_string(),
            team_id: TeamId(3),
            team_name: "Sound".to_string(),
            role_name: "Mixer".to_string(),
            is_trainee: true,
        };

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["id"], 4);
        assert_eq!(json["eventId"], 2);
        assert_eq!(json["userName"], "Ana");
        assert_eq!(json["roleName"], "Mixer");
        assert_eq!(json["isTrainee"], true);
        assert!(json.get("schedule").is_none());
    }

    #[test]
    fn test_swap_request_detail_without_target() {
        let detail = SwapRequestDetail {
            request: SwapRequest {
                id: SwapRequestId(7),
                requestor_schedule_id: ScheduleId(4),
                target_schedule_id: None,
                target_volunteer_id: None,
                reason: "travel".to_string(),
                status: SwapRequestStatus::Pending,
                created_at: Utc::now(),
            },
            requestor_event_title: "Sunday service".to_string(),
            requestor_event_date: Utc.with_ymd_and_hms(2026, 2, 8, 10, 0, 0).unwrap(),
            requestor_name: "Ana".to_string(),
            target_event_title: None,
            target_event_date: None,
            target_name: None,
        };

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["status"], "pending");
        assert_eq!(json["requestorName"], "Ana");
        assert!(json["targetName"].is_null());
    }
}
