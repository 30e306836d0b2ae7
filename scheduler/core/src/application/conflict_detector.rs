// Copyright (c) 2026 Rota Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! Conflict Detector
//!
//! Decides whether assigning a volunteer to an event would double-book them
//! on that calendar day. Every schedule the volunteer holds counts,
//! whatever its status.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Feeds the day-level rule in `domain::conflict` from the stores,
//!   and reports the double bookings already stored

use std::sync::Arc;
use tracing::debug;

use crate::application::error::SchedulingError;
use crate::domain::conflict::{self, VolunteerConflict};
use crate::domain::directory::{EventId, VolunteerId};
use crate::domain::repository::{DirectoryRepository, ScheduleRepository};
use crate::domain::schedule::Commitment;

#[derive(Clone)]
pub struct ConflictDetector {
    directory: Arc<dyn DirectoryRepository>,
    schedules: Arc<dyn ScheduleRepository>,
}

impl ConflictDetector {
    pub fn new(directory: Arc<dyn DirectoryRepository>, schedules: Arc<dyn ScheduleRepository>) -> Self {
        Self { directory, schedules }
    }

    pub async fn has_conflict(&self, event_id: EventId, volunteer_id: VolunteerId) -> Result<bool, SchedulingError> {
        Ok(self.find_conflict(event_id, volunteer_id).await?.is_some())
    }

    /// The existing commitment that clashes with the candidate, if any.
    pub async fn find_conflict(
        &self,
        event_id: EventId,
        volunteer_id: VolunteerId,
    ) -> Result<Option<Commitment>, SchedulingError> {
        let event = self
            .directory
            .find_event(event_id)
            .await?
            .ok_or_else(|| SchedulingError::not_found(format!("event {}", event_id)))?;

        let commitments = self.schedules.find_commitments(volunteer_id).await?;
        let clash = conflict::find_conflict(event_id, event.event_date, &commitments).cloned();

        debug!(
            event_id = %event_id,
            volunteer_id = %volunteer_id,
            commitments = commitments.len(),
            conflict = clash.is_some(),
            "Checked schedule conflict"
        );
        Ok(clash)
    }

    /// Every volunteer already booked more than once on a calendar day.
    /// Updates skip the day rule, so stored data can hold such days.
    pub async fn list_conflicts(&self) -> Result<Vec<VolunteerConflict>, SchedulingError> {
        let conflicts = self.schedules.find_same_day_clashes().await?;
        debug!(conflicts = conflicts.len(), "Listed same-day conflicts");
        Ok(conflicts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::directory::UserId;
    use crate::domain::schedule::{NewSchedule, ScheduleStatus};
    use crate::infrastructure::repositories::InMemorySchedulingStore;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_conflict_counts_cancelled_schedules() {
        let store = Arc::new(InMemorySchedulingStore::new());
        let team = store.add_team("Welcome", None).await;
        let volunteer = store.add_volunteer(UserId(5), team.id, false).await;
        let morning = store.add_event("Morning", Utc.with_ymd_and_hms(2026, 5, 3, 8, 0, 0).unwrap()).await;
        let evening = store.add_event("Evening", Utc.with_ymd_and_hms(2026, 5, 3, 18, 0, 0).unwrap()).await;

        ScheduleRepository::insert(
            &*store,
            &NewSchedule {
                event_id: morning.id,
                volunteer_id: volunteer.id,
                status: ScheduleStatus::Cancelled,
                trainee_partner_id: None,
                created_by_id: UserId(1),
            },
        )
        .await
        .unwrap();

        let detector = ConflictDetector::new(store.clone(), store.clone());
        assert!(detector.has_conflict(evening.id, volunteer.id).await.unwrap());
        // the event already held is not a clash with itself
        assert!(!detector.has_conflict(morning.id, volunteer.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_conflicts_reports_stored_double_bookings() {
        let store = Arc::new(InMemorySchedulingStore::new());
        let team = store.add_team("Welcome", None).await;
        store.add_user(UserId(5), "Ana").await;
        let volunteer = store.add_volunteer(UserId(5), team.id, false).await;
        let other = store.add_volunteer(UserId(6), team.id, false).await;
        let morning = store.add_event("Morning", Utc.with_ymd_and_hms(2026, 5, 3, 8, 0, 0).unwrap()).await;
        let evening = store.add_event("Evening", Utc.with_ymd_and_hms(2026, 5, 3, 18, 0, 0).unwrap()).await;

        let assignments = [(evening.id, volunteer.id), (morning.id, volunteer.id), (morning.id, other.id)];
        for (event_id, volunteer_id) in assignments {
            ScheduleRepository::insert(
                &*store,
                &NewSchedule {
                    event_id,
                    volunteer_id,
                    status: ScheduleStatus::Confirmed,
                    trainee_partner_id: None,
                    created_by_id: UserId(1),
                },
            )
            .await
            .unwrap();
        }

        let detector = ConflictDetector::new(store.clone(), store.clone());
        let conflicts = detector.list_conflicts().await.unwrap();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].volunteer_id, volunteer.id);
        assert_eq!(conflicts[0].volunteer_name, "Ana");
        assert_eq!(conflicts[0].event_count, 2);
        let titles: Vec<_> = conflicts[0].events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Morning", "Evening"]);
    }

    #[tokio::test]
    async fn test_unknown_event_is_not_found() {
        let store = Arc::new(InMemorySchedulingStore::new());
        let detector = ConflictDetector::new(store.clone(), store);
        let err = detector.has_conflict(EventId(404), VolunteerId(1)).await.unwrap_err();
        assert!(matches!(err, SchedulingError::NotFound(_)));
    }
}
