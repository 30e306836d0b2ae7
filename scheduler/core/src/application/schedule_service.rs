// Copyright (c) 2026 Rota Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! Schedule Service
//!
//! Creates, reads, updates and deletes volunteer assignments. Creation is the
//! only path that runs the conflict detector; updates are trusted edits.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Referential checks, duplicate and conflict guards, delete guard

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::conflict_detector::ConflictDetector;
use crate::application::error::SchedulingError;
use crate::domain::directory::{EventId, UserId, VolunteerId};
use crate::domain::events::SchedulingEvent;
use crate::domain::repository::{DirectoryRepository, ScheduleRepository, SwapRequestRepository};
use crate::domain::schedule::{NewSchedule, Schedule, ScheduleId, ScheduleStatus};
use crate::domain::views::{ScheduleDetail, VolunteerScheduleDetail};
use crate::infrastructure::event_bus::EventBus;

/// Body of a schedule create or update. A missing status means `confirmed`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub event_id: EventId,
    pub volunteer_id: VolunteerId,
    #[serde(default)]
    pub status: Option<ScheduleStatus>,
    #[serde(default)]
    pub trainee_partner_id: Option<VolunteerId>,
    pub created_by_id: UserId,
}

impl From<ScheduleRequest> for NewSchedule {
    fn from(request: ScheduleRequest) -> Self {
        NewSchedule {
            event_id: request.event_id,
            volunteer_id: request.volunteer_id,
            status: request.status.unwrap_or_default(),
            trainee_partner_id: request.trainee_partner_id,
            created_by_id: request.created_by_id,
        }
    }
}

#[async_trait]
pub trait ScheduleService: Send + Sync {
    /// The duplicate check, the conflict check and the insert are not atomic,
    /// so two concurrent creates for one volunteer can both pass the day rule.
    async fn create_schedule(&self, request: ScheduleRequest) -> Result<Schedule, SchedulingError>;
    async fn get_schedule(&self, id: ScheduleId) -> Result<Schedule, SchedulingError>;
    async fn list_schedules(&self) -> Result<Vec<Schedule>, SchedulingError>;
    async fn schedules_for_event(&self, event_id: EventId) -> Result<Vec<ScheduleDetail>, SchedulingError>;
    async fn schedules_for_volunteer(
        &self,
        volunteer_id: VolunteerId,
    ) -> Result<Vec<VolunteerScheduleDetail>, SchedulingError>;
    async fn update_schedule(&self, id: ScheduleId, request: ScheduleRequest) -> Result<Schedule, SchedulingError>;
    async fn delete_schedule(&self, id: ScheduleId) -> Result<(), SchedulingError>;
}

pub struct StandardScheduleService {
    directory: Arc<dyn DirectoryRepository>,
    schedules: Arc<dyn ScheduleRepository>,
    swap_requests: Arc<dyn SwapRequestRepository>,
    conflicts: ConflictDetector,
    event_bus: EventBus,
}

impl StandardScheduleService {
    pub fn new(
        directory: Arc<dyn DirectoryRepository>,
        schedules: Arc<dyn ScheduleRepository>,
        swap_requests: Arc<dyn SwapRequestRepository>,
        event_bus: EventBus,
    ) -> Self {
        let conflicts = ConflictDetector::new(directory.clone(), schedules.clone());
        Self {
            directory,
            schedules,
            swap_requests,
            conflicts,
            event_bus,
        }
    }

    async fn ensure_referents(&self, schedule: &NewSchedule) -> Result<(), SchedulingError> {
        if self.directory.find_event(schedule.event_id).await?.is_none() {
            return Err(SchedulingError::not_found(format!("event {}", schedule.event_id)));
        }
        if self.directory.find_volunteer(schedule.volunteer_id).await?.is_none() {
            return Err(SchedulingError::not_found(format!("volunteer {}", schedule.volunteer_id)));
        }
        if let Some(partner) = schedule.trainee_partner_id {
            if self.directory.find_volunteer(partner).await?.is_none() {
                return Err(SchedulingError::not_found(format!("trainee partner volunteer {}", partner)));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ScheduleService for StandardScheduleService {
    async fn create_schedule(&self, request: ScheduleRequest) -> Result<Schedule, SchedulingError> {
        let new_schedule = NewSchedule::from(request);
        self.ensure_referents(&new_schedule).await?;

        if self
            .schedules
            .exists_for(new_schedule.event_id, new_schedule.volunteer_id)
            .await?
        {
            return Err(SchedulingError::Conflict(
                "This volunteer is already scheduled for this event".to_string(),
            ));
        }

        if let Some(clash) = self
            .conflicts
            .find_conflict(new_schedule.event_id, new_schedule.volunteer_id)
            .await?
        {
            metrics::counter!("rota_schedule_conflicts_total").increment(1);
            warn!(
                volunteer_id = %new_schedule.volunteer_id,
                event_id = %new_schedule.event_id,
                conflicting_schedule = %clash.schedule_id,
                "Refused schedule on a day the volunteer is already booked"
            );
            return Err(SchedulingError::Conflict(
                "Scheduling conflict: the volunteer is already scheduled for another event on the same day"
                    .to_string(),
            ));
        }

        let schedule = self.schedules.insert(&new_schedule).await?;
        metrics::counter!("rota_schedules_created_total").increment(1);
        info!(
            schedule_id = %schedule.id,
            event_id = %schedule.event_id,
            volunteer_id = %schedule.volunteer_id,
            "Schedule created"
        );

        self.event_bus.publish(SchedulingEvent::ScheduleCreated {
            schedule_id: schedule.id,
            event_id: schedule.event_id,
            volunteer_id: schedule.volunteer_id,
            created_at: schedule.created_at,
        });
        Ok(schedule)
    }

    async fn get_schedule(&self, id: ScheduleId) -> Result<Schedule, SchedulingError> {
        self.schedules
            .find_by_id(id)
            .await?
            .ok_or_else(|| SchedulingError::not_found(format!("schedule {}", id)))
    }

    async fn list_schedules(&self) -> Result<Vec<Schedule>, SchedulingError> {
        Ok(self.schedules.list_all().await?)
    }

    async fn schedules_for_event(&self, event_id: EventId) -> Result<Vec<ScheduleDetail>, SchedulingError> {
        if self.directory.find_event(event_id).await?.is_none() {
            return Err(SchedulingError::not_found(format!("event {}", event_id)));
        }
        Ok(self.schedules.find_by_event(event_id).await?)
    }

    async fn schedules_for_volunteer(
        &self,
        volunteer_id: VolunteerId,
    ) -> Result<Vec<VolunteerScheduleDetail>, SchedulingError> {
        if self.directory.find_volunteer(volunteer_id).await?.is_none() {
            return Err(SchedulingError::not_found(format!("volunteer {}", volunteer_id)));
        }
        Ok(self.schedules.find_by_volunteer(volunteer_id).await?)
    }

    async fn update_schedule(&self, id: ScheduleId, request: ScheduleRequest) -> Result<Schedule, SchedulingError> {
        let new_schedule = NewSchedule::from(request);
        // existence of the row is reported before problems with the body
        self.get_schedule(id).await?;
        self.ensure_referents(&new_schedule).await?;

        let schedule = self
            .schedules
            .update(id, &new_schedule)
            .await?
            .ok_or_else(|| SchedulingError::not_found(format!("schedule {}", id)))?;

        info!(schedule_id = %id, status = %schedule.status, "Schedule updated");
        Ok(schedule)
    }

    async fn delete_schedule(&self, id: ScheduleId) -> Result<(), SchedulingError> {
        self.get_schedule(id).await?;

        if self.swap_requests.references_schedule(id).await? {
            return Err(SchedulingError::Conflict(
                "Cannot delete a schedule that has swap requests associated with it".to_string(),
            ));
        }

        self.schedules.delete(id).await?;
        info!(schedule_id = %id, "Schedule deleted");
        self.event_bus.publish(SchedulingEvent::ScheduleDeleted {
            schedule_id: id,
            deleted_at: Utc::now(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::InMemorySchedulingStore;
    use chrono::{TimeZone, Utc};

    fn request(event_id: EventId, volunteer_id: VolunteerId) -> ScheduleRequest {
        ScheduleRequest {
            event_id,
            volunteer_id,
            status: None,
            trainee_partner_id: None,
            created_by_id: UserId(1),
        }
    }

    fn service(store: &Arc<InMemorySchedulingStore>) -> StandardScheduleService {
        StandardScheduleService::new(store.clone(), store.clone(), store.clone(), EventBus::new(16))
    }

    #[tokio::test]
    async fn test_missing_status_defaults_to_confirmed() {
        let store = Arc::new(InMemorySchedulingStore::new());
        let team = store.add_team("Kids", None).await;
        let volunteer = store.add_volunteer(UserId(3), team.id, false).await;
        let event = store.add_event("Kids church", Utc.with_ymd_and_hms(2026, 4, 5, 9, 0, 0).unwrap()).await;

        let schedule = service(&store).create_schedule(request(event.id, volunteer.id)).await.unwrap();
        assert_eq!(schedule.status, ScheduleStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_unknown_trainee_partner_is_not_found() {
        let store = Arc::new(InMemorySchedulingStore::new());
        let team = store.add_team("Kids", None).await;
        let volunteer = store.add_volunteer(UserId(3), team.id, true).await;
        let event = store.add_event("Kids church", Utc.with_ymd_and_hms(2026, 4, 5, 9, 0, 0).unwrap()).await;

        let mut body = request(event.id, volunteer.id);
        body.trainee_partner_id = Some(VolunteerId(999));
        let err = service(&store).create_schedule(body).await.unwrap_err();
        assert!(matches!(err, SchedulingError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_skips_conflict_check() {
        let store = Arc::new(InMemorySchedulingStore::new());
        let team = store.add_team("Kids", None).await;
        let volunteer = store.add_volunteer(UserId(3), team.id, false).await;
        let first = store.add_event("Early", Utc.with_ymd_and_hms(2026, 4, 5, 9, 0, 0).unwrap()).await;
        let second = store.add_event("Late", Utc.with_ymd_and_hms(2026, 4, 5, 18, 0, 0).unwrap()).await;
        let other_day = store.add_event("Monday", Utc.with_ymd_and_hms(2026, 4, 6, 18, 0, 0).unwrap()).await;

        let service = service(&store);
        service.create_schedule(request(first.id, volunteer.id)).await.unwrap();
        let moved = service.create_schedule(request(other_day.id, volunteer.id)).await.unwrap();

        // moving onto an already booked day is an explicit edit and allowed
        let updated = service
            .update_schedule(moved.id, request(second.id, volunteer.id))
            .await
            .unwrap();
        assert_eq!(updated.event_id, second.id);
        assert_eq!(updated.created_at, moved.created_at);
    }

    #[tokio::test]
    async fn test_update_unknown_schedule_is_not_found() {
        let store = Arc::new(InMemorySchedulingStore::new());
        let err = service(&store)
            .update_schedule(ScheduleId(77), request(EventId(1), VolunteerId(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, SchedulingError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_listing_for_unknown_event_is_not_found() {
        let store = Arc::new(InMemorySchedulingStore::new());
        let err = service(&store).schedules_for_event(EventId(5)).await.unwrap_err();
        assert!(matches!(err, SchedulingError::NotFound(_)));
        let err = service(&store).schedules_for_volunteer(VolunteerId(5)).await.unwrap_err();
        assert!(matches!(err, SchedulingError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_roster_is_ordered_by_team_then_role() {
        let store = Arc::new(InMemorySchedulingStore::new());
        let worship = store.add_team("Worship", None).await;
        let sound = store.add_team("Sound", None).await;
        let vocals = store.add_role(worship.id, "Vocals").await;
        let mixer = store.add_role(sound.id, "Mixer").await;
        let camera = store.add_role(sound.id, "Camera").await;
        store.add_user(UserId(3), "Ana").await;
        store.add_user(UserId(4), "Bea").await;
        store.add_user(UserId(5), "Caio").await;
        let singer = store.add_volunteer_in_role(UserId(3), worship.id, vocals, false).await;
        let mixing = store.add_volunteer_in_role(UserId(4), sound.id, mixer, true).await;
        let filming = store.add_volunteer_in_role(UserId(5), sound.id, camera, false).await;
        let event = store.add_event("Sunday service", Utc.with_ymd_and_hms(2026, 4, 5, 9, 0, 0).unwrap()).await;

        let service = service(&store);
        for volunteer in [&singer, &mixing, &filming] {
            service.create_schedule(request(event.id, volunteer.id)).await.unwrap();
        }

        let roster = service.schedules_for_event(event.id).await.unwrap();
        let rows: Vec<_> = roster
            .iter()
            .map(|d| (d.team_name.as_str(), d.role_name.as_str(), d.user_name.as_str()))
            .collect();
        assert_eq!(
            rows,
            vec![("Sound", "Camera", "Caio"), ("Sound", "Mixer", "Bea"), ("Worship", "Vocals", "Ana")]
        );
        assert!(roster[1].is_trainee);
        assert_eq!(roster[1].user_id, UserId(4));
        assert_eq!(roster[1].team_id, sound.id);
    }

    #[tokio::test]
    async fn test_agenda_carries_event_columns() {
        let store = Arc::new(InMemorySchedulingStore::new());
        let team = store.add_team("Kids", None).await;
        let volunteer = store.add_volunteer(UserId(3), team.id, false).await;
        let early = store.add_event("Kids church", Utc.with_ymd_and_hms(2026, 4, 5, 9, 0, 0).unwrap()).await;
        let later = store.add_event("Camp", Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap()).await;

        let service = service(&store);
        service.create_schedule(request(early.id, volunteer.id)).await.unwrap();
        service.create_schedule(request(later.id, volunteer.id)).await.unwrap();

        let agenda = service.schedules_for_volunteer(volunteer.id).await.unwrap();
        assert_eq!(agenda.len(), 2);
        assert_eq!(agenda[0].event_title, "Camp");
        assert_eq!(agenda[0].event_date, later.event_date);
        assert_eq!(agenda[0].location, "Main hall");
        assert_eq!(agenda[0].event_type, "service");
        assert_eq!(agenda[1].schedule.event_id, early.id);
    }

    #[test]
    fn test_request_body_parsing() {
        let body: ScheduleRequest =
            serde_json::from_str(r#"{"eventId": 1, "volunteerId": 2, "createdById": 3, "status": "pending"}"#)
                .unwrap();
        assert_eq!(body.status, Some(ScheduleStatus::Pending));
        assert!(serde_json::from_str::<ScheduleRequest>(r#"{"eventId": 1, "createdById": 3}"#).is_err());
        assert!(serde_json::from_str::<ScheduleRequest>(
            r#"{"eventId": 1, "volunteerId": 2, "createdById": 3, "status": "archived"}"#
        )
        .is_err());
    }
}
