// Copyright (c) 2026 Rota Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! # In-Memory Scheduling Store
//!
//! One shared state implementing every repository trait, so a single
//! instance behaves like one database. Transactions hold the state lock for
//! their whole lifetime and write to a working copy that replaces the live
//! state on commit. Uniqueness of (event, volunteer) is checked at commit,
//! matching the deferred constraint of the PostgreSQL schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::conflict::{self, ConflictingEvent, ScheduledEvent, VolunteerConflict};
use crate::domain::directory::{Event, EventId, RoleId, Team, TeamId, UserId, Volunteer, VolunteerId};
use crate::domain::notification::{NewNotification, Notification, NotificationId};
use crate::domain::repository::{
    DirectoryRepository, NotificationRepository, RepositoryError, ScheduleRepository, SwapRequestRepository,
    SwapTransaction, TransactionManager,
};
use crate::domain::schedule::{Commitment, NewSchedule, Schedule, ScheduleId, ScheduleStatus};
use crate::domain::swap_request::{NewSwapRequest, SwapRequest, SwapRequestId, SwapRequestStatus};
use crate::domain::views::{ScheduleDetail, SwapRequestDetail, VolunteerScheduleDetail};

#[derive(Debug, Clone, Default)]
struct StoreState {
    users: HashMap<UserId, String>,
    events: HashMap<EventId, Event>,
    volunteers: HashMap<VolunteerId, Volunteer>,
    teams: HashMap<TeamId, Team>,
    roles: BTreeMap<RoleId, (TeamId, String)>,
    schedules: BTreeMap<ScheduleId, Schedule>,
    swap_requests: BTreeMap<SwapRequestId, SwapRequest>,
    notifications: Vec<Notification>,
    next_id: i64,
}

impl StoreState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn check_schedule_refs(&self, schedule: &NewSchedule) -> Result<(), RepositoryError> {
        if !self.events.contains_key(&schedule.event_id) {
            return Err(RepositoryError::Constraint(format!("event {} does not exist", schedule.event_id)));
        }
        let volunteers = std::iter::once(schedule.volunteer_id).chain(schedule.trainee_partner_id);
        for volunteer_id in volunteers {
            if !self.volunteers.contains_key(&volunteer_id) {
                return Err(RepositoryError::Constraint(format!("volunteer {} does not exist", volunteer_id)));
            }
        }
        Ok(())
    }

    fn check_unique_assignments(&self) -> Result<(), RepositoryError> {
        let mut seen = HashSet::new();
        for schedule in self.schedules.values() {
            if !seen.insert((schedule.event_id, schedule.volunteer_id)) {
                return Err(RepositoryError::Conflict(format!(
                    "volunteer {} is already scheduled for event {}",
                    schedule.volunteer_id, schedule.event_id
                )));
            }
        }
        Ok(())
    }

    fn user_name(&self, volunteer: &Volunteer) -> String {
        self.users.get(&volunteer.user_id).cloned().unwrap_or_default()
    }

    /// Roster row for a schedule; `None` when a directory row is missing,
    /// like the inner joins of the SQL backend.
    fn schedule_detail(&self, schedule: &Schedule) -> Option<ScheduleDetail> {
        let volunteer = self.volunteers.get(&schedule.volunteer_id)?;
        let team = self.teams.get(&volunteer.team_id)?;
        let (_, role_name) = self.roles.get(&volunteer.role_id)?;
        Some(ScheduleDetail {
            schedule: schedule.clone(),
            user_id: volunteer.user_id,
            user_name: self.user_name(volunteer),
            team_id: team.id,
            team_name: team.name.clone(),
            role_name: role_name.clone(),
            is_trainee: volunteer.is_trainee,
        })
    }

    fn swap_request_detail(&self, request: &SwapRequest) -> Option<SwapRequestDetail> {
        let requestor = self.schedules.get(&request.requestor_schedule_id)?;
        let requestor_event = self.events.get(&requestor.event_id)?;
        let requestor_volunteer = self.volunteers.get(&requestor.volunteer_id)?;

        let target_schedule = request.target_schedule_id.and_then(|id| self.schedules.get(&id));
        let target_event = target_schedule.and_then(|s| self.events.get(&s.event_id));
        let target_volunteer = target_schedule
            .map(|s| s.volunteer_id)
            .or(request.target_volunteer_id)
            .and_then(|id| self.volunteers.get(&id));

        Some(SwapRequestDetail {
            request: request.clone(),
            requestor_event_title: requestor_event.title.clone(),
            requestor_event_date: requestor_event.event_date,
            requestor_name: self.user_name(requestor_volunteer),
            target_event_title: target_event.map(|e| e.title.clone()),
            target_event_date: target_event.map(|e| e.event_date),
            target_name: target_volunteer.map(|v| self.user_name(v)),
        })
    }

    fn insert_notification(&mut self, notification: &NewNotification) -> Notification {
        let id = NotificationId(self.next_id());
        let stored = notification.clone().into_notification(id, Utc::now());
        self.notifications.push(stored.clone());
        stored
    }
}

fn newest_first<T, K: Ord>(mut items: Vec<T>, key: impl Fn(&T) -> (DateTime<Utc>, K)) -> Vec<T> {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
    items
}

/// Shared in-memory backend for development and tests.
#[derive(Clone, Default)]
pub struct InMemorySchedulingStore {
    state: Arc<Mutex<StoreState>>,
    fail_notification_writes: Arc<AtomicBool>,
}

impl InMemorySchedulingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every notification write fail until switched off again.
    pub fn fail_notification_writes(&self, fail: bool) {
        self.fail_notification_writes.store(fail, Ordering::SeqCst);
    }

    fn notification_write_check(&self) -> Result<(), RepositoryError> {
        if self.fail_notification_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database("notification store unavailable".to_string()));
        }
        Ok(())
    }

    /// Register or rename a user. Volunteers of unregistered users are
    /// listed as "User <id>".
    pub async fn add_user(&self, user_id: UserId, name: &str) {
        self.state.lock().await.users.insert(user_id, name.to_string());
    }

    /// Adds a team together with its default "Member" role.
    pub async fn add_team(&self, name: &str, leader_id: Option<UserId>) -> Team {
        let mut state = self.state.lock().await;
        let team = Team {
            id: TeamId(state.next_id()),
            name: name.to_string(),
            leader_id,
        };
        state.teams.insert(team.id, team.clone());
        let role_id = RoleId(state.next_id());
        state.roles.insert(role_id, (team.id, "Member".to_string()));
        team
    }

    pub async fn add_role(&self, team_id: TeamId, name: &str) -> RoleId {
        let mut state = self.state.lock().await;
        let role_id = RoleId(state.next_id());
        state.roles.insert(role_id, (team_id, name.to_string()));
        role_id
    }

    /// Adds a volunteer under the team's first role.
    pub async fn add_volunteer(&self, user_id: UserId, team_id: TeamId, is_trainee: bool) -> Volunteer {
        let role_id = {
            let state = self.state.lock().await;
            state
                .roles
                .iter()
                .find(|(_, (team, _))| *team == team_id)
                .map(|(id, _)| *id)
        };
        let role_id = match role_id {
            Some(role_id) => role_id,
            None => self.add_role(team_id, "Member").await,
        };
        self.add_volunteer_in_role(user_id, team_id, role_id, is_trainee).await
    }

    pub async fn add_volunteer_in_role(
        &self,
        user_id: UserId,
        team_id: TeamId,
        role_id: RoleId,
        is_trainee: bool,
    ) -> Volunteer {
        let mut state = self.state.lock().await;
        let volunteer = Volunteer {
            id: VolunteerId(state.next_id()),
            user_id,
            team_id,
            role_id,
            is_trainee,
        };
        state
            .users
            .entry(user_id)
            .or_insert_with(|| format!("User {}", user_id));
        state.volunteers.insert(volunteer.id, volunteer.clone());
        volunteer
    }

    pub async fn add_event(&self, title: &str, event_date: DateTime<Utc>) -> Event {
        let mut state = self.state.lock().await;
        let event = Event {
            id: EventId(state.next_id()),
            title: title.to_string(),
            description: String::new(),
            location: "Main hall".to_string(),
            event_date,
            event_type: "service".to_string(),
            recurrent: false,
            created_at: Utc::now(),
        };
        state.events.insert(event.id, event.clone());
        event
    }

    /// Every stored notification, oldest first.
    pub async fn notifications(&self) -> Vec<Notification> {
        self.state.lock().await.notifications.clone()
    }

    pub async fn notifications_for(&self, user_id: UserId) -> Vec<Notification> {
        self.state
            .lock()
            .await
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl DirectoryRepository for InMemorySchedulingStore {
    async fn find_event(&self, id: EventId) -> Result<Option<Event>, RepositoryError> {
        Ok(self.state.lock().await.events.get(&id).cloned())
    }

    async fn find_volunteer(&self, id: VolunteerId) -> Result<Option<Volunteer>, RepositoryError> {
        Ok(self.state.lock().await.volunteers.get(&id).cloned())
    }

    async fn find_team(&self, id: TeamId) -> Result<Option<Team>, RepositoryError> {
        Ok(self.state.lock().await.teams.get(&id).cloned())
    }
}

#[async_trait]
impl ScheduleRepository for InMemorySchedulingStore {
    async fn insert(&self, schedule: &NewSchedule) -> Result<Schedule, RepositoryError> {
        let mut state = self.state.lock().await;
        state.check_schedule_refs(schedule)?;
        let duplicate = state
            .schedules
            .values()
            .any(|s| s.event_id == schedule.event_id && s.volunteer_id == schedule.volunteer_id);
        if duplicate {
            return Err(RepositoryError::Conflict(format!(
                "volunteer {} is already scheduled for event {}",
                schedule.volunteer_id, schedule.event_id
            )));
        }

        let id = ScheduleId(state.next_id());
        let stored = schedule.clone().into_schedule(id, Utc::now());
        state.schedules.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: ScheduleId, schedule: &NewSchedule) -> Result<Option<Schedule>, RepositoryError> {
        let mut state = self.state.lock().await;
        let Some(created_at) = state.schedules.get(&id).map(|s| s.created_at) else {
            return Ok(None);
        };
        state.check_schedule_refs(schedule)?;

        let mut working = state.clone();
        let updated = schedule.clone().into_schedule(id, created_at);
        working.schedules.insert(id, updated.clone());
        working.check_unique_assignments()?;
        *state = working;
        Ok(Some(updated))
    }

    async fn find_by_id(&self, id: ScheduleId) -> Result<Option<Schedule>, RepositoryError> {
        Ok(self.state.lock().await.schedules.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Schedule>, RepositoryError> {
        let schedules = self.state.lock().await.schedules.values().cloned().collect();
        Ok(newest_first(schedules, |s: &Schedule| (s.created_at, s.id)))
    }

    async fn find_by_event(&self, event_id: EventId) -> Result<Vec<ScheduleDetail>, RepositoryError> {
        let state = self.state.lock().await;
        let mut roster: Vec<ScheduleDetail> = state
            .schedules
            .values()
            .filter(|s| s.event_id == event_id)
            .filter_map(|s| state.schedule_detail(s))
            .collect();
        roster.sort_by(|a, b| {
            a.team_name
                .cmp(&b.team_name)
                .then_with(|| a.role_name.cmp(&b.role_name))
                .then(a.schedule.id.cmp(&b.schedule.id))
        });
        Ok(roster)
    }

    async fn find_by_volunteer(
        &self,
        volunteer_id: VolunteerId,
    ) -> Result<Vec<VolunteerScheduleDetail>, RepositoryError> {
        let state = self.state.lock().await;
        let mut agenda: Vec<VolunteerScheduleDetail> = state
            .schedules
            .values()
            .filter(|s| s.volunteer_id == volunteer_id)
            .filter_map(|s| {
                state.events.get(&s.event_id).map(|e| VolunteerScheduleDetail {
                    schedule: s.clone(),
                    event_title: e.title.clone(),
                    event_date: e.event_date,
                    location: e.location.clone(),
                    event_type: e.event_type.clone(),
                })
            })
            .collect();
        agenda.sort_by(|a, b| b.event_date.cmp(&a.event_date).then(a.schedule.id.cmp(&b.schedule.id)));
        Ok(agenda)
    }

    async fn exists_for(&self, event_id: EventId, volunteer_id: VolunteerId) -> Result<bool, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .schedules
            .values()
            .any(|s| s.event_id == event_id && s.volunteer_id == volunteer_id))
    }

    async fn find_commitments(&self, volunteer_id: VolunteerId) -> Result<Vec<Commitment>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .schedules
            .values()
            .filter(|s| s.volunteer_id == volunteer_id)
            .filter_map(|s| {
                state.events.get(&s.event_id).map(|e| Commitment {
                    schedule_id: s.id,
                    event_id: s.event_id,
                    event_date: e.event_date,
                })
            })
            .collect())
    }

    async fn find_same_day_clashes(&self) -> Result<Vec<VolunteerConflict>, RepositoryError> {
        let state = self.state.lock().await;
        let scheduled: Vec<ScheduledEvent> = state
            .schedules
            .values()
            .filter_map(|s| {
                let volunteer = state.volunteers.get(&s.volunteer_id)?;
                let event = state.events.get(&s.event_id)?;
                Some(ScheduledEvent {
                    volunteer_id: volunteer.id,
                    volunteer_name: state.user_name(volunteer),
                    event: ConflictingEvent {
                        id: event.id,
                        title: event.title.clone(),
                        location: event.location.clone(),
                        event_date: event.event_date,
                        schedule_id: s.id,
                    },
                })
            })
            .collect();
        Ok(conflict::same_day_clashes(scheduled))
    }

    async fn delete(&self, id: ScheduleId) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        let referenced = state
            .swap_requests
            .values()
            .any(|r| r.requestor_schedule_id == id || r.target_schedule_id == Some(id));
        if referenced {
            return Err(RepositoryError::Constraint(format!("schedule {} is referenced by a swap request", id)));
        }
        match state.schedules.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::NotFound(format!("schedule {}", id))),
        }
    }
}

#[async_trait]
impl SwapRequestRepository for InMemorySchedulingStore {
    async fn insert(&self, request: &NewSwapRequest) -> Result<SwapRequest, RepositoryError> {
        let mut state = self.state.lock().await;
        let schedules = std::iter::once(request.requestor_schedule_id).chain(request.target_schedule_id);
        for schedule_id in schedules {
            if !state.schedules.contains_key(&schedule_id) {
                return Err(RepositoryError::Constraint(format!("schedule {} does not exist", schedule_id)));
            }
        }
        if let Some(volunteer_id) = request.target_volunteer_id {
            if !state.volunteers.contains_key(&volunteer_id) {
                return Err(RepositoryError::Constraint(format!("volunteer {} does not exist", volunteer_id)));
            }
        }

        let id = SwapRequestId(state.next_id());
        let stored = request.clone().into_swap_request(id, Utc::now());
        state.swap_requests.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: SwapRequestId) -> Result<Option<SwapRequest>, RepositoryError> {
        Ok(self.state.lock().await.swap_requests.get(&id).cloned())
    }

    async fn list_details(
        &self,
        status: Option<SwapRequestStatus>,
    ) -> Result<Vec<SwapRequestDetail>, RepositoryError> {
        let state = self.state.lock().await;
        let details = state
            .swap_requests
            .values()
            .filter(|r| status.map_or(true, |status| r.status == status))
            .filter_map(|r| state.swap_request_detail(r))
            .collect();
        Ok(newest_first(details, |d: &SwapRequestDetail| (d.request.created_at, d.request.id)))
    }

    async fn references_schedule(&self, schedule_id: ScheduleId) -> Result<bool, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .swap_requests
            .values()
            .any(|r| r.requestor_schedule_id == schedule_id || r.target_schedule_id == Some(schedule_id)))
    }
}

#[async_trait]
impl NotificationRepository for InMemorySchedulingStore {
    async fn insert(&self, notification: &NewNotification) -> Result<Notification, RepositoryError> {
        self.notification_write_check()?;
        Ok(self.state.lock().await.insert_notification(notification))
    }
}

#[async_trait]
impl TransactionManager for InMemorySchedulingStore {
    async fn begin(&self) -> Result<Box<dyn SwapTransaction>, RepositoryError> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(InMemorySwapTransaction {
            guard,
            working,
            store: self.clone(),
        }))
    }
}

/// Open transaction over the in-memory store. Holding `guard` serializes it
/// against every other reader and writer.
pub struct InMemorySwapTransaction {
    guard: OwnedMutexGuard<StoreState>,
    working: StoreState,
    store: InMemorySchedulingStore,
}

impl InMemorySwapTransaction {
    fn schedule_mut(&mut self, id: ScheduleId) -> Result<&mut Schedule, RepositoryError> {
        self.working
            .schedules
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(format!("schedule {}", id)))
    }
}

#[async_trait]
impl SwapTransaction for InMemorySwapTransaction {
    async fn lock_swap_request(&mut self, id: SwapRequestId) -> Result<Option<SwapRequest>, RepositoryError> {
        Ok(self.working.swap_requests.get(&id).cloned())
    }

    async fn lock_schedules(&mut self, ids: &[ScheduleId]) -> Result<Vec<Schedule>, RepositoryError> {
        let mut ids = ids.to_vec();
        ids.sort();
        ids.dedup();
        Ok(ids
            .iter()
            .filter_map(|id| self.working.schedules.get(id).cloned())
            .collect())
    }

    async fn find_event(&mut self, id: EventId) -> Result<Option<Event>, RepositoryError> {
        Ok(self.working.events.get(&id).cloned())
    }

    async fn find_volunteer(&mut self, id: VolunteerId) -> Result<Option<Volunteer>, RepositoryError> {
        Ok(self.working.volunteers.get(&id).cloned())
    }

    async fn set_swap_status(&mut self, id: SwapRequestId, status: SwapRequestStatus) -> Result<(), RepositoryError> {
        let request = self
            .working
            .swap_requests
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(format!("swap request {}", id)))?;
        request.status = status;
        Ok(())
    }

    async fn assign_volunteer(
        &mut self,
        schedule_id: ScheduleId,
        volunteer_id: VolunteerId,
    ) -> Result<(), RepositoryError> {
        if !self.working.volunteers.contains_key(&volunteer_id) {
            return Err(RepositoryError::Constraint(format!("volunteer {} does not exist", volunteer_id)));
        }
        self.schedule_mut(schedule_id)?.volunteer_id = volunteer_id;
        Ok(())
    }

    async fn set_schedule_status(
        &mut self,
        schedule_id: ScheduleId,
        status: ScheduleStatus,
    ) -> Result<(), RepositoryError> {
        self.schedule_mut(schedule_id)?.status = status;
        Ok(())
    }

    async fn insert_notification(&mut self, notification: &NewNotification) -> Result<Notification, RepositoryError> {
        self.store.notification_write_check()?;
        Ok(self.working.insert_notification(notification))
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        let InMemorySwapTransaction { mut guard, working, .. } = *self;
        working.check_unique_assignments()?;
        *guard = working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    async fn seeded() -> (InMemorySchedulingStore, Event, Volunteer, Volunteer) {
        let store = InMemorySchedulingStore::new();
        let team = store.add_team("Sound", Some(UserId(1))).await;
        let event = store
            .add_event("Sunday service", Utc.with_ymd_and_hms(2026, 3, 8, 10, 0, 0).unwrap())
            .await;
        let alice = store.add_volunteer(UserId(10), team.id, false).await;
        let bob = store.add_volunteer(UserId(11), team.id, false).await;
        (store, event, alice, bob)
    }

    fn assignment(event: &Event, volunteer: &Volunteer) -> NewSchedule {
        NewSchedule {
            event_id: event.id,
            volunteer_id: volunteer.id,
            status: ScheduleStatus::Confirmed,
            trainee_partner_id: None,
            created_by_id: UserId(1),
        }
    }

    #[tokio::test]
    async fn test_duplicate_assignment_is_a_conflict() {
        let (store, event, alice, _) = seeded().await;
        ScheduleRepository::insert(&store, &assignment(&event, &alice)).await.unwrap();
        let err = ScheduleRepository::insert(&store, &assignment(&event, &alice)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_dropped_transaction_rolls_back() {
        let (store, event, alice, bob) = seeded().await;
        let schedule = ScheduleRepository::insert(&store, &assignment(&event, &alice)).await.unwrap();

        {
            let mut tx = store.begin().await.unwrap();
            tx.assign_volunteer(schedule.id, bob.id).await.unwrap();
        }

        let stored = ScheduleRepository::find_by_id(&store, schedule.id).await.unwrap().unwrap();
        assert_eq!(stored.volunteer_id, alice.id);
    }

    #[tokio::test]
    async fn test_uniqueness_is_checked_at_commit() {
        let (store, event, alice, bob) = seeded().await;
        let first = ScheduleRepository::insert(&store, &assignment(&event, &alice)).await.unwrap();
        let second = ScheduleRepository::insert(&store, &assignment(&event, &bob)).await.unwrap();

        // swapping two rows passes through a transient duplicate
        let mut tx = store.begin().await.unwrap();
        tx.assign_volunteer(first.id, bob.id).await.unwrap();
        tx.assign_volunteer(second.id, alice.id).await.unwrap();
        tx.commit().await.unwrap();

        // leaving the duplicate in place does not
        let mut tx = store.begin().await.unwrap();
        tx.assign_volunteer(first.id, alice.id).await.unwrap();
        assert!(matches!(tx.commit().await, Err(RepositoryError::Conflict(_))));

        let stored = ScheduleRepository::find_by_id(&store, first.id).await.unwrap().unwrap();
        assert_eq!(stored.volunteer_id, bob.id);
    }

    #[tokio::test]
    async fn test_lock_schedules_is_sorted_and_deduplicated() {
        let (store, event, alice, bob) = seeded().await;
        let first = ScheduleRepository::insert(&store, &assignment(&event, &alice)).await.unwrap();
        let second = ScheduleRepository::insert(&store, &assignment(&event, &bob)).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let locked = tx
            .lock_schedules(&[second.id, first.id, second.id, ScheduleId(999)])
            .await
            .unwrap();
        let ids: Vec<ScheduleId> = locked.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn test_notification_fault_toggle() {
        let store = InMemorySchedulingStore::new();
        store.fail_notification_writes(true);
        let notification = NewNotification::swap_requested(UserId(1), "Sunday service");
        assert!(NotificationRepository::insert(&store, &notification).await.is_err());

        store.fail_notification_writes(false);
        NotificationRepository::insert(&store, &notification).await.unwrap();
        assert_eq!(store.notifications_for(UserId(1)).await.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_referenced_schedule_is_refused() {
        let (store, event, alice, _) = seeded().await;
        let schedule = ScheduleRepository::insert(&store, &assignment(&event, &alice)).await.unwrap();
        SwapRequestRepository::insert(
            &store,
            &NewSwapRequest {
                requestor_schedule_id: schedule.id,
                target_schedule_id: None,
                target_volunteer_id: None,
                reason: String::new(),
            },
        )
        .await
        .unwrap();

        let err = ScheduleRepository::delete(&store, schedule.id).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Constraint(_)));
    }
}
