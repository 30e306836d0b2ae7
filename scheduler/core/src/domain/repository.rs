// Copyright (c) 2026 Rota Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Repository Interfaces
//!
//! Persistence contracts for the scheduling core. Interfaces live in the
//! domain layer and are implemented in `crate::infrastructure::repositories`.
//!
//! | Trait | Aggregate | PostgreSQL implementation |
//! |-------|-----------|---------------------------|
//! | `DirectoryRepository` | `Event`, `Volunteer`, `Team` (read-only) | `PostgresDirectoryRepository` |
//! | `ScheduleRepository` | `Schedule` | `PostgresScheduleRepository` |
//! | `SwapRequestRepository` | `SwapRequest` | `PostgresSwapRequestRepository` |
//! | `NotificationRepository` | `Notification` | `PostgresNotificationRepository` |
//! | `TransactionManager` | unit of work across all of the above | `PostgresTransactionManager` |
//!
//! `InMemorySchedulingStore` implements every trait for tests.
//!
//! ## Transactions
//!
//! Swap approval and rejection touch swap requests, schedules and
//! notifications in one all-or-nothing step. They go through a
//! [`SwapTransaction`] obtained from [`TransactionManager::begin`]. Row locks
//! are taken by the `lock_*` methods; dropping a transaction without calling
//! [`SwapTransaction::commit`] rolls it back.

use async_trait::async_trait;

use crate::domain::conflict::VolunteerConflict;
use crate::domain::directory::{Event, EventId, Team, TeamId, Volunteer, VolunteerId};
use crate::domain::notification::{NewNotification, Notification};
use crate::domain::schedule::{Commitment, NewSchedule, Schedule, ScheduleId, ScheduleStatus};
use crate::domain::swap_request::{NewSwapRequest, SwapRequest, SwapRequestId, SwapRequestStatus};
use crate::domain::views::{ScheduleDetail, SwapRequestDetail, VolunteerScheduleDetail};

/// Storage backend enum for pluggable persistence
#[derive(Debug, Clone)]
pub enum StorageBackend {
    InMemory,
    PostgreSQL(PostgresConfig),
}

#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub connection_string: String,
    pub max_connections: u32,
}

/// Lookups against the entities owned by the CRUD collaborators.
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    async fn find_event(&self, id: EventId) -> Result<Option<Event>, RepositoryError>;

    async fn find_volunteer(&self, id: VolunteerId) -> Result<Option<Volunteer>, RepositoryError>;

    async fn find_team(&self, id: TeamId) -> Result<Option<Team>, RepositoryError>;
}

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// Persist a new schedule. A second schedule for the same
    /// (event, volunteer) pair fails with `RepositoryError::Conflict`.
    async fn insert(&self, schedule: &NewSchedule) -> Result<Schedule, RepositoryError>;

    /// Overwrite every mutable field. Returns `None` when the id is unknown.
    async fn update(&self, id: ScheduleId, schedule: &NewSchedule) -> Result<Option<Schedule>, RepositoryError>;

    async fn find_by_id(&self, id: ScheduleId) -> Result<Option<Schedule>, RepositoryError>;

    /// All schedules, newest first.
    async fn list_all(&self) -> Result<Vec<Schedule>, RepositoryError>;

    /// The event's roster, ordered by team name, then role name.
    async fn find_by_event(&self, event_id: EventId) -> Result<Vec<ScheduleDetail>, RepositoryError>;

    /// The volunteer's agenda, latest event first.
    async fn find_by_volunteer(
        &self,
        volunteer_id: VolunteerId,
    ) -> Result<Vec<VolunteerScheduleDetail>, RepositoryError>;

    async fn exists_for(&self, event_id: EventId, volunteer_id: VolunteerId) -> Result<bool, RepositoryError>;

    /// Every schedule the volunteer holds, joined with its event date.
    async fn find_commitments(&self, volunteer_id: VolunteerId) -> Result<Vec<Commitment>, RepositoryError>;

    /// Every volunteer holding more than one schedule on a UTC calendar
    /// day, whatever the schedules' status.
    async fn find_same_day_clashes(&self) -> Result<Vec<VolunteerConflict>, RepositoryError>;

    async fn delete(&self, id: ScheduleId) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait SwapRequestRepository: Send + Sync {
    async fn insert(&self, request: &NewSwapRequest) -> Result<SwapRequest, RepositoryError>;

    async fn find_by_id(&self, id: SwapRequestId) -> Result<Option<SwapRequest>, RepositoryError>;

    /// Swap requests with their display columns, newest first, optionally
    /// only those in one status.
    async fn list_details(
        &self,
        status: Option<SwapRequestStatus>,
    ) -> Result<Vec<SwapRequestDetail>, RepositoryError>;

    /// Whether any request names the schedule as requestor or target.
    async fn references_schedule(&self, schedule_id: ScheduleId) -> Result<bool, RepositoryError>;
}

/// Autocommit notification writes, used for best-effort delivery.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert(&self, notification: &NewNotification) -> Result<Notification, RepositoryError>;
}

/// One open unit of work for a swap-request transition.
#[async_trait]
pub trait SwapTransaction: Send {
    /// Read the request and hold its row lock until commit or rollback.
    async fn lock_swap_request(&mut self, id: SwapRequestId) -> Result<Option<SwapRequest>, RepositoryError>;

    /// Lock the given schedules in ascending id order and return the rows
    /// that exist. Duplicated ids are locked once.
    async fn lock_schedules(&mut self, ids: &[ScheduleId]) -> Result<Vec<Schedule>, RepositoryError>;

    async fn find_event(&mut self, id: EventId) -> Result<Option<Event>, RepositoryError>;

    async fn find_volunteer(&mut self, id: VolunteerId) -> Result<Option<Volunteer>, RepositoryError>;

    async fn set_swap_status(&mut self, id: SwapRequestId, status: SwapRequestStatus) -> Result<(), RepositoryError>;

    async fn assign_volunteer(&mut self, schedule_id: ScheduleId, volunteer_id: VolunteerId)
        -> Result<(), RepositoryError>;

    async fn set_schedule_status(&mut self, schedule_id: ScheduleId, status: ScheduleStatus)
        -> Result<(), RepositoryError>;

    async fn insert_notification(&mut self, notification: &NewNotification) -> Result<Notification, RepositoryError>;

    /// Make every write visible atomically. Constraint checks deferred to
    /// commit (schedule uniqueness) surface here.
    async fn commit(self: Box<Self>) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait TransactionManager: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn SwapTransaction>, RepositoryError>;
}

/// Repository errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Uniqueness violated: {0}")]
    Conflict(String),

    #[error("Constraint violated: {0}")]
    Constraint(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

const PG_UNIQUE_VIOLATION: &str = "23505";
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";
const PG_CHECK_VIOLATION: &str = "23514";

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound("Row not found".to_string()),
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some(PG_UNIQUE_VIOLATION) => RepositoryError::Conflict(db_err.message().to_string()),
                Some(PG_FOREIGN_KEY_VIOLATION) | Some(PG_CHECK_VIOLATION) => {
                    RepositoryError::Constraint(db_err.message().to_string())
                }
                _ => RepositoryError::Database(err.to_string()),
            },
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                RepositoryError::Serialization(err.to_string())
            }
            _ => RepositoryError::Database(err.to_string()),
        }
    }
}
