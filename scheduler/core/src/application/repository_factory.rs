// Copyright (c) 2026 Rota Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! Repository Factory - Application Layer
//!
//! Creates concrete repository implementations based on the storage backend
//! configuration and wires them into the scheduling services. The domain
//! layer only sees the traits.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Backend selection and service wiring

use sqlx::PgPool;
use std::sync::Arc;

use crate::application::conflict_detector::ConflictDetector;
use crate::application::schedule_service::{ScheduleService, StandardScheduleService};
use crate::application::swap_workflow::{StandardSwapWorkflowService, SwapWorkflowService};
use crate::domain::repository::{
    DirectoryRepository, NotificationRepository, RepositoryError, ScheduleRepository, StorageBackend,
    SwapRequestRepository, TransactionManager,
};
use crate::infrastructure::event_bus::EventBus;
use crate::infrastructure::repositories::{
    InMemorySchedulingStore, PostgresDirectoryRepository, PostgresNotificationRepository, PostgresScheduleRepository,
    PostgresSwapRequestRepository, PostgresTransactionManager,
};

/// Every store handle the services need, all backed by the same database.
#[derive(Clone)]
pub struct SchedulingRepositories {
    pub directory: Arc<dyn DirectoryRepository>,
    pub schedules: Arc<dyn ScheduleRepository>,
    pub swap_requests: Arc<dyn SwapRequestRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub transactions: Arc<dyn TransactionManager>,
}

impl SchedulingRepositories {
    pub fn in_memory(store: InMemorySchedulingStore) -> Self {
        let store = Arc::new(store);
        Self {
            directory: store.clone(),
            schedules: store.clone(),
            swap_requests: store.clone(),
            notifications: store.clone(),
            transactions: store,
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            directory: Arc::new(PostgresDirectoryRepository::new(pool.clone())),
            schedules: Arc::new(PostgresScheduleRepository::new(pool.clone())),
            swap_requests: Arc::new(PostgresSwapRequestRepository::new(pool.clone())),
            notifications: Arc::new(PostgresNotificationRepository::new(pool.clone())),
            transactions: Arc::new(PostgresTransactionManager::new(pool)),
        }
    }
}

/// Creates the repositories for the configured backend. The PostgreSQL
/// backend needs a connected pool.
pub fn create_repositories(
    backend: &StorageBackend,
    pool: Option<PgPool>,
) -> Result<SchedulingRepositories, RepositoryError> {
    match (backend, pool) {
        (StorageBackend::InMemory, _) => Ok(SchedulingRepositories::in_memory(InMemorySchedulingStore::new())),
        (StorageBackend::PostgreSQL(_), Some(pool)) => Ok(SchedulingRepositories::postgres(pool)),
        (StorageBackend::PostgreSQL(_), None) => Err(RepositoryError::Database(
            "PostgreSQL backend selected but no connection pool was provided".to_string(),
        )),
    }
}

/// Application services sharing one set of repositories and one event bus.
#[derive(Clone)]
pub struct SchedulingServices {
    pub schedules: Arc<dyn ScheduleService>,
    pub swap_requests: Arc<dyn SwapWorkflowService>,
    pub conflicts: ConflictDetector,
    pub event_bus: EventBus,
}

impl SchedulingServices {
    pub fn new(repositories: SchedulingRepositories, event_bus: EventBus) -> Self {
        let schedules = StandardScheduleService::new(
            repositories.directory.clone(),
            repositories.schedules.clone(),
            repositories.swap_requests.clone(),
            event_bus.clone(),
        );
        let conflicts = ConflictDetector::new(repositories.directory.clone(), repositories.schedules.clone());
        let swap_requests = StandardSwapWorkflowService::new(
            repositories.directory,
            repositories.schedules,
            repositories.swap_requests,
            repositories.notifications,
            repositories.transactions,
            event_bus.clone(),
        );

        Self {
            schedules: Arc::new(schedules),
            swap_requests: Arc::new(swap_requests),
            conflicts,
            event_bus,
        }
    }
}
