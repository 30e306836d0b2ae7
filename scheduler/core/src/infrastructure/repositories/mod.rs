// Copyright (c) 2026 Rota Maintainers
// SPDX-License-Identifier: AGPL-3.0

//! Repository Implementations
//!
//! Infrastructure implementations of the repository traits defined in
//! `crate::domain::repository`.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Persist and retrieve scheduling aggregates
//! - **Pattern:** Repository (DDD), Adapter (Hexagonal Architecture)
//!
//! # Available Implementations
//!
//! ## PostgreSQL Repositories
//!
//! - **PostgresDirectoryRepository** - Event, volunteer and team lookups
//! - **PostgresScheduleRepository** - Volunteer assignments
//! - **PostgresSwapRequestRepository** - Swap requests
//! - **PostgresNotificationRepository** - Best-effort notification writes
//! - **PostgresTransactionManager** - Locked units of work for swap transitions
//!
//! ## In-Memory Repositories
//!
//! - **InMemorySchedulingStore** - One shared state behind every trait, for
//!   development and tests

pub mod in_memory;
pub mod postgres_directory;
pub mod postgres_notification;
pub mod postgres_schedule;
pub mod postgres_swap_request;
pub mod postgres_transaction;

pub use in_memory::InMemorySchedulingStore;
pub use postgres_directory::PostgresDirectoryRepository;
pub use postgres_notification::PostgresNotificationRepository;
pub use postgres_schedule::PostgresScheduleRepository;
pub use postgres_swap_request::PostgresSwapRequestRepository;
pub use postgres_transaction::PostgresTransactionManager;
