// Copyright (c) 2026 Rota Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! Domain model for volunteer scheduling.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Entities, the day-level conflict rule, persistence contracts

pub mod conflict;
pub mod directory;
pub mod events;
pub mod notification;
pub mod repository;
pub mod schedule;
pub mod scheduler_config;
pub mod swap_request;
pub mod views;
