// Copyright (c) 2026 Rota Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! Rota scheduling core.
//!
//! Assigns volunteers to events without double-booking them on a calendar
//! day, and runs the swap-request workflow that moves those assignments
//! between volunteers.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Domain, application services, storage adapters, HTTP API

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
