// Copyright (c) 2026 Rota Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! Application services: schedule management and the swap-request workflow.

pub mod conflict_detector;
pub mod error;
pub mod repository_factory;
pub mod schedule_service;
pub mod swap_workflow;
