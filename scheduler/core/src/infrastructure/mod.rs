// Copyright (c) 2026 Rota Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! Infrastructure layer: storage adapters and the in-process event bus.

pub mod db;
pub mod event_bus;
pub mod repositories;
