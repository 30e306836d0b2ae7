// Copyright (c) 2026 Rota Maintainers
// SPDX-License-Identifier: AGPL-3.0

use thiserror::Error;

use crate::domain::repository::RepositoryError;
use crate::domain::swap_request::SwapRequestError;

/// Failures surfaced by the scheduling services.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulingError {
    /// Malformed or missing input.
    #[error("{0}")]
    Validation(String),

    /// A referenced event, volunteer, schedule or swap request is absent.
    #[error("{0}")]
    NotFound(String),

    /// Duplicate schedule, same-day clash, or a schedule still referenced.
    #[error("{0}")]
    Conflict(String),

    /// Transition attempted on a request that is no longer pending.
    #[error("{0}")]
    InvalidState(String),

    #[error("storage failure: {0}")]
    Store(RepositoryError),

    #[error("notification failure: {0}")]
    Notification(String),
}

impl SchedulingError {
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{} not found", what))
    }
}

impl From<RepositoryError> for SchedulingError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(msg) => SchedulingError::Conflict(msg),
            RepositoryError::NotFound(msg) => SchedulingError::NotFound(msg),
            other => SchedulingError::Store(other),
        }
    }
}

impl From<SwapRequestError> for SchedulingError {
    fn from(err: SwapRequestError) -> Self {
        SchedulingError::InvalidState(err.to_string())
    }
}
