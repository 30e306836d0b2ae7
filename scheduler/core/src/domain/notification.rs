// Copyright (c) 2026 Rota Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! Notifications produced by the swap-request lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::directory::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub i64);

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Category tag persisted in the `type` column.
pub const SWAP_REQUEST_CATEGORY: &str = "swap_request";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub category: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: UserId,
    pub title: String,
    pub message: String,
    pub category: String,
}

impl NewNotification {
    pub fn swap_requested(user_id: UserId, event_title: &str) -> Self {
        Self {
            user_id,
            title: "New swap request".to_string(),
            message: format!("There is a new swap request for event {}", event_title),
            category: SWAP_REQUEST_CATEGORY.to_string(),
        }
    }

    pub fn swap_approved(user_id: UserId, event_title: &str) -> Self {
        Self {
            user_id,
            title: "Swap request approved".to_string(),
            message: format!("Your swap request for event {} was approved", event_title),
            category: SWAP_REQUEST_CATEGORY.to_string(),
        }
    }

    pub fn swap_rejected(user_id: UserId, event_title: &str) -> Self {
        Self {
            user_id,
            title: "Swap request rejected".to_string(),
            message: format!("Your swap request for event {} was rejected", event_title),
            category: SWAP_REQUEST_CATEGORY.to_string(),
        }
    }

    pub fn into_notification(self, id: NotificationId, created_at: DateTime<Utc>) -> Notification {
        Notification {
            id,
            user_id: self.user_id,
            title: self.title,
            message: self.message,
            category: self.category,
            read: false,
            created_at,
        }
    }
}
