// Copyright (c) 2026 Rota Maintainers
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use crate::domain::directory::UserId;
use crate::domain::notification::{NewNotification, Notification, NotificationId};
use crate::domain::repository::{NotificationRepository, RepositoryError};

pub(crate) const INSERT_NOTIFICATION: &str = r#"
    INSERT INTO notifications (user_id, title, message, type, read)
    VALUES ($1, $2, $3, $4, FALSE)
    RETURNING id, user_id, title, message, type, read, created_at
"#;

pub(crate) fn parse_notification_row(row: &PgRow) -> Result<Notification, RepositoryError> {
    Ok(Notification {
        id: NotificationId(row.try_get("id")?),
        user_id: UserId(row.try_get("user_id")?),
        title: row.try_get("title")?,
        message: row.try_get("message")?,
        category: row.try_get("type")?,
        read: row.try_get("read")?,
        created_at: row.try_get("created_at")?,
    })
}

pub struct PostgresNotificationRepository {
    pool: PgPool,
}

impl PostgresNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PostgresNotificationRepository {
    async fn insert(&self, notification: &NewNotification) -> Result<Notification, RepositoryError> {
        let row = sqlx::query(INSERT_NOTIFICATION)
            .bind(notification.user_id.0)
            .bind(&notification.title)
            .bind(&notification.message)
            .bind(&notification.category)
            .fetch_one(&self.pool)
            .await?;

        parse_notification_row(&row)
    }
}
