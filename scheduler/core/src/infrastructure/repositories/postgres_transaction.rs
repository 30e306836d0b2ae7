// Copyright (c) 2026 Rota Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Swap Transactions
//!
//! Unit of work for swap approval and rejection. Row locks are taken with
//! `SELECT ... FOR UPDATE`; schedules are always locked one at a time in
//! ascending id order so two approvals touching the same pair cannot
//! deadlock. Dropping the transaction without committing rolls it back.

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::{Postgres, Transaction};

use crate::domain::directory::{Event, EventId, Volunteer, VolunteerId};
use crate::domain::notification::{NewNotification, Notification};
use crate::domain::repository::{RepositoryError, SwapTransaction, TransactionManager};
use crate::domain::schedule::{Schedule, ScheduleId, ScheduleStatus};
use crate::domain::swap_request::{SwapRequest, SwapRequestId, SwapRequestStatus};

use super::postgres_directory::{parse_event_row, parse_volunteer_row, EVENT_COLUMNS, VOLUNTEER_COLUMNS};
use super::postgres_notification::{parse_notification_row, INSERT_NOTIFICATION};
use super::postgres_schedule::{parse_schedule_row, SCHEDULE_COLUMNS};
use super::postgres_swap_request::{parse_swap_request_row, SWAP_REQUEST_COLUMNS};

pub struct PostgresTransactionManager {
    pool: PgPool,
}

impl PostgresTransactionManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionManager for PostgresTransactionManager {
    async fn begin(&self) -> Result<Box<dyn SwapTransaction>, RepositoryError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresSwapTransaction { tx }))
    }
}

pub struct PostgresSwapTransaction {
    tx: Transaction<'static, Postgres>,
}

fn not_found_unless_touched(rows_affected: u64, what: String) -> Result<(), RepositoryError> {
    if rows_affected == 0 {
        return Err(RepositoryError::NotFound(what));
    }
    Ok(())
}

#[async_trait]
impl SwapTransaction for PostgresSwapTransaction {
    async fn lock_swap_request(&mut self, id: SwapRequestId) -> Result<Option<SwapRequest>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM swap_requests WHERE id = $1 FOR UPDATE",
            SWAP_REQUEST_COLUMNS
        ))
        .bind(id.0)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.as_ref().map(parse_swap_request_row).transpose()
    }

    async fn lock_schedules(&mut self, ids: &[ScheduleId]) -> Result<Vec<Schedule>, RepositoryError> {
        let mut ids = ids.to_vec();
        ids.sort();
        ids.dedup();

        let sql = format!("SELECT {} FROM schedules WHERE id = $1 FOR UPDATE", SCHEDULE_COLUMNS);
        let mut locked = Vec::with_capacity(ids.len());
        for id in ids {
            let row = sqlx::query(&sql).bind(id.0).fetch_optional(&mut *self.tx).await?;
            if let Some(row) = row {
                locked.push(parse_schedule_row(&row)?);
            }
        }
        Ok(locked)
    }

    async fn find_event(&mut self, id: EventId) -> Result<Option<Event>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {} FROM events WHERE id = $1", EVENT_COLUMNS))
            .bind(id.0)
            .fetch_optional(&mut *self.tx)
            .await?;

        row.as_ref().map(parse_event_row).transpose()
    }

    async fn find_volunteer(&mut self, id: VolunteerId) -> Result<Option<Volunteer>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {} FROM volunteers WHERE id = $1", VOLUNTEER_COLUMNS))
            .bind(id.0)
            .fetch_optional(&mut *self.tx)
            .await?;

        row.as_ref().map(parse_volunteer_row).transpose()
    }

    async fn set_swap_status(&mut self, id: SwapRequestId, status: SwapRequestStatus) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE swap_requests SET status = $2 WHERE id = $1")
            .bind(id.0)
            .bind(status.as_str())
            .execute(&mut *self.tx)
            .await?;

        not_found_unless_touched(result.rows_affected(), format!("swap request {}", id))
    }

    async fn assign_volunteer(
        &mut self,
        schedule_id: ScheduleId,
        volunteer_id: VolunteerId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE schedules SET volunteer_id = $2 WHERE id = $1")
            .bind(schedule_id.0)
            .bind(volunteer_id.0)
            .execute(&mut *self.tx)
            .await?;

        not_found_unless_touched(result.rows_affected(), format!("schedule {}", schedule_id))
    }

    async fn set_schedule_status(
        &mut self,
        schedule_id: ScheduleId,
        status: ScheduleStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE schedules SET status = $2 WHERE id = $1")
            .bind(schedule_id.0)
            .bind(status.as_str())
            .execute(&mut *self.tx)
            .await?;

        not_found_unless_touched(result.rows_affected(), format!("schedule {}", schedule_id))
    }

    async fn insert_notification(&mut self, notification: &NewNotification) -> Result<Notification, RepositoryError> {
        let row = sqlx::query(INSERT_NOTIFICATION)
            .bind(notification.user_id.0)
            .bind(&notification.title)
            .bind(&notification.message)
            .bind(&notification.category)
            .fetch_one(&mut *self.tx)
            .await?;

        parse_notification_row(&row)
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx.commit().await?;
        Ok(())
    }
}
