// Copyright (c) 2026 Rota Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Swap Request Repository
//!
//! Autocommit access to the `swap_requests` table. State transitions go
//! through `PostgresSwapTransaction` instead.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use crate::domain::directory::VolunteerId;
use crate::domain::repository::{RepositoryError, SwapRequestRepository};
use crate::domain::schedule::ScheduleId;
use crate::domain::swap_request::{NewSwapRequest, SwapRequest, SwapRequestId, SwapRequestStatus};
use crate::domain::views::SwapRequestDetail;

pub(crate) const SWAP_REQUEST_COLUMNS: &str =
    "id, requestor_schedule_id, target_schedule_id, target_volunteer_id, reason, status, created_at";

pub(crate) fn parse_swap_request_row(row: &PgRow) -> Result<SwapRequest, RepositoryError> {
    let status: String = row.try_get("status")?;
    let status = status.parse::<SwapRequestStatus>().map_err(RepositoryError::Serialization)?;
    let target_schedule_id: Option<i64> = row.try_get("target_schedule_id")?;
    let target_volunteer_id: Option<i64> = row.try_get("target_volunteer_id")?;

    Ok(SwapRequest {
        id: SwapRequestId(row.try_get("id")?),
        requestor_schedule_id: ScheduleId(row.try_get("requestor_schedule_id")?),
        target_schedule_id: target_schedule_id.map(ScheduleId),
        target_volunteer_id: target_volunteer_id.map(VolunteerId),
        reason: row.try_get("reason")?,
        status,
        created_at: row.try_get("created_at")?,
    })
}

fn parse_swap_request_detail_row(row: &PgRow) -> Result<SwapRequestDetail, RepositoryError> {
    Ok(SwapRequestDetail {
        request: parse_swap_request_row(row)?,
        requestor_event_title: row.try_get("requestor_event_title")?,
        requestor_event_date: row.try_get("requestor_event_date")?,
        requestor_name: row.try_get("requestor_name")?,
        target_event_title: row.try_get("target_event_title")?,
        target_event_date: row.try_get("target_event_date")?,
        target_name: row.try_get("target_name")?,
    })
}

pub struct PostgresSwapRequestRepository {
    pool: PgPool,
}

impl PostgresSwapRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SwapRequestRepository for PostgresSwapRequestRepository {
    async fn insert(&self, request: &NewSwapRequest) -> Result<SwapRequest, RepositoryError> {
        // status always starts out pending, whatever the caller sent
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO swap_requests (requestor_schedule_id, target_schedule_id, target_volunteer_id, reason, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            SWAP_REQUEST_COLUMNS
        ))
        .bind(request.requestor_schedule_id.0)
        .bind(request.target_schedule_id.map(|s| s.0))
        .bind(request.target_volunteer_id.map(|v| v.0))
        .bind(&request.reason)
        .bind(SwapRequestStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await?;

        parse_swap_request_row(&row)
    }

    async fn find_by_id(&self, id: SwapRequestId) -> Result<Option<SwapRequest>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {} FROM swap_requests WHERE id = $1", SWAP_REQUEST_COLUMNS))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(parse_swap_request_row).transpose()
    }

    async fn list_details(
        &self,
        status: Option<SwapRequestStatus>,
    ) -> Result<Vec<SwapRequestDetail>, RepositoryError> {
        // the counterpart is the target schedule's volunteer, else the target volunteer
        let rows = sqlx::query(
            r#"
            SELECT sr.id, sr.requestor_schedule_id, sr.target_schedule_id, sr.target_volunteer_id,
                   sr.reason, sr.status, sr.created_at,
                   e1.title AS requestor_event_title, e1.event_date AS requestor_event_date,
                   u1.name AS requestor_name,
                   e2.title AS target_event_title, e2.event_date AS target_event_date,
                   u2.name AS target_name
            FROM swap_requests sr
            JOIN schedules s1 ON s1.id = sr.requestor_schedule_id
            JOIN events e1 ON e1.id = s1.event_id
            JOIN volunteers v1 ON v1.id = s1.volunteer_id
            JOIN users u1 ON u1.id = v1.user_id
            LEFT JOIN schedules s2 ON s2.id = sr.target_schedule_id
            LEFT JOIN events e2 ON e2.id = s2.event_id
            LEFT JOIN volunteers v2 ON v2.id = COALESCE(s2.volunteer_id, sr.target_volunteer_id)
            LEFT JOIN users u2 ON u2.id = v2.user_id
            WHERE $1::text IS NULL OR sr.status = $1
            ORDER BY sr.created_at DESC, sr.id DESC
            "#,
        )
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(parse_swap_request_detail_row).collect()
    }

    async fn references_schedule(&self, schedule_id: ScheduleId) -> Result<bool, RepositoryError> {
        let referenced: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM swap_requests
                WHERE requestor_schedule_id = $1 OR target_schedule_id = $1
            )
            "#,
        )
        .bind(schedule_id.0)
        .fetch_one(&self.pool)
        .await?;

        Ok(referenced)
    }
}
