// Copyright (c) 2026 Rota Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Schedule Repository
//!
//! `ScheduleRepository` backed by the `schedules` table. The
//! `schedules_event_volunteer_key` constraint is deferred, so a duplicate
//! (event, volunteer) pair surfaces as `RepositoryError::Conflict` when the
//! implicit transaction of each statement commits.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use crate::domain::conflict::{self, ConflictingEvent, ScheduledEvent, VolunteerConflict};
use crate::domain::directory::{EventId, TeamId, UserId, VolunteerId};
use crate::domain::repository::{RepositoryError, ScheduleRepository};
use crate::domain::schedule::{Commitment, NewSchedule, Schedule, ScheduleId, ScheduleStatus};
use crate::domain::views::{ScheduleDetail, VolunteerScheduleDetail};

pub(crate) const SCHEDULE_COLUMNS: &str =
    "id, event_id, volunteer_id, status, trainee_partner_id, created_by_id, created_at";

pub(crate) fn parse_schedule_row(row: &PgRow) -> Result<Schedule, RepositoryError> {
    let status: String = row.try_get("status")?;
    let status = status.parse::<ScheduleStatus>().map_err(RepositoryError::Serialization)?;
    let trainee_partner_id: Option<i64> = row.try_get("trainee_partner_id")?;

    Ok(Schedule {
        id: ScheduleId(row.try_get("id")?),
        event_id: EventId(row.try_get("event_id")?),
        volunteer_id: VolunteerId(row.try_get("volunteer_id")?),
        status,
        trainee_partner_id: trainee_partner_id.map(VolunteerId),
        created_by_id: UserId(row.try_get("created_by_id")?),
        created_at: row.try_get("created_at")?,
    })
}

/// Schedule columns qualified with the `s` alias, for joined queries.
const JOINED_SCHEDULE_COLUMNS: &str =
    "s.id, s.event_id, s.volunteer_id, s.status, s.trainee_partner_id, s.created_by_id, s.created_at";

fn parse_schedule_detail_row(row: &PgRow) -> Result<ScheduleDetail, RepositoryError> {
    Ok(ScheduleDetail {
        schedule: parse_schedule_row(row)?,
        user_id: UserId(row.try_get("user_id")?),
        user_name: row.try_get("user_name")?,
        team_id: TeamId(row.try_get("team_id")?),
        team_name: row.try_get("team_name")?,
        role_name: row.try_get("role_name")?,
        is_trainee: row.try_get("is_trainee")?,
    })
}

fn parse_volunteer_schedule_row(row: &PgRow) -> Result<VolunteerScheduleDetail, RepositoryError> {
    Ok(VolunteerScheduleDetail {
        schedule: parse_schedule_row(row)?,
        event_title: row.try_get("event_title")?,
        event_date: row.try_get("event_date")?,
        location: row.try_get("location")?,
        event_type: row.try_get("event_type")?,
    })
}

fn parse_scheduled_event_row(row: &PgRow) -> Result<ScheduledEvent, RepositoryError> {
    Ok(ScheduledEvent {
        volunteer_id: VolunteerId(row.try_get("volunteer_id")?),
        volunteer_name: row.try_get("volunteer_name")?,
        event: ConflictingEvent {
            id: EventId(row.try_get("event_id")?),
            title: row.try_get("title")?,
            location: row.try_get("location")?,
            event_date: row.try_get("event_date")?,
            schedule_id: ScheduleId(row.try_get("schedule_id")?),
        },
    })
}

pub struct PostgresScheduleRepository {
    pool: PgPool,
}

impl PostgresScheduleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleRepository for PostgresScheduleRepository {
    async fn insert(&self, schedule: &NewSchedule) -> Result<Schedule, RepositoryError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO schedules (event_id, volunteer_id, status, trainee_partner_id, created_by_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            SCHEDULE_COLUMNS
        ))
        .bind(schedule.event_id.0)
        .bind(schedule.volunteer_id.0)
        .bind(schedule.status.as_str())
        .bind(schedule.trainee_partner_id.map(|v| v.0))
        .bind(schedule.created_by_id.0)
        .fetch_one(&self.pool)
        .await?;

        parse_schedule_row(&row)
    }

    async fn update(&self, id: ScheduleId, schedule: &NewSchedule) -> Result<Option<Schedule>, RepositoryError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE schedules
            SET event_id = $2, volunteer_id = $3, status = $4, trainee_partner_id = $5, created_by_id = $6
            WHERE id = $1
            RETURNING {}
            "#,
            SCHEDULE_COLUMNS
        ))
        .bind(id.0)
        .bind(schedule.event_id.0)
        .bind(schedule.volunteer_id.0)
        .bind(schedule.status.as_str())
        .bind(schedule.trainee_partner_id.map(|v| v.0))
        .bind(schedule.created_by_id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(parse_schedule_row).transpose()
    }

    async fn find_by_id(&self, id: ScheduleId) -> Result<Option<Schedule>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {} FROM schedules WHERE id = $1", SCHEDULE_COLUMNS))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(parse_schedule_row).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Schedule>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM schedules ORDER BY created_at DESC, id DESC",
            SCHEDULE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(parse_schedule_row).collect()
    }

    async fn find_by_event(&self, event_id: EventId) -> Result<Vec<ScheduleDetail>, RepositoryError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {},
                   v.user_id, u.name AS user_name, t.id AS team_id, t.name AS team_name,
                   r.name AS role_name, v.is_trainee
            FROM schedules s
            JOIN volunteers v ON v.id = s.volunteer_id
            JOIN users u ON u.id = v.user_id
            JOIN teams t ON t.id = v.team_id
            JOIN roles r ON r.id = v.role_id
            WHERE s.event_id = $1
            ORDER BY t.name, r.name, s.id
            "#,
            JOINED_SCHEDULE_COLUMNS
        ))
        .bind(event_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(parse_schedule_detail_row).collect()
    }

    async fn find_by_volunteer(
        &self,
        volunteer_id: VolunteerId,
    ) -> Result<Vec<VolunteerScheduleDetail>, RepositoryError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {},
                   e.title AS event_title, e.event_date, e.location, e.event_type
            FROM schedules s
            JOIN events e ON e.id = s.event_id
            WHERE s.volunteer_id = $1
            ORDER BY e.event_date DESC, s.id ASC
            "#,
            JOINED_SCHEDULE_COLUMNS
        ))
        .bind(volunteer_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(parse_volunteer_schedule_row).collect()
    }

    async fn exists_for(&self, event_id: EventId, volunteer_id: VolunteerId) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM schedules WHERE event_id = $1 AND volunteer_id = $2)",
        )
        .bind(event_id.0)
        .bind(volunteer_id.0)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn find_commitments(&self, volunteer_id: VolunteerId) -> Result<Vec<Commitment>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT s.id, s.event_id, e.event_date
            FROM schedules s
            JOIN events e ON e.id = s.event_id
            WHERE s.volunteer_id = $1
            "#,
        )
        .bind(volunteer_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<Commitment, RepositoryError> {
                Ok(Commitment {
                    schedule_id: ScheduleId(row.try_get("id")?),
                    event_id: EventId(row.try_get("event_id")?),
                    event_date: row.try_get("event_date")?,
                })
            })
            .collect()
    }

    async fn find_same_day_clashes(&self) -> Result<Vec<VolunteerConflict>, RepositoryError> {
        // the database narrows to double-booked days; grouping and order
        // are shared with the in-memory store
        let rows = sqlx::query(
            r#"
            WITH clashing_days AS (
                SELECT s.volunteer_id, (e.event_date AT TIME ZONE 'UTC')::date AS event_day
                FROM schedules s
                JOIN events e ON e.id = s.event_id
                GROUP BY s.volunteer_id, (e.event_date AT TIME ZONE 'UTC')::date
                HAVING COUNT(*) > 1
            )
            SELECT s.id AS schedule_id, s.volunteer_id, u.name AS volunteer_name,
                   e.id AS event_id, e.title, e.location, e.event_date
            FROM clashing_days d
            JOIN schedules s ON s.volunteer_id = d.volunteer_id
            JOIN events e ON e.id = s.event_id
                AND (e.event_date AT TIME ZONE 'UTC')::date = d.event_day
            JOIN volunteers v ON v.id = s.volunteer_id
            JOIN users u ON u.id = v.user_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let scheduled = rows
            .iter()
            .map(parse_scheduled_event_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(conflict::same_day_clashes(scheduled))
    }

    async fn delete(&self, id: ScheduleId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM schedules WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("schedule {}", id)));
        }
        Ok(())
    }
}
