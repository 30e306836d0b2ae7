// Copyright (c) 2026 Rota Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Directory Repository
//!
//! Read-only lookups against the `events`, `volunteers` and `teams` tables,
//! which are maintained by the CRUD collaborators.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use crate::domain::directory::{Event, EventId, RoleId, Team, TeamId, UserId, Volunteer, VolunteerId};
use crate::domain::repository::{DirectoryRepository, RepositoryError};

pub(crate) const EVENT_COLUMNS: &str =
    "id, title, description, location, event_date, event_type, recurrent, created_at";
pub(crate) const VOLUNTEER_COLUMNS: &str = "id, user_id, team_id, role_id, is_trainee";

pub(crate) fn parse_event_row(row: &PgRow) -> Result<Event, RepositoryError> {
    Ok(Event {
        id: EventId(row.try_get("id")?),
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        location: row.try_get("location")?,
        event_date: row.try_get("event_date")?,
        event_type: row.try_get("event_type")?,
        recurrent: row.try_get("recurrent")?,
        created_at: row.try_get("created_at")?,
    })
}

pub(crate) fn parse_volunteer_row(row: &PgRow) -> Result<Volunteer, RepositoryError> {
    Ok(Volunteer {
        id: VolunteerId(row.try_get("id")?),
        user_id: UserId(row.try_get("user_id")?),
        team_id: TeamId(row.try_get("team_id")?),
        role_id: RoleId(row.try_get("role_id")?),
        is_trainee: row.try_get("is_trainee")?,
    })
}

pub struct PostgresDirectoryRepository {
    pool: PgPool,
}

impl PostgresDirectoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DirectoryRepository for PostgresDirectoryRepository {
    async fn find_event(&self, id: EventId) -> Result<Option<Event>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {} FROM events WHERE id = $1", EVENT_COLUMNS))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(parse_event_row).transpose()
    }

    async fn find_volunteer(&self, id: VolunteerId) -> Result<Option<Volunteer>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {} FROM volunteers WHERE id = $1", VOLUNTEER_COLUMNS))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(parse_volunteer_row).transpose()
    }

    async fn find_team(&self, id: TeamId) -> Result<Option<Team>, RepositoryError> {
        let row = sqlx::query("SELECT id, name, leader_id FROM teams WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let leader_id: Option<i64> = row.try_get("leader_id")?;
                Ok(Some(Team {
                    id: TeamId(row.try_get("id")?),
                    name: row.try_get("name")?,
                    leader_id: leader_id.map(UserId),
                }))
            }
            None => Ok(None),
        }
    }
}
