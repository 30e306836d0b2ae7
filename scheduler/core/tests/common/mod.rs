// Copyright (c) 2026 Rota Maintainers
// SPDX-License-Identifier: AGPL-3.0

//! Shared fixture: an in-memory store seeded with one team, its volunteers
//! and a handful of events, wired into the real services.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use rota_core::application::repository_factory::{SchedulingRepositories, SchedulingServices};
use rota_core::application::schedule_service::ScheduleRequest;
use rota_core::domain::directory::{Event, Team, UserId, Volunteer};
use rota_core::domain::schedule::Schedule;
use rota_core::infrastructure::event_bus::EventBus;
use rota_core::infrastructure::repositories::InMemorySchedulingStore;

pub const LEADER: UserId = UserId(100);
pub const ADMIN: UserId = UserId(1);

pub struct Fixture {
    pub store: InMemorySchedulingStore,
    pub services: SchedulingServices,
    pub team: Team,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_leader(Some(LEADER)).await
    }

    pub async fn with_leader(leader: Option<UserId>) -> Self {
        let store = InMemorySchedulingStore::new();
        let team = store.add_team("Worship", leader).await;
        let services = SchedulingServices::new(SchedulingRepositories::in_memory(store.clone()), EventBus::new(64));
        Self { store, services, team }
    }

    pub async fn volunteer(&self, user: i64) -> Volunteer {
        self.store.add_volunteer(UserId(user), self.team.id, false).await
    }

    pub async fn event(&self, title: &str, date: DateTime<Utc>) -> Event {
        self.store.add_event(title, date).await
    }

    pub async fn assign(&self, event: &Event, volunteer: &Volunteer) -> Schedule {
        self.services
            .schedules
            .create_schedule(ScheduleRequest {
                event_id: event.id,
                volunteer_id: volunteer.id,
                status: None,
                trainee_partner_id: None,
                created_by_id: ADMIN,
            })
            .await
            .expect("schedule should be created")
    }
}

pub fn day(d: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, d, hour, 0, 0).unwrap()
}
