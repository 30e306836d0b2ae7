// Copyright (c) 2026 Rota Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! # Day-Level Conflict Rule
//!
//! A volunteer who already holds a schedule on a calendar day is considered
//! busy for that whole day. Time of day is ignored, so two short events at
//! non-overlapping hours still conflict. Days are UTC calendar days.
//!
//! The rule is pure; `application::conflict_detector` feeds it from the
//! stores. [`same_day_clashes`] applies it in bulk for the conflict report,
//! which also surfaces clashes written through schedule updates.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::directory::{EventId, VolunteerId};
use crate::domain::schedule::{Commitment, ScheduleId};

pub fn same_calendar_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.date_naive() == b.date_naive()
}

/// First commitment that clashes with placing the volunteer on
/// `candidate_event` at `candidate_date`. The candidate event itself never
/// counts as a clash.
pub fn find_conflict<'a>(
    candidate_event: EventId,
    candidate_date: DateTime<Utc>,
    commitments: &'a [Commitment],
) -> Option<&'a Commitment> {
    commitments
        .iter()
        .filter(|c| c.event_id != candidate_event)
        .find(|c| same_calendar_day(c.event_date, candidate_date))
}

/// One of the events in a clash, with the schedule placing the volunteer
/// on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictingEvent {
    pub id: EventId,
    pub title: String,
    pub location: String,
    pub event_date: DateTime<Utc>,
    pub schedule_id: ScheduleId,
}

/// A volunteer holding more than one schedule on the same UTC day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerConflict {
    pub volunteer_id: VolunteerId,
    pub volunteer_name: String,
    pub event_day: NaiveDate,
    pub event_count: usize,
    pub events: Vec<ConflictingEvent>,
}

/// A schedule as input to the conflict report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledEvent {
    pub volunteer_id: VolunteerId,
    pub volunteer_name: String,
    pub event: ConflictingEvent,
}

/// Groups schedules by volunteer and day and keeps the days with more than
/// one event. Ordered by day, then volunteer name; events by date, then
/// schedule id.
pub fn same_day_clashes(scheduled: impl IntoIterator<Item = ScheduledEvent>) -> Vec<VolunteerConflict> {
    let mut days: BTreeMap<(NaiveDate, VolunteerId), (String, Vec<ConflictingEvent>)> = BTreeMap::new();
    for entry in scheduled {
        let day = entry.event.event_date.date_naive();
        days.entry((day, entry.volunteer_id))
            .or_insert_with(|| (entry.volunteer_name, Vec::new()))
            .1
            .push(entry.event);
    }

    let mut clashes: Vec<VolunteerConflict> = days
        .into_iter()
        .filter(|(_, (_, events))| events.len() > 1)
        .map(|((event_day, volunteer_id), (volunteer_name, mut events))| {
            events.sort_by(|a, b| a.event_date.cmp(&b.event_date).then(a.schedule_id.cmp(&b.schedule_id)));
            VolunteerConflict {
                volunteer_id,
                volunteer_name,
                event_day,
                event_count: events.len(),
                events,
            }
        })
        .collect();

    clashes.sort_by(|a, b| {
        a.event_day
            .cmp(&b.event_day)
            .then_with(|| a.volunteer_name.cmp(&b.volunteer_name))
            .then(a.volunteer_id.cmp(&b.volunteer_id))
    });
    clashes
}
