// Copyright (c) 2026 Rota Maintainers
// SPDX-License-Identifier: AGPL-3.0

//! Swap-request lifecycle against the in-memory store: creation and its
//! best-effort notification, every approval branch, rejection, rollback on
//! failure and concurrent approvals.

mod common;

use common::{day, Fixture, LEADER};
use rota_core::application::error::SchedulingError;
use rota_core::application::swap_workflow::{
    NotificationOutcome, SwapRequestBody, CREATED_MESSAGE, CREATED_WITHOUT_NOTIFICATION_MESSAGE,
};
use rota_core::domain::directory::{UserId, VolunteerId};
use rota_core::domain::events::SchedulingEvent;
use rota_core::domain::notification::SWAP_REQUEST_CATEGORY;
use rota_core::domain::schedule::{ScheduleId, ScheduleStatus};
use rota_core::domain::swap_request::{SwapRequestId, SwapRequestStatus};
use tokio_test::{assert_err, assert_ok};

fn body(
    requestor: ScheduleId,
    target_schedule: Option<ScheduleId>,
    target_volunteer: Option<VolunteerId>,
) -> SwapRequestBody {
    SwapRequestBody {
        requestor_schedule_id: requestor,
        target_schedule_id: target_schedule,
        target_volunteer_id: target_volunteer,
        reason: "family trip".to_string(),
    }
}

#[tokio::test]
async fn test_target_schedule_swap_exchanges_volunteers() {
    let fx = Fixture::new().await;
    let x = fx.volunteer(10).await;
    let y = fx.volunteer(11).await;
    let sunday = fx.event("Sunday service", day(7, 10)).await;
    let wednesday = fx.event("Midweek prayer", day(10, 19)).await;
    let a = fx.assign(&sunday, &x).await;
    let b = fx.assign(&wednesday, &y).await;

    let created = fx
        .services
        .swap_requests
        .create_swap_request(body(a.id, Some(b.id), None))
        .await
        .unwrap();
    assert_eq!(created.request.status, SwapRequestStatus::Pending);
    // the creation notice goes to the target schedule's volunteer
    assert_eq!(created.notification, NotificationOutcome::Delivered { recipient: y.user_id });

    let approved = fx.services.swap_requests.approve_swap_request(created.request.id).await.unwrap();
    assert_eq!(approved.status, SwapRequestStatus::Approved);

    let a_after = fx.services.schedules.get_schedule(a.id).await.unwrap();
    let b_after = fx.services.schedules.get_schedule(b.id).await.unwrap();
    assert_eq!(a_after.volunteer_id, y.id);
    assert_eq!(b_after.volunteer_id, x.id);
    assert_eq!(a_after.event_id, a.event_id);
    assert_eq!(a_after.status, a.status);
    assert_eq!(a_after.created_by_id, a.created_by_id);
    assert_eq!(a_after.created_at, a.created_at);
    assert_eq!(b_after.event_id, b.event_id);
    assert_eq!(b_after.status, b.status);

    let to_requestor = fx.store.notifications_for(x.user_id).await;
    assert_eq!(to_requestor.len(), 1);
    assert_eq!(to_requestor[0].title, "Swap request approved");
    assert_eq!(to_requestor[0].message, "Your swap request for event Sunday service was approved");
    assert_eq!(to_requestor[0].category, SWAP_REQUEST_CATEGORY);
    assert!(!to_requestor[0].read);
}

#[tokio::test]
async fn test_target_volunteer_swap_reassigns_only_requestor() {
    let fx = Fixture::new().await;
    let x = fx.volunteer(10).await;
    let y = fx.volunteer(11).await;
    let z = fx.volunteer(12).await;
    let sunday = fx.event("Sunday service", day(7, 10)).await;
    let a = fx.assign(&sunday, &x).await;
    let other = fx.assign(&sunday, &y).await;

    let created = fx
        .services
        .swap_requests
        .create_swap_request(body(a.id, None, Some(z.id)))
        .await
        .unwrap();
    assert_eq!(created.notification, NotificationOutcome::Delivered { recipient: z.user_id });

    fx.services.swap_requests.approve_swap_request(created.request.id).await.unwrap();

    assert_eq!(fx.services.schedules.get_schedule(a.id).await.unwrap().volunteer_id, z.id);
    assert_eq!(fx.services.schedules.get_schedule(other.id).await.unwrap(), other);
    assert!(fx.services.schedules.schedules_for_volunteer(x.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_no_target_approval_cancels_requestor() {
    let fx = Fixture::new().await;
    let x = fx.volunteer(10).await;
    let sunday = fx.event("Sunday service", day(7, 10)).await;
    let a = fx.assign(&sunday, &x).await;

    let created = fx
        .services
        .swap_requests
        .create_swap_request(body(a.id, None, None))
        .await
        .unwrap();
    // nobody named: the team leader hears about it
    assert_eq!(created.notification, NotificationOutcome::Delivered { recipient: LEADER });
    let leader_inbox = fx.store.notifications_for(LEADER).await;
    assert_eq!(leader_inbox.len(), 1);
    assert_eq!(leader_inbox[0].title, "New swap request");
    assert_eq!(leader_inbox[0].message, "There is a new swap request for event Sunday service");

    fx.services.swap_requests.approve_swap_request(created.request.id).await.unwrap();

    let a_after = fx.services.schedules.get_schedule(a.id).await.unwrap();
    assert_eq!(a_after.status, ScheduleStatus::Cancelled);
    assert_eq!(a_after.volunteer_id, x.id);
}

#[tokio::test]
async fn test_both_targets_prefer_target_schedule() {
    let fx = Fixture::new().await;
    let x = fx.volunteer(10).await;
    let y = fx.volunteer(11).await;
    let z = fx.volunteer(12).await;
    let sunday = fx.event("Sunday service", day(7, 10)).await;
    let monday = fx.event("Setup crew", day(8, 18)).await;
    let a = fx.assign(&sunday, &x).await;
    let b = fx.assign(&monday, &y).await;

    let created = fx
        .services
        .swap_requests
        .create_swap_request(body(a.id, Some(b.id), Some(z.id)))
        .await
        .unwrap();
    assert_eq!(created.request.target_volunteer_id, Some(z.id));
    assert_eq!(created.notification, NotificationOutcome::Delivered { recipient: y.user_id });

    fx.services.swap_requests.approve_swap_request(created.request.id).await.unwrap();
    assert_eq!(fx.services.schedules.get_schedule(a.id).await.unwrap().volunteer_id, y.id);
    assert_eq!(fx.services.schedules.get_schedule(b.id).await.unwrap().volunteer_id, x.id);
    assert!(fx.store.notifications_for(z.user_id).await.is_empty());
}

#[tokio::test]
async fn test_swap_within_one_event_passes_uniqueness() {
    let fx = Fixture::new().await;
    let x = fx.volunteer(10).await;
    let y = fx.volunteer(11).await;
    let sunday = fx.event("Sunday service", day(7, 10)).await;
    let a = fx.assign(&sunday, &x).await;
    let b = fx.assign(&sunday, &y).await;

    let created = fx
        .services
        .swap_requests
        .create_swap_request(body(b.id, Some(a.id), None))
        .await
        .unwrap();
    assert_ok!(fx.services.swap_requests.approve_swap_request(created.request.id).await);

    assert_eq!(fx.services.schedules.get_schedule(a.id).await.unwrap().volunteer_id, y.id);
    assert_eq!(fx.services.schedules.get_schedule(b.id).await.unwrap().volunteer_id, x.id);
}

#[tokio::test]
async fn test_duplicate_assignment_at_commit_rolls_back() {
    let fx = Fixture::new().await;
    let x = fx.volunteer(10).await;
    let z = fx.volunteer(12).await;
    let sunday = fx.event("Sunday service", day(7, 10)).await;
    let a = fx.assign(&sunday, &x).await;
    fx.assign(&sunday, &z).await;

    // z already serves at this event, so handing a over to z would duplicate
    let created = fx
        .services
        .swap_requests
        .create_swap_request(body(a.id, None, Some(z.id)))
        .await
        .unwrap();
    let err = fx
        .services
        .swap_requests
        .approve_swap_request(created.request.id)
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::Conflict(_)));

    let request = fx.services.swap_requests.get_swap_request(created.request.id).await.unwrap();
    assert_eq!(request.status, SwapRequestStatus::Pending);
    assert_eq!(fx.services.schedules.get_schedule(a.id).await.unwrap().volunteer_id, x.id);
    assert!(fx.store.notifications_for(x.user_id).await.is_empty());
}

#[tokio::test]
async fn test_second_approval_is_invalid_state() {
    let fx = Fixture::new().await;
    let x = fx.volunteer(10).await;
    let y = fx.volunteer(11).await;
    let sunday = fx.event("Sunday service", day(7, 10)).await;
    let monday = fx.event("Setup crew", day(8, 18)).await;
    let a = fx.assign(&sunday, &x).await;
    let b = fx.assign(&monday, &y).await;

    let id = fx
        .services
        .swap_requests
        .create_swap_request(body(a.id, Some(b.id), None))
        .await
        .unwrap()
        .request
        .id;
    fx.services.swap_requests.approve_swap_request(id).await.unwrap();

    let err = fx.services.swap_requests.approve_swap_request(id).await.unwrap_err();
    assert!(matches!(err, SchedulingError::InvalidState(_)));

    // not swapped back
    assert_eq!(fx.services.schedules.get_schedule(a.id).await.unwrap().volunteer_id, y.id);
    assert_eq!(fx.store.notifications_for(x.user_id).await.len(), 1);
}

#[tokio::test]
async fn test_rejection_leaves_schedules_untouched() {
    let fx = Fixture::new().await;
    let x = fx.volunteer(10).await;
    let y = fx.volunteer(11).await;
    let sunday = fx.event("Sunday service", day(7, 10)).await;
    let monday = fx.event("Setup crew", day(8, 18)).await;
    let a = fx.assign(&sunday, &x).await;
    let b = fx.assign(&monday, &y).await;

    let id = fx
        .services
        .swap_requests
        .create_swap_request(body(a.id, Some(b.id), None))
        .await
        .unwrap()
        .request
        .id;

    let rejected = fx.services.swap_requests.reject_swap_request(id).await.unwrap();
    assert_eq!(rejected.status, SwapRequestStatus::Rejected);
    assert_eq!(fx.services.schedules.get_schedule(a.id).await.unwrap(), a);
    assert_eq!(fx.services.schedules.get_schedule(b.id).await.unwrap(), b);

    let inbox = fx.store.notifications_for(x.user_id).await;
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].title, "Swap request rejected");
    assert_eq!(inbox[0].message, "Your swap request for event Sunday service was rejected");

    assert!(matches!(
        fx.services.swap_requests.reject_swap_request(id).await,
        Err(SchedulingError::InvalidState(_))
    ));
    assert!(matches!(
        fx.services.swap_requests.approve_swap_request(id).await,
        Err(SchedulingError::InvalidState(_))
    ));
    assert_eq!(fx.services.schedules.get_schedule(a.id).await.unwrap(), a);
}

#[tokio::test]
async fn test_unknown_swap_request_is_not_found() {
    let fx = Fixture::new().await;
    assert!(matches!(
        fx.services.swap_requests.approve_swap_request(SwapRequestId(404)).await,
        Err(SchedulingError::NotFound(_))
    ));
    assert!(matches!(
        fx.services.swap_requests.reject_swap_request(SwapRequestId(404)).await,
        Err(SchedulingError::NotFound(_))
    ));
    assert!(matches!(
        fx.services.swap_requests.get_swap_request(SwapRequestId(404)).await,
        Err(SchedulingError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_creation_validates_referents() {
    let fx = Fixture::new().await;
    let x = fx.volunteer(10).await;
    let sunday = fx.event("Sunday service", day(7, 10)).await;
    let a = fx.assign(&sunday, &x).await;

    for bad in [
        body(ScheduleId(999), None, None),
        body(a.id, Some(ScheduleId(999)), None),
        body(a.id, None, Some(VolunteerId(999))),
    ] {
        let err = fx.services.swap_requests.create_swap_request(bad).await.unwrap_err();
        assert!(matches!(err, SchedulingError::NotFound(_)), "unexpected error: {:?}", err);
    }
    assert!(fx.services.swap_requests.list_swap_requests(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_creation_survives_missing_recipient() {
    let fx = Fixture::with_leader(None).await;
    let x = fx.volunteer(10).await;
    let sunday = fx.event("Sunday service", day(7, 10)).await;
    let a = fx.assign(&sunday, &x).await;
    let mut events = fx.services.event_bus.subscribe();

    let created = fx
        .services
        .swap_requests
        .create_swap_request(body(a.id, None, None))
        .await
        .unwrap();

    assert!(!created.notification_delivered());
    assert_eq!(created.message(), CREATED_WITHOUT_NOTIFICATION_MESSAGE);
    let stored = fx.services.swap_requests.get_swap_request(created.request.id).await.unwrap();
    assert_eq!(stored.status, SwapRequestStatus::Pending);
    assert!(fx.store.notifications().await.is_empty());

    let mut saw_failure = false;
    while let Ok(event) = events.try_recv() {
        if let SchedulingEvent::NotificationDeliveryFailed { swap_request_id, recipient, .. } = event {
            assert_eq!(swap_request_id, created.request.id);
            assert_eq!(recipient, None);
            saw_failure = true;
        }
    }
    assert!(saw_failure);
}

#[tokio::test]
async fn test_creation_survives_notification_store_failure() {
    let fx = Fixture::new().await;
    let x = fx.volunteer(10).await;
    let sunday = fx.event("Sunday service", day(7, 10)).await;
    let a = fx.assign(&sunday, &x).await;

    fx.store.fail_notification_writes(true);
    let created = fx
        .services
        .swap_requests
        .create_swap_request(body(a.id, None, None))
        .await
        .unwrap();
    assert!(matches!(created.notification, NotificationOutcome::Failed { .. }));
    assert_eq!(created.request.status, SwapRequestStatus::Pending);

    fx.store.fail_notification_writes(false);
    let created = fx
        .services
        .swap_requests
        .create_swap_request(body(a.id, None, None))
        .await
        .unwrap();
    assert_eq!(created.message(), CREATED_MESSAGE);
}

#[tokio::test]
async fn test_approval_notification_failure_rolls_back() {
    let fx = Fixture::new().await;
    let x = fx.volunteer(10).await;
    let y = fx.volunteer(11).await;
    let sunday = fx.event("Sunday service", day(7, 10)).await;
    let monday = fx.event("Setup crew", day(8, 18)).await;
    let a = fx.assign(&sunday, &x).await;
    let b = fx.assign(&monday, &y).await;
    let id = fx
        .services
        .swap_requests
        .create_swap_request(body(a.id, Some(b.id), None))
        .await
        .unwrap()
        .request
        .id;
    let before = fx.store.notifications().await.len();

    fx.store.fail_notification_writes(true);
    let err = fx.services.swap_requests.approve_swap_request(id).await.unwrap_err();
    assert!(matches!(err, SchedulingError::Notification(_)));

    assert_eq!(
        fx.services.swap_requests.get_swap_request(id).await.unwrap().status,
        SwapRequestStatus::Pending
    );
    assert_eq!(fx.services.schedules.get_schedule(a.id).await.unwrap(), a);
    assert_eq!(fx.services.schedules.get_schedule(b.id).await.unwrap(), b);
    assert_eq!(fx.store.notifications().await.len(), before);

    // once the sink recovers the same request can still be approved
    fx.store.fail_notification_writes(false);
    assert_ok!(fx.services.swap_requests.approve_swap_request(id).await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_approvals_apply_once() {
    let fx = Fixture::new().await;
    let x = fx.volunteer(10).await;
    let y = fx.volunteer(11).await;
    let sunday = fx.event("Sunday service", day(7, 10)).await;
    let monday = fx.event("Setup crew", day(8, 18)).await;
    let a = fx.assign(&sunday, &x).await;
    let b = fx.assign(&monday, &y).await;
    let id = fx
        .services
        .swap_requests
        .create_swap_request(body(a.id, Some(b.id), None))
        .await
        .unwrap()
        .request
        .id;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = fx.services.swap_requests.clone();
            tokio::spawn(async move { service.approve_swap_request(id).await })
        })
        .collect();
    let results: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    for result in results.iter().filter(|r| r.is_err()) {
        assert!(matches!(result, Err(SchedulingError::InvalidState(_))));
    }

    assert_eq!(fx.services.schedules.get_schedule(a.id).await.unwrap().volunteer_id, y.id);
    assert_eq!(fx.services.schedules.get_schedule(b.id).await.unwrap().volunteer_id, x.id);
    assert_eq!(fx.store.notifications_for(x.user_id).await.len(), 1);
}

#[tokio::test]
async fn test_committed_transitions_are_published() {
    let fx = Fixture::new().await;
    let x = fx.volunteer(10).await;
    let sunday = fx.event("Sunday service", day(7, 10)).await;
    let a = fx.assign(&sunday, &x).await;
    let id = fx
        .services
        .swap_requests
        .create_swap_request(body(a.id, None, None))
        .await
        .unwrap()
        .request
        .id;

    let mut events = fx.services.event_bus.subscribe_swap_request(id);
    fx.services.swap_requests.approve_swap_request(id).await.unwrap();
    assert_err!(fx.services.swap_requests.reject_swap_request(id).await);

    match events.recv().await.unwrap() {
        SchedulingEvent::SwapRequestApproved { swap_request_id, requestor_schedule_id, .. } => {
            assert_eq!(swap_request_id, id);
            assert_eq!(requestor_schedule_id, a.id);
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let fx = Fixture::new().await;
    let x = fx.volunteer(10).await;
    let sunday = fx.event("Sunday service", day(7, 10)).await;
    let a = fx.assign(&sunday, &x).await;

    let first = fx.services.swap_requests.create_swap_request(body(a.id, None, None)).await.unwrap();
    let second = fx.services.swap_requests.create_swap_request(body(a.id, None, None)).await.unwrap();

    let ids: Vec<SwapRequestId> = fx
        .services
        .swap_requests
        .list_swap_requests(None)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.request.id)
        .collect();
    assert_eq!(ids, vec![second.request.id, first.request.id]);
    assert_eq!(fx.store.notifications_for(UserId(10)).await.len(), 0);
}

#[tokio::test]
async fn test_list_carries_names_and_filters_by_status() {
    let fx = Fixture::new().await;
    fx.store.add_user(UserId(10), "Ana").await;
    fx.store.add_user(UserId(11), "Bea").await;
    let x = fx.volunteer(10).await;
    let y = fx.volunteer(11).await;
    let sunday = fx.event("Sunday service", day(7, 10)).await;
    let wednesday = fx.event("Midweek prayer", day(10, 19)).await;
    let a = fx.assign(&sunday, &x).await;
    let b = fx.assign(&wednesday, &y).await;

    let swap = fx.services.swap_requests.create_swap_request(body(a.id, Some(b.id), None)).await.unwrap();
    let handover = fx.services.swap_requests.create_swap_request(body(b.id, None, Some(x.id))).await.unwrap();
    let cover = fx.services.swap_requests.create_swap_request(body(a.id, None, None)).await.unwrap();
    assert_ok!(fx.services.swap_requests.reject_swap_request(cover.request.id).await);

    let all = fx.services.swap_requests.list_swap_requests(None).await.unwrap();
    assert_eq!(all.len(), 3);

    let pending = fx
        .services
        .swap_requests
        .list_swap_requests(Some(SwapRequestStatus::Pending))
        .await
        .unwrap();
    let ids: Vec<SwapRequestId> = pending.iter().map(|d| d.request.id).collect();
    assert_eq!(ids, vec![handover.request.id, swap.request.id]);

    let detail = &pending[1];
    assert_eq!(detail.requestor_event_title, "Sunday service");
    assert_eq!(detail.requestor_event_date, sunday.event_date);
    assert_eq!(detail.requestor_name, "Ana");
    assert_eq!(detail.target_event_title.as_deref(), Some("Midweek prayer"));
    assert_eq!(detail.target_event_date, Some(wednesday.event_date));
    assert_eq!(detail.target_name.as_deref(), Some("Bea"));

    // a volunteer target has a name but no event
    let detail = &pending[0];
    assert_eq!(detail.requestor_name, "Bea");
    assert_eq!(detail.target_event_title, None);
    assert_eq!(detail.target_name.as_deref(), Some("Ana"));

    let rejected = fx
        .services
        .swap_requests
        .list_swap_requests(Some(SwapRequestStatus::Rejected))
        .await
        .unwrap();
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].request.id, cover.request.id);
    assert_eq!(rejected[0].target_name, None);
    assert!(fx
        .services
        .swap_requests
        .list_swap_requests(Some(SwapRequestStatus::Approved))
        .await
        .unwrap()
        .is_empty());
}
