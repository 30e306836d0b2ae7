// Copyright (c) 2026 Rota Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! Swap Request Workflow
//!
//! Moves a swap request from `pending` to `approved` or `rejected`.
//!
//! Creation persists the request first and then notifies the counterpart on
//! a best-effort basis: a failed notification is logged and reported, never
//! rolled back. Approval and rejection run in one [`SwapTransaction`]; the
//! status change, any schedule mutation and the requestor's notification
//! commit together or not at all.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Swap-request state machine and its schedule side effects

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::application::error::SchedulingError;
use crate::domain::directory::{UserId, VolunteerId};
use crate::domain::events::SchedulingEvent;
use crate::domain::notification::NewNotification;
use crate::domain::repository::{
    DirectoryRepository, NotificationRepository, ScheduleRepository, SwapRequestRepository, SwapTransaction,
    TransactionManager,
};
use crate::domain::schedule::{Schedule, ScheduleId, ScheduleStatus};
use crate::domain::swap_request::{NewSwapRequest, SwapRequest, SwapRequestId, SwapRequestStatus, SwapTarget};
use crate::domain::views::SwapRequestDetail;
use crate::infrastructure::event_bus::EventBus;

pub const CREATED_MESSAGE: &str = "Swap request created successfully";
pub const CREATED_WITHOUT_NOTIFICATION_MESSAGE: &str =
    "Swap request created, but the notification could not be delivered";

/// Body of a swap request creation. Any `status` sent by the client is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequestBody {
    pub requestor_schedule_id: ScheduleId,
    #[serde(default)]
    pub target_schedule_id: Option<ScheduleId>,
    #[serde(default)]
    pub target_volunteer_id: Option<VolunteerId>,
    #[serde(default)]
    pub reason: String,
}

impl From<SwapRequestBody> for NewSwapRequest {
    fn from(body: SwapRequestBody) -> Self {
        NewSwapRequest {
            requestor_schedule_id: body.requestor_schedule_id,
            target_schedule_id: body.target_schedule_id,
            target_volunteer_id: body.target_volunteer_id,
            reason: body.reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    Delivered { recipient: UserId },
    Failed { reason: String },
}

/// A persisted swap request plus what happened to its creation notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedSwapRequest {
    pub request: SwapRequest,
    pub notification: NotificationOutcome,
}

impl CreatedSwapRequest {
    pub fn notification_delivered(&self) -> bool {
        matches!(self.notification, NotificationOutcome::Delivered { .. })
    }

    pub fn message(&self) -> &'static str {
        if self.notification_delivered() {
            CREATED_MESSAGE
        } else {
            CREATED_WITHOUT_NOTIFICATION_MESSAGE
        }
    }
}

#[async_trait]
pub trait SwapWorkflowService: Send + Sync {
    async fn create_swap_request(&self, body: SwapRequestBody) -> Result<CreatedSwapRequest, SchedulingError>;
    async fn get_swap_request(&self, id: SwapRequestId) -> Result<SwapRequest, SchedulingError>;
    /// Newest first, with display columns; `status` narrows to one state.
    async fn list_swap_requests(
        &self,
        status: Option<SwapRequestStatus>,
    ) -> Result<Vec<SwapRequestDetail>, SchedulingError>;
    async fn approve_swap_request(&self, id: SwapRequestId) -> Result<SwapRequest, SchedulingError>;
    async fn reject_swap_request(&self, id: SwapRequestId) -> Result<SwapRequest, SchedulingError>;
}

pub struct StandardSwapWorkflowService {
    directory: Arc<dyn DirectoryRepository>,
    schedules: Arc<dyn ScheduleRepository>,
    swap_requests: Arc<dyn SwapRequestRepository>,
    notifications: Arc<dyn NotificationRepository>,
    transactions: Arc<dyn TransactionManager>,
    event_bus: EventBus,
}

impl StandardSwapWorkflowService {
    pub fn new(
        directory: Arc<dyn DirectoryRepository>,
        schedules: Arc<dyn ScheduleRepository>,
        swap_requests: Arc<dyn SwapRequestRepository>,
        notifications: Arc<dyn NotificationRepository>,
        transactions: Arc<dyn TransactionManager>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            directory,
            schedules,
            swap_requests,
            notifications,
            transactions,
            event_bus,
        }
    }

    /// Who hears about a new request: the target schedule's volunteer, else
    /// the target volunteer, else the leader of the requestor's team.
    async fn creation_recipient(&self, request: &SwapRequest, requestor: &Schedule) -> Result<UserId, SchedulingError> {
        let volunteer_id = match request.target() {
            SwapTarget::Schedule(target_id) => {
                self.schedules
                    .find_by_id(target_id)
                    .await?
                    .ok_or_else(|| SchedulingError::Notification(format!("target schedule {} vanished", target_id)))?
                    .volunteer_id
            }
            SwapTarget::Volunteer(volunteer_id) => volunteer_id,
            SwapTarget::None => {
                let requestor_volunteer = self.directory.find_volunteer(requestor.volunteer_id).await?.ok_or_else(|| {
                    SchedulingError::Notification(format!("volunteer {} not found", requestor.volunteer_id))
                })?;
                let team = self
                    .directory
                    .find_team(requestor_volunteer.team_id)
                    .await?
                    .ok_or_else(|| {
                        SchedulingError::Notification(format!("team {} not found", requestor_volunteer.team_id))
                    })?;
                return team
                    .leader_id
                    .ok_or_else(|| SchedulingError::Notification(format!("team {} has no leader", team.id)));
            }
        };

        self.directory
            .find_volunteer(volunteer_id)
            .await?
            .map(|v| v.user_id)
            .ok_or_else(|| SchedulingError::Notification(format!("volunteer {} not found", volunteer_id)))
    }

    async fn deliver_creation_notice(&self, recipient: UserId, requestor: &Schedule) -> Result<(), SchedulingError> {
        let event = self
            .directory
            .find_event(requestor.event_id)
            .await?
            .ok_or_else(|| SchedulingError::Notification(format!("event {} not found", requestor.event_id)))?;

        self.notifications
            .insert(&NewNotification::swap_requested(recipient, &event.title))
            .await
            .map_err(|e| SchedulingError::Notification(e.to_string()))?;
        Ok(())
    }

    fn creation_notice_failed(
        &self,
        request: &SwapRequest,
        recipient: Option<UserId>,
        err: SchedulingError,
    ) -> NotificationOutcome {
        let reason = err.to_string();
        warn!(
            swap_request_id = %request.id,
            error = %reason,
            "Swap request created but its notification could not be delivered"
        );
        metrics::counter!("rota_notification_failures_total").increment(1);
        self.event_bus.publish(SchedulingEvent::NotificationDeliveryFailed {
            swap_request_id: request.id,
            recipient,
            reason: reason.clone(),
            failed_at: Utc::now(),
        });
        NotificationOutcome::Failed { reason }
    }

    async fn approve_in(tx: &mut dyn SwapTransaction, id: SwapRequestId) -> Result<SwapRequest, SchedulingError> {
        let mut request = lock_pending(tx, id).await?;
        request.approve()?;
        tx.set_swap_status(id, request.status).await?;

        let target = request.target();
        let mut lock_ids = vec![request.requestor_schedule_id];
        if let SwapTarget::Schedule(target_id) = target {
            lock_ids.push(target_id);
        }
        let locked = tx.lock_schedules(&lock_ids).await?;
        let requestor = find_locked(&locked, request.requestor_schedule_id)?;

        // read before mutating: the requestor schedule may change hands below
        let notice = transition_notice(tx, &requestor, NewNotification::swap_approved).await?;

        match target {
            SwapTarget::Schedule(target_id) => {
                let target_schedule = find_locked(&locked, target_id)?;
                tx.assign_volunteer(requestor.id, target_schedule.volunteer_id).await?;
                tx.assign_volunteer(target_schedule.id, requestor.volunteer_id).await?;
            }
            SwapTarget::Volunteer(volunteer_id) => {
                if tx.find_volunteer(volunteer_id).await?.is_none() {
                    return Err(SchedulingError::not_found(format!("target volunteer {}", volunteer_id)));
                }
                tx.assign_volunteer(requestor.id, volunteer_id).await?;
            }
            SwapTarget::None => {
                tx.set_schedule_status(requestor.id, ScheduleStatus::Cancelled).await?;
            }
        }

        insert_notice(tx, &notice).await?;
        Ok(request)
    }

    async fn reject_in(tx: &mut dyn SwapTransaction, id: SwapRequestId) -> Result<SwapRequest, SchedulingError> {
        let mut request = lock_pending(tx, id).await?;
        request.reject()?;
        tx.set_swap_status(id, request.status).await?;

        let locked = tx.lock_schedules(&[request.requestor_schedule_id]).await?;
        let requestor = find_locked(&locked, request.requestor_schedule_id)?;
        let notice = transition_notice(tx, &requestor, NewNotification::swap_rejected).await?;

        insert_notice(tx, &notice).await?;
        Ok(request)
    }
}

async fn lock_pending(tx: &mut dyn SwapTransaction, id: SwapRequestId) -> Result<SwapRequest, SchedulingError> {
    tx.lock_swap_request(id)
        .await?
        .ok_or_else(|| SchedulingError::not_found(format!("swap request {}", id)))
}

fn find_locked(locked: &[Schedule], id: ScheduleId) -> Result<Schedule, SchedulingError> {
    locked
        .iter()
        .find(|s| s.id == id)
        .cloned()
        .ok_or_else(|| SchedulingError::not_found(format!("schedule {}", id)))
}

/// Notification for the requestor's user about their own schedule's event.
async fn transition_notice(
    tx: &mut dyn SwapTransaction,
    requestor: &Schedule,
    build: fn(UserId, &str) -> NewNotification,
) -> Result<NewNotification, SchedulingError> {
    let volunteer = tx
        .find_volunteer(requestor.volunteer_id)
        .await?
        .ok_or_else(|| SchedulingError::Notification(format!("volunteer {} not found", requestor.volunteer_id)))?;
    let event = tx
        .find_event(requestor.event_id)
        .await?
        .ok_or_else(|| SchedulingError::Notification(format!("event {} not found", requestor.event_id)))?;
    Ok(build(volunteer.user_id, &event.title))
}

async fn insert_notice(tx: &mut dyn SwapTransaction, notice: &NewNotification) -> Result<(), SchedulingError> {
    tx.insert_notification(notice)
        .await
        .map_err(|e| SchedulingError::Notification(e.to_string()))?;
    Ok(())
}

fn log_transition_failure(id: SwapRequestId, action: &str, err: &SchedulingError) {
    match err {
        SchedulingError::Store(_) | SchedulingError::Notification(_) => {
            error!(swap_request_id = %id, error = %err, "Swap request could not be {}; rolled back", action)
        }
        _ => info!(swap_request_id = %id, error = %err, "Swap request not {}", action),
    }
}

#[async_trait]
impl SwapWorkflowService for StandardSwapWorkflowService {
    async fn create_swap_request(&self, body: SwapRequestBody) -> Result<CreatedSwapRequest, SchedulingError> {
        let new_request = NewSwapRequest::from(body);

        let requestor = self
            .schedules
            .find_by_id(new_request.requestor_schedule_id)
            .await?
            .ok_or_else(|| {
                SchedulingError::not_found(format!("requestor schedule {}", new_request.requestor_schedule_id))
            })?;

        if let Some(target_id) = new_request.target_schedule_id {
            if self.schedules.find_by_id(target_id).await?.is_none() {
                return Err(SchedulingError::not_found(format!("target schedule {}", target_id)));
            }
        }

        if let Some(volunteer_id) = new_request.target_volunteer_id {
            if self.directory.find_volunteer(volunteer_id).await?.is_none() {
                return Err(SchedulingError::not_found(format!("target volunteer {}", volunteer_id)));
            }
        }

        let request = self.swap_requests.insert(&new_request).await?;
        metrics::counter!("rota_swap_requests_total", "outcome" => "created").increment(1);
        info!(
            swap_request_id = %request.id,
            requestor_schedule_id = %request.requestor_schedule_id,
            "Swap request created"
        );
        self.event_bus.publish(SchedulingEvent::SwapRequestCreated {
            swap_request_id: request.id,
            requestor_schedule_id: request.requestor_schedule_id,
            created_at: request.created_at,
        });

        let notification = match self.creation_recipient(&request, &requestor).await {
            Ok(recipient) => match self.deliver_creation_notice(recipient, &requestor).await {
                Ok(()) => NotificationOutcome::Delivered { recipient },
                Err(e) => self.creation_notice_failed(&request, Some(recipient), e),
            },
            Err(e) => self.creation_notice_failed(&request, None, e),
        };

        Ok(CreatedSwapRequest { request, notification })
    }

    async fn get_swap_request(&self, id: SwapRequestId) -> Result<SwapRequest, SchedulingError> {
        self.swap_requests
            .find_by_id(id)
            .await?
            .ok_or_else(|| SchedulingError::not_found(format!("swap request {}", id)))
    }

    async fn list_swap_requests(
        &self,
        status: Option<SwapRequestStatus>,
    ) -> Result<Vec<SwapRequestDetail>, SchedulingError> {
        Ok(self.swap_requests.list_details(status).await?)
    }

    async fn approve_swap_request(&self, id: SwapRequestId) -> Result<SwapRequest, SchedulingError> {
        let mut tx = self.transactions.begin().await?;
        let request = match Self::approve_in(tx.as_mut(), id).await {
            Ok(request) => request,
            Err(e) => {
                log_transition_failure(id, "approved", &e);
                return Err(e);
            }
        };
        tx.commit().await.inspect_err(|e| log_transition_failure(id, "approved", &SchedulingError::from(e.clone())))?;

        metrics::counter!("rota_swap_requests_total", "outcome" => "approved").increment(1);
        info!(swap_request_id = %id, swap_target = ?request.target(), "Swap request approved");
        self.event_bus.publish(SchedulingEvent::SwapRequestApproved {
            swap_request_id: id,
            requestor_schedule_id: request.requestor_schedule_id,
            approved_at: Utc::now(),
        });
        Ok(request)
    }

    async fn reject_swap_request(&self, id: SwapRequestId) -> Result<SwapRequest, SchedulingError> {
        let mut tx = self.transactions.begin().await?;
        let request = match Self::reject_in(tx.as_mut(), id).await {
            Ok(request) => request,
            Err(e) => {
                log_transition_failure(id, "rejected", &e);
                return Err(e);
            }
        };
        tx.commit().await.inspect_err(|e| log_transition_failure(id, "rejected", &SchedulingError::from(e.clone())))?;

        metrics::counter!("rota_swap_requests_total", "outcome" => "rejected").increment(1);
        info!(swap_request_id = %id, "Swap request rejected");
        self.event_bus.publish(SchedulingEvent::SwapRequestRejected {
            swap_request_id: id,
            rejected_at: Utc::now(),
        });
        Ok(request)
    }
}
