// Copyright (c) 2026 Rota Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! # HTTP API
//!
//! JSON routes under `/api`. Every response, success or failure, uses the
//! `{success, message?, data?, error?}` envelope.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::application::error::SchedulingError;
use crate::application::repository_factory::SchedulingServices;
use crate::application::schedule_service::ScheduleRequest;
use crate::application::swap_workflow::SwapRequestBody;
use crate::domain::conflict::VolunteerConflict;
use crate::domain::directory::{EventId, VolunteerId};
use crate::domain::schedule::{Schedule, ScheduleId};
use crate::domain::swap_request::{SwapRequest, SwapRequestId, SwapRequestStatus};
use crate::domain::views::{ScheduleDetail, SwapRequestDetail, VolunteerScheduleDetail};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            error: None,
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            data: None,
            error: Some(error.into()),
        }
    }
}

impl SchedulingError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SchedulingError::Validation(_) | SchedulingError::Conflict(_) | SchedulingError::InvalidState(_) => {
                StatusCode::BAD_REQUEST
            }
            SchedulingError::NotFound(_) => StatusCode::NOT_FOUND,
            SchedulingError::Store(_) | SchedulingError::Notification(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SchedulingError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        (status, Json(ApiResponse::failure(self.to_string()))).into_response()
    }
}

impl From<JsonRejection> for SchedulingError {
    fn from(rejection: JsonRejection) -> Self {
        SchedulingError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), SchedulingError>;

fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(ApiResponse::data(data))))
}

fn parse_id(raw: &str, what: &str) -> Result<i64, SchedulingError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(SchedulingError::Validation(format!("Invalid {} ID", what))),
    }
}

#[derive(Debug, Deserialize)]
struct SwapRequestFilter {
    status: Option<String>,
}

pub fn app(services: SchedulingServices, allow_cors: bool) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/swap-requests", get(list_swap_requests).post(create_swap_request))
        .route("/swap-requests/{id}", get(get_swap_request))
        .route("/swap-requests/{id}/approve", put(approve_swap_request))
        .route("/swap-requests/{id}/reject", put(reject_swap_request))
        .route("/schedules", get(list_schedules).post(create_schedule))
        .route(
            "/schedules/{id}",
            get(get_schedule).put(update_schedule).delete(delete_schedule),
        )
        .route("/schedules/event/{event_id}", get(schedules_for_event))
        .route("/schedules/volunteer/{volunteer_id}", get(schedules_for_volunteer))
        .route("/conflicts", get(list_conflicts))
        .with_state(services);

    let router = Router::new().nest("/api", api).layer(TraceLayer::new_for_http());
    if allow_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

async fn health() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::with_message(
        "Rota scheduler is running",
        json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }),
    ))
}

async fn create_swap_request(
    State(services): State<SchedulingServices>,
    body: Result<Json<SwapRequestBody>, JsonRejection>,
) -> ApiResult<SwapRequest> {
    let Json(body) = body?;
    let created = services.swap_requests.create_swap_request(body).await?;
    let message = created.message();
    Ok((StatusCode::CREATED, Json(ApiResponse::with_message(message, created.request))))
}

async fn list_swap_requests(
    State(services): State<SchedulingServices>,
    Query(filter): Query<SwapRequestFilter>,
) -> ApiResult<Vec<SwapRequestDetail>> {
    let status = filter
        .status
        .map(|raw| raw.parse::<SwapRequestStatus>())
        .transpose()
        .map_err(|_| SchedulingError::Validation("Invalid status filter".to_string()))?;
    ok(services.swap_requests.list_swap_requests(status).await?)
}

async fn get_swap_request(
    State(services): State<SchedulingServices>,
    Path(id): Path<String>,
) -> ApiResult<SwapRequest> {
    let id = SwapRequestId(parse_id(&id, "swap request")?);
    ok(services.swap_requests.get_swap_request(id).await?)
}

async fn approve_swap_request(
    State(services): State<SchedulingServices>,
    Path(id): Path<String>,
) -> ApiResult<SwapRequest> {
    let id = SwapRequestId(parse_id(&id, "swap request")?);
    let request = services.swap_requests.approve_swap_request(id).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::with_message("Swap request approved successfully", request)),
    ))
}

async fn reject_swap_request(
    State(services): State<SchedulingServices>,
    Path(id): Path<String>,
) -> ApiResult<SwapRequest> {
    let id = SwapRequestId(parse_id(&id, "swap request")?);
    let request = services.swap_requests.reject_swap_request(id).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::with_message("Swap request rejected successfully", request)),
    ))
}

async fn create_schedule(
    State(services): State<SchedulingServices>,
    body: Result<Json<ScheduleRequest>, JsonRejection>,
) -> ApiResult<Schedule> {
    let Json(body) = body?;
    let schedule = services.schedules.create_schedule(body).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Schedule created successfully", schedule)),
    ))
}

async fn list_schedules(State(services): State<SchedulingServices>) -> ApiResult<Vec<Schedule>> {
    ok(services.schedules.list_schedules().await?)
}

async fn get_schedule(State(services): State<SchedulingServices>, Path(id): Path<String>) -> ApiResult<Schedule> {
    let id = ScheduleId(parse_id(&id, "schedule")?);
    ok(services.schedules.get_schedule(id).await?)
}

async fn update_schedule(
    State(services): State<SchedulingServices>,
    Path(id): Path<String>,
    body: Result<Json<ScheduleRequest>, JsonRejection>,
) -> ApiResult<Schedule> {
    let id = ScheduleId(parse_id(&id, "schedule")?);
    let Json(body) = body?;
    let schedule = services.schedules.update_schedule(id, body).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::with_message("Schedule updated successfully", schedule)),
    ))
}

async fn delete_schedule(State(services): State<SchedulingServices>, Path(id): Path<String>) -> ApiResult<()> {
    let id = ScheduleId(parse_id(&id, "schedule")?);
    services.schedules.delete_schedule(id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::message("Schedule deleted successfully"))))
}

async fn schedules_for_event(
    State(services): State<SchedulingServices>,
    Path(event_id): Path<String>,
) -> ApiResult<Vec<ScheduleDetail>> {
    let event_id = EventId(parse_id(&event_id, "event")?);
    ok(services.schedules.schedules_for_event(event_id).await?)
}

async fn schedules_for_volunteer(
    State(services): State<SchedulingServices>,
    Path(volunteer_id): Path<String>,
) -> ApiResult<Vec<VolunteerScheduleDetail>> {
    let volunteer_id = VolunteerId(parse_id(&volunteer_id, "volunteer")?);
    ok(services.schedules.schedules_for_volunteer(volunteer_id).await?)
}

async fn list_conflicts(State(services): State<SchedulingServices>) -> ApiResult<Vec<VolunteerConflict>> {
    ok(services.conflicts.list_conflicts().await?)
}
