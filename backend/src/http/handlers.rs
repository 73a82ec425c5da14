//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! repository or the rhythm service.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;

use super::dto::{
    DeleteUserResponse, HealthResponse, RecalculateResponse, RhythmResponse, SampleListResponse,
    UpsertSamplesRequest, UpsertSamplesResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::db::{SampleSource, SampleStore};
use crate::models::UserId;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the store is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Samples
// =============================================================================

/// GET /v1/users/{user_id}/samples
pub async fn list_samples(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> HandlerResult<SampleListResponse> {
    let user_id = UserId::new(user_id);
    let samples = state.repository.load_samples(user_id).await?;
    let total = samples.len();

    Ok(Json(SampleListResponse {
        user_id,
        samples,
        total,
    }))
}

/// PUT /v1/users/{user_id}/samples
///
/// Record one or more days. Analysis is not run inline; the change feed
/// schedules it once the burst of writes settles.
pub async fn upsert_samples(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(request): Json<UpsertSamplesRequest>,
) -> HandlerResult<UpsertSamplesResponse> {
    let user_id = UserId::new(user_id);
    if request.samples.is_empty() {
        return Err(AppError::BadRequest("No samples in request".to_string()));
    }

    let accepted = request.samples.len();
    for sample in request.samples {
        state.repository.upsert_sample(user_id, sample).await?;
    }
    let total_samples = state.repository.sample_count(user_id).await?;

    Ok(Json(UpsertSamplesResponse {
        user_id,
        accepted,
        total_samples,
    }))
}

// =============================================================================
// Rhythm
// =============================================================================

/// GET /v1/users/{user_id}/rhythm
///
/// Latest stored result, with a staleness flag against the current history.
pub async fn get_rhythm(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> HandlerResult<RhythmResponse> {
    let user_id = UserId::new(user_id);
    let status = state.service.status(user_id).await?;
    Ok(Json(RhythmResponse::from_status(user_id, status)))
}

/// POST /v1/users/{user_id}/rhythm/recalculate
///
/// Recompute now, ignoring the cadence.
pub async fn recalculate_rhythm(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> HandlerResult<RecalculateResponse> {
    let user_id = UserId::new(user_id);
    let outcome = state.service.force_recalculation(user_id).await?;
    Ok(Json(RecalculateResponse::from_outcome(user_id, outcome)))
}

/// GET /v1/users/{user_id}/rhythm/events
///
/// Stream results via Server-Sent Events (SSE). The current value is sent
/// first, then every newly published result. A `cleared` event signals a
/// reset.
pub async fn stream_rhythm_events(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut updates = state.service.subscribe(UserId::new(user_id));

    let stream = async_stream::stream! {
        loop {
            let current = updates.borrow_and_update().clone();
            let event = match current {
                Some(result) => Event::default()
                    .event("rhythm")
                    .data(serde_json::to_string(result.as_ref()).unwrap_or_default()),
                None => Event::default().event("cleared").data("{}"),
            };
            yield Ok(event);

            if updates.changed().await.is_err() {
                break;
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

// =============================================================================
// Users
// =============================================================================

/// DELETE /v1/users/{user_id}
///
/// Remove a user's history and result, cancelling any analysis in flight.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<(StatusCode, Json<DeleteUserResponse>), AppError> {
    let user_id = UserId::new(user_id);
    let samples_removed = state.repository.clear_samples(user_id).await?;
    state.service.reset(user_id).await?;

    Ok((
        StatusCode::OK,
        Json(DeleteUserResponse {
            user_id,
            samples_removed,
        }),
    ))
}
