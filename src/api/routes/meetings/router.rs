//! Router for the meetings API

use std::sync::{Arc, RwLock};

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use axum_extra::extract::Query;
use chrono::Utc;
use http::StatusCode;
use tokio_rusqlite::Connection;

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::core::AppConfig;
use crate::meetings::{self, InviteeResponse};
use crate::scheduling::AvailabilityWindow;

type SharedState = Arc<RwLock<AppState>>;

// Everything a handler needs, cloned out so no lock is held across an
// await point
fn db_and_config(state: &SharedState) -> (Connection, AppConfig) {
    let shared_state = state.read().expect("Unable to read share state");
    (shared_state.db.clone(), shared_state.config.clone())
}

async fn create_meeting(
    State(state): State<SharedState>,
    Json(payload): Json<public::CreateMeetingRequest>,
) -> Result<(StatusCode, Json<public::MeetingResponse>), ApiError> {
    let (db, config) = db_and_config(&state);
    let meeting =
        meetings::create_meeting(&db, payload, config.response_window_days, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(meeting.into())))
}

async fn list_meetings(
    State(state): State<SharedState>,
    Query(params): Query<public::ParticipantQuery>,
) -> Result<Json<Vec<public::MeetingResponse>>, ApiError> {
    let (db, _) = db_and_config(&state);
    let meetings = meetings::list_meetings_for(&db, &params.participant_id, Utc::now()).await?;
    Ok(Json(meetings.into_iter().map(Into::into).collect()))
}

async fn pending_count(
    State(state): State<SharedState>,
    Query(params): Query<public::ParticipantQuery>,
) -> Result<Json<public::PendingCountResponse>, ApiError> {
    let (db, _) = db_and_config(&state);
    let count = meetings::pending_invite_count(&db, &params.participant_id, Utc::now()).await?;
    Ok(Json(public::PendingCountResponse { count }))
}

async fn get_meeting(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(params): Query<public::ParticipantQuery>,
) -> Result<Json<public::MeetingResponse>, ApiError> {
    let (db, _) = db_and_config(&state);
    let meeting = meetings::get_meeting_for(&db, &id, &params.participant_id, Utc::now()).await?;
    Ok(Json(meeting.into()))
}

async fn list_responses(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(params): Query<public::ParticipantQuery>,
) -> Result<Json<Vec<InviteeResponse>>, ApiError> {
    let (db, _) = db_and_config(&state);
    let responses = meetings::list_responses(&db, &id, &params.participant_id, Utc::now()).await?;
    Ok(Json(responses))
}

async fn submit_window(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<public::SubmitWindowRequest>,
) -> Result<Json<public::SubmissionReceipt>, ApiError> {
    let (db, config) = db_and_config(&state);
    let receipt = meetings::submit_window(
        &db,
        config.response_policy,
        &id,
        &payload.participant_id,
        AvailabilityWindow::new(payload.start, payload.end),
        Utc::now(),
    )
    .await?;
    Ok(Json(receipt))
}

async fn submit_windows(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<public::SubmitWindowsRequest>,
) -> Result<Json<public::SubmissionReceipt>, ApiError> {
    let (db, config) = db_and_config(&state);
    let receipt = meetings::submit_windows(
        &db,
        config.response_policy,
        &id,
        &payload.participant_id,
        payload.windows,
        Utc::now(),
    )
    .await?;
    Ok(Json(receipt))
}

async fn suggestions(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(params): Query<public::ParticipantQuery>,
) -> Result<Json<Vec<public::CandidateSlot>>, ApiError> {
    let (db, config) = db_and_config(&state);
    let slots = meetings::request_suggestions(
        &db,
        &id,
        &params.participant_id,
        config.slot_options(),
        Utc::now(),
    )
    .await?;
    Ok(Json(slots))
}

async fn finalize(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<public::FinalizeRequest>,
) -> Result<Json<public::MeetingResponse>, ApiError> {
    let finalizer = state
        .read()
        .expect("Unable to read share state")
        .finalizer();
    let (actor, slot) = payload.into_parts();
    let meeting = finalizer.finalize(&id, &actor, slot, Utc::now()).await?;
    Ok(Json(meeting.into()))
}

/// Create the meetings router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", post(create_meeting).get(list_meetings))
        .route("/pending", get(pending_count))
        .route("/{id}", get(get_meeting))
        .route("/{id}/responses", get(list_responses).post(submit_window))
        .route("/{id}/responses/batch", post(submit_windows))
        .route("/{id}/suggestions", get(suggestions))
        .route("/{id}/finalize", post(finalize))
}
