/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! HTTP transport over [`AlarmService`].
//!
//! | Route | Method | Operation |
//! |---|---|---|
//! | `/alarms` | GET | list all |
//! | `/alarm` | POST | create |
//! | `/alarm?id=` | GET / PUT / DELETE | get, update state, delete |
//! | `/alarms/bulk` | POST | bulk create |
//!
//! Every failure body is `{"error": "<message>"}`; a partially failed bulk
//! create additionally carries the `created` alarms.

mod error;

pub use error::ApiError;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::alarm::{Alarm, NewAlarm};
use crate::service::AlarmService;

/// Builds the router with `service` as shared state.
pub fn router(service: AlarmService) -> Router {
    Router::new()
        .route("/alarms", get(get_all_alarms))
        .route(
            "/alarm",
            get(get_alarm)
                .post(create_alarm)
                .put(update_alarm_state)
                .delete(delete_alarm),
        )
        .route("/alarms/bulk", post(bulk_create_alarms))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

// ── Request shapes ────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct IdQuery {
    id: Option<String>,
}

impl IdQuery {
    fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct StateUpdate {
    #[serde(default)]
    state: String,
}

// ── Handlers ──────────────────────────────────────────────────────────────────

async fn create_alarm(
    State(service): State<AlarmService>,
    payload: Result<Json<NewAlarm>, JsonRejection>,
) -> Result<(StatusCode, Json<Alarm>), ApiError> {
    let Json(entry) = payload.map_err(|_| ApiError::bad_request("Invalid request payload"))?;
    let alarm = service.create(entry).await?;
    Ok((StatusCode::CREATED, Json(alarm)))
}

async fn bulk_create_alarms(
    State(service): State<AlarmService>,
    payload: Result<Json<Vec<NewAlarm>>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(entries) = payload
        .map_err(|_| ApiError::bad_request("Invalid request payload for bulk creation"))?;

    let outcome = service.bulk_create(entries).await;
    let response = match outcome.error() {
        None => (StatusCode::CREATED, Json(outcome.created)).into_response(),
        Some(err) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": err.to_string(),
                "created": outcome.created,
            })),
        )
            .into_response(),
    };
    Ok(response)
}

async fn get_all_alarms(State(service): State<AlarmService>) -> Json<Vec<Alarm>> {
    Json(service.get_all().await)
}

async fn get_alarm(
    State(service): State<AlarmService>,
    Query(query): Query<IdQuery>,
) -> Result<Json<Alarm>, ApiError> {
    Ok(Json(service.get_by_id(query.id()).await?))
}

async fn update_alarm_state(
    State(service): State<AlarmService>,
    Query(query): Query<IdQuery>,
    payload: Result<Json<StateUpdate>, JsonRejection>,
) -> Result<Json<Alarm>, ApiError> {
    let Json(update) = payload.map_err(|_| ApiError::bad_request("Invalid request payload"))?;
    Ok(Json(service.update_state(query.id(), &update.state).await?))
}

async fn delete_alarm(
    State(service): State<AlarmService>,
    Query(query): Query<IdQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if query.id().is_empty() {
        return Err(ApiError::bad_request("Alarm ID is required"));
    }
    let message = service.delete(query.id()).await?;
    Ok(Json(json!({ "message": message })))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
