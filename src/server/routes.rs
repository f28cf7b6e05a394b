//! HTTP routes for the CRUD service

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use tracing::info;

use super::error::ApiError;
use super::storage::Storage;
use crate::models::{
    ExerciseCompletion, NewExerciseCompletion, NewSessionRecord, NewTrainingProgram,
    SessionPatch, SessionRecord, SettingsPatch, SyncPayload, TrainingProgram, UserSettings,
    UserStats,
};

type AppState = Arc<dyn Storage>;

/// Build the API router over any [`Storage`] backing.
pub fn router(storage: AppState) -> Router {
    Router::new()
        .route("/api/programs", get(list_programs).post(create_program))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", patch(update_session))
        .route("/api/exercises/complete", post(complete_exercise))
        .route(
            "/api/settings/:user_id",
            get(get_settings).patch(update_settings),
        )
        .route("/api/stats/:user_id", get(get_stats))
        .route("/api/sync-workout", post(sync_workout))
        .with_state(storage)
}

/// Bind and serve until shutdown.
pub async fn serve(storage: AppState, port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "API server listening");
    axum::serve(listener, router(storage)).await?;
    Ok(())
}

async fn list_programs(
    State(storage): State<AppState>,
) -> Result<Json<Vec<TrainingProgram>>, ApiError> {
    Ok(Json(storage.all_programs().await?))
}

async fn create_program(
    State(storage): State<AppState>,
    Json(new): Json<NewTrainingProgram>,
) -> Result<Json<TrainingProgram>, ApiError> {
    Ok(Json(storage.create_program(new).await?))
}

async fn create_session(
    State(storage): State<AppState>,
    Json(new): Json<NewSessionRecord>,
) -> Result<Json<SessionRecord>, ApiError> {
    Ok(Json(storage.create_session(new).await?))
}

async fn update_session(
    State(storage): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<SessionPatch>,
) -> Result<Json<SessionRecord>, ApiError> {
    Ok(Json(storage.update_session(&id, patch).await?))
}

async fn complete_exercise(
    State(storage): State<AppState>,
    Json(new): Json<NewExerciseCompletion>,
) -> Result<Json<ExerciseCompletion>, ApiError> {
    Ok(Json(storage.create_completion(new).await?))
}

async fn get_settings(
    State(storage): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserSettings>, ApiError> {
    Ok(Json(storage.settings(&user_id).await?))
}

async fn update_settings(
    State(storage): State<AppState>,
    Path(user_id): Path<String>,
    Json(patch): Json<SettingsPatch>,
) -> Result<Json<UserSettings>, ApiError> {
    Ok(Json(storage.update_settings(&user_id, patch).await?))
}

async fn get_stats(
    State(storage): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserStats>, ApiError> {
    Ok(Json(storage.stats(&user_id).await?))
}

async fn sync_workout(
    State(storage): State<AppState>,
    Json(payload): Json<SyncPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let sessions = payload.sessions.len();
    let completions = payload.completions.len();
    storage.sync_offline(payload).await?;
    info!(sessions, completions, "offline workout data synced");
    Ok(Json(serde_json::json!({ "success": true })))
}
