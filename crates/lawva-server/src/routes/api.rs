//! Data endpoint routes: `/api/*`
//!
//! `GET /api/certification/{id}` is the provider the fetch controller talks
//! to. Responses are the canonical certification shape or a JSON error.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use lawva_core::model::Certification;

use crate::error::{AppError, parse_id};
use crate::state::AppState;

/// Build the `/api` router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/certification/{id}", get(get_certification))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Fetch one certification by numeric id.
async fn get_certification(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<Certification>, AppError> {
    let id = parse_id(&raw_id)?;
    let cert = state.repository.get(id).await?;
    tracing::debug!(id, "served certification");
    Ok(Json(cert))
}
