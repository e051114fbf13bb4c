//! Run lifecycle endpoints.

use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use squadlink_common::id::{prefix, prefixed_ulid};

use crate::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct StartRunResponse {
    pub run_id: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/runs", post(start_run))
}

/// `POST /api/v1/runs` — Start a run, returning an opaque run identifier.
#[utoipa::path(
    post,
    path = "/api/v1/runs",
    tag = "Runs",
    responses(
        (status = 200, description = "Run started", body = StartRunResponse),
    ),
)]
pub async fn start_run() -> Json<StartRunResponse> {
    Json(StartRunResponse {
        run_id: prefixed_ulid(prefix::RUN),
    })
}
