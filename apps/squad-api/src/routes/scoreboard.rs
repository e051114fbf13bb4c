//! Score reporting and ranking endpoints.

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ApiError, ApiErrorBody};
use crate::ledger::ScoreRecord;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/score", post(report_score))
        .route("/scoreboard", get(top_scores))
}

// ---------------------------------------------------------------------------
// POST /api/v1/score
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct ScoreReportRequest {
    pub name: String,
    /// Meters covered since the last report.
    pub distance: f64,
}

/// `POST /api/v1/score` — Accumulate distance for a player.
#[utoipa::path(
    post,
    path = "/api/v1/score",
    tag = "Score",
    request_body = ScoreReportRequest,
    responses(
        (status = 200, description = "Updated score record", body = ScoreRecord),
        (status = 400, description = "Validation error", body = ApiErrorBody),
    ),
)]
pub async fn report_score(
    State(state): State<AppState>,
    Json(body): Json<ScoreReportRequest>,
) -> Result<Json<ScoreRecord>, ApiError> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("Name must not be empty"));
    }
    if !body.distance.is_finite() || body.distance < 0.0 {
        return Err(ApiError::bad_request(
            "Distance must be a non-negative number",
        ));
    }

    let record = state.ledger.report(name, body.distance).await?;
    Ok(Json(record))
}

// ---------------------------------------------------------------------------
// GET /api/v1/scoreboard
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ScoreboardParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScoreboardResponse {
    pub data: Vec<ScoreRecord>,
}

/// `GET /api/v1/scoreboard` — Ranked top-N players.
#[utoipa::path(
    get,
    path = "/api/v1/scoreboard",
    tag = "Score",
    params(
        ("limit" = Option<usize>, Query, description = "Max rows, 1-100, default 10"),
    ),
    responses(
        (status = 200, description = "Ranked scores", body = ScoreboardResponse),
    ),
)]
pub async fn top_scores(
    State(state): State<AppState>,
    Query(params): Query<ScoreboardParams>,
) -> Json<ScoreboardResponse> {
    let limit = params.limit.unwrap_or(10).clamp(1, 100);

    // Ranking is best-effort: a ledger failure yields an empty board, never
    // a failed response.
    let data = match state.ledger.top(limit).await {
        Ok(rows) => rows,
        Err(err) => {
            tracing::warn!(?err, "scoreboard query failed; returning empty result");
            Vec::new()
        }
    };

    Json(ScoreboardResponse { data })
}
