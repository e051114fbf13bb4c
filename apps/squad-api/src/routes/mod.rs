pub mod health;
pub mod runs;
pub mod scoreboard;

use axum::Router;
use utoipa::OpenApi;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(crate::gateway::server::router())
        .nest("/api/v1", runs::router().merge(scoreboard::router()))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health,
        // Runs
        runs::start_run,
        // Score
        scoreboard::report_score,
        scoreboard::top_scores,
    ),
    components(
        schemas(
            // Error types
            crate::error::ApiErrorBody,
            crate::error::ApiErrorDetail,
            // Models
            crate::ledger::ScoreRecord,
            // Route request/response types
            health::HealthResponse,
            runs::StartRunResponse,
            scoreboard::ScoreReportRequest,
            scoreboard::ScoreboardResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check"),
        (name = "Runs", description = "Run lifecycle"),
        (name = "Score", description = "Score reporting and ranking"),
    )
)]
pub struct ApiDoc;
