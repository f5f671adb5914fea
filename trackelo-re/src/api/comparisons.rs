//! Comparison recording endpoint

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::parse_scope;
use crate::engine::ComparisonOutcome;
use crate::error::Result;
use crate::AppState;

/// POST /api/comparison request body
#[derive(Debug, Deserialize)]
pub struct ComparisonRequest {
    pub scope: String,
    pub track_a: Uuid,
    pub track_b: Uuid,
    pub winner: Uuid,
}

/// POST /api/comparison
///
/// Records one winner choice. Scope ratings move, a playlist comparison
/// may also move global ratings, and the scope's session advances, all
/// in one transaction. The outcome carries both new scope ratings and
/// any updated global ratings for dual-rating display.
pub async fn record_comparison(
    State(state): State<AppState>,
    Json(request): Json<ComparisonRequest>,
) -> Result<Json<ComparisonOutcome>> {
    let scope = parse_scope(&request.scope)?;
    let outcome = state
        .engine
        .record_comparison(scope, request.track_a, request.track_b, request.winner)
        .await?;

    Ok(Json(outcome))
}
