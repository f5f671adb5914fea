//! Rating read endpoints

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;
use trackelo_common::db::models::Rating;
use uuid::Uuid;

use crate::api::{parse_scope, ScopeQuery};
use crate::db::ratings;
use crate::error::Result;
use crate::AppState;

/// GET /api/rating/:track_id?scope=
///
/// Never-compared tracks get an unsaved preview at their starting value
/// (global default 1500, or the global rating for a playlist scope).
pub async fn get_rating(
    State(state): State<AppState>,
    Path(track_id): Path<Uuid>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<Rating>> {
    let scope = parse_scope(&query.scope)?;
    let rating = state.engine.get_rating(track_id, scope).await?;

    Ok(Json(rating))
}

/// One standings row
#[derive(Debug, Serialize)]
pub struct StandingsEntry {
    pub rank: usize,
    pub track_id: Uuid,
    pub title: Option<String>,
    pub value: f64,
    pub comparison_count: i64,
    pub wins: i64,
    pub losses: i64,
}

#[derive(Debug, Serialize)]
pub struct StandingsResponse {
    pub scope: String,
    pub entries: Vec<StandingsEntry>,
}

/// GET /api/standings?scope=
///
/// Every track with a rating row in the scope, highest value first,
/// joined with track titles where the track table has them.
pub async fn standings(
    State(state): State<AppState>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<StandingsResponse>> {
    let scope = parse_scope(&query.scope)?;
    let rows = ratings::standings(&state.db, scope).await?;

    let entries = rows
        .into_iter()
        .enumerate()
        .map(|(index, (rating, title))| StandingsEntry {
            rank: index + 1,
            track_id: rating.track_id,
            title,
            value: rating.value,
            comparison_count: rating.comparison_count,
            wins: rating.wins,
            losses: rating.losses,
        })
        .collect();

    Ok(Json(StandingsResponse {
        scope: scope.to_string(),
        entries,
    }))
}
