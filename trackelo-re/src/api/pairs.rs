//! Next pair selection endpoint

use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;
use trackelo_common::Scope;
use uuid::Uuid;

use crate::api::{parse_scope, ScopeQuery};
use crate::db::playlists;
use crate::error::Result;
use crate::AppState;

/// Next pair to compare; `pair` is null when fewer than two candidates
/// exist in the scope
#[derive(Debug, Serialize)]
pub struct NextPairResponse {
    pub scope: String,
    pub pair: Option<(Uuid, Uuid)>,
}

/// GET /api/next_pair?scope=
///
/// Candidates come from the playlist's membership for playlist scopes,
/// or from the whole track table for the global scope. A null pair means
/// there is nothing to rank, not that ranking is finished; completion is
/// read off the session.
pub async fn next_pair(
    State(state): State<AppState>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<NextPairResponse>> {
    let scope = parse_scope(&query.scope)?;
    let candidates = candidate_ids(&state, scope).await?;
    let pair = state.engine.get_next_pair(scope, &candidates).await?;

    Ok(Json(NextPairResponse {
        scope: scope.to_string(),
        pair,
    }))
}

/// Resolve the candidate track set for a scope
pub(crate) async fn candidate_ids(state: &AppState, scope: Scope) -> Result<Vec<Uuid>> {
    match scope {
        Scope::Global => playlists::all_track_ids(&state.db).await,
        Scope::Playlist(playlist_id) => {
            playlists::playlist_track_ids(&state.db, playlist_id).await
        }
    }
}
