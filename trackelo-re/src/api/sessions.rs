//! Session inspection endpoint

use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;
use trackelo_common::db::models::RankingSession;

use crate::api::{parse_scope, ScopeQuery};
use crate::db::sessions;
use crate::error::{Error, Result};
use crate::AppState;

/// Session state plus the derived completion flag
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    #[serde(flatten)]
    pub session: RankingSession,
    pub complete: bool,
}

/// GET /api/session?scope=
///
/// Read-only: never opens a session. 404 when the scope has not started
/// ranking yet.
pub async fn session(
    State(state): State<AppState>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<SessionResponse>> {
    let scope = parse_scope(&query.scope)?;
    let session = sessions::get(&state.db, scope)
        .await?
        .ok_or_else(|| Error::NotFound(format!("no ranking session for scope '{}'", scope)))?;

    let complete = session.is_complete();
    Ok(Json(SessionResponse { session, complete }))
}
