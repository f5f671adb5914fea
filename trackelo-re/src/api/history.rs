//! Comparison history endpoint

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use trackelo_common::db::models::ComparisonRecord;

use crate::api::parse_scope;
use crate::db::history;
use crate::error::Result;
use crate::AppState;

const PAGE_SIZE: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub scope: String,
    pub page: Option<u32>,
}

/// One page of comparison records, newest first
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub scope: String,
    pub page: u32,
    pub page_size: i64,
    pub total: i64,
    pub records: Vec<ComparisonRecord>,
}

/// GET /api/history?scope=&page=
///
/// Audit view over the append-only comparison log. Pages are 1-based;
/// an out-of-range page returns an empty record list, not an error.
pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>> {
    let scope = parse_scope(&query.scope)?;
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page as i64 - 1) * PAGE_SIZE;

    let total = history::count_in_scope(&state.db, scope).await?;
    let records = history::list_for_scope(&state.db, scope, PAGE_SIZE, offset).await?;

    Ok(Json(HistoryResponse {
        scope: scope.to_string(),
        page,
        page_size: PAGE_SIZE,
        total,
        records,
    }))
}
