//! HTTP API handlers for trackelo-re

pub mod comparisons;
pub mod health;
pub mod history;
pub mod pairs;
pub mod playlists;
pub mod ratings;
pub mod sessions;
pub mod settings;
pub mod version;

pub use comparisons::record_comparison;
pub use health::health;
pub use history::history;
pub use pairs::next_pair;
pub use playlists::{purge_ratings, reorder_playlist, seed_ratings};
pub use ratings::{get_rating, standings};
pub use sessions::session;
pub use settings::{get_settings, update_settings};
pub use version::version;

use crate::error::{Error, Result};
use serde::Deserialize;
use trackelo_common::Scope;

/// Query string carrying only a scope
#[derive(Debug, Deserialize)]
pub(crate) struct ScopeQuery {
    pub scope: String,
}

/// Parse a scope from the query string
///
/// Bad input is the client's mistake, so the common parse error is
/// remapped to the 400-mapped variant instead of surfacing as a 500.
pub(crate) fn parse_scope(value: &str) -> Result<Scope> {
    value
        .parse::<Scope>()
        .map_err(|_| Error::InvalidScope(value.to_string()))
}
