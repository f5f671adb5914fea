//! Database queries for the rating engine
//!
//! One module per table. Functions ending in `_tx` run inside a caller
//! transaction so multi-table writes commit atomically.

pub mod history;
pub mod playlists;
pub mod ratings;
pub mod sessions;

use crate::error::{Error, Result};
use uuid::Uuid;

/// Parse a guid column value, surfacing corrupt rows as internal errors
pub(crate) fn parse_guid(value: &str, column: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| Error::Internal(format!("Invalid {} GUID: {}", column, e)))
}
