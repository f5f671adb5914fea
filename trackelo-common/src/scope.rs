//! Rating scope type
//!
//! Every rating, comparison, and session is tracked within a scope: either
//! the library-wide `global` scope or one specific playlist. Scopes are
//! persisted as a single TEXT column holding the literal string `global`
//! or the playlist UUID.

use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Database encoding of the global scope
pub const GLOBAL_SCOPE: &str = "global";

/// The context a rating is tracked in: library-wide or one playlist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Global,
    Playlist(Uuid),
}

impl Scope {
    pub fn is_global(&self) -> bool {
        matches!(self, Scope::Global)
    }

    /// Playlist id for playlist scopes, None for global
    pub fn playlist_id(&self) -> Option<Uuid> {
        match self {
            Scope::Global => None,
            Scope::Playlist(id) => Some(*id),
        }
    }

    /// TEXT value stored in the `scope` columns
    pub fn as_db_value(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => f.write_str(GLOBAL_SCOPE),
            Scope::Playlist(id) => write!(f, "{}", id),
        }
    }
}

impl FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == GLOBAL_SCOPE {
            return Ok(Scope::Global);
        }
        Uuid::parse_str(s)
            .map(Scope::Playlist)
            .map_err(|_| Error::InvalidInput(format!("Invalid scope: '{}'", s)))
    }
}

impl From<Option<Uuid>> for Scope {
    fn from(playlist_id: Option<Uuid>) -> Self {
        match playlist_id {
            Some(id) => Scope::Playlist(id),
            None => Scope::Global,
        }
    }
}

impl Serialize for Scope {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Scope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
