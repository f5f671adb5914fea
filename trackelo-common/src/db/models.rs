//! Database models

use crate::scope::Scope;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Rating assigned to every track on first comparison
pub const DEFAULT_RATING: f64 = 1500.0;

/// One rating row per (track, scope)
///
/// `comparison_count`, `wins`, and `losses` are materialized counters kept
/// in step with the comparison history; the history table is authoritative.
/// Invariant: `wins + losses == comparison_count`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub track_id: Uuid,
    pub scope: Scope,
    pub value: f64,
    pub comparison_count: i64,
    pub wins: i64,
    pub losses: i64,
    pub last_compared_at: Option<DateTime<Utc>>,
}

impl Rating {
    /// Fresh rating row, never compared
    pub fn new(track_id: Uuid, scope: Scope, value: f64) -> Self {
        Self {
            track_id,
            scope,
            value,
            comparison_count: 0,
            wins: 0,
            losses: 0,
            last_compared_at: None,
        }
    }
}

/// One append-only row per recorded comparison
///
/// Snapshot columns capture both tracks' ratings before and after, in the
/// comparison's own scope and in global scope. For global-scoped
/// comparisons the global columns are NULL (the scope columns already are
/// the global ratings) and both `affects_global` flags are false.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRecord {
    pub id: i64,
    pub track_a_id: Uuid,
    pub track_b_id: Uuid,
    pub winner_id: Uuid,
    pub scope: Scope,
    pub affects_global_a: bool,
    pub affects_global_b: bool,
    pub a_scope_before: f64,
    pub a_scope_after: f64,
    pub b_scope_before: f64,
    pub b_scope_after: f64,
    pub a_global_before: Option<f64>,
    pub a_global_after: Option<f64>,
    pub b_global_before: Option<f64>,
    pub b_global_after: Option<f64>,
    pub session_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

/// One resumable ranking session per scope
///
/// `total` is the number of distinct unordered candidate pairs, C(n, 2).
/// Completion is detected (`compared >= total`), never stored: a caller
/// can keep comparing past completion via repeat pairing, and candidate
/// growth recomputes `total` and reopens the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingSession {
    pub scope: Scope,
    pub session_id: Uuid,
    pub last_pair: Option<(Uuid, Uuid)>,
    pub compared: i64,
    pub total: i64,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RankingSession {
    pub fn is_complete(&self) -> bool {
        self.compared >= self.total
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
}

/// Number of distinct unordered pairs in a candidate set of size `n`
pub fn pair_count(n: usize) -> i64 {
    let n = n as i64;
    n * (n - 1) / 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rating_defaults() {
        let track = Uuid::new_v4();
        let rating = Rating::new(track, Scope::Global, DEFAULT_RATING);
        assert_eq!(rating.value, 1500.0);
        assert_eq!(rating.comparison_count, 0);
        assert_eq!(rating.wins, 0);
        assert_eq!(rating.losses, 0);
        assert!(rating.last_compared_at.is_none());
    }

    #[test]
    fn test_pair_count() {
        assert_eq!(pair_count(0), 0);
        assert_eq!(pair_count(1), 0);
        assert_eq!(pair_count(2), 1);
        assert_eq!(pair_count(3), 3);
        assert_eq!(pair_count(10), 45);
    }

    #[test]
    fn test_session_completion_detected_from_counts() {
        let mut session = RankingSession {
            scope: Scope::Global,
            session_id: Uuid::new_v4(),
            last_pair: None,
            compared: 0,
            total: 3,
            started_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(!session.is_complete());

        session.compared = 3;
        assert!(session.is_complete());

        // Repeat-mode comparisons can push past total
        session.compared = 4;
        assert!(session.is_complete());
    }
}
