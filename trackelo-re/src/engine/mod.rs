//! Rating engine
//!
//! Orchestrates a comparison from end to end: Elo updates in the
//! comparison's own scope, threshold-gated propagation into global
//! ratings, the append-only history record, and session progress. All
//! writes for one comparison share a single transaction.

pub mod elo;
pub mod pairing;
pub mod threshold;

pub use pairing::TieBreak;

use crate::db::{history, playlists, ratings, sessions};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::cmp::Ordering;
use std::sync::Arc;
use tokio::sync::RwLock;
use trackelo_common::db::models::{pair_count, ComparisonRecord, RankingSession, Rating, DEFAULT_RATING};
use trackelo_common::db::settings::{
    get_setting_or, DEFAULT_K_FACTOR, DEFAULT_PROPAGATION_THRESHOLD, SETTING_K_FACTOR,
    SETTING_PROPAGATION_THRESHOLD,
};
use trackelo_common::time::now;
use trackelo_common::Scope;
use tracing::{debug, info};
use uuid::Uuid;

/// Tunable rating parameters, loaded from the settings table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineParams {
    /// Elo K-factor: maximum rating swing per comparison
    pub k_factor: f64,
    /// Playlist comparisons per track that also update its global rating
    pub propagation_threshold: i64,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            k_factor: DEFAULT_K_FACTOR,
            propagation_threshold: DEFAULT_PROPAGATION_THRESHOLD,
        }
    }
}

impl EngineParams {
    /// Load parameters from the settings table, seeding defaults on first run
    pub async fn load(pool: &SqlitePool) -> Result<Self> {
        let k_factor = get_setting_or(pool, SETTING_K_FACTOR, DEFAULT_K_FACTOR).await?;
        let propagation_threshold =
            get_setting_or(pool, SETTING_PROPAGATION_THRESHOLD, DEFAULT_PROPAGATION_THRESHOLD)
                .await?;

        Ok(Self {
            k_factor,
            propagation_threshold,
        })
    }
}

/// Everything one recorded comparison changed
///
/// `global_a` / `global_b` are present only for the sides whose playlist
/// comparison propagated into the global scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonOutcome {
    pub record: ComparisonRecord,
    pub rating_a: Rating,
    pub rating_b: Rating,
    pub global_a: Option<Rating>,
    pub global_b: Option<Rating>,
    pub session: RankingSession,
}

/// Comparative rating engine over a shared SQLite pool
///
/// Cheap to clone; parameter updates through one clone are visible to
/// all others.
#[derive(Clone)]
pub struct RatingEngine {
    db: SqlitePool,
    params: Arc<RwLock<EngineParams>>,
    tie_break: TieBreak,
}

impl RatingEngine {
    pub fn new(db: SqlitePool, params: EngineParams) -> Self {
        Self::with_tie_break(db, params, TieBreak::default())
    }

    /// Engine with a deterministic tie-break, for reproducible runs
    pub fn with_tie_break(db: SqlitePool, params: EngineParams, tie_break: TieBreak) -> Self {
        Self {
            db,
            params: Arc::new(RwLock::new(params)),
            tie_break,
        }
    }

    pub async fn params(&self) -> EngineParams {
        *self.params.read().await
    }

    /// Replace the runtime parameters; callers persist to settings separately
    pub async fn set_params(&self, params: EngineParams) {
        *self.params.write().await = params;
    }

    /// Current rating of a track in a scope, without writing anything
    ///
    /// Tracks never compared in the scope get a preview row: the value a
    /// first comparison would start from. Playlist previews seed from the
    /// track's global rating when one exists.
    pub async fn get_rating(&self, track_id: Uuid, scope: Scope) -> Result<Rating> {
        if let Some(rating) = ratings::get(&self.db, track_id, scope).await? {
            return Ok(rating);
        }

        let value = match scope {
            Scope::Global => DEFAULT_RATING,
            Scope::Playlist(_) => ratings::get(&self.db, track_id, Scope::Global)
                .await?
                .map(|r| r.value)
                .unwrap_or(DEFAULT_RATING),
        };

        Ok(Rating::new(track_id, scope, value))
    }

    /// Open the scope's ranking session, or pick up the existing one
    ///
    /// A session survives restarts: one row per scope, found again by
    /// scope alone. When the candidate set has changed since the session
    /// was opened, `total` is recomputed from the current set and
    /// `compared` is left untouched, which can reopen a completed
    /// session.
    pub async fn start_or_resume(
        &self,
        scope: Scope,
        candidates: &[Uuid],
    ) -> Result<RankingSession> {
        let total = pair_count(candidates.len());

        if let Some(mut session) = sessions::get(&self.db, scope).await? {
            if session.total != total {
                let at = now();
                sessions::update_total(&self.db, scope, total, at).await?;
                info!(
                    "Session for {} rescoped: {} -> {} total pairs",
                    scope, session.total, total
                );
                session.total = total;
                session.updated_at = at;
            }
            return Ok(session);
        }

        let at = now();
        let session = RankingSession {
            scope,
            session_id: Uuid::new_v4(),
            last_pair: None,
            compared: 0,
            total,
            started_at: at,
            updated_at: at,
        };

        match sessions::create(&self.db, &session).await {
            Ok(()) => {
                info!(
                    "Started ranking session {} for {} ({} pairs)",
                    session.session_id, scope, total
                );
                Ok(session)
            }
            // Lost a create race; the surviving row is the session
            Err(Error::SessionConflict(_)) => sessions::get(&self.db, scope)
                .await?
                .ok_or_else(|| Error::Internal(format!("session for {} vanished", scope))),
            Err(e) => Err(e),
        }
    }

    /// Select the next pair to compare in a scope
    ///
    /// Returns None only when fewer than two candidates exist; a session
    /// is not opened in that case. Otherwise side A is the candidate with
    /// the fewest comparisons in the scope, paired with the least-compared
    /// candidate it has not faced yet, falling back to its least recently
    /// faced opponent once it has faced everyone. Completion is signaled
    /// by the session, never by this returning None.
    pub async fn get_next_pair(
        &self,
        scope: Scope,
        candidates: &[Uuid],
    ) -> Result<Option<(Uuid, Uuid)>> {
        if candidates.len() < 2 {
            return Ok(None);
        }

        let session = self.start_or_resume(scope, candidates).await?;

        let counts = history::counts_for_scope(&self.db, scope).await?;
        let ranked = pairing::rank_candidates(candidates, &counts, self.tie_break);
        let side_a = ranked[0];

        let partners = history::partners_of(&self.db, side_a, scope).await?;
        let side_b = match pairing::first_unpaired(&ranked[1..], &partners) {
            Some(id) => id,
            None => {
                // Side A has faced every candidate: repeat the stalest matchup
                let last = history::partner_last_compared(&self.db, side_a, scope).await?;
                match pairing::least_recently_paired(&ranked[1..], &last) {
                    Some(id) => id,
                    None => return Ok(None),
                }
            }
        };

        debug!(
            "Next pair for {}: {} vs {} ({}/{} compared)",
            scope, side_a, side_b, session.compared, session.total
        );

        Ok(Some((side_a, side_b)))
    }

    /// Record one comparison result
    ///
    /// In a single transaction: both tracks' ratings in the comparison's
    /// scope are Elo-updated, a playlist comparison additionally updates
    /// the global rating of each track still under the propagation
    /// threshold, a history record is appended, and the scope's session
    /// advances. The global delta is always computed from both tracks'
    /// global ratings; a past-threshold side simply discards its share.
    pub async fn record_comparison(
        &self,
        scope: Scope,
        track_a: Uuid,
        track_b: Uuid,
        winner: Uuid,
    ) -> Result<ComparisonOutcome> {
        if track_a == track_b {
            return Err(Error::InvalidComparison(format!(
                "cannot compare track {} against itself",
                track_a
            )));
        }
        if winner != track_a && winner != track_b {
            return Err(Error::InvalidComparison(format!(
                "winner {} is not one of the compared tracks",
                winner
            )));
        }

        let params = self.params().await;
        let at = now();
        let a_won = winner == track_a;
        let winner_side = if a_won { elo::Side::A } else { elo::Side::B };

        let mut tx = self.db.begin().await?;

        // Recording without a prior pair request still advances a session
        let session = match sessions::get_tx(&mut tx, scope).await? {
            Some(session) => session,
            None => {
                let session = RankingSession {
                    scope,
                    session_id: Uuid::new_v4(),
                    last_pair: None,
                    compared: 0,
                    total: 0,
                    started_at: at,
                    updated_at: at,
                };
                sessions::create_tx(&mut tx, &session).await?;
                session
            }
        };

        // Pre-comparison rows; playlist rows seed from global on first use.
        // The counts captured here drive the propagation gate.
        let before_a = ratings::get_or_init_tx(&mut tx, track_a, scope).await?;
        let before_b = ratings::get_or_init_tx(&mut tx, track_b, scope).await?;

        let (new_a, new_b) = elo::update(before_a.value, before_b.value, winner_side, params.k_factor);
        ratings::apply_result_tx(&mut tx, track_a, scope, new_a, a_won, at).await?;
        ratings::apply_result_tx(&mut tx, track_b, scope, new_b, !a_won, at).await?;

        let mut affects_global_a = false;
        let mut affects_global_b = false;
        let mut global_a = None;
        let mut global_b = None;
        let mut global_snapshots = (None, None, None, None);

        // For a global comparison the scope update above already was the
        // global update; only playlist comparisons propagate separately.
        if !scope.is_global() {
            let global_before_a = ratings::get_or_init_tx(&mut tx, track_a, Scope::Global).await?;
            let global_before_b = ratings::get_or_init_tx(&mut tx, track_b, Scope::Global).await?;

            let (global_new_a, global_new_b) = elo::update(
                global_before_a.value,
                global_before_b.value,
                winner_side,
                params.k_factor,
            );

            affects_global_a =
                threshold::propagates_to_global(before_a.comparison_count, params.propagation_threshold);
            affects_global_b =
                threshold::propagates_to_global(before_b.comparison_count, params.propagation_threshold);

            if affects_global_a {
                ratings::apply_result_tx(&mut tx, track_a, Scope::Global, global_new_a, a_won, at)
                    .await?;
                global_a = Some(applied(&global_before_a, global_new_a, a_won, at));
            }
            if affects_global_b {
                ratings::apply_result_tx(&mut tx, track_b, Scope::Global, global_new_b, !a_won, at)
                    .await?;
                global_b = Some(applied(&global_before_b, global_new_b, !a_won, at));
            }

            let after_a = if affects_global_a { global_new_a } else { global_before_a.value };
            let after_b = if affects_global_b { global_new_b } else { global_before_b.value };
            global_snapshots = (
                Some(global_before_a.value),
                Some(after_a),
                Some(global_before_b.value),
                Some(after_b),
            );
        }

        sessions::advance_tx(&mut tx, scope, (track_a, track_b), at).await?;
        let session_after = sessions::get_tx(&mut tx, scope)
            .await?
            .ok_or_else(|| Error::Internal(format!("session for {} vanished", scope)))?;

        let (a_global_before, a_global_after, b_global_before, b_global_after) = global_snapshots;
        let mut record = ComparisonRecord {
            id: 0,
            track_a_id: track_a,
            track_b_id: track_b,
            winner_id: winner,
            scope,
            affects_global_a,
            affects_global_b,
            a_scope_before: before_a.value,
            a_scope_after: new_a,
            b_scope_before: before_b.value,
            b_scope_after: new_b,
            a_global_before,
            a_global_after,
            b_global_before,
            b_global_after,
            session_id: session.session_id,
            timestamp: at,
        };
        record.id = history::append_tx(&mut tx, &record).await?;

        tx.commit().await?;

        info!(
            "Recorded comparison #{} in {}: winner {} ({:.1} -> {:.1} / {:.1} -> {:.1})",
            record.id, scope, winner, before_a.value, new_a, before_b.value, new_b
        );

        Ok(ComparisonOutcome {
            record,
            rating_a: applied(&before_a, new_a, a_won, at),
            rating_b: applied(&before_b, new_b, !a_won, at),
            global_a,
            global_b,
            session: session_after,
        })
    }

    /// Rewrite a playlist's track positions from its playlist-scope ratings
    ///
    /// Highest rating first. Tracks with no rating row sort after all
    /// rated tracks; the sort is stable, so ties and unrated tracks keep
    /// their prior relative order. Returns the number of tracks.
    pub async fn reorder_playlist_by_rating(&self, playlist_id: Uuid) -> Result<usize> {
        let scope = Scope::Playlist(playlist_id);
        let mut tx = self.db.begin().await?;

        let mut ordered = playlists::playlist_track_ids_tx(&mut tx, playlist_id).await?;
        let values = ratings::values_for_scope_tx(&mut tx, scope).await?;

        ordered.sort_by(|a, b| match (values.get(a), values.get(b)) {
            (Some(va), Some(vb)) => vb.partial_cmp(va).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });

        for (index, track_id) in ordered.iter().enumerate() {
            playlists::set_position_tx(&mut tx, playlist_id, *track_id, index as i64 + 1).await?;
        }

        tx.commit().await?;

        info!(
            "Reordered playlist {} by rating ({} tracks)",
            playlist_id,
            ordered.len()
        );
        Ok(ordered.len())
    }

    /// Seed playlist-scope rating rows for every track in a playlist
    ///
    /// Each missing row starts from the track's global rating. Existing
    /// rows are untouched, so re-running is harmless. Returns how many
    /// rows were created.
    pub async fn migrate_seed_playlist_ratings(&self, playlist_id: Uuid) -> Result<usize> {
        let scope = Scope::Playlist(playlist_id);
        let mut tx = self.db.begin().await?;

        let track_ids = playlists::playlist_track_ids_tx(&mut tx, playlist_id).await?;
        let mut seeded = 0usize;
        for track_id in &track_ids {
            if ratings::get_tx(&mut tx, *track_id, scope).await?.is_none() {
                ratings::get_or_init_tx(&mut tx, *track_id, scope).await?;
                seeded += 1;
            }
        }

        tx.commit().await?;

        info!(
            "Seeded {} playlist rating(s) for {} ({} already present)",
            seeded,
            playlist_id,
            track_ids.len() - seeded
        );
        Ok(seeded)
    }

    /// Drop a playlist scope's ratings and session
    ///
    /// Used when a playlist is deleted. History rows are kept: they are
    /// the audit trail, and global ratings already influenced by this
    /// scope stay as they are.
    pub async fn purge_scope(&self, playlist_id: Uuid) -> Result<()> {
        let scope = Scope::Playlist(playlist_id);
        let mut tx = self.db.begin().await?;

        let removed = ratings::delete_scope_tx(&mut tx, scope).await?;
        sessions::delete_tx(&mut tx, scope).await?;

        tx.commit().await?;

        info!("Purged scope {} ({} rating rows, history retained)", scope, removed);
        Ok(())
    }
}

/// Rating row as it looks after applying one comparison result
fn applied(before: &Rating, new_value: f64, won: bool, at: DateTime<Utc>) -> Rating {
    Rating {
        track_id: before.track_id,
        scope: before.scope,
        value: new_value,
        comparison_count: before.comparison_count + 1,
        wins: before.wins + if won { 1 } else { 0 },
        losses: before.losses + if won { 0 } else { 1 },
        last_compared_at: Some(at),
    }
}
