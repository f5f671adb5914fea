//! Global propagation gate
//!
//! A playlist-scoped comparison also updates a track's global rating only
//! while that track is still "new" to the playlist: its playlist-scope
//! comparison count, measured immediately before the comparison, must be
//! under the configured threshold. The gate is evaluated independently
//! per track, so one side of a pair may propagate while the other does
//! not.

/// Does this playlist comparison also update the track's global rating?
///
/// `scope_comparison_count` is the track's comparison count in the
/// playlist scope *before* this comparison. With the default threshold of
/// 5, a track's first five playlist comparisons propagate (counts 0-4)
/// and the sixth (count 5) does not.
pub fn propagates_to_global(scope_comparison_count: i64, threshold: i64) -> bool {
    scope_comparison_count < threshold
}
