//! Elo rating update math
//!
//! Pure functions with no side effects. Each comparison moves both
//! ratings by the same magnitude in opposite directions:
//!
//! ```text
//! expected(r_self, r_opp) = 1 / (1 + 10^((r_opp - r_self) / 400))
//! new_rating(r) = r + k * (actual - expected)
//! ```
//!
//! `actual` is 1.0 for the winner and 0.0 for the loser; draws are not
//! modeled. `k` caps the per-comparison swing.

/// Which side of a comparison pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

/// Expected score of `r_self` against `r_opponent`
///
/// Logistic curve in the rating difference: 0.5 at equal ratings,
/// approaching 1.0 as `r_self` pulls ahead. A 400-point advantage gives
/// an expected score of about 0.909.
pub fn expected_score(r_self: f64, r_opponent: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((r_opponent - r_self) / 400.0))
}

/// Apply one comparison result to a rating pair
///
/// Returns `(new_a, new_b)`. Zero-sum: `new_a - r_a == -(new_b - r_b)`
/// up to floating-point rounding.
pub fn update(r_a: f64, r_b: f64, winner: Side, k: f64) -> (f64, f64) {
    let expected_a = expected_score(r_a, r_b);
    let expected_b = expected_score(r_b, r_a);

    let (actual_a, actual_b) = match winner {
        Side::A => (1.0, 0.0),
        Side::B => (0.0, 1.0),
    };

    let new_a = r_a + k * (actual_a - expected_a);
    let new_b = r_b + k * (actual_b - expected_b);

    (new_a, new_b)
}
