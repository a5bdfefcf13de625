//! The Glicko rating algorithm, in the single-comparison form used for low-volume ranking.
//!
//! Every comparison is applied immediately instead of being collected into a rating period,
//! so the rating deviation shrinks with each observed outcome and never grows back.
//! Ratings use the logistic base-10, scale-400 convention of Elo and Glicko.
//!
//! # Quickstart
//!
//! ```rust
//! use lowvol_rating::glicko::{GlickoConfig, GlickoRating, glicko_score};
//!
//! // Initialise a new entity with a rating of 0 and a deviation of 350.
//! let entity_one = GlickoRating::new();
//!
//! // Or with your own values, imagine these being pulled from a previous session.
//! let entity_two = GlickoRating {
//!     rating: 120.0,
//!     deviation: 80.0,
//! };
//!
//! // Entity one was preferred: a score of 1.0 from its side, 0.0 from the other.
//! // Both sides are updated from the same pre-comparison state.
//! let config = GlickoConfig::new();
//! let new_one = glicko_score(&entity_one, &entity_two, 1.0, &config);
//! let new_two = glicko_score(&entity_two, &entity_one, 0.0, &config);
//!
//! assert!(new_one.rating > entity_one.rating);
//! assert!(new_two.rating < entity_two.rating);
//! ```
//!
//! # More Information
//! - [Mark Glickman's paper (PDF)](http://www.glicko.net/glicko/glicko.pdf)
//! - [Glicko rating system Wikipedia](https://en.wikipedia.org/wiki/Glicko_rating_system)

use std::f64::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// `ln(10) / 400`, the scale factor between the base-10 logistic curve and natural units.
pub const Q: f64 = std::f64::consts::LN_10 / 400.0;

/// Rating given to an entity nobody has told us anything about.
pub const DEFAULT_RATING: f64 = 0.0;

/// Deviation given to an entity nobody has told us anything about.
pub const DEFAULT_DEVIATION: f64 = 350.0;

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
/// The Glicko rating of an entity.
///
/// The default rating is 0.0.
/// The default deviation is 350.0.
pub struct GlickoRating {
    /// The entity's Glicko rating number, by default 0.0.
    pub rating: f64,
    /// The entity's Glicko deviation number, by default 350.0.
    pub deviation: f64,
}

impl GlickoRating {
    #[must_use]
    /// Initialise a new `GlickoRating` with a rating of 0.0 and a deviation of 350.0.
    pub const fn new() -> Self {
        Self {
            rating: DEFAULT_RATING,
            deviation: DEFAULT_DEVIATION,
        }
    }
}

impl Default for GlickoRating {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
/// Constants used in the Glicko calculations.
pub struct GlickoConfig {
    /// The lower bound of the deviation after an update.
    /// Without it a long run of comparisons drives the deviation towards 0,
    /// where `1 / deviation²` blows up.
    /// An entity that already sits below the floor keeps its deviation: updates never raise it.
    /// By default set to `0.0`, which leaves the deviation unclamped.
    /// Do not set this to a negative value.
    pub rd_floor: f64,
}

impl GlickoConfig {
    #[must_use]
    /// Initialise a new `GlickoConfig` with an `rd_floor` of `0.0`.
    pub const fn new() -> Self {
        Self { rd_floor: 0.0 }
    }

    #[must_use]
    /// Sets the deviation floor.
    pub const fn rd_floor(mut self, rd_floor: f64) -> Self {
        self.rd_floor = rd_floor;
        self
    }
}

impl Default for GlickoConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[must_use]
/// Calculates the new [`GlickoRating`] of `player` after one comparison with a graded `score`.
///
/// `score` is in `[0, 1]` from the perspective of `player`: 1 is a clear win, 0 a clear loss,
/// 0.5 a draw, and anything in between a preference of that strength.
/// The opponent is left untouched; call this twice with swapped arguments
/// (and `1 - score`) to update both sides.
///
/// # Examples
/// ```rust
/// # use assert_eq_float::assert_eq_float;
/// use lowvol_rating::glicko::{GlickoConfig, GlickoRating, glicko_score};
///
/// let player = GlickoRating {
///     rating: 1500.0,
///     deviation: 200.0,
/// };
/// let opponent = GlickoRating {
///     rating: 1400.0,
///     deviation: 30.0,
/// };
///
/// let new_player = glicko_score(&player, &opponent, 1.0, &GlickoConfig::new());
///
/// assert_eq_float!(new_player.rating.round(), 1563.0);
/// assert_eq_float!(new_player.deviation.round(), 175.0);
///
/// // Two fresh entities, the first one clearly preferred.
/// let fresh = GlickoRating::new();
/// let winner = glicko_score(&fresh, &fresh, 1.0, &GlickoConfig::new());
/// let loser = glicko_score(&fresh, &fresh, 0.0, &GlickoConfig::new());
///
/// assert_eq_float!((winner.rating * 100.0).round(), 16221.0);
/// assert_eq_float!((winner.deviation * 100.0).round(), 29023.0);
/// assert_eq_float!((loser.rating * 100.0).round(), -16221.0);
/// ```
pub fn glicko_score(
    player: &GlickoRating,
    opponent: &GlickoRating,
    score: f64,
    config: &GlickoConfig,
) -> GlickoRating {
    let g = g_value(opponent.deviation);
    let expected = expected_with_g(player.rating, opponent.rating, g);
    let d_sq = d_squared(g, expected);

    let precision = player.deviation.powi(2).recip() + d_sq.recip();

    GlickoRating {
        rating: new_rating(player.rating, precision, g, score, expected),
        deviation: new_deviation(precision, config.rd_floor.min(player.deviation)),
    }
}

#[must_use]
/// Probability, in `(0, 1)`, that `player` is preferred over `opponent`.
///
/// The rating difference is damped by the *opponent's* deviation only,
/// so swapping the arguments does not generally give `1 - p`.
///
/// # Examples
/// ```rust
/// # use assert_eq_float::assert_eq_float;
/// use lowvol_rating::glicko::{GlickoRating, expected_outcome};
///
/// let player = GlickoRating {
///     rating: 100.0,
///     deviation: 50.0,
/// };
/// let opponent = GlickoRating {
///     rating: 100.0,
///     deviation: 300.0,
/// };
///
/// assert_eq_float!(expected_outcome(&player, &opponent), 0.5);
/// ```
pub fn expected_outcome(player: &GlickoRating, opponent: &GlickoRating) -> f64 {
    expected_with_g(player.rating, opponent.rating, g_value(opponent.deviation))
}

#[must_use]
/// Approximate variance of the outcome of a comparison between `player` and `opponent`.
///
/// This is not the Glicko `d²` term. It is an information proxy used to pick opponents:
/// `p = 10^((rating − opponent_rating) / 400)`, `frac = p / (1 + p)²`,
/// `variance = frac² · (rd² + opponent_rd²)`.
/// Close ratings and high combined deviation give the largest values.
///
/// # Examples
/// ```rust
/// use lowvol_rating::glicko::{GlickoRating, score_variance};
///
/// let player = GlickoRating::new();
/// let close = GlickoRating::new();
/// let far = GlickoRating {
///     rating: 1000.0,
///     deviation: 50.0,
/// };
///
/// assert!(score_variance(&player, &close) > score_variance(&player, &far));
/// ```
pub fn score_variance(player: &GlickoRating, opponent: &GlickoRating) -> f64 {
    let p10 = 10f64.powf((player.rating - opponent.rating) / 400.0);
    let frac = p10 / (1.0 + p10).powi(2);

    frac.powi(2) * player.deviation.mul_add(player.deviation, opponent.deviation.powi(2))
}

#[must_use]
/// The Glicko `g` factor, which damps the rating difference by the opponent's deviation.
///
/// `g(rd) = 1 / sqrt(1 + 3·Q²·rd² / π²)`. Equals 1.0 for a perfectly known opponent
/// and falls towards 0.0 as the deviation grows.
pub fn g_value(deviation: f64) -> f64 {
    (3.0 * Q.powi(2) / PI.powi(2))
        .mul_add(deviation.powi(2), 1.0)
        .sqrt()
        .recip()
}

#[must_use]
/// The interval `rating ± z · deviation`.
///
/// `z = 1.96` gives the usual 95% interval.
///
/// # Examples
/// ```rust
/// # use assert_eq_float::assert_eq_float;
/// use lowvol_rating::glicko::{GlickoRating, confidence_interval};
///
/// let player = GlickoRating {
///     rating: 100.0,
///     deviation: 50.0,
/// };
///
/// let (low, high) = confidence_interval(&player, 2.0);
///
/// assert_eq_float!(low, 0.0);
/// assert_eq_float!(high, 200.0);
/// ```
pub fn confidence_interval(player: &GlickoRating, z: f64) -> (f64, f64) {
    (
        z.mul_add(-player.deviation, player.rating),
        z.mul_add(player.deviation, player.rating),
    )
}

fn expected_with_g(rating: f64, opponent_rating: f64, g: f64) -> f64 {
    (10f64.powf(-g * (rating - opponent_rating) / 400.0) + 1.0).recip()
}

// The "effective number of comparisons" variance term.
fn d_squared(g: f64, expected: f64) -> f64 {
    (Q.powi(2) * g.powi(2) * expected * (1.0 - expected)).recip()
}

fn new_rating(rating: f64, precision: f64, g: f64, score: f64, expected: f64) -> f64 {
    (Q / precision * g).mul_add(score - expected, rating)
}

fn new_deviation(precision: f64, floor: f64) -> f64 {
    precision.recip().sqrt().max(floor)
}
