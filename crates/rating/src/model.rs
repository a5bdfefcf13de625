//! Per-entity belief: a [`GlickoRating`] plus the number of comparisons it has absorbed.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::glicko::{GlickoConfig, GlickoRating, expected_outcome, glicko_score, score_variance};

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
/// One entity's skill estimate, its uncertainty and how often it was compared.
///
/// The model has no identity of its own; the ranker that owns it decides which slot it lives in.
pub struct RatingModel {
    state: GlickoRating,
    num_comparisons: u64,
    config: GlickoConfig,
}

impl RatingModel {
    #[must_use]
    /// Creates a model with the given initial belief and no comparisons.
    pub const fn new(rating: f64, rd: f64, config: GlickoConfig) -> Self {
        Self {
            state: GlickoRating {
                rating,
                deviation: rd,
            },
            num_comparisons: 0,
            config,
        }
    }

    #[must_use]
    /// Restores a model from a previously dumped `(rating, rd, num_comparisons)` tuple.
    pub const fn restore(
        rating: f64,
        rd: f64,
        num_comparisons: u64,
        config: GlickoConfig,
    ) -> Self {
        Self {
            state: GlickoRating {
                rating,
                deviation: rd,
            },
            num_comparisons,
            config,
        }
    }

    #[must_use]
    /// Current skill estimate.
    pub const fn rating(&self) -> f64 {
        self.state.rating
    }

    #[must_use]
    /// Current rating deviation.
    pub const fn rd(&self) -> f64 {
        self.state.deviation
    }

    #[must_use]
    /// How many updates this model has absorbed.
    pub const fn num_comparisons(&self) -> u64 {
        self.num_comparisons
    }

    #[must_use]
    /// The rating and deviation as a plain [`GlickoRating`].
    pub const fn glicko(&self) -> GlickoRating {
        self.state
    }

    #[must_use]
    /// Config used by [`RatingModel::update`].
    pub const fn config(&self) -> GlickoConfig {
        self.config
    }

    /// Applies one comparison against an opponent whose *pre-comparison* state is
    /// `opponent_rating` / `opponent_rd`, and commits the result.
    ///
    /// `score` is from this entity's perspective. When both participants are updated,
    /// read both states before calling `update` on either of them.
    pub fn update(&mut self, score: f64, opponent_rating: f64, opponent_rd: f64) {
        let opponent = GlickoRating {
            rating: opponent_rating,
            deviation: opponent_rd,
        };
        self.state = glicko_score(&self.state, &opponent, score, &self.config);
        self.num_comparisons += 1;
    }

    #[must_use]
    /// Probability, in `(0, 1)`, that this entity beats the given opponent.
    ///
    /// Damped by the opponent's deviation only, so it is not symmetric.
    pub fn expected_outcome(&self, opponent_rating: f64, opponent_rd: f64) -> f64 {
        let opponent = GlickoRating {
            rating: opponent_rating,
            deviation: opponent_rd,
        };
        expected_outcome(&self.state, &opponent)
    }

    #[must_use]
    /// Information proxy for comparing against the given opponent, see [`score_variance`].
    pub fn score_variance(&self, opponent_rating: f64, opponent_rd: f64) -> f64 {
        let opponent = GlickoRating {
            rating: opponent_rating,
            deviation: opponent_rd,
        };
        score_variance(&self.state, &opponent)
    }
}

impl Default for RatingModel {
    fn default() -> Self {
        Self::new(
            crate::glicko::DEFAULT_RATING,
            crate::glicko::DEFAULT_DEVIATION,
            GlickoConfig::new(),
        )
    }
}
