use lowvol_rating::GlickoRating;
use tracing::info;

use crate::{
    EntityId,
    ledger::Comparison,
    ranker::{AdaptiveRanker, Error, RankerConfig},
};

impl AdaptiveRanker {
    /// Records `(id1, id2, score)` and, when `update` is set, moves both ratings.
    ///
    /// `score` is from `id1`'s perspective and must be in `[0, 1]`. Invalid input is
    /// rejected before anything is recorded.
    pub fn apply_outcome(
        &mut self,
        id1: EntityId,
        id2: EntityId,
        score: f64,
        update: bool,
    ) -> Result<(), Error> {
        self.validate(id1, id2, score)?;
        self.apply(Comparison::new(id1, id2, score, update));
        Ok(())
    }

    fn validate(&self, id1: EntityId, id2: EntityId, score: f64) -> Result<(), Error> {
        if !(0.0..=1.0).contains(&score) {
            return Err(Error::InvalidScore(score));
        }
        self.check_id(id1)?;
        self.check_id(id2)?;
        if id1 == id2 {
            return Err(Error::SelfComparison(id1));
        }
        Ok(())
    }

    fn apply(&mut self, comparison: Comparison) {
        let Comparison {
            id1,
            id2,
            score,
            applied,
            ..
        } = comparison;
        self.ledger.record(comparison);
        if !applied {
            info!(id1, id2, score, "comparison recorded without update");
            return;
        }

        // Both sides update from the other's pre-comparison state.
        let one = self.entities[id1].model;
        let two = self.entities[id2].model;
        self.entities[id1]
            .model
            .update(score, two.rating(), two.rd());
        self.entities[id2]
            .model
            .update(1.0 - score, one.rating(), one.rd());

        if self.config.avoid_twice {
            self.avoid.clear();
            self.avoid.push(id1);
            self.avoid.push(id2);
        }

        info!(
            id1,
            id2,
            score,
            rating1 = self.entities[id1].model.rating(),
            rating2 = self.entities[id2].model.rating(),
            "comparison applied"
        );
    }

    /// Rebuilds a ranker from initial beliefs and a recorded ledger.
    ///
    /// Entries keep their timestamps and their `applied` flag, so the resulting ratings,
    /// ledger and avoid-set match the ranker that produced them.
    pub fn replay<'a>(
        config: RankerConfig,
        initial: impl IntoIterator<Item = GlickoRating>,
        comparisons: impl IntoIterator<Item = &'a Comparison>,
    ) -> Result<Self, Error> {
        let mut ranker = Self::new(config);
        for belief in initial {
            ranker.add_entity(belief.rating, belief.deviation);
        }
        for comparison in comparisons {
            ranker.validate(comparison.id1, comparison.id2, comparison.score)?;
            ranker.apply(*comparison);
        }
        Ok(ranker)
    }
}
