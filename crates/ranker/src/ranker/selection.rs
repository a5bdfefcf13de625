use tracing::debug;

use crate::{
    EntityId,
    ranker::{AdaptiveRanker, Error},
};

impl AdaptiveRanker {
    /// The pair to compare next.
    ///
    /// First the eligible entity with the highest deviation, then the eligible opponent
    /// whose outcome against it is the least predictable. Entities in the avoid-set are
    /// not eligible. Repeated calls without an intervening update return the same pair.
    pub fn next_comparison(&self) -> Result<(EntityId, EntityId), Error> {
        match self.candidate_pair() {
            (Some(first), Some(second)) => {
                debug!(first, second, "selected next comparison");
                Ok((first, second))
            }
            (first, _) => {
                debug!(?first, avoid = ?self.avoid, "no eligible pair");
                Err(Error::NoEligibleEntity { first })
            }
        }
    }

    /// Best-effort selection: either slot is `None` when nothing eligible was found.
    pub fn candidate_pair(&self) -> (Option<EntityId>, Option<EntityId>) {
        let first = self.best_player();
        let second = first.and_then(|id| self.best_opponent(id));
        (first, second)
    }

    fn is_eligible(&self, id: EntityId) -> bool {
        !self.avoid.contains(&id)
    }

    /// Eligible entity with the strictly highest deviation, first index wins ties.
    fn best_player(&self) -> Option<EntityId> {
        let mut max_id = None;
        let mut max_rd = 0.0;
        for (id, entity) in self.entities.iter().enumerate() {
            let rd = entity.model.rd();
            if rd > max_rd && self.is_eligible(id) {
                max_rd = rd;
                max_id = Some(id);
            }
        }
        max_id
    }

    /// Eligible opponent maximizing the score variance against `player`.
    fn best_opponent(&self, player: EntityId) -> Option<EntityId> {
        let model = &self.entities[player].model;
        let mut max_id = None;
        let mut max_var = 0.0;
        for (id, entity) in self.entities.iter().enumerate() {
            if id == player || !self.is_eligible(id) {
                continue;
            }
            let var = model.score_variance(entity.model.rating(), entity.model.rd());
            if var > max_var {
                max_var = var;
                max_id = Some(id);
            }
        }
        max_id
    }
}
