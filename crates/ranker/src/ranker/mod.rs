use lowvol_rating::{GlickoConfig, GlickoRating, RatingModel};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    EntityId,
    ledger::ComparisonLedger,
    sink::{self, RatingRecord, RatingsSink},
};

pub mod outcome;
pub mod selection;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no eligible entity for the next comparison (first pick: {first:?})")]
    NoEligibleEntity { first: Option<EntityId> },
    #[error("score `{0}` is outside of [0, 1]")]
    InvalidScore(f64),
    #[error("unknown entity `{0}`")]
    UnknownEntity(EntityId),
    #[error("entity `{0}` cannot be compared with itself")]
    SelfComparison(EntityId),
    #[error("`{0}` is not implemented")]
    NotImplemented(&'static str),
    #[error("ranker lock poisoned")]
    Poisoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankerConfig {
    /// Exclude the two participants of the last applied outcome from the next selection.
    pub avoid_twice: bool,
    pub glicko: GlickoConfig,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            avoid_twice: true,
            glicko: GlickoConfig::new(),
        }
    }
}

/// An entity being ranked. The optional name is display metadata only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub name: Option<String>,
    pub model: RatingModel,
}

impl Entity {
    /// `name` or `#id` when unnamed.
    pub fn label(&self, id: EntityId) -> String {
        self.name.clone().unwrap_or_else(|| format!("#{id}"))
    }
}

/// Picks the most informative comparison to run next and absorbs the outcomes.
///
/// Single-threaded. Wrap it in a [`crate::shared::SharedRanker`] to select and apply
/// under one lock.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdaptiveRanker {
    entities: Vec<Entity>,
    ledger: ComparisonLedger,
    avoid: Vec<EntityId>,
    config: RankerConfig,
}

impl AdaptiveRanker {
    pub const fn new(config: RankerConfig) -> Self {
        Self {
            entities: Vec::new(),
            ledger: ComparisonLedger::new(),
            avoid: Vec::new(),
            config,
        }
    }

    /// Registers a new entity and returns its id, the collection size before insertion.
    pub fn add_entity(&mut self, rating: f64, rd: f64) -> EntityId {
        self.push(None, rating, rd)
    }

    /// Registers an entity with rating 0 and deviation 350.
    pub fn add_default_entity(&mut self) -> EntityId {
        let GlickoRating { rating, deviation } = GlickoRating::new();
        self.push(None, rating, deviation)
    }

    pub fn add_named_entity(&mut self, name: impl Into<String>, rating: f64, rd: f64) -> EntityId {
        self.push(Some(name.into()), rating, rd)
    }

    fn push(&mut self, name: Option<String>, rating: f64, rd: f64) -> EntityId {
        let id = self.entities.len();
        self.entities.push(Entity {
            name,
            model: RatingModel::new(rating, rd, self.config.glicko),
        });
        id
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub const fn config(&self) -> &RankerConfig {
        &self.config
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn rating(&self, id: EntityId) -> Option<f64> {
        self.entity(id).map(|e| e.model.rating())
    }

    pub fn rd(&self, id: EntityId) -> Option<f64> {
        self.entity(id).map(|e| e.model.rd())
    }

    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        self.entities
            .iter()
            .position(|e| e.name.as_deref() == Some(name))
    }

    pub const fn ledger(&self) -> &ComparisonLedger {
        &self.ledger
    }

    pub fn avoid_set(&self) -> &[EntityId] {
        &self.avoid
    }

    pub fn clear_avoid_set(&mut self) {
        self.avoid.clear();
    }

    /// Entity ids sorted by rating, best first. Ties keep the lower id first.
    pub fn ranking(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = (0..self.entities.len()).collect();
        ids.sort_by(|&a, &b| {
            self.entities[b]
                .model
                .rating()
                .total_cmp(&self.entities[a].model.rating())
                .then(a.cmp(&b))
        });
        ids
    }

    /// One record per entity, in id order.
    pub fn records(&self) -> Vec<RatingRecord> {
        self.entities
            .iter()
            .enumerate()
            .map(|(id, entity)| RatingRecord::from_entity(id, entity))
            .collect()
    }

    /// Writes every entity to `sink` in ranking order.
    pub fn dump_ratings<S: RatingsSink + ?Sized>(&self, sink: &mut S) -> Result<(), sink::Error> {
        for id in self.ranking() {
            sink.write_record(&RatingRecord::from_entity(id, &self.entities[id]))?;
        }
        sink.finish()
    }

    /// Hook for re-estimating every rating from the full ledger in one batch.
    ///
    /// Not available; the interactive loop never depends on it.
    pub fn adjust_ratings(&mut self) -> Result<(), Error> {
        warn!(
            comparisons = self.ledger.len(),
            "batch re-estimation requested but not implemented"
        );
        Err(Error::NotImplemented("adjust_ratings"))
    }

    pub(crate) fn check_id(&self, id: EntityId) -> Result<(), Error> {
        if id < self.entities.len() {
            Ok(())
        } else {
            Err(Error::UnknownEntity(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_eq_float::assert_eq_float;

    use super::*;
    use crate::sink::MemorySink;

    #[test]
    fn add_entity_returns_sequential_ids() {
        let mut ranker = AdaptiveRanker::default();

        assert_eq!(ranker.add_default_entity(), 0);
        assert_eq!(ranker.add_entity(100.0, 80.0), 1);
        assert_eq!(ranker.add_named_entity("carrot", 0.0, 350.0), 2);
        assert_eq!(ranker.len(), 3);
        assert_eq!(ranker.find_by_name("carrot"), Some(2));
        assert_eq!(ranker.find_by_name("potato"), None);
    }

    #[test]
    fn fresh_entity_reports_constructor_defaults() {
        let mut ranker = AdaptiveRanker::default();
        let id = ranker.add_default_entity();

        assert_eq_float!(ranker.rating(id).unwrap(), 0.0);
        assert_eq_float!(ranker.rd(id).unwrap(), 350.0);
        assert_eq!(ranker.entity(id).unwrap().model.num_comparisons(), 0);
        assert!(ranker.rating(id + 1).is_none());
    }

    #[test]
    fn default_config_avoids_twice() {
        let ranker = AdaptiveRanker::default();

        assert!(ranker.config().avoid_twice);
        assert_eq_float!(ranker.config().glicko.rd_floor, 0.0);
        assert!(ranker.is_empty());
    }

    #[test]
    fn ranking_sorts_by_rating_then_id() {
        let mut ranker = AdaptiveRanker::default();
        ranker.add_entity(10.0, 350.0);
        ranker.add_entity(300.0, 350.0);
        ranker.add_entity(10.0, 100.0);
        ranker.add_entity(-50.0, 350.0);

        assert_eq!(ranker.ranking(), vec![1, 0, 2, 3]);
    }

    #[test]
    fn dump_ratings_writes_in_ranking_order() {
        let mut ranker = AdaptiveRanker::default();
        ranker.add_named_entity("low", -10.0, 200.0);
        ranker.add_named_entity("high", 90.0, 100.0);

        let mut sink = MemorySink::default();
        ranker.dump_ratings(&mut sink).unwrap();

        let names: Vec<_> = sink
            .records()
            .iter()
            .map(|r| r.name.clone().unwrap())
            .collect();
        assert_eq!(names, vec!["high".to_string(), "low".to_string()]);
        assert_eq!(sink.records()[0].id, 1);
        assert_eq_float!(sink.records()[0].rd, 100.0);
        assert!(sink.is_finished());
    }

    #[test]
    fn adjust_ratings_is_a_stub() {
        let mut ranker = AdaptiveRanker::default();
        ranker.add_default_entity();

        let err = ranker.adjust_ratings().unwrap_err();

        assert_eq!(err.to_string(), "`adjust_ratings` is not implemented");
        assert_eq_float!(ranker.rating(0).unwrap(), 0.0);
    }

    #[test]
    fn label_falls_back_to_id() {
        let mut ranker = AdaptiveRanker::default();
        ranker.add_default_entity();
        ranker.add_named_entity("pear", 0.0, 350.0);

        assert_eq!(ranker.entity(0).unwrap().label(0), "#0");
        assert_eq!(ranker.entity(1).unwrap().label(1), "pear");
    }
}
