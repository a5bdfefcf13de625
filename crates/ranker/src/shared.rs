use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::{
    EntityId,
    ranker::{AdaptiveRanker, Error},
};

/// An [`AdaptiveRanker`] behind one exclusive lock.
///
/// Selection reads every entity, so a comparison must be selected and applied without
/// another `add_entity` or `apply_outcome` in between.
#[derive(Debug, Clone, Default)]
pub struct SharedRanker {
    inner: Arc<Mutex<AdaptiveRanker>>,
}

impl SharedRanker {
    pub fn new(ranker: AdaptiveRanker) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ranker)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, AdaptiveRanker>, Error> {
        self.inner.lock().map_err(|_| Error::Poisoned)
    }

    /// Selects the next pair, asks `judge` for a score and applies it, all under the lock.
    ///
    /// Returns `Ok(None)` when the judge declines (nothing is recorded).
    pub fn compare_next<F>(&self, judge: F) -> Result<Option<(EntityId, EntityId, f64)>, Error>
    where
        F: FnOnce(EntityId, EntityId) -> Option<f64>,
    {
        let mut ranker = self.lock()?;
        let (id1, id2) = ranker.next_comparison()?;
        let Some(score) = judge(id1, id2) else {
            debug!(id1, id2, "judge declined comparison");
            return Ok(None);
        };
        ranker.apply_outcome(id1, id2, score, true)?;
        Ok(Some((id1, id2, score)))
    }

    pub fn add_entity(&self, rating: f64, rd: f64) -> Result<EntityId, Error> {
        Ok(self.lock()?.add_entity(rating, rd))
    }

    pub fn with<T>(&self, f: impl FnOnce(&AdaptiveRanker) -> T) -> Result<T, Error> {
        Ok(f(&*self.lock()?))
    }

    pub fn with_mut<T>(&self, f: impl FnOnce(&mut AdaptiveRanker) -> T) -> Result<T, Error> {
        Ok(f(&mut *self.lock()?))
    }

    /// The inner ranker, if this is the last handle.
    pub fn into_inner(self) -> Result<AdaptiveRanker, Self> {
        Arc::try_unwrap(self.inner)
            .map_err(|inner| Self { inner })?
            .into_inner()
            .map_err(|poisoned| Self::new(poisoned.into_inner()))
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn compare_next_applies_judged_score() {
        let shared = SharedRanker::default();
        for _ in 0..3 {
            shared.add_entity(0.0, 350.0).unwrap();
        }

        let applied = shared.compare_next(|_, _| Some(1.0)).unwrap();

        assert_eq!(applied, Some((0, 1, 1.0)));
        let (len, rating) = shared
            .with(|r| (r.ledger().len(), r.rating(0).unwrap()))
            .unwrap();
        assert_eq!(len, 1);
        assert!(rating > 0.0);
    }

    #[test]
    fn declined_judgement_records_nothing() {
        let shared = SharedRanker::default();
        shared.add_entity(0.0, 350.0).unwrap();
        shared.add_entity(0.0, 350.0).unwrap();

        assert_eq!(shared.compare_next(|_, _| None).unwrap(), None);
        assert!(shared.with(|r| r.ledger().is_empty()).unwrap());
    }

    #[test]
    fn too_few_entities_is_an_error() {
        let shared = SharedRanker::default();
        shared.add_entity(0.0, 350.0).unwrap();

        let err = shared.compare_next(|_, _| Some(0.5)).unwrap_err();
        assert!(matches!(err, Error::NoEligibleEntity { first: Some(0) }));
    }

    #[test]
    fn panic_under_the_lock_poisons_every_handle() {
        let shared = SharedRanker::default();
        shared.add_entity(0.0, 350.0).unwrap();
        shared.add_entity(0.0, 350.0).unwrap();

        let crashing = shared.clone();
        let joined = thread::spawn(move || {
            let _: Result<(), Error> = crashing.with_mut(|_| panic!("judge crashed"));
        })
        .join();

        assert!(joined.is_err());
        assert!(matches!(
            shared.compare_next(|_, _| Some(1.0)),
            Err(Error::Poisoned)
        ));
        assert!(matches!(shared.add_entity(0.0, 350.0), Err(Error::Poisoned)));
        assert!(matches!(shared.with(AdaptiveRanker::len), Err(Error::Poisoned)));
    }

    #[test]
    fn concurrent_judges_never_interleave() {
        let shared = SharedRanker::default();
        for _ in 0..6 {
            shared.add_entity(0.0, 350.0).unwrap();
        }

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for _ in 0..5 {
                        shared.compare_next(|_, _| Some(0.75)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let ranker = shared.into_inner().unwrap();
        assert_eq!(ranker.ledger().len(), 20);
        let total: u64 = ranker
            .entities()
            .iter()
            .map(|e| e.model.num_comparisons())
            .sum();
        assert_eq!(total, 40);
        assert!(
            ranker
                .ledger()
                .entries()
                .windows(2)
                .all(|w| !(w[1].involves(w[0].id1) && w[1].involves(w[0].id2)))
        );
    }
}
