//! Groups a final ranking into tiers of similar ratings.
//!
//! One-dimensional k-means: centroids start at evenly spaced quantiles of the sorted
//! ratings, so the result is deterministic for a given input.

use crate::{EntityId, ranker::AdaptiveRanker};

const MAX_ITERATIONS: usize = 100;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("tier count must be at least 1")]
    InvalidTierCount,
}

/// Splits `(id, rating)` pairs into at most `n` tiers.
///
/// Tiers are ordered best first and members within a tier by rating, best first.
/// Asking for more tiers than entries yields one tier per distinct cluster.
pub fn tiers(ratings: &[(EntityId, f64)], n: usize) -> Result<Vec<Vec<EntityId>>, Error> {
    if n == 0 {
        return Err(Error::InvalidTierCount);
    }
    if ratings.is_empty() {
        return Ok(Vec::new());
    }

    let mut sorted = ratings.to_vec();
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let k = n.min(sorted.len());
    let mut centroids: Vec<f64> = (0..k)
        .map(|i| sorted[((2 * i + 1) * sorted.len()) / (2 * k)].1)
        .collect();
    let mut assignment = vec![usize::MAX; sorted.len()];

    for _ in 0..MAX_ITERATIONS {
        let mut changed = false;
        for (slot, &(_, rating)) in sorted.iter().enumerate() {
            let nearest = nearest_centroid(&centroids, rating);
            if assignment[slot] != nearest {
                assignment[slot] = nearest;
                changed = true;
            }
        }
        if !changed {
            break;
        }

        let mut sums = vec![(0.0, 0usize); k];
        for (slot, &(_, rating)) in sorted.iter().enumerate() {
            let (sum, count) = &mut sums[assignment[slot]];
            *sum += rating;
            *count += 1;
        }
        for (centroid, (sum, count)) in centroids.iter_mut().zip(sums) {
            if count > 0 {
                *centroid = sum / count as f64;
            }
        }
    }

    let mut order: Vec<usize> = (0..k).collect();
    order.sort_by(|&a, &b| centroids[b].total_cmp(&centroids[a]));

    Ok(order
        .into_iter()
        .map(|cluster| {
            sorted
                .iter()
                .zip(&assignment)
                .filter(|&(_, &assigned)| assigned == cluster)
                .map(|(&(id, _), _)| id)
                .collect::<Vec<_>>()
        })
        .filter(|tier| !tier.is_empty())
        .collect())
}

fn nearest_centroid(centroids: &[f64], rating: f64) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (index, centroid) in centroids.iter().enumerate() {
        let distance = (rating - centroid).abs();
        if distance < best_distance {
            best_distance = distance;
            best = index;
        }
    }
    best
}

impl AdaptiveRanker {
    /// Current ratings grouped into at most `n` tiers, see [`tiers`].
    pub fn tiers(&self, n: usize) -> Result<Vec<Vec<EntityId>>, Error> {
        let ratings: Vec<(EntityId, f64)> = self
            .entities()
            .iter()
            .enumerate()
            .map(|(id, entity)| (id, entity.model.rating()))
            .collect();
        tiers(&ratings, n)
    }
}
