//! Adaptive pairwise ranking of a small collection.
//!
//! Each entity carries a Glicko rating. The [`AdaptiveRanker`] keeps asking for the comparison
//! that should teach it the most: the entity it knows least about, against the opponent whose
//! outcome is hardest to predict. Outcomes are graded scores in `[0, 1]` and every one of them
//! is kept in a [`ComparisonLedger`].

pub mod config;
pub mod ledger;
pub mod ranker;
pub mod session;
pub mod shared;
pub mod sink;
pub mod snapshot;
pub mod tiers;

#[cfg(test)]
mod integration_tests;

/// Position of an entity in its ranker, assigned in insertion order.
pub type EntityId = usize;

pub use config::RankerEnv;
pub use ledger::{Comparison, ComparisonLedger};
pub use ranker::{AdaptiveRanker, Entity, Error as RankerError, RankerConfig};
pub use session::{Session, SessionSummary, StopReason};
pub use shared::SharedRanker;
pub use sink::{JsonLinesSink, MemorySink, RatingRecord, RatingsSink, TextSink};
