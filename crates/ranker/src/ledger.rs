use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::EntityId;

/// A completed comparison, from the perspective of `id1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub id1: EntityId,
    pub id2: EntityId,
    /// 1.0 = `id1` clearly preferred, 0.0 = `id2` clearly preferred.
    pub score: f64,
    /// Whether the ratings were updated from this comparison.
    pub applied: bool,
    pub recorded_at: DateTime<Utc>,
}

impl Comparison {
    pub fn new(id1: EntityId, id2: EntityId, score: f64, applied: bool) -> Self {
        Self {
            id1,
            id2,
            score,
            applied,
            recorded_at: Utc::now(),
        }
    }

    pub const fn involves(&self, id: EntityId) -> bool {
        self.id1 == id || self.id2 == id
    }
}

/// Append-only record of every comparison the ranker received.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonLedger {
    entries: Vec<Comparison>,
}

impl ComparisonLedger {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, comparison: Comparison) {
        self.entries.push(comparison);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Comparison] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &Comparison> {
        self.entries.iter()
    }

    pub fn involving(&self, id: EntityId) -> impl Iterator<Item = &Comparison> {
        self.entries.iter().filter(move |c| c.involves(id))
    }

    /// Writes one `id1 id2 score` line per comparison.
    pub fn write_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        for comparison in &self.entries {
            writeln!(
                writer,
                "{} {} {}",
                comparison.id1, comparison.id2, comparison.score
            )?;
        }
        writer.flush()
    }
}

impl<'a> IntoIterator for &'a ComparisonLedger {
    type Item = &'a Comparison;
    type IntoIter = std::slice::Iter<'a, Comparison>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
