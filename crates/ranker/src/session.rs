//! Interactive comparison loop: a human plays the oracle on a terminal.

use std::io::{BufRead, Write};

use tracing::{info, warn};

use crate::{
    EntityId,
    ranker::{self, AdaptiveRanker},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("session io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Ranker(#[from] ranker::Error),
    #[error("items file looks like JSON but failed to parse: {0}")]
    Items(#[from] serde_json::Error),
}

/// What one line of input means.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Answer {
    Score(f64),
    Quit,
    Invalid,
}

// A usable answer, or the end of input.
enum Reply {
    Score(f64),
    Quit,
    EndOfInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Quit,
    EndOfInput,
    Limit,
    NoEligiblePair,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub comparisons: usize,
    pub stopped: StopReason,
}

/// Maps a 1-5 answer to a score for the first option: 1 = first clearly better,
/// 3 = no preference, 5 = second clearly better.
pub fn likert_to_score(answer: u8) -> Option<f64> {
    (1..=5)
        .contains(&answer)
        .then(|| f64::from(5 - answer) / 4.0)
}

pub fn parse_answer(line: &str) -> Answer {
    let line = line.trim();
    if line.eq_ignore_ascii_case("q") {
        return Answer::Quit;
    }
    line.parse::<u8>()
        .ok()
        .and_then(likert_to_score)
        .map_or(Answer::Invalid, Answer::Score)
}

/// Items from a JSON array of strings or from plain text, one per line. Blank entries are dropped.
pub fn parse_items(content: &str) -> Result<Vec<String>, Error> {
    let trimmed = content.trim();
    let items: Vec<String> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed)?
    } else {
        trimmed.lines().map(str::to_string).collect()
    };
    Ok(items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect())
}

pub struct Session<'a, R, W> {
    ranker: &'a mut AdaptiveRanker,
    input: R,
    output: W,
    max_comparisons: Option<usize>,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    pub fn new(ranker: &'a mut AdaptiveRanker, input: R, output: W) -> Self {
        Self {
            ranker,
            input,
            output,
            max_comparisons: None,
        }
    }

    #[must_use]
    pub fn max_comparisons(mut self, max: Option<usize>) -> Self {
        self.max_comparisons = max;
        self
    }

    /// Asks for comparisons until the user quits, input ends, the limit is reached,
    /// or no pair can be formed even with an empty avoid-set.
    pub fn run(&mut self) -> Result<SessionSummary, Error> {
        let mut comparisons = 0;
        let stopped = loop {
            if self.max_comparisons.is_some_and(|max| comparisons >= max) {
                break StopReason::Limit;
            }
            let Some((id1, id2)) = self.next_pair() else {
                break StopReason::NoEligiblePair;
            };
            match self.ask(id1, id2)? {
                Reply::Score(score) => {
                    self.ranker.apply_outcome(id1, id2, score, true)?;
                    comparisons += 1;
                }
                Reply::Quit => break StopReason::Quit,
                Reply::EndOfInput => break StopReason::EndOfInput,
            }
        };
        info!(comparisons, ?stopped, "session finished");
        Ok(SessionSummary {
            comparisons,
            stopped,
        })
    }

    // Small collections run out of eligible entities once the last pair is excluded.
    fn next_pair(&mut self) -> Option<(EntityId, EntityId)> {
        if let Ok(pair) = self.ranker.next_comparison() {
            return Some(pair);
        }
        if self.ranker.avoid_set().is_empty() {
            return None;
        }
        self.ranker.clear_avoid_set();
        self.ranker.next_comparison().ok()
    }

    /// Re-asks until the answer is usable or input ends.
    fn ask(&mut self, id1: EntityId, id2: EntityId) -> Result<Reply, Error> {
        let label1 = self.label(id1);
        let label2 = self.label(id2);
        let mut line = String::new();
        loop {
            writeln!(self.output, "{label1} vs {label2} (1-5), q to quit:")?;
            self.output.flush()?;
            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(Reply::EndOfInput);
            }
            match parse_answer(&line) {
                Answer::Score(score) => return Ok(Reply::Score(score)),
                Answer::Quit => return Ok(Reply::Quit),
                Answer::Invalid => {
                    warn!(input = line.trim(), "invalid answer");
                    writeln!(self.output, "Invalid input")?;
                }
            }
        }
    }

    fn label(&self, id: EntityId) -> String {
        self.ranker
            .entity(id)
            .map_or_else(|| format!("#{id}"), |entity| entity.label(id))
    }
}
