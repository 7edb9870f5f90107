//! Ranked interest results.

use serde::{Deserialize, Serialize};

/// A category together with its aggregated score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredInterest {
    pub category: String,
    pub score: f64,
}

impl ScoredInterest {
    pub fn new(category: impl Into<String>, score: f64) -> Self {
        Self {
            category: category.into(),
            score,
        }
    }
}

/// Ranked output of an aggregation, shaped by the caller's choice.
///
/// `Labels` drops the scores; `Scored` keeps them. Both are ordered by
/// descending score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "interests", rename_all = "snake_case")]
pub enum RankedInterests {
    Labels(Vec<String>),
    Scored(Vec<ScoredInterest>),
}

impl RankedInterests {
    /// Number of ranked entries.
    pub fn len(&self) -> usize {
        match self {
            RankedInterests::Labels(labels) => labels.len(),
            RankedInterests::Scored(scored) => scored.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Category labels in rank order, whichever shape this is.
    pub fn categories(&self) -> Vec<&str> {
        match self {
            RankedInterests::Labels(labels) => labels.iter().map(String::as_str).collect(),
            RankedInterests::Scored(scored) => {
                scored.iter().map(|s| s.category.as_str()).collect()
            }
        }
    }
}
