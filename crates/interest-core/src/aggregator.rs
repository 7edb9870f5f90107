//! Weighted self vs. network interest aggregation.
//!
//! Each source is turned into relative frequencies (count / total), scaled
//! by that source's normalized weight, and summed per category.

use std::collections::HashMap;

use interest_types::{validate_top_n, AggregatorConfig, RankedInterests, ScoredInterest};
use tracing::debug;

use crate::error::InterestError;

/// Merges a user's own interests with those of the accounts they follow.
#[derive(Debug, Clone, PartialEq)]
pub struct InterestAggregator {
    self_weight: f64,
    followings_weight: f64,
    top_n: usize,
    return_scores: bool,
}

impl InterestAggregator {
    /// Validate the configuration and normalize the weights to sum to 1.
    pub fn new(config: &AggregatorConfig) -> Result<Self, InterestError> {
        config.validate()?;

        // Scale by the larger weight first so the sum cannot overflow
        let largest = config.self_weight.max(config.followings_weight);
        let self_weight = config.self_weight / largest;
        let followings_weight = config.followings_weight / largest;
        let total = self_weight + followings_weight;
        Ok(Self {
            self_weight: self_weight / total,
            followings_weight: followings_weight / total,
            top_n: config.top_n,
            return_scores: config.return_scores,
        })
    }

    /// Normalized `(self, followings)` weights.
    pub fn weights(&self) -> (f64, f64) {
        (self.self_weight, self.followings_weight)
    }

    /// Whether [`Self::aggregate_ranked`] attaches scores.
    pub fn returns_scores(&self) -> bool {
        self.return_scores
    }

    /// Top categories by combined score, labels only.
    pub fn aggregate<S, F>(
        &self,
        user_interests: &[S],
        followings_interests: &[F],
        top_n: Option<usize>,
    ) -> Result<Vec<String>, InterestError>
    where
        S: AsRef<str>,
        F: AsRef<[S]>,
    {
        Ok(self
            .aggregate_scored(user_interests, followings_interests, top_n)?
            .into_iter()
            .map(|s| s.category)
            .collect())
    }

    /// Top categories by combined score, with scores.
    ///
    /// `top_n` falls back to the configured value; `Some(0)` is rejected
    /// as [`InterestError::InvalidInput`]. Equal scores keep first-insertion order: categories
    /// seen in the user's own interests first, then new categories from
    /// followings, each in order of first appearance.
    pub fn aggregate_scored<S, F>(
        &self,
        user_interests: &[S],
        followings_interests: &[F],
        top_n: Option<usize>,
    ) -> Result<Vec<ScoredInterest>, InterestError>
    where
        S: AsRef<str>,
        F: AsRef<[S]>,
    {
        let top_n = top_n.unwrap_or(self.top_n);
        validate_top_n(top_n).map_err(|e| InterestError::InvalidInput(e.to_string()))?;

        let followings = FrequencyCount::from_labels(
            followings_interests
                .iter()
                .flat_map(|interests| interests.as_ref().iter())
                .map(|label| label.as_ref()),
        );
        let own = FrequencyCount::from_labels(user_interests.iter().map(|label| label.as_ref()));

        let mut combined = ScoreTable::default();
        if own.total > 0 {
            let total = own.total as f64;
            for (category, count) in &own.counts {
                combined.add(category, (*count as f64 / total) * self.self_weight);
            }
        }
        if followings.total > 0 {
            let total = followings.total as f64;
            for (category, count) in &followings.counts {
                combined.add(category, (*count as f64 / total) * self.followings_weight);
            }
        }

        let mut ranked: Vec<ScoredInterest> = combined
            .entries
            .into_iter()
            .filter(|(_, score)| *score > 0.0)
            .map(|(category, score)| ScoredInterest::new(category, score))
            .collect();
        // Stable sort keeps insertion order among ties
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(top_n);

        debug!(
            self_total = own.total,
            followings_total = followings.total,
            returned = ranked.len(),
            "Aggregated interests"
        );

        Ok(ranked)
    }

    /// Aggregate and shape the result by the configured `return_scores`.
    pub fn aggregate_ranked<S, F>(
        &self,
        user_interests: &[S],
        followings_interests: &[F],
        top_n: Option<usize>,
    ) -> Result<RankedInterests, InterestError>
    where
        S: AsRef<str>,
        F: AsRef<[S]>,
    {
        let scored = self.aggregate_scored(user_interests, followings_interests, top_n)?;
        Ok(if self.return_scores {
            RankedInterests::Scored(scored)
        } else {
            RankedInterests::Labels(scored.into_iter().map(|s| s.category).collect())
        })
    }
}

/// Occurrence counts in order of first appearance.
struct FrequencyCount<'a> {
    counts: Vec<(&'a str, usize)>,
    total: usize,
}

impl<'a> FrequencyCount<'a> {
    fn from_labels(labels: impl Iterator<Item = &'a str>) -> Self {
        let mut index: HashMap<&'a str, usize> = HashMap::new();
        let mut counts: Vec<(&'a str, usize)> = Vec::new();
        let mut total = 0;
        for label in labels {
            total += 1;
            match index.get(label) {
                Some(&slot) => counts[slot].1 += 1,
                None => {
                    index.insert(label, counts.len());
                    counts.push((label, 1));
                }
            }
        }
        Self { counts, total }
    }
}

/// Running per-category scores in insertion order.
#[derive(Default)]
struct ScoreTable {
    index: HashMap<String, usize>,
    entries: Vec<(String, f64)>,
}

impl ScoreTable {
    fn add(&mut self, category: &str, amount: f64) {
        match self.index.get(category) {
            Some(&slot) => self.entries[slot].1 += amount,
            None => {
                self.index.insert(category.to_string(), self.entries.len());
                self.entries.push((category.to_string(), amount));
            }
        }
    }
}
