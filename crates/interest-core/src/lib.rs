//! # interest-core
//!
//! Interest inference from free-text bios.
//!
//! Two steps, composed by the caller:
//! - [`InterestExtractor`] maps one bio onto the category taxonomy by
//!   embedding similarity.
//! - [`InterestAggregator`] merges the user's own categories with those of
//!   the accounts they follow into one weighted ranking.
//!
//! Both are read-only after construction and can be shared across
//! threads.

pub mod aggregator;
pub mod error;
pub mod extractor;

pub use aggregator::InterestAggregator;
pub use error::InterestError;
pub use extractor::{CategoryMatch, InterestExtractor};
