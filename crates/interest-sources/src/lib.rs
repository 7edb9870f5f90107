//! # interest-sources
//!
//! Collaborators that feed the interest pipeline:
//! - [`BioSource`]: bio text for a user and the accounts they follow
//! - [`SyncTrigger`]: refresh of follow-graph data ahead of a lookup

pub mod bio;
pub mod error;
pub mod sync;

pub use bio::{BioSource, Following, InMemoryBioSource, SnapshotUser, UserBios};
pub use error::SourceError;
pub use sync::{HttpSyncClient, HttpSyncConfig, NoopSync, SyncTrigger};
