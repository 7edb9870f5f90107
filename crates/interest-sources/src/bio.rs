//! Bio lookup for a user and the accounts they follow.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::SourceError;

/// A followed account and its bio (empty when the account has none).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Following {
    pub id: String,
    pub bio: String,
}

/// Everything the pipeline needs about one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserBios {
    /// The user's own bio, empty when absent
    pub bio: String,
    /// Followed accounts, in source order
    pub followings: Vec<Following>,
}

/// Source of bio text for a user and their followings.
///
/// `Ok(None)` means the user does not exist. A user who follows nobody is
/// `Ok(Some(..))` with an empty `followings` list.
#[async_trait]
pub trait BioSource: Send + Sync {
    async fn lookup(&self, user_id: &str) -> Result<Option<UserBios>, SourceError>;
}

/// One account record in a follow-graph snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotUser {
    pub id: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub follows: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Snapshot {
    users: Vec<SnapshotUser>,
}

/// Bio source backed by an in-memory follow graph.
///
/// User ids are matched case-insensitively.
#[derive(Debug, Default, Clone)]
pub struct InMemoryBioSource {
    users: HashMap<String, SnapshotUser>,
}

impl InMemoryBioSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a user.
    pub fn insert_user(
        &mut self,
        id: &str,
        bio: Option<&str>,
        follows: &[&str],
    ) -> &mut Self {
        let user = SnapshotUser {
            id: id.to_lowercase(),
            bio: bio.map(str::to_string),
            follows: follows.iter().map(|f| f.to_lowercase()).collect(),
        };
        self.users.insert(user.id.clone(), user);
        self
    }

    /// Parse a snapshot of the form `{"users": [{"id", "bio", "follows"}]}`.
    pub fn from_json_str(json: &str) -> Result<Self, SourceError> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        let mut users = HashMap::with_capacity(snapshot.users.len());
        for mut user in snapshot.users {
            user.id = user.id.to_lowercase();
            user.follows = user.follows.iter().map(|f| f.to_lowercase()).collect();
            if users.contains_key(&user.id) {
                return Err(SourceError::Config(format!(
                    "duplicate user id in snapshot: {}",
                    user.id
                )));
            }
            users.insert(user.id.clone(), user);
        }
        Ok(Self { users })
    }

    /// Load a snapshot file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await?;
        let source = Self::from_json_str(&json)?;
        info!(path = ?path, users = source.len(), "Loaded follow-graph snapshot");
        Ok(source)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn bio_of(&self, id: &str) -> String {
        self.users
            .get(id)
            .and_then(|u| u.bio.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl BioSource for InMemoryBioSource {
    async fn lookup(&self, user_id: &str) -> Result<Option<UserBios>, SourceError> {
        let key = user_id.to_lowercase();
        let Some(user) = self.users.get(&key) else {
            debug!(user = %key, "User not in snapshot");
            return Ok(None);
        };

        let followings = user
            .follows
            .iter()
            .map(|id| Following {
                id: id.clone(),
                bio: self.bio_of(id),
            })
            .collect();

        Ok(Some(UserBios {
            bio: user.bio.clone().unwrap_or_default(),
            followings,
        }))
    }
}
