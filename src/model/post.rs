use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque post identifier, minted once at creation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    /// Mint a fresh, unique id
    pub fn mint() -> Self {
        PostId(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for PostId {
    fn from(s: String) -> Self {
        PostId(s)
    }
}

impl From<&str> for PostId {
    fn from(s: &str) -> Self {
        PostId(s.to_string())
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    /// Short display label (trimmed, never empty)
    pub label: String,
    /// Free text body, may contain `~` lines
    #[serde(default)]
    pub body: String,
}

impl Post {
    /// Create a post with a freshly minted id and an empty body.
    /// The label is trimmed; callers are expected to have rejected blank labels.
    pub fn new(label: &str) -> Self {
        Post {
            id: PostId::mint(),
            label: label.trim().to_string(),
            body: String::new(),
        }
    }
}
