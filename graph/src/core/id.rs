use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle for a commit (the hex form of its object id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitId(String);

impl CommitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form used in log lines and terminal output
    pub fn short(&self) -> &str {
        let end = self.0.len().min(8);
        self.0.get(..end).unwrap_or(&self.0)
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<git2::Oid> for CommitId {
    fn from(oid: git2::Oid) -> Self {
        Self(oid.to_string())
    }
}

impl From<&str> for CommitId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl TryFrom<&CommitId> for git2::Oid {
    type Error = git2::Error;

    fn try_from(id: &CommitId) -> Result<Self, Self::Error> {
        git2::Oid::from_str(&id.0)
    }
}
