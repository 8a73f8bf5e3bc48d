use chrono::{DateTime, Utc};

use super::id::CommitId;

/// Traversal-time view of a commit: just enough to walk parent edges
#[derive(Debug, Clone)]
pub struct CommitNode {
    /// Commit identifier
    pub id: CommitId,
    /// Parent commit IDs, in commit order
    pub parents: Vec<CommitId>,
    /// Commit timestamp, used to order the walk
    pub timestamp: DateTime<Utc>,
}

impl CommitNode {
    pub fn new(id: CommitId, parents: Vec<CommitId>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            parents,
            timestamp,
        }
    }

    /// Check if this is a root commit (no parents)
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Check if this is a merge commit (multiple parents)
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}
