use chrono::{DateTime, Utc};
use graph::CommitId;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::security::Elevated;

/// Name and email of a commit author or committer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub email: String,
}

/// Fully hydrated commit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangesetDetail {
    pub id: CommitId,
    pub display_id: String,
    pub parents: Vec<CommitId>,
    pub author: Person,
    pub committer: Person,
    pub author_timestamp: DateTime<Utc>,
    pub message: String,
}

impl ChangesetDetail {
    /// First line of the message
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

/// Detail-fetch primitive. Only callable inside an elevated scope.
pub trait ChangesetSource {
    fn changeset(
        &self,
        elevated: &Elevated<'_>,
        id: &CommitId,
    ) -> Result<ChangesetDetail, CoreError>;
}

impl<T: ChangesetSource + ?Sized> ChangesetSource for &T {
    fn changeset(
        &self,
        elevated: &Elevated<'_>,
        id: &CommitId,
    ) -> Result<ChangesetDetail, CoreError> {
        (**self).changeset(elevated, id)
    }
}
