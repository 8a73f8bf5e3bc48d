use thiserror::Error;

use crate::core::CommitId;

/// Errors raised while enumerating references or walking the commit graph
#[derive(Debug, Error)]
pub enum GraphError {
    #[error(transparent)]
    Git(#[from] git2::Error),

    /// A commit named by a reference or a parent edge is not in the graph
    #[error("unknown commit {0}")]
    UnknownCommit(CommitId),
}
