use graph::{CommitId, GraphError, WalkError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors from repository access and configuration
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Git(#[from] git2::Error),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("commit {0} not found")]
    CommitNotFound(CommitId),

    #[error("failed to scan repositories: {0}")]
    Scan(#[from] walkdir::Error),

    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Failure of a graph page request.
///
/// Nothing partial is ever returned alongside one of these.
#[derive(Debug, Error)]
pub enum PageError {
    /// Unknown repository or unresolved acting user
    #[error("not found: {0}")]
    NotFound(String),

    /// Rejected before any repository work
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("repository unavailable")]
    Repository(#[source] CoreError),

    #[error("failed to enumerate references")]
    RefEnumeration(#[source] GraphError),

    #[error("commit graph traversal failed")]
    Traversal(#[source] GraphError),

    #[error("failed to fetch changeset {commit}")]
    Fetch {
        commit: CommitId,
        #[source]
        source: CoreError,
    },
}

impl PageError {
    /// HTTP-style status for the presentation layer
    pub fn status(&self) -> u16 {
        match self {
            PageError::NotFound(_) => 404,
            PageError::InvalidRequest(_) => 400,
            _ => 500,
        }
    }
}

impl From<WalkError<PageError>> for PageError {
    fn from(err: WalkError<PageError>) -> Self {
        match err {
            WalkError::Traversal(err) => PageError::Traversal(err),
            WalkError::Fetch(err) => err,
        }
    }
}
