pub mod changeset;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod repository;
pub mod security;
pub mod service;
pub mod user;

pub use changeset::{ChangesetDetail, ChangesetSource, Person};
pub use config::Config;
pub use error::{CoreError, PageError};
pub use fetcher::PrivilegedDetailFetcher;
pub use repository::{FsRepositoryService, Repository, RepositoryKey, RepositoryService};
pub use security::{Elevated, SecurityService};
pub use service::{CommitGraph, GraphPage, GraphPageService};
pub use user::{AuthenticationContext, User};
