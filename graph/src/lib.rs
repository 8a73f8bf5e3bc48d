pub mod core;
pub mod decor;
pub mod error;
pub mod git_backend;
pub mod page;
pub mod walk;

pub use core::{CommitId, CommitNode, Dag};
pub use decor::{HeadSource, LabelIndex, RefKind, Reference};
pub use error::GraphError;
pub use git_backend::GitWalker;
pub use page::{Page, PageRequest};
pub use walk::{
    BoundedGraphWalker, Nodes, Step, Traversal, TraversalStatus, Walk, WalkError, Window,
};
