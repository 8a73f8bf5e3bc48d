//! Bounded, early-terminating walks over the commit graph.
//!
//! A [`Traversal`] produces commits children-first, most recent first. The
//! [`Window`] decides, one node at a time, whether the node is shown and
//! whether the walk goes on; [`BoundedGraphWalker`] drives the two together
//! and hydrates only the nodes the window captures.

pub mod window;
pub mod walker;

pub use window::{Step, Window};
pub use walker::{BoundedGraphWalker, Walk, WalkError};

use crate::core::{CommitId, CommitNode};
use crate::error::GraphError;

/// Signal returned by a consumer after each produced item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalStatus {
    Continue,
    Finish,
}

/// Lazily produced commits of a traversal
pub type Nodes<'a> = Box<dyn Iterator<Item = Result<CommitNode, GraphError>> + 'a>;

/// Graph traversal primitive.
///
/// Implementations yield every commit reachable from `include` exactly once,
/// each commit after all of its descendants in the reachable set, ties broken
/// by commit time (newest first). Nothing is produced past the point where the
/// consumer stops pulling.
pub trait Traversal {
    fn traverse<'a>(&'a self, include: &[CommitId]) -> Result<Nodes<'a>, GraphError>;
}

impl<T: Traversal + ?Sized> Traversal for &T {
    fn traverse<'a>(&'a self, include: &[CommitId]) -> Result<Nodes<'a>, GraphError> {
        (**self).traverse(include)
    }
}
