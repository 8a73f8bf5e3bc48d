use std::time::Instant;
use thiserror::Error;
use tracing::debug;

use super::{Traversal, TraversalStatus, Window};
use crate::core::{CommitId, CommitNode};
use crate::error::GraphError;

/// Failure of a bounded walk: either the traversal primitive or the per-node
/// fetch step gave up. Items collected before the failure are dropped.
#[derive(Debug, Error)]
pub enum WalkError<E> {
    #[error("commit graph traversal failed")]
    Traversal(#[source] GraphError),

    #[error("failed to fetch commit detail")]
    Fetch(#[source] E),
}

/// Outcome of a bounded walk
#[derive(Debug, Clone, PartialEq)]
pub struct Walk<D> {
    /// Fetched items, in visit order
    pub items: Vec<D>,
    /// Number of nodes pulled from the traversal
    pub visited: usize,
    /// A node past the window was seen, so later pages may exist
    pub more: bool,
}

/// Drives a [`Traversal`] through a [`Window`], fetching detail only for the
/// nodes the window captures.
pub struct BoundedGraphWalker<'t, T: ?Sized> {
    traversal: &'t T,
}

impl<'t, T: Traversal + ?Sized> BoundedGraphWalker<'t, T> {
    pub fn new(traversal: &'t T) -> Self {
        Self { traversal }
    }

    /// Walk from `frontier`, calling `fetch` synchronously for every captured
    /// node. The first error from either side aborts the walk.
    pub fn walk<D, E, F>(
        &self,
        frontier: &[CommitId],
        mut window: Window,
        mut fetch: F,
    ) -> Result<Walk<D>, WalkError<E>>
    where
        F: FnMut(&CommitNode) -> Result<D, E>,
    {
        if frontier.is_empty() {
            return Ok(Walk {
                items: Vec::new(),
                visited: 0,
                more: false,
            });
        }

        let started = Instant::now();
        let mut items = Vec::new();
        let mut visited = 0;

        let nodes = self
            .traversal
            .traverse(frontier)
            .map_err(WalkError::Traversal)?;

        for node in nodes {
            let node = node.map_err(WalkError::Traversal)?;
            visited += 1;

            let step = window.step(&node);
            if step.capture {
                items.push(fetch(&node).map_err(WalkError::Fetch)?);
            }
            if step.status == TraversalStatus::Finish {
                break;
            }
        }

        debug!(
            visited,
            captured = items.len(),
            more = window.is_filled(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "commit graph walk finished"
        );

        Ok(Walk {
            items,
            visited,
            more: window.is_filled(),
        })
    }
}
