use super::TraversalStatus;
use crate::core::CommitNode;

/// Decision taken for one visited node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// The node falls inside the window and must be hydrated
    pub capture: bool,
    pub status: TraversalStatus,
}

/// Counter-based visibility window `[offset, offset + limit)`.
///
/// Every visited commit with parents advances the counter by one. A root
/// commit is still checked against the window but does not advance the
/// counter, and always ends the walk. Once the counter reaches
/// `offset + limit` the next visited node ends the walk without being
/// captured, so a walk never visits more than `offset + limit + 1` nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    offset: usize,
    limit: usize,
    counter: usize,
    filled: bool,
}

impl Window {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self {
            offset,
            limit,
            counter: 0,
            filled: false,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Exclusive upper bound of the window
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.limit)
    }

    /// Current zero-based position of the next node
    pub fn position(&self) -> usize {
        self.counter
    }

    /// True once a node beyond the window has been observed
    pub fn is_filled(&self) -> bool {
        self.filled
    }

    /// Decide what happens to `node` and advance the counter.
    pub fn step(&mut self, node: &CommitNode) -> Step {
        if self.counter >= self.end() {
            self.filled = true;
            return Step {
                capture: false,
                status: TraversalStatus::Finish,
            };
        }

        let capture = self.counter >= self.offset;

        // No parents: this is the root, nothing older to show.
        if node.is_root() {
            return Step {
                capture,
                status: TraversalStatus::Finish,
            };
        }

        self.counter += 1;
        Step {
            capture,
            status: TraversalStatus::Continue,
        }
    }
}
