use super::{id::CommitId, node::CommitNode};
use crate::error::GraphError;
use crate::walk::{Nodes, Traversal};
use chrono::{DateTime, Utc};
use std::collections::{BinaryHeap, HashMap, HashSet};

/// In-memory directed acyclic graph of commits
#[derive(Debug, Clone)]
pub struct Dag {
    /// All nodes indexed by commit ID
    pub nodes: HashMap<CommitId, CommitNode>,
}

impl Dag {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
        }
    }

    /// Add a commit node to the DAG
    pub fn add_node(&mut self, node: CommitNode) {
        self.nodes.insert(node.id.clone(), node);
    }

    pub fn get(&self, commit_id: &CommitId) -> Option<&CommitNode> {
        self.nodes.get(commit_id)
    }

    /// Count of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Commits reachable from `include`, parents that are not in the graph
    /// skipped. Fails if a starting commit is unknown.
    fn reachable<'a>(&'a self, include: &[CommitId]) -> Result<HashSet<&'a CommitId>, GraphError> {
        let mut seen = HashSet::new();
        let mut stack = Vec::new();

        for id in include {
            let (id, _) = self
                .nodes
                .get_key_value(id)
                .ok_or_else(|| GraphError::UnknownCommit(id.clone()))?;
            stack.push(id);
        }

        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            for parent in &self.nodes[id].parents {
                if let Some((parent, _)) = self.nodes.get_key_value(parent) {
                    stack.push(parent);
                }
            }
        }

        Ok(seen)
    }
}

impl Default for Dag {
    fn default() -> Self {
        Self::new()
    }
}

impl Traversal for Dag {
    fn traverse<'a>(&'a self, include: &[CommitId]) -> Result<Nodes<'a>, GraphError> {
        Ok(Box::new(DagWalk::new(self, include)?))
    }
}

/// Commit ready to be emitted; ordered newest first
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Ready<'a> {
    timestamp: DateTime<Utc>,
    id: &'a CommitId,
}

/// Topological, time-ordered walk over a [`Dag`]: a commit becomes ready once
/// every reachable child has been emitted.
struct DagWalk<'a> {
    dag: &'a Dag,
    pending: HashMap<&'a CommitId, usize>,
    ready: BinaryHeap<Ready<'a>>,
    failed: bool,
}

impl<'a> DagWalk<'a> {
    fn new(dag: &'a Dag, include: &[CommitId]) -> Result<Self, GraphError> {
        let reachable = dag.reachable(include)?;

        let mut pending: HashMap<&'a CommitId, usize> =
            reachable.iter().map(|id| (*id, 0)).collect();
        for id in &reachable {
            for parent in &dag.nodes[*id].parents {
                if let Some(count) = pending.get_mut(parent) {
                    *count += 1;
                }
            }
        }

        let ready = pending
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(id, _)| Ready {
                timestamp: dag.nodes[*id].timestamp,
                id: *id,
            })
            .collect();

        Ok(Self {
            dag,
            pending,
            ready,
            failed: false,
        })
    }
}

impl<'a> Iterator for DagWalk<'a> {
    type Item = Result<CommitNode, GraphError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let dag = self.dag;
        let Ready { id, .. } = self.ready.pop()?;
        let node = &dag.nodes[id];

        for parent in &node.parents {
            let Some((parent, parent_node)) = dag.nodes.get_key_value(parent) else {
                self.failed = true;
                return Some(Err(GraphError::UnknownCommit(parent.clone())));
            };
            if let Some(count) = self.pending.get_mut(parent) {
                *count -= 1;
                if *count == 0 {
                    self.ready.push(Ready {
                        timestamp: parent_node.timestamp,
                        id: parent,
                    });
                }
            }
        }

        Some(Ok(node.clone()))
    }
}
