use chrono::{DateTime, Utc};
use git2::{Commit, ObjectType, Oid, Repository, Sort};
use std::path::Path;
use tracing::debug;

use crate::core::{CommitId, CommitNode};
use crate::decor::{HeadSource, Reference};
use crate::error::GraphError;
use crate::walk::{Nodes, Traversal, TraversalStatus};

/// git2-backed head enumeration and commit graph traversal
pub struct GitWalker {
    repo: Repository,
}

impl GitWalker {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GraphError> {
        Ok(Self {
            repo: Repository::open(path)?,
        })
    }

    pub fn from_repository(repo: Repository) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Convert a git2::Commit to CommitNode
    fn commit_to_node(commit: &Commit) -> CommitNode {
        let timestamp = DateTime::<Utc>::from_timestamp(commit.time().seconds(), 0)
            .unwrap_or_default();

        CommitNode::new(
            commit.id().into(),
            commit.parent_ids().map(CommitId::from).collect(),
            timestamp,
        )
    }
}

impl HeadSource for GitWalker {
    fn heads(&self, visit: &mut dyn FnMut(Reference) -> TraversalStatus) -> Result<(), GraphError> {
        for glob in ["refs/heads/*", "refs/tags/*"] {
            for reference in self.repo.references_glob(glob)? {
                let reference = reference?;
                let Some(name) = reference.name() else {
                    continue;
                };

                // Annotated tags peel through to whatever they tag
                let object = reference.peel(ObjectType::Any)?;
                let Some(commit) = object.as_commit() else {
                    debug!(reference = name, "skipping reference that does not point at a commit");
                    continue;
                };

                let Some(label) = Reference::from_full_name(name, commit.id().into()) else {
                    continue;
                };
                if visit(label) == TraversalStatus::Finish {
                    return Ok(());
                }
            }
        }
        Ok(())
    }
}

impl Traversal for GitWalker {
    fn traverse<'a>(&'a self, include: &[CommitId]) -> Result<Nodes<'a>, GraphError> {
        let mut revwalk = self.repo.revwalk()?;
        // Topological sorting makes libgit2 read the whole reachable history
        // before the first commit is yielded. Only node visits stay bounded.
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        for id in include {
            revwalk.push(Oid::try_from(id)?)?;
        }

        let repo = &self.repo;
        Ok(Box::new(revwalk.map(move |oid| -> Result<CommitNode, GraphError> {
            let commit = repo.find_commit(oid?)?;
            Ok(Self::commit_to_node(&commit))
        })))
    }
}
