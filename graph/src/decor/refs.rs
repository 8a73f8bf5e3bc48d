use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::CommitId;
use crate::error::GraphError;
use crate::walk::TraversalStatus;

/// Kind of head reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefKind {
    Branch,
    Tag,
}

impl RefKind {
    fn prefix(self) -> &'static str {
        match self {
            RefKind::Branch => "refs/heads/",
            RefKind::Tag => "refs/tags/",
        }
    }
}

/// Named pointer (branch or tag) at a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Full name, e.g. `refs/heads/main`
    pub id: String,
    /// Short name, e.g. `main`
    pub display_id: String,
    pub kind: RefKind,
    /// Commit the reference resolves to (tags peeled)
    pub target: CommitId,
}

impl Reference {
    pub fn branch(name: &str, target: CommitId) -> Self {
        Self::new(RefKind::Branch, name, target)
    }

    pub fn tag(name: &str, target: CommitId) -> Self {
        Self::new(RefKind::Tag, name, target)
    }

    /// Build from a full ref name; `None` for anything that is not a branch
    /// or tag.
    pub fn from_full_name(full_name: &str, target: CommitId) -> Option<Self> {
        [RefKind::Branch, RefKind::Tag].into_iter().find_map(|kind| {
            full_name
                .strip_prefix(kind.prefix())
                .map(|name| Self::new(kind, name, target.clone()))
        })
    }

    fn new(kind: RefKind, name: &str, target: CommitId) -> Self {
        Self {
            id: format!("{}{}", kind.prefix(), name),
            display_id: name.to_string(),
            kind,
            target,
        }
    }
}

/// Head-reference enumeration.
///
/// Calls `visit` once per branch or tag tip until it returns
/// [`TraversalStatus::Finish`] or the references run out.
pub trait HeadSource {
    fn heads(&self, visit: &mut dyn FnMut(Reference) -> TraversalStatus) -> Result<(), GraphError>;
}

impl HeadSource for [Reference] {
    fn heads(&self, visit: &mut dyn FnMut(Reference) -> TraversalStatus) -> Result<(), GraphError> {
        for reference in self {
            if visit(reference.clone()) == TraversalStatus::Finish {
                break;
            }
        }
        Ok(())
    }
}

/// Commit -> references pointing at it, in enumeration order.
///
/// Commits without a reference have no entry. The distinct keys, in the order
/// they were first seen, form the frontier of the graph walk.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LabelIndex {
    labels: BTreeMap<CommitId, Vec<Reference>>,
    #[serde(skip)]
    frontier: Vec<CommitId>,
}

impl LabelIndex {
    /// Enumerate every head of `source`. Nothing is returned if enumeration
    /// fails part way.
    pub fn build<H: HeadSource + ?Sized>(source: &H) -> Result<Self, GraphError> {
        let mut index = Self::default();
        source.heads(&mut |reference| {
            index.insert(reference);
            TraversalStatus::Continue
        })?;
        Ok(index)
    }

    pub fn insert(&mut self, reference: Reference) {
        let refs = self.labels.entry(reference.target.clone()).or_default();
        if refs.is_empty() {
            self.frontier.push(reference.target.clone());
        }
        refs.push(reference);
    }

    /// References at `commit`; empty when none point at it
    pub fn get(&self, commit: &CommitId) -> &[Reference] {
        self.labels.get(commit).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains(&self, commit: &CommitId) -> bool {
        self.labels.contains_key(commit)
    }

    /// Distinct labelled commits, first-seen order
    pub fn frontier(&self) -> &[CommitId] {
        &self.frontier
    }

    /// Number of labelled commits
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Total number of references across all commits
    pub fn reference_count(&self) -> usize {
        self.labels.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CommitId, &[Reference])> {
        self.labels.iter().map(|(id, refs)| (id, refs.as_slice()))
    }
}
