use chrono::{DateTime, Utc};
use git2::{ErrorCode, Oid};
use graph::{
    CommitId, GitWalker, GraphError, HeadSource, Nodes, Reference, Traversal, TraversalStatus,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::changeset::{ChangesetDetail, ChangesetSource, Person};
use crate::error::CoreError;
use crate::security::Elevated;

/// Project key and repository slug naming one hosted repository
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepositoryKey {
    pub project: String,
    pub slug: String,
}

impl RepositoryKey {
    pub fn new(project: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            slug: slug.into(),
        }
    }

    /// Parse `/PROJECT/slug[/...]`; trailing components are ignored.
    pub fn parse(path: &str) -> Option<Self> {
        let mut components = path.trim_start_matches('/').split('/');
        let project = components.next().filter(|c| !c.is_empty())?;
        let slug = components.next().filter(|c| !c.is_empty())?;
        Some(Self::new(project, slug))
    }

    /// Both components are plain directory names
    fn is_safe(&self) -> bool {
        [&self.project, &self.slug]
            .iter()
            .all(|c| !c.is_empty() && *c != "." && *c != ".." && !c.contains(['/', '\\']))
    }
}

impl fmt::Display for RepositoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.project, self.slug)
    }
}

/// An opened repository: head enumeration, graph traversal and changeset
/// hydration over git2.
pub struct Repository {
    key: RepositoryKey,
    walker: GitWalker,
}

impl Repository {
    /// Open an existing repository
    pub fn open<P: AsRef<Path>>(key: RepositoryKey, path: P) -> Result<Self, CoreError> {
        let walker = GitWalker::open(path.as_ref())?;

        Ok(Repository { key, walker })
    }

    pub fn key(&self) -> &RepositoryKey {
        &self.key
    }

    fn load_changeset(&self, id: &CommitId) -> Result<ChangesetDetail, CoreError> {
        let repo = self.walker.repository();
        let oid = Oid::try_from(id)?;
        let commit = match repo.find_commit(oid) {
            Ok(commit) => commit,
            Err(err) if err.code() == ErrorCode::NotFound => {
                return Err(CoreError::CommitNotFound(id.clone()))
            }
            Err(err) => return Err(err.into()),
        };

        let person = |sig: git2::Signature| Person {
            name: sig.name().unwrap_or("").to_string(),
            email: sig.email().unwrap_or("").to_string(),
        };
        let author = commit.author();
        let author_timestamp =
            DateTime::<Utc>::from_timestamp(author.when().seconds(), 0).unwrap_or_default();

        Ok(ChangesetDetail {
            id: id.clone(),
            display_id: id.short().to_string(),
            parents: commit.parent_ids().map(CommitId::from).collect(),
            author: person(author),
            committer: person(commit.committer()),
            author_timestamp,
            message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
        })
    }
}

impl HeadSource for Repository {
    fn heads(&self, visit: &mut dyn FnMut(Reference) -> TraversalStatus) -> Result<(), GraphError> {
        self.walker.heads(visit)
    }
}

impl Traversal for Repository {
    fn traverse<'a>(&'a self, include: &[CommitId]) -> Result<Nodes<'a>, GraphError> {
        self.walker.traverse(include)
    }
}

impl ChangesetSource for Repository {
    fn changeset(
        &self,
        _elevated: &Elevated<'_>,
        id: &CommitId,
    ) -> Result<ChangesetDetail, CoreError> {
        self.load_changeset(id)
    }
}

/// Looks repositories up by key
pub trait RepositoryService {
    type Repository;

    /// `Ok(None)` when no such repository exists
    fn get_by_slug(&self, key: &RepositoryKey) -> Result<Option<Self::Repository>, CoreError>;
}

/// Repositories stored on disk as `<root>/<project>/<slug>` or
/// `<root>/<project>/<slug>.git`
#[derive(Debug, Clone)]
pub struct FsRepositoryService {
    root: PathBuf,
}

impl FsRepositoryService {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn locate(&self, key: &RepositoryKey) -> Option<PathBuf> {
        if !key.is_safe() {
            return None;
        }
        let project = self.root.join(&key.project);
        [project.join(&key.slug), project.join(format!("{}.git", key.slug))]
            .into_iter()
            .find(|path| path.is_dir())
    }

    /// Every repository under the root, sorted by key
    pub fn list(&self) -> Result<Vec<RepositoryKey>, CoreError> {
        let mut keys = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(2).max_depth(2) {
            let entry = entry?;
            if !entry.file_type().is_dir() || git2::Repository::open(entry.path()).is_err() {
                continue;
            }
            let project = entry
                .path()
                .parent()
                .and_then(Path::file_name)
                .map(|name| name.to_string_lossy().into_owned());
            let slug = entry.file_name().to_string_lossy();
            if let Some(project) = project {
                let slug = slug.strip_suffix(".git").unwrap_or(&slug);
                keys.push(RepositoryKey::new(project, slug));
            }
        }
        keys.sort();
        keys.dedup();
        Ok(keys)
    }
}

impl RepositoryService for FsRepositoryService {
    type Repository = Repository;

    fn get_by_slug(&self, key: &RepositoryKey) -> Result<Option<Repository>, CoreError> {
        match self.locate(key) {
            Some(path) => Repository::open(key.clone(), path).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::SecurityService;
    use crate::user::User;
    use anyhow::Result;
    use git2::{Signature, Time};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    /// Make a bare-ish repository at `<root>/<project>/<slug>` with `count`
    /// linear commits on `main`.
    fn make_repo(root: &Path, project: &str, slug: &str, count: usize) -> Result<Vec<Oid>> {
        let repo = git2::Repository::init(root.join(project).join(slug))?;
        let tree_id = repo.index()?.write_tree()?;
        let tree = repo.find_tree(tree_id)?;

        let mut oids: Vec<Oid> = Vec::new();
        for i in 0..count {
            let time = Time::new(1_000 + i as i64, 0);
            let sig = Signature::new("Tester", "tester@example.com", &time)?;
            let parent = oids.last().map(|oid| repo.find_commit(*oid)).transpose()?;
            let parents: Vec<&git2::Commit> = parent.iter().collect();
            let message = format!("c{}\n\nbody {}", i + 1, i + 1);
            oids.push(repo.commit(Some("refs/heads/main"), &sig, &sig, &message, &tree, &parents)?);
        }
        Ok(oids)
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(RepositoryKey::parse("/PROJ/repo"), Some(RepositoryKey::new("PROJ", "repo")));
        assert_eq!(
            RepositoryKey::parse("/PROJ/repo/extra"),
            Some(RepositoryKey::new("PROJ", "repo"))
        );
        assert_eq!(
            RepositoryKey::parse("PROJ/repo").map(|k| k.to_string()),
            Some("PROJ/repo".into())
        );
        assert_eq!(RepositoryKey::parse("/PROJ"), None);
        assert_eq!(RepositoryKey::parse("/PROJ/"), None);
        assert_eq!(RepositoryKey::parse(""), None);
    }

    #[test]
    fn test_get_by_slug() -> Result<()> {
        let dir = TempDir::new()?;
        make_repo(dir.path(), "PROJ", "repo", 1)?;
        let service = FsRepositoryService::new(dir.path());

        let repo = service.get_by_slug(&RepositoryKey::new("PROJ", "repo"))?;
        assert!(repo.is_some());
        assert!(service.get_by_slug(&RepositoryKey::new("PROJ", "missing"))?.is_none());
        assert!(service.get_by_slug(&RepositoryKey::new("..", "PROJ"))?.is_none());
        Ok(())
    }

    #[test]
    fn test_list() -> Result<()> {
        let dir = TempDir::new()?;
        make_repo(dir.path(), "B", "two", 1)?;
        make_repo(dir.path(), "A", "one.git", 1)?;
        std::fs::create_dir_all(dir.path().join("A").join("not-a-repo"))?;

        let keys = FsRepositoryService::new(dir.path()).list()?;
        assert_eq!(keys, vec![RepositoryKey::new("A", "one"), RepositoryKey::new("B", "two")]);
        Ok(())
    }

    #[test]
    fn test_changeset_detail() -> Result<()> {
        let dir = TempDir::new()?;
        let oids = make_repo(dir.path(), "PROJ", "repo", 2)?;
        let key = RepositoryKey::new("PROJ", "repo");
        let repo = Repository::open(key, dir.path().join("PROJ/repo"))?;
        let security = SecurityService::new();
        let user = User::new("alice");

        let id = CommitId::from(oids[1]);
        let detail =
            security.impersonating(&user, "test", |elevated| repo.changeset(elevated, &id))?;

        assert_eq!(detail.id, id);
        assert_eq!(detail.display_id.len(), 8);
        assert_eq!(detail.parents, vec![CommitId::from(oids[0])]);
        assert_eq!(detail.author.name, "Tester");
        assert_eq!(detail.author.email, "tester@example.com");
        assert_eq!(detail.author_timestamp.timestamp(), 1_001);
        assert_eq!(detail.summary(), "c2");
        Ok(())
    }

    #[test]
    fn test_changeset_not_found() -> Result<()> {
        let dir = TempDir::new()?;
        make_repo(dir.path(), "PROJ", "repo", 1)?;
        let key = RepositoryKey::new("PROJ", "repo");
        let repo = Repository::open(key, dir.path().join("PROJ/repo"))?;
        let security = SecurityService::new();
        let user = User::new("alice");

        let id = CommitId::from("4b825dc642cb6eb9a060e54bf8d69288fbee4904");
        let result =
            security.impersonating(&user, "test", |elevated| repo.changeset(elevated, &id));
        assert!(matches!(result, Err(CoreError::CommitNotFound(_))));
        Ok(())
    }
}
