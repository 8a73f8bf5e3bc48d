use anyhow::Result;
use commitgraph_core::{
    Config, FsRepositoryService, GraphPageService, PageError, RepositoryKey, User,
};
use git2::{Oid, Repository, Signature, Time};
use graph::CommitId;
use pretty_assertions::assert_eq;
use std::path::Path;
use tempfile::TempDir;

/// `<root>/PROJ/repo` holding C1 <- ... <- C5 on `main`, `release` at C3 and
/// an annotated tag `v0.1` at C1.
fn fixture(root: &Path) -> Result<Vec<Oid>> {
    let repo = Repository::init(root.join("PROJ").join("repo"))?;
    let tree_id = repo.index()?.write_tree()?;
    let tree = repo.find_tree(tree_id)?;

    let mut oids: Vec<Oid> = Vec::new();
    for i in 1..=5 {
        let time = Time::new(1_700_000_000 + i * 60, 0);
        let sig = Signature::new("Tester", "tester@example.com", &time)?;
        let parent = oids.last().map(|oid| repo.find_commit(*oid)).transpose()?;
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        let message = format!("C{i}");
        oids.push(repo.commit(Some("refs/heads/main"), &sig, &sig, &message, &tree, &parents)?);
    }

    let c3 = repo.find_commit(oids[2])?;
    repo.branch("release", &c3, false)?;
    let c1 = repo.find_commit(oids[0])?;
    let sig = Signature::new("Tester", "tester@example.com", &Time::new(1_700_000_000, 0))?;
    repo.tag("v0.1", c1.as_object(), &sig, "first", false)?;

    Ok(oids)
}

fn service(root: &Path) -> GraphPageService<FsRepositoryService> {
    GraphPageService::new(FsRepositoryService::new(root), &Config::default())
}

fn summaries(page: &commitgraph_core::GraphPage) -> Vec<&str> {
    page.page.items.iter().map(|d| d.summary()).collect()
}

#[test]
fn pages_through_git_history() -> Result<()> {
    let dir = TempDir::new()?;
    fixture(dir.path())?;
    let service = service(dir.path());
    let key = RepositoryKey::new("PROJ", "repo");
    let user = User::new("alice");

    let first = service.graph_page(&key, Some(&user), 1, Some(2))?;
    assert_eq!(summaries(&first), vec!["C5", "C4"]);
    assert!(!first.page.is_last_page);

    let third = service.graph_page(&key, Some(&user), 3, Some(2))?;
    assert_eq!(summaries(&third), vec!["C1"]);
    assert!(third.page.is_last_page);

    let tenth = service.graph_page(&key, Some(&user), 10, Some(2))?;
    assert!(tenth.page.is_empty());

    assert_eq!(service.security().granted_elevations(), 3);
    assert_eq!(service.security().active_elevations(), 0);
    Ok(())
}

#[test]
fn labels_from_branches_and_tags() -> Result<()> {
    let dir = TempDir::new()?;
    let oids = fixture(dir.path())?;
    let service = service(dir.path());
    let key = RepositoryKey::new("PROJ", "repo");

    let page = service.graph_page(&key, Some(&User::new("alice")), 1, Some(5))?;
    let names = |oid: Oid| -> Vec<String> {
        page.labels
            .get(&CommitId::from(oid))
            .iter()
            .map(|r| r.display_id.clone())
            .collect()
    };

    assert_eq!(names(oids[4]), vec!["main"]);
    assert_eq!(names(oids[2]), vec!["release"]);
    assert_eq!(names(oids[0]), vec!["v0.1"]);
    assert!(names(oids[1]).is_empty());
    assert_eq!(page.page.len(), 5);
    Ok(())
}

#[test]
fn serializes_for_presentation() -> Result<()> {
    let dir = TempDir::new()?;
    let oids = fixture(dir.path())?;
    let service = service(dir.path());
    let key = RepositoryKey::new("PROJ", "repo");

    let page = service.graph_page(&key, Some(&User::new("alice")), 1, Some(1))?;
    let json = serde_json::to_value(&page)?;

    assert_eq!(json["repository"]["slug"], "repo");
    assert_eq!(json["page"]["page_number"], 1);
    assert_eq!(json["page"]["items"][0]["id"], oids[4].to_string());
    assert_eq!(json["labels"][oids[4].to_string()][0]["display_id"], "main");
    assert_eq!(json["labels"][oids[2].to_string()][0]["kind"], "branch");
    Ok(())
}

#[test]
fn missing_repository_is_not_found() -> Result<()> {
    let dir = TempDir::new()?;
    fixture(dir.path())?;
    let service = service(dir.path());

    let err = service
        .graph_page(&RepositoryKey::new("PROJ", "nope"), Some(&User::new("alice")), 1, Some(2))
        .unwrap_err();
    assert!(matches!(err, PageError::NotFound(_)));
    Ok(())
}
