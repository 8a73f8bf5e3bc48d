use graph::{BoundedGraphWalker, HeadSource, LabelIndex, Page, PageRequest, Traversal};
use serde::Serialize;
use std::num::NonZeroUsize;
use tracing::{debug, info_span};
use uuid::Uuid;

use crate::changeset::{ChangesetDetail, ChangesetSource};
use crate::config::Config;
use crate::error::PageError;
use crate::fetcher::PrivilegedDetailFetcher;
use crate::repository::{RepositoryKey, RepositoryService};
use crate::security::SecurityService;
use crate::user::User;

/// Everything one opened repository must offer to produce a graph page
pub trait CommitGraph: HeadSource + Traversal + ChangesetSource {}

impl<T: HeadSource + Traversal + ChangesetSource + ?Sized> CommitGraph for T {}

/// Labels plus one page of changesets
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphPage {
    pub repository: RepositoryKey,
    pub labels: LabelIndex,
    pub page: Page<ChangesetDetail>,
}

impl GraphPage {
    /// 1-indexed page number actually served
    pub fn page_number(&self) -> usize {
        self.page.page_number
    }

    pub fn limit(&self) -> usize {
        self.page.page_size
    }
}

/// Produces graph pages for repositories found through `R`
pub struct GraphPageService<R> {
    repositories: R,
    security: SecurityService,
    default_page_size: usize,
    max_page_size: usize,
    elevation_reason: String,
}

impl<R: RepositoryService> GraphPageService<R>
where
    R::Repository: CommitGraph,
{
    pub fn new(repositories: R, config: &Config) -> Self {
        Self {
            repositories,
            security: SecurityService::new(),
            default_page_size: config.page_size,
            max_page_size: config.max_page_size,
            elevation_reason: config.elevation_reason.clone(),
        }
    }

    pub fn repositories(&self) -> &R {
        &self.repositories
    }

    pub fn security(&self) -> &SecurityService {
        &self.security
    }

    /// Validate paging input. Page numbers below 1 are clamped; a missing
    /// size falls back to the configured default.
    pub fn page_request(
        &self,
        page_number: i64,
        page_size: Option<usize>,
    ) -> Result<PageRequest, PageError> {
        let size = page_size.unwrap_or(self.default_page_size);
        let size = NonZeroUsize::new(size)
            .ok_or_else(|| PageError::InvalidRequest("page size must be positive".into()))?;
        if size.get() > self.max_page_size {
            return Err(PageError::InvalidRequest(format!(
                "page size {} exceeds the maximum of {}",
                size, self.max_page_size
            )));
        }
        Ok(PageRequest::new(page_number, size))
    }

    /// Labels and one page of commits for `key`, read on behalf of `user`.
    pub fn graph_page(
        &self,
        key: &RepositoryKey,
        user: Option<&User>,
        page_number: i64,
        page_size: Option<usize>,
    ) -> Result<GraphPage, PageError> {
        let request = self.page_request(page_number, page_size)?;
        let user = user.ok_or_else(|| PageError::NotFound("acting user".into()))?;
        let repository = self.open(key)?;

        let span = info_span!(
            "graph_page",
            request_id = %Uuid::new_v4(),
            repository = %key,
            page = request.page_number(),
            size = request.page_size(),
        );
        let _enter = span.enter();

        let (labels, page) = self.collect(&repository, user, request)?;
        Ok(GraphPage {
            repository: key.clone(),
            labels,
            page,
        })
    }

    /// Only the label index of `key`.
    pub fn labels(
        &self,
        key: &RepositoryKey,
        user: Option<&User>,
    ) -> Result<LabelIndex, PageError> {
        user.ok_or_else(|| PageError::NotFound("acting user".into()))?;
        let repository = self.open(key)?;
        LabelIndex::build(&repository).map_err(PageError::RefEnumeration)
    }

    /// Build the label index of `graph`, then walk from its labelled commits
    /// and hydrate only the commits inside the requested window.
    pub fn collect<G: CommitGraph + ?Sized>(
        &self,
        graph: &G,
        user: &User,
        request: PageRequest,
    ) -> Result<(LabelIndex, Page<ChangesetDetail>), PageError> {
        let labels = LabelIndex::build(graph).map_err(PageError::RefEnumeration)?;
        debug!(
            labelled = labels.len(),
            references = labels.reference_count(),
            "label index built"
        );

        let reason = self.elevation_reason.as_str();
        let fetcher = PrivilegedDetailFetcher::new(&self.security, user, reason, graph);
        let walk = BoundedGraphWalker::new(graph)
            .walk(labels.frontier(), request.window(), |node| fetcher.fetch(&node.id))?;

        let page = Page::assemble(walk.items, request, walk.more);
        Ok((labels, page))
    }

    fn open(&self, key: &RepositoryKey) -> Result<R::Repository, PageError> {
        self.repositories
            .get_by_slug(key)
            .map_err(PageError::Repository)?
            .ok_or_else(|| PageError::NotFound(format!("repository {key}")))
    }
}
