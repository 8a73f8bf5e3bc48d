use graph::CommitId;

use crate::changeset::{ChangesetDetail, ChangesetSource};
use crate::error::PageError;
use crate::security::SecurityService;
use crate::user::User;

/// Hydrates one in-window commit at a time, each inside its own elevated
/// scope. Failures are never swallowed.
pub struct PrivilegedDetailFetcher<'a, S: ?Sized> {
    security: &'a SecurityService,
    user: &'a User,
    reason: &'a str,
    source: &'a S,
}

impl<'a, S: ChangesetSource + ?Sized> PrivilegedDetailFetcher<'a, S> {
    pub fn new(
        security: &'a SecurityService,
        user: &'a User,
        reason: &'a str,
        source: &'a S,
    ) -> Self {
        Self {
            security,
            user,
            reason,
            source,
        }
    }

    pub fn fetch(&self, id: &CommitId) -> Result<ChangesetDetail, PageError> {
        self.security
            .impersonating(self.user, self.reason, |elevated| self.source.changeset(elevated, id))
            .map_err(|source| PageError::Fetch {
                commit: id.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changeset::Person;
    use crate::error::CoreError;
    use crate::security::Elevated;
    use chrono::Utc;
    use std::cell::RefCell;

    /// Records the elevation state seen by each read
    #[derive(Default)]
    struct Recorder {
        seen: RefCell<Vec<(String, String, usize)>>,
        security: SecurityService,
    }

    impl ChangesetSource for Recorder {
        fn changeset(
            &self,
            elevated: &Elevated<'_>,
            id: &CommitId,
        ) -> Result<ChangesetDetail, CoreError> {
            self.seen.borrow_mut().push((
                elevated.user().name.clone(),
                elevated.reason().to_string(),
                self.security.active_elevations(),
            ));
            if id.as_str() == "bad" {
                return Err(CoreError::CommitNotFound(id.clone()));
            }
            let person = Person {
                name: "a".into(),
                email: "a@example.com".into(),
            };
            Ok(ChangesetDetail {
                id: id.clone(),
                display_id: id.short().to_string(),
                parents: Vec::new(),
                author: person.clone(),
                committer: person,
                author_timestamp: Utc::now(),
                message: String::new(),
            })
        }
    }

    #[test]
    fn test_each_fetch_gets_its_own_scope() {
        let source = Recorder::default();
        let user = User::new("alice");
        let reason = "Reading repository changesets";
        let fetcher = PrivilegedDetailFetcher::new(&source.security, &user, reason, &source);

        fetcher.fetch(&CommitId::from("c1")).unwrap();
        fetcher.fetch(&CommitId::from("c2")).unwrap();

        let seen = source.seen.borrow();
        assert_eq!(seen.len(), 2);
        assert!(seen
            .iter()
            .all(|(name, seen_reason, active)| name == "alice"
                && seen_reason == reason
                && *active == 1));
        assert_eq!(source.security.granted_elevations(), 2);
        assert_eq!(source.security.active_elevations(), 0);
    }

    #[test]
    fn test_failure_propagates_and_releases() {
        let source = Recorder::default();
        let user = User::new("alice");
        let fetcher = PrivilegedDetailFetcher::new(&source.security, &user, "read", &source);

        let err = fetcher.fetch(&CommitId::from("bad")).unwrap_err();
        assert!(matches!(
            err,
            PageError::Fetch {
                ref commit,
                source: CoreError::CommitNotFound(_),
            } if commit.as_str() == "bad"
        ));
        assert_eq!(source.security.active_elevations(), 0);
    }
}
