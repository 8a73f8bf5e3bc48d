use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Authenticated acting user
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub name: String,
}

impl User {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Resolves the acting user of a request.
///
/// With no known users configured, any non-empty name resolves.
#[derive(Debug, Clone, Default)]
pub struct AuthenticationContext {
    known: HashSet<String>,
}

impl AuthenticationContext {
    pub fn new<I, S>(known: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known: known.into_iter().map(Into::into).collect(),
        }
    }

    /// The user behind `name`, or `None` when it cannot be resolved
    pub fn current_user(&self, name: Option<&str>) -> Option<User> {
        let name = name.map(str::trim).filter(|name| !name.is_empty())?;
        if self.known.is_empty() || self.known.contains(name) {
            Some(User::new(name))
        } else {
            None
        }
    }
}
