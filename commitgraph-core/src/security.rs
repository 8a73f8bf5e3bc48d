//! Scoped privilege elevation.
//!
//! Reading commit metadata needs a capability the acting user may not hold on
//! its own. [`SecurityService::impersonating`] grants it for exactly one
//! operation: the [`Elevated`] token is created right before the operation
//! runs and dropped right after, whether it returns `Ok`, `Err` or unwinds.
//! Reads that need the capability take `&Elevated`, so they cannot be called
//! outside such a scope.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tracing::trace;

use crate::user::User;

/// Grants and tracks elevated execution scopes
#[derive(Debug, Default)]
pub struct SecurityService {
    active: AtomicUsize,
    granted: AtomicU64,
}

/// Proof of an elevated scope; released on drop
#[derive(Debug)]
pub struct Elevated<'s> {
    service: &'s SecurityService,
    user: &'s User,
    reason: &'s str,
}

impl SecurityService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `op` as `user` with elevated capability.
    pub fn impersonating<'s, T, E, F>(
        &'s self,
        user: &'s User,
        reason: &'s str,
        op: F,
    ) -> Result<T, E>
    where
        F: FnOnce(&Elevated<'s>) -> Result<T, E>,
    {
        let elevated = self.elevate(user, reason);
        op(&elevated)
    }

    /// Scopes currently held
    pub fn active_elevations(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Scopes granted since creation
    pub fn granted_elevations(&self) -> u64 {
        self.granted.load(Ordering::SeqCst)
    }

    fn elevate<'s>(&'s self, user: &'s User, reason: &'s str) -> Elevated<'s> {
        self.active.fetch_add(1, Ordering::SeqCst);
        self.granted.fetch_add(1, Ordering::SeqCst);
        trace!(user = %user, reason, "elevation acquired");
        Elevated {
            service: self,
            user,
            reason,
        }
    }
}

impl Elevated<'_> {
    pub fn user(&self) -> &User {
        self.user
    }

    pub fn reason(&self) -> &str {
        self.reason
    }
}

impl Drop for Elevated<'_> {
    fn drop(&mut self) {
        self.service.active.fetch_sub(1, Ordering::SeqCst);
        trace!(user = %self.user, reason = self.reason, "elevation released");
    }
}
