//! Explicit access to the signed-in user.
//!
//! Consumers take a [`CurrentUserProvider`] instead of reaching into session
//! or browser storage themselves.

use crate::types::User;

pub trait CurrentUserProvider {
    fn current_user(&self) -> Option<&User>;
}

/// Provider holding a user resolved up front (e.g. from a request)
#[derive(Debug, Clone, Default)]
pub struct StaticUser(Option<User>);

impl StaticUser {
    pub fn signed_in(user: User) -> Self {
        Self(Some(user))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl CurrentUserProvider for StaticUser {
    fn current_user(&self) -> Option<&User> {
        self.0.as_ref()
    }
}
