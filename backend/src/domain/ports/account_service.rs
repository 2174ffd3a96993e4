//! Driving port for registration and login.
//!
//! HTTP handlers depend on this trait only, so handler tests substitute a
//! mock instead of wiring a user directory and hasher.

use async_trait::async_trait;

use crate::domain::{AuthenticatedUser, Error, LoginCredentials, Registration, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Create an account. `Conflict` when the username or email is taken.
    async fn register(&self, registration: &Registration) -> Result<UserId, Error>;

    /// Check credentials. Unknown email and wrong password produce the same
    /// `Unauthorized` error.
    async fn authenticate(&self, credentials: &LoginCredentials)
    -> Result<AuthenticatedUser, Error>;
}
