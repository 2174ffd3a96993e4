//! Driven port for account storage.
//!
//! A user directory owns one record per registered account and enforces
//! uniqueness of usernames and emails. Adapters report a uniqueness violation
//! as [`UserDirectoryError::Conflict`] so services can tell it apart from an
//! infrastructure failure.

use std::fmt;

use async_trait::async_trait;

use crate::domain::{Email, PasswordHash, User};

use super::define_port_error;

/// Column whose uniqueness constraint rejected an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateField {
    Username,
    Email,
    /// The backend could not say which constraint fired.
    Unknown,
}

impl DuplicateField {
    /// Request field name, when known.
    pub fn field_name(self) -> Option<&'static str> {
        match self {
            Self::Username => Some("username"),
            Self::Email => Some("email"),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for DuplicateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name().unwrap_or("unknown field"))
    }
}

define_port_error! {
    /// Errors raised by user directory adapters.
    pub enum UserDirectoryError {
        /// A username or email is already registered.
        Conflict { field: DuplicateField } => "user directory conflict on {field}",
        /// The backing store could not be reached.
        Connection { message: String } => "user directory connection failed: {message}",
        /// A query failed while executing.
        Query { message: String } => "user directory query failed: {message}",
        /// A call exceeded its time budget.
        Timeout { message: String } => "user directory call timed out: {message}",
    }
}

/// Stored account together with its password hash.
///
/// Only the account service sees this type; handlers receive [`User`] or
/// [`crate::domain::AuthenticatedUser`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub user: User,
    pub password_hash: PasswordHash,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Insert a new account. Fails with [`UserDirectoryError::Conflict`] when
    /// the username or email is taken; nothing is written in that case.
    async fn insert(&self, record: &UserRecord) -> Result<(), UserDirectoryError>;

    /// Look up an account by its normalised email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<UserRecord>, UserDirectoryError>;
}
