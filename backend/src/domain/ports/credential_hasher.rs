//! Driven port for password hashing.

use async_trait::async_trait;

use crate::domain::{Password, PasswordHash};

use super::define_port_error;

define_port_error! {
    /// Raised only when the hasher itself cannot run (entropy or resource
    /// failure). A wrong password is never an error.
    pub enum HashingError {
        Hash { message: String } => "password hashing failed: {message}",
    }
}

/// Salted, cost-parameterised one-way password hashing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialHasher: Send + Sync {
    /// Hash `password` with a fresh salt.
    async fn hash(&self, password: &Password) -> Result<PasswordHash, HashingError>;

    /// `true` iff `hash` was produced from `password`. Mismatches and
    /// unreadable hashes both return `false`.
    async fn verify(&self, password: &Password, hash: &PasswordHash) -> bool;

    /// A well-formed hash of no real password. Verifying against it costs the
    /// same as a genuine check, which keeps unknown-email logins as slow as
    /// wrong-password ones.
    fn decoy(&self) -> PasswordHash;
}

/// Fast, insecure hasher for tests and local fixtures.
///
/// Produces `fixture$<password>`; never use it with real credentials.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCredentialHasher;

const FIXTURE_PREFIX: &str = "fixture$";

#[async_trait]
impl CredentialHasher for FixtureCredentialHasher {
    async fn hash(&self, password: &Password) -> Result<PasswordHash, HashingError> {
        Ok(PasswordHash::new(format!(
            "{FIXTURE_PREFIX}{}",
            password.expose()
        )))
    }

    async fn verify(&self, password: &Password, hash: &PasswordHash) -> bool {
        hash.as_str()
            .strip_prefix(FIXTURE_PREFIX)
            .is_some_and(|stored| stored == password.expose())
    }

    fn decoy(&self) -> PasswordHash {
        PasswordHash::new(FIXTURE_PREFIX)
    }
}
