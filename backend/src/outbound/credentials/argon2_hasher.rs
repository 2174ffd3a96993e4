//! Argon2id `CredentialHasher` producing PHC strings.
//!
//! Hashes embed their own parameters, so raising the cost settings later
//! still verifies hashes written under the old ones.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash as PhcString, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHasher, PasswordVerifier, Version};
use async_trait::async_trait;
use tracing::warn;

use crate::domain::ports::{CredentialHasher, HashingError};
use crate::domain::{Password, PasswordHash, TraceId};

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Settings {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for Argon2Settings {
    /// m=19456 KiB, t=2, p=1.
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

fn hash_blocking(params: Params, plaintext: &str) -> Result<String, HashingError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| HashingError::hash(err.to_string()))
}

fn verify_blocking(params: Params, plaintext: &str, encoded: &str) -> bool {
    let parsed = match PhcString::new(encoded) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(error = %err, "stored password hash is not a valid PHC string");
            return false;
        }
    };
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

/// Argon2id hasher running on tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct Argon2CredentialHasher {
    params: Params,
    decoy: PasswordHash,
}

impl Argon2CredentialHasher {
    /// Validate the cost parameters and precompute the decoy hash.
    pub fn new(settings: Argon2Settings) -> Result<Self, HashingError> {
        let params = Params::new(
            settings.memory_kib,
            settings.iterations,
            settings.parallelism,
            None,
        )
        .map_err(|err| HashingError::hash(format!("invalid argon2 parameters: {err}")))?;

        let decoy_secret = SaltString::generate(&mut OsRng);
        let decoy = PasswordHash::new(hash_blocking(params.clone(), decoy_secret.as_str())?);
        Ok(Self { params, decoy })
    }
}

#[async_trait]
impl CredentialHasher for Argon2CredentialHasher {
    async fn hash(&self, password: &Password) -> Result<PasswordHash, HashingError> {
        let params = self.params.clone();
        let password = password.clone();
        let trace_id = TraceId::current();
        let encoded = tokio::task::spawn_blocking(move || {
            TraceId::sync_scope(trace_id, || hash_blocking(params, password.expose()))
        })
        .await
        .map_err(|err| HashingError::hash(format!("hashing task failed: {err}")))??;
        Ok(PasswordHash::new(encoded))
    }

    async fn verify(&self, password: &Password, hash: &PasswordHash) -> bool {
        let params = self.params.clone();
        let password = password.clone();
        let encoded = hash.as_str().to_owned();
        let trace_id = TraceId::current();
        tokio::task::spawn_blocking(move || {
            TraceId::sync_scope(trace_id, || {
                verify_blocking(params, password.expose(), &encoded)
            })
        })
        .await
        .unwrap_or_else(|err| {
            warn!(error = %err, "verification task failed");
            false
        })
    }

    fn decoy(&self) -> PasswordHash {
        self.decoy.clone()
    }
}
