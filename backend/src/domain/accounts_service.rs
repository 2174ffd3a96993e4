//! Account use-cases: registration and password login.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::ports::{
    AccountService, CredentialHasher, DuplicateField, IdentifierSource, UserDirectory,
    UserDirectoryError, UserRecord,
};
use crate::domain::{AuthenticatedUser, Error, LoginCredentials, Registration, User, UserId};

const INVALID_CREDENTIALS: &str = "invalid email or password";

fn map_directory_error(error: UserDirectoryError) -> Error {
    match error {
        UserDirectoryError::Conflict { field } => {
            let message = match field {
                DuplicateField::Username => "username already registered",
                DuplicateField::Email => "email already registered",
                DuplicateField::Unknown => "username or email already registered",
            };
            let error = Error::conflict(message);
            match field.field_name() {
                Some(name) => error.with_details(json!({ "field": name })),
                None => error,
            }
        }
        UserDirectoryError::Connection { message } | UserDirectoryError::Timeout { message } => {
            Error::service_unavailable(format!("user directory unavailable: {message}"))
        }
        UserDirectoryError::Query { message } => {
            Error::internal(format!("user directory error: {message}"))
        }
    }
}

fn invalid_credentials() -> Error {
    Error::unauthorized(INVALID_CREDENTIALS)
}

/// Account service backed by a user directory and a credential hasher.
#[derive(Clone)]
pub struct AccountsService<D: ?Sized, H: ?Sized> {
    directory: Arc<D>,
    hasher: Arc<H>,
    ids: Arc<dyn IdentifierSource>,
}

impl<D: ?Sized, H: ?Sized> AccountsService<D, H> {
    pub fn new(directory: Arc<D>, hasher: Arc<H>, ids: Arc<dyn IdentifierSource>) -> Self {
        Self {
            directory,
            hasher,
            ids,
        }
    }
}

#[async_trait]
impl<D, H> AccountService for AccountsService<D, H>
where
    D: UserDirectory + ?Sized,
    H: CredentialHasher + ?Sized,
{
    async fn register(&self, registration: &Registration) -> Result<UserId, Error> {
        let password_hash = self
            .hasher
            .hash(registration.password())
            .await
            .map_err(|err| Error::internal(err.to_string()))?;

        let user = User::new(
            self.ids.user_id(),
            registration.username().clone(),
            registration.email().clone(),
        );
        let user_id = user.id().clone();

        self.directory
            .insert(&UserRecord {
                user,
                password_hash,
            })
            .await
            .map_err(map_directory_error)?;

        info!(user_id = %user_id, "registered user");
        Ok(user_id)
    }

    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedUser, Error> {
        let record = self
            .directory
            .find_by_email(credentials.email())
            .await
            .map_err(map_directory_error)?;

        let Some(record) = record else {
            // Spend the same hashing effort as a real check.
            let _ = self
                .hasher
                .verify(credentials.password(), &self.hasher.decoy())
                .await;
            debug!("login rejected: unknown email");
            return Err(invalid_credentials());
        };

        if !self
            .hasher
            .verify(credentials.password(), &record.password_hash)
            .await
        {
            debug!(user_id = %record.user.id(), "login rejected: wrong password");
            return Err(invalid_credentials());
        }

        Ok(AuthenticatedUser {
            user_id: record.user.id().clone(),
            username: record.user.username().clone(),
        })
    }
}
