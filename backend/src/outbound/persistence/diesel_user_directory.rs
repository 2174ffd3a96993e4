//! PostgreSQL-backed `UserDirectory`.

use std::time::Duration;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{DuplicateField, UserDirectory, UserDirectoryError, UserRecord};
use crate::domain::{Email, PasswordHash, User, UserId, Username};

use super::diesel_basic_error_mapping::{DieselFailure, classify_diesel_error, pool_failure};
use super::diesel_helpers::with_call_timeout;
use super::models::{NewUserRow, UserRow};
use super::pool::DbPool;
use super::schema::users;

const USERNAME_CONSTRAINT: &str = "users_username_key";
const EMAIL_CONSTRAINT: &str = "users_email_key";

fn duplicate_field(constraint: Option<&str>) -> DuplicateField {
    match constraint {
        Some(USERNAME_CONSTRAINT) => DuplicateField::Username,
        Some(EMAIL_CONSTRAINT) => DuplicateField::Email,
        _ => DuplicateField::Unknown,
    }
}

fn map_failure(failure: DieselFailure) -> UserDirectoryError {
    match failure {
        DieselFailure::UniqueViolation { constraint } => {
            UserDirectoryError::conflict(duplicate_field(constraint.as_deref()))
        }
        DieselFailure::ForeignKeyViolation { .. } => {
            UserDirectoryError::query("unexpected foreign key violation")
        }
        DieselFailure::Connection { message } => UserDirectoryError::connection(message),
        DieselFailure::Query { message } => UserDirectoryError::query(message),
    }
}

fn row_to_record(row: UserRow) -> Result<UserRecord, UserDirectoryError> {
    let username = Username::new(&row.username);
    let email = Email::new(&row.email);
    match (username, email) {
        (Ok(username), Ok(email)) => Ok(UserRecord {
            user: User::new(UserId::from_uuid(row.id), username, email),
            password_hash: PasswordHash::new(row.password_hash),
        }),
        (Err(err), _) | (_, Err(err)) => {
            warn!(user_id = %row.id, error = %err, "stored user row fails validation");
            Err(UserDirectoryError::query("stored user record is invalid"))
        }
    }
}

/// Diesel adapter over the `users` table.
#[derive(Clone)]
pub struct DieselUserDirectory {
    pool: DbPool,
    call_timeout: Duration,
}

impl DieselUserDirectory {
    pub fn new(pool: DbPool, call_timeout: Duration) -> Self {
        Self { pool, call_timeout }
    }
}

#[async_trait]
impl UserDirectory for DieselUserDirectory {
    async fn insert(&self, record: &UserRecord) -> Result<(), UserDirectoryError> {
        let row = NewUserRow {
            id: *record.user.id().as_uuid(),
            username: record.user.username().as_ref(),
            email: record.user.email().as_ref(),
            password_hash: record.password_hash.as_str(),
        };

        with_call_timeout(
            self.call_timeout,
            "insert user",
            async {
                let mut conn = self
                    .pool
                    .get()
                    .await
                    .map_err(|err| map_failure(pool_failure(err)))?;
                diesel::insert_into(users::table)
                    .values(&row)
                    .execute(&mut conn)
                    .await
                    .map_err(|err| map_failure(classify_diesel_error(err)))?;
                Ok(())
            },
            UserDirectoryError::timeout,
        )
        .await
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<UserRecord>, UserDirectoryError> {
        let row = with_call_timeout(
            self.call_timeout,
            "find user by email",
            async {
                let mut conn = self
                    .pool
                    .get()
                    .await
                    .map_err(|err| map_failure(pool_failure(err)))?;
                users::table
                    .filter(users::email.eq(email.as_ref()))
                    .select(UserRow::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
                    .map_err(|err| map_failure(classify_diesel_error(err)))
            },
            UserDirectoryError::timeout,
        )
        .await?;

        row.map(row_to_record).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("users_username_key"), DuplicateField::Username)]
    #[case(Some("users_email_key"), DuplicateField::Email)]
    #[case(Some("users_pkey"), DuplicateField::Unknown)]
    #[case(None, DuplicateField::Unknown)]
    fn unique_violations_name_the_column(
        #[case] constraint: Option<&str>,
        #[case] expected: DuplicateField,
    ) {
        let failure = DieselFailure::UniqueViolation {
            constraint: constraint.map(str::to_owned),
        };
        assert_eq!(map_failure(failure), UserDirectoryError::conflict(expected));
    }

    #[rstest]
    fn connection_failures_stay_connection_failures() {
        let failure = DieselFailure::Connection {
            message: "refused".to_owned(),
        };
        assert_eq!(map_failure(failure), UserDirectoryError::connection("refused"));
    }

    #[rstest]
    fn invalid_stored_rows_are_query_errors() {
        let row = UserRow {
            id: uuid::Uuid::nil(),
            username: "   ".to_owned(),
            email: "alice@x.com".to_owned(),
            password_hash: "hash".to_owned(),
        };
        assert!(matches!(
            row_to_record(row),
            Err(UserDirectoryError::Query { .. })
        ));
    }
}
