//! Classification of Diesel and pool failures shared by the adapters.
//!
//! Adapters turn a [`DieselFailure`] into their own port error; this module
//! only decides which bucket a database error belongs to.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Database failure reduced to what the ports care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// A unique constraint rejected the write.
    UniqueViolation { constraint: Option<String> },
    /// A foreign key constraint rejected the write.
    ForeignKeyViolation { constraint: Option<String> },
    /// The connection dropped or could not be used.
    Connection { message: String },
    /// Any other query or transaction failure.
    Query { message: String },
}

/// Checkout and build failures both mean the store is unreachable.
pub(crate) fn pool_failure(error: PoolError) -> DieselFailure {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    DieselFailure::Connection { message }
}

pub(crate) fn classify_diesel_error(error: DieselError) -> DieselFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DieselFailure::UniqueViolation {
                constraint: info.constraint_name().map(str::to_owned),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            DieselFailure::ForeignKeyViolation {
                constraint: info.constraint_name().map(str::to_owned),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DieselFailure::Connection {
                message: "database connection closed".to_owned(),
            }
        }
        DieselError::BrokenTransactionManager => DieselFailure::Connection {
            message: "transaction manager is broken".to_owned(),
        },
        DieselError::DatabaseError(_, _) => DieselFailure::Query {
            message: "database error".to_owned(),
        },
        DieselError::RollbackTransaction => DieselFailure::Query {
            message: "transaction rolled back".to_owned(),
        },
        _ => DieselFailure::Query {
            message: "database query error".to_owned(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::DatabaseErrorInformation;
    use rstest::rstest;

    #[derive(Debug)]
    struct Info(Option<&'static str>);

    impl DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            "constraint violated"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            self.0
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn db_error(kind: DatabaseErrorKind, constraint: Option<&'static str>) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(Info(constraint)))
    }

    #[rstest]
    fn unique_violation_keeps_constraint_name() {
        let failure = classify_diesel_error(db_error(
            DatabaseErrorKind::UniqueViolation,
            Some("users_email_key"),
        ));
        assert_eq!(
            failure,
            DieselFailure::UniqueViolation {
                constraint: Some("users_email_key".to_owned())
            }
        );
    }

    #[rstest]
    fn foreign_key_violation_is_distinguished() {
        let failure = classify_diesel_error(db_error(
            DatabaseErrorKind::ForeignKeyViolation,
            Some("entries_user_id_fkey"),
        ));
        assert!(matches!(failure, DieselFailure::ForeignKeyViolation { .. }));
    }

    #[rstest]
    #[case(db_error(DatabaseErrorKind::ClosedConnection, None), true)]
    #[case(db_error(DatabaseErrorKind::SerializationFailure, None), false)]
    #[case(DieselError::NotFound, false)]
    #[case(DieselError::RollbackTransaction, false)]
    fn connection_failures_are_separate_from_query_failures(
        #[case] error: DieselError,
        #[case] is_connection: bool,
    ) {
        let failure = classify_diesel_error(error);
        assert_eq!(
            matches!(failure, DieselFailure::Connection { .. }),
            is_connection
        );
    }

    #[rstest]
    fn pool_failures_are_connection_failures() {
        assert_eq!(
            pool_failure(PoolError::checkout("timed out")),
            DieselFailure::Connection {
                message: "timed out".to_owned()
            }
        );
    }
}
