//! Shared Diesel error mapping for the repositories.
//!
//! Every port error defines `Connection` and `Query` variants; these helpers
//! take their constructors so each repository maps failures the same way.
//! Unique violations are exposed separately because they carry domain
//! meaning (duplicate email, second group membership, repeated vote).

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::models::InvalidRow;
use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map common Diesel error variants into query/connection constructors.
///
/// `NotFound` and query-builder failures map to query errors; a closed
/// connection maps to a connection error so callers can answer 503.
pub fn map_basic_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => query("database error"),
        _ => query("database error"),
    }
}

/// Name of the unique constraint a write violated, if any.
///
/// Returns an empty name when the server did not report one.
pub fn unique_violation(error: &DieselError) -> Option<&str> {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            Some(info.constraint_name().unwrap_or_default())
        }
        _ => None,
    }
}

/// Map a row that failed domain validation into a query error.
pub fn map_invalid_row<E, Q>(error: InvalidRow, query: Q) -> E
where
    Q: FnOnce(String) -> E,
{
    debug!(%error, "stored row failed validation");
    query(error.to_string())
}
