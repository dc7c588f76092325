//! Shared error classification for the Diesel repositories.
//!
//! Each repository owns a port-specific error enum, so the helpers here stop
//! at a neutral [`DieselFailure`] that the adapters translate themselves.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Coarse category of a failed Diesel operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// The connection dropped or could not be used.
    Connection(String),
    /// A unique constraint rejected the write.
    UniqueViolation { constraint: Option<String> },
    /// Anything else, already reduced to a safe message.
    Query(String),
}

/// Extract the message from a pool error.
pub(crate) fn pool_error_message(error: PoolError) -> String {
    error.into_message()
}

/// Classify a Diesel error and emit debug context for `operation`.
pub(crate) fn classify_diesel_error(error: DieselError, operation: &str) -> DieselFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), operation, "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            operation,
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => DieselFailure::Query("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => {
            DieselFailure::Query("database query error".to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DieselFailure::UniqueViolation {
                constraint: info.constraint_name().map(str::to_owned),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DieselFailure::Connection("database connection error".to_owned())
        }
        _ => DieselFailure::Query("database error".to_owned()),
    }
}

/// Convert a stored `INT4` minute count back to the domain range.
pub(crate) fn minutes_from_db(minutes: i32) -> Result<u32, String> {
    u32::try_from(minutes).map_err(|_| format!("negative time_minutes in database: {minutes}"))
}

/// Convert domain minutes to `INT4`. The domain caps minutes at `i32::MAX`.
pub(crate) fn minutes_for_db(minutes: u32) -> Result<i32, String> {
    i32::try_from(minutes).map_err(|_| format!("time_minutes out of range: {minutes}"))
}

/// Convert a join-table position to `INT4`.
pub(crate) fn position_for_db(index: usize) -> Result<i32, String> {
    i32::try_from(index).map_err(|_| format!("too many associations: {index}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn unique_violation_is_classified() {
        let err = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key".to_owned()),
        );

        assert_eq!(
            classify_diesel_error(err, "insert"),
            DieselFailure::UniqueViolation { constraint: None }
        );
    }

    #[rstest]
    fn closed_connection_is_a_connection_failure() {
        let err = DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new("gone".to_owned()),
        );

        assert!(matches!(
            classify_diesel_error(err, "select"),
            DieselFailure::Connection(_)
        ));
    }

    #[rstest]
    fn not_found_is_a_query_failure() {
        assert_eq!(
            classify_diesel_error(DieselError::NotFound, "select"),
            DieselFailure::Query("record not found".to_owned())
        );
    }

    #[rstest]
    #[case(-1, false)]
    #[case(0, true)]
    #[case(i32::MAX, true)]
    fn minutes_round_trip_within_range(#[case] stored: i32, #[case] ok: bool) {
        let converted = minutes_from_db(stored);
        assert_eq!(converted.is_ok(), ok);
        if let Ok(minutes) = converted {
            assert_eq!(minutes_for_db(minutes), Ok(stored));
        }
    }
}
