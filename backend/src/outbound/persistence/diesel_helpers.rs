//! Error classification and query helpers shared by the Diesel repositories.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

/// Constraint guarding the course title and price pair.
pub(crate) const COURSE_TITLE_PRICE_KEY: &str = "courses_title_price_key";

/// Database failure reduced to what the repositories branch on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// A unique constraint rejected the write.
    Unique { constraint: Option<String> },
    /// A foreign key constraint rejected the write or delete.
    ForeignKey,
    /// The connection dropped mid-query.
    Connection(String),
    /// Anything else.
    Query(String),
}

/// Classify a Diesel error and emit debug context.
pub(crate) fn classify_diesel_error(error: DieselError, operation: &str) -> DieselFailure {
    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), %operation, "diesel operation failed");
            let constraint = info.constraint_name().map(str::to_owned);
            match kind {
                DatabaseErrorKind::UniqueViolation => DieselFailure::Unique { constraint },
                DatabaseErrorKind::ForeignKeyViolation => DieselFailure::ForeignKey,
                DatabaseErrorKind::ClosedConnection => {
                    DieselFailure::Connection("database connection error".to_owned())
                }
                _ => DieselFailure::Query("database error".to_owned()),
            }
        }
        other => {
            let message = other.to_string();
            debug!(%message, %operation, "diesel operation failed");
            DieselFailure::Query(message)
        }
    }
}

/// Escape `LIKE` wildcards so user input matches literally.
pub(crate) fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// `%needle%` pattern for substring matching.
pub(crate) fn contains_pattern(needle: &str) -> String {
    format!("%{}%", escape_like(needle))
}
