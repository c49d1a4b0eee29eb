//! Conversions from rusqlite errors into domain errors.

use idletally_domain::IdleTallyError;
use rusqlite::ffi::ErrorCode;
use rusqlite::Error as SqlError;

/// SQLite extended code for a failed foreign key check
const SQLITE_CONSTRAINT_FOREIGNKEY: i32 = 787;

/// Infrastructure-side wrapper, convertible back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub IdleTallyError);

impl From<InfraError> for IdleTallyError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<IdleTallyError> for InfraError {
    fn from(value: IdleTallyError) -> Self {
        Self(value)
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        Self(classify(value))
    }
}

fn classify(err: SqlError) -> IdleTallyError {
    match err {
        SqlError::SqliteFailure(failure, message) => {
            let detail = match (failure.code, failure.extended_code) {
                (ErrorCode::DatabaseBusy, _) => "database is busy".to_string(),
                (ErrorCode::DatabaseLocked, _) => "database is locked".to_string(),
                (ErrorCode::ConstraintViolation, SQLITE_CONSTRAINT_FOREIGNKEY) => {
                    "time segment refers to a missing activity".to_string()
                }
                (ErrorCode::ReadOnly, _) => "database is read-only".to_string(),
                (code, extended) => format!(
                    "sqlite failure {code:?} (code {extended}): {}",
                    message.unwrap_or_default()
                ),
            };
            IdleTallyError::Persistence(detail)
        }
        SqlError::QueryReturnedNoRows => IdleTallyError::NotFound("no matching row".into()),
        SqlError::FromSqlConversionFailure(column, _, cause) => {
            IdleTallyError::Persistence(format!("unreadable value in column {column}: {cause}"))
        }
        SqlError::InvalidPath(path) => IdleTallyError::Persistence(format!(
            "invalid database path: {}",
            path.to_string_lossy()
        )),
        other => IdleTallyError::Persistence(other.to_string()),
    }
}

/// Map a rusqlite error straight to the domain error
pub fn map_sql_error(err: SqlError) -> IdleTallyError {
    InfraError::from(err).into()
}
