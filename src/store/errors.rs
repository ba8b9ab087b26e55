use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    Connection(sqlx::Error),
    Database(sqlx::Error),
    OutOfRange { column: &'static str, value: u64 },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Connection(err) => write!(f, "Connection error: {err}"),
            StoreError::Database(err) => write!(f, "Database error: {err}"),
            StoreError::OutOfRange { column, value } => {
                write!(f, "Value {value} does not fit column {column}")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Connection(e) | StoreError::Database(e) => Some(e),
            StoreError::OutOfRange { .. } => None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err)
    }
}
