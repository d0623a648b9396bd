use keyset_pagination::{ConfigError, PaginationError, SchemaError};
use serde::{Serialize, ser::Serializer};

/// Result type alias for group directory operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from listing and storing groups.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// Error from the SQLite store.
   #[error(transparent)]
   Store(#[from] sqlx_sqlite_keyset::Error),

   /// Pagination arguments were rejected or a page could not be built.
   #[error(transparent)]
   Pagination(#[from] PaginationError<sqlx_sqlite_keyset::Error>),

   /// State value outside `OPEN`, `CLOSED`, `ARCHIVED`.
   #[error("unknown group state: {0}")]
   UnknownState(String),

   /// Row is missing a column or holds a value of the wrong type.
   #[error("invalid group row: column '{column}' is missing or mistyped")]
   InvalidRow { column: &'static str },

   /// Group schema definition is invalid.
   #[error(transparent)]
   Schema(#[from] SchemaError),

   /// Page size configuration is invalid.
   #[error(transparent)]
   Config(#[from] ConfigError),

   /// Timestamp formatting failed.
   #[error(transparent)]
   Timestamp(#[from] time::error::Format),
}

impl Error {
   /// Extract a structured error code from the error type.
   pub fn error_code(&self) -> String {
      match self {
         Error::Store(e) => e.error_code(),
         Error::Pagination(PaginationError::Store(e)) => e.error_code(),
         Error::Pagination(e) => e.error_code(),
         Error::UnknownState(_) => "UNKNOWN_STATE".to_string(),
         Error::InvalidRow { .. } => "INVALID_ROW".to_string(),
         Error::Schema(_) => "INVALID_SCHEMA".to_string(),
         Error::Config(_) => "INVALID_CONFIG".to_string(),
         Error::Timestamp(_) => "TIMESTAMP_ERROR".to_string(),
      }
   }
}

/// Serializes as `{ "code": …, "message": … }` for transport to clients.
impl Serialize for Error {
   fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
   where
      S: Serializer,
   {
      use serde::ser::SerializeStruct;

      let mut state = serializer.serialize_struct("Error", 2)?;
      state.serialize_field("code", &self.error_code())?;
      state.serialize_field("message", &self.to_string())?;
      state.end()
   }
}
