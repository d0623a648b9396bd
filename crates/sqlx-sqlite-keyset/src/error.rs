/// Result type alias for SQLite store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from the SQLite store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// Error from SQLx operations.
   #[error(transparent)]
   Sqlx(#[from] sqlx::Error),

   /// I/O error when accessing database files.
   #[error("io error: {0}")]
   Io(#[from] std::io::Error),

   /// Database has been closed and cannot be used.
   #[error("database has been closed")]
   DatabaseClosed,

   /// SQLite type that cannot be mapped to JSON.
   #[error("unsupported datatype: {0}")]
   UnsupportedDatatype(String),

   /// Base query must not contain top-level ORDER BY or LIMIT clauses.
   #[error(
      "pagination base query must not contain top-level ORDER BY or LIMIT clauses (these are added automatically; subquery usage is fine)"
   )]
   InvalidPaginationQuery,

   /// Sort or filter column name contains invalid characters.
   ///
   /// Column names must match `[a-zA-Z_][a-zA-Z0-9_]*` (letters, digits and
   /// underscores naming a result column of the base query).
   #[error("invalid column name '{name}': must match [a-zA-Z_][a-zA-Z0-9_]*")]
   InvalidColumnName { name: String },
}

impl Error {
   /// Extract a structured error code from the error type.
   pub fn error_code(&self) -> String {
      match self {
         Error::Sqlx(e) => {
            if let Some(code) = e.as_database_error().and_then(|db_err| db_err.code()) {
               return format!("SQLITE_{}", code);
            }
            "SQLX_ERROR".to_string()
         }
         Error::Io(_) => "IO_ERROR".to_string(),
         Error::DatabaseClosed => "DATABASE_CLOSED".to_string(),
         Error::UnsupportedDatatype(_) => "UNSUPPORTED_DATATYPE".to_string(),
         Error::InvalidPaginationQuery => "INVALID_PAGINATION_QUERY".to_string(),
         Error::InvalidColumnName { .. } => "INVALID_COLUMN_NAME".to_string(),
      }
   }
}
