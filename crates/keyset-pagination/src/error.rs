//! Error types for keyset pagination.
//!
//! Errors are split by who caused them:
//!
//! - [`CursorError`] - a cursor string that does not decode to a sort position
//! - [`ValidationError`] - caller-supplied pagination arguments that are rejected
//! - [`RecordError`] - a fetched record that lacks a usable sort value
//! - [`PaginationError`] - everything a [`crate::Paginator`] call can return,
//!   including the store's own error type
//! - [`SchemaError`] / [`ConfigError`] - problems building a schema or config

use crate::sort::FieldKind;

/// Failure to decode an opaque cursor string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
   /// The cursor could not be parsed into the expected value tuple.
   #[error("malformed cursor: {0}")]
   Malformed(String),
}

/// Caller input that cannot be turned into a canonical request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
   /// Both `first` and `last` were supplied.
   #[error("cannot provide both 'first' and 'last'")]
   ConflictingBounds,

   /// Both `after` and `before` were supplied.
   #[error("cannot provide both 'after' and 'before' cursors")]
   ConflictingCursors,

   /// A cursor was paired with the limit of the opposite direction.
   #[error("'{cursor}' cannot be combined with '{limit}'")]
   MismatchedCursor {
      limit: &'static str,
      cursor: &'static str,
   },

   /// Limit is zero or negative.
   #[error("page size must be greater than zero, got {0}")]
   InvalidLimit(i64),

   /// Limit exceeds the configured maximum.
   #[error("page size {requested} exceeds the maximum of {max}")]
   LimitTooLarge { requested: i64, max: usize },

   /// Sort field is not in the entity's allow-list.
   #[error("unknown sort field '{0}'")]
   UnknownSortField(String),

   /// Cursor failed to decode against the resolved sort key.
   #[error("invalid cursor: {0}")]
   InvalidCursor(#[from] CursorError),

   /// A filter value was supplied for an entity without a filter field.
   #[error("this connection does not accept a filter value")]
   FilterNotSupported,

   /// Filter value is not a string, number or boolean.
   #[error("invalid filter value for '{field}': {value}")]
   InvalidFilterValue {
      field: String,
      value: serde_json::Value,
   },
}

impl ValidationError {
   /// Extract a structured error code from the error type.
   pub fn error_code(&self) -> String {
      match self {
         ValidationError::ConflictingBounds => "CONFLICTING_BOUNDS".to_string(),
         ValidationError::ConflictingCursors => "CONFLICTING_CURSORS".to_string(),
         ValidationError::MismatchedCursor { .. } => "MISMATCHED_CURSOR".to_string(),
         ValidationError::InvalidLimit(_) => "INVALID_LIMIT".to_string(),
         ValidationError::LimitTooLarge { .. } => "LIMIT_TOO_LARGE".to_string(),
         ValidationError::UnknownSortField(_) => "UNKNOWN_SORT_FIELD".to_string(),
         ValidationError::InvalidCursor(_) => "INVALID_CURSOR".to_string(),
         ValidationError::FilterNotSupported => "FILTER_NOT_SUPPORTED".to_string(),
         ValidationError::InvalidFilterValue { .. } => "INVALID_FILTER_VALUE".to_string(),
      }
   }
}

/// A fetched record cannot produce its cursor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
   /// Sort field not present on the record.
   #[error("sort field '{field}' not found in record")]
   MissingSortField { field: String },

   /// Sort value is null or of the wrong type.
   #[error("sort field '{field}' does not hold a {kind} value")]
   InvalidSortValue { field: String, kind: FieldKind },
}

/// Errors returned by [`crate::Paginator::paginate`].
#[derive(Debug, thiserror::Error)]
pub enum PaginationError<E>
where
   E: std::error::Error + 'static,
{
   /// Rejected before the store was queried.
   #[error(transparent)]
   Validation(#[from] ValidationError),

   /// A fetched record could not be turned into an edge.
   #[error(transparent)]
   Record(#[from] RecordError),

   /// The store failed to execute the query.
   #[error("store query failed: {0}")]
   Store(#[source] E),
}

impl<E> PaginationError<E>
where
   E: std::error::Error + 'static,
{
   /// Extract a structured error code from the error type.
   pub fn error_code(&self) -> String {
      match self {
         PaginationError::Validation(e) => e.error_code(),
         PaginationError::Record(RecordError::MissingSortField { .. }) => {
            "MISSING_SORT_FIELD".to_string()
         }
         PaginationError::Record(RecordError::InvalidSortValue { .. }) => {
            "INVALID_SORT_VALUE".to_string()
         }
         PaginationError::Store(_) => "STORE_ERROR".to_string(),
      }
   }

   /// Whether the caller's arguments were at fault.
   pub fn is_validation(&self) -> bool {
      matches!(self, PaginationError::Validation(_))
   }
}

/// Invalid [`crate::KeysetSchema`] definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
   /// Field or filter name is empty.
   #[error("field names must not be empty")]
   EmptyFieldName,

   /// The same field was registered twice.
   #[error("sort field '{0}' is registered more than once")]
   DuplicateField(String),

   /// Default sort field is not in the allow-list.
   #[error("default sort field '{0}' is not sortable")]
   UnknownDefaultSort(String),
}

/// Invalid [`crate::PaginationConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
   /// Default or maximum page size is zero.
   #[error("page sizes must be greater than zero")]
   ZeroPageSize,

   /// Default page size is above the maximum.
   #[error("default page size {default} exceeds the maximum of {max}")]
   DefaultExceedsMax { default: usize, max: usize },
}
