//! Raw pagination arguments and their validated, canonical form.
//!
//! [`PaginationRequest`] is what a transport layer hands over: every field
//! optional, nothing trusted. [`resolve`] turns it into a [`CanonicalRequest`],
//! which is either a forward (`first`/`after`) or a backward (`last`/`before`)
//! request with a bounded limit, a decoded cursor position and the resolved
//! sort key. Invalid combinations never make it past `resolve`.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::config::PaginationConfig;
use crate::cursor::Cursor;
use crate::error::ValidationError;
use crate::query::FieldFilter;
use crate::schema::KeysetSchema;
use crate::sort::{SortDirection, SortKey};

/// Untrusted pagination arguments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationRequest {
   /// Number of records after `after` (forward pagination)
   pub first: Option<i64>,
   /// Number of records before `before` (backward pagination)
   pub last: Option<i64>,
   pub before: Option<String>,
   pub after: Option<String>,
   /// Overrides the schema's default sort field
   pub sort_field: Option<String>,
   /// Overrides the schema's default direction
   pub direction: Option<SortDirection>,
   /// Value for the schema's filter field (e.g. a state)
   pub filter: Option<JsonValue>,
}

impl PaginationRequest {
   /// Request the first `first` records.
   pub fn forward(first: i64) -> Self {
      Self {
         first: Some(first),
         ..Default::default()
      }
   }

   /// Request the last `last` records.
   pub fn backward(last: i64) -> Self {
      Self {
         last: Some(last),
         ..Default::default()
      }
   }

   /// Continue after `cursor`.
   pub fn after(mut self, cursor: impl Into<String>) -> Self {
      self.after = Some(cursor.into());
      self
   }

   /// Continue before `cursor`.
   pub fn before(mut self, cursor: impl Into<String>) -> Self {
      self.before = Some(cursor.into());
      self
   }

   pub fn sorted_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
      self.sort_field = Some(field.into());
      self.direction = Some(direction);
      self
   }

   pub fn with_filter(mut self, value: impl Into<JsonValue>) -> Self {
      self.filter = Some(value.into());
      self
   }
}

/// Which end of the sequence a request pages from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PageDirection {
   /// `first` / `after`
   Forward,
   /// `last` / `before`
   Backward,
}

/// Forward half of a [`CanonicalRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardRequest {
   limit: usize,
   after: Option<Vec<JsonValue>>,
   sort_key: SortKey,
   filter: Option<FieldFilter>,
}

impl ForwardRequest {
   pub fn limit(&self) -> usize {
      self.limit
   }

   /// Decoded sort position of the `after` cursor.
   pub fn after(&self) -> Option<&[JsonValue]> {
      self.after.as_deref()
   }
}

/// Backward half of a [`CanonicalRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct BackwardRequest {
   limit: usize,
   before: Option<Vec<JsonValue>>,
   sort_key: SortKey,
   filter: Option<FieldFilter>,
}

impl BackwardRequest {
   pub fn limit(&self) -> usize {
      self.limit
   }

   /// Decoded sort position of the `before` cursor.
   pub fn before(&self) -> Option<&[JsonValue]> {
      self.before.as_deref()
   }
}

/// A validated pagination request. Only [`resolve`] creates these.
#[derive(Debug, Clone, PartialEq)]
pub enum CanonicalRequest {
   Forward(ForwardRequest),
   Backward(BackwardRequest),
}

impl CanonicalRequest {
   pub fn direction(&self) -> PageDirection {
      match self {
         CanonicalRequest::Forward(_) => PageDirection::Forward,
         CanonicalRequest::Backward(_) => PageDirection::Backward,
      }
   }

   /// Number of records the page may hold.
   pub fn limit(&self) -> usize {
      match self {
         CanonicalRequest::Forward(r) => r.limit,
         CanonicalRequest::Backward(r) => r.limit,
      }
   }

   /// The resolved sort key, in logical (presentation) order.
   pub fn sort_key(&self) -> &SortKey {
      match self {
         CanonicalRequest::Forward(r) => &r.sort_key,
         CanonicalRequest::Backward(r) => &r.sort_key,
      }
   }

   pub fn filter(&self) -> Option<&FieldFilter> {
      match self {
         CanonicalRequest::Forward(r) => r.filter.as_ref(),
         CanonicalRequest::Backward(r) => r.filter.as_ref(),
      }
   }

   /// Decoded position of whichever cursor bounds this request.
   pub fn position(&self) -> Option<&[JsonValue]> {
      match self {
         CanonicalRequest::Forward(r) => r.after(),
         CanonicalRequest::Backward(r) => r.before(),
      }
   }
}

/// Validate raw arguments against an entity schema and page size policy.
///
/// Checks run in a fixed order so the reported error is stable: conflicting
/// limits, conflicting cursors, cursor/limit direction mismatch, limit range,
/// sort field, cursor contents, filter value.
pub fn resolve(
   raw: &PaginationRequest,
   schema: &KeysetSchema,
   config: &PaginationConfig,
) -> Result<CanonicalRequest, ValidationError> {
   if raw.first.is_some() && raw.last.is_some() {
      return Err(ValidationError::ConflictingBounds);
   }
   if raw.after.is_some() && raw.before.is_some() {
      return Err(ValidationError::ConflictingCursors);
   }
   if raw.first.is_some() && raw.before.is_some() {
      return Err(ValidationError::MismatchedCursor {
         limit: "first",
         cursor: "before",
      });
   }
   if raw.last.is_some() && raw.after.is_some() {
      return Err(ValidationError::MismatchedCursor {
         limit: "last",
         cursor: "after",
      });
   }

   let backward = raw.last.is_some() || raw.before.is_some();
   let limit = match raw.first.or(raw.last) {
      Some(requested) => check_limit(requested, config)?,
      None => config.default_page_size,
   };

   let sort_key = resolve_sort_key(raw, schema)?;

   let cursor = if backward { &raw.before } else { &raw.after };
   let position = cursor
      .as_deref()
      .map(|c| Cursor::from(c).decode_for(&sort_key))
      .transpose()?;

   let filter = resolve_filter(raw, schema)?;

   Ok(if backward {
      CanonicalRequest::Backward(BackwardRequest {
         limit,
         before: position,
         sort_key,
         filter,
      })
   } else {
      CanonicalRequest::Forward(ForwardRequest {
         limit,
         after: position,
         sort_key,
         filter,
      })
   })
}

fn check_limit(requested: i64, config: &PaginationConfig) -> Result<usize, ValidationError> {
   let limit = u64::try_from(requested)
      .ok()
      .filter(|n| *n > 0)
      .ok_or(ValidationError::InvalidLimit(requested))?;

   if limit > config.max_page_size as u64 {
      return Err(ValidationError::LimitTooLarge {
         requested,
         max: config.max_page_size,
      });
   }

   // Bounded by max_page_size, so this fits.
   Ok(limit as usize)
}

fn resolve_sort_key(
   raw: &PaginationRequest,
   schema: &KeysetSchema,
) -> Result<SortKey, ValidationError> {
   let field = match &raw.sort_field {
      Some(name) => schema
         .field(name)
         .ok_or_else(|| ValidationError::UnknownSortField(name.clone()))?,
      None => schema.default_field(),
   };
   let direction = raw.direction.unwrap_or(schema.default_direction());

   Ok(schema.sort_key(field, direction))
}

fn resolve_filter(
   raw: &PaginationRequest,
   schema: &KeysetSchema,
) -> Result<Option<FieldFilter>, ValidationError> {
   let Some(field) = schema.filter() else {
      return match raw.filter {
         Some(_) => Err(ValidationError::FilterNotSupported),
         None => Ok(None),
      };
   };

   let value = raw.filter.clone().unwrap_or_else(|| field.default.clone());
   if !(value.is_string() || value.is_number() || value.is_boolean()) {
      return Err(ValidationError::InvalidFilterValue {
         field: field.name.clone(),
         value,
      });
   }

   Ok(Some(FieldFilter {
      field: field.name.clone(),
      value,
   }))
}
