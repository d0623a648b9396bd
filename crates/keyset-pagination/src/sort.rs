//! Sort directions, sortable fields and the resolved sort key.
//!
//! A [`SortKey`] is the ordered list of [`KeysetColumn`]s that defines a total
//! order over records. Its last column is always a field that is unique per
//! record, so two records never share a sort position and every cursor points
//! at exactly one place in the sequence.
//!
//! ```
//! use keyset_pagination::{SortDirection, SortField};
//!
//! let name = SortField::text("name");
//! let id = SortField::integer("id");
//!
//! let columns = vec![name.asc(), id.with_direction(SortDirection::Asc)];
//! assert_eq!(columns[1].name, "id");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Sort direction for a keyset column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
   /// Ascending order (smallest first)
   #[default]
   Asc,
   /// Descending order (largest first)
   Desc,
}

impl SortDirection {
   /// Return the opposite sort direction.
   pub fn reversed(self) -> Self {
      match self {
         SortDirection::Asc => SortDirection::Desc,
         SortDirection::Desc => SortDirection::Asc,
      }
   }
}

/// Type of value a sortable field holds.
///
/// Cursor values are checked against the kind of their column when decoded,
/// so a tampered cursor cannot smuggle a string into an integer comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
   Text,
   /// Signed or unsigned integer
   Integer,
   /// Any JSON number, integer or floating point
   Number,
   Boolean,
}

impl FieldKind {
   /// Whether `value` is a non-null value of this kind.
   pub fn admits(self, value: &JsonValue) -> bool {
      match self {
         FieldKind::Text => value.is_string(),
         // Signed 64-bit, like SQLite INTEGER
         FieldKind::Integer => value.is_i64(),
         FieldKind::Number => value.is_number(),
         FieldKind::Boolean => value.is_boolean(),
      }
   }
}

impl fmt::Display for FieldKind {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      let name = match self {
         FieldKind::Text => "text",
         FieldKind::Integer => "integer",
         FieldKind::Number => "number",
         FieldKind::Boolean => "boolean",
      };
      f.write_str(name)
   }
}

/// A field that records may be ordered by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
   /// Field name as it appears on the record (and in the store)
   pub name: String,
   pub kind: FieldKind,
}

impl SortField {
   pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
      Self {
         name: name.into(),
         kind,
      }
   }

   pub fn text(name: impl Into<String>) -> Self {
      Self::new(name, FieldKind::Text)
   }

   pub fn integer(name: impl Into<String>) -> Self {
      Self::new(name, FieldKind::Integer)
   }

   pub fn number(name: impl Into<String>) -> Self {
      Self::new(name, FieldKind::Number)
   }

   pub fn boolean(name: impl Into<String>) -> Self {
      Self::new(name, FieldKind::Boolean)
   }

   /// Create a keyset column ordering by this field.
   pub fn with_direction(&self, direction: SortDirection) -> KeysetColumn {
      KeysetColumn {
         name: self.name.clone(),
         kind: self.kind,
         direction,
      }
   }

   /// Create a keyset column with ascending sort direction.
   pub fn asc(&self) -> KeysetColumn {
      self.with_direction(SortDirection::Asc)
   }

   /// Create a keyset column with descending sort direction.
   pub fn desc(&self) -> KeysetColumn {
      self.with_direction(SortDirection::Desc)
   }
}

/// A column in the keyset used for cursor-based pagination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeysetColumn {
   /// Field name as it appears in the query result set
   pub name: String,
   pub kind: FieldKind,
   /// Sort direction for this column
   pub direction: SortDirection,
}

impl KeysetColumn {
   /// Same column, opposite direction.
   pub fn reversed(&self) -> Self {
      Self {
         name: self.name.clone(),
         kind: self.kind,
         direction: self.direction.reversed(),
      }
   }
}

/// The resolved, total ordering of a connection.
///
/// Always non-empty; the last column is the unique tie-breaker. Built by
/// [`crate::KeysetSchema::sort_key`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SortKey {
   columns: Vec<KeysetColumn>,
}

impl SortKey {
   /// Order by `field`, breaking ties on `tie_breaker` in the same direction.
   ///
   /// When `field` is the tie-breaker itself the key has a single column.
   pub(crate) fn new(field: &SortField, tie_breaker: &SortField, direction: SortDirection) -> Self {
      let mut columns = vec![field.with_direction(direction)];
      if field.name != tie_breaker.name {
         columns.push(tie_breaker.with_direction(direction));
      }
      Self { columns }
   }

   pub fn columns(&self) -> &[KeysetColumn] {
      &self.columns
   }

   pub fn len(&self) -> usize {
      self.columns.len()
   }

   pub fn is_empty(&self) -> bool {
      self.columns.is_empty()
   }

   /// Direction of the leading (caller-chosen) column.
   pub fn direction(&self) -> SortDirection {
      self
         .columns
         .first()
         .map(|c| c.direction)
         .unwrap_or_default()
   }

   /// Create a sort key with all sort directions reversed.
   pub fn reversed(&self) -> Self {
      Self {
         columns: self.columns.iter().map(KeysetColumn::reversed).collect(),
      }
   }
}

#[cfg(test)]
mod tests {
   use super::*;
   use serde_json::json;

   // ─── SortDirection ───

   #[test]
   fn sort_direction_reversed() {
      assert_eq!(SortDirection::Asc.reversed(), SortDirection::Desc);
      assert_eq!(SortDirection::Desc.reversed(), SortDirection::Asc);
   }

   #[test]
   fn sort_direction_serde_is_camel_case() {
      assert_eq!(
         serde_json::to_string(&SortDirection::Desc).unwrap(),
         "\"desc\""
      );
      let asc: SortDirection = serde_json::from_str("\"asc\"").unwrap();
      assert_eq!(asc, SortDirection::Asc);
   }

   // ─── FieldKind ───

   #[test]
   fn field_kind_admits_matching_values_only() {
      assert!(FieldKind::Text.admits(&json!("x")));
      assert!(!FieldKind::Text.admits(&json!(1)));

      assert!(FieldKind::Integer.admits(&json!(-4)));
      assert!(FieldKind::Integer.admits(&json!(i64::MAX)));
      assert!(!FieldKind::Integer.admits(&json!(i64::MAX as u64 + 1)));
      assert!(!FieldKind::Integer.admits(&json!(u64::MAX)));
      assert!(!FieldKind::Integer.admits(&json!(1.5)));

      assert!(FieldKind::Number.admits(&json!(1.5)));
      assert!(FieldKind::Number.admits(&json!(7)));

      assert!(FieldKind::Boolean.admits(&json!(true)));
      assert!(!FieldKind::Boolean.admits(&json!(0)));
   }

   #[test]
   fn field_kind_rejects_null() {
      for kind in [
         FieldKind::Text,
         FieldKind::Integer,
         FieldKind::Number,
         FieldKind::Boolean,
      ] {
         assert!(!kind.admits(&JsonValue::Null), "{kind} admitted null");
      }
   }

   // ─── SortKey ───

   #[test]
   fn sort_key_appends_tie_breaker_in_same_direction() {
      let key = SortKey::new(
         &SortField::text("name"),
         &SortField::integer("id"),
         SortDirection::Desc,
      );

      assert_eq!(
         key.columns(),
         &[
            SortField::text("name").desc(),
            SortField::integer("id").desc()
         ]
      );
      assert_eq!(key.direction(), SortDirection::Desc);
   }

   #[test]
   fn sort_key_on_tie_breaker_has_single_column() {
      let id = SortField::integer("id");
      let key = SortKey::new(&id, &id, SortDirection::Asc);

      assert_eq!(key.len(), 1);
      assert_eq!(key.columns()[0].name, "id");
   }

   #[test]
   fn sort_key_reversed_flips_every_column() {
      let key = SortKey::new(
         &SortField::text("name"),
         &SortField::integer("id"),
         SortDirection::Asc,
      );
      let reversed = key.reversed();

      assert!(
         reversed
            .columns()
            .iter()
            .all(|c| c.direction == SortDirection::Desc)
      );
      assert_eq!(reversed.reversed(), key);
   }
}
