//! Opaque cursor encoding.
//!
//! A cursor is the sort-key value tuple of one record, serialized as a JSON
//! array and encoded with URL-safe base64 (no padding). Encoding is a pure
//! function of the tuple, so the same record always yields the same cursor.
//!
//! Clients must treat cursors as opaque. Decoding checks the tuple shape
//! against the sort key it will be compared with: value count, value kinds,
//! and no nulls.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::CursorError;
use crate::sort::SortKey;

/// Opaque token marking the sort position of one record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
   /// Encode a sort-key value tuple.
   pub fn encode(values: &[JsonValue]) -> Self {
      let payload = JsonValue::Array(values.to_vec()).to_string();
      Self(URL_SAFE_NO_PAD.encode(payload))
   }

   /// Decode the value tuple without checking it against a sort key.
   ///
   /// Only non-empty arrays of strings, numbers and booleans are accepted.
   pub fn decode(&self) -> Result<Vec<JsonValue>, CursorError> {
      let bytes = URL_SAFE_NO_PAD
         .decode(self.0.as_bytes())
         .map_err(|e| CursorError::Malformed(format!("not base64url: {e}")))?;

      let payload: JsonValue = serde_json::from_slice(&bytes)
         .map_err(|e| CursorError::Malformed(format!("not a value tuple: {e}")))?;

      let values = match payload {
         JsonValue::Array(values) if !values.is_empty() => values,
         _ => {
            return Err(CursorError::Malformed(
               "expected a non-empty value tuple".to_string(),
            ));
         }
      };

      if let Some(pos) = values
         .iter()
         .position(|v| !(v.is_string() || v.is_number() || v.is_boolean()))
      {
         return Err(CursorError::Malformed(format!(
            "value {pos} is not a string, number or boolean"
         )));
      }

      Ok(values)
   }

   /// Decode the value tuple and check it matches `key` column by column.
   pub fn decode_for(&self, key: &SortKey) -> Result<Vec<JsonValue>, CursorError> {
      let values = self.decode()?;

      if values.len() != key.len() {
         return Err(CursorError::Malformed(format!(
            "cursor has {} values but sort key has {} columns",
            values.len(),
            key.len()
         )));
      }

      for (column, value) in key.columns().iter().zip(&values) {
         if !column.kind.admits(value) {
            return Err(CursorError::Malformed(format!(
               "value for '{}' is not {}",
               column.name, column.kind
            )));
         }
      }

      Ok(values)
   }

   pub fn as_str(&self) -> &str {
      &self.0
   }

   pub fn into_inner(self) -> String {
      self.0
   }
}

impl From<String> for Cursor {
   fn from(value: String) -> Self {
      Self(value)
   }
}

impl From<&str> for Cursor {
   fn from(value: &str) -> Self {
      Self(value.to_string())
   }
}

impl fmt::Display for Cursor {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str(&self.0)
   }
}
