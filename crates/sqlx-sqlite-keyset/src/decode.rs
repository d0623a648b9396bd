//! SQLite value to JSON decoding.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use sqlx::sqlite::{SqliteRow, SqliteValueRef};
use sqlx::{Column, Row, TypeInfo, Value, ValueRef};

use crate::error::{Error, Result};

/// Convert one SQLite value to JSON by its storage class.
///
/// BLOBs become standard base64 strings; REALs that JSON cannot represent
/// (NaN, infinities) become `null`.
pub(crate) fn to_json(value: SqliteValueRef<'_>) -> Result<JsonValue> {
   if value.is_null() {
      return Ok(JsonValue::Null);
   }

   let value = ValueRef::to_owned(&value);
   let type_name = value.type_info().name().to_string();

   let json = match type_name.as_str() {
      "TEXT" => JsonValue::String(value.try_decode::<String>()?),
      "INTEGER" | "BOOLEAN" => JsonValue::from(value.try_decode::<i64>()?),
      "REAL" => serde_json::Number::from_f64(value.try_decode::<f64>()?)
         .map(JsonValue::Number)
         .unwrap_or(JsonValue::Null),
      "BLOB" => JsonValue::String(STANDARD.encode(value.try_decode::<Vec<u8>>()?)),
      _ => return Err(Error::UnsupportedDatatype(type_name)),
   };

   Ok(json)
}

/// Decode a row into column-name → JSON pairs, preserving column order.
pub(crate) fn decode_row(row: &SqliteRow) -> Result<IndexMap<String, JsonValue>> {
   let mut value = IndexMap::with_capacity(row.len());
   for (i, column) in row.columns().iter().enumerate() {
      let v = to_json(row.try_get_raw(i)?)?;
      value.insert(column.name().to_string(), v);
   }
   Ok(value)
}

pub(crate) fn decode_rows(rows: Vec<SqliteRow>) -> Result<Vec<IndexMap<String, JsonValue>>> {
   rows.iter().map(decode_row).collect()
}
