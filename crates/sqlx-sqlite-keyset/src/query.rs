use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::Sqlite;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;

/// Base query for a paginated fetch: a `SELECT` without top-level
/// `ORDER BY` or `LIMIT`, plus its bind values.
///
/// Pagination wraps it as a derived table, so filters, the keyset predicate
/// and the ordering refer to its result columns. Placeholders are numbered
/// `$1`, `$2`, … in `sql`; pagination placeholders are numbered after them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlQuery {
   pub sql: String,
   #[serde(default)]
   pub values: Vec<JsonValue>,
}

impl SqlQuery {
   pub fn new(sql: impl Into<String>) -> Self {
      Self {
         sql: sql.into(),
         values: Vec::new(),
      }
   }

   /// Append a bind value for the next placeholder.
   pub fn bind(mut self, value: impl Into<JsonValue>) -> Self {
      self.values.push(value.into());
      self
   }
}

impl From<&str> for SqlQuery {
   fn from(sql: &str) -> Self {
      Self::new(sql)
   }
}

/// Bind a JSON value to a SQLx query.
pub(crate) fn bind_value<'a>(
   query: Query<'a, Sqlite, SqliteArguments<'a>>,
   value: JsonValue,
) -> Query<'a, Sqlite, SqliteArguments<'a>> {
   match value {
      JsonValue::Null => query.bind(None::<JsonValue>),
      JsonValue::String(s) => query.bind(s),
      JsonValue::Bool(b) => query.bind(b),
      JsonValue::Number(number) => {
         // Preserve integer precision by binding as i64 when possible
         if let Some(int_val) = number.as_i64() {
            query.bind(int_val)
         } else if let Some(uint_val) = number.as_u64() {
            // Larger than i64::MAX; SQLite has no unsigned INTEGER
            query.bind(uint_val as f64)
         } else {
            query.bind(number.as_f64().unwrap_or_default())
         }
      }
      other => query.bind(other),
   }
}

#[cfg(test)]
mod tests {
   use super::*;
   use serde_json::json;

   #[test]
   fn bind_appends_values_in_order() {
      let query = SqlQuery::new("SELECT * FROM groups WHERE owner = $1 AND kind = $2")
         .bind("ada")
         .bind(3);

      assert_eq!(query.values, vec![json!("ada"), json!(3)]);
   }

   #[test]
   fn deserializes_without_values() {
      let query: SqlQuery = serde_json::from_value(json!({ "sql": "SELECT 1" })).unwrap();

      assert_eq!(query, SqlQuery::from("SELECT 1"));
   }
}
