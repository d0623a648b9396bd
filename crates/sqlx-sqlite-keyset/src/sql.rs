//! Rendering a [`StoreQuery`] over a [`SqlQuery`] into SQLite SQL.
//!
//! The base query is wrapped as a derived table, never rewritten:
//!
//! ```text
//! SELECT * FROM (SELECT * FROM groups
//! ) AS "keyset_page"
//!    WHERE "state" = $1                         -- filter
//!    AND (("name", "id") > ($2, $3))            -- keyset predicate
//!    ORDER BY "name" ASC, "id" ASC LIMIT 21     -- store order, page size + 1
//! ```
//!
//! Filters and the keyset predicate therefore apply to the whole base result,
//! whatever `WHERE`, `GROUP BY` or compound operators it uses, and sort and
//! filter fields name columns of that result. Placeholders continue after the
//! base query's own (`$1` above becomes `$2` when the base query binds one
//! value).

use keyset_pagination::{KeysetColumn, KeysetPredicate, SortDirection, StoreQuery};
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::query::SqlQuery;

/// Alias of the derived table wrapping the base query.
const PAGE_ALIAS: &str = "keyset_page";

/// Validate that a column name is safe for SQL interpolation.
///
/// Accepts `[a-zA-Z_][a-zA-Z0-9_]*`. Names refer to result columns of the
/// base query, so they are never qualified.
pub(crate) fn validate_column_name(name: &str) -> Result<()> {
   let mut chars = name.chars();
   let valid = chars
      .next()
      .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
      && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

   if !valid {
      return Err(Error::InvalidColumnName {
         name: name.to_string(),
      });
   }
   Ok(())
}

pub(crate) fn quote_identifier(name: &str) -> String {
   format!("\"{}\"", name.replace('"', "\"\""))
}

/// Whether `keyword` starts at `i` with no identifier character on either side.
fn keyword_at(bytes: &[u8], i: usize, keyword: &[u8]) -> bool {
   let end = i + keyword.len();
   let is_ident = |b: &u8| b.is_ascii_alphanumeric() || *b == b'_';

   bytes.get(i..end) == Some(keyword)
      && (i == 0 || !is_ident(&bytes[i - 1]))
      && !bytes.get(end).is_some_and(is_ident)
}

/// `ORDER` and `BY` separated by any run of whitespace.
fn order_by_at(bytes: &[u8], i: usize) -> bool {
   if bytes.get(i..i + 5) != Some(b"ORDER".as_slice()) {
      return false;
   }
   let gap = bytes[i + 5..]
      .iter()
      .take_while(|b| b.is_ascii_whitespace())
      .count();
   gap > 0 && keyword_at(bytes, i + 5 + gap, b"BY") && keyword_at(bytes, i, b"ORDER")
}

/// Index of the quote closing the literal opened at `open`, honouring
/// doubled-quote escapes; `bytes.len()` if unterminated.
fn closing_quote(bytes: &[u8], open: usize, quote: u8) -> usize {
   let mut j = open + 1;
   while j < bytes.len() {
      if bytes[j] == quote {
         if bytes.get(j + 1) == Some(&quote) {
            j += 2;
            continue;
         }
         return j;
      }
      j += 1;
   }
   bytes.len()
}

/// Offsets of `bytes` at parenthesis depth 0, outside literals, quoted
/// identifiers and comments.
fn top_level_offsets(bytes: &[u8]) -> Vec<usize> {
   let len = bytes.len();
   let mut offsets = Vec::new();
   let mut depth: i32 = 0;
   let mut i = 0;

   while i < len {
      match bytes[i] {
         b'(' => depth += 1,
         b')' => depth -= 1,
         quote @ (b'\'' | b'"') => i = closing_quote(bytes, i, quote),
         b'-' if bytes.get(i + 1) == Some(&b'-') => {
            i = bytes[i..]
               .iter()
               .position(|b| *b == b'\n')
               .map_or(len, |n| i + n);
         }
         b'/' if bytes.get(i + 1) == Some(&b'*') => {
            i = bytes[i + 2..]
               .windows(2)
               .position(|w| w == b"*/")
               .map_or(len, |n| i + 2 + n + 1);
         }
         _ if depth == 0 => offsets.push(i),
         _ => {}
      }
      i += 1;
   }

   offsets
}

fn find_top_level(query: &str, matches: impl Fn(&[u8], usize) -> bool) -> bool {
   let upper = query.to_ascii_uppercase();
   let bytes = upper.as_bytes();
   top_level_offsets(bytes)
      .into_iter()
      .any(|i| matches(bytes, i))
}

/// Reject base queries with a top-level `ORDER BY` or `LIMIT`; pagination
/// appends its own. Subqueries, comments and literals may contain either.
pub(crate) fn validate_base_query(query: &str) -> Result<()> {
   if find_top_level(query, |b, i| order_by_at(b, i) || keyword_at(b, i, b"LIMIT")) {
      return Err(Error::InvalidPaginationQuery);
   }
   Ok(())
}

/// Render a keyset predicate, pushing its bind values onto `values`.
///
/// Uniform directions render as a row-value comparison,
/// `("a", "b") > ($3, $4)`; mixed directions as the expanded
/// `("a" > $3) OR ("a" = $4 AND "b" < $5)`.
fn seek_condition(seek: &KeysetPredicate, values: &mut Vec<JsonValue>) -> String {
   let mut placeholder = |value: &JsonValue| {
      values.push(value.clone());
      format!("${}", values.len())
   };

   if let Some(comparison) = seek.uniform_comparison() {
      let columns: Vec<String> = seek
         .columns()
         .iter()
         .map(|c| quote_identifier(&c.name))
         .collect();
      let params: Vec<String> = seek.values().iter().map(&mut placeholder).collect();

      return format!(
         "({}) {} ({})",
         columns.join(", "),
         comparison.operator(),
         params.join(", ")
      );
   }

   seek
      .clauses()
      .iter()
      .map(|clause| {
         let mut parts: Vec<String> = clause
            .equal
            .iter()
            .map(|(column, value)| format!("{} = {}", quote_identifier(column), placeholder(*value)))
            .collect();
         parts.push(format!(
            "{} {} {}",
            quote_identifier(clause.column),
            clause.comparison.operator(),
            placeholder(clause.value)
         ));
         format!("({})", parts.join(" AND "))
      })
      .collect::<Vec<_>>()
      .join(" OR ")
}

fn order_by(order: &[KeysetColumn]) -> String {
   let parts: Vec<String> = order
      .iter()
      .map(|c| {
         let dir = match c.direction {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
         };
         format!("{} {}", quote_identifier(&c.name), dir)
      })
      .collect();

   format!("ORDER BY {}", parts.join(", "))
}

/// Render `query` to SQL and its full bind list (base values first).
pub(crate) fn render(query: StoreQuery<SqlQuery>) -> Result<(String, Vec<JsonValue>)> {
   let StoreQuery {
      base,
      filters,
      order,
      seek,
      fetch_limit,
      ..
   } = query;

   validate_base_query(&base.sql)?;
   for name in order
      .iter()
      .map(|c| c.name.as_str())
      .chain(filters.iter().map(|f| f.field.as_str()))
   {
      validate_column_name(name)?;
   }

   let inner = base.sql.trim_end().trim_end_matches(';').trim_end();
   // The newline keeps a trailing line comment from swallowing the alias.
   let mut sql = format!(
      "SELECT * FROM ({inner}\n) AS {}",
      quote_identifier(PAGE_ALIAS)
   );
   let mut values = base.values;
   let mut conditions = Vec::new();

   for filter in filters {
      values.push(filter.value);
      conditions.push(format!(
         "{} = ${}",
         quote_identifier(&filter.field),
         values.len()
      ));
   }
   if let Some(seek) = &seek {
      conditions.push(format!("({})", seek_condition(seek, &mut values)));
   }

   if !conditions.is_empty() {
      sql = format!("{sql} WHERE {}", conditions.join(" AND "));
   }

   sql = format!("{sql} {} LIMIT {fetch_limit}", order_by(&order));
   Ok((sql, values))
}

#[cfg(test)]
mod tests {
   use super::*;
   use keyset_pagination::{
      Cursor, KeysetSchema, PaginationConfig, PaginationRequest, SortField, build, resolve,
   };
   use serde_json::json;

   fn schema() -> KeysetSchema {
      KeysetSchema::builder(SortField::integer("id"))
         .sortable(SortField::text("name"))
         .sortable(SortField::integer("score"))
         .default_sort("name", SortDirection::Asc)
         .build()
         .unwrap()
   }

   fn groups_schema() -> KeysetSchema {
      KeysetSchema::builder(SortField::integer("id"))
         .sortable(SortField::text("name"))
         .default_sort("name", SortDirection::Asc)
         .filter("state", "OPEN")
         .build()
         .unwrap()
   }

   fn query_for(
      schema: &KeysetSchema,
      base: SqlQuery,
      raw: PaginationRequest,
   ) -> StoreQuery<SqlQuery> {
      let request = resolve(&raw, schema, &PaginationConfig::default()).unwrap();
      build(base, &request)
   }

   fn cursor(values: &[JsonValue]) -> String {
      Cursor::encode(values).into_inner()
   }

   // ─── validate_base_query ───

   #[test]
   fn validate_rejects_top_level_order_by() {
      assert!(validate_base_query("SELECT * FROM groups ORDER BY id").is_err());
      assert!(validate_base_query("select * from groups order\n  by id").is_err());
   }

   #[test]
   fn validate_rejects_top_level_limit() {
      assert!(validate_base_query("SELECT * FROM groups LIMIT 10").is_err());
   }

   #[test]
   fn validate_accepts_clean_query() {
      assert!(validate_base_query("SELECT * FROM groups WHERE owner = $1").is_ok());
   }

   #[test]
   fn validate_allows_clauses_inside_subquery() {
      assert!(
         validate_base_query("SELECT * FROM (SELECT * FROM groups ORDER BY id LIMIT 5)").is_ok()
      );
      assert!(
         validate_base_query("SELECT * FROM (SELECT * FROM groups LIMIT 5) ORDER BY id").is_err()
      );
   }

   #[test]
   fn validate_ignores_keywords_in_comments_and_literals() {
      assert!(validate_base_query("SELECT * FROM groups -- ORDER BY id").is_ok());
      assert!(validate_base_query("SELECT * FROM groups /* LIMIT 10 */").is_ok());
      assert!(validate_base_query("SELECT * FROM groups WHERE name = 'ORDER BY'").is_ok());
      assert!(validate_base_query("SELECT * FROM t WHERE name = 'it''s ORDER BY'").is_ok());
      assert!(validate_base_query(r#"SELECT "LIMIT" FROM groups"#).is_ok());
   }

   #[test]
   fn validate_sees_clauses_after_comments() {
      assert!(validate_base_query("SELECT * FROM groups /* c */ ORDER BY id").is_err());
      assert!(validate_base_query("SELECT * FROM groups -- c\nLIMIT 10").is_err());
   }

   #[test]
   fn validate_ignores_identifiers_containing_keywords() {
      assert!(validate_base_query("SELECT rate_limit, reorder FROM groups").is_ok());
   }

   // ─── identifiers ───

   #[test]
   fn column_names() {
      for name in ["id", "_private", "col_123"] {
         assert!(validate_column_name(name).is_ok(), "{name}");
      }
      for name in ["", "1bad", "col name", "groups.id", "id)--", "id; DROP TABLE groups --"] {
         assert!(validate_column_name(name).is_err(), "{name}");
      }
   }

   #[test]
   fn quotes_identifiers() {
      assert_eq!(quote_identifier("id"), r#""id""#);
      assert_eq!(quote_identifier(r#"a"b"#), r#""a""b""#);
   }

   // ─── render ───

   #[test]
   fn renders_first_page() {
      let query = query_for(
         &schema(),
         "SELECT * FROM groups".into(),
         PaginationRequest::forward(20),
      );

      let (sql, values) = render(query).unwrap();

      assert_eq!(
         sql,
         "SELECT * FROM (SELECT * FROM groups\n) AS \"keyset_page\" ORDER BY \"name\" ASC, \"id\" ASC LIMIT 21"
      );
      assert!(values.is_empty());
   }

   #[test]
   fn renders_forward_cursor_as_row_value() {
      let query = query_for(
         &schema(),
         "SELECT * FROM groups;".into(),
         PaginationRequest::forward(2).after(cursor(&[json!("kappa"), json!(7)])),
      );

      let (sql, values) = render(query).unwrap();

      assert_eq!(
         sql,
         concat!(
            "SELECT * FROM (SELECT * FROM groups\n) AS \"keyset_page\"",
            r#" WHERE (("name", "id") > ($1, $2)) ORDER BY "name" ASC, "id" ASC LIMIT 3"#
         )
      );
      assert_eq!(values, vec![json!("kappa"), json!(7)]);
   }

   #[test]
   fn renders_backward_cursor_reversed() {
      let query = query_for(
         &schema(),
         "SELECT * FROM groups".into(),
         PaginationRequest::backward(2)
            .before(cursor(&[json!(50), json!(7)]))
            .sorted_by("score", SortDirection::Desc),
      );

      let (sql, _) = render(query).unwrap();

      assert_eq!(
         sql,
         concat!(
            "SELECT * FROM (SELECT * FROM groups\n) AS \"keyset_page\"",
            r#" WHERE (("score", "id") > ($1, $2)) ORDER BY "score" ASC, "id" ASC LIMIT 3"#
         )
      );
   }

   #[test]
   fn renders_filter_and_cursor_after_user_params() {
      let base = SqlQuery::new("SELECT * FROM groups WHERE owner = $1").bind("ada");
      let query = query_for(
         &groups_schema(),
         base,
         PaginationRequest::forward(5).after(cursor(&[json!("kappa"), json!(7)])),
      );

      let (sql, values) = render(query).unwrap();

      assert_eq!(
         sql,
         concat!(
            "SELECT * FROM (SELECT * FROM groups WHERE owner = $1\n) AS \"keyset_page\"",
            r#" WHERE "state" = $2 AND (("name", "id") > ($3, $4)) ORDER BY "name" ASC, "id" ASC LIMIT 6"#
         )
      );
      assert_eq!(
         values,
         vec![json!("ada"), json!("OPEN"), json!("kappa"), json!(7)]
      );
   }

   #[test]
   fn renders_mixed_directions_expanded() {
      let seek = KeysetPredicate::new(
         vec![SortField::text("name").asc(), SortField::integer("id").desc()],
         vec![json!("kappa"), json!(7)],
      );
      let mut values = vec![json!("ada")];

      let condition = seek_condition(&seek, &mut values);

      assert_eq!(condition, r#"("name" > $2) OR ("name" = $3 AND "id" < $4)"#);
      assert_eq!(
         values,
         vec![json!("ada"), json!("kappa"), json!("kappa"), json!(7)]
      );
   }

   #[test]
   fn base_or_stays_inside_derived_table() {
      let base = SqlQuery::new("SELECT * FROM groups WHERE owner = $1 OR public = 1").bind("ada");
      let query = query_for(
         &groups_schema(),
         base,
         PaginationRequest::forward(5).after(cursor(&[json!("kappa"), json!(7)])),
      );

      let (sql, _) = render(query).unwrap();

      assert!(sql.starts_with("SELECT * FROM (SELECT * FROM groups WHERE owner = $1 OR public = 1\n) AS"));
      assert!(sql.contains(r#"WHERE "state" = $2 AND (("name", "id") > ($3, $4))"#));
   }

   #[test]
   fn trailing_line_comment_does_not_swallow_conditions() {
      let query = query_for(
         &schema(),
         "SELECT * FROM groups -- all of them".into(),
         PaginationRequest::forward(2).after(cursor(&[json!("kappa"), json!(7)])),
      );

      let (sql, _) = render(query).unwrap();

      assert!(sql.starts_with("SELECT * FROM (SELECT * FROM groups -- all of them\n) AS"));
   }

   #[test]
   fn rejects_invalid_base_query() {
      let query = query_for(
         &schema(),
         "SELECT * FROM groups LIMIT 5".into(),
         PaginationRequest::forward(2),
      );

      assert!(matches!(render(query), Err(Error::InvalidPaginationQuery)));
   }

   #[test]
   fn rejects_invalid_sort_column() {
      let schema = KeysetSchema::builder(SortField::integer("id; DROP TABLE groups"))
         .build()
         .unwrap();
      let query = query_for(
         &schema,
         "SELECT * FROM groups".into(),
         PaginationRequest::forward(2),
      );

      assert!(matches!(
         render(query),
         Err(Error::InvalidColumnName { .. })
      ));
   }
}
