//! In-memory store used by the connection tests.
//!
//! Evaluates a `StoreQuery` the way a database would: base predicate, equality
//! filters, keyset predicate, ordering, limit.

#![allow(dead_code)]

use std::cmp::Ordering;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use indexmap::IndexMap;
use keyset_pagination::{
   Comparison, KeysetSchema, PaginationConfig, Paginator, SortDirection, SortField, Store,
   StoreQuery,
};
use serde_json::{Value as JsonValue, json};

pub type Row = IndexMap<String, JsonValue>;

/// Base query: a plain predicate over rows.
pub type RowFilter = fn(&Row) -> bool;

pub fn everything(_: &Row) -> bool {
   true
}

#[derive(Debug, thiserror::Error)]
#[error("memory store is offline")]
pub struct Offline;

#[derive(Default)]
pub struct MemoryStore {
   rows: Vec<Row>,
   offline: bool,
   calls: AtomicUsize,
}

impl MemoryStore {
   pub fn new(rows: Vec<Row>) -> Self {
      Self {
         rows,
         ..Default::default()
      }
   }

   pub fn offline() -> Self {
      Self {
         offline: true,
         ..Default::default()
      }
   }

   pub fn calls(&self) -> usize {
      self.calls.load(AtomicOrdering::SeqCst)
   }

   fn run(&self, query: &StoreQuery<RowFilter>) -> Vec<Row> {
      let mut matched: Vec<Row> = self
         .rows
         .iter()
         .filter(|row| (query.base)(row))
         .filter(|row| query.filters.iter().all(|f| row.get(&f.field) == Some(&f.value)))
         .filter(|row| match &query.seek {
            None => true,
            Some(seek) => seek.clauses().iter().any(|clause| {
               clause.equal.iter().all(|(col, v)| row.get(*col) == Some(*v))
                  && match clause.comparison {
                     Comparison::Greater => compare(&row[clause.column], clause.value).is_gt(),
                     Comparison::Less => compare(&row[clause.column], clause.value).is_lt(),
                  }
            }),
         })
         .cloned()
         .collect();

      matched.sort_by(|a, b| {
         query
            .order
            .iter()
            .map(|col| {
               let ord = compare(&a[&col.name], &b[&col.name]);
               match col.direction {
                  SortDirection::Asc => ord,
                  SortDirection::Desc => ord.reverse(),
               }
            })
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
      });

      matched.truncate(query.fetch_limit);
      matched
   }
}

impl Store for MemoryStore {
   type Query = RowFilter;
   type Record = Row;
   type Error = Offline;

   fn fetch(
      &self,
      query: StoreQuery<RowFilter>,
   ) -> impl Future<Output = Result<Vec<Row>, Offline>> + Send {
      self.calls.fetch_add(1, AtomicOrdering::SeqCst);
      let result = if self.offline {
         Err(Offline)
      } else {
         Ok(self.run(&query))
      };
      async move { result }
   }
}

fn compare(a: &JsonValue, b: &JsonValue) -> Ordering {
   match (a, b) {
      (JsonValue::String(a), JsonValue::String(b)) => a.cmp(b),
      (JsonValue::Bool(a), JsonValue::Bool(b)) => a.cmp(b),
      (JsonValue::Number(a), JsonValue::Number(b)) => match (a.as_i64(), b.as_i64()) {
         (Some(a), Some(b)) => a.cmp(&b),
         _ => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
      },
      _ => panic!("incomparable sort values {a} and {b}"),
   }
}

pub fn group(id: i64, name: &str, state: &str, created_at: &str) -> Row {
   IndexMap::from([
      ("id".to_string(), json!(id)),
      ("name".to_string(), json!(name)),
      ("state".to_string(), json!(state)),
      ("created_at".to_string(), json!(created_at)),
   ])
}

/// Twelve groups; several share a name so ordering relies on the `id`
/// tie-breaker. Ids 4 and 9 are closed.
///
/// ```text
/// id | name    | state  | created_at
/// ---|---------|--------|-----------
///  1 | delta   | OPEN   | 2024-01-05
///  2 | alpha   | OPEN   | 2024-01-01
///  3 | charlie | OPEN   | 2024-01-09
///  4 | alpha   | CLOSED | 2024-01-02
///  5 | bravo   | OPEN   | 2024-01-07
///  6 | alpha   | OPEN   | 2024-01-03
///  7 | echo    | OPEN   | 2024-01-04
///  8 | bravo   | OPEN   | 2024-01-08
///  9 | delta   | CLOSED | 2024-01-06
/// 10 | alpha   | OPEN   | 2024-01-10
/// 11 | foxtrot | OPEN   | 2024-01-11
/// 12 | charlie | OPEN   | 2024-01-12
/// ```
pub fn groups() -> Vec<Row> {
   vec![
      group(1, "delta", "OPEN", "2024-01-05"),
      group(2, "alpha", "OPEN", "2024-01-01"),
      group(3, "charlie", "OPEN", "2024-01-09"),
      group(4, "alpha", "CLOSED", "2024-01-02"),
      group(5, "bravo", "OPEN", "2024-01-07"),
      group(6, "alpha", "OPEN", "2024-01-03"),
      group(7, "echo", "OPEN", "2024-01-04"),
      group(8, "bravo", "OPEN", "2024-01-08"),
      group(9, "delta", "CLOSED", "2024-01-06"),
      group(10, "alpha", "OPEN", "2024-01-10"),
      group(11, "foxtrot", "OPEN", "2024-01-11"),
      group(12, "charlie", "OPEN", "2024-01-12"),
   ]
}

pub fn groups_paginator() -> Paginator {
   let schema = KeysetSchema::builder(SortField::integer("id"))
      .sortable(SortField::text("name"))
      .sortable(SortField::text("created_at"))
      .default_sort("name", SortDirection::Asc)
      .filter("state", "OPEN")
      .build()
      .unwrap();

   Paginator::new(schema, PaginationConfig::default()).unwrap()
}

pub fn ids<'a>(rows: impl IntoIterator<Item = &'a Row>) -> Vec<i64> {
   rows
      .into_iter()
      .map(|r| r["id"].as_i64().unwrap())
      .collect()
}
