//! [`Store`] implementation over a [`SqliteDatabase`].

use std::future::Future;
use std::sync::Arc;

use indexmap::IndexMap;
use keyset_pagination::{Store, StoreQuery};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::trace;

use crate::database::SqliteDatabase;
use crate::decode::decode_rows;
use crate::error::{Error, Result};
use crate::query::{SqlQuery, bind_value};
use crate::sql::render;

/// Result returned from write operations (e.g. INSERT, UPDATE, DELETE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteQueryResult {
   pub rows_affected: u64,
   /// The last inserted ROWID; 0 for `WITHOUT ROWID` tables.
   pub last_insert_id: i64,
}

/// Paginates SQL base queries against one SQLite database.
///
/// Pages are read through the database's read pool; [`execute`](Self::execute)
/// goes through the single writer.
#[derive(Debug, Clone)]
pub struct SqliteStore {
   db: Arc<SqliteDatabase>,
}

impl SqliteStore {
   pub fn new(db: Arc<SqliteDatabase>) -> Self {
      Self { db }
   }

   pub fn database(&self) -> &Arc<SqliteDatabase> {
      &self.db
   }

   /// Execute a write statement.
   pub async fn execute(&self, query: SqlQuery) -> Result<WriteQueryResult> {
      let mut writer = self.db.acquire_writer().await?;

      let mut q = sqlx::query(&query.sql);
      for value in query.values {
         q = bind_value(q, value);
      }

      let result = q.execute(&mut *writer).await?;
      Ok(WriteQueryResult {
         rows_affected: result.rows_affected(),
         last_insert_id: result.last_insert_rowid(),
      })
   }

   /// Run a SELECT as given, without pagination.
   pub async fn fetch_all(&self, query: SqlQuery) -> Result<Vec<IndexMap<String, JsonValue>>> {
      self.fetch_rows(&query.sql, query.values).await
   }

   async fn fetch_rows(
      &self,
      sql: &str,
      values: Vec<JsonValue>,
   ) -> Result<Vec<IndexMap<String, JsonValue>>> {
      let pool = self.db.read_pool()?;

      let mut q = sqlx::query(sql);
      for value in values {
         q = bind_value(q, value);
      }

      decode_rows(q.fetch_all(pool).await?)
   }
}

impl Store for SqliteStore {
   type Query = SqlQuery;
   type Record = IndexMap<String, JsonValue>;
   type Error = Error;

   fn fetch(
      &self,
      query: StoreQuery<SqlQuery>,
   ) -> impl Future<Output = Result<Vec<Self::Record>>> + Send {
      async move {
         let (sql, values) = render(query)?;
         trace!(%sql, binds = values.len(), "Fetching keyset page");
         self.fetch_rows(&sql, values).await
      }
   }
}
