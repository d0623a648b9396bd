use std::path::Path;

use keyset_pagination::{Page, PaginationConfig, PaginationError, PaginationRequest, Paginator};
use serde_json::Value as JsonValue;
use sqlx_sqlite_keyset::{SqlQuery, SqliteDatabase, SqliteDatabaseConfig, SqliteStore};
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tracing::debug;

use crate::error::{Error, Result};
use crate::group::{Group, GroupState, groups_schema};

const CREATE_GROUPS: &str = "CREATE TABLE IF NOT EXISTS groups (
   id INTEGER PRIMARY KEY AUTOINCREMENT,
   name TEXT NOT NULL,
   state TEXT NOT NULL,
   created_at TEXT NOT NULL
)";

// One index per sortable field, led by the filter column
const CREATE_INDEXES: [&str; 2] = [
   "CREATE INDEX IF NOT EXISTS groups_state_name ON groups (state, name, id)",
   "CREATE INDEX IF NOT EXISTS groups_state_created_at ON groups (state, created_at, id)",
];

const LIST_GROUPS: &str = "SELECT id, name, state, created_at FROM groups";

/// Fixed-width so timestamps sort lexicographically.
const TIMESTAMP: &[BorrowedFormatItem<'static>] =
   format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z");

/// Stores groups in SQLite and lists them as cursor-paginated connections.
#[derive(Debug)]
pub struct GroupDirectory {
   store: SqliteStore,
   paginator: Paginator,
}

impl GroupDirectory {
   /// Open the directory at `path` with default page sizes, creating the
   /// table on first use.
   pub async fn connect(
      path: impl AsRef<Path>,
      db_config: Option<SqliteDatabaseConfig>,
   ) -> Result<Self> {
      Self::connect_with(path, db_config, PaginationConfig::default()).await
   }

   pub async fn connect_with(
      path: impl AsRef<Path>,
      db_config: Option<SqliteDatabaseConfig>,
      page_config: PaginationConfig,
   ) -> Result<Self> {
      let paginator = Paginator::new(groups_schema()?, page_config)?;
      let store = SqliteStore::new(SqliteDatabase::connect(path, db_config).await?);

      store.execute(SqlQuery::new(CREATE_GROUPS)).await?;
      for index in CREATE_INDEXES {
         store.execute(SqlQuery::new(index)).await?;
      }
      debug!(path = %store.database().path().display(), "Group directory ready");

      Ok(Self { store, paginator })
   }

   pub fn paginator(&self) -> &Paginator {
      &self.paginator
   }

   /// Create a group stamped with the current time.
   pub async fn create_group(&self, name: impl Into<String>, state: GroupState) -> Result<Group> {
      let created_at = OffsetDateTime::now_utc().format(TIMESTAMP)?;
      self.insert_group(name, state, created_at).await
   }

   /// Insert a group with an explicit creation timestamp.
   pub async fn insert_group(
      &self,
      name: impl Into<String>,
      state: GroupState,
      created_at: impl Into<String>,
   ) -> Result<Group> {
      let name = name.into();
      let created_at = created_at.into();

      let result = self
         .store
         .execute(
            SqlQuery::new("INSERT INTO groups (name, state, created_at) VALUES ($1, $2, $3)")
               .bind(name.as_str())
               .bind(state.as_str())
               .bind(created_at.as_str()),
         )
         .await?;

      Ok(Group {
         id: result.last_insert_id,
         name,
         state,
         created_at,
      })
   }

   /// Move a group to `state`. Returns `false` if no group has `id`.
   pub async fn set_state(&self, id: i64, state: GroupState) -> Result<bool> {
      let result = self
         .store
         .execute(
            SqlQuery::new("UPDATE groups SET state = $1 WHERE id = $2")
               .bind(state.as_str())
               .bind(id),
         )
         .await?;

      Ok(result.rows_affected > 0)
   }

   /// List one page of groups.
   ///
   /// `raw.filter` selects the state (default `OPEN`); it must name a known
   /// state. Pagination arguments are validated first.
   pub async fn list_groups(&self, raw: &PaginationRequest) -> Result<Page<Group>> {
      self
         .paginator
         .resolve(raw)
         .map_err(|e| Error::Pagination(PaginationError::Validation(e)))?;

      match &raw.filter {
         None => {}
         Some(JsonValue::String(state)) => {
            state.parse::<GroupState>()?;
         }
         Some(other) => return Err(Error::UnknownState(other.to_string())),
      }

      let page = self
         .paginator
         .paginate(&self.store, SqlQuery::new(LIST_GROUPS), raw)
         .await?;

      page.try_map(Group::try_from)
   }

   /// Close the database connections.
   pub async fn close(self) -> Result<()> {
      self.store.database().close().await?;
      Ok(())
   }

   /// Close the database connections and remove all database files.
   pub async fn remove(self) -> Result<()> {
      self.store.database().remove().await?;
      Ok(())
   }
}
