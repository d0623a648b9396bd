//! # sqlx-sqlite-keyset
//!
//! SQLite [`Store`](keyset_pagination::Store) for `keyset-pagination`, built
//! on SQLx.
//!
//! ## Core Types
//!
//! - **[`SqliteStore`]**: renders a pagination query onto a [`SqlQuery`] base
//!   query and decodes the rows to JSON objects
//! - **[`SqliteDatabase`]**: read pool plus a single serialized writer, with
//!   WAL enabled on first write
//! - **[`SqliteDatabaseConfig`]**: pool sizing and idle timeout
//! - **[`Error`]**: error type for database operations
//!
//! ## Example
//!
//! ```no_run
//! use keyset_pagination::{
//!    KeysetSchema, PaginationConfig, PaginationRequest, Paginator, SortDirection, SortField,
//! };
//! use sqlx_sqlite_keyset::{SqlQuery, SqliteDatabase, SqliteStore};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::new(SqliteDatabase::connect("groups.db", None).await?);
//! let schema = KeysetSchema::builder(SortField::integer("id"))
//!    .sortable(SortField::text("name"))
//!    .default_sort("name", SortDirection::Asc)
//!    .build()?;
//! let paginator = Paginator::new(schema, PaginationConfig::default())?;
//!
//! let page = paginator
//!    .paginate(&store, SqlQuery::new("SELECT * FROM groups"), &PaginationRequest::forward(10))
//!    .await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod database;
mod decode;
mod error;
mod query;
mod sql;
mod store;

pub use config::SqliteDatabaseConfig;
pub use database::SqliteDatabase;
pub use error::{Error, Result};
pub use query::SqlQuery;
pub use store::{SqliteStore, WriteQueryResult};
