//! # keyset-pagination
//!
//! Store-agnostic keyset (cursor) pagination producing forward/backward
//! connections: pages of edges addressed by opaque cursors, with
//! `hasNextPage` / `hasPreviousPage` page info.
//!
//! ## Core Types
//!
//! - **[`Paginator`]**: entry point; resolves arguments, builds the store query,
//!   calls the [`Store`] and assembles the [`Page`]
//! - **[`KeysetSchema`]**: per-entity sortable fields, default ordering, unique
//!   tie-breaker and optional filter field
//! - **[`PaginationRequest`]** / **[`CanonicalRequest`]**: raw arguments and their
//!   validated forward or backward form
//! - **[`StoreQuery`]**: ordering, keyset predicate, filters and row limit handed
//!   to the store
//! - **[`Cursor`]**: opaque, URL-safe encoding of a record's sort position
//!
//! ## Flow
//!
//! ```text
//! PaginationRequest ─resolve→ CanonicalRequest ─build→ StoreQuery
//!        ─Store::fetch→ rows (limit + 1) ─assemble→ Page
//! ```
//!
//! Every request is bounded (default page size when neither `first` nor `last`
//! is given) and fetches one extra sentinel row so "more pages" is known
//! without a second query.

mod config;
mod connection;
mod cursor;
mod error;
mod page;
mod query;
mod request;
mod schema;
mod sort;

pub use config::PaginationConfig;
pub use connection::{Paginator, Store};
pub use cursor::Cursor;
pub use error::{
   ConfigError, CursorError, PaginationError, RecordError, SchemaError, ValidationError,
};
pub use page::{Edge, Page, PageInfo, SortValues, assemble, sort_values_of};
pub use query::{Comparison, FieldFilter, KeysetPredicate, SeekClause, StoreQuery, build};
pub use request::{
   BackwardRequest, CanonicalRequest, ForwardRequest, PageDirection, PaginationRequest, resolve,
};
pub use schema::{FilterField, KeysetSchema, KeysetSchemaBuilder};
pub use sort::{FieldKind, KeysetColumn, SortDirection, SortField, SortKey};
