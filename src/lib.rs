//! # group-connections
//!
//! Groups stored in SQLite, listed as forward/backward cursor-paginated
//! connections.
//!
//! - **[`GroupDirectory`]**: creates, updates and lists groups
//! - **[`Group`]** / **[`GroupState`]**: the stored record
//! - **[`groups_schema`]**: sortable fields (`name`, `created_at`, `id`) and the
//!   `state` filter
//!
//! ```no_run
//! use group_connections::{GroupDirectory, GroupState, PaginationRequest};
//!
//! # async fn run() -> group_connections::Result<()> {
//! let directory = GroupDirectory::connect("groups.db", None).await?;
//! directory.create_group("book club", GroupState::Open).await?;
//!
//! let page = directory.list_groups(&PaginationRequest::forward(10)).await?;
//! if page.page_info.has_next_page
//!    && let Some(after) = page.page_info.end_cursor
//! {
//!    directory
//!       .list_groups(&PaginationRequest::forward(10).after(after.into_inner()))
//!       .await?;
//! }
//! # Ok(())
//! # }
//! ```

mod directory;
mod error;
mod group;

pub use directory::GroupDirectory;
pub use error::{Error, Result};
pub use group::{Group, GroupState, groups_schema};

pub use keyset_pagination::{Cursor, Edge, Page, PageInfo, PaginationRequest, SortDirection};
