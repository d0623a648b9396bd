//! Connection facade: resolve, build, fetch, assemble.

use std::future::Future;

use tracing::{debug, warn};

use crate::config::PaginationConfig;
use crate::error::{ConfigError, PaginationError, ValidationError};
use crate::page::{Page, SortValues, assemble};
use crate::query::{StoreQuery, build};
use crate::request::{CanonicalRequest, PaginationRequest, resolve};
use crate::schema::KeysetSchema;

/// Executes store queries on behalf of a [`Paginator`].
///
/// Implementations must return rows in exactly the order given by
/// [`StoreQuery::order`], restricted by the base query, every filter and the
/// keyset predicate, and at most [`StoreQuery::fetch_limit`] of them.
/// Retries, timeouts and cancellation are the implementation's concern.
pub trait Store {
   /// Caller-supplied base query (already scoped to what the caller may see)
   type Query;
   type Record: SortValues;
   type Error: std::error::Error + Send + Sync + 'static;

   fn fetch(
      &self,
      query: StoreQuery<Self::Query>,
   ) -> impl Future<Output = Result<Vec<Self::Record>, Self::Error>> + Send;
}

/// Entry point for paginating one entity.
///
/// Holds no mutable state; share it freely between concurrent callers.
///
/// # Example
///
/// ```no_run
/// use keyset_pagination::{
///    KeysetSchema, PaginationConfig, PaginationRequest, Paginator, SortDirection, SortField,
/// };
///
/// let schema = KeysetSchema::builder(SortField::integer("id"))
///    .sortable(SortField::text("name"))
///    .default_sort("name", SortDirection::Asc)
///    .build()
///    .unwrap();
/// let paginator = Paginator::new(schema, PaginationConfig::default()).unwrap();
///
/// # async fn run<S: keyset_pagination::Store<Query = ()>>(
/// #    paginator: Paginator,
/// #    store: S,
/// # ) {
/// let page = paginator
///    .paginate(&store, (), &PaginationRequest::forward(10))
///    .await
///    .unwrap();
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Paginator {
   schema: KeysetSchema,
   config: PaginationConfig,
}

impl Paginator {
   pub fn new(schema: KeysetSchema, config: PaginationConfig) -> Result<Self, ConfigError> {
      config.validate()?;
      Ok(Self { schema, config })
   }

   pub fn schema(&self) -> &KeysetSchema {
      &self.schema
   }

   pub fn config(&self) -> &PaginationConfig {
      &self.config
   }

   /// Validate raw arguments without touching a store.
   pub fn resolve(&self, raw: &PaginationRequest) -> Result<CanonicalRequest, ValidationError> {
      resolve(raw, &self.schema, &self.config).inspect_err(|e| {
         if let ValidationError::InvalidCursor(cursor_err) = e {
            warn!(error = %cursor_err, "Rejected pagination cursor");
         }
      })
   }

   /// Fetch one page of `base` as described by `raw`.
   ///
   /// Validation errors are returned before the store is called. Store
   /// errors are returned as [`PaginationError::Store`] without retrying.
   pub async fn paginate<S: Store>(
      &self,
      store: &S,
      base: S::Query,
      raw: &PaginationRequest,
   ) -> Result<Page<S::Record>, PaginationError<S::Error>> {
      let request = self.resolve(raw)?;
      debug!(
         direction = ?request.direction(),
         limit = request.limit(),
         sort_key = ?request.sort_key(),
         from_cursor = request.position().is_some(),
         "Resolved pagination request"
      );

      let query = build(base, &request);
      let rows = store.fetch(query).await.map_err(PaginationError::Store)?;
      let fetched = rows.len();

      let page = assemble(rows, &request)?;
      debug!(
         fetched,
         edges = page.len(),
         has_next_page = page.page_info.has_next_page,
         has_previous_page = page.page_info.has_previous_page,
         "Assembled page"
      );

      Ok(page)
   }
}
