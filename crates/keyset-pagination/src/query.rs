//! Store-facing description of one page fetch.
//!
//! [`build`] turns a canonical request and a caller-supplied base query into a
//! [`StoreQuery`]: the filters to AND onto the base query, the ordering, an
//! optional keyset predicate and the row limit. The store executes it; nothing
//! here touches a database.
//!
//! # How It Works
//!
//! Instead of skipping rows with OFFSET, keyset pagination seeks past the
//! sort position of the cursor row. For backward pagination every sort
//! direction is reversed so the store returns the rows nearest the cursor
//! first; the assembler reverses them back into logical order.
//!
//! The keyset predicate "strictly after `(a, b, c)` in the store ordering"
//! expands to:
//!
//! ```text
//! (a > $a) OR (a = $a AND b > $b) OR (a = $a AND b = $b AND c > $c)
//! ```
//!
//! where each `>` becomes `<` for a descending column. When every column has
//! the same direction the predicate is equivalent to the row-value comparison
//! `(a, b, c) > ($a, $b, $c)`, which [`KeysetPredicate::uniform_comparison`]
//! reports so stores can use the shorter form.

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::request::{CanonicalRequest, PageDirection};
use crate::sort::{KeysetColumn, SortDirection};

/// `field = value`, AND-ed onto the base query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldFilter {
   pub field: String,
   pub value: JsonValue,
}

/// Comparison a keyset clause applies to its last column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Comparison {
   Greater,
   Less,
}

impl Comparison {
   /// Comparison that moves past a value in `direction`.
   pub fn past(direction: SortDirection) -> Self {
      match direction {
         SortDirection::Asc => Comparison::Greater,
         SortDirection::Desc => Comparison::Less,
      }
   }

   /// SQL operator for this comparison.
   pub fn operator(self) -> &'static str {
      match self {
         Comparison::Greater => ">",
         Comparison::Less => "<",
      }
   }
}

/// One disjunct of an expanded keyset predicate.
///
/// Matches rows whose `equal` columns equal the cursor values and whose
/// `column` compares past `value`.
#[derive(Debug, Clone, PartialEq)]
pub struct SeekClause<'a> {
   pub equal: Vec<(&'a str, &'a JsonValue)>,
   pub column: &'a str,
   pub comparison: Comparison,
   pub value: &'a JsonValue,
}

/// Rows strictly after a sort position, in the store ordering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeysetPredicate {
   columns: Vec<KeysetColumn>,
   values: Vec<JsonValue>,
}

impl KeysetPredicate {
   /// Pair `columns` with cursor `values` positionally.
   ///
   /// # Panics
   ///
   /// If the two differ in length.
   pub fn new(columns: Vec<KeysetColumn>, values: Vec<JsonValue>) -> Self {
      assert_eq!(
         columns.len(),
         values.len(),
         "keyset predicate needs one value per column"
      );
      Self { columns, values }
   }

   /// Store-ordering columns the predicate compares on.
   pub fn columns(&self) -> &[KeysetColumn] {
      &self.columns
   }

   /// Cursor values, one per column.
   pub fn values(&self) -> &[JsonValue] {
      &self.values
   }

   /// The single comparison to use when all columns share a direction.
   pub fn uniform_comparison(&self) -> Option<Comparison> {
      let first = self.columns.first()?.direction;
      self
         .columns
         .iter()
         .all(|c| c.direction == first)
         .then(|| Comparison::past(first))
   }

   /// Expanded OR-of-ANDs form, one clause per column.
   pub fn clauses(&self) -> Vec<SeekClause<'_>> {
      (0..self.columns.len())
         .map(|level| SeekClause {
            equal: self.columns[..level]
               .iter()
               .zip(&self.values)
               .map(|(c, v)| (c.name.as_str(), v))
               .collect(),
            column: &self.columns[level].name,
            comparison: Comparison::past(self.columns[level].direction),
            value: &self.values[level],
         })
         .collect()
   }
}

/// Everything a store needs to fetch one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreQuery<B> {
   /// Caller-supplied base query; never weakened
   pub base: B,
   /// Equality filters AND-ed onto the base query
   pub filters: Vec<FieldFilter>,
   /// Store ordering (already reversed for backward pagination)
   pub order: Vec<KeysetColumn>,
   /// Keyset predicate AND-ed onto the base query, if a cursor was supplied
   pub seek: Option<KeysetPredicate>,
   /// Rows to fetch: the page size plus one sentinel row
   pub fetch_limit: usize,
   /// Pagination mode the query was built for
   pub direction: PageDirection,
}

impl<B> StoreQuery<B> {
   /// Swap the base query, keeping every pagination constraint.
   pub fn map_base<C>(self, f: impl FnOnce(B) -> C) -> StoreQuery<C> {
      StoreQuery {
         base: f(self.base),
         filters: self.filters,
         order: self.order,
         seek: self.seek,
         fetch_limit: self.fetch_limit,
         direction: self.direction,
      }
   }
}

/// Build the store query for `request` on top of `base`.
pub fn build<B>(base: B, request: &CanonicalRequest) -> StoreQuery<B> {
   let order = match request.direction() {
      PageDirection::Forward => request.sort_key().columns().to_vec(),
      PageDirection::Backward => request.sort_key().reversed().columns().to_vec(),
   };

   let seek = request
      .position()
      .map(|values| KeysetPredicate::new(order.clone(), values.to_vec()));

   StoreQuery {
      base,
      filters: request.filter().cloned().into_iter().collect(),
      order,
      seek,
      fetch_limit: request.limit().saturating_add(1),
      direction: request.direction(),
   }
}
