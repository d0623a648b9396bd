//! Pages, edges and page info, and the assembler that builds them from
//! fetched rows.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::cursor::Cursor;
use crate::error::RecordError;
use crate::request::{CanonicalRequest, PageDirection};
use crate::sort::SortKey;

/// Access to the sort-key values of a record.
pub trait SortValues {
   /// Value of `field`, or `None` if the record has no such field.
   fn sort_value(&self, field: &str) -> Option<JsonValue>;
}

impl SortValues for IndexMap<String, JsonValue> {
   fn sort_value(&self, field: &str) -> Option<JsonValue> {
      self.get(field).cloned()
   }
}

impl SortValues for serde_json::Map<String, JsonValue> {
   fn sort_value(&self, field: &str) -> Option<JsonValue> {
      self.get(field).cloned()
   }
}

/// A record and the cursor of its sort position.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge<R> {
   pub node: R,
   pub cursor: Cursor,
}

/// Information about the current page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
   /// Whether records follow the last edge
   pub has_next_page: bool,
   /// Whether records precede the first edge
   pub has_previous_page: bool,
   /// Cursor of the first edge, `None` on an empty page
   pub start_cursor: Option<Cursor>,
   /// Cursor of the last edge, `None` on an empty page
   pub end_cursor: Option<Cursor>,
}

/// One page of records, always in logical sort order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<R> {
   pub edges: Vec<Edge<R>>,
   pub page_info: PageInfo,
}

impl<R> Page<R> {
   pub fn len(&self) -> usize {
      self.edges.len()
   }

   pub fn is_empty(&self) -> bool {
      self.edges.is_empty()
   }

   pub fn nodes(&self) -> impl Iterator<Item = &R> {
      self.edges.iter().map(|e| &e.node)
   }

   pub fn into_nodes(self) -> Vec<R> {
      self.edges.into_iter().map(|e| e.node).collect()
   }

   /// Convert every node, keeping cursors and page info.
   pub fn map<T>(self, mut f: impl FnMut(R) -> T) -> Page<T> {
      Page {
         edges: self
            .edges
            .into_iter()
            .map(|e| Edge {
               node: f(e.node),
               cursor: e.cursor,
            })
            .collect(),
         page_info: self.page_info,
      }
   }

   /// Fallible [`map`](Self::map); stops at the first error.
   pub fn try_map<T, E>(self, mut f: impl FnMut(R) -> Result<T, E>) -> Result<Page<T>, E> {
      let edges = self
         .edges
         .into_iter()
         .map(|e| {
            Ok(Edge {
               node: f(e.node)?,
               cursor: e.cursor,
            })
         })
         .collect::<Result<Vec<_>, E>>()?;

      Ok(Page {
         edges,
         page_info: self.page_info,
      })
   }
}

/// Extract `record`'s sort-key values, checking each against its column kind.
pub fn sort_values_of<R: SortValues>(
   record: &R,
   key: &SortKey,
) -> Result<Vec<JsonValue>, RecordError> {
   key.columns()
      .iter()
      .map(|column| {
         let value =
            record
               .sort_value(&column.name)
               .ok_or_else(|| RecordError::MissingSortField {
                  field: column.name.clone(),
               })?;
         if !column.kind.admits(&value) {
            return Err(RecordError::InvalidSortValue {
               field: column.name.clone(),
               kind: column.kind,
            });
         }
         Ok(value)
      })
      .collect()
}

/// Build a page from rows fetched in store order.
///
/// `rows` holds up to `limit + 1` records; a row beyond `limit` is the
/// sentinel and is dropped. Backward rows arrive nearest-to-cursor first and
/// are reversed into logical order.
pub fn assemble<R: SortValues>(
   mut rows: Vec<R>,
   request: &CanonicalRequest,
) -> Result<Page<R>, RecordError> {
   let limit = request.limit();
   let has_more = rows.len() > limit;
   rows.truncate(limit);

   let direction = request.direction();
   if direction == PageDirection::Backward {
      rows.reverse();
   }

   let key = request.sort_key();
   let edges = rows
      .into_iter()
      .map(|node| {
         let cursor = Cursor::encode(&sort_values_of(&node, key)?);
         Ok(Edge { node, cursor })
      })
      .collect::<Result<Vec<_>, RecordError>>()?;

   // Paging from a cursor implies records on its far side, unless nothing
   // matched at all.
   let from_cursor = request.position().is_some() && !edges.is_empty();
   let (has_next_page, has_previous_page) = match direction {
      PageDirection::Forward => (has_more, from_cursor),
      PageDirection::Backward => (from_cursor, has_more),
   };

   let page_info = PageInfo {
      has_next_page,
      has_previous_page,
      start_cursor: edges.first().map(|e| e.cursor.clone()),
      end_cursor: edges.last().map(|e| e.cursor.clone()),
   };

   Ok(Page { edges, page_info })
}
