//! Per-entity pagination schema: which fields may be sorted on, the default
//! ordering, the unique tie-breaker and the optional filter field.

use serde_json::Value as JsonValue;

use crate::error::SchemaError;
use crate::sort::{SortDirection, SortField, SortKey};

/// Equality filter applied to every query of a connection (e.g. `state = 'OPEN'`).
#[derive(Debug, Clone, PartialEq)]
pub struct FilterField {
   pub name: String,
   /// Value used when the caller supplies none
   pub default: JsonValue,
}

/// Describes how records of one entity are paginated.
///
/// # Example
///
/// ```
/// use keyset_pagination::{KeysetSchema, SortDirection, SortField};
///
/// let schema = KeysetSchema::builder(SortField::integer("id"))
///    .sortable(SortField::text("name"))
///    .sortable(SortField::text("created_at"))
///    .default_sort("name", SortDirection::Asc)
///    .filter("state", "OPEN")
///    .build()
///    .unwrap();
///
/// assert!(schema.field("name").is_some());
/// assert!(schema.field("password").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct KeysetSchema {
   fields: Vec<SortField>,
   tie_breaker: SortField,
   default_sort: SortField,
   default_direction: SortDirection,
   filter: Option<FilterField>,
}

impl KeysetSchema {
   /// Start a schema whose records are uniquely identified by `tie_breaker`.
   ///
   /// The tie-breaker is sortable and, unless [`KeysetSchemaBuilder::default_sort`]
   /// says otherwise, the default ordering.
   pub fn builder(tie_breaker: SortField) -> KeysetSchemaBuilder {
      KeysetSchemaBuilder {
         default_sort: tie_breaker.name.clone(),
         default_direction: SortDirection::Asc,
         fields: Vec::new(),
         tie_breaker,
         filter: None,
      }
   }

   /// Look up a sortable field by name.
   pub fn field(&self, name: &str) -> Option<&SortField> {
      if self.tie_breaker.name == name {
         return Some(&self.tie_breaker);
      }
      self.fields.iter().find(|f| f.name == name)
   }

   /// All sortable fields, tie-breaker last.
   pub fn fields(&self) -> impl Iterator<Item = &SortField> {
      self.fields.iter().chain(std::iter::once(&self.tie_breaker))
   }

   pub fn tie_breaker(&self) -> &SortField {
      &self.tie_breaker
   }

   pub fn filter(&self) -> Option<&FilterField> {
      self.filter.as_ref()
   }

   /// Field ordered by when the caller does not override the sort field.
   pub fn default_field(&self) -> &SortField {
      &self.default_sort
   }

   pub fn default_direction(&self) -> SortDirection {
      self.default_direction
   }

   /// Sort key ordering by `field`, tie-broken on the unique field.
   pub fn sort_key(&self, field: &SortField, direction: SortDirection) -> SortKey {
      SortKey::new(field, &self.tie_breaker, direction)
   }

   /// Sort key used when the caller does not override the ordering.
   pub fn default_sort_key(&self) -> SortKey {
      self.sort_key(&self.default_sort, self.default_direction)
   }
}

/// Builder for [`KeysetSchema`].
#[derive(Debug, Clone)]
pub struct KeysetSchemaBuilder {
   fields: Vec<SortField>,
   tie_breaker: SortField,
   default_sort: String,
   default_direction: SortDirection,
   filter: Option<FilterField>,
}

impl KeysetSchemaBuilder {
   /// Allow callers to sort by `field`.
   pub fn sortable(mut self, field: SortField) -> Self {
      self.fields.push(field);
      self
   }

   /// Ordering used when the request carries no sort override.
   pub fn default_sort(mut self, name: impl Into<String>, direction: SortDirection) -> Self {
      self.default_sort = name.into();
      self.default_direction = direction;
      self
   }

   /// Filter every query on `name = value`, with `default` when the caller
   /// supplies no value.
   pub fn filter(mut self, name: impl Into<String>, default: impl Into<JsonValue>) -> Self {
      self.filter = Some(FilterField {
         name: name.into(),
         default: default.into(),
      });
      self
   }

   pub fn build(self) -> Result<KeysetSchema, SchemaError> {
      let mut seen: Vec<&str> = Vec::with_capacity(self.fields.len() + 1);
      for field in self.fields.iter().chain(std::iter::once(&self.tie_breaker)) {
         if field.name.is_empty() {
            return Err(SchemaError::EmptyFieldName);
         }
         if seen.contains(&field.name.as_str()) {
            return Err(SchemaError::DuplicateField(field.name.clone()));
         }
         seen.push(&field.name);
      }

      if let Some(filter) = &self.filter
         && filter.name.is_empty()
      {
         return Err(SchemaError::EmptyFieldName);
      }

      let default_sort = if self.default_sort == self.tie_breaker.name {
         self.tie_breaker.clone()
      } else {
         self
            .fields
            .iter()
            .find(|f| f.name == self.default_sort)
            .cloned()
            .ok_or_else(|| SchemaError::UnknownDefaultSort(self.default_sort.clone()))?
      };

      Ok(KeysetSchema {
         fields: self.fields,
         tie_breaker: self.tie_breaker,
         default_sort,
         default_direction: self.default_direction,
         filter: self.filter,
      })
   }
}
