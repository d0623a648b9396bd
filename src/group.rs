//! Group records and their pagination schema.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use keyset_pagination::{KeysetSchema, SchemaError, SortDirection, SortField, SortValues};
use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};

use crate::error::Error;

/// Lifecycle state of a group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupState {
   #[default]
   Open,
   Closed,
   Archived,
}

impl GroupState {
   pub fn as_str(self) -> &'static str {
      match self {
         GroupState::Open => "OPEN",
         GroupState::Closed => "CLOSED",
         GroupState::Archived => "ARCHIVED",
      }
   }
}

impl fmt::Display for GroupState {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str(self.as_str())
   }
}

impl FromStr for GroupState {
   type Err = Error;

   fn from_str(s: &str) -> Result<Self, Self::Err> {
      match s {
         "OPEN" => Ok(GroupState::Open),
         "CLOSED" => Ok(GroupState::Closed),
         "ARCHIVED" => Ok(GroupState::Archived),
         other => Err(Error::UnknownState(other.to_string())),
      }
   }
}

/// A group as stored in the `groups` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
   pub id: i64,
   pub name: String,
   pub state: GroupState,
   /// UTC timestamp, `YYYY-MM-DDTHH:MM:SS.ffffffZ`
   pub created_at: String,
}

impl SortValues for Group {
   fn sort_value(&self, field: &str) -> Option<JsonValue> {
      match field {
         "id" => Some(json!(self.id)),
         "name" => Some(json!(self.name)),
         "state" => Some(json!(self.state.as_str())),
         "created_at" => Some(json!(self.created_at)),
         _ => None,
      }
   }
}

impl TryFrom<IndexMap<String, JsonValue>> for Group {
   type Error = Error;

   fn try_from(row: IndexMap<String, JsonValue>) -> Result<Self, Self::Error> {
      let text = |column: &'static str| {
         row.get(column)
            .and_then(JsonValue::as_str)
            .ok_or(Error::InvalidRow { column })
      };

      Ok(Group {
         id: row
            .get("id")
            .and_then(JsonValue::as_i64)
            .ok_or(Error::InvalidRow { column: "id" })?,
         name: text("name")?.to_string(),
         state: text("state")?.parse()?,
         created_at: text("created_at")?.to_string(),
      })
   }
}

/// Groups sort by `name` (default, ascending) or `created_at`, tie-broken by
/// `id`, and are filtered by `state` (default `OPEN`).
pub fn groups_schema() -> Result<KeysetSchema, SchemaError> {
   KeysetSchema::builder(SortField::integer("id"))
      .sortable(SortField::text("name"))
      .sortable(SortField::text("created_at"))
      .default_sort("name", SortDirection::Asc)
      .filter("state", GroupState::Open.as_str())
      .build()
}

#[cfg(test)]
mod tests {
   use super::*;

   fn row(state: &str) -> IndexMap<String, JsonValue> {
      IndexMap::from([
         ("id".to_string(), json!(7)),
         ("name".to_string(), json!("chess club")),
         ("state".to_string(), json!(state)),
         ("created_at".to_string(), json!("2024-03-01T09:30:00.000000Z")),
      ])
   }

   // ─── GroupState ───

   #[test]
   fn state_round_trips_through_strings() {
      for state in [GroupState::Open, GroupState::Closed, GroupState::Archived] {
         assert_eq!(state.as_str().parse::<GroupState>().unwrap(), state);
         assert_eq!(serde_json::to_value(state).unwrap(), json!(state.as_str()));
      }
   }

   #[test]
   fn unknown_state_is_rejected() {
      let err = "open".parse::<GroupState>().unwrap_err();
      assert!(matches!(err, Error::UnknownState(s) if s == "open"));
   }

   // ─── Group rows ───

   #[test]
   fn group_from_row() {
      let group = Group::try_from(row("CLOSED")).unwrap();

      assert_eq!(group.id, 7);
      assert_eq!(group.name, "chess club");
      assert_eq!(group.state, GroupState::Closed);
   }

   #[test]
   fn group_from_row_with_unknown_state() {
      assert!(matches!(
         Group::try_from(row("PENDING")),
         Err(Error::UnknownState(_))
      ));
   }

   #[test]
   fn group_from_row_with_missing_column() {
      let mut row = row("OPEN");
      row.shift_remove("name");

      assert!(matches!(
         Group::try_from(row),
         Err(Error::InvalidRow { column: "name" })
      ));
   }

   #[test]
   fn group_sort_values_match_schema_fields() {
      let group = Group::try_from(row("OPEN")).unwrap();
      let schema = groups_schema().unwrap();

      for field in schema.fields() {
         let value = group.sort_value(&field.name).unwrap();
         assert!(field.kind.admits(&value), "{}", field.name);
      }
      assert_eq!(group.sort_value("owner"), None);
   }

   #[test]
   fn group_serializes_camel_case() {
      let group = Group::try_from(row("ARCHIVED")).unwrap();
      let value = serde_json::to_value(&group).unwrap();

      assert_eq!(value["createdAt"], json!("2024-03-01T09:30:00.000000Z"));
      assert_eq!(value["state"], json!("ARCHIVED"));
   }
}
