//! Notion database API types.

use crate::records::{ColumnType, DestinationSchema, SchemaMutation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A `database` object as returned by `GET /v1/databases/{id}`.
///
/// Only the property schema is read.
///
/// See: <https://developers.notion.com/reference/database>
#[derive(Debug, Deserialize)]
pub struct Database {
    pub id: String,
    /// Property schema keyed by property name.
    pub properties: BTreeMap<String, PropertySchema>,
}

/// One property (column) of a database.
///
/// See: <https://developers.notion.com/reference/property-object>
#[derive(Debug, Deserialize)]
pub struct PropertySchema {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ColumnType,
}

impl Database {
    pub fn schema(&self) -> DestinationSchema {
        self.properties
            .iter()
            .map(|(name, property)| (name.clone(), property.kind))
            .collect()
    }
}

/// Body of `PATCH /v1/databases/{id}`.
///
/// Properties that are not mentioned are left untouched. A property keyed by a name that does
/// not exist yet is created; an existing property given a type configuration is converted to
/// that type; an existing property given a `name` is renamed.
///
/// See: <https://developers.notion.com/reference/update-a-database>
#[derive(Debug, Serialize)]
pub struct DatabaseUpdateRequest {
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl From<&SchemaMutation> for DatabaseUpdateRequest {
    fn from(mutation: &SchemaMutation) -> Self {
        let (key, value) = match mutation {
            SchemaMutation::Rename { from, to } => {
                (from.clone(), serde_json::json!({ "name": to }))
            }
            SchemaMutation::Create { column, kind }
            | SchemaMutation::Retype {
                column, to: kind, ..
            } => (column.clone(), serde_json::json!({ kind.to_string(): {} })),
        };
        Self {
            properties: BTreeMap::from([(key, value)]),
        }
    }
}
