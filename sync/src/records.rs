//! Platform-neutral model of the destination table.
//!
//! These types describe what the reconciler and upserter need to know about the records
//! platform. The Notion client translates them to and from its wire format.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The single title column every destination table must have.
pub const NAME_COLUMN: &str = "Name";
pub const DESCRIPTION_COLUMN: &str = "Description";
pub const URL_COLUMN: &str = "URL";
/// Holds the video's external ID; the deduplication key.
pub const VIDEO_ID_COLUMN: &str = "VideoID";
pub const UPLOADED_AT_COLUMN: &str = "UploadedAt";

/// The type of a column in the destination table.
///
/// Serialized with the Notion property type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Title,
    RichText,
    Url,
    Date,
    /// Any column type this crate never reads or writes (numbers, selects, relations, ...).
    #[serde(other)]
    Unsupported,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Title => "title",
            ColumnType::RichText => "rich_text",
            ColumnType::Url => "url",
            ColumnType::Date => "date",
            ColumnType::Unsupported => "unsupported",
        };
        f.write_str(name)
    }
}

/// The column definitions of a destination table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestinationSchema {
    columns: BTreeMap<String, ColumnType>,
}

impl DestinationSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// The type of column `name`, if it exists.
    pub fn column(&self, name: &str) -> Option<ColumnType> {
        self.columns.get(name).copied()
    }

    /// Whether column `name` exists with type `kind`.
    pub fn has(&self, name: &str, kind: ColumnType) -> bool {
        self.column(name) == Some(kind)
    }

    /// Names of all title-typed columns, in name order.
    pub fn title_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(|(_, kind)| **kind == ColumnType::Title)
            .map(|(name, _)| name.as_str())
    }

    /// Updates the schema as if `mutation` had been applied remotely.
    pub fn apply(&mut self, mutation: &SchemaMutation) {
        match mutation {
            SchemaMutation::Rename { from, to } => {
                if let Some(kind) = self.columns.remove(from) {
                    self.columns.insert(to.clone(), kind);
                }
            }
            SchemaMutation::Create { column, kind } => {
                self.columns.insert(column.clone(), *kind);
            }
            SchemaMutation::Retype { column, to, .. } => {
                self.columns.insert(column.clone(), *to);
            }
        }
    }
}

impl<S: Into<String>> FromIterator<(S, ColumnType)> for DestinationSchema {
    fn from_iter<I: IntoIterator<Item = (S, ColumnType)>>(iter: I) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(name, kind)| (name.into(), kind))
                .collect(),
        }
    }
}

/// A single change to a table's columns.
///
/// Each mutation is one remote call; there is no batching and no transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaMutation {
    Rename { from: String, to: String },
    Create { column: String, kind: ColumnType },
    /// Changes the type of an existing column in place.
    Retype {
        column: String,
        from: ColumnType,
        to: ColumnType,
    },
}

impl SchemaMutation {
    /// The column name after the mutation.
    pub fn column(&self) -> &str {
        match self {
            SchemaMutation::Rename { to, .. } => to,
            SchemaMutation::Create { column, .. } | SchemaMutation::Retype { column, .. } => {
                column
            }
        }
    }
}

impl fmt::Display for SchemaMutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaMutation::Rename { from, to } => write!(f, "renamed \"{from}\" to \"{to}\""),
            SchemaMutation::Create { column, kind } => {
                write!(f, "added \"{column}\" property of type \"{kind}\"")
            }
            SchemaMutation::Retype { column, from, to } => {
                write!(f, "changed \"{column}\" from type \"{from}\" to \"{to}\"")
            }
        }
    }
}

/// A typed value for one column of a new record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Title(String),
    RichText(String),
    Url(String),
    Date(Timestamp),
}

impl FieldValue {
    pub fn column_type(&self) -> ColumnType {
        match self {
            FieldValue::Title(_) => ColumnType::Title,
            FieldValue::RichText(_) => ColumnType::RichText,
            FieldValue::Url(_) => ColumnType::Url,
            FieldValue::Date(_) => ColumnType::Date,
        }
    }

    /// The textual content of the value, for matching against filters.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Title(s) | FieldValue::RichText(s) | FieldValue::Url(s) => Some(s),
            FieldValue::Date(_) => None,
        }
    }
}

/// A record to be created in the destination table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewRecord {
    /// External image shown as the record's cover.
    pub cover_url: Option<String>,
    pub fields: BTreeMap<String, FieldValue>,
}

impl NewRecord {
    pub fn field(&self, column: &str) -> Option<&FieldValue> {
        self.fields.get(column)
    }
}

/// Selects records in the destination table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordFilter {
    /// Exact match on a rich-text column.
    RichTextEquals { column: String, value: String },
}

/// A handle to a record that exists in the destination table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRef {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unknown_column_types_deserialize() {
        let kinds: Vec<ColumnType> =
            serde_json::from_value(serde_json::json!(["title", "rich_text", "multi_select"]))
                .unwrap();
        assert_eq!(
            kinds,
            vec![
                ColumnType::Title,
                ColumnType::RichText,
                ColumnType::Unsupported
            ]
        );
    }

    #[test]
    fn apply_tracks_remote_mutations() {
        let mut schema: DestinationSchema =
            [("Topic", ColumnType::Title), ("URL", ColumnType::RichText)]
                .into_iter()
                .collect();

        schema.apply(&SchemaMutation::Rename {
            from: "Topic".into(),
            to: NAME_COLUMN.into(),
        });
        schema.apply(&SchemaMutation::Retype {
            column: URL_COLUMN.into(),
            from: ColumnType::RichText,
            to: ColumnType::Url,
        });
        schema.apply(&SchemaMutation::Create {
            column: UPLOADED_AT_COLUMN.into(),
            kind: ColumnType::Date,
        });

        let expected: DestinationSchema = [
            (NAME_COLUMN, ColumnType::Title),
            (URL_COLUMN, ColumnType::Url),
            (UPLOADED_AT_COLUMN, ColumnType::Date),
        ]
        .into_iter()
        .collect();
        assert_eq!(schema, expected);
        assert_eq!(schema.title_columns().collect::<Vec<_>>(), vec![NAME_COLUMN]);
    }

    #[test]
    fn mutations_describe_themselves() {
        assert_eq!(
            SchemaMutation::Create {
                column: "Description".into(),
                kind: ColumnType::RichText
            }
            .to_string(),
            "added \"Description\" property of type \"rich_text\""
        );
        assert_eq!(
            SchemaMutation::Rename {
                from: "Topic".into(),
                to: "Name".into()
            }
            .to_string(),
            "renamed \"Topic\" to \"Name\""
        );
    }
}
