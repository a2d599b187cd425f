//! Notion page and database query API types.
//!
//! Every row of a Notion database is a page whose properties follow the database schema.

use crate::records::{FieldValue, NewRecord, RecordFilter};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Notion rejects text objects longer than this many UTF-16 code units.
///
/// See: <https://developers.notion.com/reference/request-limits#limits-for-property-values>
const MAX_TEXT_CONTENT: usize = 2000;

/// Body of `POST /v1/databases/{id}/query`.
///
/// See: <https://developers.notion.com/reference/post-database-query>
#[derive(Debug, Serialize)]
pub struct DatabaseQueryRequest {
    pub filter: PropertyFilter,
    pub page_size: u32,
}

/// A filter on a single property.
///
/// See: <https://developers.notion.com/reference/post-database-query-filter>
#[derive(Debug, Serialize)]
pub struct PropertyFilter {
    pub property: String,
    pub rich_text: TextCondition,
}

#[derive(Debug, Serialize)]
pub struct TextCondition {
    pub equals: String,
}

impl From<&RecordFilter> for DatabaseQueryRequest {
    fn from(filter: &RecordFilter) -> Self {
        match filter {
            RecordFilter::RichTextEquals { column, value } => Self {
                filter: PropertyFilter {
                    property: column.clone(),
                    rich_text: TextCondition {
                        equals: value.clone(),
                    },
                },
                // we only ever care whether there is at least one match
                page_size: 1,
            },
        }
    }
}

/// Response of a database query.
#[derive(Debug, Deserialize)]
pub struct DatabaseQueryResponse {
    pub results: Vec<Page>,
    #[serde(default)]
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

/// A page, reduced to the parts we read back.
///
/// See: <https://developers.notion.com/reference/page>
#[derive(Debug, Deserialize)]
pub struct Page {
    pub id: String,
    pub url: Option<String>,
}

/// Body of `POST /v1/pages`.
///
/// See: <https://developers.notion.com/reference/post-page>
#[derive(Debug, Serialize)]
pub struct CreatePageRequest {
    pub parent: Parent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<Cover>,
    pub properties: BTreeMap<String, PropertyValue>,
}

#[derive(Debug, Serialize)]
pub struct Parent {
    pub database_id: String,
}

/// A page cover pointing at an externally hosted image.
#[derive(Debug, Serialize)]
pub struct Cover {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub external: ExternalFile,
}

#[derive(Debug, Serialize)]
pub struct ExternalFile {
    pub url: String,
}

/// The value of one page property, keyed by its type.
///
/// See: <https://developers.notion.com/reference/page-property-values>
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyValue {
    Title(Vec<RichText>),
    RichText(Vec<RichText>),
    Url(String),
    Date(DateValue),
}

#[derive(Debug, Serialize)]
pub struct RichText {
    pub text: TextContent,
}

#[derive(Debug, Serialize)]
pub struct TextContent {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct DateValue {
    /// ISO 8601 date or date-time.
    pub start: String,
}

/// Splits `content` into as many text objects as needed to stay within Notion's per-object
/// length limit.
///
/// YouTube descriptions may be up to 5000 characters long, which a single text object cannot
/// hold. Notion measures length in UTF-16 code units, so a character outside the Basic
/// Multilingual Plane (most emoji) counts twice. Chunks only ever break between characters.
/// An empty string yields an empty array, which Notion treats as an empty value.
fn rich_text(content: &str) -> Vec<RichText> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut units = 0;
    for (i, c) in content.char_indices() {
        if units + c.len_utf16() > MAX_TEXT_CONTENT {
            chunks.push(&content[start..i]);
            start = i;
            units = 0;
        }
        units += c.len_utf16();
    }
    if start < content.len() {
        chunks.push(&content[start..]);
    }

    chunks
        .into_iter()
        .map(|chunk| RichText {
            text: TextContent {
                content: chunk.to_string(),
            },
        })
        .collect()
}

impl From<&FieldValue> for PropertyValue {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::Title(s) => PropertyValue::Title(rich_text(s)),
            FieldValue::RichText(s) => PropertyValue::RichText(rich_text(s)),
            FieldValue::Url(s) => PropertyValue::Url(s.clone()),
            FieldValue::Date(ts) => PropertyValue::Date(DateValue {
                start: ts.to_string(),
            }),
        }
    }
}

impl CreatePageRequest {
    pub fn new(database_id: &str, record: &NewRecord) -> Self {
        Self {
            parent: Parent {
                database_id: database_id.to_string(),
            },
            cover: record.cover_url.as_ref().map(|url| Cover {
                kind: "external",
                external: ExternalFile { url: url.clone() },
            }),
            properties: record
                .fields
                .iter()
                .map(|(column, value)| (column.clone(), PropertyValue::from(value)))
                .collect(),
        }
    }
}
