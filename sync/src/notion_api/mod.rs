//! Notion API client library.
//!
//! Implements the four calls a sync needs against a Notion database: reading and updating its
//! property schema, querying its rows, and creating new rows.

pub mod client;
pub mod databases;
pub mod pages;

pub use client::NotionClient;
pub use databases::{Database, DatabaseUpdateRequest, PropertySchema};
pub use pages::{CreatePageRequest, DatabaseQueryRequest, DatabaseQueryResponse, Page};
