//! Syncs a YouTube channel's uploads into a Notion database.
//!
//! A sync is three steps, run strictly in order by [`SyncOrchestrator`]:
//!
//! 1. [`SchemaReconciler`] makes sure the database has the columns a video record needs
//! 2. [`VideoCatalogReader`] lists the channel's uploaded videos
//! 3. [`RecordUpserter`] inserts every video the database doesn't have yet
//!
//! The components talk to the two platforms through the [`VideoPlatform`] and
//! [`RecordsPlatform`] traits, implemented by [`youtube_api::YouTubeClient`] and
//! [`notion_api::NotionClient`].

pub mod catalog;
pub mod config;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod notion_api;
pub mod platform;
pub mod records;
pub mod schema;
pub mod sync;
pub mod upsert;
pub mod youtube_api;

pub use catalog::{VideoCatalogReader, VideoRecord};
pub use config::Config;
pub use error::SyncError;
pub use platform::{RecordsPlatform, VideoPlatform};
pub use schema::{MissingTitlePolicy, ReconcileReport, SchemaReconciler};
pub use sync::{SyncOrchestrator, SyncSettings, SyncSummary};
pub use upsert::{RecordUpserter, UpsertOutcome};
