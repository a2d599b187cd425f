//! The two remote systems a sync talks to.
//!
//! The sync components are generic over these traits rather than tied to the HTTP clients, so
//! that they can be driven by the in-memory doubles in `mock` under test.

use crate::records::{DestinationSchema, NewRecord, RecordFilter, RecordRef, SchemaMutation};
use crate::youtube_api::{Channel, PlaylistItem, SearchResult};

/// Read-only access to a video platform.
#[allow(async_fn_in_trait)]
pub trait VideoPlatform {
    /// Searches for channels matching `query`, restricted to channel-typed results.
    async fn search_channels(&self, query: &str) -> eyre::Result<Vec<SearchResult>>;

    /// Looks up a channel by ID. `Ok(None)` means the platform has no such channel.
    async fn get_channel(&self, channel_id: &str) -> eyre::Result<Option<Channel>>;

    /// Lists the first page of items in a playlist.
    async fn list_playlist_items(&self, playlist_id: &str) -> eyre::Result<Vec<PlaylistItem>>;
}

/// Access to a structured-records platform holding the destination table.
#[allow(async_fn_in_trait)]
pub trait RecordsPlatform {
    async fn get_table_schema(&self, table_id: &str) -> eyre::Result<DestinationSchema>;

    /// Applies one schema change. Not transactional with any other call.
    async fn update_table_schema(
        &self,
        table_id: &str,
        mutation: &SchemaMutation,
    ) -> eyre::Result<()>;

    async fn query_records(
        &self,
        table_id: &str,
        filter: &RecordFilter,
    ) -> eyre::Result<Vec<RecordRef>>;

    async fn create_record(&self, table_id: &str, record: &NewRecord) -> eyre::Result<RecordRef>;
}
