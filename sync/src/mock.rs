//! In-memory video and records platforms for testing syncs.
//!
//! Both mocks are cheap to clone and share their state between clones, so a test can hand one
//! clone to the code under test and keep another to set up failures and inspect the result.
//!
//! [`MockRecordsPlatform`] behaves like a small Notion database: schema changes are applied to
//! its schema, created records are stored and can be found again by query, and records that
//! write to a column the schema doesn't have (or has with a different type) are rejected.

use crate::platform::{RecordsPlatform, VideoPlatform};
use crate::records::{
    ColumnType, DestinationSchema, NewRecord, RecordFilter, RecordRef, SchemaMutation,
};
use crate::youtube_api::{
    Channel, ChannelContentDetails, PlaylistItem, PlaylistItemSnippet, RelatedPlaylists,
    ResourceId, SearchResult, Thumbnail, Thumbnails,
};
use eyre::Result;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Builds a playlist item for video `id`, with a `high` thumbnail and a fixed publish time.
pub fn playlist_item(id: &str, title: &str) -> PlaylistItem {
    PlaylistItem {
        id: format!("item-{id}"),
        snippet: PlaylistItemSnippet {
            published_at: jiff::Timestamp::from_second(1_700_000_000)
                .expect("fixed timestamp is in range"),
            title: title.to_string(),
            description: format!("about {title}"),
            thumbnails: Thumbnails {
                high: Some(Thumbnail {
                    url: format!("https://i.ytimg.com/vi/{id}/hqdefault.jpg"),
                    width: Some(480),
                    height: Some(360),
                }),
                ..Thumbnails::default()
            },
            resource_id: ResourceId {
                kind: "youtube#video".to_string(),
                channel_id: None,
                video_id: Some(id.to_string()),
            },
        },
    }
}

#[derive(Debug, Default)]
struct VideoState {
    /// channel name -> channel
    channels: HashMap<String, Channel>,
    /// playlist id -> items
    playlists: HashMap<String, Vec<PlaylistItem>>,
    /// Makes every call fail with this message.
    failure: Option<String>,
    calls: Vec<String>,
}

/// A video platform holding a fixed set of channels.
#[derive(Debug, Clone, Default)]
pub struct MockVideoPlatform {
    state: Arc<Mutex<VideoState>>,
}

impl MockVideoPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a channel called `name` whose uploads playlist contains `uploads`.
    pub async fn add_channel(&self, name: &str, channel_id: &str, uploads: Vec<PlaylistItem>) {
        let mut state = self.state.lock().await;
        let playlist_id = format!("UU{channel_id}");
        state.channels.insert(
            name.to_string(),
            Channel {
                id: channel_id.to_string(),
                content_details: ChannelContentDetails {
                    related_playlists: RelatedPlaylists {
                        uploads: playlist_id.clone(),
                    },
                },
            },
        );
        state.playlists.insert(playlist_id, uploads);
    }

    /// Makes every subsequent call fail.
    pub async fn fail_with(&self, message: &str) {
        self.state.lock().await.failure = Some(message.to_string());
    }

    /// The names of the calls made so far, in order.
    pub async fn calls(&self) -> Vec<String> {
        self.state.lock().await.calls.clone()
    }

    async fn record_call(&self, call: &str) -> Result<tokio::sync::MutexGuard<'_, VideoState>> {
        let mut state = self.state.lock().await;
        state.calls.push(call.to_string());
        if let Some(message) = &state.failure {
            eyre::bail!("{message}");
        }
        Ok(state)
    }
}

impl VideoPlatform for MockVideoPlatform {
    async fn search_channels(&self, query: &str) -> Result<Vec<SearchResult>> {
        let state = self.record_call("search_channels").await?;
        let query = query.to_lowercase();
        let mut names: Vec<_> = state
            .channels
            .keys()
            .filter(|name| name.to_lowercase().contains(&query))
            .collect();
        names.sort();
        Ok(names
            .into_iter()
            .map(|name| SearchResult::channel(state.channels[name].id.clone()))
            .collect())
    }

    async fn get_channel(&self, channel_id: &str) -> Result<Option<Channel>> {
        let state = self.record_call("get_channel").await?;
        Ok(state
            .channels
            .values()
            .find(|channel| channel.id == channel_id)
            .cloned())
    }

    async fn list_playlist_items(&self, playlist_id: &str) -> Result<Vec<PlaylistItem>> {
        let state = self.record_call("list_playlist_items").await?;
        Ok(state.playlists.get(playlist_id).cloned().unwrap_or_default())
    }
}

#[derive(Debug, Default)]
struct RecordsState {
    schema: DestinationSchema,
    records: Vec<NewRecord>,
    applied: Vec<SchemaMutation>,
    query_calls: usize,
    create_calls: usize,
    fail_schema_fetch: bool,
    /// Schema updates touching these columns fail.
    fail_updates_for: HashSet<String>,
    /// Creating a record whose `VideoID` is one of these fails.
    fail_creates_for: HashSet<String>,
}

/// A records platform holding a single table.
#[derive(Debug, Clone, Default)]
pub struct MockRecordsPlatform {
    state: Arc<Mutex<RecordsState>>,
}

impl MockRecordsPlatform {
    /// A table whose only column is the `Name` title column.
    pub fn new() -> Self {
        Self::with_schema([(crate::records::NAME_COLUMN, ColumnType::Title)].into_iter().collect())
    }

    pub fn with_schema(schema: DestinationSchema) -> Self {
        Self {
            state: Arc::new(Mutex::new(RecordsState {
                schema,
                ..RecordsState::default()
            })),
        }
    }

    pub async fn schema(&self) -> DestinationSchema {
        self.state.lock().await.schema.clone()
    }

    pub async fn records(&self) -> Vec<NewRecord> {
        self.state.lock().await.records.clone()
    }

    /// Every schema mutation applied so far.
    pub async fn applied_mutations(&self) -> Vec<SchemaMutation> {
        self.state.lock().await.applied.clone()
    }

    pub async fn query_calls(&self) -> usize {
        self.state.lock().await.query_calls
    }

    pub async fn create_calls(&self) -> usize {
        self.state.lock().await.create_calls
    }

    pub async fn fail_schema_fetch(&self, fail: bool) {
        self.state.lock().await.fail_schema_fetch = fail;
    }

    pub async fn fail_updates_for(&self, column: &str) {
        self.state
            .lock()
            .await
            .fail_updates_for
            .insert(column.to_string());
    }

    pub async fn clear_failures(&self) {
        let mut state = self.state.lock().await;
        state.fail_schema_fetch = false;
        state.fail_updates_for.clear();
        state.fail_creates_for.clear();
    }

    pub async fn fail_creates_for(&self, video_id: &str) {
        self.state
            .lock()
            .await
            .fail_creates_for
            .insert(video_id.to_string());
    }
}

impl RecordsPlatform for MockRecordsPlatform {
    async fn get_table_schema(&self, _table_id: &str) -> Result<DestinationSchema> {
        let state = self.state.lock().await;
        if state.fail_schema_fetch {
            eyre::bail!("503 Service Unavailable");
        }
        Ok(state.schema.clone())
    }

    async fn update_table_schema(&self, _table_id: &str, mutation: &SchemaMutation) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.fail_updates_for.contains(mutation.column()) {
            eyre::bail!("429 Too Many Requests");
        }
        if let SchemaMutation::Rename { from, to } = mutation {
            if state.schema.column(from).is_none() {
                eyre::bail!("property {from} does not exist");
            }
            if state.schema.column(to).is_some() {
                eyre::bail!("property {to} already exists");
            }
            for record in &mut state.records {
                if let Some(value) = record.fields.remove(from) {
                    record.fields.insert(to.clone(), value);
                }
            }
        }
        state.schema.apply(mutation);
        state.applied.push(mutation.clone());
        Ok(())
    }

    async fn query_records(
        &self,
        _table_id: &str,
        filter: &RecordFilter,
    ) -> Result<Vec<RecordRef>> {
        let mut state = self.state.lock().await;
        state.query_calls += 1;
        let RecordFilter::RichTextEquals { column, value } = filter;
        if !state.schema.has(column, ColumnType::RichText) {
            eyre::bail!("could not find rich_text property {column}");
        }
        Ok(state
            .records
            .iter()
            .enumerate()
            .filter(|(_, record)| {
                record.field(column).and_then(|v| v.as_text()) == Some(value.as_str())
            })
            .map(|(i, _)| RecordRef {
                id: format!("page-{i}"),
            })
            .collect())
    }

    async fn create_record(&self, _table_id: &str, record: &NewRecord) -> Result<RecordRef> {
        let mut state = self.state.lock().await;
        state.create_calls += 1;
        let video_id = record
            .field(crate::records::VIDEO_ID_COLUMN)
            .and_then(|v| v.as_text())
            .unwrap_or_default();
        if state.fail_creates_for.contains(video_id) {
            eyre::bail!("502 Bad Gateway");
        }
        for (column, value) in &record.fields {
            match state.schema.column(column) {
                None => eyre::bail!("{column} is not a property that exists"),
                Some(kind) if kind != value.column_type() => {
                    eyre::bail!("{column} is expected to be {kind}")
                }
                Some(_) => {}
            }
        }
        state.records.push(record.clone());
        Ok(RecordRef {
            id: format!("page-{}", state.records.len() - 1),
        })
    }
}
