//! YouTube Data API v3 client library.
//!
//! Only the read-only calls needed to enumerate a channel's uploads are implemented:
//!
//! 1. [`YouTubeClient::search_channels`] resolves a human-readable channel name to a channel ID
//! 2. [`YouTubeClient::get_channel`] finds the channel's uploads playlist
//! 3. [`YouTubeClient::list_playlist_items`] lists the videos in that playlist
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use youtube_notion_sync::youtube_api::YouTubeClient;
//!
//! # async fn example() -> eyre::Result<()> {
//! let client = YouTubeClient::new("my-api-key", reqwest::Client::new());
//!
//! let channels = client.search_channels("jonhoo").await?;
//! if let Some(channel_id) = channels.first().and_then(|c| c.channel_id()) {
//!     if let Some(channel) = client.get_channel(channel_id).await? {
//!         for item in client.list_playlist_items(channel.uploads_playlist_id()).await? {
//!             println!("{}", item.snippet.title);
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod channels;
pub mod client;
pub mod playlist_items;
pub mod search;
pub mod types;

pub use client::YouTubeClient;
pub use types::{PageInfo, ResourceId};

pub use channels::{Channel, ChannelContentDetails, RelatedPlaylists};
pub use playlist_items::{PlaylistItem, PlaylistItemSnippet, Thumbnail, Thumbnails};
pub use search::{SearchResult, SearchResultSnippet};
