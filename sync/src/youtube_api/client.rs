//! Core YouTube API client functionality.

use crate::platform::VideoPlatform;
use crate::youtube_api::{
    channels::{Channel, ChannelListResponse},
    playlist_items::{PlaylistItem, PlaylistItemListResponse},
    search::{SearchListResponse, SearchResult},
};
use eyre::Context;
use http::Method;
use serde::de::DeserializeOwned;
use std::fmt;
use tracing::instrument;

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Largest page size the YouTube API accepts for list calls.
const MAX_PAGE_SIZE: &str = "50";

/// Query for `search.list` that returns only the best-matching channel.
fn channel_search_params(query: &str) -> [(&'static str, &str); 4] {
    [
        ("part", "snippet"),
        ("type", "channel"),
        ("q", query),
        // the first channel result wins, so there's no point paying for more
        ("maxResults", "1"),
    ]
}

/// Client for the public, read-only parts of the YouTube Data API v3.
///
/// All calls are authenticated with an API key passed as the `key` query parameter, which is
/// sufficient for reading public channel and playlist data. No OAuth flow is involved.
#[derive(Clone)]
pub struct YouTubeClient {
    /// API key from the Google Cloud console.
    api_key: String,
    /// HTTP client for API requests
    client: reqwest::Client,
}

impl fmt::Debug for YouTubeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YouTubeClient")
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl YouTubeClient {
    /// Creates a new YouTube API client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - API key with the YouTube Data API v3 enabled
    /// * `client` - Shared HTTP client for making API requests
    pub fn new(api_key: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            api_key: api_key.into(),
            client,
        }
    }

    /// Makes a keyed GET request to a YouTube API list endpoint and parses the JSON response.
    ///
    /// Non-success statuses are turned into errors that include the response body, since that
    /// is where YouTube explains quota and key problems.
    #[instrument(skip(self), level = tracing::Level::TRACE)]
    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        query_params: &[(&str, &str)],
    ) -> eyre::Result<T> {
        let url = format!("{API_BASE}/{resource}");
        let method = Method::GET;

        let response = self
            .client
            .request(method.clone(), &url)
            .query(query_params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            // the request URL carries the API key
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("send {} request to YouTube API: {}", method, url))?;

        let status_code = response.status();
        if !status_code.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(eyre::eyre!(
                "YouTube API {} request failed with status {}: {}",
                method,
                status_code,
                error_text
            ));
        }

        response
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("parse YouTube {resource} API response as JSON"))
    }

    /// Searches for channels whose name matches `query`.
    ///
    /// Uses the `search.list` API restricted to `type=channel`, so every returned
    /// [`SearchResult`] carries a channel ID. Results are in YouTube's relevance order.
    ///
    /// # API Cost
    ///
    /// This operation costs 100 quota units per call.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/search/list>
    #[instrument(skip(self))]
    pub async fn search_channels(&self, query: &str) -> eyre::Result<Vec<SearchResult>> {
        let query_params = channel_search_params(query);

        let response: SearchListResponse = self.get_json("search", &query_params).await?;

        tracing::debug!(
            total_results = response.page_info.total_results,
            returned_items = response.items.len(),
            "searched channels"
        );

        Ok(response.items)
    }

    /// Gets a single channel by ID, including its related playlists.
    ///
    /// Returns `None` if YouTube knows no channel with that ID.
    ///
    /// # API Cost
    ///
    /// This operation costs 1 quota unit per call.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/channels/list>
    #[instrument(skip(self))]
    pub async fn get_channel(&self, channel_id: &str) -> eyre::Result<Option<Channel>> {
        let query_params = [("part", "contentDetails"), ("id", channel_id)];

        let response: ChannelListResponse = self.get_json("channels", &query_params).await?;

        tracing::debug!(
            channel_id,
            returned_items = response.items.len(),
            "fetched channel"
        );

        Ok(response.items.into_iter().next())
    }

    /// Lists the items of a playlist.
    ///
    /// Only the first page (up to 50 items) is fetched. Channels with more uploads than that
    /// will only have their most recent 50 videos returned.
    ///
    /// # API Cost
    ///
    /// This operation costs 1 quota unit per call.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/playlistItems/list>
    #[instrument(skip(self))]
    pub async fn list_playlist_items(&self, playlist_id: &str) -> eyre::Result<Vec<PlaylistItem>> {
        let query_params = [
            ("part", "snippet"),
            ("playlistId", playlist_id),
            ("maxResults", MAX_PAGE_SIZE),
        ];

        let response: PlaylistItemListResponse =
            self.get_json("playlistItems", &query_params).await?;

        tracing::debug!(
            total_results = response.page_info.total_results,
            returned_items = response.items.len(),
            "fetched playlist items"
        );
        if response.next_page_token.is_some() {
            tracing::debug!(
                playlist_id,
                "playlist has more pages; only the first page is synced"
            );
        }

        Ok(response.items)
    }
}

impl VideoPlatform for YouTubeClient {
    async fn search_channels(&self, query: &str) -> eyre::Result<Vec<SearchResult>> {
        YouTubeClient::search_channels(self, query).await
    }

    async fn get_channel(&self, channel_id: &str) -> eyre::Result<Option<Channel>> {
        YouTubeClient::get_channel(self, channel_id).await
    }

    async fn list_playlist_items(&self, playlist_id: &str) -> eyre::Result<Vec<PlaylistItem>> {
        YouTubeClient::list_playlist_items(self, playlist_id).await
    }
}
