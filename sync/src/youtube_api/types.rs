//! Shared types for the YouTube API client.

use serde::{Deserialize, Serialize};

/// Paging details for lists of resources.
///
/// Includes the total number of items available and the number of resources
/// returned in a single page response.
///
/// See: <https://developers.google.com/youtube/v3/docs/pageInfo>
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageInfo {
    /// The total number of results in the result set.
    #[serde(rename = "totalResults")]
    pub total_results: u32,
    /// The number of results included in the API response.
    #[serde(rename = "resultsPerPage")]
    pub results_per_page: u32,
}

/// Identifies the resource a search result or playlist item points at.
///
/// Only the ID matching `kind` is populated: `channelId` for channels, `videoId` for videos.
///
/// See: <https://developers.google.com/youtube/v3/docs/search#id>
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceId {
    /// The type of the API resource, e.g. `youtube#channel` or `youtube#video`.
    pub kind: String,
    #[serde(rename = "channelId", skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(rename = "videoId", skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
}
