//! YouTube PlaylistItems API types.
//!
//! A channel's uploads are exposed as an ordinary playlist, so listing the items of the
//! uploads playlist is how we enumerate a channel's videos (1 quota unit per page, as opposed
//! to 100 for `search.list`).

use crate::youtube_api::types::{PageInfo, ResourceId};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Response structure for the `playlistItems.list` API call.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlistItems/list>
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaylistItemListResponse {
    /// The value will be `youtube#playlistItemListResponse`.
    pub kind: String,
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
    #[serde(rename = "pageInfo", default)]
    pub page_info: PageInfo,
    /// Token for the next page of results.
    ///
    /// We only ever read the first page, so this is used for diagnostics only.
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

/// A `playlistItem` resource identifies another resource, such as a video, that is included in
/// a playlist.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlistItems#resource>
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItem {
    /// The ID of the playlist item itself (not of the video).
    pub id: String,
    pub snippet: PlaylistItemSnippet,
}

/// See: <https://developers.google.com/youtube/v3/docs/playlistItems#snippet>
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItemSnippet {
    /// The date and time that the item was added to the playlist.
    ///
    /// For the uploads playlist this is the video's publish time.
    #[serde(rename = "publishedAt")]
    pub published_at: Timestamp,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Thumbnails keyed by resolution name.
    ///
    /// Private and deleted videos come back without any thumbnails.
    #[serde(default)]
    pub thumbnails: Thumbnails,
    /// The video that the playlist item points at.
    #[serde(rename = "resourceId")]
    pub resource_id: ResourceId,
}

/// The available thumbnail renditions of a video.
///
/// See: <https://developers.google.com/youtube/v3/docs/thumbnails>
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Thumbnails {
    /// 120x90
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Thumbnail>,
    /// 320x180
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medium: Option<Thumbnail>,
    /// 480x360
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<Thumbnail>,
    /// 640x480
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard: Option<Thumbnail>,
    /// 1280x720
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxres: Option<Thumbnail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl Thumbnails {
    /// Returns the highest-resolution thumbnail that is present.
    ///
    /// Not every video has every rendition (`maxres` and `standard` in particular only exist
    /// for high-resolution uploads), so we walk down the quality ladder until we find one.
    pub fn best(&self) -> Option<&Thumbnail> {
        [
            &self.maxres,
            &self.standard,
            &self.high,
            &self.medium,
            &self.default,
        ]
        .into_iter()
        .find_map(Option::as_ref)
    }
}

impl PlaylistItem {
    /// The ID of the video this item refers to.
    pub fn video_id(&self) -> Option<&str> {
        self.snippet.resource_id.video_id.as_deref()
    }
}
