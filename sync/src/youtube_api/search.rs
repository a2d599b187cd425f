//! YouTube Search API types.

use crate::youtube_api::types::{PageInfo, ResourceId};
use serde::{Deserialize, Serialize};

/// Response structure for the `search.list` API call.
///
/// See: <https://developers.google.com/youtube/v3/docs/search/list>
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchListResponse {
    /// The value will be `youtube#searchListResponse`.
    pub kind: String,
    #[serde(default)]
    pub items: Vec<SearchResult>,
    #[serde(rename = "pageInfo", default)]
    pub page_info: PageInfo,
}

/// A search result points at a single channel, video or playlist.
///
/// See: <https://developers.google.com/youtube/v3/docs/search#resource>
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: ResourceId,
    pub snippet: Option<SearchResultSnippet>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResultSnippet {
    pub title: String,
}

impl SearchResult {
    /// Builds a channel-typed result, the only kind this crate ever asks for.
    pub fn channel(channel_id: impl Into<String>) -> Self {
        Self {
            id: ResourceId {
                kind: "youtube#channel".to_string(),
                channel_id: Some(channel_id.into()),
                video_id: None,
            },
            snippet: None,
        }
    }

    /// The channel ID, if this result refers to a channel.
    pub fn channel_id(&self) -> Option<&str> {
        self.id.channel_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_channel_search() {
        let response: SearchListResponse = serde_json::from_value(serde_json::json! {{
            "kind": "youtube#searchListResponse",
            "etag": "abc",
            "nextPageToken": "CAEQAA",
            "regionCode": "NO",
            "pageInfo": { "totalResults": 1000, "resultsPerPage": 1 },
            "items": [
                {
                    "kind": "youtube#searchResult",
                    "etag": "def",
                    "id": { "kind": "youtube#channel", "channelId": "UC_x5XG1OV2P6uZZ5FSM9Ttw" },
                    "snippet": {
                        "publishedAt": "2015-07-27T20:31:40Z",
                        "channelId": "UC_x5XG1OV2P6uZZ5FSM9Ttw",
                        "title": "Jon Gjengset",
                        "description": "Rust videos",
                        "channelTitle": "Jon Gjengset",
                        "liveBroadcastContent": "none"
                    }
                }
            ]
        }})
        .unwrap();

        assert_eq!(response.page_info.total_results, 1000);
        assert_eq!(response.items.len(), 1);
        let result = &response.items[0];
        assert_eq!(result.id.kind, "youtube#channel");
        assert_eq!(result.channel_id(), Some("UC_x5XG1OV2P6uZZ5FSM9Ttw"));
        assert_eq!(
            result.snippet.as_ref().map(|s| s.title.as_str()),
            Some("Jon Gjengset")
        );
    }

    #[test]
    fn parse_search_without_snippet_or_items() {
        let response: SearchListResponse = serde_json::from_value(serde_json::json! {{
            "kind": "youtube#searchListResponse",
            "items": [
                {
                    "kind": "youtube#searchResult",
                    "id": { "kind": "youtube#video", "videoId": "v1" }
                }
            ]
        }})
        .unwrap();
        assert!(response.items[0].snippet.is_none());
        assert_eq!(response.items[0].channel_id(), None);

        let empty: SearchListResponse = serde_json::from_value(serde_json::json! {{
            "kind": "youtube#searchListResponse",
            "pageInfo": { "totalResults": 0, "resultsPerPage": 1 }
        }})
        .unwrap();
        assert!(empty.items.is_empty());
    }
}
