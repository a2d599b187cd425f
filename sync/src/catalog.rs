//! Reading a channel's video catalog.

use crate::error::SyncError;
use crate::platform::VideoPlatform;
use crate::youtube_api::PlaylistItem;
use jiff::Timestamp;
use tracing::instrument;

const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// A video as it will be written to the destination table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRecord {
    /// The platform's video ID. Unique, and the deduplication key for the destination.
    pub external_id: String,
    pub title: String,
    pub description: String,
    /// Canonical watch URL, derived from `external_id`.
    pub url: String,
    /// The highest-resolution thumbnail available, if any.
    pub thumbnail_url: Option<String>,
    pub uploaded_at: Timestamp,
}

impl VideoRecord {
    /// The canonical watch URL of a video.
    pub fn watch_url(video_id: &str) -> String {
        format!("{WATCH_URL_PREFIX}{video_id}")
    }

    /// Normalizes a playlist item. Returns `None` for items that don't point at a video.
    pub fn from_playlist_item(item: PlaylistItem) -> Option<Self> {
        let thumbnail_url = item.snippet.thumbnails.best().map(|t| t.url.clone());
        let external_id = item.snippet.resource_id.video_id?;
        Some(Self {
            url: Self::watch_url(&external_id),
            external_id,
            title: item.snippet.title,
            description: item.snippet.description,
            thumbnail_url,
            uploaded_at: item.snippet.published_at,
        })
    }
}

/// Fetches the videos a channel has uploaded.
#[derive(Debug)]
pub struct VideoCatalogReader<'a, V> {
    videos: &'a V,
}

impl<'a, V: VideoPlatform> VideoCatalogReader<'a, V> {
    pub fn new(videos: &'a V) -> Self {
        Self { videos }
    }

    /// Resolves `channel_handle` and returns the videos on the first page of its uploads.
    ///
    /// Fails with [`SyncError::NotFound`] if no channel matches the handle or if the channel
    /// has no uploads. Items that no longer point at a video (deleted or private) don't count
    /// as uploads. Fails with [`SyncError::Upstream`] if the platform can't be reached.
    #[instrument(skip(self))]
    pub async fn fetch_catalog(&self, channel_handle: &str) -> Result<Vec<VideoRecord>, SyncError> {
        let results = self
            .videos
            .search_channels(channel_handle)
            .await
            .map_err(|e| SyncError::upstream(e, "search for channel"))?;
        let Some(channel_id) = results.iter().find_map(|r| r.channel_id()) else {
            return Err(SyncError::NotFound("channel not found".to_string()));
        };
        tracing::debug!(channel_id, "resolved channel");

        let channel = self
            .videos
            .get_channel(channel_id)
            .await
            .map_err(|e| SyncError::upstream(e, format!("fetch channel {channel_id}")))?
            .ok_or_else(|| SyncError::NotFound("channel not found".to_string()))?;

        let items = self
            .videos
            .list_playlist_items(channel.uploads_playlist_id())
            .await
            .map_err(|e| SyncError::upstream(e, "list uploaded videos"))?;

        let videos: Vec<_> = items
            .into_iter()
            .filter_map(|item| {
                let item_id = item.id.clone();
                let video = VideoRecord::from_playlist_item(item);
                if video.is_none() {
                    tracing::warn!(item_id, "playlist item has no video id; skipping");
                }
                video
            })
            .collect();
        if videos.is_empty() {
            return Err(SyncError::NotFound("no videos in playlist".to_string()));
        }

        tracing::info!(count = videos.len(), "fetched videos");
        Ok(videos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockVideoPlatform, playlist_item};
    use crate::youtube_api::Thumbnail;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalize_playlist_item() {
        let mut item = playlist_item("a1", "T1");
        item.snippet.thumbnails.maxres = Some(Thumbnail {
            url: "https://i.ytimg.com/vi/a1/maxresdefault.jpg".to_string(),
            width: Some(1280),
            height: Some(720),
        });
        let uploaded_at = item.snippet.published_at;

        assert_eq!(
            VideoRecord::from_playlist_item(item),
            Some(VideoRecord {
                external_id: "a1".to_string(),
                title: "T1".to_string(),
                description: "about T1".to_string(),
                url: "https://www.youtube.com/watch?v=a1".to_string(),
                thumbnail_url: Some("https://i.ytimg.com/vi/a1/maxresdefault.jpg".to_string()),
                uploaded_at,
            })
        );
    }

    #[tokio::test]
    async fn fetches_uploads_of_matching_channel() {
        let yt = MockVideoPlatform::new();
        yt.add_channel("Some Other Creator", "UCother", vec![playlist_item("zz", "nope")])
            .await;
        yt.add_channel(
            "Creator",
            "UCcreator",
            vec![playlist_item("a1", "T1"), playlist_item("a2", "T2")],
        )
        .await;

        let videos = VideoCatalogReader::new(&yt)
            .fetch_catalog("creator")
            .await
            .unwrap();

        assert_eq!(
            videos.iter().map(|v| v.external_id.as_str()).collect::<Vec<_>>(),
            vec!["a1", "a2"]
        );
        assert_eq!(
            yt.calls().await,
            vec!["search_channels", "get_channel", "list_playlist_items"]
        );
    }

    #[tokio::test]
    async fn unknown_channel_is_not_found() {
        let yt = MockVideoPlatform::new();
        let err = VideoCatalogReader::new(&yt)
            .fetch_catalog("nobody")
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::NotFound(ref m) if m == "channel not found"));
        assert_eq!(yt.calls().await, vec!["search_channels"]);
    }

    #[tokio::test]
    async fn empty_uploads_is_not_found() {
        let yt = MockVideoPlatform::new();
        yt.add_channel("Creator", "UCcreator", Vec::new()).await;
        let err = VideoCatalogReader::new(&yt)
            .fetch_catalog("Creator")
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::NotFound(ref m) if m == "no videos in playlist"));
    }

    #[tokio::test]
    async fn items_without_video_are_skipped() {
        let mut deleted = playlist_item("gone", "Deleted video");
        deleted.snippet.resource_id.video_id = None;
        let yt = MockVideoPlatform::new();
        yt.add_channel("Creator", "UCcreator", vec![deleted, playlist_item("a1", "T1")])
            .await;

        let videos = VideoCatalogReader::new(&yt)
            .fetch_catalog("Creator")
            .await
            .unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].external_id, "a1");
    }

    #[tokio::test]
    async fn only_deleted_uploads_is_not_found() {
        let mut deleted = playlist_item("gone", "Deleted video");
        deleted.snippet.resource_id.video_id = None;
        let yt = MockVideoPlatform::new();
        yt.add_channel("Creator", "UCcreator", vec![deleted]).await;

        let err = VideoCatalogReader::new(&yt)
            .fetch_catalog("Creator")
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::NotFound(ref m) if m == "no videos in playlist"));
    }

    #[tokio::test]
    async fn platform_failure_is_upstream() {
        let yt = MockVideoPlatform::new();
        yt.fail_with("403 quotaExceeded").await;
        let err = VideoCatalogReader::new(&yt)
            .fetch_catalog("Creator")
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Upstream(_)));
        assert!(err.to_string().contains("quotaExceeded"), "{err}");
    }
}
