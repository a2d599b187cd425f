//! Running a complete sync.

use crate::catalog::VideoCatalogReader;
use crate::error::SyncError;
use crate::platform::{RecordsPlatform, VideoPlatform};
use crate::schema::{MissingTitlePolicy, SchemaReconciler};
use crate::upsert::{RecordUpserter, UpsertOutcome};
use std::fmt;
use tracing::instrument;

/// What to sync where.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// The name of the channel whose uploads to sync.
    pub channel_handle: String,
    /// The destination table.
    pub table_id: String,
    pub missing_title: MissingTitlePolicy,
}

/// The result of a sync that got as far as upserting.
///
/// `inserted + skipped + errors.len() == videos_found`.
#[derive(Debug, Default)]
pub struct SyncSummary {
    pub videos_found: usize,
    pub inserted: usize,
    pub skipped: usize,
    /// Failures of individual videos. These did not stop the sync.
    pub errors: Vec<SyncError>,
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} videos found, {} inserted, {} already present, {} failed",
            self.videos_found,
            self.inserted,
            self.skipped,
            self.errors.len()
        )
    }
}

/// Sequences a sync: reconcile the schema, read the catalog, upsert every video.
///
/// Everything runs on the calling task, one remote call at a time.
#[derive(Debug)]
pub struct SyncOrchestrator<V, R> {
    videos: V,
    records: R,
    settings: SyncSettings,
}

impl<V: VideoPlatform, R: RecordsPlatform> SyncOrchestrator<V, R> {
    pub fn new(videos: V, records: R, settings: SyncSettings) -> Self {
        Self {
            videos,
            records,
            settings,
        }
    }

    /// Runs one sync.
    ///
    /// Fails without touching any records if the schema can't be reconciled or the catalog
    /// can't be read. Once upserting starts, a video that fails is recorded in
    /// [`SyncSummary::errors`] and the remaining videos are still processed.
    #[instrument(
        skip(self),
        fields(channel = %self.settings.channel_handle, table = %self.settings.table_id)
    )]
    pub async fn run(&self) -> Result<SyncSummary, SyncError> {
        let table_id = self.settings.table_id.as_str();

        let report = SchemaReconciler::new(&self.records, self.settings.missing_title)
            .reconcile(table_id)
            .await?;

        let videos = VideoCatalogReader::new(&self.videos)
            .fetch_catalog(&self.settings.channel_handle)
            .await?;

        let upserter = RecordUpserter::new(&self.records, table_id, &report.schema);
        let mut summary = SyncSummary {
            videos_found: videos.len(),
            ..SyncSummary::default()
        };
        for video in &videos {
            match upserter.upsert(video).await {
                Ok(UpsertOutcome::Inserted) => summary.inserted += 1,
                Ok(UpsertOutcome::AlreadyExists) => summary.skipped += 1,
                Err(e) => {
                    tracing::warn!(video_id = %video.external_id, "{e}");
                    summary.errors.push(e);
                }
            }
        }

        tracing::info!(%summary, "sync complete");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockRecordsPlatform, MockVideoPlatform, playlist_item};
    use crate::records::DestinationSchema;
    use pretty_assertions::assert_eq;

    async fn setup() -> (
        SyncOrchestrator<MockVideoPlatform, MockRecordsPlatform>,
        MockVideoPlatform,
        MockRecordsPlatform,
    ) {
        let yt = MockVideoPlatform::new();
        yt.add_channel(
            "Creator",
            "UCcreator",
            vec![playlist_item("a1", "T1"), playlist_item("a2", "T2")],
        )
        .await;
        let notion = MockRecordsPlatform::new();
        let sync = SyncOrchestrator::new(
            yt.clone(),
            notion.clone(),
            SyncSettings {
                channel_handle: "Creator".to_string(),
                table_id: "table".to_string(),
                missing_title: MissingTitlePolicy::Fail,
            },
        );
        (sync, yt, notion)
    }

    fn counts(summary: &SyncSummary) -> (usize, usize, usize, usize) {
        (
            summary.videos_found,
            summary.inserted,
            summary.skipped,
            summary.errors.len(),
        )
    }

    #[tokio::test]
    async fn first_run_inserts_everything() {
        let (sync, _, notion) = setup().await;

        let summary = sync.run().await.unwrap();
        assert_eq!(counts(&summary), (2, 2, 0, 0));
        assert_eq!(notion.records().await.len(), 2);
    }

    #[tokio::test]
    async fn second_run_skips_everything() {
        let (sync, _, notion) = setup().await;

        sync.run().await.unwrap();
        let summary = sync.run().await.unwrap();
        assert_eq!(counts(&summary), (2, 0, 2, 0));
        assert_eq!(notion.records().await.len(), 2);
        // the second reconciliation found nothing to do
        assert_eq!(notion.applied_mutations().await.len(), 4);
    }

    #[tokio::test]
    async fn unknown_channel_aborts_before_upserting() {
        let (_, yt, notion) = setup().await;
        let sync = SyncOrchestrator::new(
            yt,
            notion.clone(),
            SyncSettings {
                channel_handle: "Nobody".to_string(),
                table_id: "table".to_string(),
                missing_title: MissingTitlePolicy::Fail,
            },
        );

        let err = sync.run().await.unwrap_err();
        assert!(matches!(err, SyncError::NotFound(_)), "{err}");
        assert_eq!(notion.query_calls().await, 0);
        assert_eq!(notion.create_calls().await, 0);
    }

    #[tokio::test]
    async fn failed_video_does_not_stop_the_rest() {
        let (sync, _, notion) = setup().await;
        notion.fail_creates_for("a1").await;

        let summary = sync.run().await.unwrap();
        assert_eq!(counts(&summary), (2, 1, 0, 1));
        assert!(matches!(summary.errors[0], SyncError::Upstream(_)));
        assert_eq!(notion.records().await.len(), 1);

        // the failed video is picked up by the next run
        notion.clear_failures().await;
        let summary = sync.run().await.unwrap();
        assert_eq!(counts(&summary), (2, 1, 1, 0));
    }

    #[tokio::test]
    async fn schema_failure_aborts_before_reading_catalog() {
        let (_, yt, _) = setup().await;
        let notion = MockRecordsPlatform::with_schema(DestinationSchema::new());
        let sync = SyncOrchestrator::new(
            yt.clone(),
            notion,
            SyncSettings {
                channel_handle: "Creator".to_string(),
                table_id: "table".to_string(),
                missing_title: MissingTitlePolicy::Fail,
            },
        );

        let err = sync.run().await.unwrap_err();
        assert!(matches!(err, SyncError::Schema(_)), "{err}");
        assert!(yt.calls().await.is_empty());
    }

    #[tokio::test]
    async fn video_platform_failure_aborts() {
        let (sync, yt, notion) = setup().await;
        yt.fail_with("401 Unauthorized").await;

        let err = sync.run().await.unwrap_err();
        assert!(matches!(err, SyncError::Upstream(_)), "{err}");
        assert_eq!(notion.create_calls().await, 0);
    }
}
