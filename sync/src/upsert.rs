//! Inserting videos into the destination table without duplicating them.

use crate::catalog::VideoRecord;
use crate::error::SyncError;
use crate::platform::RecordsPlatform;
use crate::records::{
    ColumnType, DESCRIPTION_COLUMN, DestinationSchema, FieldValue, NAME_COLUMN, NewRecord,
    RecordFilter, UPLOADED_AT_COLUMN, URL_COLUMN, VIDEO_ID_COLUMN,
};
use std::collections::BTreeMap;
use tracing::instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    AlreadyExists,
}

/// Creates one destination record per video, keyed by the video's external id.
///
/// Existing records are never updated. The existence check and the insert are two separate
/// calls with no locking in between, so two upserters racing on the same video can both
/// insert it. Only use one at a time per table.
#[derive(Debug)]
pub struct RecordUpserter<'a, R> {
    records: &'a R,
    table_id: &'a str,
    /// What the table looks like, so that columns it lacks can be left out.
    schema: &'a DestinationSchema,
}

impl<'a, R: RecordsPlatform> RecordUpserter<'a, R> {
    pub fn new(records: &'a R, table_id: &'a str, schema: &'a DestinationSchema) -> Self {
        Self {
            records,
            table_id,
            schema,
        }
    }

    #[instrument(skip(self, video), fields(video_id = %video.external_id))]
    pub async fn upsert(&self, video: &VideoRecord) -> Result<UpsertOutcome, SyncError> {
        let filter = RecordFilter::RichTextEquals {
            column: VIDEO_ID_COLUMN.to_string(),
            value: video.external_id.clone(),
        };
        let existing = self
            .records
            .query_records(self.table_id, &filter)
            .await
            .map_err(|e| {
                SyncError::upstream(e, format!("look up video {}", video.external_id))
            })?;
        if !existing.is_empty() {
            tracing::info!(
                video_id = %video.external_id,
                "video already exists in the database"
            );
            return Ok(UpsertOutcome::AlreadyExists);
        }

        let record = self.new_record(video);
        let created = self
            .records
            .create_record(self.table_id, &record)
            .await
            .map_err(|e| SyncError::upstream(e, format!("insert video {}", video.external_id)))?;
        tracing::info!(
            video_id = %video.external_id,
            record_id = %created.id,
            "video added to the database"
        );
        Ok(UpsertOutcome::Inserted)
    }

    fn new_record(&self, video: &VideoRecord) -> NewRecord {
        let mut fields = BTreeMap::from([
            (
                NAME_COLUMN.to_string(),
                FieldValue::Title(video.title.clone()),
            ),
            (
                DESCRIPTION_COLUMN.to_string(),
                FieldValue::RichText(video.description.clone()),
            ),
            (URL_COLUMN.to_string(), FieldValue::Url(video.url.clone())),
            (
                VIDEO_ID_COLUMN.to_string(),
                FieldValue::RichText(video.external_id.clone()),
            ),
        ]);
        // older tables predate the upload date column
        if self.schema.has(UPLOADED_AT_COLUMN, ColumnType::Date) {
            fields.insert(
                UPLOADED_AT_COLUMN.to_string(),
                FieldValue::Date(video.uploaded_at),
            );
        }
        NewRecord {
            cover_url: video.thumbnail_url.clone(),
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockRecordsPlatform, playlist_item};
    use crate::schema::{MissingTitlePolicy, SchemaReconciler};
    use pretty_assertions::assert_eq;

    const TABLE: &str = "table";

    fn video(id: &str, title: &str) -> VideoRecord {
        VideoRecord::from_playlist_item(playlist_item(id, title)).unwrap()
    }

    async fn reconciled() -> (MockRecordsPlatform, DestinationSchema) {
        let notion = MockRecordsPlatform::new();
        let report = SchemaReconciler::new(&notion, MissingTitlePolicy::Fail)
            .reconcile(TABLE)
            .await
            .unwrap();
        (notion, report.schema)
    }

    #[tokio::test]
    async fn inserts_all_fields() {
        let (notion, schema) = reconciled().await;
        let upserter = RecordUpserter::new(&notion, TABLE, &schema);
        let v = video("a1", "T1");

        assert_eq!(upserter.upsert(&v).await.unwrap(), UpsertOutcome::Inserted);

        let records = notion.records().await;
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(
            record.cover_url.as_deref(),
            Some("https://i.ytimg.com/vi/a1/hqdefault.jpg")
        );
        assert_eq!(
            record.field(NAME_COLUMN),
            Some(&FieldValue::Title("T1".to_string()))
        );
        assert_eq!(
            record.field(URL_COLUMN),
            Some(&FieldValue::Url("https://www.youtube.com/watch?v=a1".to_string()))
        );
        assert_eq!(
            record.field(VIDEO_ID_COLUMN),
            Some(&FieldValue::RichText("a1".to_string()))
        );
        assert_eq!(
            record.field(UPLOADED_AT_COLUMN),
            Some(&FieldValue::Date(v.uploaded_at))
        );
    }

    #[tokio::test]
    async fn second_upsert_is_skipped() {
        let (notion, schema) = reconciled().await;
        let upserter = RecordUpserter::new(&notion, TABLE, &schema);
        let v = video("a1", "T1");

        assert_eq!(upserter.upsert(&v).await.unwrap(), UpsertOutcome::Inserted);
        assert_eq!(
            upserter.upsert(&v).await.unwrap(),
            UpsertOutcome::AlreadyExists
        );
        assert_eq!(notion.records().await.len(), 1);
        assert_eq!(notion.create_calls().await, 1);
        assert_eq!(notion.query_calls().await, 2);
    }

    #[tokio::test]
    async fn omits_upload_date_for_older_tables() {
        let schema: DestinationSchema = [
            (NAME_COLUMN, ColumnType::Title),
            (DESCRIPTION_COLUMN, ColumnType::RichText),
            (URL_COLUMN, ColumnType::Url),
            (VIDEO_ID_COLUMN, ColumnType::RichText),
        ]
        .into_iter()
        .collect();
        let notion = MockRecordsPlatform::with_schema(schema.clone());
        let upserter = RecordUpserter::new(&notion, TABLE, &schema);

        assert_eq!(
            upserter.upsert(&video("a1", "T1")).await.unwrap(),
            UpsertOutcome::Inserted
        );
        let records = notion.records().await;
        assert_eq!(records[0].field(UPLOADED_AT_COLUMN), None);
        assert_eq!(records[0].fields.len(), 4);
    }

    #[tokio::test]
    async fn create_failure_is_upstream() {
        let (notion, schema) = reconciled().await;
        notion.fail_creates_for("a1").await;
        let upserter = RecordUpserter::new(&notion, TABLE, &schema);

        let err = upserter.upsert(&video("a1", "T1")).await.unwrap_err();
        assert!(matches!(err, SyncError::Upstream(_)));
        assert!(err.to_string().contains("insert video a1"), "{err}");
        assert!(notion.records().await.is_empty());
    }
}
