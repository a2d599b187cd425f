//! Bringing the destination table's columns in line with what a sync writes.

use crate::error::SyncError;
use crate::platform::RecordsPlatform;
use crate::records::{
    ColumnType, DESCRIPTION_COLUMN, DestinationSchema, NAME_COLUMN, SchemaMutation,
    UPLOADED_AT_COLUMN, URL_COLUMN, VIDEO_ID_COLUMN,
};
use tracing::instrument;

/// Columns besides `Name` that every synced record writes to.
pub const REQUIRED_COLUMNS: [(&str, ColumnType); 4] = [
    (DESCRIPTION_COLUMN, ColumnType::RichText),
    (URL_COLUMN, ColumnType::Url),
    (VIDEO_ID_COLUMN, ColumnType::RichText),
    (UPLOADED_AT_COLUMN, ColumnType::Date),
];

/// What to do when the table has no title column at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingTitlePolicy {
    /// Create a `Name` title column.
    Create,
    /// Refuse to continue. A table without a title column usually means the wrong table id
    /// was configured.
    #[default]
    Fail,
}

/// The outcome of a reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Every mutation applied, in order. Empty if the schema was already conformant.
    pub mutations: Vec<SchemaMutation>,
    /// The schema after the mutations.
    pub schema: DestinationSchema,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.mutations.is_empty()
    }
}

/// Lists the columns of `schema` that are missing or have the wrong type.
pub fn nonconforming_columns(schema: &DestinationSchema) -> Vec<&'static str> {
    std::iter::once((NAME_COLUMN, ColumnType::Title))
        .chain(REQUIRED_COLUMNS)
        .filter(|(column, kind)| !schema.has(column, *kind))
        .map(|(column, _)| column)
        .collect()
}

/// Converges a table's schema on the one a sync needs.
///
/// Safe to run before every sync: a conformant table is left untouched. Mutations are applied
/// one remote call at a time, so a failure part-way leaves the table partially reconciled, and
/// the next run picks up where this one stopped.
#[derive(Debug)]
pub struct SchemaReconciler<'a, R> {
    records: &'a R,
    policy: MissingTitlePolicy,
}

impl<'a, R: RecordsPlatform> SchemaReconciler<'a, R> {
    pub fn new(records: &'a R, policy: MissingTitlePolicy) -> Self {
        Self { records, policy }
    }

    #[instrument(skip(self))]
    pub async fn reconcile(&self, table_id: &str) -> Result<ReconcileReport, SyncError> {
        let mut report = ReconcileReport {
            mutations: Vec::new(),
            schema: self
                .records
                .get_table_schema(table_id)
                .await
                .map_err(|e| SyncError::upstream(e, "retrieve destination table schema"))?,
        };

        match report.schema.column(NAME_COLUMN) {
            Some(ColumnType::Title) => {}
            Some(other) => {
                return Err(SyncError::Schema(format!(
                    "\"{NAME_COLUMN}\" property has type \"{other}\" but must be of type \"title\""
                )));
            }
            None => {
                // a table only ever has one title column; if it has a different name, take it
                let existing = report.schema.title_columns().next().map(str::to_owned);
                let mutation = match (existing, self.policy) {
                    (Some(from), _) => SchemaMutation::Rename {
                        from,
                        to: NAME_COLUMN.to_string(),
                    },
                    (None, MissingTitlePolicy::Create) => SchemaMutation::Create {
                        column: NAME_COLUMN.to_string(),
                        kind: ColumnType::Title,
                    },
                    (None, MissingTitlePolicy::Fail) => {
                        return Err(SyncError::Schema(format!(
                            "\"{NAME_COLUMN}\" property of type \"title\" is required"
                        )));
                    }
                };
                self.apply(table_id, &mut report, mutation).await?;
            }
        }

        for (column, kind) in REQUIRED_COLUMNS {
            let mutation = match report.schema.column(column) {
                Some(current) if current == kind => continue,
                Some(current) => SchemaMutation::Retype {
                    column: column.to_string(),
                    from: current,
                    to: kind,
                },
                None => SchemaMutation::Create {
                    column: column.to_string(),
                    kind,
                },
            };
            self.apply(table_id, &mut report, mutation).await?;
        }

        debug_assert!(nonconforming_columns(&report.schema).is_empty());
        if report.is_noop() {
            tracing::info!(table_id, "database schema is already up to date");
        }
        Ok(report)
    }

    async fn apply(
        &self,
        table_id: &str,
        report: &mut ReconcileReport,
        mutation: SchemaMutation,
    ) -> Result<(), SyncError> {
        self.records
            .update_table_schema(table_id, &mutation)
            .await
            .map_err(|e| SyncError::upstream(e, "update destination table schema"))?;
        tracing::info!(table_id, %mutation, "database updated");
        report.schema.apply(&mutation);
        report.mutations.push(mutation);
        Ok(())
    }
}
