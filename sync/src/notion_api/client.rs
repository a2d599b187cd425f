//! Core Notion API client functionality.

use crate::notion_api::{
    databases::{Database, DatabaseUpdateRequest},
    pages::{CreatePageRequest, DatabaseQueryRequest, DatabaseQueryResponse, Page},
};
use crate::platform::RecordsPlatform;
use crate::records::{DestinationSchema, NewRecord, RecordFilter, RecordRef, SchemaMutation};
use eyre::Context;
use http::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use tracing::instrument;

const API_BASE: &str = "https://api.notion.com/v1";

/// The API version this client speaks. Sent with every request.
const NOTION_VERSION: &str = "2022-06-28";

/// Client for the Notion REST API, authenticated with an internal integration token.
///
/// The integration must have been shared with the target database, or every call will fail
/// with `404 object_not_found`.
#[derive(Clone)]
pub struct NotionClient {
    token: String,
    client: reqwest::Client,
}

impl fmt::Debug for NotionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotionClient")
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl NotionClient {
    pub fn new(token: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            token: token.into(),
            client,
        }
    }

    /// Makes an authenticated request to the Notion API and parses the JSON response.
    ///
    /// Non-success statuses are turned into errors that include the response body, which for
    /// Notion contains a machine-readable `code` and a human-readable `message`.
    #[instrument(skip(self, json_body), level = tracing::Level::TRACE)]
    async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        json_body: Option<&impl Serialize>,
    ) -> eyre::Result<T> {
        let url = format!("{API_BASE}/{path}");

        let mut request = self
            .client
            .request(method.clone(), &url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION);

        if let Some(body) = json_body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("send {} request to Notion API: {}", method, url))?;

        let status_code = response.status();
        if !status_code.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(eyre::eyre!(
                "Notion API {} {} failed with status {}: {}",
                method,
                path,
                status_code,
                error_text
            ));
        }

        response
            .json()
            .await
            .with_context(|| format!("parse Notion API response for {} {}", method, path))
    }

    /// Retrieves a database, including its property schema.
    ///
    /// # API Reference
    ///
    /// <https://developers.notion.com/reference/retrieve-a-database>
    #[instrument(skip(self))]
    pub async fn retrieve_database(&self, database_id: &str) -> eyre::Result<Database> {
        let database: Database = self
            .request_json(
                Method::GET,
                &format!("databases/{database_id}"),
                None::<&()>,
            )
            .await?;

        tracing::debug!(
            database_id,
            properties = database.properties.len(),
            "retrieved database"
        );

        Ok(database)
    }

    /// Updates a database's property schema.
    ///
    /// # API Reference
    ///
    /// <https://developers.notion.com/reference/update-a-database>
    #[instrument(skip(self))]
    pub async fn update_database(
        &self,
        database_id: &str,
        update: &DatabaseUpdateRequest,
    ) -> eyre::Result<Database> {
        self.request_json(
            Method::PATCH,
            &format!("databases/{database_id}"),
            Some(update),
        )
        .await
    }

    /// Queries a database for pages matching a filter.
    ///
    /// Only the first page of results is returned.
    ///
    /// # API Reference
    ///
    /// <https://developers.notion.com/reference/post-database-query>
    #[instrument(skip(self))]
    pub async fn query_database(
        &self,
        database_id: &str,
        query: &DatabaseQueryRequest,
    ) -> eyre::Result<DatabaseQueryResponse> {
        let response: DatabaseQueryResponse = self
            .request_json(
                Method::POST,
                &format!("databases/{database_id}/query"),
                Some(query),
            )
            .await?;

        tracing::trace!(
            database_id,
            returned_items = response.results.len(),
            has_more = response.has_more,
            "queried database"
        );

        Ok(response)
    }

    /// Creates a page, which for a database parent means a new row.
    ///
    /// # API Reference
    ///
    /// <https://developers.notion.com/reference/post-page>
    #[instrument(skip(self, request))]
    pub async fn create_page(&self, request: &CreatePageRequest) -> eyre::Result<Page> {
        let page: Page = self
            .request_json(Method::POST, "pages", Some(request))
            .await?;

        tracing::debug!(page_id = page.id, "created page");

        Ok(page)
    }
}

impl RecordsPlatform for NotionClient {
    async fn get_table_schema(&self, table_id: &str) -> eyre::Result<DestinationSchema> {
        Ok(self.retrieve_database(table_id).await?.schema())
    }

    async fn update_table_schema(
        &self,
        table_id: &str,
        mutation: &SchemaMutation,
    ) -> eyre::Result<()> {
        self.update_database(table_id, &DatabaseUpdateRequest::from(mutation))
            .await
            .with_context(|| format!("apply schema change: {mutation}"))?;
        Ok(())
    }

    async fn query_records(
        &self,
        table_id: &str,
        filter: &RecordFilter,
    ) -> eyre::Result<Vec<RecordRef>> {
        let response = self
            .query_database(table_id, &DatabaseQueryRequest::from(filter))
            .await?;
        Ok(response
            .results
            .into_iter()
            .map(|page| RecordRef { id: page.id })
            .collect())
    }

    async fn create_record(&self, table_id: &str, record: &NewRecord) -> eyre::Result<RecordRef> {
        let page = self
            .create_page(&CreatePageRequest::new(table_id, record))
            .await?;
        Ok(RecordRef { id: page.id })
    }
}
