//! HTTP table store: the REST implementation of [`TableStore`].
//!
//! `GET {base}/tables` lists the plan's tables and
//! `PATCH {base}/tables/{id}` applies a sparse geometry update as a JSON
//! merge patch. Response handling is split into pure functions so status and
//! body mapping can be tested without a server.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use async_trait::async_trait;
use floorplan::doc::{Table, TableId, TableUpdate};
use floorplan::store::{StoreError, TableStore};
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use crate::config::AppConfig;

const MERGE_PATCH: &str = "application/merge-patch+json";

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpTableStore {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTableStore {
    /// Build a client with the configured timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Request`] if the HTTP client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| StoreError::Request(e.to_string()))?;
        Ok(Self { http, base_url: config.api_url.clone() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl TableStore for HttpTableStore {
    async fn load_tables(&self) -> Result<Vec<Table>, StoreError> {
        let url = tables_url(&self.base_url);
        debug!(%url, "loading tables");
        let response = self.http.get(&url).send().await.map_err(|e| StoreError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| StoreError::Request(e.to_string()))?;
        check_status(status, &text, None)?;
        parse_tables(&text)
    }

    async fn update_table(&self, id: TableId, update: &TableUpdate) -> Result<(), StoreError> {
        let url = table_url(&self.base_url, id);
        let body = serde_json::to_vec(update).map_err(|e| StoreError::Decode(e.to_string()))?;
        debug!(%url, table_id = id, "patching table");

        let response = self
            .http
            .patch(&url)
            .header(CONTENT_TYPE, MERGE_PATCH)
            .body(body)
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| StoreError::Request(e.to_string()))?;
        check_status(status, &text, Some(id))
    }
}

// =============================================================================
// WIRE HELPERS
// =============================================================================

pub(crate) fn tables_url(base: &str) -> String {
    format!("{}/tables", base.trim_end_matches('/'))
}

pub(crate) fn table_url(base: &str, id: TableId) -> String {
    format!("{}/{id}", tables_url(base))
}

/// Map a non-success status to a [`StoreError`]. A 404 on a single table
/// becomes [`StoreError::NotFound`].
pub(crate) fn check_status(status: u16, body: &str, id: Option<TableId>) -> Result<(), StoreError> {
    match (status, id) {
        (200..=299, _) => Ok(()),
        (404, Some(id)) => Err(StoreError::NotFound(id)),
        _ => Err(StoreError::Status { status, body: body.to_owned() }),
    }
}

/// Decode a table list. Accepts a bare array or a `{"tables": [...]}` envelope.
pub(crate) fn parse_tables(text: &str) -> Result<Vec<Table>, StoreError> {
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum Body {
        List(Vec<Table>),
        Envelope { tables: Vec<Table> },
    }

    match serde_json::from_str::<Body>(text) {
        Ok(Body::List(tables) | Body::Envelope { tables }) => Ok(tables),
        Err(e) => Err(StoreError::Decode(e.to_string())),
    }
}
