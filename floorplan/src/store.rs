//! Remote table store boundary.
//!
//! The editor depends on exactly two remote operations: fetching the table
//! records of the plan and sending a partial geometry update for one table.
//! Hosts provide an implementation (HTTP in the `seating` binary, in-memory
//! mocks in tests).

use crate::doc::{Table, TableId, TableUpdate};

/// Errors from the remote table store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The request never produced a response (connect, timeout, TLS).
    #[error("request failed: {0}")]
    Request(String),
    /// The store answered with a non-success status.
    #[error("store returned {status}: {body}")]
    Status { status: u16, body: String },
    /// The response body could not be decoded.
    #[error("response decode failed: {0}")]
    Decode(String),
    /// The table no longer exists remotely.
    #[error("table not found: {0}")]
    NotFound(TableId),
}

/// Async access to the remote table records. Enables mocking in tests.
#[async_trait::async_trait]
pub trait TableStore: Send + Sync {
    /// Fetch every table on the plan.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the request fails or the body is malformed.
    async fn load_tables(&self) -> Result<Vec<Table>, StoreError>;

    /// Apply a partial geometry update to one table.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the request fails or is rejected.
    async fn update_table(&self, id: TableId, update: &TableUpdate) -> Result<(), StoreError>;
}
