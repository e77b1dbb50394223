//! HTTP client for the ordering endpoints.
//!
//! The trait seam exists so the board client can be tested without a
//! network; production code uses [`HttpOrderingApi`].

use async_trait::async_trait;
use girder::domain::{ColumnId, ProjectId, TicketsOrderUpdate};
use thiserror::Error;

/// Errors from persisting an ordering mutation.
#[derive(Debug, Error)]
pub enum ApiClientError {
    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server rejected update ({status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// The server's error message.
        message: String,
    },
}

/// The ordering calls the board client needs from the server.
#[async_trait]
pub trait OrderingApi: Send + Sync {
    /// Persist a ticket ordering mutation.
    async fn update_tickets_order(
        &self,
        project_id: &ProjectId,
        update: &TicketsOrderUpdate,
    ) -> Result<(), ApiClientError>;

    /// Persist a column-order mutation.
    async fn update_column_order(
        &self,
        project_id: &ProjectId,
        order: &[ColumnId],
    ) -> Result<(), ApiClientError>;
}

/// Reqwest-backed implementation talking to a girder server.
pub struct HttpOrderingApi {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpOrderingApi {
    /// Create a client for the server at `base_url` (no trailing slash)
    /// using the given bearer token.
    #[must_use]
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    async fn post(&self, path: &str, payload: serde_json::Value) -> Result<(), ApiClientError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| body["error"].as_str().map(str::to_string))
            .unwrap_or_else(|| status.to_string());
        Err(ApiClientError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl OrderingApi for HttpOrderingApi {
    async fn update_tickets_order(
        &self,
        project_id: &ProjectId,
        update: &TicketsOrderUpdate,
    ) -> Result<(), ApiClientError> {
        self.post(
            "/projects/update/tickets-order",
            serde_json::json!({ "projectId": project_id, "update": update }),
        )
        .await
    }

    async fn update_column_order(
        &self,
        project_id: &ProjectId,
        order: &[ColumnId],
    ) -> Result<(), ApiClientError> {
        self.post(
            "/projects/update/column-order",
            serde_json::json!({ "projectId": project_id, "columnOrder": order }),
        )
        .await
    }
}
