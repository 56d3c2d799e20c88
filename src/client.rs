//! Homework API client
//!
//! [`HomeworkSource`] is the seam the poll loop fetches through;
//! [`PracticumClient`] is the HTTP implementation used in production.

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::types::Cursor;
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, error};

/// Source of raw `homework_statuses` payloads
#[async_trait]
pub trait HomeworkSource: Send + Sync {
    /// Fetch homeworks whose status changed since `from_date`
    ///
    /// Returns the decoded but not yet validated JSON payload.
    async fn fetch(&self, from_date: Cursor) -> Result<serde_json::Value>;
}

/// HTTP client for the Practicum `homework_statuses` endpoint
pub struct PracticumClient {
    /// HTTP client with the configured request timeout
    http_client: reqwest::Client,

    /// Endpoint URL
    endpoint: String,

    /// Value of the `Authorization` header (`OAuth <token>`)
    auth_header: String,
}

impl PracticumClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `config` - Endpoint and timeout settings
    /// * `token` - OAuth token for the homework API
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(config: &ApiConfig, token: &str) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("homework-bot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint: config.endpoint.clone(),
            auth_header: format!("OAuth {token}"),
        })
    }
}

#[async_trait]
impl HomeworkSource for PracticumClient {
    /// Issue a single GET for `from_date`
    ///
    /// # Errors
    /// - [`Error::Network`] if the request could not be sent or timed out
    /// - [`Error::UpstreamStatus`] for any status other than 200
    /// - [`Error::Decode`] if the body is not valid JSON
    async fn fetch(&self, from_date: Cursor) -> Result<serde_json::Value> {
        debug!(endpoint = %self.endpoint, from_date = %from_date, "Requesting homework statuses");

        let response = self
            .http_client
            .get(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, &self.auth_header)
            .query(&[("from_date", from_date.get())])
            .send()
            .await
            .inspect_err(|e| {
                error!(endpoint = %self.endpoint, error = %e, "Request to homework API failed");
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            error!(
                endpoint = %self.endpoint,
                status = status.as_u16(),
                "Homework API returned unexpected status"
            );
            return Err(Error::UpstreamStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.inspect_err(|e| {
            error!(endpoint = %self.endpoint, error = %e, "Failed to read homework API response");
        })?;

        serde_json::from_str(&body).map_err(|e| {
            error!(endpoint = %self.endpoint, error = %e, "Homework API response is not valid JSON");
            Error::Decode(e)
        })
    }
}
