//! HTTP client for the Redmine REST API.
//!
//! [`RedmineApi`] is the seam the sync workflow talks to; [`RedmineClient`] is
//! the reqwest-backed implementation. The API key is sent both as the `key`
//! query parameter and as the `X-Redmine-API-Key` header.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::*;

/// Page size for both list calls. Redmine caps `limit` at 100.
pub const PAGE_LIMIT: u32 = 100;

/// Per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const API_KEY_HEADER: &str = "X-Redmine-API-Key";

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rejected by server: {0}")]
    Rejected(String),

    #[error("Unauthorized: API key missing or invalid")]
    Unauthorized,

    #[error("Server error: {0}")]
    Server(String),
}

/// Operations the sync workflow needs from the remote system.
pub trait RedmineApi: Send + Sync {
    /// Issues assigned to the current user, in server order.
    fn my_issues(&self) -> impl Future<Output = Result<Vec<Issue>, ClientError>> + Send;

    /// The current user's most recent time entries.
    fn my_time_entries(&self) -> impl Future<Output = Result<Vec<TimeEntry>, ClientError>> + Send;

    /// Record a single time entry. Only the status code is checked.
    fn create_time_entry(
        &self,
        entry: NewTimeEntry,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;
}

/// reqwest-backed [`RedmineApi`].
#[derive(Debug, Clone)]
pub struct RedmineClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl RedmineClient {
    /// Create a client for `host`. A bare host name is reached over HTTPS;
    /// an explicit `http://` or `https://` prefix is kept as given.
    pub fn new(host: &str, api_key: impl Into<String>) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            base_url: base_url(host),
            api_key: api_key.into(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a request carrying the API key as header and query parameter.
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .request(method, &url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(&[("key", self.api_key.as_str())])
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let response = self
            .request(reqwest::Method::GET, path)
            .query(params)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }
}

impl RedmineApi for RedmineClient {
    async fn my_issues(&self) -> Result<Vec<Issue>, ClientError> {
        let list: IssueList = self
            .get(
                "/issues.json",
                &[
                    ("assigned_to_id", "me".to_string()),
                    ("limit", PAGE_LIMIT.to_string()),
                ],
            )
            .await?;
        Ok(list.issues)
    }

    async fn my_time_entries(&self) -> Result<Vec<TimeEntry>, ClientError> {
        let list: TimeEntryList = self
            .get(
                "/time_entries.json",
                &[
                    ("user_id", "me".to_string()),
                    ("sort", "spent_on:desc".to_string()),
                    ("limit", PAGE_LIMIT.to_string()),
                ],
            )
            .await?;
        Ok(list.time_entries)
    }

    async fn create_time_entry(&self, entry: NewTimeEntry) -> Result<(), ClientError> {
        let issue_id = entry.issue_id;
        let response = self
            .request(reqwest::Method::POST, "/time_entries.json")
            .json(&TimeEntryEnvelope { time_entry: entry })
            .send()
            .await?;

        let response = check_status(response).await?;
        if tracing::enabled!(tracing::Level::DEBUG) {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(issue_id, %status, %body, "time entry response");
        }
        Ok(())
    }
}

/// Pass 2xx responses through, map everything else to a [`ClientError`].
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
        StatusCode::NOT_FOUND => Err(ClientError::NotFound(body)),
        StatusCode::UNPROCESSABLE_ENTITY => Err(ClientError::Rejected(body)),
        _ => Err(ClientError::Server(format!("{}: {}", status, body))),
    }
}

fn base_url(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_uses_https() {
        assert_eq!(base_url("redmine.example.com"), "https://redmine.example.com");
    }

    #[test]
    fn explicit_scheme_is_kept() {
        assert_eq!(base_url("http://127.0.0.1:8080/"), "http://127.0.0.1:8080");
        assert_eq!(base_url("https://pm.example.org"), "https://pm.example.org");
    }
}
