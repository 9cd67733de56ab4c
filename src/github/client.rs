//! GitHub API client.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::{Config, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
use crate::error::{ReportError, Result};
use crate::github::{PageFetch, PageRequest};

/// Blocking client for the GitHub REST API.
///
/// Requests carry the bearer token and API version headers and are bounded by
/// a timeout, so a stalled connection cannot hang a run indefinitely.
#[derive(Clone)]
pub struct GitHubClient {
    pub(crate) token: String,
    pub(crate) base_url: String,
    pub(crate) client: Client,
}

impl GitHubClient {
    /// Create a client for api.github.com with the default timeout.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(
            token,
            DEFAULT_API_URL,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create a client for GitHub Enterprise or any other API root.
    pub fn with_base_url(
        token: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let token = token.into();
        let mut url = base_url.into();
        // Remove trailing slash if present
        while url.ends_with('/') {
            url.pop();
        }
        let client = Client::builder()
            .default_headers(default_headers(&token)?)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            token,
            base_url: url,
            client,
        })
    }

    /// Create a client from a validated run configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_base_url(config.token.clone(), config.api_url.clone(), config.timeout)
    }

    /// Get the token for use in clone credentials.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl PageFetch for GitHubClient {
    fn fetch_page<T: DeserializeOwned>(&self, request: &PageRequest<'_>) -> Result<Vec<T>> {
        let url = format!("{}{}", self.base_url, request.endpoint);
        debug!(endpoint = request.endpoint, page = request.page, "GET");
        let response = self
            .client
            .get(&url)
            .query(request.params)
            .query(&[("per_page", request.per_page), ("page", request.page)])
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(ReportError::GitHub {
                message: format!("API request failed ({}): {}", status, body),
            });
        }

        response.json().map_err(|e| ReportError::GitHub {
            message: format!("Failed to parse response: {}", e),
        })
    }
}

/// Headers sent with every API request.
pub(crate) fn default_headers(token: &str) -> Result<HeaderMap> {
    let mut auth = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
        ReportError::GitHub {
            message: "access token contains characters not allowed in a header".into(),
        }
    })?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth);
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/vnd.github+json"),
    );
    headers.insert(USER_AGENT, HeaderValue::from_static("repo-report"));
    headers.insert(
        "X-GitHub-Api-Version",
        HeaderValue::from_static("2022-11-28"),
    );
    Ok(headers)
}
