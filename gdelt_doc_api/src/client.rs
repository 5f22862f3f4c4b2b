//! HTTP client for the GDELT DOC 2.0 API.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::{
    query::{Filters, QueryMode},
    sanitize::Sanitizer,
    types::{ArticleList, ArticleResponse, Timeline, TimelineResponse},
    user_agent::get_user_agent,
    Error,
};

/// Production endpoint of the DOC 2.0 API.
pub const DEFAULT_BASE_URL: &str = "https://api.gdeltproject.org/api/v2/doc/doc";

/// Request timeout for DOC API calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Phrases the API uses when it refuses a request because of its rate limit.
const RATE_LIMIT_PHRASES: &[&str] = &["limit requests", "rate limit", "too many requests"];

/// HTTP client for the GDELT DOC 2.0 API.
///
/// Each call sends exactly one GET request and never retries. The client
/// holds no per-call state, so one instance can be shared between tasks.
#[derive(Debug, Clone)]
pub struct Client {
    client: reqwest::Client,
    /// Endpoint URL. Defaults to [`DEFAULT_BASE_URL`].
    base_url: Url,
    sanitizer: Sanitizer,
}

impl Client {
    /// Creates a new client pointing at the production DOC API.
    pub fn new() -> Result<Self, Error> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom endpoint. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        let base_url = Url::parse(base_url).map_err(|e| {
            tracing::error!("Invalid base URL {}: {}", base_url, e);
            Error::Validation(format!("invalid base URL '{}': {}", base_url, e))
        })?;
        let client = reqwest::Client::builder()
            .user_agent(get_user_agent())
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url,
            sanitizer: Sanitizer::default(),
        })
    }

    /// Replaces the character sanitizer applied to response bodies.
    pub fn with_sanitizer(mut self, sanitizer: Sanitizer) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Searches for articles matching `filters`.
    ///
    /// Returns an empty [`ArticleList`], with the full column set, when the
    /// API reports no matches.
    pub async fn article_search(&self, filters: &Filters) -> Result<ArticleList, Error> {
        match self.query(QueryMode::ArtList, filters).await? {
            Some(value) => {
                let resp: ArticleResponse = decode(value)?;
                Ok(ArticleList::from(resp))
            }
            None => Ok(ArticleList::empty()),
        }
    }

    /// Runs one of the five timeline modes.
    ///
    /// `QueryMode::ArtList` is rejected before any request is sent.
    /// Multi-series modes produce one column per language or country, and
    /// timestamps a series has no data for are `None`.
    pub async fn timeline_search(
        &self,
        mode: QueryMode,
        filters: &Filters,
    ) -> Result<Timeline, Error> {
        if !mode.is_timeline() {
            return Err(Error::InvalidMode(mode.to_string()));
        }
        match self.query(mode, filters).await? {
            Some(value) => {
                let resp: TimelineResponse = decode(value)?;
                Timeline::from_response(mode, resp)
            }
            None => Ok(Timeline::empty(mode)),
        }
    }

    /// Sends the request and returns the sanitized JSON body, or `None` for
    /// the API's empty-result response.
    async fn query(&self, mode: QueryMode, filters: &Filters) -> Result<Option<Value>, Error> {
        let url = filters.add_to_url(&self.base_url, mode)?;
        tracing::debug!("GET {} ({})", url, mode);

        let resp = self.client.get(url).send().await.map_err(|e| {
            tracing::error!("Failed to get resource: {}", e);
            Error::Transport(e)
        })?;

        let status = resp.status();
        let bytes = resp.bytes().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::Transport(e)
        })?;
        // the API is known to emit invalid UTF-8 inside article titles
        let body = String::from_utf8_lossy(&bytes);

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!("Rate limited by GDELT API");
            return Err(Error::RateLimited);
        }
        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::error!("Request failed with status {}: {}", status, snippet);
            return Err(Error::Api {
                status: status.as_u16(),
                message: snippet,
            });
        }

        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "{}" {
            tracing::debug!("No results for {} query", mode);
            return Ok(None);
        }

        // errors such as "Your search contained a phrase that was too short"
        // arrive as plain text with a 200 status
        if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
            let message = truncate_body(trimmed);
            let lower = message.to_lowercase();
            if RATE_LIMIT_PHRASES.iter().any(|p| lower.contains(p)) {
                tracing::warn!("Rate limited by GDELT API: {}", message);
                return Err(Error::RateLimited);
            }
            tracing::error!("API returned an error message: {}", message);
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        let value = self.sanitizer.parse(trimmed).map_err(|e| {
            let snippet = truncate_body(trimmed);
            tracing::error!("Failed to parse resource: {} | body: {}", e, snippet);
            Error::Parse(e.to_string())
        })?;

        Ok(Some(value))
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    serde_json::from_value(value).map_err(|e| {
        tracing::error!("Unexpected response structure: {}", e);
        Error::Parse(e.to_string())
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    }
}
