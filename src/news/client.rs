use futures::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use super::types::{
    ApiErrorBody, Article, ArticlesResponse, Source, SourceSelection, SourcesResponse,
};
use crate::config::Settings;
use crate::util::{validate_base_url, UrlValidationError};

const SOURCES_ENDPOINT: &str = "sources";
const HEADLINES_ENDPOINT: &str = "top-headlines";

const API_KEY_PARAM: &str = "apiKey";
const SOURCES_PARAM: &str = "sources";
const TERM_PARAM: &str = "q";
const PAGE_SIZE_PARAM: &str = "pageSize";

/// Results requested per search (the API maximum).
pub const PAGE_SIZE: u32 = 100;

const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors from talking to the news API.
///
/// None of these are retried; the caller decides what to tell the user.
#[derive(Debug, Error)]
pub enum NewsError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// Request exceeded the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    /// Non-2xx response without a recognizable error body
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Non-2xx response carrying the API's own error object
    #[error("News API error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },
    /// Response body exceeded the size limit
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    /// Body was not the JSON shape expected for the endpoint
    #[error("Unexpected response from news API: {0}")]
    Decode(#[from] serde_json::Error),
    /// Configured base URL is unusable
    #[error("Bad news API base URL: {0}")]
    BaseUrl(#[from] UrlValidationError),
}

/// Client for the remote headlines API.
///
/// Every call is one GET, authenticated with the API key as a query
/// parameter. The key never appears in logs or in `Debug` output.
#[derive(Clone)]
pub struct NewsClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for NewsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl NewsClient {
    /// Build a client from resolved settings.
    pub fn new(settings: &Settings) -> Result<Self, NewsError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("topnews/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_http_client(http, settings)
    }

    /// Build a client around an existing `reqwest::Client`.
    pub fn with_http_client(http: reqwest::Client, settings: &Settings) -> Result<Self, NewsError> {
        let base_url = validate_base_url(&settings.api_base_url)?;
        Ok(Self {
            http,
            base_url,
            api_key: settings.api_key.clone(),
            timeout: settings.request_timeout,
        })
    }

    /// Fetch every source the API knows about, in response order.
    pub async fn list_sources(&self) -> Result<Vec<Source>, NewsError> {
        let url = self.sources_url()?;
        let body: SourcesResponse = self.get_json(url, SOURCES_ENDPOINT).await?;
        tracing::debug!(count = body.sources.len(), "Fetched sources");
        Ok(body.sources)
    }

    /// Search top headlines for `term`, restricted to `selection`.
    pub async fn search(
        &self,
        term: &str,
        selection: &SourceSelection,
    ) -> Result<Vec<Article>, NewsError> {
        let url = self.search_url(term, selection)?;
        let body: ArticlesResponse = self.get_json(url, HEADLINES_ENDPOINT).await?;
        tracing::debug!(count = body.articles.len(), "Fetched headlines");
        Ok(body.articles)
    }

    pub(crate) fn sources_url(&self) -> Result<Url, NewsError> {
        let mut url = self.endpoint(SOURCES_ENDPOINT)?;
        url.query_pairs_mut()
            .append_pair(API_KEY_PARAM, self.api_key.expose_secret());
        Ok(url)
    }

    /// `sources` is omitted entirely when searching all sources.
    pub(crate) fn search_url(&self, term: &str, selection: &SourceSelection) -> Result<Url, NewsError> {
        let mut url = self.endpoint(HEADLINES_ENDPOINT)?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(sources) = selection.query_value() {
                query.append_pair(SOURCES_PARAM, &sources);
            }
            query
                .append_pair(TERM_PARAM, term)
                .append_pair(PAGE_SIZE_PARAM, &PAGE_SIZE.to_string())
                .append_pair(API_KEY_PARAM, self.api_key.expose_secret());
        }
        Ok(url)
    }

    fn endpoint(&self, name: &str) -> Result<Url, NewsError> {
        self.base_url
            .join(name)
            .map_err(|e| NewsError::BaseUrl(UrlValidationError::InvalidUrl(e)))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, endpoint: &str) -> Result<T, NewsError> {
        tracing::debug!(endpoint = %endpoint, "News API request");

        // The limit covers the whole exchange: headers and body.
        let (status, body) = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.fetch(url))
                .await
                .map_err(|_| NewsError::Timeout(limit))??,
            None => self.fetch(url).await?,
        };

        if !status.is_success() {
            tracing::warn!(endpoint = %endpoint, status = status.as_u16(), "News API request failed");
            return Err(api_error(status.as_u16(), &body));
        }

        Ok(serde_json::from_slice(&body)?)
    }

    async fn fetch(&self, url: Url) -> Result<(reqwest::StatusCode, Vec<u8>), NewsError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            // reqwest errors embed the URL, and with it the API key
            .map_err(|e| NewsError::Network(e.without_url()))?;

        let status = response.status();
        let body = read_limited(response, MAX_RESPONSE_SIZE).await?;
        Ok((status, body))
    }
}

/// Prefer the API's own error message over a bare status code.
fn api_error(status: u16, body: &[u8]) -> NewsError {
    match serde_json::from_slice::<ApiErrorBody>(body) {
        Ok(ApiErrorBody {
            code,
            message: Some(message),
        }) => NewsError::Api {
            status,
            code,
            message,
        },
        _ => NewsError::HttpStatus(status),
    }
}

/// Read a response body, giving up once it grows past `limit` bytes.
async fn read_limited(response: reqwest::Response, limit: usize) -> Result<Vec<u8>, NewsError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(NewsError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| NewsError::Network(e.without_url()))?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(NewsError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
