//! PokeAPI client backed by the expiring response cache
//!
//! Every request goes through the same path: look the URL up in the cache,
//! otherwise fetch it, parse the body and store the raw bytes under the URL.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::{LocationArea, LocationAreaPage, Pokemon};
use crate::cache::ExpiringCache;

/// Base URL for the PokeAPI
pub const POKEAPI_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Default timeout for a single HTTP request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur when fetching from the PokeAPI
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Server answered with a non-success status
    #[error("Request to {url} failed with status code: {status}")]
    Status { url: String, status: u16 },

    /// A resource name was blank
    #[error("{0} name cannot be empty")]
    EmptyName(&'static str),
}

/// Settings for the HTTP side of the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root, without a trailing slash
    pub base_url: String,
    /// Timeout applied to each request
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: POKEAPI_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Client for the PokeAPI endpoints used by the CLI
#[derive(Debug, Clone)]
pub struct PokeApiClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Shared response cache, keyed by request URL
    cache: Arc<ExpiringCache>,
    /// API root (allows override for testing)
    base_url: String,
}

impl PokeApiClient {
    /// Creates a client that stores responses in `cache`
    ///
    /// # Returns
    /// * `Ok(PokeApiClient)` on success
    /// * `Err(ApiError::RequestFailed)` if the HTTP client cannot be built
    pub fn new(config: ClientConfig, cache: Arc<ExpiringCache>) -> Result<Self, ApiError> {
        let http_client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http_client,
            cache,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The cache this client reads from and writes to
    pub fn cache(&self) -> &Arc<ExpiringCache> {
        &self.cache
    }

    /// Fetches a page of location areas
    ///
    /// # Arguments
    /// * `page_url` - A `next`/`previous` link from an earlier page, or `None` for the first page
    pub async fn location_areas(&self, page_url: Option<&str>) -> Result<LocationAreaPage, ApiError> {
        let url = match page_url {
            Some(url) => url.to_string(),
            None => format!("{}/location-area", self.base_url),
        };
        self.fetch_json(&url).await
    }

    /// Fetches a location area by name
    pub async fn location_area(&self, name: &str) -> Result<LocationArea, ApiError> {
        let name = normalize_name(name, "location")?;
        let url = format!("{}/location-area/{}", self.base_url, name);
        self.fetch_json(&url).await
    }

    /// Fetches a Pokémon by name
    pub async fn pokemon(&self, name: &str) -> Result<Pokemon, ApiError> {
        let name = normalize_name(name, "pokemon")?;
        let url = format!("{}/pokemon/{}", self.base_url, name);
        self.fetch_json(&url).await
    }

    /// Returns the parsed body for `url`, from the cache when possible
    ///
    /// Only bodies that arrive with a success status and parse as `T` are
    /// cached.
    async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        if let Some(body) = self.cache.get(url) {
            tracing::debug!(url, "cache hit");
            return Ok(serde_json::from_slice(&body)?);
        }

        tracing::debug!(url, "cache miss, fetching");
        let response = self.http_client.get(url).send().await?;

        let status = response.status().as_u16();
        if status > 299 {
            return Err(ApiError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().await?;
        let parsed = serde_json::from_slice(&body)?;

        tracing::trace!(url, bytes = body.len(), "caching response");
        self.cache.add(url, body);
        Ok(parsed)
    }
}

/// Trims and lowercases a resource name, rejecting blanks
fn normalize_name(name: &str, kind: &'static str) -> Result<String, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::EmptyName(kind));
    }
    Ok(name.to_lowercase())
}
