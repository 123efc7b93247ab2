//! Config tool service client
//!
//! The service exposes two GET queries on a single endpoint:
//!
//! - `?query=version` answers with the latest bundle version as plain text
//! - `?query=getconfig&apikey=<key>` streams the ZIP bundle for that key
//!
//! The server only accepts browser-like requests, so every request carries a
//! desktop `User-Agent` and an `Accept` header preferring archives.

use std::io::Write;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::Url;

use super::error::RemoteError;
use crate::version::parse_version;

/// Default config tool endpoint
pub const DEFAULT_ENDPOINT: &str = "https://configtool.vpuniverse.com/api.php";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/117.0.0.0 Safari/537.36";

const ARCHIVE_ACCEPT: &str =
    "application/zip,application/octet-stream,application/json;q=0.9,*/*;q=0.8";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const VERSION_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of config versions and bundles
///
/// Implemented by [`ConfigToolClient`] for the real service.
pub trait ConfigSource {
    /// Latest bundle version offered by the source
    fn latest_version(&self) -> Result<u64, RemoteError>;

    /// Stream the bundle for `api_key` into `sink`, returning the bytes written
    fn fetch_bundle(&self, api_key: &str, sink: &mut dyn Write) -> Result<u64, RemoteError>;
}

/// Blocking HTTP client for the config tool service
pub struct ConfigToolClient {
    client: Client,
    endpoint: Url,
}

impl ConfigToolClient {
    /// Create a client for `endpoint`
    pub fn new(endpoint: &str) -> Result<Self, RemoteError> {
        let endpoint = Url::parse(endpoint).map_err(|e| RemoteError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(RemoteError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                reason: format!("unsupported scheme '{}'", endpoint.scheme()),
            });
        }

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static(ARCHIVE_ACCEPT));

        // Bundle downloads can be slow, so only the version query gets an overall timeout
        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(None::<Duration>)
            .build()?;

        Ok(Self { client, endpoint })
    }

    /// The configured endpoint
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// URL of the version query
    pub fn version_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("query", "version");
        url
    }

    /// URL of the bundle download for `api_key`
    pub fn download_url(&self, api_key: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("query", "getconfig")
            .append_pair("apikey", api_key);
        url
    }

    fn check_status(url: &Url, response: Response) -> Result<Response, RemoteError> {
        let status = response.status();
        tracing::debug!(
            url = %redact(url),
            status = status.as_u16(),
            content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-"),
            "Config tool response"
        );

        if !status.is_success() {
            return Err(RemoteError::Status {
                url: redact(url),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

impl ConfigSource for ConfigToolClient {
    fn latest_version(&self) -> Result<u64, RemoteError> {
        let url = self.version_url();
        let response = self
            .client
            .get(url.clone())
            .timeout(VERSION_TIMEOUT)
            .send()?;
        let body = Self::check_status(&url, response)?.text()?;

        let trimmed = body.trim();
        parse_version(trimmed).ok_or_else(|| RemoteError::InvalidVersion(trimmed.to_string()))
    }

    fn fetch_bundle(&self, api_key: &str, sink: &mut dyn Write) -> Result<u64, RemoteError> {
        let url = self.download_url(api_key);
        let response = self.client.get(url.clone()).send()?;
        let mut response = Self::check_status(&url, response)?;

        let written = response.copy_to(sink)?;
        sink.flush()?;
        Ok(written)
    }
}

/// Render a URL for logs and errors without the access key
fn redact(url: &Url) -> String {
    if !url.query_pairs().any(|(k, _)| k == "apikey") {
        return url.to_string();
    }

    let mut clean = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "apikey" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    clean.query_pairs_mut().clear().extend_pairs(pairs);
    clean.to_string()
}
