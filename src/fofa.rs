//! FOFA search API client
//!
//! One blocking GET per query against the `search/all` endpoint. The query
//! is sent base64-encoded and the credentials travel as query parameters.
//! There is no retry: a failed request fails the run.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::info;
use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};

/// Field order every [`RawResultRow`] relies on.
pub const DEFAULT_FIELDS: &str = "host,ip,port,title,domain,country,protocol";

/// One result row as returned by the API; any field may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResultRow {
    pub host: Option<String>,
    pub ip: Option<String>,
    pub port: Option<String>,
    pub title: Option<String>,
    pub domain: Option<String>,
    pub country: Option<String>,
    pub protocol: Option<String>,
}

impl RawResultRow {
    /// Reads the positional fields in [`DEFAULT_FIELDS`] order.
    pub fn from_values(values: &[Value]) -> Self {
        let field = |position: usize| coerce(values.get(position));
        Self {
            host: field(0),
            ip: field(1),
            port: field(2),
            title: field(3),
            domain: field(4),
            country: field(5),
            protocol: field(6),
        }
    }
}

fn coerce(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Body of a search response. `error` set means the query itself failed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub errmsg: Option<String>,
    #[serde(default)]
    pub results: Vec<Vec<Value>>,
    #[serde(default)]
    pub size: Option<u64>,
}

impl SearchResponse {
    /// Rows of a successful response, or [`Error::Api`] with the API message.
    pub fn into_rows(self) -> Result<Vec<RawResultRow>> {
        if self.error {
            return Err(Error::Api(
                self.errmsg.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        Ok(self
            .results
            .iter()
            .map(|values| RawResultRow::from_values(values))
            .collect())
    }
}

#[derive(Debug, Clone)]
pub struct FofaClient {
    client: Client,
    api_url: String,
    email: String,
    key: String,
    page_size: u32,
}

impl FofaClient {
    /// Fails with [`Error::Config`] when credentials are missing, before any
    /// request is made.
    pub fn new(config: &Config) -> Result<Self> {
        let (email, key) = config.credentials()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            email: email.to_string(),
            key: key.to_string(),
            page_size: config.page_size,
        })
    }

    /// Full request URL for `query`.
    pub fn search_url(&self, query: &str, fields: Option<&str>, size: Option<u32>) -> Result<Url> {
        let qbase64 = BASE64.encode(query.as_bytes());
        let size = size.unwrap_or(self.page_size).to_string();
        let fields = fields.unwrap_or(DEFAULT_FIELDS);

        let url = Url::parse_with_params(
            &self.api_url,
            &[
                ("email", self.email.as_str()),
                ("key", self.key.as_str()),
                ("qbase64", qbase64.as_str()),
                ("size", size.as_str()),
                ("fields", fields),
            ],
        )?;
        Ok(url)
    }

    pub fn search(&self, query: &str, fields: Option<&str>, size: Option<u32>) -> Result<SearchResponse> {
        let start_time = Instant::now();
        let url = self.search_url(query, fields, size)?;
        info!(action = "start", component = "fofa_search", query = query, "Sending search request");

        // The URL carries the API key, keep it out of error messages.
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(reqwest::Error::without_url)?;
        let body: SearchResponse = response.json().map_err(reqwest::Error::without_url)?;

        info!(
            action = "complete",
            component = "fofa_search",
            error = body.error,
            row_count = body.results.len(),
            reported_size = ?body.size,
            duration_ms = start_time.elapsed().as_millis(),
            "Search request completed"
        );
        Ok(body)
    }
}
