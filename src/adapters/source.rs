use crate::domain::model::Record;
use crate::domain::ports::RecordSource;
use crate::utils::error::{Result, TableError};
use crate::utils::validation::{validate_path, validate_url};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use url::Url;

/// Upper bound on `next` links followed by [`HttpSource`].
const MAX_PAGES: usize = 100;

/// Accepts a bare array of records or a `{"results": [...], "next": ...}`
/// envelope. Returns the records and the next page URL, if any.
pub fn records_from_payload(payload: Value) -> Result<(Vec<Record>, Option<String>)> {
    match payload {
        Value::Array(items) => Ok((to_records(items)?, None)),
        Value::Object(mut obj) => match obj.remove("results") {
            Some(Value::Array(items)) => {
                let next = obj.get("next").and_then(Value::as_str).map(str::to_string);
                Ok((to_records(items)?, next))
            }
            Some(_) => Err(TableError::SourceError {
                message: "'results' must be an array".to_string(),
            }),
            None => Err(TableError::SourceError {
                message: "expected an array of records or a 'results' envelope".to_string(),
            }),
        },
        other => Err(TableError::SourceError {
            message: format!("unexpected payload: {}", other),
        }),
    }
}

fn to_records(items: Vec<Value>) -> Result<Vec<Record>> {
    items.into_iter().map(Record::from_value).collect()
}

/// Records from a JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        validate_path("input", &path.to_string_lossy())?;
        Ok(Self { path })
    }
}

#[async_trait]
impl RecordSource for JsonFileSource {
    async fn fetch(&self) -> Result<Vec<Record>> {
        let content = tokio::fs::read(&self.path).await?;
        let payload: Value = serde_json::from_slice(&content)?;
        let (records, _) = records_from_payload(payload)?;
        Ok(records)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Records from a JSON API, following `next` links of paginated responses.
#[derive(Debug, Clone)]
pub struct HttpSource {
    endpoint: String,
    headers: HashMap<String, String>,
    timeout_seconds: Option<u64>,
    client: Client,
}

impl HttpSource {
    pub fn new(endpoint: &str) -> Result<Self> {
        validate_url("input", endpoint)?;
        Ok(Self {
            endpoint: endpoint.to_string(),
            headers: HashMap::new(),
            timeout_seconds: None,
            client: Client::new(),
        })
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// NetBox style `Authorization: Token <token>`.
    pub fn token(self, token: &str) -> Self {
        self.header("Authorization", &format!("Token {}", token))
    }

    pub fn timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    /// `next` links must stay on the endpoint's origin, since every request
    /// carries the configured headers (including the API token).
    fn check_next(&self, link: &str) -> Result<String> {
        let endpoint = Url::parse(&self.endpoint).map_err(|e| TableError::SourceError {
            message: format!("invalid endpoint {}: {}", self.endpoint, e),
        })?;
        let next = endpoint.join(link).map_err(|e| TableError::SourceError {
            message: format!("invalid next link {}: {}", link, e),
        })?;

        if next.origin() != endpoint.origin() {
            tracing::warn!("📡 Refusing to follow next link to another origin: {}", next);
            return Err(TableError::SourceError {
                message: format!(
                    "next link {} leaves the origin of {}",
                    next,
                    self.endpoint
                ),
            });
        }
        Ok(next.to_string())
    }

    async fn fetch_page(&self, url: &str) -> Result<Value> {
        let mut request = self.client.get(url).header("Accept", "application/json");

        for (key, value) in &self.headers {
            request = request.header(key, value);
        }

        if let Some(timeout) = self.timeout_seconds {
            request = request.timeout(std::time::Duration::from_secs(timeout));
        }

        tracing::debug!("📡 Making API request to: {}", url);
        let response = request.send().await?;
        tracing::debug!("📡 API response status: {}", response.status());

        if !response.status().is_success() {
            return Err(TableError::SourceError {
                message: format!("API request failed with status: {}", response.status()),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl RecordSource for HttpSource {
    async fn fetch(&self) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        let mut next = Some(self.endpoint.clone());
        let mut pages = 0;

        while let Some(url) = next.take() {
            if pages == MAX_PAGES {
                tracing::warn!("📡 Stopping after {} pages from {}", MAX_PAGES, self.endpoint);
                break;
            }
            let (page, following) = records_from_payload(self.fetch_page(&url).await?)?;
            pages += 1;
            records.extend(page);
            next = following.map(|link| self.check_next(&link)).transpose()?;
        }

        tracing::info!("📡 Fetched {} records in {} page(s)", records.len(), pages);
        Ok(records)
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}
