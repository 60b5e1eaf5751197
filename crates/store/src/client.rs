use std::time::Duration;

use async_trait::async_trait;
use kfzroute_core::config::StoreConfig;
use kfzroute_core::ApplicationError;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::filters::QueryFilters;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("data store url is not configured")]
    NotConfigured,
    #[error("data store request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("data store query failed: {status}")]
    Status { table: String, status: String },
    #[error("data store returned an unexpected payload: {0}")]
    Decode(String),
}

impl From<StoreError> for ApplicationError {
    fn from(error: StoreError) -> Self {
        ApplicationError::DataStore(error.to_string())
    }
}

/// Read-only access to the tabular data service.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Returns the matching rows as delivered; an empty result is not an error.
    async fn query(&self, table: &str, filters: &QueryFilters) -> Result<Vec<Value>, StoreError>;
}

/// PostgREST-style client (`{base}/rest/v1/{table}?column=op.value`).
#[derive(Clone)]
pub struct RestDataStore {
    client: Client,
    base_url: Option<String>,
    service_key: Option<SecretString>,
}

impl RestDataStore {
    pub fn new(client: Client, base_url: Option<String>, service_key: Option<SecretString>) -> Self {
        Self { client, base_url, service_key }
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut builder = Client::builder();
        if let Some(timeout_secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout_secs));
        }

        Ok(Self::new(builder.build()?, config.url.clone(), config.service_key.clone()))
    }

    fn table_url(&self, table: &str) -> Result<String, StoreError> {
        let base = self
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(StoreError::NotConfigured)?;

        Ok(format!("{}/rest/v1/{table}", base.trim_end_matches('/')))
    }
}

#[async_trait]
impl DataStore for RestDataStore {
    async fn query(&self, table: &str, filters: &QueryFilters) -> Result<Vec<Value>, StoreError> {
        let url = self.table_url(table)?;
        let key = self.service_key.as_ref().map(|key| key.expose_secret()).unwrap_or_default();

        debug!(event_name = "store.query.start", table, filters = ?filters.pairs(), "querying data store");

        let response = self
            .client
            .get(&url)
            .query(filters.pairs())
            .header("apikey", key)
            .bearer_auth(key)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status { table: table.to_string(), status: status.to_string() });
        }

        match response.json::<Value>().await? {
            Value::Array(rows) => Ok(rows),
            other => Err(StoreError::Decode(format!(
                "expected a JSON array from `{table}`, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
