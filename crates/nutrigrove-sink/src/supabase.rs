//! Record sink backed by a Supabase (PostgREST) table.
//!
//! Each record is inserted as `{"data": <record>}` and the generated `id` of
//! the returned row is reported back.

use std::time::Duration;

use nutrigrove_core::{AppConfig, NutrientRecord, SupabaseCredentials};
use reqwest::{Client, Url};
use serde_json::Value;

use crate::error::SinkError;
use crate::retry::retry_with_backoff;
use crate::sink::{RecordId, RecordSink};

/// HTTP and retry settings for [`SupabaseSink`].
#[derive(Debug, Clone, Copy)]
pub struct SinkOptions {
    pub timeout: Duration,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for SinkOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            backoff_base_ms: 1_000,
        }
    }
}

impl From<&AppConfig> for SinkOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.sink_timeout_secs),
            max_retries: config.sink_max_retries,
            backoff_base_ms: config.sink_backoff_base_ms,
        }
    }
}

#[derive(Clone)]
pub struct SupabaseSink {
    client: Client,
    base_url: String,
    anon_key: String,
    table: String,
    endpoint: Url,
    options: SinkOptions,
}

impl std::fmt::Debug for SupabaseSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseSink")
            .field("endpoint", &self.endpoint.as_str())
            .field("anon_key", &"[redacted]")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl SupabaseSink {
    /// Creates a sink that inserts into `table`.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Http`] if the HTTP client cannot be built, or
    /// [`SinkError::Config`] if the URL or table name is unusable.
    pub fn new(
        credentials: &SupabaseCredentials,
        table: &str,
        options: SinkOptions,
    ) -> Result<Self, SinkError> {
        let client = Client::builder()
            .timeout(options.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent("nutrigrove/0.1")
            .build()?;
        Self::with_client(client, &credentials.url, &credentials.anon_key, table, options)
    }

    fn with_client(
        client: Client,
        base_url: &str,
        anon_key: &str,
        table: &str,
        options: SinkOptions,
    ) -> Result<Self, SinkError> {
        let table = table.trim();
        if table.is_empty() {
            return Err(SinkError::Config("table name must not be empty".to_string()));
        }
        let base_url = base_url.trim_end_matches('/').to_string();
        let raw = format!("{base_url}/rest/v1/{table}");
        let endpoint = Url::parse(&raw)
            .map_err(|e| SinkError::Config(format!("invalid Supabase URL '{raw}': {e}")))?;
        Ok(Self {
            client,
            base_url,
            anon_key: anon_key.to_owned(),
            table: table.to_owned(),
            endpoint,
            options,
        })
    }

    /// The same connection pointed at another table.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Config`] if `table` is unusable.
    pub fn for_table(&self, table: &str) -> Result<Self, SinkError> {
        Self::with_client(
            self.client.clone(),
            &self.base_url,
            &self.anon_key,
            table,
            self.options,
        )
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    async fn post(&self, payload: &Value) -> Result<RecordId, SinkError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .header("Prefer", "return=representation")
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SinkError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.endpoint.to_string(),
                body,
            });
        }

        let rows: Vec<Value> = serde_json::from_str(&body).map_err(|source| {
            SinkError::Deserialize {
                context: format!("insert into {}", self.table),
                source,
            }
        })?;
        rows.first()
            .and_then(|row| row.get("id"))
            .and_then(record_id)
            .ok_or_else(|| SinkError::MissingId {
                table: self.table.clone(),
            })
    }
}

impl RecordSink for SupabaseSink {
    async fn insert(&self, record: &NutrientRecord) -> Result<RecordId, SinkError> {
        let data = serde_json::to_value(record).map_err(|source| SinkError::Serialize {
            context: format!("record '{}'", record.food_name),
            source,
        })?;
        let payload = serde_json::json!({ "data": data });
        let payload = &payload;

        retry_with_backoff(
            self.options.max_retries,
            self.options.backoff_base_ms,
            move || self.post(payload),
        )
        .await
    }
}

fn record_id(value: &Value) -> Option<RecordId> {
    match value {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
