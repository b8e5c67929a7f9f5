//! PostgREST-backed record store.
//!
//! Talks to a `/rest/v1/{table}` endpoint (Supabase layout) using the
//! PostgREST filter syntax: `or=(col.ilike.*q*,col.ilike.*q*)`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use lookup_types::{ColumnSettings, Member, NameField, StoreSettings};

use crate::error::StoreError;
use crate::store::RecordStore;

type Row = Map<String, Value>;

/// Configuration for the REST record store.
#[derive(Debug)]
pub struct RestStoreConfig {
    /// Project URL (e.g., "https://xyz.supabase.co")
    pub base_url: String,

    /// Anonymous API key, sent as `apikey` and bearer token
    pub api_key: SecretString,

    /// Members table
    pub table: String,

    /// Request timeout
    pub timeout: Duration,

    /// Column names on the members table
    pub columns: ColumnSettings,
}

impl RestStoreConfig {
    /// Config for a project URL with the default table and columns.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: SecretString::from(api_key.into()),
            table: "members".to_string(),
            timeout: Duration::from_secs(10),
            columns: ColumnSettings::default(),
        }
    }

    /// Build from the `[store]` settings section.
    pub fn from_settings(settings: &StoreSettings) -> Result<Self, StoreError> {
        let base_url = settings
            .base_url
            .clone()
            .ok_or_else(|| StoreError::Config("store.base_url is not set".to_string()))?;
        let api_key = settings.api_key.clone().unwrap_or_else(|| {
            warn!("store.api_key is not set, sending anonymous requests");
            String::new()
        });

        Ok(Self {
            base_url,
            api_key: SecretString::from(api_key),
            table: settings.table.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
            columns: settings.columns.clone(),
        })
    }
}

/// Record store reading the roster over HTTP.
pub struct RestStore {
    client: Client,
    endpoint: Url,
    config: RestStoreConfig,
}

impl RestStore {
    /// Create a new REST store.
    pub fn new(config: RestStoreConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Config(e.to_string()))?;

        let endpoint = table_endpoint(&config.base_url, &config.table)?;

        Ok(Self {
            client,
            endpoint,
            config,
        })
    }

    /// The resolved `/rest/v1/{table}` URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn column(&self, field: NameField) -> &str {
        match field {
            NameField::LastName => &self.config.columns.last_name,
            NameField::FirstName => &self.config.columns.first_name,
        }
    }

    /// Build the `or=(...)` filter for a substring query.
    fn substring_filter(&self, fields: &[NameField], pattern: &str) -> String {
        let clauses: Vec<String> = fields
            .iter()
            .map(|f| {
                let value = format!("*{}*", escape_like(pattern));
                format!("{}.ilike.{}", self.column(*f), quote_value(&value))
            })
            .collect();
        format!("({})", clauses.join(","))
    }

    async fn fetch_rows(&self, params: &[(&str, String)]) -> Result<Vec<Row>, StoreError> {
        let key = self.config.api_key.expose_secret();
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(params)
            .header("apikey", key)
            .bearer_auth(key)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    StoreError::Unavailable(e.to_string())
                } else {
                    StoreError::Request(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Record store returned an error");
            return Err(StoreError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let rows: Vec<Row> = response.json().await?;
        debug!(count = rows.len(), "Fetched roster rows");
        Ok(rows)
    }

    fn decode_rows(&self, rows: Vec<Row>) -> Result<Vec<Member>, StoreError> {
        rows.iter()
            .map(|row| decode_member(row, &self.config.columns))
            .collect()
    }
}

#[async_trait]
impl RecordStore for RestStore {
    async fn query_substring(
        &self,
        fields: &[NameField],
        pattern: &str,
        limit: usize,
    ) -> Result<Vec<Member>, StoreError> {
        if fields.is_empty() {
            debug!("No fields to match, skipping request");
            return Ok(Vec::new());
        }
        let params = [
            ("select", "*".to_string()),
            ("or", self.substring_filter(fields, pattern)),
            ("limit", limit.to_string()),
        ];

        let rows = self.fetch_rows(&params).await?;
        self.decode_rows(rows)
    }

    async fn query_all(&self) -> Result<Vec<Member>, StoreError> {
        let rows = self.fetch_rows(&[("select", "*".to_string())]).await?;
        self.decode_rows(rows)
    }
}

fn table_endpoint(base_url: &str, table: &str) -> Result<Url, StoreError> {
    let mut url =
        Url::parse(base_url).map_err(|e| StoreError::InvalidUrl(format!("{base_url}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| StoreError::InvalidUrl(format!("{base_url}: cannot be a base")))?
        .pop_if_empty()
        .extend(["rest", "v1", table]);
    Ok(url)
}

/// Double-quote a filter value when it holds PostgREST reserved characters.
/// Escapes LIKE metacharacters so user text matches literally.
///
/// PostgREST turns every `*` into `%`, so a literal `*` can only be sent as
/// the single-character wildcard `_`; the client-side filter drops the extra
/// matches that lets through.
fn escape_like(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        match c {
            '\\' | '%' | '_' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '*' => escaped.push('_'),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn quote_value(value: &str) -> String {
    if value.contains([',', '(', ')', '"', '\\', ':']) {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}

fn decode_member(row: &Row, columns: &ColumnSettings) -> Result<Member, StoreError> {
    let id = row
        .get(&columns.id)
        .and_then(Value::as_i64)
        .ok_or_else(|| StoreError::Decode(format!("missing integer column '{}'", columns.id)))?;

    let text = |column: &str| -> Result<String, StoreError> {
        row.get(column)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| StoreError::Decode(format!("row {id}: missing text column '{column}'")))
    };

    let created_raw = text(&columns.created_at)?;
    let created_at = DateTime::parse_from_rfc3339(&created_raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Decode(format!("row {id}: bad timestamp '{created_raw}': {e}")))?;

    let member = Member {
        id,
        last_name: text(&columns.last_name)?,
        first_name: text(&columns.first_name)?,
        document_ref: text(&columns.document_ref)?,
        created_at,
    };
    member
        .validate()
        .map_err(|e| StoreError::Decode(e.to_string()))?;
    Ok(member)
}
