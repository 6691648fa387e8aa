use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use synaptic_core::SynapticError;

use crate::MetalConfig;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// One equality constraint in Metal's filter shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetalFilter {
    pub field: String,
    pub value: Value,
}

/// Filters sent with a search: converted equality filters or a caller
/// supplied Metal-specific value passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetalFilters {
    Fields(Vec<MetalFilter>),
    Raw(Value),
}

impl Default for MetalFilters {
    fn default() -> Self {
        MetalFilters::Raw(Value::Object(Map::new()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetalSearchPayload {
    pub embedding: Option<Vec<f32>>,
    pub filters: MetalFilters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetalIndexPayload {
    pub embedding: Vec<f32>,
    pub metadata: Map<String, Value>,
    pub id: String,
}

/// A single search hit. `dist` is the raw distance; lower means closer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetalSearchHit {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub metadata: Value,
    pub dist: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetalSearchResponse {
    #[serde(default)]
    pub data: Vec<MetalSearchHit>,
}

impl MetalSearchResponse {
    pub fn new(data: Vec<MetalSearchHit>) -> Self {
        Self { data }
    }
}

// ---------------------------------------------------------------------------
// Client seam
// ---------------------------------------------------------------------------

/// The three Metal operations the vector store relies on.
///
/// Implementations own transport concerns; the store only sees success or
/// an error, which it propagates as-is.
#[async_trait]
pub trait MetalClient: Send + Sync {
    async fn search(
        &self,
        payload: MetalSearchPayload,
        limit: usize,
    ) -> Result<MetalSearchResponse, SynapticError>;

    async fn index(&self, payload: MetalIndexPayload) -> Result<Value, SynapticError>;

    async fn delete_one(&self, id: &str) -> Result<Value, SynapticError>;
}

/// Request body with the bound index id added next to the payload fields.
#[derive(Serialize)]
struct IndexedBody<'a, T: Serialize> {
    index: &'a str,
    #[serde(flatten)]
    payload: &'a T,
}

/// Production client talking to the Metal REST API over reqwest.
pub struct HttpMetalClient {
    config: MetalConfig,
    client: reqwest::Client,
}

impl HttpMetalClient {
    /// Create a client bound to `config.index_id`.
    ///
    /// Fails if any credential is blank or the HTTP client cannot be built.
    pub fn new(config: MetalConfig) -> Result<Self, SynapticError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| SynapticError::Config(format!("failed to build HTTP client: {e}")))?;
        Self::with_client(config, client)
    }

    /// Create a client with a custom reqwest client.
    pub fn with_client(config: MetalConfig, client: reqwest::Client) -> Result<Self, SynapticError> {
        config.validate()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &MetalConfig {
        &self.config
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("x-metal-api-key", &self.config.api_key)
            .header("x-metal-client-id", &self.config.client_id)
            .header("Content-Type", "application/json")
    }

    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        operation: &str,
    ) -> Result<Value, SynapticError> {
        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(|e| SynapticError::VectorStore(format!("Metal {operation} request failed: {e}")))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            SynapticError::VectorStore(format!("Metal {operation} response read failed: {e}"))
        })?;

        if !status.is_success() {
            return Err(SynapticError::VectorStore(format!(
                "Metal {operation} error ({}): {text}",
                status.as_u16()
            )));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| {
            SynapticError::VectorStore(format!("Metal {operation} returned invalid JSON: {e}"))
        })
    }
}

#[async_trait]
impl MetalClient for HttpMetalClient {
    async fn search(
        &self,
        payload: MetalSearchPayload,
        limit: usize,
    ) -> Result<MetalSearchResponse, SynapticError> {
        let url = format!("{}/search?limit={limit}", self.config.base_url);
        let body = IndexedBody {
            index: &self.config.index_id,
            payload: &payload,
        };
        tracing::debug!(index = %self.config.index_id, limit, "Metal search");

        let value = self.send(self.client.post(&url).json(&body), "search").await?;
        serde_json::from_value(value)
            .map_err(|e| SynapticError::VectorStore(format!("Metal search response malformed: {e}")))
    }

    async fn index(&self, payload: MetalIndexPayload) -> Result<Value, SynapticError> {
        let url = format!("{}/index", self.config.base_url);
        let body = IndexedBody {
            index: &self.config.index_id,
            payload: &payload,
        };
        tracing::debug!(index = %self.config.index_id, id = %payload.id, "Metal index");

        self.send(self.client.post(&url).json(&body), "index").await
    }

    async fn delete_one(&self, id: &str) -> Result<Value, SynapticError> {
        let url = format!(
            "{}/indexes/{}/documents/{}",
            self.config.base_url,
            urlencoding::encode(&self.config.index_id),
            urlencoding::encode(id)
        );
        tracing::debug!(index = %self.config.index_id, id, "Metal delete");

        self.send(self.client.delete(&url), "delete").await
    }
}
