use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use synaptic_core::{MetadataMode, SynapticError, TextNode};
use synaptic_vectorstores::{
    node_to_metadata_dict, DecoderChain, ExactMatchFilter, NodeVectorStore, StoredRow,
    VectorStoreQuery, VectorStoreQueryResult, DEFAULT_TEXT_KEY,
};

use crate::client::{
    HttpMetalClient, MetalClient, MetalFilter, MetalFilters, MetalIndexPayload,
    MetalSearchPayload,
};
use crate::MetalConfig;

/// Convert flat equality filters into Metal's `{field, value}` shape.
pub fn to_metal_filters(filters: &[ExactMatchFilter]) -> Vec<MetalFilter> {
    filters
        .iter()
        .map(|f| MetalFilter {
            field: f.key.clone(),
            value: f.value.clone(),
        })
        .collect()
}

/// Map a raw Metal distance to a similarity: `1 - e^(-dist)`.
///
/// Zero distance maps to zero and the score approaches one as the distance
/// grows. Negative distances are not clamped.
pub fn distance_to_similarity(dist: f64) -> f32 {
    (1.0 - (-dist).exp()) as f32
}

/// Metal-specific query options that the generic query cannot express.
#[derive(Debug, Clone, Default)]
pub struct MetalQueryOptions {
    /// Raw Metal filter value. Mutually exclusive with `VectorStoreQuery::filters`.
    pub filters: Option<Value>,
}

impl MetalQueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filters(mut self, filters: Value) -> Self {
        self.filters = Some(filters);
        self
    }
}

/// Metal-backed implementation of the [`NodeVectorStore`] trait.
///
/// Node text is stored under the `"text"` metadata key next to the
/// serialized node; reads fall back to the legacy metadata layout when the
/// serialized node is missing.
pub struct MetalVectorStore {
    config: MetalConfig,
    client: Option<Arc<dyn MetalClient>>,
    decoders: DecoderChain,
    flat_metadata: bool,
}

impl MetalVectorStore {
    pub const CLASS_NAME: &'static str = "MetalVectorStore";

    /// Create a store backed by an [`HttpMetalClient`] for `config`.
    pub fn new(config: MetalConfig) -> Result<Self, SynapticError> {
        let client = HttpMetalClient::new(config.clone())?;
        Ok(Self::from_client(config, Arc::new(client)))
    }

    /// Create a store around an existing client.
    pub fn from_client(config: MetalConfig, client: Arc<dyn MetalClient>) -> Self {
        Self {
            config,
            client: Some(client),
            decoders: DecoderChain::standard(),
            flat_metadata: false,
        }
    }

    /// Create a store with no client bound. Every operation fails with
    /// [`SynapticError::Config`] until one is attached with [`with_client`](Self::with_client).
    pub fn unbound(config: MetalConfig) -> Self {
        Self {
            config,
            client: None,
            decoders: DecoderChain::standard(),
            flat_metadata: false,
        }
    }

    pub fn with_client(mut self, client: Arc<dyn MetalClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Replace the decoders used to turn search hits into nodes.
    pub fn with_decoders(mut self, decoders: DecoderChain) -> Self {
        self.decoders = decoders;
        self
    }

    pub fn config(&self) -> &MetalConfig {
        &self.config
    }

    /// The underlying Metal client, for operations this store does not model.
    pub fn client(&self) -> Option<&Arc<dyn MetalClient>> {
        self.client.as_ref()
    }

    pub fn flat_metadata(&self) -> bool {
        self.flat_metadata
    }

    fn require_client(&self) -> Result<&Arc<dyn MetalClient>, SynapticError> {
        self.client
            .as_ref()
            .ok_or_else(|| SynapticError::Config("metal client not initialized".to_string()))
    }

    /// Query with Metal-specific options.
    ///
    /// Filters come from `query.filters` (flattened to equality filters) or
    /// from `options.filters`, never both. Hits keep Metal's order.
    pub async fn query_with_options(
        &self,
        query: &VectorStoreQuery,
        options: &MetalQueryOptions,
    ) -> Result<VectorStoreQueryResult, SynapticError> {
        let filters = match (&query.filters, &options.filters) {
            (Some(_), Some(_)) => {
                return Err(SynapticError::Validation(
                    "cannot specify filter via both query and options; use options only for \
                     Metal specific filters not supported by the generic query"
                        .to_string(),
                ))
            }
            (Some(filters), None) => {
                MetalFilters::Fields(to_metal_filters(&filters.legacy_filters()?))
            }
            (None, Some(raw)) => MetalFilters::Raw(raw.clone()),
            (None, None) => MetalFilters::default(),
        };

        let client = self.require_client()?;
        let payload = MetalSearchPayload {
            embedding: query.query_embedding.clone(),
            filters,
        };
        let response = client.search(payload, query.similarity_top_k).await?;

        let mut result = VectorStoreQueryResult::with_capacity(response.data.len());
        for hit in &response.data {
            let row = StoredRow {
                id: &hit.id,
                text: &hit.text,
                metadata: &hit.metadata,
            };
            let node = self.decoders.decode(&row)?;
            result.push(node, distance_to_similarity(hit.dist), hit.id.clone());
        }

        tracing::debug!(
            index = %self.config.index_id,
            hits = result.len(),
            "Metal query complete"
        );
        Ok(result)
    }

    fn index_payload(&self, node: &TextNode) -> Result<MetalIndexPayload, SynapticError> {
        let mut metadata = Map::new();
        metadata.insert(
            DEFAULT_TEXT_KEY.to_string(),
            Value::String(node.get_content(MetadataMode::None)),
        );
        // Later keys win, including a user-supplied "text".
        metadata.extend(node_to_metadata_dict(node, true, self.flat_metadata)?);

        Ok(MetalIndexPayload {
            embedding: node.get_embedding()?.to_vec(),
            metadata,
            id: node.id.clone(),
        })
    }
}

#[async_trait]
impl NodeVectorStore for MetalVectorStore {
    fn class_name(&self) -> &'static str {
        Self::CLASS_NAME
    }

    fn stores_text(&self) -> bool {
        true
    }

    fn is_embedding_query(&self) -> bool {
        true
    }

    /// Index each node with its own request, in order. The first failure
    /// aborts the batch; nodes already sent stay indexed.
    async fn add(&self, nodes: &[TextNode]) -> Result<Vec<String>, SynapticError> {
        let client = self.require_client()?;

        let mut ids = Vec::with_capacity(nodes.len());
        for node in nodes {
            let payload = self.index_payload(node)?;
            client.index(payload).await?;
            ids.push(node.id.clone());
        }

        tracing::debug!(
            index = %self.config.index_id,
            count = ids.len(),
            "indexed nodes into Metal"
        );
        Ok(ids)
    }

    async fn delete(&self, ref_doc_id: &str) -> Result<(), SynapticError> {
        let client = self.require_client()?;
        client.delete_one(ref_doc_id).await?;
        Ok(())
    }

    async fn query(
        &self,
        query: &VectorStoreQuery,
    ) -> Result<VectorStoreQueryResult, SynapticError> {
        self.query_with_options(query, &MetalQueryOptions::default())
            .await
    }
}
