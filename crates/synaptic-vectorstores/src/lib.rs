mod decoder;
mod filters;
mod metadata;
mod query;

pub use decoder::{
    DecoderChain, LegacyMetadataDecoder, MetadataDecoder, NodeContentDecoder, StoredRow,
};
pub use filters::{
    ExactMatchFilter, FilterCondition, FilterEntry, FilterOperator, MetadataFilter,
    MetadataFilters,
};
pub use metadata::{
    legacy_metadata_dict_to_node, metadata_dict_to_node, node_to_metadata_dict,
    validate_is_flat_dict, LegacyNodeParts, DEFAULT_TEXT_KEY, NODE_CONTENT_KEY, NODE_TYPE_KEY,
};
pub use query::{VectorStoreQuery, VectorStoreQueryResult};

use async_trait::async_trait;
use synaptic_core::{SynapticError, TextNode};

/// Trait for vector storage backends that persist whole nodes.
///
/// Nodes arrive with their embeddings already computed; queries carry a
/// pre-computed query embedding.
#[async_trait]
pub trait NodeVectorStore: Send + Sync {
    /// Stable name used for registry lookups and introspection.
    fn class_name(&self) -> &'static str;

    /// Whether the backend keeps node text alongside the vectors.
    fn stores_text(&self) -> bool {
        false
    }

    /// Whether queries must carry an embedding rather than raw text.
    fn is_embedding_query(&self) -> bool {
        true
    }

    /// Add nodes to the store, returning their ids in input order.
    async fn add(&self, nodes: &[TextNode]) -> Result<Vec<String>, SynapticError>;

    /// Delete everything stored under a reference document id.
    async fn delete(&self, ref_doc_id: &str) -> Result<(), SynapticError>;

    /// Run a similarity query.
    async fn query(&self, query: &VectorStoreQuery)
        -> Result<VectorStoreQueryResult, SynapticError>;
}
