use synaptic_core::TextNode;

use crate::MetadataFilters;

/// Input to [`NodeVectorStore::query`](crate::NodeVectorStore::query).
#[derive(Debug, Clone, PartialEq)]
pub struct VectorStoreQuery {
    pub query_embedding: Option<Vec<f32>>,
    /// Maximum number of results to return (default: 1).
    pub similarity_top_k: usize,
    pub filters: Option<MetadataFilters>,
    /// Original query text, kept for backends that can use it.
    pub query_str: Option<String>,
}

impl VectorStoreQuery {
    pub fn new(query_embedding: Vec<f32>) -> Self {
        Self {
            query_embedding: Some(query_embedding),
            ..Self::default()
        }
    }

    pub fn with_top_k(mut self, k: usize) -> Self {
        self.similarity_top_k = k;
        self
    }

    pub fn with_filters(mut self, filters: MetadataFilters) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn with_query_str(mut self, query_str: impl Into<String>) -> Self {
        self.query_str = Some(query_str.into());
        self
    }
}

impl Default for VectorStoreQuery {
    fn default() -> Self {
        Self {
            query_embedding: None,
            similarity_top_k: 1,
            filters: None,
            query_str: None,
        }
    }
}

/// Query output as three index-aligned sequences, in backend order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorStoreQueryResult {
    pub nodes: Vec<TextNode>,
    pub similarities: Vec<f32>,
    pub ids: Vec<String>,
}

impl VectorStoreQueryResult {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            similarities: Vec::with_capacity(capacity),
            ids: Vec::with_capacity(capacity),
        }
    }

    /// Append one hit, keeping the three sequences aligned.
    pub fn push(&mut self, node: TextNode, similarity: f32, id: impl Into<String>) {
        self.nodes.push(node);
        self.similarities.push(similarity);
        self.ids.push(id.into());
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterate over `(node, similarity, id)` triples.
    pub fn iter(&self) -> impl Iterator<Item = (&TextNode, f32, &str)> {
        self.nodes
            .iter()
            .zip(self.similarities.iter().copied())
            .zip(self.ids.iter())
            .map(|((node, score), id)| (node, score, id.as_str()))
    }
}
