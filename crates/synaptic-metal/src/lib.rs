//! Metal vector store integration for Synaptic.
//!
//! This crate provides [`MetalVectorStore`], an implementation of the
//! [`NodeVectorStore`](synaptic_vectorstores::NodeVectorStore) trait backed by
//! [Metal](https://getmetal.io/) using its REST API.
//!
//! # Example
//!
//! ```rust,no_run
//! use synaptic_metal::{MetalConfig, MetalVectorStore};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MetalConfig::new("your-api-key", "your-client-id", "your-index-id");
//! let store = MetalVectorStore::new(config)?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod fake;
mod vector_store;

pub use client::{
    HttpMetalClient, MetalClient, MetalFilter, MetalFilters, MetalIndexPayload,
    MetalSearchHit, MetalSearchPayload, MetalSearchResponse,
};
pub use config::MetalConfig;
pub use fake::{FakeMetalClient, MetalCall};
pub use vector_store::{
    distance_to_similarity, to_metal_filters, MetalQueryOptions, MetalVectorStore,
};

// Re-export core types for convenience.
pub use synaptic_core::TextNode;
pub use synaptic_vectorstores::{NodeVectorStore, VectorStoreQuery, VectorStoreQueryResult};
