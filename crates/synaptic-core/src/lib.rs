//! Core types shared by the Synaptic crates.
//!
//! - [`SynapticError`] is the single error type returned across crate
//!   boundaries.
//! - [`TextNode`] is the unit of retrievable content that vector stores read
//!   and write, together with its [`NodeRelationship`] links.

mod error;
mod node;

pub use error::SynapticError;
pub use node::{
    MetadataMode, NodeRelationship, RelatedNodeInfo, RelatedNodeType, TextNode,
    DEFAULT_METADATA_TEMPLATE, DEFAULT_TEXT_TEMPLATE,
};
