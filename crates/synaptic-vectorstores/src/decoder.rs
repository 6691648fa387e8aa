use serde_json::{Map, Value};
use synaptic_core::{SynapticError, TextNode};

use crate::metadata::{legacy_metadata_dict_to_node, metadata_dict_to_node, DEFAULT_TEXT_KEY};

/// One row as returned by a backend search, before decoding.
#[derive(Debug, Clone, Copy)]
pub struct StoredRow<'a> {
    pub id: &'a str,
    pub text: &'a str,
    pub metadata: &'a Value,
}

/// A strategy that turns a stored row into a [`TextNode`].
pub trait MetadataDecoder: Send + Sync {
    fn name(&self) -> &'static str;

    fn decode(&self, row: &StoredRow<'_>) -> Result<TextNode, SynapticError>;
}

/// Decodes rows whose metadata carries the serialized node.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeContentDecoder;

impl MetadataDecoder for NodeContentDecoder {
    fn name(&self) -> &'static str {
        "node_content"
    }

    fn decode(&self, row: &StoredRow<'_>) -> Result<TextNode, SynapticError> {
        let metadata = row.metadata.as_object().ok_or_else(|| {
            SynapticError::Parsing(format!("metadata of row '{}' is not an object", row.id))
        })?;
        metadata_dict_to_node(metadata, Some(row.text))
    }
}

/// Decodes rows written with the legacy metadata layout.
#[derive(Debug, Clone)]
pub struct LegacyMetadataDecoder {
    text_key: String,
}

impl LegacyMetadataDecoder {
    pub fn new(text_key: impl Into<String>) -> Self {
        Self {
            text_key: text_key.into(),
        }
    }
}

impl Default for LegacyMetadataDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_TEXT_KEY)
    }
}

impl MetadataDecoder for LegacyMetadataDecoder {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn decode(&self, row: &StoredRow<'_>) -> Result<TextNode, SynapticError> {
        let empty = Map::new();
        let metadata = match row.metadata {
            Value::Null => &empty,
            Value::Object(map) => map,
            _ => {
                return Err(SynapticError::Parsing(format!(
                    "metadata of row '{}' is not an object",
                    row.id
                )))
            }
        };

        let parts = legacy_metadata_dict_to_node(metadata, &self.text_key)?;

        let mut node = TextNode::new(row.id, row.text);
        node.start_char_idx = parts.start_char_idx();
        node.end_char_idx = parts.end_char_idx();
        node.metadata = parts.metadata;
        node.relationships = parts.relationships;
        Ok(node)
    }
}

/// Ordered list of decoders; the first success wins.
pub struct DecoderChain {
    decoders: Vec<Box<dyn MetadataDecoder>>,
}

impl DecoderChain {
    /// An empty chain. Decoding fails until a decoder is pushed.
    pub fn new() -> Self {
        Self {
            decoders: Vec::new(),
        }
    }

    /// Current layout first, then the legacy layout.
    pub fn standard() -> Self {
        Self::new()
            .with_decoder(NodeContentDecoder)
            .with_decoder(LegacyMetadataDecoder::default())
    }

    pub fn with_decoder(mut self, decoder: impl MetadataDecoder + 'static) -> Self {
        self.decoders.push(Box::new(decoder));
        self
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Try each decoder in order. If all fail, the last error is returned.
    pub fn decode(&self, row: &StoredRow<'_>) -> Result<TextNode, SynapticError> {
        let mut last_err = None;
        for decoder in &self.decoders {
            match decoder.decode(row) {
                Ok(node) => return Ok(node),
                Err(e) => {
                    tracing::debug!(
                        decoder = decoder.name(),
                        row_id = row.id,
                        error = %e,
                        "metadata decoder failed, trying next"
                    );
                    last_err = Some(e);
                }
            }
        }
        Err(last_err
            .unwrap_or_else(|| SynapticError::Parsing("no metadata decoders configured".into())))
    }
}

impl Default for DecoderChain {
    fn default() -> Self {
        Self::standard()
    }
}
