//! Conversion between [`TextNode`]s and the flat metadata maps stored by
//! vector store backends.
//!
//! Two layouts exist. The current one serializes the whole node (minus text
//! and embedding) under [`NODE_CONTENT_KEY`]. The legacy one stored node
//! position info and relationships as separate JSON strings next to the user
//! metadata; it is only ever read, never written.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use synaptic_core::{NodeRelationship, RelatedNodeInfo, RelatedNodeType, SynapticError, TextNode};

/// Key under which backends conventionally keep node text.
pub const DEFAULT_TEXT_KEY: &str = "text";
/// Key holding the JSON-serialized node.
pub const NODE_CONTENT_KEY: &str = "_node_content";
/// Key holding the node class name.
pub const NODE_TYPE_KEY: &str = "_node_type";

const REF_DOC_ID_KEYS: [&str; 3] = ["document_id", "doc_id", "ref_doc_id"];

/// Check that every metadata value is a scalar (string, number, bool or null).
pub fn validate_is_flat_dict(metadata: &Map<String, Value>) -> Result<(), SynapticError> {
    for (key, value) in metadata {
        if matches!(value, Value::Array(_) | Value::Object(_)) {
            return Err(SynapticError::Validation(format!(
                "value for metadata '{key}' must be a string, number, bool or null"
            )));
        }
    }
    Ok(())
}

/// Serialize a node into a metadata map suitable for storage.
///
/// The map holds the node's own metadata plus the serialized node, its type,
/// and the reference document id under the keys different backends filter
/// on. The stored node never carries its embedding; its text is blanked when
/// `remove_text` is set.
pub fn node_to_metadata_dict(
    node: &TextNode,
    remove_text: bool,
    flat_metadata: bool,
) -> Result<Map<String, Value>, SynapticError> {
    if flat_metadata {
        validate_is_flat_dict(&node.metadata)?;
    }

    let mut stored = node.clone();
    stored.embedding = None;
    if remove_text {
        stored.text = String::new();
    }
    let node_json = serde_json::to_string(&stored)
        .map_err(|e| SynapticError::Parsing(format!("failed to serialize node: {e}")))?;

    let ref_doc_id = node.ref_doc_id().unwrap_or("None");

    let mut metadata = node.metadata.clone();
    metadata.insert(NODE_CONTENT_KEY.to_string(), Value::String(node_json));
    metadata.insert(
        NODE_TYPE_KEY.to_string(),
        Value::String(TextNode::CLASS_NAME.to_string()),
    );
    for key in REF_DOC_ID_KEYS {
        metadata.insert(key.to_string(), Value::String(ref_doc_id.to_string()));
    }
    Ok(metadata)
}

/// Rebuild a node from a map written by [`node_to_metadata_dict`].
///
/// `text` replaces the stored text when given, since most backends keep the
/// text outside the serialized node.
pub fn metadata_dict_to_node(
    metadata: &Map<String, Value>,
    text: Option<&str>,
) -> Result<TextNode, SynapticError> {
    let node_json = match metadata.get(NODE_CONTENT_KEY) {
        Some(Value::String(json)) => json,
        Some(_) => {
            return Err(SynapticError::Parsing(format!(
                "'{NODE_CONTENT_KEY}' must be a JSON string"
            )))
        }
        None => {
            return Err(SynapticError::Parsing(
                "node content not found in metadata dict".to_string(),
            ))
        }
    };

    let mut node: TextNode = serde_json::from_str(node_json)
        .map_err(|e| SynapticError::Parsing(format!("invalid node content: {e}")))?;
    if let Some(text) = text {
        node.text = text.to_string();
    }
    Ok(node)
}

/// Pieces recovered from a legacy metadata map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyNodeParts {
    pub metadata: Map<String, Value>,
    pub node_info: Map<String, Value>,
    pub relationships: BTreeMap<NodeRelationship, RelatedNodeType>,
}

impl LegacyNodeParts {
    pub fn start_char_idx(&self) -> Option<usize> {
        self.node_info.get("start").and_then(char_offset)
    }

    pub fn end_char_idx(&self) -> Option<usize> {
        self.node_info.get("end").and_then(char_offset)
    }
}

/// A non-negative whole number, written either as an integer or as an
/// integral float (`3.0`). Anything else, or a value that does not fit in
/// `usize`, yields `None`.
fn char_offset(value: &Value) -> Option<usize> {
    let offset = match value.as_u64() {
        Some(v) => v,
        None => {
            let f = value.as_f64()?;
            if f < 0.0 || f.fract() != 0.0 || f >= u64::MAX as f64 {
                return None;
            }
            f as u64
        }
    };
    usize::try_from(offset).ok()
}

/// Split a legacy metadata map into user metadata, node info and relationships.
///
/// `node_info` and `relationships` were stored as JSON strings; both are
/// optional. The text key, `id` and the reference document id keys are
/// dropped; everything else is returned as metadata.
pub fn legacy_metadata_dict_to_node(
    metadata: &Map<String, Value>,
    text_key: &str,
) -> Result<LegacyNodeParts, SynapticError> {
    let mut metadata = metadata.clone();

    let node_info = match metadata.remove("node_info") {
        None => Map::new(),
        Some(raw) => parse_json_object("node_info", &raw)?,
    };

    let relationships = match metadata.remove("relationships") {
        None => BTreeMap::new(),
        Some(raw) => parse_json_object("relationships", &raw)?
            .into_iter()
            .map(
                |(code, target)| -> Result<(NodeRelationship, RelatedNodeType), SynapticError> {
                    let relationship: NodeRelationship = code.parse()?;
                    let node_id = match target {
                        Value::String(s) => s,
                        other => other.to_string(),
                    };
                    Ok((relationship, RelatedNodeType::One(RelatedNodeInfo::new(node_id))))
                },
            )
            .collect::<Result<BTreeMap<_, _>, SynapticError>>()?,
    };

    metadata.remove(text_key);
    metadata.remove("id");
    for key in REF_DOC_ID_KEYS {
        metadata.remove(key);
    }

    Ok(LegacyNodeParts {
        metadata,
        node_info,
        relationships,
    })
}

fn parse_json_object(field: &str, raw: &Value) -> Result<Map<String, Value>, SynapticError> {
    match raw {
        Value::String(s) if s.is_empty() => Ok(Map::new()),
        Value::String(s) => serde_json::from_str(s)
            .map_err(|e| SynapticError::Parsing(format!("invalid legacy '{field}': {e}"))),
        _ => Err(SynapticError::Parsing(format!(
            "legacy '{field}' must be a JSON string"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_json_object_accepts_empty_string() {
        assert!(parse_json_object("node_info", &json!("")).unwrap().is_empty());
    }

    #[test]
    fn parse_json_object_rejects_non_objects() {
        assert!(parse_json_object("node_info", &json!("[1, 2]")).is_err());
        assert!(parse_json_object("node_info", &json!(null)).is_err());
    }

    #[test]
    fn legacy_offsets_ignore_non_integers() {
        let parts = LegacyNodeParts {
            node_info: json!({"start": "3", "end": 9}).as_object().cloned().unwrap(),
            ..Default::default()
        };
        assert_eq!(parts.start_char_idx(), None);
        assert_eq!(parts.end_char_idx(), Some(9));
    }

    #[test]
    fn legacy_offsets_accept_integral_floats() {
        let parts = LegacyNodeParts {
            node_info: json!({"start": 3.0, "end": 12.5}).as_object().cloned().unwrap(),
            ..Default::default()
        };
        assert_eq!(parts.start_char_idx(), Some(3));
        assert_eq!(parts.end_char_idx(), None);
    }

    #[test]
    fn char_offset_rejects_negative_and_oversized_values() {
        assert_eq!(char_offset(&json!(-1)), None);
        assert_eq!(char_offset(&json!(-2.0)), None);
        assert_eq!(char_offset(&json!(1e30)), None);
        assert_eq!(char_offset(&json!(0)), Some(0));
    }
}
