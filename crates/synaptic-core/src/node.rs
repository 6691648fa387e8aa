use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::SynapticError;

/// Default template used by [`TextNode::get_content`] when metadata is rendered.
pub const DEFAULT_TEXT_TEMPLATE: &str = "{metadata_str}\n\n{content}";
/// Default template for a single `key: value` metadata line.
pub const DEFAULT_METADATA_TEMPLATE: &str = "{key}: {value}";

const DEFAULT_METADATA_SEPARATOR: &str = "\n";

/// How a node's relation to another node is interpreted.
///
/// Serialized as the single-digit codes used by stored node payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeRelationship {
    /// The document this node was derived from.
    #[serde(rename = "1")]
    Source,
    #[serde(rename = "2")]
    Previous,
    #[serde(rename = "3")]
    Next,
    #[serde(rename = "4")]
    Parent,
    #[serde(rename = "5")]
    Child,
}

impl NodeRelationship {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeRelationship::Source => "1",
            NodeRelationship::Previous => "2",
            NodeRelationship::Next => "3",
            NodeRelationship::Parent => "4",
            NodeRelationship::Child => "5",
        }
    }
}

impl fmt::Display for NodeRelationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeRelationship {
    type Err = SynapticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" => Ok(NodeRelationship::Source),
            "2" => Ok(NodeRelationship::Previous),
            "3" => Ok(NodeRelationship::Next),
            "4" => Ok(NodeRelationship::Parent),
            "5" => Ok(NodeRelationship::Child),
            other => Err(SynapticError::Parsing(format!(
                "unknown node relationship '{other}'"
            ))),
        }
    }
}

/// A pointer to another node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedNodeInfo {
    pub node_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl RelatedNodeInfo {
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            node_type: None,
            metadata: Map::new(),
            hash: None,
        }
    }
}

/// Target of a relationship: a single node, or a list for [`NodeRelationship::Child`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelatedNodeType {
    One(RelatedNodeInfo),
    Many(Vec<RelatedNodeInfo>),
}

impl From<RelatedNodeInfo> for RelatedNodeType {
    fn from(info: RelatedNodeInfo) -> Self {
        RelatedNodeType::One(info)
    }
}

/// Which metadata keys are rendered into a node's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetadataMode {
    All,
    Embed,
    Llm,
    #[default]
    None,
}

/// A chunk of text plus everything a vector store needs to persist it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    #[serde(rename = "id_")]
    pub id: String,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub excluded_embed_metadata_keys: Vec<String>,
    #[serde(default)]
    pub excluded_llm_metadata_keys: Vec<String>,
    #[serde(default)]
    pub relationships: BTreeMap<NodeRelationship, RelatedNodeType>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub start_char_idx: Option<usize>,
    #[serde(default)]
    pub end_char_idx: Option<usize>,
    #[serde(default = "default_text_template")]
    pub text_template: String,
    #[serde(default = "default_metadata_template")]
    pub metadata_template: String,
    #[serde(default = "default_metadata_separator", alias = "metadata_seperator")]
    pub metadata_separator: String,
}

fn default_text_template() -> String {
    DEFAULT_TEXT_TEMPLATE.to_string()
}

fn default_metadata_template() -> String {
    DEFAULT_METADATA_TEMPLATE.to_string()
}

fn default_metadata_separator() -> String {
    DEFAULT_METADATA_SEPARATOR.to_string()
}

impl TextNode {
    /// Type tag written next to serialized nodes.
    pub const CLASS_NAME: &'static str = "TextNode";

    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            embedding: None,
            metadata: Map::new(),
            excluded_embed_metadata_keys: Vec::new(),
            excluded_llm_metadata_keys: Vec::new(),
            relationships: BTreeMap::new(),
            text: text.into(),
            start_char_idx: None,
            end_char_idx: None,
            text_template: default_text_template(),
            metadata_template: default_metadata_template(),
            metadata_separator: default_metadata_separator(),
        }
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_relationship(
        mut self,
        relationship: NodeRelationship,
        related: impl Into<RelatedNodeType>,
    ) -> Self {
        self.relationships.insert(relationship, related.into());
        self
    }

    pub fn with_char_range(mut self, start: usize, end: usize) -> Self {
        self.start_char_idx = Some(start);
        self.end_char_idx = Some(end);
        self
    }

    /// Id of the source document, taken from the [`NodeRelationship::Source`] link.
    pub fn ref_doc_id(&self) -> Option<&str> {
        match self.relationships.get(&NodeRelationship::Source) {
            Some(RelatedNodeType::One(info)) => Some(info.node_id.as_str()),
            _ => None,
        }
    }

    /// The node's embedding, or an error if it was never computed.
    pub fn get_embedding(&self) -> Result<&[f32], SynapticError> {
        self.embedding.as_deref().ok_or_else(|| {
            SynapticError::Validation(format!("embedding not set for node '{}'", self.id))
        })
    }

    /// Render metadata as `key: value` lines, honoring the per-mode exclusions.
    pub fn get_metadata_str(&self, mode: MetadataMode) -> String {
        let excluded: &[String] = match mode {
            MetadataMode::None => return String::new(),
            MetadataMode::All => &[],
            MetadataMode::Embed => &self.excluded_embed_metadata_keys,
            MetadataMode::Llm => &self.excluded_llm_metadata_keys,
        };

        self.metadata
            .iter()
            .filter(|(key, _)| !excluded.contains(key))
            .map(|(key, value)| {
                self.metadata_template
                    .replace("{key}", key)
                    .replace("{value}", &value_to_display(value))
            })
            .collect::<Vec<_>>()
            .join(&self.metadata_separator)
    }

    /// Node text, prefixed with rendered metadata unless `mode` is [`MetadataMode::None`].
    pub fn get_content(&self, mode: MetadataMode) -> String {
        let metadata_str = self.get_metadata_str(mode);
        let metadata_str = metadata_str.trim();
        if mode == MetadataMode::None || metadata_str.is_empty() {
            return self.text.clone();
        }

        self.text_template
            .replace("{metadata_str}", metadata_str)
            .replace("{content}", &self.text)
            .trim()
            .to_string()
    }
}

fn value_to_display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
