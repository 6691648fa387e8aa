use serde_json::{json, Value};
use synaptic_core::{NodeRelationship, RelatedNodeInfo, RelatedNodeType, SynapticError, TextNode};
use synaptic_vectorstores::{
    legacy_metadata_dict_to_node, metadata_dict_to_node, node_to_metadata_dict,
    validate_is_flat_dict, NODE_CONTENT_KEY, NODE_TYPE_KEY,
};

fn sample_node() -> TextNode {
    TextNode::new("node-1", "The quick brown fox")
        .with_metadata("author", "ada")
        .with_metadata("page", 3)
        .with_embedding(vec![0.1, 0.2, 0.3])
        .with_char_range(10, 29)
        .with_relationship(NodeRelationship::Source, RelatedNodeInfo::new("doc-1"))
}

#[test]
fn metadata_dict_keeps_user_metadata_and_ref_doc_ids() {
    let dict = node_to_metadata_dict(&sample_node(), true, false).unwrap();

    assert_eq!(dict["author"], json!("ada"));
    assert_eq!(dict["page"], json!(3));
    assert_eq!(dict[NODE_TYPE_KEY], json!("TextNode"));
    assert_eq!(dict["document_id"], json!("doc-1"));
    assert_eq!(dict["doc_id"], json!("doc-1"));
    assert_eq!(dict["ref_doc_id"], json!("doc-1"));
}

#[test]
fn stored_node_drops_text_and_embedding() {
    let dict = node_to_metadata_dict(&sample_node(), true, false).unwrap();
    let content: Value = serde_json::from_str(dict[NODE_CONTENT_KEY].as_str().unwrap()).unwrap();

    assert_eq!(content["id_"], json!("node-1"));
    assert_eq!(content["text"], json!(""));
    assert_eq!(content["embedding"], Value::Null);
    assert_eq!(content["start_char_idx"], json!(10));
}

#[test]
fn keeps_text_when_not_removed() {
    let dict = node_to_metadata_dict(&sample_node(), false, false).unwrap();
    let content: Value = serde_json::from_str(dict[NODE_CONTENT_KEY].as_str().unwrap()).unwrap();
    assert_eq!(content["text"], json!("The quick brown fox"));
}

#[test]
fn missing_source_writes_none_placeholder() {
    let node = TextNode::new("n", "t");
    let dict = node_to_metadata_dict(&node, true, false).unwrap();
    assert_eq!(dict["doc_id"], json!("None"));
}

#[test]
fn round_trip_through_metadata_dict() {
    let node = sample_node();
    let dict = node_to_metadata_dict(&node, true, false).unwrap();
    let decoded = metadata_dict_to_node(&dict, Some("The quick brown fox")).unwrap();

    assert_eq!(decoded.id, node.id);
    assert_eq!(decoded.text, node.text);
    assert_eq!(decoded.metadata, node.metadata);
    assert_eq!(decoded.start_char_idx, Some(10));
    assert_eq!(decoded.end_char_idx, Some(29));
    assert_eq!(decoded.ref_doc_id(), Some("doc-1"));
    assert!(decoded.embedding.is_none());
}

#[test]
fn decoding_without_node_content_fails() {
    let dict = json!({"author": "ada"}).as_object().cloned().unwrap();
    let err = metadata_dict_to_node(&dict, None).unwrap_err();
    assert!(matches!(err, SynapticError::Parsing(_)));
}

#[test]
fn flat_metadata_rejects_nested_values() {
    let node = TextNode::new("n", "t").with_metadata("tags", json!(["a", "b"]));
    let err = node_to_metadata_dict(&node, true, true).unwrap_err();
    assert!(matches!(err, SynapticError::Validation(_)));

    // Nested values are fine when flat metadata is not required.
    assert!(node_to_metadata_dict(&node, true, false).is_ok());
}

#[test]
fn flat_dict_accepts_scalars() {
    let dict = json!({"a": "x", "b": 1, "c": 2.5, "d": null, "e": true})
        .as_object()
        .cloned()
        .unwrap();
    assert!(validate_is_flat_dict(&dict).is_ok());
}

#[test]
fn legacy_dict_splits_fields() {
    let dict = json!({
        "text": "stored text",
        "id": "legacy-1",
        "doc_id": "doc-9",
        "document_id": "doc-9",
        "ref_doc_id": "doc-9",
        "node_info": "{\"start\": 4, \"end\": 20}",
        "relationships": "{\"1\": \"doc-9\", \"3\": 42}",
        "category": "news",
    })
    .as_object()
    .cloned()
    .unwrap();

    let parts = legacy_metadata_dict_to_node(&dict, "text").unwrap();

    assert_eq!(Value::Object(parts.metadata.clone()), json!({"category": "news"}));
    assert_eq!(parts.start_char_idx(), Some(4));
    assert_eq!(parts.end_char_idx(), Some(20));
    assert_eq!(
        parts.relationships.get(&NodeRelationship::Source),
        Some(&RelatedNodeType::One(RelatedNodeInfo::new("doc-9")))
    );
    assert_eq!(
        parts.relationships.get(&NodeRelationship::Next),
        Some(&RelatedNodeType::One(RelatedNodeInfo::new("42")))
    );
}

#[test]
fn legacy_dict_without_optional_fields() {
    let dict = json!({"color": "red"}).as_object().cloned().unwrap();
    let parts = legacy_metadata_dict_to_node(&dict, "text").unwrap();
    assert!(parts.node_info.is_empty());
    assert!(parts.relationships.is_empty());
    assert_eq!(parts.metadata["color"], json!("red"));
}

#[test]
fn legacy_dict_rejects_bad_json() {
    let dict = json!({"node_info": "{not json"}).as_object().cloned().unwrap();
    assert!(legacy_metadata_dict_to_node(&dict, "text").is_err());

    let dict = json!({"relationships": "{\"7\": \"x\"}"})
        .as_object()
        .cloned()
        .unwrap();
    assert!(legacy_metadata_dict_to_node(&dict, "text").is_err());
}

#[test]
fn legacy_dict_accepts_float_offsets() {
    let dict = json!({"node_info": "{\"start\": 2.0, \"end\": 11.0}"})
        .as_object()
        .cloned()
        .unwrap();
    let parts = legacy_metadata_dict_to_node(&dict, "text").unwrap();
    assert_eq!(parts.start_char_idx(), Some(2));
    assert_eq!(parts.end_char_idx(), Some(11));
}
