use serde_json::json;
use synaptic_core::{NodeRelationship, SynapticError, TextNode};
use synaptic_vectorstores::{
    node_to_metadata_dict, DecoderChain, LegacyMetadataDecoder, MetadataDecoder,
    NodeContentDecoder, StoredRow,
};

#[test]
fn node_content_decoder_uses_row_text() {
    let node = TextNode::new("n1", "original").with_metadata("k", "v");
    let metadata = serde_json::Value::Object(node_to_metadata_dict(&node, true, false).unwrap());
    let row = StoredRow {
        id: "n1",
        text: "from the row",
        metadata: &metadata,
    };

    let decoded = NodeContentDecoder.decode(&row).unwrap();
    assert_eq!(decoded.id, "n1");
    assert_eq!(decoded.text, "from the row");
    assert_eq!(decoded.metadata["k"], json!("v"));
}

#[test]
fn node_content_decoder_rejects_legacy_rows() {
    let metadata = json!({"node_info": "{}"});
    let row = StoredRow {
        id: "x",
        text: "",
        metadata: &metadata,
    };
    assert!(NodeContentDecoder.decode(&row).is_err());
}

#[test]
fn legacy_decoder_treats_null_metadata_as_empty() {
    let metadata = serde_json::Value::Null;
    let row = StoredRow {
        id: "x",
        text: "hello",
        metadata: &metadata,
    };
    let node = LegacyMetadataDecoder::default().decode(&row).unwrap();
    assert_eq!(node.id, "x");
    assert_eq!(node.text, "hello");
    assert!(node.metadata.is_empty());
}

#[test]
fn standard_chain_falls_back_to_legacy() {
    let metadata = json!({
        "text": "ignored",
        "node_info": "{\"start\": 0, \"end\": 5}",
        "relationships": "{\"2\": \"prev-node\"}",
        "lang": "en",
    });
    let row = StoredRow {
        id: "legacy-7",
        text: "hello",
        metadata: &metadata,
    };

    let node = DecoderChain::standard().decode(&row).unwrap();
    assert_eq!(node.id, "legacy-7");
    assert_eq!(node.text, "hello");
    assert_eq!(node.metadata["lang"], json!("en"));
    assert!(!node.metadata.contains_key("text"));
    assert_eq!(node.start_char_idx, Some(0));
    assert_eq!(node.end_char_idx, Some(5));
    assert!(node.relationships.contains_key(&NodeRelationship::Previous));
}

#[test]
fn standard_chain_prefers_node_content_over_legacy_fields() {
    let node_content = json!({
        "id_": "abc",
        "embedding": null,
        "metadata": {"lang": "en"},
        "excluded_embed_metadata_keys": [],
        "excluded_llm_metadata_keys": [],
        "relationships": {
            "1": {"node_id": "doc-1", "node_type": "4", "metadata": {}, "hash": null}
        },
        "text": "",
        "start_char_idx": 0,
        "end_char_idx": 10,
        "text_template": "{metadata_str}\n\n{content}",
        "metadata_template": "{key}: {value}",
        "metadata_seperator": "\n",
        "class_name": "TextNode",
    });
    let metadata = json!({
        "_node_content": node_content.to_string(),
        "_node_type": "TextNode",
        "lang": "en",
        "node_info": "{broken",
        "relationships": "{\"2\": \"legacy-prev\"}",
    });
    let row = StoredRow {
        id: "row-id",
        text: "hello",
        metadata: &metadata,
    };

    let node = DecoderChain::standard().decode(&row).unwrap();
    assert_eq!(node.id, "abc");
    assert_eq!(node.text, "hello");
    assert_eq!(node.metadata["lang"], json!("en"));
    assert_eq!(node.start_char_idx, Some(0));
    assert_eq!(node.end_char_idx, Some(10));
    assert_eq!(node.ref_doc_id(), Some("doc-1"));
    assert!(!node.relationships.contains_key(&NodeRelationship::Previous));
}

#[test]
fn chain_reports_last_error_when_all_fail() {
    let metadata = json!("not an object");
    let row = StoredRow {
        id: "bad",
        text: "",
        metadata: &metadata,
    };
    let err = DecoderChain::standard().decode(&row).unwrap_err();
    assert!(matches!(err, SynapticError::Parsing(_)));
}

#[test]
fn empty_chain_fails() {
    let metadata = json!({});
    let row = StoredRow {
        id: "x",
        text: "",
        metadata: &metadata,
    };
    let chain = DecoderChain::new();
    assert!(chain.is_empty());
    assert!(chain.decode(&row).is_err());
}
