use synaptic_core::SynapticError;

#[test]
fn error_variants_display() {
    let errors = vec![
        SynapticError::Config("test".into()),
        SynapticError::Validation("test".into()),
        SynapticError::VectorStore("test".into()),
        SynapticError::Parsing("test".into()),
    ];
    for err in &errors {
        assert!(!err.to_string().is_empty());
        assert!(err.to_string().contains("test"));
    }
}

#[test]
fn config_error_mentions_kind() {
    let err = SynapticError::Config("metal client not initialized".into());
    assert_eq!(
        err.to_string(),
        "config error: metal client not initialized"
    );
}
