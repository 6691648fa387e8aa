use thiserror::Error;

/// Errors surfaced by Synaptic components.
///
/// Each variant carries a human readable message; callers match on the
/// variant to tell configuration problems from remote failures.
#[derive(Debug, Error)]
pub enum SynapticError {
    /// Missing or invalid configuration, including uninitialized clients.
    #[error("config error: {0}")]
    Config(String),
    /// The caller passed arguments that cannot be honored together.
    #[error("validation error: {0}")]
    Validation(String),
    /// A vector store backend failed (transport, status code, payload).
    #[error("vector store error: {0}")]
    VectorStore(String),
    /// Stored data could not be decoded into the expected shape.
    #[error("parsing error: {0}")]
    Parsing(String),
}
