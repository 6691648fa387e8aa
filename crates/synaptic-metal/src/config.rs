use synaptic_core::SynapticError;

const DEFAULT_BASE_URL: &str = "https://api.getmetal.io/v1";

/// Configuration for [`MetalVectorStore`](crate::MetalVectorStore).
#[derive(Debug, Clone)]
pub struct MetalConfig {
    /// Metal API key.
    pub api_key: String,
    /// Metal client ID.
    pub client_id: String,
    /// ID of the index all operations are bound to.
    pub index_id: String,
    /// Base URL for the Metal API (default: `"https://api.getmetal.io/v1"`).
    pub base_url: String,
}

impl MetalConfig {
    /// Create a new configuration with the default base URL.
    pub fn new(
        api_key: impl Into<String>,
        client_id: impl Into<String>,
        index_id: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            client_id: client_id.into(),
            index_id: index_id.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Set a custom base URL for the API.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build a configuration from `METAL_API_KEY`, `METAL_CLIENT_ID` and
    /// `METAL_INDEX_ID`, with an optional `METAL_BASE_URL` override.
    pub fn from_env() -> Result<Self, SynapticError> {
        let config = Self::new(
            require_env("METAL_API_KEY")?,
            require_env("METAL_CLIENT_ID")?,
            require_env("METAL_INDEX_ID")?,
        );
        Ok(match std::env::var("METAL_BASE_URL") {
            Ok(url) if !url.is_empty() => config.with_base_url(url),
            _ => config,
        })
    }

    /// Reject configurations with blank credentials.
    pub fn validate(&self) -> Result<(), SynapticError> {
        for (name, value) in [
            ("api_key", &self.api_key),
            ("client_id", &self.client_id),
            ("index_id", &self.index_id),
        ] {
            if value.trim().is_empty() {
                return Err(SynapticError::Config(format!(
                    "Metal {name} must not be empty"
                )));
            }
        }
        Ok(())
    }
}

fn require_env(name: &str) -> Result<String, SynapticError> {
    std::env::var(name)
        .map_err(|_| SynapticError::Config(format!("environment variable '{name}' not set")))
}
