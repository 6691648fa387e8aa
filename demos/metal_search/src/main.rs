//! Command-line access to a Metal index through `MetalVectorStore`.
//!
//! Required env vars (a `.env` file in the working directory is honored):
//!   METAL_API_KEY    - Metal API key
//!   METAL_CLIENT_ID  - Metal client ID
//!   METAL_INDEX_ID   - index to operate on
//!   METAL_BASE_URL   - optional API base URL override
//!
//! Run:
//!   cargo run -p metal_search -- add --id n1 --text "hello" --embedding 0.1,0.2 --meta lang=en
//!   cargo run -p metal_search -- query --embedding 0.1,0.2 --top-k 3 --filter lang=en
//!   cargo run -p metal_search -- delete n1
//!
//! Set `RUST_LOG=debug` to see the requests being made.

use clap::{Parser, Subcommand};
use serde_json::Value;
use synaptic_core::{NodeRelationship, RelatedNodeInfo, SynapticError, TextNode};
use synaptic_metal::{MetalConfig, MetalQueryOptions, MetalVectorStore};
use synaptic_vectorstores::{MetadataFilters, NodeVectorStore, VectorStoreQuery};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "metal_search", about = "Add, query and delete nodes in a Metal index")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Index a single node.
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        text: String,
        /// Comma-separated embedding values.
        #[arg(long, value_delimiter = ',', required = true)]
        embedding: Vec<f32>,
        /// Metadata entries as key=value (repeatable).
        #[arg(long = "meta", value_parser = parse_key_value)]
        metadata: Vec<(String, String)>,
        /// Id of the source document.
        #[arg(long)]
        source: Option<String>,
    },
    /// Search the index by embedding.
    Query {
        #[arg(long, value_delimiter = ',', required = true)]
        embedding: Vec<f32>,
        #[arg(long, default_value_t = 1)]
        top_k: usize,
        /// Equality filters as key=value (repeatable).
        #[arg(long = "filter", value_parser = parse_key_value, conflicts_with = "raw_filters")]
        filters: Vec<(String, String)>,
        /// Metal-specific filter JSON, sent as-is.
        #[arg(long)]
        raw_filters: Option<String>,
    },
    /// Delete by reference document id.
    Delete { ref_doc_id: String },
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{s}'"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let store = MetalVectorStore::new(MetalConfig::from_env()?)?;

    match cli.command {
        Command::Add {
            id,
            text,
            embedding,
            metadata,
            source,
        } => {
            let mut node = TextNode::new(id, text).with_embedding(embedding);
            for (key, value) in metadata {
                node = node.with_metadata(key, value);
            }
            if let Some(source) = source {
                node = node.with_relationship(NodeRelationship::Source, RelatedNodeInfo::new(source));
            }
            let ids = store.add(&[node]).await?;
            println!("Indexed {ids:?}");
        }
        Command::Query {
            embedding,
            top_k,
            filters,
            raw_filters,
        } => {
            let mut query = VectorStoreQuery::new(embedding).with_top_k(top_k);
            if !filters.is_empty() {
                query = query.with_filters(MetadataFilters::from_exact_matches(filters));
            }
            let mut options = MetalQueryOptions::new();
            if let Some(raw) = raw_filters {
                let value: Value = serde_json::from_str(&raw).map_err(|e| {
                    SynapticError::Validation(format!("--raw-filters is not valid JSON: {e}"))
                })?;
                options = options.with_filters(value);
            }

            let result = store.query_with_options(&query, &options).await?;
            if result.is_empty() {
                println!("No matches.");
            }
            for (node, score, id) in result.iter() {
                println!("{score:.4}  {id}  {}", node.text);
            }
        }
        Command::Delete { ref_doc_id } => {
            store.delete(&ref_doc_id).await?;
            tracing::info!(ref_doc_id = %ref_doc_id, "deleted");
            println!("Deleted {ref_doc_id}");
        }
    }

    Ok(())
}
