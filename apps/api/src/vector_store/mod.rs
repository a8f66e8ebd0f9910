//! Semantic document storage. One document per applicant, keyed by the
//! shared link id, with a flat scalar metadata map. Backends: an in-memory
//! cosine index and a Chroma HTTP collection.

pub mod chroma;
pub mod embedding;
pub mod memory;

use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::vector_store::embedding::{Embedder, HashEmbedder, OpenAiEmbedder};

/// One indexed document: the narrative text plus flat scalar metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticDocument {
    pub id: Uuid,
    pub text: String,
    pub metadata: Map<String, Value>,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Upserts documents by id.
    async fn add_documents(&self, documents: &[SemanticDocument]) -> Result<()>;

    /// Removes documents by id; unknown ids are ignored.
    async fn delete(&self, ids: &[Uuid]) -> Result<()>;

    /// The `k` documents nearest to the query text, best first.
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<SemanticDocument>>;

    /// Point lookups by id; missing ids are simply absent from the result.
    async fn get_by_ids(&self, ids: &[Uuid]) -> Result<Vec<SemanticDocument>>;
}

/// Drops metadata entries whose values are not flat scalars. Nested
/// objects, arrays, and nulls never reach a backend.
pub fn sanitize_metadata(metadata: &Map<String, Value>) -> Map<String, Value> {
    metadata
        .iter()
        .filter(|(_, v)| matches!(v, Value::String(_) | Value::Bool(_) | Value::Number(_)))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

pub fn create_embedder(config: &Config) -> Result<Arc<dyn Embedder>> {
    match config.embedding_provider.as_str() {
        "hash" => Ok(Arc::new(HashEmbedder::new(config.embedding_dim))),
        "openai" => {
            let api_key = config
                .openai_api_key
                .clone()
                .ok_or_else(|| anyhow::anyhow!("OPENAI_API_KEY required for openai embeddings"))?;
            Ok(Arc::new(OpenAiEmbedder::new(
                api_key,
                config.openai_base_url.clone(),
                config.embedding_model.clone(),
            )))
        }
        other => bail!("unknown embedding provider: {other}"),
    }
}

pub async fn create_vector_store(config: &Config) -> Result<Arc<dyn VectorStore>> {
    let embedder = create_embedder(config)?;
    match config.vector_backend.as_str() {
        "memory" => {
            info!("using in-memory vector store");
            Ok(Arc::new(memory::InMemoryVectorStore::new(embedder)))
        }
        "chroma" => {
            let store = chroma::ChromaStore::connect(
                &config.chroma_url,
                &config.chroma_collection,
                embedder,
            )
            .await?;
            info!(url = %config.chroma_url, collection = %config.chroma_collection, "connected to chroma");
            Ok(Arc::new(store))
        }
        other => bail!("unknown vector backend: {other}"),
    }
}
