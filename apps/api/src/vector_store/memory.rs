//! In-memory vector store: a flat cosine scan over embedded documents.
//! Used in development and as the test double for the Chroma backend.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::vector_store::embedding::{cosine_similarity, Embedder};
use crate::vector_store::{sanitize_metadata, SemanticDocument, VectorStore};

pub struct InMemoryVectorStore {
    embedder: Arc<dyn Embedder>,
    entries: RwLock<Vec<(SemanticDocument, Vec<f32>)>>,
}

impl InMemoryVectorStore {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            entries: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn add_documents(&self, documents: &[SemanticDocument]) -> Result<()> {
        if documents.is_empty() {
            return Ok(());
        }

        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        let vectors = self.embedder.embed(&texts).await?;

        let mut entries = self.entries.write().await;
        for (document, vector) in documents.iter().zip(vectors) {
            let document = SemanticDocument {
                id: document.id,
                text: document.text.clone(),
                metadata: sanitize_metadata(&document.metadata),
            };
            // Upsert by id.
            entries.retain(|(existing, _)| existing.id != document.id);
            entries.push((document, vector));
        }
        Ok(())
    }

    async fn delete(&self, ids: &[Uuid]) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.retain(|(document, _)| !ids.contains(&document.id));
        Ok(())
    }

    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<SemanticDocument>> {
        let query_vector = self
            .embedder
            .embed(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .unwrap_or_default();

        let entries = self.entries.read().await;
        let mut scored: Vec<(f32, &SemanticDocument)> = entries
            .iter()
            .map(|(document, vector)| (cosine_similarity(&query_vector, vector), document))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, document)| document.clone())
            .collect())
    }

    async fn get_by_ids(&self, ids: &[Uuid]) -> Result<Vec<SemanticDocument>> {
        let entries = self.entries.read().await;
        // Requested order, skipping ids we do not hold.
        Ok(ids
            .iter()
            .filter_map(|id| {
                entries
                    .iter()
                    .find(|(document, _)| document.id == *id)
                    .map(|(document, _)| document.clone())
            })
            .collect())
    }
}
