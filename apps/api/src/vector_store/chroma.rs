//! Chroma-backed [`VectorStore`] over its HTTP API. The collection is
//! created (or reused) at connect time; embeddings are computed locally so
//! the server never needs an embedding function of its own.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::vector_store::embedding::Embedder;
use crate::vector_store::{sanitize_metadata, SemanticDocument, VectorStore};

pub struct ChromaStore {
    client: Client,
    base_url: String,
    collection_id: String,
    embedder: Arc<dyn Embedder>,
}

#[derive(Debug, Deserialize)]
struct Collection {
    id: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    ids: Vec<Vec<String>>,
    documents: Vec<Vec<Option<String>>>,
    metadatas: Vec<Vec<Option<Map<String, Value>>>>,
}

#[derive(Debug, Deserialize)]
struct GetResponse {
    ids: Vec<String>,
    documents: Vec<Option<String>>,
    metadatas: Vec<Option<Map<String, Value>>>,
}

impl ChromaStore {
    pub async fn connect(
        base_url: &str,
        collection: &str,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self> {
        let client = Client::new();
        let base_url = base_url.trim_end_matches('/').to_string();

        let response = client
            .post(format!("{base_url}/api/v1/collections"))
            .json(&json!({ "name": collection, "get_or_create": true }))
            .send()
            .await
            .context("failed to reach chroma")?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("chroma collection setup failed ({status}): {body}"));
        }
        let collection: Collection = response
            .json()
            .await
            .context("failed to decode chroma collection")?;

        Ok(Self {
            client,
            base_url,
            collection_id: collection.id,
            embedder,
        })
    }

    fn collection_url(&self, action: &str) -> String {
        format!(
            "{}/api/v1/collections/{}/{action}",
            self.base_url, self.collection_id
        )
    }

    async fn post(&self, action: &str, body: Value) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(self.collection_url(action))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("chroma {action} request failed"))?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("chroma {action} failed ({status}): {text}"));
        }
        Ok(response)
    }
}

fn document_from_parts(
    id: &str,
    text: Option<String>,
    metadata: Option<Map<String, Value>>,
) -> Result<SemanticDocument> {
    Ok(SemanticDocument {
        id: Uuid::parse_str(id).context("non-uuid id in chroma collection")?,
        text: text.unwrap_or_default(),
        metadata: metadata.unwrap_or_default(),
    })
}

#[async_trait]
impl VectorStore for ChromaStore {
    async fn add_documents(&self, documents: &[SemanticDocument]) -> Result<()> {
        if documents.is_empty() {
            return Ok(());
        }

        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        let embeddings = self.embedder.embed(&texts).await?;

        let ids: Vec<String> = documents.iter().map(|d| d.id.to_string()).collect();
        let metadatas: Vec<Map<String, Value>> = documents
            .iter()
            .map(|d| sanitize_metadata(&d.metadata))
            .collect();

        self.post(
            "add",
            json!({
                "ids": ids,
                "embeddings": embeddings,
                "documents": texts,
                "metadatas": metadatas,
            }),
        )
        .await?;
        Ok(())
    }

    async fn delete(&self, ids: &[Uuid]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        self.post("delete", json!({ "ids": ids })).await?;
        Ok(())
    }

    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<SemanticDocument>> {
        let query_embedding = self
            .embedder
            .embed(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .unwrap_or_default();

        let response = self
            .post(
                "query",
                json!({
                    "query_embeddings": [query_embedding],
                    "n_results": k,
                    "include": ["documents", "metadatas"],
                }),
            )
            .await?;
        let mut parsed: QueryResponse = response
            .json()
            .await
            .context("failed to decode chroma query response")?;

        // Single query, single result group.
        let ids = parsed.ids.pop().unwrap_or_default();
        let documents = parsed.documents.pop().unwrap_or_default();
        let metadatas = parsed.metadatas.pop().unwrap_or_default();

        let mut results = Vec::with_capacity(ids.len());
        for (i, id) in ids.iter().enumerate() {
            results.push(document_from_parts(
                id,
                documents.get(i).cloned().flatten(),
                metadatas.get(i).cloned().flatten(),
            )?);
        }
        Ok(results)
    }

    async fn get_by_ids(&self, ids: &[Uuid]) -> Result<Vec<SemanticDocument>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let id_strings: Vec<String> = ids.iter().map(|id| id.to_string()).collect();

        let response = self
            .post(
                "get",
                json!({ "ids": id_strings, "include": ["documents", "metadatas"] }),
            )
            .await?;
        let parsed: GetResponse = response
            .json()
            .await
            .context("failed to decode chroma get response")?;

        let mut results = Vec::with_capacity(parsed.ids.len());
        for (i, id) in parsed.ids.iter().enumerate() {
            results.push(document_from_parts(
                id,
                parsed.documents.get(i).cloned().flatten(),
                parsed.metadatas.get(i).cloned().flatten(),
            )?);
        }
        Ok(results)
    }
}
