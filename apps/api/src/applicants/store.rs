//! Dual-store controller: keeps the relational record and its semantic
//! document linked and reflecting the same logical state.
//!
//! Write ordering is fixed: relational first, then vector. There is no
//! cross-store transaction — if the vector write fails after the relational
//! write succeeded the stores are left inconsistent and the error is
//! surfaced to the caller (see `get`, which degrades to an absent narrative
//! instead of failing when it observes that state).

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::applicants::mapper::MappedApplicant;
use crate::applicants::search::{reconcile_search, SearchQuery};
use crate::models::applicant::{ApplicantRecord, NewApplicant};
use crate::vector_store::{SemanticDocument, VectorStore};

/// Recognized list orderings. Anything unrecognized falls back to
/// last-updated descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBy {
    NameAsc,
    NameDesc,
    IdAsc,
    LastUpdatedAsc,
    LastUpdatedDesc,
}

impl OrderBy {
    pub fn parse(s: &str) -> Self {
        match s {
            "name" => OrderBy::NameAsc,
            "nameDesc" => OrderBy::NameDesc,
            "id" => OrderBy::IdAsc,
            "lastUpdated" => OrderBy::LastUpdatedAsc,
            _ => OrderBy::LastUpdatedDesc,
        }
    }
}

/// Narrow interface over the relational side. Implemented by the Postgres
/// store in production and an in-memory double in tests.
#[async_trait]
pub trait RelationalStore: Send + Sync {
    async fn insert(&self, link_id: Uuid, applicant: &NewApplicant) -> Result<ApplicantRecord>;

    /// Full replace of scalars and child collections, preserving `id` and
    /// `link_id`. Returns `None` when the id is unknown.
    async fn replace(&self, id: Uuid, applicant: &NewApplicant)
        -> Result<Option<ApplicantRecord>>;

    /// Deletes the row and its children, returning the prior snapshot.
    async fn delete(&self, id: Uuid) -> Result<Option<ApplicantRecord>>;

    async fn get(&self, id: Uuid) -> Result<Option<ApplicantRecord>>;

    /// All rows matching the AND-combined structured predicate.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<ApplicantRecord>>;

    /// One page of rows plus the total page count.
    async fn list(
        &self,
        page: u32,
        page_size: u32,
        order: OrderBy,
    ) -> Result<(Vec<ApplicantRecord>, u32)>;
}

/// One applicant joined with its semantic narrative. The narrative is
/// absent when the vector side has no document for the link id.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicantDetail {
    #[serde(flatten)]
    pub record: ApplicantRecord,
    pub narrative: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicantPage {
    pub page_count: u32,
    pub applicants: Vec<ApplicantDetail>,
}

#[derive(Clone)]
pub struct ApplicantStore {
    relational: Arc<dyn RelationalStore>,
    vector: Arc<dyn VectorStore>,
}

impl ApplicantStore {
    pub fn new(relational: Arc<dyn RelationalStore>, vector: Arc<dyn VectorStore>) -> Self {
        Self { relational, vector }
    }

    /// Creates the applicant in both stores and returns the relational id.
    /// Relational write first (assigns the id), then the vector write keyed
    /// by a fresh link id.
    pub async fn add(&self, mapped: &MappedApplicant) -> Result<Uuid> {
        let link_id = Uuid::new_v4();
        let record = self.relational.insert(link_id, &mapped.applicant).await?;
        let id = record.applicant.id;

        self.vector
            .add_documents(&[semantic_document(link_id, id, &mapped.narrative)])
            .await
            .context("vector write failed after relational insert")?;

        info!(applicant_id = %id, link_id = %link_id, "added applicant");
        Ok(id)
    }

    /// Replaces the applicant wholesale in both stores, preserving the
    /// original link id. Returns `None` when the id is unknown.
    pub async fn update(&self, id: Uuid, mapped: &MappedApplicant) -> Result<Option<Uuid>> {
        let Some(replaced) = self.relational.replace(id, &mapped.applicant).await? else {
            return Ok(None);
        };
        let link_id = replaced.applicant.link_id;

        // The semantic document is replaced by delete-then-insert at the
        // same link id; there is no partial merge.
        self.vector
            .delete(&[link_id])
            .await
            .context("vector delete failed during update")?;
        self.vector
            .add_documents(&[semantic_document(link_id, id, &mapped.narrative)])
            .await
            .context("vector write failed during update")?;

        info!(applicant_id = %id, link_id = %link_id, "updated applicant");
        Ok(Some(id))
    }

    /// Deletes from both stores and returns the deleted snapshot, or `None`
    /// when the id is unknown.
    pub async fn delete(&self, id: Uuid) -> Result<Option<ApplicantRecord>> {
        let Some(deleted) = self.relational.delete(id).await? else {
            return Ok(None);
        };

        self.vector
            .delete(&[deleted.applicant.link_id])
            .await
            .context("vector delete failed after relational delete")?;

        info!(applicant_id = %id, "deleted applicant");
        Ok(Some(deleted))
    }

    /// Fetches the applicant with its narrative. A missing vector document
    /// (dual-store inconsistency) degrades to `narrative: None` instead of
    /// failing the call.
    pub async fn get(&self, id: Uuid) -> Result<Option<ApplicantDetail>> {
        let Some(record) = self.relational.get(id).await? else {
            return Ok(None);
        };
        let narrative = self.narrative_for(record.applicant.link_id).await;
        Ok(Some(ApplicantDetail { record, narrative }))
    }

    /// Paginated listing; each page item is augmented with its semantic
    /// payload looked up individually.
    pub async fn list(&self, page: u32, page_size: u32, order: OrderBy) -> Result<ApplicantPage> {
        let (records, page_count) = self.relational.list(page, page_size, order).await?;

        let mut applicants = Vec::with_capacity(records.len());
        for record in records {
            let narrative = self.narrative_for(record.applicant.link_id).await;
            applicants.push(ApplicantDetail { record, narrative });
        }

        Ok(ApplicantPage {
            page_count,
            applicants,
        })
    }

    /// Reconciled search over both stores; see [`reconcile_search`].
    pub async fn search(&self, query: &SearchQuery, top_k: usize) -> Result<Vec<ApplicantDetail>> {
        reconcile_search(self.relational.as_ref(), self.vector.as_ref(), query, top_k).await
    }

    async fn narrative_for(&self, link_id: Uuid) -> Option<String> {
        match self.vector.get_by_ids(&[link_id]).await {
            Ok(docs) => docs.into_iter().next().map(|d| d.text),
            Err(e) => {
                // Best-effort read: relational data still gets served.
                warn!(link_id = %link_id, "semantic payload lookup failed: {e}");
                None
            }
        }
    }
}

fn semantic_document(link_id: Uuid, applicant_id: Uuid, narrative: &str) -> SemanticDocument {
    let mut metadata = Map::new();
    metadata.insert(
        "applicant_id".to_string(),
        Value::String(applicant_id.to_string()),
    );
    SemanticDocument {
        id: link_id,
        text: narrative.to_string(),
        metadata,
    }
}
