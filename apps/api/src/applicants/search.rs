//! Reconciled search: the structured predicate runs against the relational
//! store, the free-text portion against the vector store, and the result is
//! the strict intersection with the relational ordering preserved.

use std::collections::HashMap;

use anyhow::Result;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::applicants::store::{ApplicantDetail, RelationalStore};
use crate::vector_store::{SemanticDocument, VectorStore};

/// Search criteria. Scalar fields become case-insensitive substring
/// predicates; `experienced_skills` maps skill name to a minimum YoE; the
/// remaining fields only feed the semantic query text.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchQuery {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linked_in: Option<String>,
    pub git_repo: Option<String>,
    pub experienced_skills: Option<HashMap<String, f64>>,
    pub keywords: Option<Vec<String>>,
    pub skills: Option<Vec<String>>,
    pub job_titles: Option<Vec<String>>,
    pub location: Option<String>,
    pub requirement_description: Option<String>,
}

impl SearchQuery {
    /// Free-text query fed to the vector store. Sections appear in a fixed
    /// order, each omitted when its source is empty, mirroring the shape of
    /// the indexed narratives.
    pub fn semantic_query_text(&self) -> String {
        let mut lines = Vec::new();

        if let Some(keywords) = non_empty(&self.keywords) {
            lines.push(format!("Keywords: {}", keywords.join(", ")));
        }
        if let Some(skills) = non_empty(&self.skills) {
            lines.push(format!("Skills: {}", skills.join(", ")));
        }
        if let Some(titles) = non_empty(&self.job_titles) {
            lines.push(format!("Job Titles: {}", titles.join(", ")));
        }
        if let Some(location) = &self.location {
            lines.push(format!("Address: {location}"));
        }
        if let Some(description) = &self.requirement_description {
            lines.push(format!("Description: {description}"));
        }

        lines.join("\n")
    }
}

fn non_empty(items: &Option<Vec<String>>) -> Option<&Vec<String>> {
    items.as_ref().filter(|v| !v.is_empty())
}

/// Runs the structured predicate and the semantic query, then keeps only
/// the relational matches whose link id is in the semantic top-k. The
/// relational result order is preserved; semantic rank only gates
/// membership.
pub async fn reconcile_search(
    relational: &dyn RelationalStore,
    vector: &dyn VectorStore,
    query: &SearchQuery,
    top_k: usize,
) -> Result<Vec<ApplicantDetail>> {
    let candidates = relational.search(query).await?;
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let semantic_matches = vector
        .similarity_search(&query.semantic_query_text(), top_k)
        .await?;
    let by_link_id: HashMap<Uuid, SemanticDocument> = semantic_matches
        .into_iter()
        .map(|doc| (doc.id, doc))
        .collect();

    debug!(
        relational_matches = candidates.len(),
        semantic_matches = by_link_id.len(),
        "reconciling search results"
    );

    let results = candidates
        .into_iter()
        .filter_map(|record| {
            by_link_id
                .get(&record.applicant.link_id)
                .map(|doc| ApplicantDetail {
                    narrative: Some(doc.text.clone()),
                    record,
                })
        })
        .collect();

    Ok(results)
}
