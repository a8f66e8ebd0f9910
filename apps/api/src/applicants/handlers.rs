//! HTTP handlers for the applicant lifecycle: ingest, update, fetch,
//! delete, list, and reconciled search.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::applicants::mapper::{map_record, MappedApplicant};
use crate::applicants::search::SearchQuery;
use crate::applicants::store::{ApplicantDetail, ApplicantPage, OrderBy};
use crate::documents::{normalize_documents, RawDocument};
use crate::errors::AppError;
use crate::extraction::BatchExtractor;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub documents: Vec<RawDocument>,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub applicant_ids: Vec<Uuid>,
}

/// POST /api/v1/applicants
///
/// Normalizes the uploaded page texts into per-file documents, extracts one
/// record per CV, and stores each applicant in both stores.
pub async fn ingest_applicants(
    State(state): State<AppState>,
    Json(payload): Json<IngestRequest>,
) -> Result<(StatusCode, Json<IngestResponse>), AppError> {
    let mapped = extract_applicants(&state, payload.documents).await?;

    let mut applicant_ids = Vec::with_capacity(mapped.len());
    for applicant in &mapped {
        let id = state.applicants.add(applicant).await?;
        applicant_ids.push(id);
    }

    info!(count = applicant_ids.len(), "ingested applicants");
    Ok((StatusCode::CREATED, Json(IngestResponse { applicant_ids })))
}

/// PUT /api/v1/applicants/:id
///
/// Re-extracts from the uploaded documents and replaces the applicant
/// wholesale. Only the first extracted record is used.
pub async fn update_applicant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<IngestRequest>,
) -> Result<Json<ApplicantDetail>, AppError> {
    let mapped = extract_applicants(&state, payload.documents).await?;
    let Some(applicant) = mapped.first() else {
        return Err(AppError::Extraction(
            "no applicant record extracted from documents".to_string(),
        ));
    };

    match state.applicants.update(id, applicant).await? {
        Some(id) => {
            let detail = state
                .applicants
                .get(id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Applicant {id} not found")))?;
            Ok(Json(detail))
        }
        None => Err(AppError::NotFound(format!("Applicant {id} not found"))),
    }
}

/// GET /api/v1/applicants/:id
pub async fn get_applicant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApplicantDetail>, AppError> {
    state
        .applicants
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Applicant {id} not found")))
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub applicant_id: Uuid,
}

/// DELETE /api/v1/applicants/:id
pub async fn delete_applicant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, AppError> {
    match state.applicants.delete(id).await? {
        Some(_) => Ok(Json(DeleteResponse {
            message: "Applicant deleted".to_string(),
            applicant_id: id,
        })),
        None => Err(AppError::NotFound(format!("Applicant {id} not found"))),
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListParams {
    pub page: u32,
    pub page_size: u32,
    pub order_by: String,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
            order_by: "lastUpdated".to_string(),
        }
    }
}

/// GET /api/v1/applicants
pub async fn list_applicants(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ApplicantPage>, AppError> {
    let page = state
        .applicants
        .list(
            params.page,
            params.page_size,
            OrderBy::parse(&params.order_by),
        )
        .await?;
    Ok(Json(page))
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(flatten)]
    pub query: SearchQuery,
    #[serde(default = "default_top_k", rename = "topK")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    20
}

/// POST /api/v1/applicants/search
///
/// An empty result is a normal 200 with an empty array.
pub async fn search_applicants(
    State(state): State<AppState>,
    Json(payload): Json<SearchRequest>,
) -> Result<Json<Vec<ApplicantDetail>>, AppError> {
    let results = state
        .applicants
        .search(&payload.query, payload.top_k.max(1))
        .await?;
    Ok(Json(results))
}

async fn extract_applicants(
    state: &AppState,
    documents: Vec<RawDocument>,
) -> Result<Vec<MappedApplicant>, AppError> {
    if documents.is_empty() {
        return Err(AppError::Validation(
            "at least one document is required".to_string(),
        ));
    }

    let normalized = normalize_documents(documents);
    let texts: Vec<String> = normalized.into_iter().map(|d| d.text).collect();

    let records = BatchExtractor::new(&state.llm)
        .extract(&texts)
        .await
        .map_err(|e| AppError::Extraction(format!("CV extraction failed: {e}")))?;

    Ok(records.iter().map(map_record).collect())
}
