use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Document;
use crate::routes::to_iso;
use crate::state::AppState;
use crate::store::documents::{
    self, DocumentDraft, DocumentFilters, is_valid_document_type, is_valid_status,
};

#[derive(Deserialize)]
pub struct IngestDocumentRequest {
    pub title: String,
    pub document_type: String,
    pub storage_ref: String,
    #[serde(default)]
    pub file_size_bytes: i64,
    pub citation: Option<String>,
    pub court_name: Option<String>,
    pub court_level: Option<String>,
    pub jurisdiction: Option<String>,
    pub bench_strength: Option<i32>,
    #[serde(default)]
    pub judges: Vec<String>,
    pub decision_date: Option<NaiveDate>,
    pub filing_date: Option<NaiveDate>,
    #[serde(default)]
    pub parties: Vec<String>,
    #[serde(default)]
    pub statutes_cited: Vec<String>,
    #[serde(default)]
    pub sections_cited: Vec<String>,
    #[serde(default)]
    pub case_numbers: Vec<String>,
}

#[derive(Deserialize)]
pub struct DocumentListQuery {
    pub document_type: Option<String>,
    pub court_name: Option<String>,
    pub court_level: Option<String>,
    pub decided_after: Option<NaiveDate>,
    pub decided_before: Option<NaiveDate>,
    pub citation: Option<String>,
    pub citation_prefix: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Serialize)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub title: String,
    pub document_type: String,
    pub storage_ref: String,
    pub file_size_bytes: i64,
    pub citation: Option<String>,
    pub court_name: Option<String>,
    pub court_level: Option<String>,
    pub jurisdiction: Option<String>,
    pub bench_strength: Option<i32>,
    pub judges: Vec<String>,
    pub decision_date: Option<NaiveDate>,
    pub filing_date: Option<NaiveDate>,
    pub parties: Vec<String>,
    pub statutes_cited: Vec<String>,
    pub sections_cited: Vec<String>,
    pub case_numbers: Vec<String>,
    pub processing_status: String,
    pub vector_indexed: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Document> for DocumentResponse {
    fn from(document: Document) -> Self {
        Self {
            id: document.id,
            organization_id: document.organization_id,
            title: document.title,
            document_type: document.document_type,
            storage_ref: document.storage_ref,
            file_size_bytes: document.file_size_bytes,
            citation: document.citation,
            court_name: document.court_name,
            court_level: document.court_level,
            jurisdiction: document.jurisdiction,
            bench_strength: document.bench_strength,
            judges: document.judges,
            decision_date: document.decision_date,
            filing_date: document.filing_date,
            parties: document.parties,
            statutes_cited: document.statutes_cited,
            sections_cited: document.sections_cited,
            case_numbers: document.case_numbers,
            processing_status: document.processing_status,
            vector_indexed: document.vector_indexed,
            created_at: to_iso(document.created_at),
            updated_at: to_iso(document.updated_at),
        }
    }
}

pub async fn ingest_document(
    State(state): State<AppState>,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<IngestDocumentRequest>,
) -> AppResult<(StatusCode, Json<DocumentResponse>)> {
    let title = payload.title.trim();
    if title.is_empty() {
        return Err(AppError::bad_request("title must not be empty"));
    }
    if !is_valid_document_type(&payload.document_type) {
        return Err(AppError::bad_request("unknown document type"));
    }
    if payload.storage_ref.trim().is_empty() {
        return Err(AppError::bad_request("storage_ref must not be empty"));
    }
    if payload.file_size_bytes < 0 {
        return Err(AppError::bad_request("file_size_bytes must not be negative"));
    }

    let draft = DocumentDraft {
        title: title.to_string(),
        document_type: payload.document_type,
        storage_ref: payload.storage_ref,
        file_size_bytes: payload.file_size_bytes,
        citation: payload.citation,
        court_name: payload.court_name,
        court_level: payload.court_level,
        jurisdiction: payload.jurisdiction,
        bench_strength: payload.bench_strength,
        judges: payload.judges,
        decision_date: payload.decision_date,
        filing_date: payload.filing_date,
        parties: payload.parties,
        statutes_cited: payload.statutes_cited,
        sections_cited: payload.sections_cited,
        case_numbers: payload.case_numbers,
    };

    let mut conn = state.db()?;
    let document = documents::ingest_document(&mut conn, org_id, draft)?;
    Ok((StatusCode::CREATED, Json(document.into())))
}

pub async fn list_documents(
    State(state): State<AppState>,
    Path(org_id): Path<Uuid>,
    Query(params): Query<DocumentListQuery>,
) -> AppResult<Json<Vec<DocumentResponse>>> {
    if let Some(document_type) = &params.document_type {
        if !is_valid_document_type(document_type) {
            return Err(AppError::bad_request("unknown document type"));
        }
    }

    let filters = DocumentFilters {
        document_type: params.document_type,
        court_name: params.court_name,
        court_level: params.court_level,
        decided_after: params.decided_after,
        decided_before: params.decided_before,
        citation: params.citation,
        citation_prefix: params.citation_prefix,
    };

    let mut conn = state.db()?;
    let rows = documents::find_documents(&mut conn, org_id, &filters)?;
    Ok(Json(rows.into_iter().map(DocumentResponse::from).collect()))
}

pub async fn get_document(
    State(state): State<AppState>,
    Path((org_id, document_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<DocumentResponse>> {
    let mut conn = state.db()?;
    let document = documents::get_document(&mut conn, org_id, document_id)?;
    Ok(Json(document.into()))
}

pub async fn delete_document(
    State(state): State<AppState>,
    Path((org_id, document_id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    let mut conn = state.db()?;
    documents::delete_document(&mut conn, org_id, document_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Processing-pipeline callback.
pub async fn update_status(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<DocumentResponse>> {
    if !is_valid_status(&payload.status) {
        return Err(AppError::bad_request("unknown processing status"));
    }
    let mut conn = state.db()?;
    let document = documents::update_processing_status(&mut conn, document_id, &payload.status)?;
    Ok(Json(document.into()))
}

/// Embedding-pipeline callback.
pub async fn mark_vector_indexed(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> AppResult<Json<DocumentResponse>> {
    let mut conn = state.db()?;
    let document = documents::mark_vector_indexed(&mut conn, document_id)?;
    Ok(Json(document.into()))
}
