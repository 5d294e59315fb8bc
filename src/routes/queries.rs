use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::ResearchQuery;
use crate::routes::to_iso;
use crate::state::AppState;
use crate::store::queries::{self, is_valid_intent, QueryDraft, QueryLogFilters};

#[derive(Deserialize)]
pub struct RecordQueryRequest {
    pub user_id: Uuid,
    pub query_text: String,
    pub intent: Option<String>,
    #[serde(default)]
    pub retrieved_document_ids: Vec<Uuid>,
    pub response_text: Option<String>,
    #[serde(default)]
    pub citations_used: Vec<String>,
    pub retrieval_ms: Option<i32>,
    pub generation_ms: Option<i32>,
    pub total_ms: Option<i32>,
    pub token_count: Option<i32>,
}

#[derive(Deserialize)]
pub struct QueryListParams {
    pub user_id: Option<Uuid>,
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
}

#[derive(Deserialize)]
pub struct FeedbackRequest {
    pub score: i32,
    pub text: Option<String>,
}

#[derive(Serialize)]
pub struct QueryResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub query_text: String,
    pub intent: Option<String>,
    pub retrieved_document_ids: Vec<Uuid>,
    pub response_text: Option<String>,
    pub citations_used: Vec<String>,
    pub retrieval_ms: Option<i32>,
    pub generation_ms: Option<i32>,
    pub total_ms: Option<i32>,
    pub token_count: Option<i32>,
    pub feedback_score: Option<i32>,
    pub feedback_text: Option<String>,
    pub created_at: String,
}

impl From<ResearchQuery> for QueryResponse {
    fn from(query: ResearchQuery) -> Self {
        Self {
            id: query.id,
            user_id: query.user_id,
            organization_id: query.organization_id,
            query_text: query.query_text,
            intent: query.intent,
            retrieved_document_ids: query.retrieved_document_ids,
            response_text: query.response_text,
            citations_used: query.citations_used,
            retrieval_ms: query.retrieval_ms,
            generation_ms: query.generation_ms,
            total_ms: query.total_ms,
            token_count: query.token_count,
            feedback_score: query.feedback_score,
            feedback_text: query.feedback_text,
            created_at: to_iso(query.created_at),
        }
    }
}

pub async fn record_query(
    State(state): State<AppState>,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<RecordQueryRequest>,
) -> AppResult<(StatusCode, Json<QueryResponse>)> {
    if payload.query_text.trim().is_empty() {
        return Err(AppError::bad_request("query_text must not be empty"));
    }
    if let Some(intent) = &payload.intent {
        if !is_valid_intent(intent) {
            return Err(AppError::bad_request("unknown query intent"));
        }
    }

    let draft = QueryDraft {
        query_text: payload.query_text,
        intent: payload.intent,
        retrieved_document_ids: payload.retrieved_document_ids,
        response_text: payload.response_text,
        citations_used: payload.citations_used,
        retrieval_ms: payload.retrieval_ms,
        generation_ms: payload.generation_ms,
        total_ms: payload.total_ms,
        token_count: payload.token_count,
    };

    let mut conn = state.db()?;
    let query = queries::record_query(&mut conn, payload.user_id, org_id, draft)?;
    Ok((StatusCode::CREATED, Json(query.into())))
}

pub async fn list_queries(
    State(state): State<AppState>,
    Path(org_id): Path<Uuid>,
    Query(params): Query<QueryListParams>,
) -> AppResult<Json<Vec<QueryResponse>>> {
    let filters = QueryLogFilters {
        user_id: params.user_id,
        from: params.from,
        to: params.to,
    };

    let mut conn = state.db()?;
    let rows = queries::list_queries(&mut conn, org_id, &filters)?;
    Ok(Json(rows.into_iter().map(QueryResponse::from).collect()))
}

pub async fn record_feedback(
    State(state): State<AppState>,
    Path(query_id): Path<Uuid>,
    Json(payload): Json<FeedbackRequest>,
) -> AppResult<Json<QueryResponse>> {
    let mut conn = state.db()?;
    let query = queries::record_feedback(&mut conn, query_id, payload.score, payload.text)?;
    Ok(Json(query.into()))
}
