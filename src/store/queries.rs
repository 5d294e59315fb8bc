use chrono::{Duration as ChronoDuration, NaiveDateTime};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use tracing::warn;
use uuid::Uuid;

use crate::models::{NewResearchQuery, ResearchQuery};
use crate::schema::{documents, queries, users};

use super::{StoreError, StoreResult};

pub const INTENT_CASE_LOOKUP: &str = "case_lookup";
pub const INTENT_STATUTE_LOOKUP: &str = "statute_lookup";
pub const INTENT_GENERAL_RESEARCH: &str = "general_research";

pub const QUERY_INTENTS: &[&str] = &[
    INTENT_CASE_LOOKUP,
    INTENT_STATUTE_LOOKUP,
    INTENT_GENERAL_RESEARCH,
];

pub fn is_valid_intent(value: &str) -> bool {
    QUERY_INTENTS.iter().any(|allowed| *allowed == value)
}

/// One completed search-and-answer transaction, written after the external
/// retrieval+generation pipeline has finished. There is no partial record:
/// a crash mid-pipeline loses the query rather than persisting a fragment.
#[derive(Debug, Clone, Default)]
pub struct QueryDraft {
    pub query_text: String,
    pub intent: Option<String>,
    pub retrieved_document_ids: Vec<Uuid>,
    pub response_text: Option<String>,
    pub citations_used: Vec<String>,
    pub retrieval_ms: Option<i32>,
    pub generation_ms: Option<i32>,
    pub total_ms: Option<i32>,
    pub token_count: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct QueryLogFilters {
    pub user_id: Option<Uuid>,
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct UsageStats {
    pub queries_today: i64,
    pub queries_this_week: i64,
    pub queries_this_month: i64,
    pub avg_total_latency_ms: Option<f64>,
    pub documents_total: i64,
    pub documents_vector_indexed: i64,
}

/// Append one row to the audit log. The organization id is a denormalized
/// copy of the issuing user's; the writer is the only place that invariant
/// can be enforced, so it is checked here before the insert.
pub fn record_query(
    conn: &mut PgConnection,
    user_id: Uuid,
    organization_id: Uuid,
    draft: QueryDraft,
) -> StoreResult<ResearchQuery> {
    if let (Some(retrieval), Some(generation), Some(total)) =
        (draft.retrieval_ms, draft.generation_ms, draft.total_ms)
    {
        if total < retrieval + generation {
            warn!(
                %user_id,
                retrieval_ms = retrieval,
                generation_ms = generation,
                total_ms = total,
                "recorded total latency below retrieval + generation"
            );
        }
    }

    conn.transaction::<_, StoreError, _>(|conn| {
        let user_org: Option<Option<Uuid>> = users::table
            .find(user_id)
            .select(users::organization_id)
            .first(conn)
            .optional()?;

        let user_org = user_org.ok_or(StoreError::NotFound("user"))?;
        if user_org != Some(organization_id) {
            return Err(StoreError::integrity(format!(
                "user {user_id} does not belong to organization {organization_id}"
            )));
        }

        let new_query = NewResearchQuery {
            id: Uuid::new_v4(),
            user_id,
            organization_id,
            query_text: draft.query_text,
            intent: draft.intent,
            retrieved_document_ids: draft.retrieved_document_ids,
            response_text: draft.response_text,
            citations_used: draft.citations_used,
            retrieval_ms: draft.retrieval_ms,
            generation_ms: draft.generation_ms,
            total_ms: draft.total_ms,
            token_count: draft.token_count,
        };

        match diesel::insert_into(queries::table)
            .values(&new_query)
            .execute(conn)
        {
            Ok(_) => {}
            Err(diesel::result::Error::DatabaseError(
                DatabaseErrorKind::ForeignKeyViolation,
                _,
            )) => {
                return Err(StoreError::integrity(format!(
                    "organization {organization_id} does not exist"
                )));
            }
            Err(err) => return Err(StoreError::from(err)),
        }

        let query = queries::table.find(new_query.id).first(conn)?;
        Ok(query)
    })
}

/// The only mutation the audit log permits after creation. Touches the two
/// feedback columns and nothing else.
pub fn record_feedback(
    conn: &mut PgConnection,
    query_id: Uuid,
    score: i32,
    text: Option<String>,
) -> StoreResult<ResearchQuery> {
    let updated = diesel::update(queries::table.find(query_id))
        .set((
            queries::feedback_score.eq(Some(score)),
            queries::feedback_text.eq(text),
        ))
        .execute(conn)?;
    if updated == 0 {
        return Err(StoreError::NotFound("query"));
    }
    let query = queries::table.find(query_id).first(conn)?;
    Ok(query)
}

/// Per-tenant query history, newest first. Backs the usage dashboards and
/// per-user history views.
pub fn list_queries(
    conn: &mut PgConnection,
    organization_id: Uuid,
    filters: &QueryLogFilters,
) -> StoreResult<Vec<ResearchQuery>> {
    let mut query = queries::table
        .filter(queries::organization_id.eq(organization_id))
        .into_boxed();

    if let Some(user_id) = filters.user_id {
        query = query.filter(queries::user_id.eq(user_id));
    }
    if let Some(from) = filters.from {
        query = query.filter(queries::created_at.ge(from));
    }
    if let Some(to) = filters.to {
        query = query.filter(queries::created_at.le(to));
    }

    let rows = query.order(queries::created_at.desc()).load(conn)?;
    Ok(rows)
}

pub fn get_query(conn: &mut PgConnection, query_id: Uuid) -> StoreResult<ResearchQuery> {
    queries::table
        .find(query_id)
        .first(conn)
        .optional()?
        .ok_or(StoreError::NotFound("query"))
}

/// Dashboard aggregates over one tenant's audit log and document set.
pub fn usage_stats(
    conn: &mut PgConnection,
    organization_id: Uuid,
    now: NaiveDateTime,
) -> StoreResult<UsageStats> {
    let today_start = now.date().and_hms_opt(0, 0, 0).unwrap_or(now);
    let week_start = now - ChronoDuration::days(7);
    let month_start = now - ChronoDuration::days(30);

    let count_since = |conn: &mut PgConnection, since: NaiveDateTime| -> StoreResult<i64> {
        let count = queries::table
            .filter(queries::organization_id.eq(organization_id))
            .filter(queries::created_at.ge(since))
            .count()
            .get_result(conn)?;
        Ok(count)
    };

    let queries_today = count_since(conn, today_start)?;
    let queries_this_week = count_since(conn, week_start)?;
    let queries_this_month = count_since(conn, month_start)?;

    let latencies: Vec<Option<i32>> = queries::table
        .filter(queries::organization_id.eq(organization_id))
        .filter(queries::created_at.ge(month_start))
        .select(queries::total_ms)
        .load(conn)?;
    let avg_total_latency_ms = mean(&latencies);

    let documents_total = documents::table
        .filter(documents::organization_id.eq(organization_id))
        .count()
        .get_result(conn)?;
    let documents_vector_indexed = documents::table
        .filter(documents::organization_id.eq(organization_id))
        .filter(documents::vector_indexed.eq(true))
        .count()
        .get_result(conn)?;

    Ok(UsageStats {
        queries_today,
        queries_this_week,
        queries_this_month,
        avg_total_latency_ms,
        documents_total,
        documents_vector_indexed,
    })
}

fn mean(samples: &[Option<i32>]) -> Option<f64> {
    let values: Vec<i32> = samples.iter().flatten().copied().collect();
    if values.is_empty() {
        return None;
    }
    let sum: i64 = values.iter().map(|v| i64::from(*v)).sum();
    Some(sum as f64 / values.len() as f64)
}
