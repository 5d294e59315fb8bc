use chrono::{NaiveDate, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use uuid::Uuid;

use crate::models::{Document, NewDocument};
use crate::schema::documents;

use super::{StoreError, StoreResult};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_PROCESSING: &str = "processing";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_FAILED: &str = "failed";

pub const PROCESSING_STATUSES: &[&str] = &[
    STATUS_PENDING,
    STATUS_PROCESSING,
    STATUS_COMPLETED,
    STATUS_FAILED,
];

pub const DOC_TYPE_CASE_LAW: &str = "case_law";
pub const DOC_TYPE_JUDGMENT: &str = "judgment";
pub const DOC_TYPE_STATUTE: &str = "statute";
pub const DOC_TYPE_BRIEF: &str = "brief";
pub const DOC_TYPE_CONTRACT: &str = "contract";
pub const DOC_TYPE_OTHER: &str = "other";

pub const DOCUMENT_TYPES: &[&str] = &[
    DOC_TYPE_CASE_LAW,
    DOC_TYPE_JUDGMENT,
    DOC_TYPE_STATUTE,
    DOC_TYPE_BRIEF,
    DOC_TYPE_CONTRACT,
    DOC_TYPE_OTHER,
];

pub fn is_valid_document_type(value: &str) -> bool {
    DOCUMENT_TYPES.iter().any(|allowed| *allowed == value)
}

pub fn is_valid_status(value: &str) -> bool {
    PROCESSING_STATUSES.iter().any(|allowed| *allowed == value)
}

/// Status progression is monotonic: pending -> processing -> completed|failed.
pub fn is_valid_transition(from: &str, to: &str) -> bool {
    matches!(
        (from, to),
        (STATUS_PENDING, STATUS_PROCESSING)
            | (STATUS_PROCESSING, STATUS_COMPLETED)
            | (STATUS_PROCESSING, STATUS_FAILED)
    )
}

/// Everything a caller supplies at ingestion time. Processing state is not
/// part of the draft; new documents always start pending and unindexed.
#[derive(Debug, Clone, Default)]
pub struct DocumentDraft {
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
}

#[derive(Debug, Clone, Default)]
pub struct DocumentFilters {
    pub document_type: Option<String>,
    pub court_name: Option<String>,
    pub court_level: Option<String>,
    pub decided_after: Option<NaiveDate>,
    pub decided_before: Option<NaiveDate>,
    pub citation: Option<String>,
    pub citation_prefix: Option<String>,
}

pub fn ingest_document(
    conn: &mut PgConnection,
    organization_id: Uuid,
    draft: DocumentDraft,
) -> StoreResult<Document> {
    let new_document = NewDocument {
        id: Uuid::new_v4(),
        organization_id,
        title: draft.title,
        document_type: draft.document_type,
        storage_ref: draft.storage_ref,
        file_size_bytes: draft.file_size_bytes,
        citation: draft.citation,
        court_name: draft.court_name,
        court_level: draft.court_level,
        jurisdiction: draft.jurisdiction,
        bench_strength: draft.bench_strength,
        judges: draft.judges,
        decision_date: draft.decision_date,
        filing_date: draft.filing_date,
        parties: draft.parties,
        statutes_cited: draft.statutes_cited,
        sections_cited: draft.sections_cited,
        case_numbers: draft.case_numbers,
        processing_status: STATUS_PENDING.to_string(),
        vector_indexed: false,
    };

    match diesel::insert_into(documents::table)
        .values(&new_document)
        .execute(conn)
    {
        Ok(_) => {}
        Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => {
            return Err(StoreError::integrity(format!(
                "organization {organization_id} does not exist"
            )));
        }
        Err(err) => return Err(StoreError::from(err)),
    }

    let document = documents::table.find(new_document.id).first(conn)?;
    Ok(document)
}

/// Advance the processing status of a document. The row is locked for the
/// duration of the check-and-set so racing pipeline workers cannot clobber
/// each other's transitions.
pub fn update_processing_status(
    conn: &mut PgConnection,
    document_id: Uuid,
    status: &str,
) -> StoreResult<Document> {
    conn.transaction::<_, StoreError, _>(|conn| {
        let document: Document = documents::table
            .find(document_id)
            .for_update()
            .first(conn)
            .optional()?
            .ok_or(StoreError::NotFound("document"))?;

        if !is_valid_transition(&document.processing_status, status) {
            return Err(StoreError::invalid_state(format!(
                "cannot transition document {document_id} from '{}' to '{status}'",
                document.processing_status
            )));
        }

        diesel::update(documents::table.find(document_id))
            .set((
                documents::processing_status.eq(status),
                documents::updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(conn)?;

        let refreshed = documents::table.find(document_id).first(conn)?;
        Ok(refreshed)
    })
}

/// Flip the vector-indexed flag after the external embedding step succeeds.
/// Only legal once processing has completed.
pub fn mark_vector_indexed(conn: &mut PgConnection, document_id: Uuid) -> StoreResult<Document> {
    conn.transaction::<_, StoreError, _>(|conn| {
        let document: Document = documents::table
            .find(document_id)
            .for_update()
            .first(conn)
            .optional()?
            .ok_or(StoreError::NotFound("document"))?;

        if document.processing_status != STATUS_COMPLETED {
            return Err(StoreError::invalid_state(format!(
                "cannot mark document {document_id} vector-indexed while status is '{}'",
                document.processing_status
            )));
        }

        diesel::update(documents::table.find(document_id))
            .set((
                documents::vector_indexed.eq(true),
                documents::updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(conn)?;

        let refreshed = documents::table.find(document_id).first(conn)?;
        Ok(refreshed)
    })
}

/// Filtered lookup within one tenant. The organization predicate is part of
/// the signature, not a filter option, so an unscoped read cannot be
/// expressed.
pub fn find_documents(
    conn: &mut PgConnection,
    organization_id: Uuid,
    filters: &DocumentFilters,
) -> StoreResult<Vec<Document>> {
    let mut query = documents::table
        .filter(documents::organization_id.eq(organization_id))
        .into_boxed();

    if let Some(document_type) = &filters.document_type {
        query = query.filter(documents::document_type.eq(document_type.clone()));
    }
    if let Some(court_name) = &filters.court_name {
        query = query.filter(documents::court_name.eq(court_name.clone()));
    }
    if let Some(court_level) = &filters.court_level {
        query = query.filter(documents::court_level.eq(court_level.clone()));
    }
    if let Some(after) = filters.decided_after {
        query = query.filter(documents::decision_date.ge(after));
    }
    if let Some(before) = filters.decided_before {
        query = query.filter(documents::decision_date.le(before));
    }
    if let Some(citation) = &filters.citation {
        query = query.filter(documents::citation.eq(citation.clone()));
    }
    if let Some(prefix) = &filters.citation_prefix {
        query = query.filter(documents::citation.like(format!("{}%", escape_like(prefix))));
    }

    let rows = query.order(documents::created_at.desc()).load(conn)?;
    Ok(rows)
}

pub fn get_document(
    conn: &mut PgConnection,
    organization_id: Uuid,
    document_id: Uuid,
) -> StoreResult<Document> {
    documents::table
        .filter(documents::organization_id.eq(organization_id))
        .filter(documents::id.eq(document_id))
        .first(conn)
        .optional()?
        .ok_or(StoreError::NotFound("document"))
}

/// Explicit document removal. The query audit log keeps its weak references;
/// readers of historical queries tolerate the resulting dangling ids.
pub fn delete_document(
    conn: &mut PgConnection,
    organization_id: Uuid,
    document_id: Uuid,
) -> StoreResult<()> {
    let deleted = diesel::delete(
        documents::table
            .filter(documents::organization_id.eq(organization_id))
            .filter(documents::id.eq(document_id)),
    )
    .execute(conn)?;
    if deleted == 0 {
        return Err(StoreError::NotFound("document"));
    }
    Ok(())
}

fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}
