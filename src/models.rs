use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::*;

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = organizations)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub subscription_tier: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = organizations)]
pub struct NewOrganization {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub subscription_tier: String,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = users)]
#[diesel(belongs_to(Organization))]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub organization_id: Option<Uuid>,
    pub role: String,
    pub created_at: NaiveDateTime,
    pub last_login: Option<NaiveDateTime>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub organization_id: Option<Uuid>,
    pub role: String,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = documents)]
#[diesel(belongs_to(Organization))]
pub struct Document {
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
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = documents)]
pub struct NewDocument {
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
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = queries)]
#[diesel(belongs_to(User))]
#[diesel(belongs_to(Organization))]
pub struct ResearchQuery {
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
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = queries)]
pub struct NewResearchQuery {
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
}
