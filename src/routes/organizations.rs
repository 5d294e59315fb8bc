use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Organization;
use crate::routes::to_iso;
use crate::state::AppState;
use crate::store::tenancy::{self, is_valid_slug, is_valid_tier, TIER_FREE};

#[derive(Deserialize)]
pub struct CreateOrganizationRequest {
    pub name: String,
    pub slug: String,
    pub tier: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateOrganizationRequest {
    pub tier: String,
}

#[derive(Serialize)]
pub struct OrganizationResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub subscription_tier: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Organization> for OrganizationResponse {
    fn from(org: Organization) -> Self {
        Self {
            id: org.id,
            name: org.name,
            slug: org.slug,
            subscription_tier: org.subscription_tier,
            created_at: to_iso(org.created_at),
            updated_at: to_iso(org.updated_at),
        }
    }
}

pub async fn create_organization(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrganizationRequest>,
) -> AppResult<(StatusCode, Json<OrganizationResponse>)> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("name must not be empty"));
    }
    if !is_valid_slug(&payload.slug) {
        return Err(AppError::bad_request(
            "slug must be lowercase alphanumerics and hyphens",
        ));
    }
    let tier = payload.tier.as_deref().unwrap_or(TIER_FREE);
    if !is_valid_tier(tier) {
        return Err(AppError::bad_request("unknown subscription tier"));
    }

    let mut conn = state.db()?;
    let org = tenancy::create_organization(&mut conn, name, &payload.slug, tier)?;
    Ok((StatusCode::CREATED, Json(org.into())))
}

pub async fn get_organization(
    State(state): State<AppState>,
    Path(org_id): Path<Uuid>,
) -> AppResult<Json<OrganizationResponse>> {
    let mut conn = state.db()?;
    let org = tenancy::get_organization(&mut conn, org_id)?;
    Ok(Json(org.into()))
}

pub async fn update_subscription_tier(
    State(state): State<AppState>,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<UpdateOrganizationRequest>,
) -> AppResult<Json<OrganizationResponse>> {
    if !is_valid_tier(&payload.tier) {
        return Err(AppError::bad_request("unknown subscription tier"));
    }
    let mut conn = state.db()?;
    let org = tenancy::update_subscription_tier(&mut conn, org_id, &payload.tier)?;
    Ok(Json(org.into()))
}

/// Irreversible: takes the organization's users, documents, and query log
/// down with it.
pub async fn delete_organization(
    State(state): State<AppState>,
    Path(org_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let mut conn = state.db()?;
    tenancy::delete_organization(&mut conn, org_id)?;
    Ok(StatusCode::NO_CONTENT)
}
