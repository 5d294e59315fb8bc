use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::routes::to_iso;
use crate::state::AppState;
use crate::store::tenancy::{self, is_valid_role, ROLE_LAWYER};

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub full_name: String,
    pub role: Option<String>,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub organization_id: Option<Uuid>,
    pub role: String,
    pub created_at: String,
    pub last_login: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            organization_id: user.organization_id,
            role: user.role,
            created_at: to_iso(user.created_at),
            last_login: user.last_login.map(to_iso),
        }
    }
}

pub async fn create_user(
    State(state): State<AppState>,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::bad_request("email must be a valid address"));
    }
    let full_name = payload.full_name.trim();
    if full_name.is_empty() {
        return Err(AppError::bad_request("full_name must not be empty"));
    }
    let role = payload.role.as_deref().unwrap_or(ROLE_LAWYER);
    if !is_valid_role(role) {
        return Err(AppError::bad_request("unknown role"));
    }

    let mut conn = state.db()?;
    let user = tenancy::create_user(&mut conn, &email, full_name, org_id, role)?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn list_users(
    State(state): State<AppState>,
    Path(org_id): Path<Uuid>,
) -> AppResult<Json<Vec<UserResponse>>> {
    let mut conn = state.db()?;
    let users = tenancy::list_users(&mut conn, org_id)?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}
