use axum::extract::{Json, Path, State};
use chrono::Utc;
use uuid::Uuid;

use crate::error::AppResult;
use crate::state::AppState;
use crate::store::queries::{self, UsageStats};

pub async fn usage_stats(
    State(state): State<AppState>,
    Path(org_id): Path<Uuid>,
) -> AppResult<Json<UsageStats>> {
    let mut conn = state.db()?;
    let stats = queries::usage_stats(&mut conn, org_id, Utc::now().naive_utc())?;
    Ok(Json(stats))
}
