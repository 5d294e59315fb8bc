use axum::http::HeaderValue;
use axum::{
    routing::{get, patch, post},
    Router,
};
use chrono::NaiveDateTime;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::state::AppState;

pub mod analytics;
pub mod documents;
pub mod health;
pub mod organizations;
pub mod queries;
pub mod users;

pub fn create_router(state: AppState) -> Router<()> {
    let cors = if let Some(origins) = state.config.cors_allowed_origin.as_ref() {
        let headers: Vec<HeaderValue> = origins
            .split(',')
            .filter_map(|value| {
                let trimmed = value.trim();
                (!trimmed.is_empty()).then(|| {
                    trimmed
                        .parse::<HeaderValue>()
                        .expect("invalid CORS allowed origin")
                })
            })
            .collect();

        let allow_origin = AllowOrigin::list(headers);

        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
            .allow_credentials(true)
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
            .allow_credentials(true)
    };

    let organization_routes = Router::new()
        .route("/", post(organizations::create_organization))
        .route(
            "/:org_id",
            get(organizations::get_organization)
                .patch(organizations::update_subscription_tier)
                .delete(organizations::delete_organization),
        )
        .route(
            "/:org_id/users",
            get(users::list_users).post(users::create_user),
        )
        .route(
            "/:org_id/documents",
            get(documents::list_documents).post(documents::ingest_document),
        )
        .route(
            "/:org_id/documents/:document_id",
            get(documents::get_document).delete(documents::delete_document),
        )
        .route(
            "/:org_id/queries",
            get(queries::list_queries).post(queries::record_query),
        )
        .route("/:org_id/analytics/usage", get(analytics::usage_stats));

    // pipeline callbacks address documents by id alone
    let document_routes = Router::new()
        .route("/:document_id/status", patch(documents::update_status))
        .route(
            "/:document_id/vector-indexed",
            post(documents::mark_vector_indexed),
        );

    let query_routes = Router::new().route("/:query_id/feedback", post(queries::record_feedback));

    Router::new()
        .route("/api/health", get(health::health_check))
        .nest("/api/organizations", organization_routes)
        .nest("/api/documents", document_routes)
        .nest("/api/queries", query_routes)
        .layer(cors)
        .with_state(state)
}

pub(crate) fn to_iso(dt: NaiveDateTime) -> String {
    chrono::DateTime::<chrono::Utc>::from_naive_utc_and_offset(dt, chrono::Utc).to_rfc3339()
}
