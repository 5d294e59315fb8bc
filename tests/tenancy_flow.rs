mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{acquire_db_lock, body_to_json, TestApp};
use diesel::prelude::*;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use briefbase::schema::{documents, organizations, queries, users};
use briefbase::store::documents::DocumentDraft;
use briefbase::store::queries::QueryDraft;
use briefbase::store::{documents as document_store, queries as query_store, seed, tenancy};

#[derive(Deserialize)]
struct OrganizationInfo {
    id: Uuid,
    slug: String,
    subscription_tier: String,
}

#[allow(dead_code)]
#[derive(Deserialize)]
struct UserInfo {
    id: Uuid,
    email: String,
    role: String,
    organization_id: Option<Uuid>,
}

#[tokio::test]
async fn demo_seed_is_idempotent() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let Some(app) = TestApp::new().await? else {
        eprintln!("TEST_DATABASE_URL not set; skipping");
        return Ok(());
    };

    let (first_org, first_user) = app
        .with_conn(|conn| Ok(seed::seed_demo_tenant(conn)?))
        .await?;
    let (second_org, second_user) = app
        .with_conn(|conn| Ok(seed::seed_demo_tenant(conn)?))
        .await?;

    assert_eq!(first_org.id, second_org.id);
    assert_eq!(first_user.id, second_user.id);
    assert_eq!(second_org.slug, seed::DEMO_ORG_SLUG);
    assert_eq!(second_org.subscription_tier, "pro");
    assert_eq!(second_user.email, seed::DEMO_ADMIN_EMAIL);
    assert_eq!(second_user.role, "admin");

    let (org_count, user_count) = app
        .with_conn(|conn| {
            let orgs: i64 = organizations::table
                .filter(organizations::slug.eq(seed::DEMO_ORG_SLUG))
                .count()
                .get_result(conn)?;
            let users: i64 = users::table
                .filter(users::email.eq(seed::DEMO_ADMIN_EMAIL))
                .count()
                .get_result(conn)?;
            Ok((orgs, users))
        })
        .await?;
    assert_eq!(org_count, 1);
    assert_eq!(user_count, 1);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn duplicate_slug_conflicts_over_http() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let Some(app) = TestApp::new().await? else {
        eprintln!("TEST_DATABASE_URL not set; skipping");
        return Ok(());
    };

    let payload = json!({ "name": "Demo Law Firm", "slug": "demo-law-firm", "tier": "pro" });

    let response = app.post_json("/api/organizations", &payload).await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let org: OrganizationInfo = body_to_json(response.into_body()).await?;
    assert_eq!(org.slug, "demo-law-firm");
    assert_eq!(org.subscription_tier, "pro");

    let response = app.post_json("/api/organizations", &payload).await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let count = app
        .with_conn(|conn| {
            let count: i64 = organizations::table.count().get_result(conn)?;
            Ok(count)
        })
        .await?;
    assert_eq!(count, 1);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn duplicate_email_conflicts_over_http() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let Some(app) = TestApp::new().await? else {
        eprintln!("TEST_DATABASE_URL not set; skipping");
        return Ok(());
    };

    let response = app
        .post_json(
            "/api/organizations",
            &json!({ "name": "Acme Legal", "slug": "acme-legal" }),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let org: OrganizationInfo = body_to_json(response.into_body()).await?;

    let payload = json!({ "email": "counsel@acme.test", "full_name": "Ada Counsel" });
    let path = format!("/api/organizations/{}/users", org.id);

    let response = app.post_json(&path, &payload).await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let user: UserInfo = body_to_json(response.into_body()).await?;
    assert_eq!(user.email, "counsel@acme.test");
    assert_eq!(user.role, "lawyer");
    assert_eq!(user.organization_id, Some(org.id));

    let response = app.post_json(&path, &payload).await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn creating_user_for_missing_organization_fails() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let Some(app) = TestApp::new().await? else {
        eprintln!("TEST_DATABASE_URL not set; skipping");
        return Ok(());
    };

    let path = format!("/api/organizations/{}/users", Uuid::new_v4());
    let response = app
        .post_json(
            &path,
            &json!({ "email": "orphan@nowhere.test", "full_name": "No One" }),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn organization_delete_cascades() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let Some(app) = TestApp::new().await? else {
        eprintln!("TEST_DATABASE_URL not set; skipping");
        return Ok(());
    };

    let org_id = app
        .with_conn(|conn| {
            let org = tenancy::create_organization(conn, "Cascade Firm", "cascade-firm", "free")?;
            let user =
                tenancy::create_user(conn, "cascade@firm.test", "Cass Cade", org.id, "lawyer")?;
            let document = document_store::ingest_document(
                conn,
                org.id,
                DocumentDraft {
                    title: "Cascade v. State".to_string(),
                    document_type: "case_law".to_string(),
                    storage_ref: "s3://briefs/cascade.pdf".to_string(),
                    ..Default::default()
                },
            )?;
            query_store::record_query(
                conn,
                user.id,
                org.id,
                QueryDraft {
                    query_text: "what happened in cascade?".to_string(),
                    retrieved_document_ids: vec![document.id],
                    ..Default::default()
                },
            )?;
            Ok(org.id)
        })
        .await?;

    let response = app.delete(&format!("/api/organizations/{org_id}")).await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (user_count, document_count, query_count) = app
        .with_conn(move |conn| {
            let users: i64 = users::table
                .filter(users::organization_id.eq(org_id))
                .count()
                .get_result(conn)?;
            let documents: i64 = documents::table
                .filter(documents::organization_id.eq(org_id))
                .count()
                .get_result(conn)?;
            let queries: i64 = queries::table
                .filter(queries::organization_id.eq(org_id))
                .count()
                .get_result(conn)?;
            Ok((users, documents, queries))
        })
        .await?;
    assert_eq!(user_count, 0);
    assert_eq!(document_count, 0);
    assert_eq!(query_count, 0);

    let response = app.get(&format!("/api/organizations/{org_id}")).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.delete(&format!("/api/organizations/{org_id}")).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn tier_change_roundtrip() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let Some(app) = TestApp::new().await? else {
        eprintln!("TEST_DATABASE_URL not set; skipping");
        return Ok(());
    };

    let response = app
        .post_json(
            "/api/organizations",
            &json!({ "name": "Upgrade LLP", "slug": "upgrade-llp" }),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let org: OrganizationInfo = body_to_json(response.into_body()).await?;
    assert_eq!(org.subscription_tier, "free");

    let response = app
        .patch_json(
            &format!("/api/organizations/{}", org.id),
            &json!({ "tier": "enterprise" }),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: OrganizationInfo = body_to_json(response.into_body()).await?;
    assert_eq!(updated.subscription_tier, "enterprise");

    let response = app
        .patch_json(
            &format!("/api/organizations/{}", org.id),
            &json!({ "tier": "platinum" }),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn touch_last_login_sets_timestamp() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let Some(app) = TestApp::new().await? else {
        eprintln!("TEST_DATABASE_URL not set; skipping");
        return Ok(());
    };

    let (before, after) = app
        .with_conn(|conn| {
            let org = tenancy::create_organization(conn, "Login Firm", "login-firm", "free")?;
            let user = tenancy::create_user(conn, "login@firm.test", "Log In", org.id, "admin")?;
            let touched = tenancy::touch_last_login(conn, user.id)?;
            Ok((user.last_login, touched.last_login))
        })
        .await?;

    assert!(before.is_none());
    assert!(after.is_some());

    app.cleanup().await?;
    Ok(())
}
