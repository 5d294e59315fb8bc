use diesel::pg::PgConnection;
use tracing::info;

use crate::models::{Organization, User};

use super::tenancy::{ensure_organization, ensure_user, ROLE_ADMIN, TIER_PRO};
use super::StoreResult;

pub const DEMO_ORG_NAME: &str = "Demo Law Firm";
pub const DEMO_ORG_SLUG: &str = "demo-law-firm";
pub const DEMO_ADMIN_EMAIL: &str = "admin@demolawfirm.com";
pub const DEMO_ADMIN_NAME: &str = "Admin User";

/// First-run bootstrap: a demo organization with one admin user. Both writes
/// are create-if-absent, so running this on every startup is safe.
pub fn seed_demo_tenant(conn: &mut PgConnection) -> StoreResult<(Organization, User)> {
    let org = ensure_organization(conn, DEMO_ORG_NAME, DEMO_ORG_SLUG, TIER_PRO)?;
    let user = ensure_user(conn, DEMO_ADMIN_EMAIL, DEMO_ADMIN_NAME, org.id, ROLE_ADMIN)?;
    info!(
        organization_id = %org.id,
        user_id = %user.id,
        slug = %org.slug,
        "demo tenant present"
    );
    Ok((org, user))
}
