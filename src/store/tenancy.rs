use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use tracing::info;
use uuid::Uuid;

use crate::models::{NewOrganization, NewUser, Organization, User};
use crate::schema::{organizations, users};

use super::{StoreError, StoreResult};

pub const TIER_FREE: &str = "free";
pub const TIER_PRO: &str = "pro";
pub const TIER_ENTERPRISE: &str = "enterprise";

pub const SUBSCRIPTION_TIERS: &[&str] = &[TIER_FREE, TIER_PRO, TIER_ENTERPRISE];

pub const ROLE_LAWYER: &str = "lawyer";
pub const ROLE_ADMIN: &str = "admin";

pub const USER_ROLES: &[&str] = &[ROLE_LAWYER, ROLE_ADMIN];

pub fn is_valid_tier(tier: &str) -> bool {
    SUBSCRIPTION_TIERS.iter().any(|allowed| *allowed == tier)
}

pub fn is_valid_role(role: &str) -> bool {
    USER_ROLES.iter().any(|allowed| *allowed == role)
}

/// Slugs are the external-facing tenant key and end up in URLs, so only
/// lowercase alphanumerics and single hyphens are accepted.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}

pub fn create_organization(
    conn: &mut PgConnection,
    name: &str,
    slug: &str,
    tier: &str,
) -> StoreResult<Organization> {
    let new_org = NewOrganization {
        id: Uuid::new_v4(),
        name: name.to_string(),
        slug: slug.to_string(),
        subscription_tier: tier.to_string(),
    };

    match diesel::insert_into(organizations::table)
        .values(&new_org)
        .execute(conn)
    {
        Ok(_) => {}
        Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            return Err(StoreError::conflict("organization slug", slug));
        }
        Err(err) => return Err(StoreError::from(err)),
    }

    let org = organizations::table.find(new_org.id).first(conn)?;
    Ok(org)
}

/// Create-if-absent twin of [`create_organization`], keyed on the slug.
/// Used by seed/bootstrap paths where re-running must be a no-op.
pub fn ensure_organization(
    conn: &mut PgConnection,
    name: &str,
    slug: &str,
    tier: &str,
) -> StoreResult<Organization> {
    let new_org = NewOrganization {
        id: Uuid::new_v4(),
        name: name.to_string(),
        slug: slug.to_string(),
        subscription_tier: tier.to_string(),
    };

    diesel::insert_into(organizations::table)
        .values(&new_org)
        .on_conflict(organizations::slug)
        .do_nothing()
        .execute(conn)?;

    let org = organizations::table
        .filter(organizations::slug.eq(slug))
        .first(conn)?;
    Ok(org)
}

pub fn get_organization(conn: &mut PgConnection, org_id: Uuid) -> StoreResult<Organization> {
    organizations::table
        .find(org_id)
        .first(conn)
        .optional()?
        .ok_or(StoreError::NotFound("organization"))
}

pub fn get_organization_by_slug(conn: &mut PgConnection, slug: &str) -> StoreResult<Organization> {
    organizations::table
        .filter(organizations::slug.eq(slug))
        .first(conn)
        .optional()?
        .ok_or(StoreError::NotFound("organization"))
}

pub fn update_subscription_tier(
    conn: &mut PgConnection,
    org_id: Uuid,
    tier: &str,
) -> StoreResult<Organization> {
    let updated = diesel::update(organizations::table.find(org_id))
        .set((
            organizations::subscription_tier.eq(tier),
            organizations::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(conn)?;
    if updated == 0 {
        return Err(StoreError::NotFound("organization"));
    }
    let org = organizations::table.find(org_id).first(conn)?;
    Ok(org)
}

/// Hard tenant teardown. The organization row and, via the schema's cascade
/// rules, every owned user, document, and query go in one transaction;
/// either the whole subtree is gone or nothing is.
pub fn delete_organization(conn: &mut PgConnection, org_id: Uuid) -> StoreResult<()> {
    conn.transaction::<_, StoreError, _>(|conn| {
        let deleted = diesel::delete(organizations::table.find(org_id)).execute(conn)?;
        if deleted == 0 {
            return Err(StoreError::NotFound("organization"));
        }
        info!(organization_id = %org_id, "organization deleted with cascade");
        Ok(())
    })
}

pub fn create_user(
    conn: &mut PgConnection,
    email: &str,
    full_name: &str,
    organization_id: Uuid,
    role: &str,
) -> StoreResult<User> {
    let new_user = NewUser {
        id: Uuid::new_v4(),
        email: email.to_string(),
        full_name: full_name.to_string(),
        organization_id: Some(organization_id),
        role: role.to_string(),
    };

    match diesel::insert_into(users::table)
        .values(&new_user)
        .execute(conn)
    {
        Ok(_) => {}
        Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            return Err(StoreError::conflict("user email", email));
        }
        Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => {
            return Err(StoreError::integrity(format!(
                "organization {organization_id} does not exist"
            )));
        }
        Err(err) => return Err(StoreError::from(err)),
    }

    let user = users::table.find(new_user.id).first(conn)?;
    Ok(user)
}

/// Create-if-absent twin of [`create_user`], keyed on the email.
pub fn ensure_user(
    conn: &mut PgConnection,
    email: &str,
    full_name: &str,
    organization_id: Uuid,
    role: &str,
) -> StoreResult<User> {
    let new_user = NewUser {
        id: Uuid::new_v4(),
        email: email.to_string(),
        full_name: full_name.to_string(),
        organization_id: Some(organization_id),
        role: role.to_string(),
    };

    match diesel::insert_into(users::table)
        .values(&new_user)
        .on_conflict(users::email)
        .do_nothing()
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

    let user = users::table.filter(users::email.eq(email)).first(conn)?;
    Ok(user)
}

pub fn get_user(conn: &mut PgConnection, user_id: Uuid) -> StoreResult<User> {
    users::table
        .find(user_id)
        .first(conn)
        .optional()?
        .ok_or(StoreError::NotFound("user"))
}

pub fn list_users(conn: &mut PgConnection, org_id: Uuid) -> StoreResult<Vec<User>> {
    let rows = users::table
        .filter(users::organization_id.eq(org_id))
        .order(users::created_at.asc())
        .load(conn)?;
    Ok(rows)
}

/// Called by the external authentication layer on each successful login.
pub fn touch_last_login(conn: &mut PgConnection, user_id: Uuid) -> StoreResult<User> {
    let updated = diesel::update(users::table.find(user_id))
        .set(users::last_login.eq(Utc::now().naive_utc()))
        .execute(conn)?;
    if updated == 0 {
        return Err(StoreError::NotFound("user"));
    }
    let user = users::table.find(user_id).first(conn)?;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::{is_valid_role, is_valid_slug, is_valid_tier};

    #[test]
    fn accepts_url_safe_slugs() {
        assert!(is_valid_slug("demo-law-firm"));
        assert!(is_valid_slug("firm42"));
    }

    #[test]
    fn rejects_malformed_slugs() {
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("Demo Law Firm"));
        assert!(!is_valid_slug("-leading"));
        assert!(!is_valid_slug("trailing-"));
        assert!(!is_valid_slug("double--hyphen"));
    }

    #[test]
    fn validates_vocabulary() {
        assert!(is_valid_tier("free"));
        assert!(is_valid_tier("enterprise"));
        assert!(!is_valid_tier("platinum"));
        assert!(is_valid_role("lawyer"));
        assert!(!is_valid_role("paralegal"));
    }
}
