use std::env;

use anyhow::{Context, Result};

use briefbase::{config::AppConfig, db, store::seed, store::tenancy};

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let mut args = env::args().skip(1);
    match args.next().as_deref() {
        Some("migrate") => migrate()?,
        Some("seed-demo") => seed_demo()?,
        Some("delete-organization") => {
            let slug = args
                .next()
                .context("usage: maintenance delete-organization <slug>")?;
            delete_organization(&slug)?;
        }
        Some(cmd) => {
            eprintln!(
                "Unknown command: {cmd}\nUsage: maintenance migrate|seed-demo|delete-organization <slug>"
            );
            std::process::exit(1);
        }
        None => {
            eprintln!("Usage: maintenance migrate|seed-demo|delete-organization <slug>");
            std::process::exit(1);
        }
    }

    Ok(())
}

fn connect() -> Result<db::PgPool> {
    let config = AppConfig::from_env()?;
    println!(
        "Connecting to {} (pool size {})",
        config.redacted_database_url(),
        config.database_max_pool_size
    );
    db::init_pool_with_size(&config.database_url, config.database_max_pool_size)
}

fn migrate() -> Result<()> {
    let pool = connect()?;
    let mut conn = pool.get().context("failed to get database connection")?;
    db::run_migrations(&mut conn)?;
    println!("Migrations applied.");
    Ok(())
}

fn seed_demo() -> Result<()> {
    let pool = connect()?;
    let mut conn = pool.get().context("failed to get database connection")?;
    db::run_migrations(&mut conn)?;
    let (org, user) = seed::seed_demo_tenant(&mut conn)?;
    println!("Demo tenant ready: {} ({}), admin {}", org.name, org.slug, user.email);
    Ok(())
}

fn delete_organization(slug: &str) -> Result<()> {
    let pool = connect()?;
    let mut conn = pool.get().context("failed to get database connection")?;
    let org = tenancy::get_organization_by_slug(&mut conn, slug)?;
    tenancy::delete_organization(&mut conn, org.id)?;
    println!("Organization '{slug}' and everything it owned are gone.");
    Ok(())
}
