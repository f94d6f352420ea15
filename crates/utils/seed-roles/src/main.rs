//! # Seed Roles Utility
//!
//! Creates the role catalog (`user`, `specialist`, `minion`) in the configured
//! database. Roles that already exist are left untouched, so the command can
//! be run repeatedly.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --package seed-roles --bin seed_roles
//! ```
//!
//! Reads `DATABASE_URL` (default `sqlite:data/identity.db`).

use lib_core::config::DEFAULT_DATABASE_URL;
use lib_core::{create_pool, migrate, seed_roles, Stores};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    println!("============================================");
    println!("  Seed Roles Utility");
    println!("============================================");
    println!();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

    println!("Connecting to {}...", database_url);
    let pool = create_pool(&database_url).await?;
    migrate(&pool).await?;
    println!("Connected successfully.");
    println!();

    let stores = Stores::sqlite(pool);
    let before = stores.roles.get_roles().await?.len();
    let catalog = seed_roles(stores.roles.as_ref()).await?;

    for role in &catalog {
        let marker = if role.is_default { " (default)" } else { "" };
        println!("  {:<12} {}{}", role.name.as_str(), role.id, marker);
    }
    println!();
    println!(
        "Catalog has {} role(s), {} created.",
        catalog.len(),
        catalog.len().saturating_sub(before)
    );

    Ok(())
}
