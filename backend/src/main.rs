//! # Backend Service
//!
//! Thin entry point that delegates to lib-web for server setup.
//!
//! Settings come from the environment (or a `.env` file): `JWT_SECRET` is
//! required; `DATABASE_URL`, `BIND_ADDRESS`, `JWT_EXPIRATION_HOURS`,
//! `LOG_LEVEL`, `ALLOWED_ORIGINS` and the `SMTP_*` block are optional.

use lib_web::{start_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let mut config = ServerConfig::default();
    if let Ok(origins) = std::env::var("ALLOWED_ORIGINS") {
        config.allowed_origins = origins
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();
    }

    start_server(config).await
}
