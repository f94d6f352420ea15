//! # Server Setup
//!
//! Server initialization, route registration, and HTTP server startup.
//!
//! [`start_server`] loads the configuration, opens and migrates the database,
//! seeds the role catalog, picks a notifier and serves the router built by
//! [`build_router`].

// region: --- Imports
use axum::{
    extract::FromRef,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Json, Router,
};
use lib_auth::TokenService;
use lib_core::model::models::RoleName;
use lib_core::{create_pool, migrate, seed_roles, Config, Stores};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::handlers;
use crate::middleware::{
    log_requests, map_res, mw_res_map::error_body, require_auth, require_role, stamp_req, RequestStamp,
};
use crate::notifier::{smtp::SmtpNotifier, LogNotifier, Notifier};
use crate::services::{AccountService, RoleAssignmentService, TokenIssuer, VerificationService};
// endregion: --- Imports

// region: --- AppState
/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub stores: Stores,
    pub tokens: TokenIssuer,
    pub account: AccountService,
    pub verification: VerificationService,
    pub roles: RoleAssignmentService,
}

impl AppState {
    /// Wire every service to the same stores and token service.
    pub fn new(stores: Stores, tokens: TokenService, notifier: Arc<dyn Notifier>) -> Self {
        let tokens = TokenIssuer::new(stores.clone(), tokens);
        Self {
            account: AccountService::new(stores.clone(), tokens.clone()),
            verification: VerificationService::new(stores.clone(), tokens.clone(), notifier),
            roles: RoleAssignmentService::new(stores.clone(), tokens.clone()),
            stores,
            tokens,
        }
    }
}

impl FromRef<AppState> for TokenIssuer {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

impl FromRef<AppState> for AccountService {
    fn from_ref(state: &AppState) -> Self {
        state.account.clone()
    }
}

impl FromRef<AppState> for VerificationService {
    fn from_ref(state: &AppState) -> Self {
        state.verification.clone()
    }
}

impl FromRef<AppState> for RoleAssignmentService {
    fn from_ref(state: &AppState) -> Self {
        state.roles.clone()
    }
}
// endregion: --- AppState

// region: --- Server Configuration
/// Server configuration
pub struct ServerConfig {
    /// Overrides `BIND_ADDRESS` when set
    pub bind_address: Option<String>,
    /// Allowed CORS origins
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: None,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
                "http://localhost:8080".to_string(),
                "http://127.0.0.1:8080".to_string(),
            ],
        }
    }
}
// endregion: --- Server Configuration

// region: --- Server Setup
fn init_tracing() -> String {
    let log_level = std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase();

    let filter = match log_level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => tracing_subscriber::EnvFilter::new(&log_level),
        _ => tracing_subscriber::EnvFilter::new("info"),
    };

    let initialized = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .try_init();

    if initialized.is_err() {
        warn!("Tracing subscriber already installed");
    }
    log_level
}

/// Initialize and start the HTTP server
///
/// # Errors
///
/// This function will return an error if:
/// - Configuration loading or validation fails
/// - Database connection or migrations fail
/// - Role catalog seeding fails
/// - The SMTP transport cannot be built
/// - Server binding fails
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    let log_level = init_tracing();

    info!(" IDENTITY BACKEND STARTING");
    info!(" Log level: {}", log_level);

    info!("Loading configuration...");
    let app_config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    app_config.validate().map_err(|e| anyhow::anyhow!(e))?;

    info!("Database URL: {}", app_config.database_url);

    info!("Connecting to database...");
    let pool = create_pool(&app_config.database_url).await?;

    info!(" Running database migrations");
    migrate(&pool).await?;
    info!(" Migrations complete");

    let stores = Stores::sqlite(pool);
    let catalog = seed_roles(stores.roles.as_ref()).await?;
    info!("[SEED] Role catalog ready ({} roles)", catalog.len());

    let notifier: Arc<dyn Notifier> = match &app_config.smtp {
        Some(smtp) => {
            info!("[MAIL] Using SMTP relay {}:{}", smtp.host, smtp.port);
            Arc::new(SmtpNotifier::new(smtp)?)
        }
        None => {
            warn!("[MAIL] SMTP_HOST not set, verification mail goes to the log");
            Arc::new(LogNotifier)
        }
    };

    let state = AppState::new(stores, TokenService::new(app_config.token_config()), notifier);
    let app = build_router(state, &config.allowed_origins);

    let bind_address = config.bind_address.unwrap_or(app_config.bind_address);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    info!(" SERVER READY: http://{}", bind_address);
    log_server_info();

    axum::serve(listener, app).await?;
    Ok(())
}

/// Create the application router with all routes and layers
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let gate = |path: &str, role: RoleName| {
        Router::<AppState>::new()
            .route(path, get(handlers::checks::check_role))
            .route_layer(from_fn_with_state(role, require_role))
    };

    info!("[ROUTE SETUP] Registering HTTP routes...");
    let protected = Router::new()
        .route("/api/auth/profile", get(handlers::auth::profile))
        .route("/api/auth/update-profile", post(handlers::auth::update_profile))
        .route("/api/user-roles/add", post(handlers::roles::add_role))
        .route("/api/user-roles/remove", post(handlers::roles::remove_role))
        .route("/api/check", get(handlers::checks::check))
        .merge(gate("/api/check-user", RoleName::User))
        .merge(gate("/api/check-specialist", RoleName::Specialist))
        .merge(gate("/api/check-minion", RoleName::Minion))
        .route_layer(from_fn_with_state(state.tokens.clone(), require_auth));

    Router::new()
        .route("/api/auth/sign-up", post(handlers::auth::sign_up))
        .route("/api/auth/send-verify-code", post(handlers::auth::send_verify_code))
        .route("/api/auth/check-verify-code", post(handlers::auth::check_verify_code))
        .route("/api/auth/sign-in", post(handlers::auth::sign_in))
        .route("/api/roles", get(handlers::roles::list_roles))
        .route("/api/roles/{id}", get(handlers::roles::get_role))
        .route("/health", get(|| async { "OK" }))
        .merge(protected)
        .fallback(|| async {
            info!("[404 HANDLER] Unmatched route - returning 404");
            (StatusCode::NOT_FOUND, Json(error_body(StatusCode::NOT_FOUND)))
        })
        .with_state(state)
        .layer(from_fn(map_res))
        .layer(from_fn(log_requests))
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .extensions()
                        .get::<RequestStamp>()
                        .map(|s| s.id.clone())
                        .unwrap_or_else(|| "unknown".to_string());
                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                })
                .on_failure(
                    |error: tower_http::classify::ServerErrorsFailureClass,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::error!(
                            error = ?error,
                            latency_ms = latency.as_millis(),
                            "[HTTP FAILURE] Error: {:?}, Latency: {}ms",
                            error,
                            latency.as_millis()
                        );
                    },
                ),
        )
        // Outermost so the stamp exists for every layer above
        .layer(from_fn(stamp_req))
        .layer(cors)
}

/// Log server information
fn log_server_info() {
    info!(" AUTH:");
    info!("   • POST /api/auth/sign-up");
    info!("   • POST /api/auth/send-verify-code");
    info!("   • POST /api/auth/check-verify-code");
    info!("   • POST /api/auth/sign-in");
    info!("   • GET  /api/auth/profile (token)");
    info!("   • POST /api/auth/update-profile (token)");
    info!(" ROLES:");
    info!("   • GET  /api/roles");
    info!("   • GET  /api/roles/{{id}}");
    info!("   • POST /api/user-roles/add (token)");
    info!("   • POST /api/user-roles/remove (token)");
    info!(" CHECKS:");
    info!("   • GET  /api/check (token)");
    info!("   • GET  /api/check-user | check-specialist | check-minion (token + role)");
    info!(" HEALTH:");
    info!("   • GET  /health");
}
// endregion: --- Server Setup
