//! # Web Library
//!
//! Services, notifier, middleware, HTTP handlers and server setup for the
//! identity backend.
//!
//! ```text
//! Router → Middleware (stamp, trace, log, auth, role gate) → Handlers
//!        → Services → Stores / Token Service / Notifier
//! ```

pub mod handlers;
pub mod middleware;
pub mod notifier;
pub mod server;
pub mod services;

pub use server::{build_router, start_server, AppState, ServerConfig};
