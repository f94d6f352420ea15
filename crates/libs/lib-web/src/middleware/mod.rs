//! # Middleware
//!
//! Axum middleware for request stamping, logging, response mapping,
//! authentication and role gating.
//!
//! ## Modules
//!
//! - **[`mw_req_stamp`]**: Request ID and timestamp stamping
//! - **[`mw_logging`]**: Structured request/response logging
//! - **[`mw_res_map`]**: Uniform error bodies
//! - **[`mw_auth`]**: Access token validation
//! - **[`mw_role`]**: Approved-role gate

// region: --- Modules
pub mod mw_auth;
pub mod mw_logging;
pub mod mw_req_stamp;
pub mod mw_res_map;
pub mod mw_role;
// endregion: --- Modules

// region: --- Re-exports
pub use mw_auth::require_auth;
pub use mw_logging::log_requests;
pub use mw_req_stamp::{stamp_req, RequestStamp};
pub use mw_res_map::map_res;
pub use mw_role::require_role;
// endregion: --- Re-exports
