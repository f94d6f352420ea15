//! # Core Library
//!
//! Core models, store contracts and their SQLite implementation, configuration,
//! DTOs and the application-wide error type.

pub mod config;
pub mod dto;
pub mod error;
pub mod model;

// Re-export commonly used types
pub use config::{Config, SmtpConfig};
pub use error::{AppError, ErrorCategory, Result};
pub use model::store::{
    create_memory_pool, create_pool, migrate, seed_roles, DbPool, RoleAssignmentStore, RoleStore,
    StoreError, StoreResult, Stores, UserStore,
};
