//! # Model Layer
//!
//! Domain records and the store they live in.

pub mod store;

pub use store::models;
