//! Record editor model for the OstrichDB dashboard.
//!
//! Typed record drafts, their validation, and the sequential sync of local
//! edits to the OstrichDB REST API.

// API module for the OstrichDB client
pub mod api;

// Re-export api modules at crate root (so services can use crate::models, crate::backend)
pub use api::backend;
pub use api::config;
pub use api::models;
pub use api::observability;
pub use api::services;
