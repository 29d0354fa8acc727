//! Backend module for the dashboard.
//!
//! Provides the OstrichDB REST surface as a trait plus its reqwest implementation.

pub mod auth;
pub mod error;
pub mod http;
pub mod traits;

pub use auth::{EnvTokenProvider, StaticTokenProvider};
pub use error::BackendError;
pub use http::HttpBackend;
pub use traits::{OstrichBackend, RawResponse, TokenProvider};
