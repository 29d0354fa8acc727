// API module organization
pub mod backend;
pub mod config;
pub mod models;
pub mod observability;
pub mod services;
