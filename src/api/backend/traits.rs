//! Trait definitions for the OstrichDB backend surface.

use super::BackendError;
use crate::models::{
    ClusterPath, ClusterSummary, CollectionPath, CollectionSummary, DataType, ManualQueryRoute,
    RemoteRecord, TypedValue,
};
use serde::{Deserialize, Serialize};

/// Supplier of bearer tokens.
///
/// Tokens may rotate, so callers ask again before every request instead of
/// holding on to a previous answer.
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    async fn get_token(&self) -> Option<String>;
}

/// Status and body of a response that is surfaced as-is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawResponse {
    pub status: u16,
    /// Parsed JSON body, or the raw text as a JSON string.
    pub body: serde_json::Value,
    pub text: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// REST surface of the OstrichDB backend, treated as a black box.
#[async_trait::async_trait]
pub trait OstrichBackend: Send + Sync {
    /// List project names
    async fn list_projects(&self) -> Result<Vec<String>, BackendError>;

    /// Create a project
    async fn create_project(&self, project: &str) -> Result<(), BackendError>;

    /// Rename a project
    async fn rename_project(&self, project: &str, new_name: &str) -> Result<(), BackendError>;

    /// Delete a project
    async fn delete_project(&self, project: &str) -> Result<(), BackendError>;

    /// List collections in a project
    async fn list_collections(&self, project: &str)
    -> Result<Vec<CollectionSummary>, BackendError>;

    /// Create a collection
    async fn create_collection(&self, path: &CollectionPath) -> Result<(), BackendError>;

    /// Rename a collection
    async fn rename_collection(
        &self,
        path: &CollectionPath,
        new_name: &str,
    ) -> Result<(), BackendError>;

    /// Delete a collection
    async fn delete_collection(&self, path: &CollectionPath) -> Result<(), BackendError>;

    /// List clusters in a collection
    async fn list_clusters(&self, path: &CollectionPath)
    -> Result<Vec<ClusterSummary>, BackendError>;

    /// Create an empty cluster
    async fn create_cluster(&self, path: &ClusterPath) -> Result<(), BackendError>;

    /// Rename a cluster
    async fn rename_cluster(&self, path: &ClusterPath, new_name: &str)
    -> Result<(), BackendError>;

    /// Delete a cluster
    async fn delete_cluster(&self, path: &ClusterPath) -> Result<(), BackendError>;

    /// List records in a cluster
    async fn list_records(&self, path: &ClusterPath) -> Result<Vec<RemoteRecord>, BackendError>;

    /// Create a record with its type and value
    async fn create_record(
        &self,
        path: &ClusterPath,
        name: &str,
        value: &TypedValue,
    ) -> Result<(), BackendError>;

    /// Rename a record
    async fn rename_record(
        &self,
        path: &ClusterPath,
        name: &str,
        new_name: &str,
    ) -> Result<(), BackendError>;

    /// Change the declared type of a record
    async fn retype_record(
        &self,
        path: &ClusterPath,
        name: &str,
        data_type: DataType,
    ) -> Result<(), BackendError>;

    /// Replace the value of a record
    async fn revalue_record(
        &self,
        path: &ClusterPath,
        name: &str,
        value: &TypedValue,
    ) -> Result<(), BackendError>;

    /// Delete a record
    async fn delete_record(&self, path: &ClusterPath, name: &str) -> Result<(), BackendError>;

    /// Ask the backend which route a manual query maps to
    async fn resolve_manual_query(
        &self,
        project: &str,
        query: &str,
    ) -> Result<ManualQueryRoute, BackendError>;

    /// Perform a resolved query route; any status is returned as a response
    async fn dispatch_route(&self, route: &ManualQueryRoute) -> Result<RawResponse, BackendError>;
}
