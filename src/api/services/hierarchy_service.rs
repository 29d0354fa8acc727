//! Hierarchy service: projects, collections and clusters.
//!
//! Names are validated locally before anything is sent. Duplicate detection
//! against a fresh sibling listing is a courtesy check only; when the listing
//! fails the action goes ahead and the backend decides.

use crate::backend::{BackendError, OstrichBackend};
use crate::models::{ClusterPath, ClusterSummary, CollectionPath, CollectionSummary};
use crate::services::type_registry::{self, ValidationError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Service managing the containers above records.
#[derive(Clone)]
pub struct HierarchyService {
    backend: Arc<dyn OstrichBackend>,
}

impl HierarchyService {
    pub fn new(backend: Arc<dyn OstrichBackend>) -> Self {
        Self { backend }
    }

    /// Validate `name` and reject it if a sibling already uses it, ignoring case.
    ///
    /// `current` is the entity being renamed, which never conflicts with itself.
    fn check_name(
        name: &str,
        current: Option<&str>,
        siblings: Result<Vec<String>, BackendError>,
        kind: &str,
    ) -> Result<(), HierarchyError> {
        type_registry::validate_name(name)?;
        match siblings {
            Ok(names) => {
                let taken = names.iter().any(|existing| {
                    existing.eq_ignore_ascii_case(name)
                        && current.is_none_or(|c| !existing.eq_ignore_ascii_case(c))
                });
                if taken {
                    return Err(ValidationError::DuplicateName {
                        name: name.to_string(),
                    }
                    .into());
                }
            }
            Err(e) => warn!("Could not check for duplicate {} names: {}", kind, e),
        }
        Ok(())
    }

    // Projects

    pub async fn list_projects(&self) -> Result<Vec<String>, BackendError> {
        self.backend.list_projects().await
    }

    pub async fn create_project(&self, name: &str) -> Result<(), HierarchyError> {
        let siblings = self.backend.list_projects().await;
        Self::check_name(name, None, siblings, "project")?;
        self.backend.create_project(name).await?;
        info!("Created project '{}'", name);
        Ok(())
    }

    pub async fn rename_project(
        &self,
        project: &str,
        new_name: &str,
    ) -> Result<(), HierarchyError> {
        if project == new_name {
            return Ok(());
        }
        let siblings = self.backend.list_projects().await;
        Self::check_name(new_name, Some(project), siblings, "project")?;
        self.backend.rename_project(project, new_name).await?;
        info!("Renamed project '{}' to '{}'", project, new_name);
        Ok(())
    }

    pub async fn delete_project(&self, project: &str) -> Result<(), HierarchyError> {
        self.backend.delete_project(project).await?;
        info!("Deleted project '{}'", project);
        Ok(())
    }

    // Collections

    pub async fn list_collections(
        &self,
        project: &str,
    ) -> Result<Vec<CollectionSummary>, BackendError> {
        self.backend.list_collections(project).await
    }

    async fn collection_names(&self, project: &str) -> Result<Vec<String>, BackendError> {
        let collections = self.backend.list_collections(project).await?;
        Ok(collections.into_iter().map(|c| c.name).collect())
    }

    pub async fn create_collection(&self, path: &CollectionPath) -> Result<(), HierarchyError> {
        let siblings = self.collection_names(&path.project).await;
        Self::check_name(&path.collection, None, siblings, "collection")?;
        self.backend.create_collection(path).await?;
        info!("Created collection '{}/{}'", path.project, path.collection);
        Ok(())
    }

    pub async fn rename_collection(
        &self,
        path: &CollectionPath,
        new_name: &str,
    ) -> Result<(), HierarchyError> {
        if path.collection == new_name {
            return Ok(());
        }
        let siblings = self.collection_names(&path.project).await;
        Self::check_name(new_name, Some(&path.collection), siblings, "collection")?;
        self.backend.rename_collection(path, new_name).await?;
        info!(
            "Renamed collection '{}/{}' to '{}'",
            path.project, path.collection, new_name
        );
        Ok(())
    }

    pub async fn delete_collection(&self, path: &CollectionPath) -> Result<(), HierarchyError> {
        self.backend.delete_collection(path).await?;
        info!("Deleted collection '{}/{}'", path.project, path.collection);
        Ok(())
    }

    // Clusters

    pub async fn list_clusters(
        &self,
        path: &CollectionPath,
    ) -> Result<Vec<ClusterSummary>, BackendError> {
        self.backend.list_clusters(path).await
    }

    async fn cluster_names(&self, path: &CollectionPath) -> Result<Vec<String>, BackendError> {
        let clusters = self.backend.list_clusters(path).await?;
        Ok(clusters.into_iter().map(|c| c.name).collect())
    }

    pub async fn create_cluster(&self, path: &ClusterPath) -> Result<(), HierarchyError> {
        let siblings = self.cluster_names(&path.collection_path()).await;
        Self::check_name(&path.cluster, None, siblings, "cluster")?;
        self.backend.create_cluster(path).await?;
        info!("Created cluster '{}'", path.cluster);
        Ok(())
    }

    pub async fn rename_cluster(
        &self,
        path: &ClusterPath,
        new_name: &str,
    ) -> Result<(), HierarchyError> {
        if path.cluster == new_name {
            return Ok(());
        }
        let siblings = self.cluster_names(&path.collection_path()).await;
        Self::check_name(new_name, Some(&path.cluster), siblings, "cluster")?;
        self.backend.rename_cluster(path, new_name).await?;
        info!("Renamed cluster '{}' to '{}'", path.cluster, new_name);
        Ok(())
    }

    pub async fn delete_cluster(&self, path: &ClusterPath) -> Result<(), HierarchyError> {
        self.backend.delete_cluster(path).await?;
        info!("Deleted cluster '{}'", path.cluster);
        Ok(())
    }
}
