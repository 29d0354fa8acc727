//! Sync service: executes operation plans against the backend.
//!
//! Steps run strictly one after another; each is awaited before the next is
//! sent. The first failure stops the run and whatever already landed stays
//! applied. There is no rollback: each landed step is reflected locally right
//! away, and after a failure the cluster is re-read so that a step the backend
//! applied despite reporting an error is not sent again.

use crate::backend::{BackendError, OstrichBackend};
use crate::models::{ClusterId, ClusterIdentity, ClusterPath, ClusterSummary, CollectionPath};
use crate::services::draft_service::DraftService;
use crate::services::sync_plan::{self, PlanError, StepEffect, SyncMode, SyncOperation, SyncPlan};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Pre-flight validation failed; nothing was sent
    #[error(transparent)]
    Plan(#[from] PlanError),
    /// A step failed; `completed` earlier steps already landed remotely
    #[error("Failed to {operation} ({completed} of {total} changes saved): {source}")]
    Partial {
        completed: usize,
        total: usize,
        operation: SyncOperation,
        record: Option<String>,
        source: BackendError,
    },
    /// Every step landed but re-reading the cluster failed
    #[error("Changes saved, but refreshing the cluster failed: {0}")]
    Reconcile(BackendError),
}

impl SyncError {
    /// Record implicated by a partial failure.
    pub fn record(&self) -> Option<&str> {
        match self {
            SyncError::Partial { record, .. } => record.as_deref(),
            _ => None,
        }
    }
}

/// Outcome of a successful submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub mode: SyncMode,
    pub applied: usize,
    pub cluster: ClusterIdentity,
}

/// Service driving plans against a backend.
#[derive(Clone)]
pub struct SyncService {
    backend: Arc<dyn OstrichBackend>,
}

impl SyncService {
    pub fn new(backend: Arc<dyn OstrichBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<dyn OstrichBackend> {
        &self.backend
    }

    async fn apply(
        &self,
        cluster: &ClusterPath,
        operation: &SyncOperation,
    ) -> Result<(), BackendError> {
        match operation {
            SyncOperation::CreateCluster { .. } => self.backend.create_cluster(cluster).await,
            SyncOperation::RenameCluster { to, .. } => {
                self.backend.rename_cluster(cluster, to).await
            }
            SyncOperation::CreateRecord { name, value } => {
                self.backend.create_record(cluster, name, value).await
            }
            SyncOperation::RenameRecord { from, to } => {
                self.backend.rename_record(cluster, from, to).await
            }
            SyncOperation::RetypeRecord { name, data_type } => {
                self.backend.retype_record(cluster, name, *data_type).await
            }
            SyncOperation::RevalueRecord { name, value } => {
                self.backend.revalue_record(cluster, name, value).await
            }
            SyncOperation::DeleteRecord { name } => self.backend.delete_record(cluster, name).await,
        }
    }

    /// Run a plan step by step, recording each landed step locally.
    ///
    /// Returns the number of steps applied.
    pub async fn execute(
        &self,
        collection: &CollectionPath,
        identity: &mut ClusterIdentity,
        plan: &SyncPlan,
        drafts: &mut DraftService,
    ) -> Result<usize, SyncError> {
        let total = plan.len();
        let mut cluster = collection.cluster(plan.cluster.clone());
        info!(
            "Executing {:?} plan with {} steps for cluster '{}'",
            plan.mode, total, plan.cluster
        );

        for (index, step) in plan.steps.iter().enumerate() {
            if let Err(source) = self.apply(&cluster, &step.operation).await {
                warn!(
                    "Sync stopped at step {} of {} ({}): {}",
                    index + 1,
                    total,
                    step.operation,
                    source
                );
                return Err(SyncError::Partial {
                    completed: index,
                    total,
                    operation: step.operation.clone(),
                    record: step.operation.record_name().map(str::to_string),
                    source,
                });
            }

            match step.effect {
                StepEffect::ClusterCreated => identity.id = ClusterId::Unknown,
                StepEffect::ClusterRenamed => {
                    if let SyncOperation::RenameCluster { to, .. } = &step.operation {
                        identity.name = to.clone();
                        cluster = cluster.renamed(to.clone());
                    }
                }
                StepEffect::RecordCreated => {
                    if let Some(id) = step.client_id
                        && let Some(draft) = drafts.get_mut(id)
                    {
                        draft.commit();
                    }
                }
                StepEffect::FieldSynced(field) => {
                    if let Some(id) = step.client_id
                        && let Some(draft) = drafts.get_mut(id)
                    {
                        draft.advance(field);
                    }
                }
                StepEffect::RecordDeleted => {
                    if let Some(id) = step.client_id {
                        drafts.remove(id);
                    }
                }
            }
        }

        Ok(total)
    }

    /// Sibling clusters for the duplicate-name check.
    ///
    /// The check is a convenience; the backend has the final say, so a failed
    /// listing is logged and treated as "no siblings".
    async fn siblings(&self, collection: &CollectionPath) -> Vec<ClusterSummary> {
        match self.backend.list_clusters(collection).await {
            Ok(clusters) => clusters,
            Err(e) => {
                warn!(
                    "Duplicate cluster name check skipped, listing clusters failed: {}",
                    e
                );
                Vec::new()
            }
        }
    }

    /// Re-read cluster metadata and records after a sync.
    pub async fn reconcile(
        &self,
        collection: &CollectionPath,
        identity: &mut ClusterIdentity,
        drafts: &mut DraftService,
    ) -> Result<(), BackendError> {
        let clusters = self.backend.list_clusters(collection).await?;
        let records = self
            .backend
            .list_records(&collection.cluster(identity.name.clone()))
            .await?;

        drafts.reconcile(&records);
        identity.id = clusters
            .iter()
            .find(|c| c.name == identity.name)
            .map(|c| ClusterId::from(c.id.clone()))
            .unwrap_or(ClusterId::Unknown);
        identity.record_count = records.len();
        Ok(())
    }

    /// Re-read the cluster after a failed run and fold what landed into the drafts.
    ///
    /// A step can fail on the client after the backend applied it (a timeout or
    /// a dropped connection), so the failing step is not assumed to be lost.
    /// Pending local edits are kept.
    pub async fn recover(
        &self,
        collection: &CollectionPath,
        identity: &mut ClusterIdentity,
        new_name: Option<&str>,
        drafts: &mut DraftService,
    ) -> Result<(), BackendError> {
        let clusters = self.backend.list_clusters(collection).await?;
        let summary = clusters
            .iter()
            .find(|c| c.name == identity.name)
            .or_else(|| new_name.and_then(|n| clusters.iter().find(|c| c.name == n)));

        match summary {
            Some(summary) => {
                identity.name = summary.name.clone();
                identity.id = ClusterId::from(summary.id.clone());
            }
            None if identity.is_unsaved() => {
                info!(
                    "Cluster '{}' was not created, nothing to recover",
                    identity.name
                );
                return Ok(());
            }
            None => identity.id = ClusterId::Unknown,
        }

        let records = self
            .backend
            .list_records(&collection.cluster(identity.name.clone()))
            .await?;
        drafts.merge_remote(&records);
        identity.record_count = records.len();
        info!(
            "Recovered cluster '{}' after failed sync ({} records on server)",
            identity.name,
            records.len()
        );
        Ok(())
    }

    /// Plan, execute and reconcile one submit.
    pub async fn submit(
        &self,
        collection: &CollectionPath,
        identity: &mut ClusterIdentity,
        new_name: Option<&str>,
        drafts: &mut DraftService,
    ) -> Result<SyncReport, SyncError> {
        let renaming = !identity.is_unsaved() && new_name.is_some_and(|n| n != identity.name);
        let siblings = if renaming {
            self.siblings(collection).await
        } else {
            Vec::new()
        };

        let plan = match sync_plan::plan(identity, new_name, &siblings, drafts) {
            Ok(plan) => plan,
            Err(e) => {
                if matches!(e, PlanError::InvalidRecords { .. }) {
                    drafts.validate_all();
                }
                return Err(e.into());
            }
        };

        let applied = match self.execute(collection, identity, &plan, drafts).await {
            Ok(applied) => applied,
            Err(e) => {
                if let Err(refresh) = self.recover(collection, identity, new_name, drafts).await {
                    warn!("Could not re-read cluster after failed sync: {}", refresh);
                }
                return Err(e);
            }
        };
        drafts.commit_all();

        self.reconcile(collection, identity, drafts)
            .await
            .map_err(SyncError::Reconcile)?;

        info!(
            "Saved {} changes to cluster '{}' ({} records)",
            applied, identity.name, identity.record_count
        );
        Ok(SyncReport {
            mode: plan.mode,
            applied,
            cluster: identity.clone(),
        })
    }
}
