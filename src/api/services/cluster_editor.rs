//! Cluster editor session.
//!
//! Ties one cluster's identity, its record drafts and a staged cluster rename
//! to a backend. Opening a name that does not exist yet starts an unsaved
//! cluster; the first submit creates it.

use crate::backend::{BackendError, OstrichBackend};
use crate::models::{ClusterId, ClusterIdentity, ClusterPath, CollectionPath};
use crate::services::draft_service::DraftService;
use crate::services::raw_format;
use crate::services::sync_service::{SyncError, SyncReport, SyncService};
use crate::services::type_registry::{self, ValidationError};
use std::sync::Arc;
use tracing::info;

pub struct ClusterEditor {
    sync: SyncService,
    collection: CollectionPath,
    identity: ClusterIdentity,
    pending_name: Option<String>,
    drafts: DraftService,
}

impl ClusterEditor {
    /// Open `path`, loading its records when the cluster already exists.
    pub async fn open(
        backend: Arc<dyn OstrichBackend>,
        path: ClusterPath,
    ) -> Result<Self, BackendError> {
        let mut editor = Self {
            sync: SyncService::new(backend),
            collection: path.collection_path(),
            identity: ClusterIdentity::unsaved(path.cluster),
            pending_name: None,
            drafts: DraftService::new(),
        };
        editor.refresh().await?;
        Ok(editor)
    }

    /// Start an unsaved cluster without asking the backend.
    pub fn new_cluster(backend: Arc<dyn OstrichBackend>, path: ClusterPath) -> Self {
        Self {
            sync: SyncService::new(backend),
            collection: path.collection_path(),
            identity: ClusterIdentity::unsaved(path.cluster),
            pending_name: None,
            drafts: DraftService::new(),
        }
    }

    /// Reload identity and records from the backend, discarding local edits.
    pub async fn refresh(&mut self) -> Result<(), BackendError> {
        let backend = self.sync.backend();
        let clusters = backend.list_clusters(&self.collection).await?;

        match clusters.iter().find(|c| c.name == self.identity.name) {
            Some(summary) => {
                let records = backend.list_records(&self.path()).await?;
                self.identity = ClusterIdentity {
                    name: summary.name.clone(),
                    id: ClusterId::from(summary.id.clone()),
                    record_count: records.len(),
                };
                self.drafts.load_remote(&records);
            }
            None if self.identity.is_unsaved() => {
                info!(
                    "Cluster '{}' does not exist yet, editing it as a new cluster",
                    self.identity.name
                );
                self.drafts.load_remote(&[]);
            }
            None => {
                // Persisted, but missing from the listing: keep editing what we have.
                let records = backend.list_records(&self.path()).await?;
                self.identity.id = ClusterId::Unknown;
                self.identity.record_count = records.len();
                self.drafts.load_remote(&records);
            }
        }

        self.pending_name = None;
        Ok(())
    }

    pub fn identity(&self) -> &ClusterIdentity {
        &self.identity
    }

    pub fn path(&self) -> ClusterPath {
        self.collection.cluster(self.identity.name.clone())
    }

    pub fn drafts(&self) -> &DraftService {
        &self.drafts
    }

    pub fn drafts_mut(&mut self) -> &mut DraftService {
        &mut self.drafts
    }

    /// Name the cluster will carry after the next submit.
    pub fn display_name(&self) -> &str {
        self.pending_name.as_deref().unwrap_or(&self.identity.name)
    }

    /// Stage a new cluster name.
    ///
    /// An unsaved cluster is simply renamed locally; a persisted one is renamed
    /// remotely on the next submit.
    pub fn rename_cluster(&mut self, new_name: &str) -> Result<(), ValidationError> {
        type_registry::validate_name(new_name)?;
        if self.identity.is_unsaved() {
            self.identity.name = new_name.to_string();
            self.pending_name = None;
        } else if new_name == self.identity.name {
            self.pending_name = None;
        } else {
            self.pending_name = Some(new_name.to_string());
        }
        Ok(())
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.identity.is_unsaved()
            || self.pending_name.is_some()
            || self.drafts.has_unsaved_changes()
    }

    /// Push every staged change to the backend and re-read the cluster.
    pub async fn submit(&mut self) -> Result<SyncReport, SyncError> {
        let result = self
            .sync
            .submit(
                &self.collection,
                &mut self.identity,
                self.pending_name.as_deref(),
                &mut self.drafts,
            )
            .await;

        // A landed rename is reflected in the identity even when a later step failed.
        if self.pending_name.as_deref() == Some(self.identity.name.as_str()) {
            self.pending_name = None;
        }
        result
    }

    /// Raw text representation of the cluster as the editor currently sees it.
    pub fn raw_format(&self) -> String {
        let identity = ClusterIdentity {
            name: self.display_name().to_string(),
            ..self.identity.clone()
        };
        raw_format::generate(&identity, &self.drafts)
    }
}
