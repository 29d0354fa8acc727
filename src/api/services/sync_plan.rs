//! Operation plans for reconciling drafts with the backend.
//!
//! A plan is the ordered list of remote calls a sync will make, built before
//! anything is sent. Ordering rules live here and can be checked without a
//! network:
//!
//! - a cluster rename runs first, and every later step addresses the new name;
//! - deletions run before creates and updates, addressed by the record's
//!   original name;
//! - per record, rename precedes retype precedes revalue, and the latter two
//!   address the record's current name.

use crate::models::{
    ClusterIdentity, ClusterSummary, DataType, DraftField, RecordDraft, TypedValue,
};
use crate::services::draft_service::{DraftService, validate_draft};
use crate::services::type_registry::{self, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// One remote call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SyncOperation {
    CreateCluster { name: String },
    RenameCluster { from: String, to: String },
    CreateRecord { name: String, value: TypedValue },
    RenameRecord { from: String, to: String },
    RetypeRecord { name: String, data_type: DataType },
    RevalueRecord { name: String, value: TypedValue },
    DeleteRecord { name: String },
}

impl SyncOperation {
    /// Name of the record the operation acts on, if any.
    pub fn record_name(&self) -> Option<&str> {
        match self {
            SyncOperation::CreateCluster { .. } | SyncOperation::RenameCluster { .. } => None,
            SyncOperation::CreateRecord { name, .. }
            | SyncOperation::RetypeRecord { name, .. }
            | SyncOperation::RevalueRecord { name, .. }
            | SyncOperation::DeleteRecord { name } => Some(name),
            SyncOperation::RenameRecord { from, .. } => Some(from),
        }
    }
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOperation::CreateCluster { name } => write!(f, "create cluster '{}'", name),
            SyncOperation::RenameCluster { from, to } => {
                write!(f, "rename cluster '{}' to '{}'", from, to)
            }
            SyncOperation::CreateRecord { name, value } => {
                write!(f, "create record '{}' ({})", name, value.data_type)
            }
            SyncOperation::RenameRecord { from, to } => {
                write!(f, "rename record '{}' to '{}'", from, to)
            }
            SyncOperation::RetypeRecord { name, data_type } => {
                write!(f, "change type of record '{}' to {}", name, data_type)
            }
            SyncOperation::RevalueRecord { name, .. } => {
                write!(f, "update value of record '{}'", name)
            }
            SyncOperation::DeleteRecord { name } => write!(f, "delete record '{}'", name),
        }
    }
}

/// What to mark as synced locally once a step lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepEffect {
    /// Cluster now exists remotely
    ClusterCreated,
    /// Cluster is now addressed by the new name
    ClusterRenamed,
    /// Draft is persisted with its current fields
    RecordCreated,
    /// One field of the draft is synced
    FieldSynced(DraftField),
    /// Draft is gone remotely and leaves the list
    RecordDeleted,
}

/// A planned operation plus its local bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStep {
    pub operation: SyncOperation,
    /// Draft the step belongs to, `None` for cluster-level steps.
    pub client_id: Option<Uuid>,
    pub effect: StepEffect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    Create,
    Update,
}

/// Ordered remote operations for one submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPlan {
    pub mode: SyncMode,
    /// Cluster name the first step addresses.
    pub cluster: String,
    pub steps: Vec<SyncStep>,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn operations(&self) -> impl Iterator<Item = &SyncOperation> {
        self.steps.iter().map(|s| &s.operation)
    }

    /// Cluster name after every step has run.
    pub fn final_cluster_name(&self) -> &str {
        self.operations()
            .filter_map(|op| match op {
                SyncOperation::RenameCluster { to, .. } => Some(to.as_str()),
                _ => None,
            })
            .last()
            .unwrap_or(&self.cluster)
    }
}

/// Reasons a plan cannot be built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("Please fix errors in your records before saving ({} invalid)", .failures.len())]
    InvalidRecords {
        failures: Vec<(String, ValidationError)>,
    },
    #[error("Invalid cluster name: {0}")]
    InvalidClusterName(ValidationError),
    #[error("Record name '{name}' is used more than once")]
    DuplicateRecordName { name: String },
    #[error("Record '{name}' is deleted and recreated in the same save; save the deletion first")]
    ConflictingRecordName { name: String },
}

fn invalid_records(
    drafts: &DraftService,
    include: impl Fn(&RecordDraft) -> bool,
) -> Result<(), PlanError> {
    let failures: Vec<(String, ValidationError)> = drafts
        .live()
        .filter(|d| include(d))
        .filter_map(|d| validate_draft(d).err().map(|e| (d.name.clone(), e)))
        .collect();

    if failures.is_empty() {
        Ok(())
    } else {
        Err(PlanError::InvalidRecords { failures })
    }
}

/// Live names must be unique, and no live draft may reuse a name deleted in the same pass.
fn check_name_conflicts(drafts: &DraftService) -> Result<(), PlanError> {
    let mut seen = HashSet::new();
    for draft in drafts.live() {
        if !seen.insert(draft.name.as_str()) {
            return Err(PlanError::DuplicateRecordName {
                name: draft.name.clone(),
            });
        }
    }

    let deleted: HashSet<&str> = drafts
        .drafts()
        .iter()
        .filter(|d| d.is_deleted)
        .map(|d| d.original_name.as_str())
        .collect();
    for draft in drafts.live() {
        if draft.is_new && deleted.contains(draft.name.as_str()) {
            return Err(PlanError::ConflictingRecordName {
                name: draft.name.clone(),
            });
        }
    }
    Ok(())
}

fn create_step(draft: &RecordDraft) -> SyncStep {
    SyncStep {
        operation: SyncOperation::CreateRecord {
            name: draft.name.clone(),
            value: draft.typed_value(),
        },
        client_id: Some(draft.client_id),
        effect: StepEffect::RecordCreated,
    }
}

/// Plan for a cluster that exists only locally: create it, then every record in list order.
pub fn plan_creation(
    cluster: &ClusterIdentity,
    drafts: &DraftService,
) -> Result<SyncPlan, PlanError> {
    type_registry::validate_name(&cluster.name).map_err(PlanError::InvalidClusterName)?;
    invalid_records(drafts, |_| true)?;
    check_name_conflicts(drafts)?;

    let mut steps = vec![SyncStep {
        operation: SyncOperation::CreateCluster {
            name: cluster.name.clone(),
        },
        client_id: None,
        effect: StepEffect::ClusterCreated,
    }];
    steps.extend(drafts.live().map(create_step));

    Ok(SyncPlan {
        mode: SyncMode::Create,
        cluster: cluster.name.clone(),
        steps,
    })
}

/// Plan for an existing cluster.
///
/// `new_name` stages a cluster rename; `siblings` is the latest cluster listing
/// of the collection, used to reject duplicate names (case-insensitive).
pub fn plan_update(
    cluster: &ClusterIdentity,
    new_name: Option<&str>,
    siblings: &[ClusterSummary],
    drafts: &DraftService,
) -> Result<SyncPlan, PlanError> {
    let mut steps = Vec::new();

    if let Some(new_name) = new_name.filter(|n| *n != cluster.name) {
        type_registry::validate_name(new_name).map_err(PlanError::InvalidClusterName)?;
        let duplicate = siblings.iter().any(|s| {
            !s.name.eq_ignore_ascii_case(&cluster.name) && s.name.eq_ignore_ascii_case(new_name)
        });
        if duplicate {
            return Err(PlanError::InvalidClusterName(ValidationError::DuplicateName {
                name: new_name.to_string(),
            }));
        }
        steps.push(SyncStep {
            operation: SyncOperation::RenameCluster {
                from: cluster.name.clone(),
                to: new_name.to_string(),
            },
            client_id: None,
            effect: StepEffect::ClusterRenamed,
        });
    }

    invalid_records(drafts, |d| d.is_new || d.is_modified())?;
    check_name_conflicts(drafts)?;

    for draft in drafts.drafts().iter().filter(|d| d.is_deleted) {
        steps.push(SyncStep {
            operation: SyncOperation::DeleteRecord {
                name: draft.original_name.clone(),
            },
            client_id: Some(draft.client_id),
            effect: StepEffect::RecordDeleted,
        });
    }

    for draft in drafts.live() {
        if draft.is_new {
            steps.push(create_step(draft));
            continue;
        }
        if !draft.is_modified() {
            continue;
        }

        let fields = &draft.modified_fields;
        if fields.contains(&DraftField::Name) {
            steps.push(SyncStep {
                operation: SyncOperation::RenameRecord {
                    from: draft.original_name.clone(),
                    to: draft.name.clone(),
                },
                client_id: Some(draft.client_id),
                effect: StepEffect::FieldSynced(DraftField::Name),
            });
        }
        if fields.contains(&DraftField::Type) {
            steps.push(SyncStep {
                operation: SyncOperation::RetypeRecord {
                    name: draft.name.clone(),
                    data_type: draft.data_type,
                },
                client_id: Some(draft.client_id),
                effect: StepEffect::FieldSynced(DraftField::Type),
            });
        }
        if fields.contains(&DraftField::Value) {
            steps.push(SyncStep {
                operation: SyncOperation::RevalueRecord {
                    name: draft.name.clone(),
                    value: draft.typed_value(),
                },
                client_id: Some(draft.client_id),
                effect: StepEffect::FieldSynced(DraftField::Value),
            });
        }
    }

    Ok(SyncPlan {
        mode: SyncMode::Update,
        cluster: cluster.name.clone(),
        steps,
    })
}

/// Build the plan matching the cluster's state.
pub fn plan(
    cluster: &ClusterIdentity,
    new_name: Option<&str>,
    siblings: &[ClusterSummary],
    drafts: &DraftService,
) -> Result<SyncPlan, PlanError> {
    if cluster.is_unsaved() {
        plan_creation(cluster, drafts)
    } else {
        plan_update(cluster, new_name, siblings, drafts)
    }
}
