//! Services module - record editing, sync and hierarchy logic.

pub mod cluster_editor;
pub mod draft_service;
pub mod hierarchy_service;
pub mod query_service;
pub mod raw_format;
pub mod sync_plan;
pub mod sync_service;
pub mod type_registry;

// Re-export for convenience
pub use cluster_editor::ClusterEditor;
pub use draft_service::{DraftError, DraftService, DraftStats, DraftView};
pub use hierarchy_service::{HierarchyError, HierarchyService};
pub use query_service::QueryService;
pub use sync_plan::{PlanError, StepEffect, SyncMode, SyncOperation, SyncPlan, SyncStep};
pub use sync_service::{SyncError, SyncReport, SyncService};
pub use type_registry::{TypeInfo, ValidationError};
