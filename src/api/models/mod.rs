// Models module - record drafts, typed values, cluster metadata and enums

pub mod cluster;
pub mod draft;
#[path = "enums.rs"]
pub mod enums;
pub mod query;
pub mod value;

pub use cluster::{
    ClusterId, ClusterIdentity, ClusterPath, ClusterSummary, CollectionEntry, CollectionPath,
    CollectionSummary,
};
pub use draft::{RecordDraft, RemoteRecord};
pub use enums::{DataType, DraftField, InputKind, SortDirection, SortField, TypeCategory};
pub use query::{ManualQueryRoute, QueryOutcome};
pub use value::TypedValue;
