use super::value::lenient_string;
use serde::{Deserialize, Serialize};
use std::fmt;

const UNSAVED: &str = "unsaved";
const UNKNOWN: &str = "unknown";

/// Backend id of a cluster, with the dashboard's two sentinel states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ClusterId {
    /// Exists only as a local draft.
    Unsaved,
    /// Persisted, but the backend id has not been read back yet.
    Unknown,
    Known(String),
}

impl ClusterId {
    pub fn is_unsaved(&self) -> bool {
        matches!(self, ClusterId::Unsaved)
    }
}

impl From<String> for ClusterId {
    fn from(value: String) -> Self {
        match value.as_str() {
            UNSAVED => ClusterId::Unsaved,
            UNKNOWN | "" => ClusterId::Unknown,
            _ => ClusterId::Known(value),
        }
    }
}

impl From<ClusterId> for String {
    fn from(value: ClusterId) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterId::Unsaved => f.write_str(UNSAVED),
            ClusterId::Unknown => f.write_str(UNKNOWN),
            ClusterId::Known(id) => f.write_str(id),
        }
    }
}

/// Metadata of the cluster being edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterIdentity {
    pub name: String,
    pub id: ClusterId,
    pub record_count: usize,
}

impl ClusterIdentity {
    pub fn unsaved(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: ClusterId::Unsaved,
            record_count: 0,
        }
    }

    pub fn is_unsaved(&self) -> bool {
        self.id.is_unsaved()
    }
}

/// Entry of the cluster listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default)]
    pub record_count: usize,
}

impl ClusterSummary {
    pub fn identity(&self) -> ClusterIdentity {
        ClusterIdentity {
            name: self.name.clone(),
            id: ClusterId::from(self.id.clone()),
            record_count: self.record_count,
        }
    }
}

/// Entry of the collection listing endpoint.
///
/// Older backends list bare names, newer ones list objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CollectionEntry {
    Name(String),
    Detailed(CollectionSummary),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "lastModified")]
    pub last_modified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "createdAt")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl From<CollectionEntry> for CollectionSummary {
    fn from(entry: CollectionEntry) -> Self {
        match entry {
            CollectionEntry::Name(name) => CollectionSummary {
                name,
                last_modified: None,
                created_at: None,
                size: None,
            },
            CollectionEntry::Detailed(summary) => summary,
        }
    }
}

/// Address of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionPath {
    pub project: String,
    pub collection: String,
}

impl CollectionPath {
    pub fn new(project: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            collection: collection.into(),
        }
    }

    pub fn cluster(&self, cluster: impl Into<String>) -> ClusterPath {
        ClusterPath {
            project: self.project.clone(),
            collection: self.collection.clone(),
            cluster: cluster.into(),
        }
    }
}

/// Address of a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClusterPath {
    pub project: String,
    pub collection: String,
    pub cluster: String,
}

impl ClusterPath {
    pub fn new(
        project: impl Into<String>,
        collection: impl Into<String>,
        cluster: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            collection: collection.into(),
            cluster: cluster.into(),
        }
    }

    pub fn collection_path(&self) -> CollectionPath {
        CollectionPath::new(self.project.clone(), self.collection.clone())
    }

    /// Same collection, different cluster name.
    pub fn renamed(&self, cluster: impl Into<String>) -> Self {
        self.collection_path().cluster(cluster)
    }
}
