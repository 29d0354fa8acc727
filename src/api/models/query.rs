use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Route the backend resolves a manual query to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualQueryRoute {
    pub method: String,
    pub path: String,
}

/// One entry of the query console history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutcome {
    pub query: String,
    /// Parsed JSON body, or the raw text wrapped as a JSON string.
    pub result: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
