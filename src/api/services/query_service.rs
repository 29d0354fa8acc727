//! Raw query console.
//!
//! A query is resolved by the backend into a method and path, which are then
//! requested as-is. Every attempt ends up in the history, failed ones included.

use crate::backend::OstrichBackend;
use crate::models::QueryOutcome;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

pub struct QueryService {
    backend: Arc<dyn OstrichBackend>,
    project: String,
    history: Vec<QueryOutcome>,
}

impl QueryService {
    pub fn new(backend: Arc<dyn OstrichBackend>, project: impl Into<String>) -> Self {
        Self {
            backend,
            project: project.into(),
            history: Vec::new(),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// Run one query and append its outcome to the history.
    ///
    /// Blank queries are ignored and return `None`.
    pub async fn execute(&mut self, query: &str) -> Option<&QueryOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        let outcome = match self.run(query).await {
            Ok(outcome) => outcome,
            Err(message) => QueryOutcome {
                query: query.to_string(),
                result: Value::Null,
                timestamp: Utc::now(),
                success: false,
                error: Some(message),
            },
        };

        info!(
            "Query on project '{}' finished (success: {})",
            self.project, outcome.success
        );
        self.history.push(outcome);
        self.history.last()
    }

    async fn run(&self, query: &str) -> Result<QueryOutcome, String> {
        let route = self
            .backend
            .resolve_manual_query(&self.project, query)
            .await
            .map_err(|e| e.to_string())?;
        debug!("Query resolved to {} {}", route.method, route.path);

        let response = self
            .backend
            .dispatch_route(&route)
            .await
            .map_err(|e| e.to_string())?;
        let success = response.is_success();

        Ok(QueryOutcome {
            query: query.to_string(),
            error: (!success).then(|| format!("HTTP {}: {}", response.status, response.text)),
            result: response.body,
            timestamp: Utc::now(),
            success,
        })
    }

    /// Past outcomes, oldest first.
    pub fn history(&self) -> &[QueryOutcome] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}
