//! reqwest implementation of the OstrichDB backend surface.

use super::{BackendError, OstrichBackend, RawResponse, TokenProvider};
use crate::config::{ClientConfig, ConfigError};
use crate::models::{
    ClusterPath, ClusterSummary, CollectionEntry, CollectionPath, CollectionSummary, DataType,
    ManualQueryRoute, RemoteRecord, TypedValue,
};
use reqwest::{Client, Method};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, warn};

/// Backend client speaking the `/api/v1` REST surface.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    config: ClientConfig,
    tokens: Arc<dyn TokenProvider>,
}

/// Body of a successful response, parsed as JSON when possible.
struct ResponseBody {
    text: String,
    json: Option<Value>,
}

impl HttpBackend {
    pub fn new(config: ClientConfig, tokens: Arc<dyn TokenProvider>) -> Result<Self, ConfigError> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        Ok(Self {
            client,
            config,
            tokens,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, segments: &[&str]) -> String {
        let mut url = format!("{}/api/v1", self.config.api_root());
        for segment in segments {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url
    }

    fn project_segments(project: &str) -> Vec<&str> {
        vec!["projects", project]
    }

    fn collection_segments(path: &CollectionPath) -> Vec<&str> {
        vec![
            "projects",
            path.project.as_str(),
            "collections",
            path.collection.as_str(),
        ]
    }

    fn cluster_segments(path: &ClusterPath) -> Vec<&str> {
        vec![
            "projects",
            path.project.as_str(),
            "collections",
            path.collection.as_str(),
            "clusters",
            path.cluster.as_str(),
        ]
    }

    fn record_segments<'a>(path: &'a ClusterPath, name: &'a str) -> Vec<&'a str> {
        let mut segments = Self::cluster_segments(path);
        segments.push("records");
        segments.push(name);
        segments
    }

    /// Issue one request; a fresh token is fetched every time.
    async fn request(
        &self,
        method: Method,
        url: String,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<reqwest::Response, BackendError> {
        let token = self
            .tokens
            .get_token()
            .await
            .ok_or(BackendError::MissingToken)?;

        // Percent-encoded by hand: form encoding would send spaces as '+'.
        let url = if query.is_empty() {
            url
        } else {
            let pairs: Vec<String> = query
                .iter()
                .map(|(key, value)| {
                    format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
                })
                .collect();
            format!("{}?{}", url, pairs.join("&"))
        };

        debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method, &url)
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json");
        if let Some(body) = body {
            request = request.json(&body);
        }

        request
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))
    }

    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<ResponseBody, BackendError> {
        let url = self.url(segments);
        let response = self.request(method, url, query, body).await?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        let json = serde_json::from_str::<Value>(&text).ok();

        if !status.is_success() {
            let message = json
                .as_ref()
                .and_then(|v| v.get("message").or_else(|| v.get("error")))
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .or_else(|| (!text.trim().is_empty()).then(|| text.clone()))
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Unknown error")
                        .to_string()
                });
            return Err(BackendError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(ResponseBody { text, json })
    }

    async fn send_unit(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<(), BackendError> {
        self.send(method, segments, query, body).await.map(|_| ())
    }

    /// Pull the array stored under `key` out of a listing body.
    fn listing(body: &ResponseBody, key: &str) -> Vec<Value> {
        match &body.json {
            Some(Value::Object(map)) => map
                .get(key)
                .and_then(|v| v.as_array())
                .cloned()
                .unwrap_or_default(),
            Some(Value::Array(items)) => items.clone(),
            _ => {
                warn!(
                    "Expected a '{}' listing, got non-JSON body of {} bytes",
                    key,
                    body.text.len()
                );
                Vec::new()
            }
        }
    }
}

#[async_trait::async_trait]
impl OstrichBackend for HttpBackend {
    async fn list_projects(&self) -> Result<Vec<String>, BackendError> {
        let body = self.send(Method::GET, &["projects"], &[], None).await?;
        Ok(Self::listing(&body, "projects")
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect())
    }

    async fn create_project(&self, project: &str) -> Result<(), BackendError> {
        self.send_unit(Method::POST, &Self::project_segments(project), &[], None)
            .await
    }

    async fn rename_project(&self, project: &str, new_name: &str) -> Result<(), BackendError> {
        self.send_unit(
            Method::PUT,
            &Self::project_segments(project),
            &[("rename", new_name.to_string())],
            None,
        )
        .await
    }

    async fn delete_project(&self, project: &str) -> Result<(), BackendError> {
        self.send_unit(Method::DELETE, &Self::project_segments(project), &[], None)
            .await
    }

    async fn list_collections(
        &self,
        project: &str,
    ) -> Result<Vec<CollectionSummary>, BackendError> {
        let mut segments = Self::project_segments(project);
        segments.push("collections");
        let body = self.send(Method::GET, &segments, &[], None).await?;
        Self::listing(&body, "collections")
            .into_iter()
            .map(|item| {
                serde_json::from_value::<CollectionEntry>(item)
                    .map(CollectionSummary::from)
                    .map_err(|e| BackendError::Decode(format!("collection entry: {}", e)))
            })
            .collect()
    }

    async fn create_collection(&self, path: &CollectionPath) -> Result<(), BackendError> {
        self.send_unit(Method::POST, &Self::collection_segments(path), &[], None)
            .await
    }

    async fn rename_collection(
        &self,
        path: &CollectionPath,
        new_name: &str,
    ) -> Result<(), BackendError> {
        self.send_unit(
            Method::PUT,
            &Self::collection_segments(path),
            &[("rename", new_name.to_string())],
            None,
        )
        .await
    }

    async fn delete_collection(&self, path: &CollectionPath) -> Result<(), BackendError> {
        self.send_unit(Method::DELETE, &Self::collection_segments(path), &[], None)
            .await
    }

    async fn list_clusters(
        &self,
        path: &CollectionPath,
    ) -> Result<Vec<ClusterSummary>, BackendError> {
        let mut segments = Self::collection_segments(path);
        segments.push("clusters");
        let body = self.send(Method::GET, &segments, &[], None).await?;
        Self::listing(&body, "clusters")
            .into_iter()
            .map(|item| {
                serde_json::from_value::<ClusterSummary>(item)
                    .map_err(|e| BackendError::Decode(format!("cluster entry: {}", e)))
            })
            .collect()
    }

    async fn create_cluster(&self, path: &ClusterPath) -> Result<(), BackendError> {
        self.send_unit(Method::POST, &Self::cluster_segments(path), &[], None)
            .await
    }

    async fn rename_cluster(&self, path: &ClusterPath, new_name: &str) -> Result<(), BackendError> {
        self.send_unit(
            Method::PUT,
            &Self::cluster_segments(path),
            &[("rename", new_name.to_string())],
            None,
        )
        .await
    }

    async fn delete_cluster(&self, path: &ClusterPath) -> Result<(), BackendError> {
        self.send_unit(Method::DELETE, &Self::cluster_segments(path), &[], None)
            .await
    }

    async fn list_records(&self, path: &ClusterPath) -> Result<Vec<RemoteRecord>, BackendError> {
        let mut segments = Self::cluster_segments(path);
        segments.push("records");
        let body = self.send(Method::GET, &segments, &[], None).await?;
        Self::listing(&body, "records")
            .into_iter()
            .map(|item| {
                serde_json::from_value::<RemoteRecord>(item)
                    .map_err(|e| BackendError::Decode(format!("record entry: {}", e)))
            })
            .collect()
    }

    async fn create_record(
        &self,
        path: &ClusterPath,
        name: &str,
        value: &TypedValue,
    ) -> Result<(), BackendError> {
        self.send_unit(
            Method::POST,
            &Self::record_segments(path, name),
            &[
                ("type", value.data_type.as_str().to_string()),
                ("value", value.to_transport()),
            ],
            None,
        )
        .await
    }

    async fn rename_record(
        &self,
        path: &ClusterPath,
        name: &str,
        new_name: &str,
    ) -> Result<(), BackendError> {
        self.send_unit(
            Method::PUT,
            &Self::record_segments(path, name),
            &[],
            Some(json!({ "rename": new_name })),
        )
        .await
    }

    async fn retype_record(
        &self,
        path: &ClusterPath,
        name: &str,
        data_type: DataType,
    ) -> Result<(), BackendError> {
        self.send_unit(
            Method::PUT,
            &Self::record_segments(path, name),
            &[("type", data_type.as_str().to_string())],
            None,
        )
        .await
    }

    async fn revalue_record(
        &self,
        path: &ClusterPath,
        name: &str,
        value: &TypedValue,
    ) -> Result<(), BackendError> {
        self.send_unit(
            Method::PUT,
            &Self::record_segments(path, name),
            &[("value", value.to_transport())],
            None,
        )
        .await
    }

    async fn delete_record(&self, path: &ClusterPath, name: &str) -> Result<(), BackendError> {
        self.send_unit(Method::DELETE, &Self::record_segments(path, name), &[], None)
            .await
    }

    async fn resolve_manual_query(
        &self,
        project: &str,
        query: &str,
    ) -> Result<ManualQueryRoute, BackendError> {
        let mut segments = Self::project_segments(project);
        segments.push("manual_query");
        let body = self
            .send(Method::POST, &segments, &[("value", query.to_string())], None)
            .await?;
        let json = body
            .json
            .ok_or_else(|| BackendError::Decode(format!("query route: {}", body.text)))?;
        serde_json::from_value(json)
            .map_err(|e| BackendError::Decode(format!("query route: {}", e)))
    }

    async fn dispatch_route(&self, route: &ManualQueryRoute) -> Result<RawResponse, BackendError> {
        let method = Method::from_bytes(route.method.trim().to_uppercase().as_bytes())
            .map_err(|_| {
                BackendError::Decode(format!("unsupported method '{}'", route.method))
            })?;
        let url = format!(
            "{}/{}",
            self.config.api_root(),
            route.path.trim_start_matches('/')
        );

        let response = self.request(method, url, &[], None).await?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        let body =
            serde_json::from_str::<Value>(&text).unwrap_or_else(|_| Value::String(text.clone()));

        Ok(RawResponse { status, body, text })
    }
}
