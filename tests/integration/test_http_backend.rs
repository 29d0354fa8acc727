//! HttpBackend tests against a local axum server standing in for OstrichDB.
//!
//! These tests verify the wire contract:
//! - bearer token and JSON headers on every request
//! - percent-encoded path segments and query-string parameters
//! - error message extraction from non-2xx bodies
//! - the two-step manual query protocol

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use ostrichdb_dashboard::backend::{
    BackendError, HttpBackend, OstrichBackend, StaticTokenProvider,
};
use ostrichdb_dashboard::config::ClientConfig;
use ostrichdb_dashboard::models::{ClusterPath, CollectionPath, DataType, TypedValue};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use url::Url;

#[derive(Clone, Debug)]
struct Seen {
    method: String,
    path: String,
    raw_query: String,
    query: HashMap<String, String>,
    authorization: Option<String>,
    accept: Option<String>,
    body: String,
}

type Responder = Arc<dyn Fn(&Seen) -> (StatusCode, String) + Send + Sync>;

#[derive(Clone)]
struct FakeServer {
    seen: Arc<Mutex<Vec<Seen>>>,
    respond: Responder,
}

async fn handle(
    State(server): State<FakeServer>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let raw_query = uri.query().unwrap_or_default().to_string();
    // Percent-decoding only: OstrichDB reads '+' as a literal plus.
    let query = raw_query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .filter_map(|(k, v)| {
            Some((
                urlencoding::decode(k).ok()?.into_owned(),
                urlencoding::decode(v).ok()?.into_owned(),
            ))
        })
        .collect();
    let seen = Seen {
        method: method.to_string(),
        path: uri.path().to_string(),
        raw_query,
        query,
        authorization: header("authorization"),
        accept: header("accept"),
        body,
    };
    let response = (server.respond)(&seen);
    server.seen.lock().unwrap().push(seen);
    response
}

/// Start a server answering every request through `respond`.
async fn start<F>(respond: F) -> (String, Arc<Mutex<Vec<Seen>>>)
where
    F: Fn(&Seen) -> (StatusCode, String) + Send + Sync + 'static,
{
    let seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new().fallback(handle).with_state(FakeServer {
        seen: seen.clone(),
        respond: Arc::new(respond),
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), seen)
}

fn backend(base: &str, token: Option<&str>) -> HttpBackend {
    let config = ClientConfig::new(Url::parse(base).unwrap());
    let tokens = match token {
        Some(t) => StaticTokenProvider::new(t),
        None => StaticTokenProvider::anonymous(),
    };
    HttpBackend::new(config, Arc::new(tokens)).unwrap()
}

fn cluster() -> ClusterPath {
    ClusterPath::new("proj", "coll", "inv")
}

fn ok(body: &str) -> (StatusCode, String) {
    (StatusCode::OK, body.to_string())
}

#[tokio::test]
async fn test_list_records_sends_auth_and_parses_lenient_values() {
    let (base, seen) = start(|_| {
        ok(r#"{"records":[{"id":7,"name":"count","type":"INTEGER","value":5},{"id":"8","name":"tags","type":"[]STRING","value":"[a,b]"}]}"#)
    })
    .await;

    let records = backend(&base, Some("secret"))
        .list_records(&cluster())
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id.as_deref(), Some("7"));
    assert_eq!(records[0].value, "5");
    assert_eq!(records[0].resolved_type(), DataType::Integer);
    assert_eq!(records[1].resolved_type(), DataType::StringArray);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, "GET");
    assert_eq!(
        seen[0].path,
        "/api/v1/projects/proj/collections/coll/clusters/inv/records"
    );
    assert_eq!(seen[0].authorization.as_deref(), Some("Bearer secret"));
    assert_eq!(seen[0].accept.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn test_path_segments_are_percent_encoded() {
    let (base, seen) = start(|_| ok(r#"{"records":[]}"#)).await;

    backend(&base, Some("t"))
        .list_records(&ClusterPath::new("my proj", "a/b", "c"))
        .await
        .unwrap();

    assert_eq!(
        seen.lock().unwrap()[0].path,
        "/api/v1/projects/my%20proj/collections/a%2Fb/clusters/c/records"
    );
}

#[tokio::test]
async fn test_create_record_sends_transport_value() {
    let (base, seen) = start(|_| ok("")).await;

    backend(&base, Some("t"))
        .create_record(
            &cluster(),
            "nums",
            &TypedValue::new(DataType::IntegerArray, "[1, 2, 3]"),
        )
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].method, "POST");
    assert_eq!(
        seen[0].path,
        "/api/v1/projects/proj/collections/coll/clusters/inv/records/nums"
    );
    assert_eq!(seen[0].query["type"], "[]INTEGER");
    assert_eq!(seen[0].query["value"], "[1,2,3]");
}

#[tokio::test]
async fn test_query_values_are_percent_encoded() {
    let (base, seen) = start(|_| ok("")).await;
    let client = backend(&base, Some("t"));

    client
        .create_record(
            &cluster(),
            "greeting",
            &TypedValue::new(DataType::String, "hello world"),
        )
        .await
        .unwrap();
    client
        .revalue_record(&cluster(), "greeting", &TypedValue::new(DataType::String, "a+b"))
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].raw_query, "type=STRING&value=hello%20world");
    assert_eq!(seen[0].query["value"], "hello world");
    assert_eq!(seen[1].raw_query, "value=a%2Bb");
    assert_eq!(seen[1].query["value"], "a+b");
}

#[tokio::test]
async fn test_record_updates_use_put() {
    let (base, seen) = start(|_| ok("")).await;
    let client = backend(&base, Some("t"));

    client.rename_record(&cluster(), "a", "b").await.unwrap();
    client
        .retype_record(&cluster(), "b", DataType::Float)
        .await
        .unwrap();
    client
        .revalue_record(&cluster(), "b", &TypedValue::new(DataType::Float, "2.5"))
        .await
        .unwrap();
    client.delete_record(&cluster(), "b").await.unwrap();

    let seen = seen.lock().unwrap();
    let methods: Vec<&str> = seen.iter().map(|s| s.method.as_str()).collect();
    assert_eq!(methods, vec!["PUT", "PUT", "PUT", "DELETE"]);

    assert!(seen[0].path.ends_with("/records/a"));
    let rename: serde_json::Value = serde_json::from_str(&seen[0].body).unwrap();
    assert_eq!(rename["rename"], "b");

    assert!(seen[1].path.ends_with("/records/b"));
    assert_eq!(seen[1].query["type"], "FLOAT");
    assert_eq!(seen[2].query["value"], "2.5");
    assert!(seen[3].path.ends_with("/records/b"));
}

#[tokio::test]
async fn test_rejection_message_prefers_json_message() {
    let (base, _) = start(|_| {
        (
            StatusCode::CONFLICT,
            r#"{"message":"Record already exists"}"#.to_string(),
        )
    })
    .await;

    let err = backend(&base, Some("t"))
        .create_cluster(&cluster())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        BackendError::Rejected {
            status: 409,
            message: "Record already exists".to_string()
        }
    );
}

#[tokio::test]
async fn test_rejection_message_falls_back_to_body_then_reason() {
    let (base, _) = start(|seen| {
        if seen.method == "DELETE" {
            (StatusCode::NOT_FOUND, String::new())
        } else {
            (StatusCode::INTERNAL_SERVER_ERROR, "cluster store offline".to_string())
        }
    })
    .await;
    let client = backend(&base, Some("t"));

    let err = client.create_cluster(&cluster()).await.unwrap_err();
    assert_eq!(
        err,
        BackendError::Rejected {
            status: 500,
            message: "cluster store offline".to_string()
        }
    );

    let err = client.delete_cluster(&cluster()).await.unwrap_err();
    assert_eq!(
        err,
        BackendError::Rejected {
            status: 404,
            message: "Not Found".to_string()
        }
    );
}

#[tokio::test]
async fn test_missing_token_sends_nothing() {
    let (base, seen) = start(|_| ok("")).await;

    let err = backend(&base, None).list_projects().await.unwrap_err();

    assert_eq!(err, BackendError::MissingToken);
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_listings_accept_wrapped_and_bare_arrays() {
    let (base, _) = start(|seen| {
        if seen.path.ends_with("/collections") {
            ok(r#"{"collections":["plain",{"name":"rich","lastModified":"2024-01-01"}]}"#)
        } else if seen.path.ends_with("/clusters") {
            ok(r#"{"clusters":[{"name":"inv","id":12,"record_count":3}]}"#)
        } else {
            ok(r#"["alpha","beta"]"#)
        }
    })
    .await;
    let client = backend(&base, Some("t"));

    assert_eq!(client.list_projects().await.unwrap(), vec!["alpha", "beta"]);

    let collections = client.list_collections("proj").await.unwrap();
    assert_eq!(collections[0].name, "plain");
    assert_eq!(collections[1].name, "rich");
    assert_eq!(collections[1].last_modified.as_deref(), Some("2024-01-01"));

    let clusters = client
        .list_clusters(&CollectionPath::new("proj", "coll"))
        .await
        .unwrap();
    assert_eq!(clusters[0].id, "12");
    assert_eq!(clusters[0].record_count, 3);
}

#[tokio::test]
async fn test_manual_query_resolves_then_dispatches() {
    let (base, seen) = start(|seen| {
        if seen.path.ends_with("/manual_query") {
            ok(r#"{"method":"GET","path":"api/v1/projects/proj/collections"}"#)
        } else {
            ok(r#"{"collections":["a"]}"#)
        }
    })
    .await;
    let client = backend(&base, Some("t"));

    let route = client
        .resolve_manual_query("proj", "FETCH collections")
        .await
        .unwrap();
    assert_eq!(route.method, "GET");

    let response = client.dispatch_route(&route).await.unwrap();
    assert!(response.is_success());
    assert_eq!(response.body["collections"][0], "a");

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].method, "POST");
    assert_eq!(seen[0].path, "/api/v1/projects/proj/manual_query");
    assert_eq!(seen[0].query["value"], "FETCH collections");
    assert_eq!(seen[1].method, "GET");
    assert_eq!(seen[1].path, "/api/v1/projects/proj/collections");
    assert_eq!(seen[1].authorization.as_deref(), Some("Bearer t"));
}

#[tokio::test]
async fn test_dispatch_returns_non_success_responses() {
    let (base, _) = start(|_| (StatusCode::BAD_REQUEST, "bad query".to_string())).await;

    let route = ostrichdb_dashboard::models::ManualQueryRoute {
        method: "get".to_string(),
        path: "/api/v1/projects/proj/nothing".to_string(),
    };
    let response = backend(&base, Some("t")).dispatch_route(&route).await.unwrap();

    assert_eq!(response.status, 400);
    assert!(!response.is_success());
    assert_eq!(response.body, serde_json::Value::String("bad query".to_string()));
}
