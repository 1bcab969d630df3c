//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use tower::util::ServiceExt;

use meetsync::api::AppState;
use meetsync::api::app;
use meetsync::core::AppConfig;
use meetsync::core::db::memory_db;
use meetsync::meetings::{
    EventProvisioner, EventRequest, ProvisionError, ProvisionedEvent, ResponsePolicy,
};

/// What the stub calendar does when asked for an event.
#[derive(Clone)]
pub enum StubBehavior {
    Succeed,
    Hang,
    Fail(ProvisionError),
}

pub struct StubProvisioner {
    behavior: StubBehavior,
    pub calls: AtomicUsize,
}

impl StubProvisioner {
    pub fn new(behavior: StubBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventProvisioner for StubProvisioner {
    async fn create_event(&self, request: &EventRequest) -> Result<ProvisionedEvent, ProvisionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            StubBehavior::Succeed => Ok(ProvisionedEvent {
                event_id: format!("evt-{}", request.meeting_id),
                join_link: format!("https://meet.google.com/{}", request.meeting_id),
            }),
            StubBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Err(ProvisionError::Failed("stub hung".to_string()))
            }
            StubBehavior::Fail(err) => Err(err.clone()),
        }
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        storage_path: String::from("./"),
        db_path: String::from("./db"),
        google_client_id: String::from("test_client_id"),
        google_client_secret: String::from("test_client_secret"),
        google_redirect_uri: String::from("urn:ietf:wg:oauth:2.0:oob"),
        google_api_url: String::from("http://localhost:1"),
        google_oauth_url: String::from("http://localhost:1"),
        google_auth_url: String::from("http://localhost:1"),
        calendar_id: String::from("primary"),
        provision_timeout: Duration::from_millis(200),
        response_policy: ResponsePolicy::AppendOnly,
        slot_step_minutes: 5,
        suggestion_limit: 3,
        response_window_days: 3,
        expiry_interval: Duration::from_secs(60),
    }
}

/// Creates a test application backed by an in-memory database and a
/// stub calendar provisioner.
pub async fn test_app_with(provisioner: Arc<StubProvisioner>) -> Router {
    let db = memory_db().await.expect("Failed to open in-memory db");
    let app_state = AppState::with_provisioner(db, test_config(), provisioner);
    app(Arc::new(RwLock::new(app_state)))
}

pub async fn test_app() -> Router {
    test_app_with(StubProvisioner::new(StubBehavior::Succeed)).await
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not utf-8")
}

/// Send a request with an optional JSON body and parse the JSON reply.
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().uri(uri).method(method);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let text = body_to_string(response.into_body()).await;
    let json = serde_json::from_str(&text).unwrap_or(Value::String(text));
    (status, json)
}
