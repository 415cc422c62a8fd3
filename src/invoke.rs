//! HTTP invoke surface for a Function Compute custom runtime.
//!
//! The platform starts the `bootstrap` binary, waits for it to listen on
//! `FC_SERVER_PORT` and then forwards each event as a `POST /invoke` whose
//! body is the raw event. The request id arrives in `x-fc-request-id`. The
//! reply body is the function result, so it is always `200` with the
//! [`InvocationResponse`] JSON; failures are reported inside it.
//!
//! ```text
//! POST /initialize   optional initializer hook → 200
//! POST /invoke       event bytes → {"code": "Success" | "Error", …}
//! ```

use crate::config::ConversionConfig;
use crate::handler::handle_event;
use crate::pipeline::publish::ObjectStore;
use crate::response::InvocationResponse;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, info_span, Instrument};

/// Header carrying the platform's request id.
pub const REQUEST_ID_HEADER: &str = "x-fc-request-id";

/// Port used when `FC_SERVER_PORT` is not set.
pub const DEFAULT_PORT: u16 = 9000;

/// Shared, read-only state for every invocation.
#[derive(Clone)]
pub struct InvokeState {
    config: Arc<ConversionConfig>,
    store: Arc<dyn ObjectStore>,
}

impl InvokeState {
    pub fn new(config: ConversionConfig, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }
}

/// Routes of the custom runtime.
pub fn router(state: InvokeState) -> Router {
    Router::new()
        .route("/initialize", post(initialize_handler))
        .route("/invoke", post(invoke_handler))
        .with_state(state)
}

async fn initialize_handler(headers: HeaderMap) -> StatusCode {
    info!(request_id = request_id(&headers), "Initializer invoked");
    StatusCode::OK
}

async fn invoke_handler(
    State(state): State<InvokeState>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<InvocationResponse> {
    let span = info_span!("invocation", request_id = request_id(&headers));
    let event = event_from_body(&body);

    let response = handle_event(event, &state.config, state.store.as_ref())
        .instrument(span)
        .await;
    Json(response)
}

fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
}

/// Decode the raw event body.
///
/// Bytes that are not JSON are passed on as a string so request parsing
/// reports them as a malformed event.
pub fn event_from_body(body: &[u8]) -> Value {
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Pdf2ZipError;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use std::path::Path;
    use std::sync::Mutex;
    use std::time::Duration;
    use tower::ServiceExt;

    #[derive(Default)]
    struct CountingStore {
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl ObjectStore for CountingStore {
        async fn put_file(&self, _local: &Path, _key: &str) -> Result<(), Pdf2ZipError> {
            *self.calls.lock().unwrap() += 1;
            Ok(())
        }

        async fn presign_get(&self, key: &str, _expires_in: Duration) -> Result<String, Pdf2ZipError> {
            *self.calls.lock().unwrap() += 1;
            Ok(format!("https://store.example/{key}"))
        }
    }

    fn app(scratch: &Path, store: Arc<CountingStore>) -> Router {
        let config = ConversionConfig::builder()
            .scratch_root(scratch)
            .build()
            .unwrap();
        router(InvokeState::new(config, store))
    }

    async fn post_invoke(app: Router, body: &'static str) -> (StatusCode, Value) {
        let request = Request::post("/invoke")
            .header(REQUEST_ID_HEADER, "req-1")
            .body(Body::from(body))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn invoke_returns_error_payload_for_missing_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(CountingStore::default());

        let (status, body) =
            post_invoke(app(dir.path(), store.clone()), r#"{"queryParameters": {}}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!({"code": "Error", "message": "PDF URL is required"})
        );
        assert_eq!(*store.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn invoke_reports_non_json_event_as_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = post_invoke(
            app(dir.path(), Arc::new(CountingStore::default())),
            "pdf_url=https://example.com/a.pdf",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], "Error");
        assert!(
            body["message"].as_str().unwrap().contains("not JSON"),
            "{body}"
        );
    }

    #[tokio::test]
    async fn initialize_acknowledges() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path(), Arc::new(CountingStore::default()))
            .oneshot(Request::post("/initialize").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn invoke_only_accepts_post() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path(), Arc::new(CountingStore::default()))
            .oneshot(Request::get("/invoke").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn body_decoding_keeps_json_and_wraps_text() {
        assert_eq!(event_from_body(br#"{"a": 1}"#), serde_json::json!({"a": 1}));
        assert_eq!(event_from_body(b"plain"), Value::String("plain".into()));
    }
}
