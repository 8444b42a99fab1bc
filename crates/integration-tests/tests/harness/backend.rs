//! Mock backend for integration tests
//!
//! One axum server standing in for every external system the worker talks
//! to: the status endpoint, an OpenAI-compatible image API and a path-style
//! S3 bucket named `assets`.

use std::collections::HashMap;
use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::{Json, Router, routing};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use image::{DynamicImage, ImageFormat, RgbImage};
use tokio_util::sync::CancellationToken;

/// An object received by the mock bucket
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
    pub size: usize,
}

pub struct MockBackend {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<BackendState>,
}

struct BackendState {
    /// Status updates in arrival order
    updates: Mutex<Vec<serde_json::Value>>,
    /// Status code answered by the status endpoint
    update_status: AtomicU16,
    generation_count: AtomicU32,
    /// Answer every generation with 500
    fail_generation: AtomicBool,
    /// Answer every upload with 403
    refuse_uploads: AtomicBool,
    /// Answer generations with bytes that are not an image
    serve_unreadable: AtomicBool,
    objects: Mutex<HashMap<String, StoredObject>>,
    generated_png: String,
}

impl MockBackend {
    /// Start the mock server, returning immediately
    pub async fn start() -> anyhow::Result<Self> {
        let state = Arc::new(BackendState {
            updates: Mutex::new(Vec::new()),
            update_status: AtomicU16::new(200),
            generation_count: AtomicU32::new(0),
            fail_generation: AtomicBool::new(false),
            refuse_uploads: AtomicBool::new(false),
            serve_unreadable: AtomicBool::new(false),
            objects: Mutex::new(HashMap::new()),
            generated_png: STANDARD.encode(oversized_png()?),
        });

        let app = Router::new()
            .route("/api/internal/update_status", routing::post(handle_update_status))
            .route("/v1/images/generations", routing::post(handle_generation))
            .route("/v1/models", routing::get(|| async { Json(serde_json::json!({ "data": [] })) }))
            .route("/assets", routing::head(|| async { StatusCode::OK }))
            .route("/assets/", routing::head(|| async { StatusCode::OK }))
            .route("/assets/{*key}", routing::put(handle_put_object))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Status updates received so far
    pub fn updates(&self) -> Vec<serde_json::Value> {
        self.state.updates.lock().unwrap().clone()
    }

    pub fn generation_count(&self) -> u32 {
        self.state.generation_count.load(Ordering::Relaxed)
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.state.objects.lock().unwrap().get(key).cloned()
    }

    pub fn object_count(&self) -> usize {
        self.state.objects.lock().unwrap().len()
    }

    pub fn fail_generation(&self) {
        self.state.fail_generation.store(true, Ordering::Relaxed);
    }

    pub fn refuse_uploads(&self) {
        self.state.refuse_uploads.store(true, Ordering::Relaxed);
    }

    /// Answer generations with a base64 HTML page instead of an image
    pub fn serve_unreadable_images(&self) {
        self.state.serve_unreadable.store(true, Ordering::Relaxed);
    }

    /// Make the status endpoint answer with `status`
    pub fn answer_updates_with(&self, status: u16) {
        self.state.update_status.store(status, Ordering::Relaxed);
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// A PNG larger than the default storage bounds
fn oversized_png() -> anyhow::Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::from_pixel(2048, 1024, image::Rgb([30, 120, 60])))
        .write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

async fn handle_update_status(
    State(state): State<Arc<BackendState>>,
    Json(update): Json<serde_json::Value>,
) -> StatusCode {
    state.updates.lock().unwrap().push(update);
    StatusCode::from_u16(state.update_status.load(Ordering::Relaxed)).unwrap_or(StatusCode::OK)
}

async fn handle_generation(State(state): State<Arc<BackendState>>) -> impl IntoResponse {
    state.generation_count.fetch_add(1, Ordering::Relaxed);

    if state.fail_generation.load(Ordering::Relaxed) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": { "message": "model overloaded" } })),
        );
    }

    let b64_json = if state.serve_unreadable.load(Ordering::Relaxed) {
        STANDARD.encode(b"<html>not an image</html>")
    } else {
        state.generated_png.clone()
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "created": 1_700_000_000,
            "data": [{ "b64_json": b64_json }]
        })),
    )
}

async fn handle_put_object(
    State(state): State<Arc<BackendState>>,
    Path(key): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if state.refuse_uploads.load(Ordering::Relaxed) {
        return StatusCode::FORBIDDEN;
    }

    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned)
    };

    let object = StoredObject {
        content_type: header_value(header::CONTENT_TYPE),
        cache_control: header_value(header::CACHE_CONTROL),
        size: body.len(),
    };

    state.objects.lock().unwrap().insert(key, object);

    StatusCode::OK
}
