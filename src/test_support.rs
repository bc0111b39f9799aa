//! In-process stand-ins for the Drive and OAuth endpoints.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Serves `router` on an ephemeral port and returns its base URL.
pub async fn spawn_server(router: Router) -> String {
    spawn_with(|_| router).await
}

/// Like [`spawn_server`], but the router can embed its own base URL.
pub async fn spawn_with<F>(build: F) -> String
where
    F: FnOnce(&str) -> Router,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let router = build(&base);
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    base
}

/// Token endpoint that issues fixed tokens.
#[derive(Clone, Default)]
pub struct MockOAuth {
    refreshes: Arc<AtomicUsize>,
    reject_refresh: bool,
}

impl MockOAuth {
    pub fn rejecting_refresh() -> Self {
        Self {
            reject_refresh: true,
            ..Self::default()
        }
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/token", post(token_handler))
            .with_state(self.clone())
    }
}

async fn token_handler(
    State(mock): State<MockOAuth>,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    match form.get("grant_type").map(String::as_str) {
        Some("authorization_code") if form.get("code").map(String::as_str) == Some("consent-code") => (
            StatusCode::OK,
            Json(json!({
                "access_token": "consent-access",
                "refresh_token": "consent-refresh",
                "expires_in": 3599,
                "token_type": "Bearer"
            })),
        ),
        Some("refresh_token") if !mock.reject_refresh => {
            mock.refreshes.fetch_add(1, Ordering::SeqCst);
            (
                StatusCode::OK,
                Json(json!({
                    "access_token": "refreshed-access",
                    "expires_in": 3599,
                    "token_type": "Bearer"
                })),
            )
        }
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_grant",
                "error_description": "Token has been expired or revoked."
            })),
        ),
    }
}

/// Drive v3 stand-in serving paginated listings and CSV exports.
#[derive(Clone)]
pub struct MockDrive {
    inner: Arc<MockDriveInner>,
}

struct MockDriveInner {
    pages: Vec<Vec<(String, String)>>,
    fail_page: Option<usize>,
    export_status: StatusCode,
    export_body: Vec<u8>,
    list_calls: AtomicUsize,
    export_requests: Mutex<Vec<ExportRequest>>,
}

/// What the export endpoint saw.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub file_id: String,
    pub authorization: Option<String>,
    pub gid: Option<String>,
}

#[derive(Clone)]
struct DriveState {
    mock: MockDrive,
    base: String,
}

impl MockDrive {
    /// `pages` holds `(id, name)` pairs per listing page.
    pub fn new(pages: Vec<Vec<(&str, &str)>>) -> Self {
        Self {
            inner: Arc::new(MockDriveInner {
                pages: pages
                    .into_iter()
                    .map(|page| {
                        page.into_iter()
                            .map(|(id, name)| (id.to_string(), name.to_string()))
                            .collect()
                    })
                    .collect(),
                fail_page: None,
                export_status: StatusCode::OK,
                export_body: b"key,en\nhello,Hello\n".to_vec(),
                list_calls: AtomicUsize::new(0),
                export_requests: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn failing_page(mut self, index: usize) -> Self {
        Arc::get_mut(&mut self.inner).unwrap().fail_page = Some(index);
        self
    }

    pub fn export_status(mut self, status: u16) -> Self {
        Arc::get_mut(&mut self.inner).unwrap().export_status = StatusCode::from_u16(status).unwrap();
        self
    }

    pub fn export_body(mut self, body: &[u8]) -> Self {
        Arc::get_mut(&mut self.inner).unwrap().export_body = body.to_vec();
        self
    }

    pub fn list_calls(&self) -> usize {
        self.inner.list_calls.load(Ordering::SeqCst)
    }

    pub fn export_requests(&self) -> Vec<ExportRequest> {
        self.inner.export_requests.lock().unwrap().clone()
    }

    pub fn router(&self, base: &str) -> Router {
        Router::new()
            .route("/files", get(list_handler))
            .route("/export/{id}", get(export_handler))
            .with_state(DriveState {
                mock: self.clone(),
                base: base.to_string(),
            })
    }
}

/// Continuation token handed out after page `index`.
fn token_for(index: usize) -> String {
    char::from(b'A' + u8::try_from(index).unwrap()).to_string()
}

async fn list_handler(
    State(state): State<DriveState>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let inner = &state.mock.inner;
    inner.list_calls.fetch_add(1, Ordering::SeqCst);

    let index = match query.get("pageToken") {
        None => 0,
        Some(token) => match (0..inner.pages.len()).find(|i| token_for(*i) == *token) {
            Some(i) => i + 1,
            None => return (StatusCode::BAD_REQUEST, Json(json!({"error": "bad token"}))),
        },
    };

    if inner.fail_page == Some(index) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": {"code": 500, "message": "backend error"}})),
        );
    }

    let files: Vec<Value> = inner.pages[index]
        .iter()
        .map(|(id, name)| {
            json!({
                "id": id,
                "name": name,
                "mimeType": "application/vnd.google-apps.spreadsheet",
                "exportLinks": {
                    "text/csv": format!("{}/export/{id}?exportFormat=csv", state.base),
                    "application/pdf": format!("{}/export/{id}?exportFormat=pdf", state.base)
                }
            })
        })
        .collect();

    let mut body = json!({ "files": files });
    if index + 1 < inner.pages.len() {
        body["nextPageToken"] = json!(token_for(index));
    }
    (StatusCode::OK, Json(body))
}

async fn export_handler(
    State(state): State<DriveState>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> (StatusCode, Vec<u8>) {
    let inner = &state.mock.inner;
    inner.export_requests.lock().unwrap().push(ExportRequest {
        file_id: id,
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        gid: query.get("gid").cloned(),
    });

    if inner.export_status == StatusCode::OK {
        (StatusCode::OK, inner.export_body.clone())
    } else {
        (inner.export_status, b"denied".to_vec())
    }
}
