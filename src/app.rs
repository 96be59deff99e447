#![cfg(feature = "web")]

use axum::{
    Json, Router,
    body::Body,
    extract::{DefaultBodyLimit, FromRequestParts, Multipart, State},
    http::{StatusCode, header, request::Parts},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::render::render_table;
use crate::session::{ErrorCategory, JumpForm, Session, SessionError, StatusMessage};
use crate::sessions::{SESSION_COOKIE, SessionRegistry};

pub struct AppState {
    sessions: SessionRegistry,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        AppState {
            sessions: SessionRegistry::new(config.session_ttl()),
        }
    }
}

/// JSON envelope returned by every API call.
#[derive(Serialize)]
struct ApiResponse<T: Serialize> {
    status: &'static str,
    message: Option<StatusMessage>,
    data: Option<T>,
}

#[derive(Deserialize)]
struct SheetRequest {
    name: String,
}

#[derive(Deserialize)]
struct CellRequest {
    cell: String,
}

#[derive(Serialize)]
struct LoadResponse {
    sheets: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SheetResponse {
    sheet: String,
    html: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TestResponse {
    configured: usize,
}

/// Failures surfaced to the page.
pub enum ApiError {
    NoSession,
    Session(SessionError, Option<StatusMessage>),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, text, message) = match self {
            ApiError::NoSession => (
                StatusCode::UNAUTHORIZED,
                "会话已过期，请刷新页面".to_string(),
                None,
            ),
            ApiError::Session(e, message) => {
                let code = match e.category() {
                    ErrorCategory::MissingInput => StatusCode::BAD_REQUEST,
                    ErrorCategory::MalformedInput => StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorCategory::NotFound => StatusCode::NOT_FOUND,
                };
                (code, e.to_string(), message)
            }
            ApiError::Internal(text) => (StatusCode::INTERNAL_SERVER_ERROR, text, None),
        };

        let body = serde_json::json!({
            "status": "error",
            "error": text,
            "message": message,
        });
        (code, Json(body)).into_response()
    }
}

/// The caller's page session, taken from the session cookie.
pub struct CurrentSession(Arc<Mutex<Session>>);

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        jar.get(SESSION_COOKIE)
            .and_then(|c| state.sessions.get(c.value()))
            .map(CurrentSession)
            .ok_or(ApiError::NoSession)
    }
}

impl CurrentSession {
    fn lock(&self) -> MutexGuard<'_, Session> {
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Wrap an operation result into the response envelope, attaching the
/// session's current status message either way.
fn respond<T: Serialize>(session: &Session, result: Result<T, SessionError>) -> Result<Json<ApiResponse<T>>, ApiError> {
    let message = session.status(Utc::now()).cloned();
    match result {
        Ok(data) => Ok(Json(ApiResponse {
            status: "ok",
            message,
            data: Some(data),
        })),
        Err(e) => Err(ApiError::Session(e, message)),
    }
}

pub fn router(state: Arc<AppState>, config: &Config) -> Router {
    Router::new()
        .route("/", get(serve_page))
        .route("/api/load", post(load_file))
        .route("/api/sheet", post(select_sheet))
        .route("/api/table", get(get_table))
        .route("/api/cell", post(select_cell))
        .route("/api/jump", post(save_jump))
        .route("/api/jump/local", post(add_local_jump))
        .route("/api/jump/test", post(test_jump))
        .route("/api/jump/trigger", post(trigger_jump))
        .route("/api/status", get(get_status))
        .route("/api/export", get(export_workbook))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.bind_addr()?;
    let state = Arc::new(AppState::new(&config));
    let app = router(state, &config);

    let listener = TcpListener::bind(addr).await?;
    log::info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Serve the page. Every load starts a new, empty session.
async fn serve_page(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    let id = state.sessions.create();
    let cookie = Cookie::build((SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict);
    (jar.add(cookie), Html(include_str!("./static/index.html")))
}

async fn load_file(session: CurrentSession, mut multipart: Multipart) -> Result<impl IntoResponse, ApiError> {
    let mut file_data = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Internal(e.body_text()))?
    {
        if field.name() == Some("file") {
            file_data = field
                .bytes()
                .await
                .map_err(|e| ApiError::Internal(e.body_text()))?
                .to_vec();
        }
    }

    let mut session = session.lock();
    let result = session
        .load_file(&file_data)
        .map(|sheets| LoadResponse { sheets });
    respond(&session, result)
}

async fn select_sheet(
    session: CurrentSession,
    Json(payload): Json<SheetRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut session = session.lock();
    let view = match session.select_sheet(&payload.name) {
        Ok(view) => view,
        Err(e) => return Err(ApiError::Session(e, session.status(Utc::now()).cloned())),
    };
    let html = render_table(&view).map_err(|e| ApiError::Internal(e.to_string()))?;
    respond(
        &session,
        Ok(SheetResponse {
            sheet: view.sheet,
            html,
        }),
    )
}

async fn get_table(session: CurrentSession) -> Result<impl IntoResponse, ApiError> {
    let session = session.lock();
    let view = session.grid().map_err(|e| ApiError::Session(e, None))?;
    let html = render_table(&view).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Html(html))
}

async fn select_cell(
    session: CurrentSession,
    Json(payload): Json<CellRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut session = session.lock();
    let result = session.select_cell(&payload.cell);
    respond(&session, result)
}

async fn save_jump(
    session: CurrentSession,
    Json(form): Json<JumpForm>,
) -> Result<impl IntoResponse, ApiError> {
    let mut session = session.lock();
    let result = session
        .save_jump_config(&form)
        .map(|(source, target)| serde_json::json!({ "cell": source, "target": target }));
    respond(&session, result)
}

// Any `targetFile` in the body is ignored.
async fn add_local_jump(
    session: CurrentSession,
    Json(form): Json<JumpForm>,
) -> Result<impl IntoResponse, ApiError> {
    let mut session = session.lock();
    let result = session
        .add_local_jump(&form.target_sheet, &form.target_cell)
        .map(|(source, target)| serde_json::json!({ "cell": source, "target": target }));
    respond(&session, result)
}

async fn test_jump(session: CurrentSession) -> Result<impl IntoResponse, ApiError> {
    let mut session = session.lock();
    let result = session
        .test_jump()
        .map(|configured| TestResponse { configured });
    respond(&session, result)
}

async fn trigger_jump(
    session: CurrentSession,
    Json(payload): Json<CellRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut session = session.lock();
    let result = session.trigger_jump(&payload.cell);
    respond(&session, result)
}

async fn get_status(session: CurrentSession) -> Result<impl IntoResponse, ApiError> {
    let session = session.lock();
    respond(&session, Ok(session.status(Utc::now()).cloned()))
}

async fn export_workbook(session: CurrentSession) -> Result<Response, ApiError> {
    let mut session = session.lock();
    let (filename, bytes) = match session.export() {
        Ok(exported) => exported,
        Err(e) => {
            let message = session.status(Utc::now()).cloned();
            return Err(ApiError::Session(e, message));
        }
    };

    let disposition = format!(
        "attachment; filename=\"export.xlsx\"; filename*=UTF-8''{}",
        urlencoding::encode(filename)
    );
    Response::builder()
        .status(StatusCode::OK)
        .header(
            header::CONTENT_TYPE,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        )
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from(bytes))
        .map_err(|e| ApiError::Internal(e.to_string()))
}
