use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::config::Config;
use crate::exporter::{self, ExportError};
use crate::mailer::{MailError, MailSender, OutgoingCsv, SmtpMailer};
use crate::row::ItemRow;
use crate::validate;

const DEFAULT_SUBJECT: &str = "Item price update";

pub struct AppState {
    pub mailer: Arc<dyn MailSender>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SendCsvRequest {
    recipient_email: String,
    subject: String,
    message: String,
    rows: Vec<ItemRow>,
}

#[derive(Deserialize)]
struct ExportCsvRequest {
    #[serde(default)]
    rows: Vec<ItemRow>,
}

#[derive(Serialize)]
struct OkResponse {
    ok: bool,
}

/// Errors the API surfaces to the client. Transport and encoding details are
/// logged server-side; the client only ever sees `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Mail(MailError),
    Internal(String),
}

impl From<MailError> for ApiError {
    fn from(err: MailError) -> Self {
        match err {
            MailError::InvalidAddress(addr) => {
                ApiError::BadRequest(format!("invalid recipient address \"{}\"", addr))
            }
            other => ApiError::Mail(other),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Mail(err) => {
                log::error!("mail transport failure: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to send email".to_string(),
                )
            }
            ApiError::Internal(detail) => {
                log::error!("internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let mailer = SmtpMailer::new(&config.smtp)?;

    let app_state = Arc::new(AppState {
        mailer: Arc::new(mailer),
    });

    let app = router(app_state);

    let listener = TcpListener::bind(config.listen_addr()).await?;
    log::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router. Split out from [`run`] so integration tests can drive
/// the service with a stub mail sender instead of a live SMTP transport.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/api/health", get(health))
        .route("/api/send-csv", post(send_csv))
        .route("/api/export-csv", post(export_csv))
        .nest_service("/static", ServeDir::new("static"))
        .with_state(state)
}

async fn serve_index() -> Html<&'static str> {
    Html(include_str!("./static/index.html"))
}

async fn health() -> Json<OkResponse> {
    Json(OkResponse { ok: true })
}

async fn send_csv(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SendCsvRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let recipient = payload.recipient_email.trim().to_string();
    if recipient.is_empty() {
        return Err(ApiError::BadRequest(
            "recipientEmail is required".to_string(),
        ));
    }

    let row_count = require_rows(&payload.rows)?;
    let csv = exporter::rows_to_csv(&payload.rows)?;

    let subject = match payload.subject.trim() {
        "" => DEFAULT_SUBJECT.to_string(),
        subject => subject.to_string(),
    };
    let message = match payload.message.trim() {
        "" => format!("Attached: {} item price row(s).", row_count),
        message => message.to_string(),
    };

    let mail = OutgoingCsv {
        recipient: recipient.clone(),
        subject,
        message,
        filename: exporter::csv_filename(),
        csv,
    };

    // The SMTP transport is blocking; keep it off the async workers.
    let mailer = state.mailer.clone();
    tokio::task::spawn_blocking(move || mailer.send_csv(&mail))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    log::info!("emailed {} row(s) to {}", row_count, recipient);
    Ok(Json(OkResponse { ok: true }))
}

async fn export_csv(Json(payload): Json<ExportCsvRequest>) -> Result<Response, ApiError> {
    require_rows(&payload.rows)?;
    let csv = exporter::rows_to_csv(&payload.rows)?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", exporter::csv_filename()),
        )
        .body(axum::body::Body::from(csv))
        .map_err(|e| ApiError::Internal(e.to_string()))
}

/// Reject empty or invalid batches; returns the number of non-blank rows.
fn require_rows(rows: &[ItemRow]) -> Result<usize, ApiError> {
    let row_count = rows.iter().filter(|row| !row.is_blank()).count();
    if row_count == 0 {
        return Err(ApiError::BadRequest("at least one row is required".to_string()));
    }

    validate::validate_rows(rows).map_err(|issues| {
        let message = issues.first().map(ToString::to_string).unwrap_or_default();
        ApiError::BadRequest(message)
    })?;

    Ok(row_count)
}
