//! HTTP handlers

use super::{pages, AppState};
use crate::data::sources::RateSource;
use crate::engine::RequestContext;
use crate::error::RatesError;
use crate::export::csv_encoder::CSV_CONTENT_TYPE;
use crate::export::xlsx_encoder::XLSX_CONTENT_TYPE;
use crate::export::{CsvExporter, ExportArtifact, XlsxExporter};
use crate::request::RateRequest;
use axum::extract::{Form, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// File name served when `/download` gets no parameters
pub const DEFAULT_DOWNLOAD_NAME: &str = "output.xlsx";

/// Form fields of `POST /generate`.
///
/// Either `currency` or `currencies` carries the comma separated codes.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateForm {
    pub currency: Option<String>,
    pub currencies: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl GenerateForm {
    /// Missing dates default to today
    pub fn to_request(&self) -> Result<RateRequest, RatesError> {
        let currencies = self
            .currencies
            .as_deref()
            .or(self.currency.as_deref())
            .unwrap_or_default();
        let today = Local::now().date_naive().format(crate::calendar::DATE_FORMAT).to_string();
        RateRequest::parse(
            currencies,
            self.start_date.as_deref().unwrap_or(&today),
            self.end_date.as_deref().unwrap_or(&today),
        )
    }
}

/// Query parameters of `GET /download`
#[derive(Debug, Default, Deserialize)]
pub struct DownloadQuery {
    pub file_name: Option<String>,
    pub currencies: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Successful `POST /generate` response
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub status: String,
    pub file_name: String,
    /// Seconds, rounded to two decimals
    pub time_taken: f64,
}

/// Failure body shared by all JSON endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error wrapper mapping `RatesError` onto HTTP responses.
///
/// The default conversion answers input errors with 400; `/generate` uses
/// `ApiError::internal` so every failure there is a 500.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: RatesError,
}

impl ApiError {
    pub fn internal(error: RatesError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error,
        }
    }
}

impl From<RatesError> for ApiError {
    fn from(error: RatesError) -> Self {
        let status = match &error {
            RatesError::NotFound(_) => StatusCode::NOT_FOUND,
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self { status, error }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status == StatusCode::NOT_FOUND {
            return (StatusCode::NOT_FOUND, "not found").into_response();
        }

        let body = ErrorResponse {
            status: "error".to_string(),
            message: self.error.to_string(),
        };
        (self.status, Json(body)).into_response()
    }
}

/// GET /
pub async fn index() -> Html<&'static str> {
    Html(pages::INDEX_HTML)
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /generate
pub async fn generate<S: RateSource>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Form(form): Form<GenerateForm>,
) -> Result<Response, ApiError> {
    let mut ctx = RequestContext::new();
    let request = form.to_request().map_err(|e| {
        ctx.fail(&e);
        ApiError::internal(e)
    })?;

    let exporter = XlsxExporter::new(&state.output_dir);
    let generation = state
        .service
        .generate(&mut ctx, &request, &exporter, &())
        .await
        .map_err(ApiError::internal)?;
    let time_taken = round_seconds(ctx.elapsed().as_secs_f64());

    let response = if prefers_html(&headers) {
        Html(pages::results_page(
            &request,
            &generation.table,
            &generation.artifact.file_name,
            time_taken,
        ))
        .into_response()
    } else {
        Json(GenerateResponse {
            status: "success".to_string(),
            file_name: generation.artifact.file_name,
            time_taken,
        })
        .into_response()
    };

    ctx.delivered();
    Ok(response)
}

/// GET /download
pub async fn download<S: RateSource>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    if let (Some(currencies), Some(start), Some(end)) = (
        query.currencies.as_deref(),
        query.start_date.as_deref(),
        query.end_date.as_deref(),
    ) {
        return stream_csv(&state, currencies, start, end).await;
    }

    let file_name = query.file_name.as_deref().unwrap_or(DEFAULT_DOWNLOAD_NAME);
    serve_file(&state.output_dir, file_name).await
}

/// Regenerate the table and send it as `exchange_rates.csv`
async fn stream_csv<S: RateSource>(
    state: &AppState<S>,
    currencies: &str,
    start: &str,
    end: &str,
) -> Result<Response, ApiError> {
    let mut ctx = RequestContext::new();
    let request = RateRequest::parse(currencies, start, end).map_err(|e| {
        ctx.fail(&e);
        e
    })?;

    let generation = state
        .service
        .generate(&mut ctx, &request, &CsvExporter::new(), &())
        .await?;
    let response = attachment(&generation.artifact)?;
    ctx.delivered();
    Ok(response)
}

/// Send a previously generated file from `output_dir`
async fn serve_file(output_dir: &Path, file_name: &str) -> Result<Response, ApiError> {
    if !is_plain_file_name(file_name) {
        log::warn!("Rejected download of '{}'", file_name);
        return Err(RatesError::NotFound(file_name.to_string()).into());
    }

    let path = output_dir.join(file_name);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(RatesError::NotFound(file_name.to_string()).into());
        }
        Err(e) => return Err(RatesError::Io(e).into()),
    };

    let content_type = content_type_for(file_name);
    let artifact = ExportArtifact::in_memory(file_name, content_type, bytes);
    attachment(&artifact)
}

fn attachment(artifact: &ExportArtifact) -> Result<Response, ApiError> {
    let bytes = artifact.bytes()?;
    Ok((
        [
            (header::CONTENT_TYPE, artifact.content_type.to_string()),
            (header::CONTENT_DISPOSITION, artifact.content_disposition()),
        ],
        bytes,
    )
        .into_response())
}

fn content_type_for(file_name: &str) -> &'static str {
    match Path::new(file_name).extension().and_then(|ext| ext.to_str()) {
        Some("xlsx") => XLSX_CONTENT_TYPE,
        Some("csv") => CSV_CONTENT_TYPE,
        _ => "application/octet-stream",
    }
}

/// Only bare names inside `output_dir` may be downloaded
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && !name.contains("..")
        && !name.contains('/')
        && !name.contains('\\')
}

/// True if the client ranks `text/html` above JSON
fn prefers_html(headers: &HeaderMap) -> bool {
    let Some(accept) = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    match (accept.find("text/html"), accept.find("application/json")) {
        (Some(html), Some(json)) => html < json,
        (Some(_), None) => true,
        _ => false,
    }
}

fn round_seconds(secs: f64) -> f64 {
    (secs * 100.0).round() / 100.0
}
