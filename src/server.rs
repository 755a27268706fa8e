//! HTTP front end
//!
//! # Endpoints
//!
//! - `GET /` - input form
//! - `POST /generate` - build the spreadsheet, answer with JSON or an HTML table
//! - `GET /download` - serve a generated file, or regenerate and stream CSV
//! - `GET /health` - health check
//!
//! Generation runs inside the request handler; nothing is spawned and no
//! file is polled for.

pub mod handlers;
pub mod pages;

use crate::data::sources::RateSource;
use crate::engine::RateService;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared state of the HTTP server
#[derive(Debug)]
pub struct AppState<S> {
    pub service: RateService<S>,
    /// Directory spreadsheets are written to and downloaded from
    pub output_dir: PathBuf,
}

impl<S: RateSource> AppState<S> {
    pub fn new(service: RateService<S>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            service,
            output_dir: output_dir.into(),
        }
    }
}

/// Build the application router
pub fn router<S: RateSource + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/generate", post(handlers::generate::<S>))
        .route("/download", get(handlers::download::<S>))
        .with_state(Arc::new(state))
}

/// Bind and serve until the process is stopped
pub async fn serve<S: RateSource + 'static>(
    bind_address: SocketAddr,
    state: AppState<S>,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    log::info!("Listening for requests on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await
}
