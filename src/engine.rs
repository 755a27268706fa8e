//! Request pipeline: fetch, aggregate, export
//!
//! Every front end goes through `RateService`. A `RequestContext` follows
//! one request through its stages and tags its log lines with a request id.

use crate::data::sources::RateSource;
use crate::currency::CurrencyCode;
use crate::error::Result;
use crate::export::{ExportArtifact, Exporter};
use crate::request::RateRequest;
use crate::table::RateTable;
use std::fmt;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Lifecycle of one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Fetching,
    Aggregating,
    Exporting,
    Delivered,
    Failed,
}

impl Stage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Delivered | Stage::Failed)
    }

    /// Stages only move forward; any live stage may fail
    pub fn can_advance_to(&self, next: Stage) -> bool {
        use Stage::*;
        matches!(
            (self, next),
            (Received, Fetching)
                | (Fetching, Aggregating)
                | (Aggregating, Exporting)
                | (Aggregating, Delivered)
                | (Exporting, Delivered)
                | (Received | Fetching | Aggregating | Exporting, Failed)
        )
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Received => "received",
            Stage::Fetching => "fetching",
            Stage::Aggregating => "aggregating",
            Stage::Exporting => "exporting",
            Stage::Delivered => "delivered",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Per-request logging and stage tracking
#[derive(Debug)]
pub struct RequestContext {
    id: Uuid,
    stage: Stage,
    started: Instant,
}

impl RequestContext {
    pub fn new() -> Self {
        let ctx = Self {
            id: Uuid::new_v4(),
            stage: Stage::Received,
            started: Instant::now(),
        };
        log::info!("[{}] request received", ctx.id);
        ctx
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Move to `next`; invalid transitions are logged and ignored
    pub fn advance(&mut self, next: Stage) {
        if !self.stage.can_advance_to(next) {
            log::warn!("[{}] ignoring transition {} -> {}", self.id, self.stage, next);
            return;
        }
        log::debug!("[{}] {} -> {}", self.id, self.stage, next);
        self.stage = next;
    }

    pub fn delivered(&mut self) {
        self.advance(Stage::Delivered);
        log::info!(
            "[{}] delivered in {:.2}s",
            self.id,
            self.elapsed().as_secs_f64()
        );
    }

    pub fn fail(&mut self, reason: &dyn fmt::Display) {
        self.advance(Stage::Failed);
        log::error!("[{}] failed: {}", self.id, reason);
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Progress hooks for long fetches
pub trait FetchProgress: Send + Sync {
    fn currency_started(&self, _currency: &CurrencyCode, _days: usize) {}

    fn currency_finished(&self, _currency: &CurrencyCode, _present: usize) {}
}

/// No progress reporting
impl FetchProgress for () {}

/// Result of a full generation
#[derive(Debug, Clone)]
pub struct Generation {
    pub table: RateTable,
    pub artifact: ExportArtifact,
}

/// Fetch → aggregate → export, one currency and one call at a time
#[derive(Debug, Clone)]
pub struct RateService<S> {
    source: S,
}

impl<S: RateSource> RateService<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch every requested currency and merge the results.
    ///
    /// Upstream failures only leave blank cells, so this cannot fail.
    pub async fn build_table(
        &self,
        ctx: &mut RequestContext,
        request: &RateRequest,
        progress: &dyn FetchProgress,
    ) -> RateTable {
        ctx.advance(Stage::Fetching);
        let codes: Vec<&str> = request.currencies().iter().map(|c| c.as_str()).collect();
        log::info!(
            "[{}] Fetching rates for currencies: {} from {} to {} via {}",
            ctx.id(),
            codes.join(", "),
            request.start(),
            request.end(),
            self.source.name()
        );

        let days = request.range().num_days();
        let mut series = Vec::with_capacity(request.currencies().len());
        for currency in request.currencies() {
            progress.currency_started(currency, days);
            let observations = self.source.fetch_series(currency, request.range()).await;
            let present = observations.iter().filter(|o| o.is_present()).count();
            log::info!(
                "[{}] {}: {} of {} days quoted",
                ctx.id(),
                currency,
                present,
                days
            );
            progress.currency_finished(currency, present);
            series.push(observations);
        }

        ctx.advance(Stage::Aggregating);
        let table = RateTable::aggregate(request.currencies().to_vec(), series);
        log::info!("[{}] aggregated {} rows", ctx.id(), table.len());
        table
    }

    /// Build the table and encode it.
    ///
    /// On export failure the context is marked failed and the error returned.
    /// On success the context is left in `Exporting`; the front end calls
    /// `delivered()` once the artifact has been handed over.
    pub async fn generate(
        &self,
        ctx: &mut RequestContext,
        request: &RateRequest,
        exporter: &dyn Exporter,
        progress: &dyn FetchProgress,
    ) -> Result<Generation> {
        let table = self.build_table(ctx, request, progress).await;

        ctx.advance(Stage::Exporting);
        match exporter.export(request, &table) {
            Ok(artifact) => {
                log::info!(
                    "[{}] exported {} as {}",
                    ctx.id(),
                    artifact.file_name,
                    exporter.format()
                );
                Ok(Generation { table, artifact })
            }
            Err(e) => {
                ctx.fail(&e);
                Err(e)
            }
        }
    }
}
