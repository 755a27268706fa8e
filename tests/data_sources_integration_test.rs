//! Integration tests for the NBU data source
//!
//! A local axum server stands in for the bank's API so the real reqwest
//! client is exercised end to end.

use axum::extract::Query;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use chrono::NaiveDate;
use rates_export::prelude::*;
use std::collections::HashMap;

const TEST_AGENT: &str = "rates-export-test";

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn json(body: String) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// `exchange?valcode=..&date=..&json`
async fn daily(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> Response {
    if headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok()) != Some(TEST_AGENT) {
        return StatusCode::FORBIDDEN.into_response();
    }
    let valcode = params.get("valcode").map(String::as_str).unwrap_or("");
    let date = params.get("date").map(String::as_str).unwrap_or("");

    match (valcode, date) {
        ("usd", "20250101") => (StatusCode::SERVICE_UNAVAILABLE, "maintenance").into_response(),
        ("usd", _) => json(format!(
            r#"[{{"r030":840,"rate":42.03,"cc":"USD","exchangedate":"{}"}}]"#,
            date
        )),
        ("eur", "20250102") => json("<html>oops</html>".to_string()),
        ("eur", _) => json(r#"[{"r030":978,"rate":43.5,"cc":"EUR"}]"#.to_string()),
        ("gbp", _) => json("[]".to_string()),
        _ => StatusCode::BAD_REQUEST.into_response(),
    }
}

/// `exchange_site?start=..&end=..&valcode=..&sort=exchangedate&order=desc&json`
async fn range(Query(params): Query<HashMap<String, String>>) -> Response {
    assert_eq!(params.get("order").map(String::as_str), Some("desc"));
    match params.get("valcode").map(String::as_str) {
        Some("usd") => json(
            r#"[
                {"exchangedate":"03.02.2025","rate":41.9,"cc":"USD"},
                {"exchangedate":"01.02.2025","rate":41.8,"cc":"USD"},
                {"exchangedate":"31.01.2025","rate":41.7,"cc":"USD"}
            ]"#
            .to_string(),
        ),
        Some("eur") => json(
            r#"[
                {"exchangedate":"03.02.2025","rate":43.2,"cc":"EUR"},
                {"exchangedate":"31.01.2025","rate":43.1,"cc":"EUR"}
            ]"#
            .to_string(),
        ),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
    }
}

async fn spawn_upstream() -> String {
    let app = Router::new()
        .route("/exchange", get(daily))
        .route("/exchange_site", get(range));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn csv_text(generation: &Generation) -> String {
    String::from_utf8(generation.artifact.bytes().unwrap()).unwrap()
}

#[tokio::test]
async fn test_daily_endpoint_degrades_failures_to_blank_cells() {
    let base = spawn_upstream().await;
    let source = NbuRateSource::with_options(&base, TEST_AGENT, Endpoint::Daily, None).unwrap();
    let service = RateService::new(source);
    let request = RateRequest::parse("usd, EUR", "2025-01-03", "2025-01-01").unwrap();

    let mut ctx = RequestContext::new();
    let generation = service
        .generate(&mut ctx, &request, &CsvExporter::new(), &())
        .await
        .unwrap();

    // 503 for USD on the 1st, malformed JSON for EUR on the 2nd
    assert_eq!(
        csv_text(&generation),
        "Date,USD,EUR\n2025-01-01,,43.5\n2025-01-02,42.03,\n2025-01-03,42.03,43.5\n"
    );
}

#[tokio::test]
async fn test_fetch_rate_empty_array_is_none() {
    let base = spawn_upstream().await;
    let source = NbuRateSource::with_options(&base, TEST_AGENT, Endpoint::Daily, None).unwrap();

    let gbp = CurrencyCode::parse("GBP").unwrap();
    assert_eq!(source.fetch_rate(&gbp, d(2025, 1, 1)).await, None);

    let usd = CurrencyCode::parse("USD").unwrap();
    assert_eq!(source.fetch_rate(&usd, d(2025, 1, 2)).await, Some(42.03));
}

#[tokio::test]
async fn test_wrong_user_agent_is_rejected_upstream() {
    let base = spawn_upstream().await;
    let source = NbuRateSource::with_options(&base, "curl/8.0", Endpoint::Daily, None).unwrap();

    let usd = CurrencyCode::parse("USD").unwrap();
    assert_eq!(source.fetch_rate(&usd, d(2025, 1, 2)).await, None);
}

#[tokio::test]
async fn test_range_endpoint_sorts_by_calendar_date() {
    let base = spawn_upstream().await;
    let source = NbuRateSource::with_options(&base, TEST_AGENT, Endpoint::Range, None).unwrap();
    let service = RateService::new(source);
    let request = RateRequest::parse("USD,EUR,PLN", "2025-01-31", "2025-02-03").unwrap();

    let mut ctx = RequestContext::new();
    let table = service.build_table(&mut ctx, &request, &()).await;

    let dates: Vec<NaiveDate> = table.dates().collect();
    assert_eq!(dates, vec![d(2025, 1, 31), d(2025, 2, 1), d(2025, 2, 3)]);
    assert_eq!(table.headers(), vec!["Date", "USD", "EUR", "PLN"]);

    let eur = CurrencyCode::parse("EUR").unwrap();
    assert_eq!(table.get(d(2025, 2, 1), &eur), None);
    assert_eq!(table.get(d(2025, 2, 3), &eur), Some(43.2));

    // PLN failed with a 500: whole column blank, request still succeeds
    let pln = CurrencyCode::parse("PLN").unwrap();
    assert!(table.dates().all(|date| table.get(date, &pln).is_none()));
}

#[tokio::test]
async fn test_single_failed_pair_keeps_blank_row() {
    let base = spawn_upstream().await;
    let source = NbuRateSource::with_options(&base, TEST_AGENT, Endpoint::Daily, None).unwrap();
    let service = RateService::new(source);
    let request = RateRequest::parse("USD", "2025-01-01", "2025-01-01").unwrap();

    let mut ctx = RequestContext::new();
    let generation = service
        .generate(&mut ctx, &request, &CsvExporter::new(), &())
        .await
        .unwrap();
    assert_eq!(csv_text(&generation), "Date,USD\n2025-01-01,\n");

    let dir = tempfile::tempdir().unwrap();
    let mut ctx = RequestContext::new();
    let generation = service
        .generate(&mut ctx, &request, &XlsxExporter::new(dir.path()), &())
        .await
        .unwrap();
    assert!(generation.artifact.path().unwrap().exists());
}

#[tokio::test]
async fn test_unreachable_upstream_gives_blank_daily_rows() {
    // Nothing listens on the discard port
    let source =
        NbuRateSource::with_options("http://127.0.0.1:9", TEST_AGENT, Endpoint::Daily, None)
            .unwrap();
    let service = RateService::new(source);
    let request = RateRequest::parse("USD,EUR", "2025-01-01", "2025-01-02").unwrap();
    let dir = tempfile::tempdir().unwrap();

    let mut ctx = RequestContext::new();
    let generation = service
        .generate(&mut ctx, &request, &XlsxExporter::new(dir.path()), &())
        .await
        .unwrap();

    assert_eq!(
        generation.table.string_rows(),
        vec![vec!["2025-01-01", "", ""], vec!["2025-01-02", "", ""]]
    );
    assert!(generation.artifact.path().unwrap().exists());
}

#[tokio::test]
async fn test_unreachable_range_endpoint_has_nothing_to_save() {
    let source =
        NbuRateSource::with_options("http://127.0.0.1:9", TEST_AGENT, Endpoint::Range, None)
            .unwrap();
    let service = RateService::new(source);
    let request = RateRequest::parse("USD", "2025-01-01", "2025-01-02").unwrap();
    let dir = tempfile::tempdir().unwrap();

    let mut ctx = RequestContext::new();
    let err = service
        .generate(&mut ctx, &request, &XlsxExporter::new(dir.path()), &())
        .await
        .unwrap_err();

    assert!(matches!(err, RatesError::EmptyTable));
    assert_eq!(ctx.stage(), Stage::Failed);
}
