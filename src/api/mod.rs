use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    Breakdown, ContributionPlan, PeriodRecord, ProjectionResult, closed_form_future_value,
    project_with_breakdown,
};

mod report;

pub use report::{format_amount, render_report};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

const DEFAULT_CURRENCY: &str = "₹";
const MAX_CURRENCY_CHARS: usize = 4;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliBreakdown {
    Yearly,
    Monthly,
}

impl From<CliBreakdown> for Breakdown {
    fn from(value: CliBreakdown) -> Self {
        match value {
            CliBreakdown::Yearly => Breakdown::Yearly,
            CliBreakdown::Monthly => Breakdown::Monthly,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiBreakdown {
    #[serde(alias = "year", alias = "Yearly")]
    Yearly,
    #[serde(alias = "month", alias = "Monthly")]
    Monthly,
}

impl From<ApiBreakdown> for CliBreakdown {
    fn from(value: ApiBreakdown) -> Self {
        match value {
            ApiBreakdown::Yearly => CliBreakdown::Yearly,
            ApiBreakdown::Monthly => CliBreakdown::Monthly,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    monthly_amount: Option<f64>,
    years: Option<u32>,
    expected_return: Option<f64>,
    inflation: Option<f64>,
    step_up: Option<f64>,
    breakdown: Option<ApiBreakdown>,
    currency: Option<String>,
}

#[derive(Parser, Debug)]
#[command(
    name = "sip",
    about = "SIP calculator with inflation adjustment and annual step-up",
    after_help = "Run `sip serve [port]` to start the browser UI instead."
)]
struct Cli {
    #[arg(long, default_value_t = 5000.0, help = "Monthly SIP amount")]
    monthly_amount: f64,
    #[arg(long, default_value_t = 10, help = "Investment duration in years")]
    years: u32,
    #[arg(
        long,
        default_value_t = 12.0,
        help = "Expected annual return in percent"
    )]
    expected_return: f64,
    #[arg(long, default_value_t = 5.0, help = "Annual inflation rate in percent")]
    inflation_rate: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Annual increase of the monthly amount in percent, applied from the next year"
    )]
    step_up: f64,
    #[arg(long, value_enum, default_value_t = CliBreakdown::Yearly)]
    breakdown: CliBreakdown,
    #[arg(long, help = "Print the per-period breakdown table")]
    show_table: bool,
    #[arg(long, default_value = DEFAULT_CURRENCY, help = "Currency symbol for amounts")]
    currency: String,
}

#[derive(Debug)]
struct ProjectionRequest {
    plan: ContributionPlan,
    breakdown: Breakdown,
    currency: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BreakdownBar {
    label: &'static str,
    amount: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    currency: String,
    breakdown: Breakdown,
    periods: Vec<PeriodRecord>,
    total_invested: f64,
    final_compounded_value: f64,
    final_inflation_adjusted_value: f64,
    returns_gained: f64,
    lumpsum_comparison_value: f64,
    closed_form_value: Option<f64>,
    investment_breakdown: Vec<BreakdownBar>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_request(cli: Cli) -> Result<ProjectionRequest, String> {
    if !(100.0..=1_000_000.0).contains(&cli.monthly_amount) {
        return Err("--monthly-amount must be between 100 and 1000000".to_string());
    }

    if !(1..=50).contains(&cli.years) {
        return Err("--years must be between 1 and 50".to_string());
    }

    if !(1.0..=30.0).contains(&cli.expected_return) {
        return Err("--expected-return must be between 1 and 30".to_string());
    }

    if !(0.0..=15.0).contains(&cli.inflation_rate) {
        return Err("--inflation-rate must be between 0 and 15".to_string());
    }

    if !(0.0..=50.0).contains(&cli.step_up) {
        return Err("--step-up must be between 0 and 50".to_string());
    }

    let currency = cli.currency.trim().to_string();
    let currency_chars = currency.chars().count();
    if currency_chars == 0 || currency_chars > MAX_CURRENCY_CHARS {
        return Err(format!(
            "--currency must be 1 to {MAX_CURRENCY_CHARS} characters"
        ));
    }

    let plan = ContributionPlan::new(
        cli.monthly_amount,
        cli.years,
        cli.expected_return,
        cli.inflation_rate,
    )
    .with_step_up(cli.step_up);

    Ok(ProjectionRequest {
        plan,
        breakdown: cli.breakdown.into(),
        currency,
    })
}

/// Parses command-line flags, runs the projection and renders the text report.
pub fn run_cli<I, T>(args: I) -> Result<String, String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    let show_table = cli.show_table;
    let request = build_request(cli)?;
    let result =
        project_with_breakdown(&request.plan, request.breakdown).map_err(|e| e.to_string())?;
    Ok(render_report(&result, &request.currency, show_table))
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!("SIP calculator listening on http://{addr}");
    info!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(payload: Result<Query<ProjectPayload>, QueryRejection>) -> Response {
    match payload {
        Ok(Query(payload)) => project_handler_impl(payload),
        Err(rejection) => invalid_payload_response(&invalid_query_message(rejection.body_text())),
    }
}

async fn project_post_handler(payload: Result<Json<ProjectPayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => project_handler_impl(payload),
        Err(rejection) => invalid_payload_response(&invalid_json_message(rejection.body_text())),
    }
}

fn invalid_json_message(detail: impl std::fmt::Display) -> String {
    format!("Invalid API JSON payload: {detail}")
}

fn invalid_query_message(detail: impl std::fmt::Display) -> String {
    format!("Invalid API query: {detail}")
}

fn invalid_payload_response(msg: &str) -> Response {
    warn!("rejected projection payload: {msg}");
    error_response(StatusCode::BAD_REQUEST, msg)
}

fn project_handler_impl(payload: ProjectPayload) -> Response {
    let request = match request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => {
            warn!("rejected projection request: {msg}");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    let result = match project_with_breakdown(&request.plan, request.breakdown) {
        Ok(result) => result,
        Err(e) => {
            warn!("projection failed validation: {e}");
            return error_response(StatusCode::BAD_REQUEST, &e.to_string());
        }
    };

    json_response(StatusCode::OK, build_project_response(&request, result))
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn request_from_json(json: &str) -> Result<ProjectionRequest, String> {
    let payload = serde_json::from_str::<ProjectPayload>(json)
        .map_err(invalid_json_message)?;
    request_from_payload(payload)
}

fn request_from_payload(payload: ProjectPayload) -> Result<ProjectionRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.monthly_amount {
        cli.monthly_amount = v;
    }
    if let Some(v) = payload.years {
        cli.years = v;
    }
    if let Some(v) = payload.expected_return {
        cli.expected_return = v;
    }
    if let Some(v) = payload.inflation {
        cli.inflation_rate = v;
    }
    if let Some(v) = payload.step_up {
        cli.step_up = v;
    }
    if let Some(v) = payload.breakdown {
        cli.breakdown = v.into();
    }
    if let Some(v) = payload.currency {
        cli.currency = v;
    }

    build_request(cli)
}

fn default_cli_for_api() -> Cli {
    Cli {
        monthly_amount: 5_000.0,
        years: 10,
        expected_return: 12.0,
        inflation_rate: 5.0,
        step_up: 0.0,
        breakdown: CliBreakdown::Yearly,
        show_table: false,
        currency: DEFAULT_CURRENCY.to_string(),
    }
}

fn build_project_response(request: &ProjectionRequest, result: ProjectionResult) -> ProjectResponse {
    let closed_form_value = if request.plan.annual_step_up_percent == 0.0 {
        closed_form_future_value(&request.plan)
            .ok()
            .map(f64::round_ties_even)
    } else {
        None
    };
    let returns_gained = result.returns_gained();

    ProjectResponse {
        currency: request.currency.clone(),
        breakdown: result.breakdown,
        investment_breakdown: vec![
            BreakdownBar {
                label: "Total Invested",
                amount: result.total_invested,
            },
            BreakdownBar {
                label: "Returns Gained",
                amount: returns_gained,
            },
        ],
        total_invested: result.total_invested,
        final_compounded_value: result.final_compounded_value,
        final_inflation_adjusted_value: result.final_inflation_adjusted_value,
        returns_gained,
        lumpsum_comparison_value: result.lumpsum_comparison_value,
        closed_form_value,
        periods: result.periods,
    }
}
