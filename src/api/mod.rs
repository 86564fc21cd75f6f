mod args;

use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fmt::{self, Write as _};
use std::net::{IpAddr, SocketAddr};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    GrowthInputs, GrowthResult, GrowthYearResult, RequiredYieldInputs, RequiredYieldResult,
    RetirementInputs, RetirementResult, format_currency, format_percentage, run_growth,
    run_growth_schedule, run_retirement, solve_required_yield,
};

pub use args::{
    CliDurationUnit, GrowthArgs, RequiredYieldArgs, RetirementArgs, build_growth_inputs,
    build_required_yield_request, build_retirement_inputs, default_growth_args,
    default_required_yield_args, default_retirement_args,
};
use args::{
    GrowthPayload, RequiredYieldPayload, RetirementPayload, growth_args_from_payload,
    required_yield_args_from_payload, retirement_args_from_payload,
};

#[derive(Parser, Debug)]
#[command(
    name = "organizesee",
    about = "Financial calculator: compound interest, retirement income and required yield"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Future value of a lump sum plus monthly contributions
    Growth {
        #[command(flatten)]
        args: GrowthArgs,
        #[arg(long, help = "Print the JSON record instead of a summary")]
        json: bool,
    },
    /// Pot at retirement and the monthly income it supports under the 4% rule
    Retirement {
        #[command(flatten)]
        args: RetirementArgs,
        #[arg(long, help = "Print the JSON record instead of a summary")]
        json: bool,
    },
    /// Smallest annual rate that reaches a target value
    RequiredYield {
        #[command(flatten)]
        args: RequiredYieldArgs,
        #[arg(long, help = "Print the JSON record instead of a summary")]
        json: bool,
    },
    /// Serve the calculators as a JSON HTTP API
    Serve {
        #[arg(long, env = "ORGANIZESEE_HOST", default_value = "0.0.0.0")]
        host: IpAddr,
        #[arg(long, env = "ORGANIZESEE_PORT", default_value_t = 8080)]
        port: u16,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CalculationKind {
    CompoundInterest,
    Retirement,
    RequiredYield,
}

/// The `type`/`inputs`/`results` shape the calculator screen stores its runs in.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationRecord<I, R> {
    #[serde(rename = "type")]
    pub kind: CalculationKind,
    pub inputs: I,
    pub results: R,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Vec<GrowthYearResult>>,
}

pub type GrowthRecord = CalculationRecord<GrowthInputs, GrowthResult>;
pub type RetirementRecord = CalculationRecord<RetirementInputs, RetirementResult>;
pub type RequiredYieldRecord = CalculationRecord<RequiredYieldInputs, RequiredYieldResult>;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub fn growth_record(args: &GrowthArgs) -> Result<GrowthRecord, String> {
    let inputs = build_growth_inputs(args)?;
    let results = run_growth(&inputs).map_err(|e| e.to_string())?;
    let schedule = run_growth_schedule(&inputs).map_err(|e| e.to_string())?;
    Ok(CalculationRecord {
        kind: CalculationKind::CompoundInterest,
        inputs,
        results,
        schedule: Some(schedule),
    })
}

pub fn retirement_record(args: &RetirementArgs) -> Result<RetirementRecord, String> {
    let inputs = build_retirement_inputs(args);
    let results = run_retirement(&inputs).map_err(|e| e.to_string())?;
    Ok(CalculationRecord {
        kind: CalculationKind::Retirement,
        inputs,
        results,
        schedule: None,
    })
}

pub fn required_yield_record(args: &RequiredYieldArgs) -> Result<RequiredYieldRecord, String> {
    let (inputs, config) = build_required_yield_request(args)?;
    let results = solve_required_yield(&inputs, config).map_err(|e| e.to_string())?;
    Ok(CalculationRecord {
        kind: CalculationKind::RequiredYield,
        inputs,
        results,
        schedule: None,
    })
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("Failed to serialize result: {e}"))
}

pub fn growth_report(args: &GrowthArgs, json: bool) -> Result<String, String> {
    let record = growth_record(args)?;
    if json {
        return to_json(&record);
    }
    render(|out| write_growth_summary(out, &record))
}

pub fn retirement_report(args: &RetirementArgs, json: bool) -> Result<String, String> {
    let record = retirement_record(args)?;
    if json {
        return to_json(&record);
    }
    render(|out| write_retirement_summary(out, &record))
}

pub fn required_yield_report(args: &RequiredYieldArgs, json: bool) -> Result<String, String> {
    let record = required_yield_record(args)?;
    if json {
        return to_json(&record);
    }
    render(|out| write_required_yield_summary(out, &record))
}

fn render(write: impl FnOnce(&mut String) -> fmt::Result) -> Result<String, String> {
    let mut out = String::new();
    write(&mut out).map_err(|e| format!("Failed to format report: {e}"))?;
    Ok(out)
}

fn write_growth_summary(out: &mut String, record: &GrowthRecord) -> fmt::Result {
    let inputs = &record.inputs;
    let results = &record.results;
    writeln!(
        out,
        "Compound interest: {} months at {} a year",
        inputs.duration_months,
        format_percentage(inputs.annual_rate)
    )?;
    writeln!(out, "  Final value:        {}", format_currency(results.final_value))?;
    writeln!(
        out,
        "  Total contributed:  {}",
        format_currency(results.total_contributed)
    )?;
    writeln!(
        out,
        "  Interest earned:    {}",
        format_currency(results.total_interest_earned)
    )?;
    writeln!(
        out,
        "  Yield:              {}",
        format_percentage(results.yield_percentage)
    )?;

    let Some(schedule) = record.schedule.as_deref().filter(|rows| !rows.is_empty()) else {
        return Ok(());
    };
    writeln!(out)?;
    writeln!(out, "{:>4} {:>6} {:>20} {:>20}", "Year", "Month", "Balance", "Interest")?;
    for row in schedule {
        writeln!(
            out,
            "{:>4} {:>6} {:>20} {:>20}",
            row.year,
            row.month,
            format_currency(row.balance),
            format_currency(row.total_interest_earned)
        )?;
    }
    Ok(())
}

fn write_retirement_summary(out: &mut String, record: &RetirementRecord) -> fmt::Result {
    let inputs = &record.inputs;
    let results = &record.results;
    writeln!(
        out,
        "Retirement at {} (from age {}, {} months)",
        inputs.retirement_age, inputs.current_age, results.duration_months
    )?;
    writeln!(
        out,
        "  Pot at retirement:  {}",
        format_currency(results.growth.final_value)
    )?;
    writeln!(
        out,
        "  Total contributed:  {}",
        format_currency(results.growth.total_contributed)
    )?;
    writeln!(
        out,
        "  Interest earned:    {}",
        format_currency(results.growth.total_interest_earned)
    )?;
    writeln!(
        out,
        "  Monthly income:     {} ({} a year withdrawal)",
        format_currency(results.monthly_income_estimate),
        format_percentage(results.withdrawal_rate * 100.0)
    )
}

fn write_required_yield_summary(out: &mut String, record: &RequiredYieldRecord) -> fmt::Result {
    let inputs = &record.inputs;
    let results = &record.results;
    writeln!(
        out,
        "Target {} in {} months",
        format_currency(inputs.target_value),
        inputs.duration_months
    )?;
    if results.is_achievable {
        writeln!(
            out,
            "  Required rate:      {} a year",
            format_percentage(results.required_annual_rate)
        )?;
        writeln!(out, "  Projected value:    {}", format_currency(results.final_value))
    } else {
        writeln!(
            out,
            "  Not achievable up to {} a year; best projection is {}",
            format_percentage(results.required_annual_rate),
            format_currency(results.final_value)
        )
    }
}

pub fn router() -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/growth",
            get(growth_get_handler).post(growth_post_handler),
        )
        .route(
            "/api/retirement",
            get(retirement_get_handler).post(retirement_post_handler),
        )
        .route(
            "/api/required-yield",
            get(required_yield_get_handler).post(required_yield_post_handler),
        )
        .fallback(not_found_handler)
}

pub async fn run_http_server(addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "calculator HTTP API listening");

    axum::serve(listener, router()).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn growth_get_handler(Query(payload): Query<GrowthPayload>) -> Response {
    growth_handler_impl(payload).await
}

async fn growth_post_handler(Json(payload): Json<GrowthPayload>) -> Response {
    growth_handler_impl(payload).await
}

async fn retirement_get_handler(Query(payload): Query<RetirementPayload>) -> Response {
    retirement_handler_impl(payload).await
}

async fn retirement_post_handler(Json(payload): Json<RetirementPayload>) -> Response {
    retirement_handler_impl(payload).await
}

async fn required_yield_get_handler(Query(payload): Query<RequiredYieldPayload>) -> Response {
    required_yield_handler_impl(payload).await
}

async fn required_yield_post_handler(Json(payload): Json<RequiredYieldPayload>) -> Response {
    required_yield_handler_impl(payload).await
}

async fn growth_handler_impl(payload: GrowthPayload) -> Response {
    record_response("growth", growth_record(&growth_args_from_payload(payload)))
}

async fn retirement_handler_impl(payload: RetirementPayload) -> Response {
    record_response(
        "retirement",
        retirement_record(&retirement_args_from_payload(payload)),
    )
}

async fn required_yield_handler_impl(payload: RequiredYieldPayload) -> Response {
    record_response(
        "required-yield",
        required_yield_record(&required_yield_args_from_payload(payload)),
    )
}

fn record_response<T: Serialize>(route: &'static str, record: Result<T, String>) -> Response {
    match record {
        Ok(record) => json_response(StatusCode::OK, record),
        Err(msg) => {
            warn!(route, error = %msg, "rejected calculator request");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
