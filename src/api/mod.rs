mod error;
pub mod query;

use std::collections::HashMap;
use std::io::Write;
use std::net::SocketAddr;

use axum::{
    Router,
    extract::{Json, Query, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tokio::net::TcpListener;

use crate::core::{
    Configuration, RawInput, Report, SCENARIO_COUNT, ViewMode, compute_report, normalize,
    trace_scenario_months,
};
use crate::present::{month_trace_csv, projection_csv, render_report};

pub use error::ApiError;
use error::error_response;
use query::{encode_query, raw_input_from_query, view_from_query};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliViewMode {
    Real,
    Nominal,
}

impl From<CliViewMode> for ViewMode {
    fn from(value: CliViewMode) -> Self {
        match value {
            CliViewMode::Real => ViewMode::Real,
            CliViewMode::Nominal => ViewMode::Nominal,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Parser, Debug)]
#[command(
    name = "nestegg",
    about = "Projects periodic investment growth under four annual-return scenarios"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        default_value = "info",
        help = "Log level used when RUST_LOG is not set"
    )]
    pub log_level: String,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON and CSV projection API.
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Print a projection report.
    Project {
        #[command(flatten)]
        inputs: InputArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        #[arg(long, value_enum, default_value_t = CliViewMode::Real)]
        view: CliViewMode,
    },
    /// Print the month-by-month ledger of one scenario as CSV.
    Trace {
        #[command(flatten)]
        inputs: InputArgs,
        #[arg(
            long,
            default_value_t = 1,
            value_parser = clap::value_parser!(u8).range(1..=4),
            help = "Scenario number, 1-4"
        )]
        scenario: u8,
    },
}

/// Raw input flags. Anything left out falls back to the engine defaults.
#[derive(Args, Debug, Default, Clone)]
pub struct InputArgs {
    #[arg(long, allow_negative_numbers = true, help = "Initial investment")]
    pub initial: Option<f64>,
    #[arg(long, allow_negative_numbers = true, help = "Monthly contribution")]
    pub monthly: Option<f64>,
    #[arg(long, allow_negative_numbers = true, help = "Projection horizon in years (1-60)")]
    pub years: Option<f64>,
    #[arg(
        long,
        allow_negative_numbers = true,
        help = "Years of contributions; defaults to the whole horizon"
    )]
    pub contribution_years: Option<f64>,
    #[arg(
        long,
        allow_negative_numbers = true,
        help = "First year of the withdrawal phase; no withdrawals when omitted"
    )]
    pub withdrawal_start: Option<f64>,
    #[arg(long, allow_negative_numbers = true, help = "Monthly withdrawal in today's money")]
    pub withdrawal: Option<f64>,
    #[arg(
        long,
        allow_negative_numbers = true,
        help = "Expected annual inflation in percent, e.g. 2"
    )]
    pub inflation: Option<f64>,
    #[arg(
        long,
        allow_hyphen_values = true,
        value_delimiter = ',',
        help = "Annual returns in percent, comma separated, e.g. 5,10,15,20"
    )]
    pub rates: Vec<f64>,
    #[arg(
        long,
        value_parser = clap::value_parser!(u8).range(1..=4),
        help = "Scenario number to leave out of aggregates (repeatable)"
    )]
    pub disable: Vec<u8>,
}

impl From<&InputArgs> for RawInput {
    fn from(args: &InputArgs) -> Self {
        let rates = (!args.rates.is_empty())
            .then(|| args.rates.iter().map(|r| Some(r / 100.0)).collect());
        let enabled_rates = (!args.disable.is_empty()).then(|| {
            (1..=SCENARIO_COUNT as u8)
                .map(|n| Some(!args.disable.contains(&n)))
                .collect()
        });

        RawInput {
            initial_investment: args.initial,
            monthly_investment: args.monthly,
            years: args.years,
            contribution_years: args.contribution_years,
            start_withdrawal_year: args.withdrawal_start,
            monthly_withdrawal: args.withdrawal,
            inflation_rate: args.inflation.map(|v| v / 100.0),
            enabled_rates,
            rates,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectionResponse {
    #[serde(flatten)]
    report: Report,
    share_query: String,
}

fn build_projection(raw: &RawInput) -> ProjectionResponse {
    let config = normalize(raw);
    let report = compute_report(&config);
    tracing::debug!(
        years = config.years,
        warnings = report.warnings.len(),
        depletion_year = ?report.withdrawal.depletion_year,
        "computed projection"
    );
    ProjectionResponse {
        share_query: encode_query(&config),
        report,
    }
}

pub async fn run(cli: Cli) -> Result<(), ApiError> {
    match cli.command {
        Command::Serve { port } => run_http_server(port).await?,
        Command::Project {
            inputs,
            format,
            view,
        } => {
            let projection = build_projection(&RawInput::from(&inputs));
            let output = match format {
                OutputFormat::Json => {
                    let mut json = serde_json::to_string_pretty(&projection)?;
                    json.push('\n');
                    json
                }
                OutputFormat::Csv => projection_csv(&projection.report, view.into())?,
                OutputFormat::Table => render_report(&projection.report, view.into()),
            };
            write_stdout(&output)?;
        }
        Command::Trace { inputs, scenario } => {
            let config = normalize(&RawInput::from(&inputs));
            let rate = config.rates[usize::from(scenario) - 1];
            let trace = trace_scenario_months(&config, rate);
            write_stdout(&month_trace_csv(&trace)?)?;
        }
    }
    Ok(())
}

fn write_stdout(output: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()
}

fn router() -> Router {
    Router::new()
        .route(
            "/api/projection",
            get(projection_get_handler).post(projection_post_handler),
        )
        .route("/api/projection.csv", get(projection_csv_handler))
        .route("/api/defaults", get(defaults_handler))
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("projection API listening on http://{addr}");
    tracing::info!("local access: http://127.0.0.1:{port}/api/projection");

    axum::serve(listener, router()).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn defaults_handler() -> Response {
    json_response(StatusCode::OK, Configuration::default())
}

async fn projection_get_handler(Query(params): Query<HashMap<String, String>>) -> Response {
    tracing::debug!(?params, "projection request");
    json_response(StatusCode::OK, build_projection(&raw_input_from_query(&params)))
}

// A `null` body counts as an empty record.
async fn projection_post_handler(
    payload: Result<Json<Option<RawInput>>, JsonRejection>,
) -> Response {
    let raw = match payload {
        Ok(Json(raw)) => raw.unwrap_or_default(),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejected projection body");
            return error_response(rejection.status(), &rejection.body_text());
        }
    };
    tracing::debug!(?raw, "projection request");
    json_response(StatusCode::OK, build_projection(&raw))
}

async fn projection_csv_handler(
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let view = view_from_query(&params)?;
    let projection = build_projection(&raw_input_from_query(&params));
    let csv = projection_csv(&projection.report, view)?;

    Ok(with_cache_control((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"projection.csv\"",
            ),
        ],
        csv,
    )))
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

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        serde_json::from_slice(&bytes).expect("body should be JSON")
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        String::from_utf8(bytes.to_vec()).expect("body should be UTF-8")
    }

    fn query(pairs: &[(&str, &str)]) -> Query<HashMap<String, String>> {
        Query(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn input_args_convert_percent_fields_and_disabled_scenarios() {
        let args = InputArgs {
            initial: Some(2_000.0),
            inflation: Some(3.0),
            rates: vec![4.0, 6.0, 8.0, 10.0],
            disable: vec![2, 4],
            ..InputArgs::default()
        };
        let config = normalize(&RawInput::from(&args));

        assert_eq!(config.initial_investment, 2_000.0);
        assert_eq!(config.inflation_rate, 0.03);
        assert_eq!(config.rates, [0.04, 0.06, 0.08, 0.10]);
        assert_eq!(config.enabled_rates, [true, false, true, false]);
    }

    #[test]
    fn cli_parses_project_command_with_negative_numbers() {
        let cli = Cli::try_parse_from([
            "nestegg",
            "project",
            "--rates=-1,2,3,4",
            "--inflation",
            "-0.5",
            "--withdrawal-start",
            "10",
            "--format",
            "csv",
            "--view",
            "nominal",
        ])
        .expect("valid command line");

        let Command::Project {
            inputs,
            format,
            view,
        } = cli.command
        else {
            panic!("expected project command");
        };
        assert_eq!(inputs.rates, vec![-1.0, 2.0, 3.0, 4.0]);
        assert_eq!(inputs.inflation, Some(-0.5));
        assert_eq!(inputs.withdrawal_start, Some(10.0));
        assert_eq!(format, OutputFormat::Csv);
        assert_eq!(view, CliViewMode::Nominal);
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn cli_rejects_out_of_range_scenario() {
        let err = Cli::try_parse_from(["nestegg", "trace", "--scenario", "5"])
            .expect_err("scenario 5 does not exist");
        assert!(err.to_string().contains("5"));
    }

    #[test]
    fn projection_serialization_contains_expected_fields() {
        let projection = build_projection(&RawInput::default());
        let json = serde_json::to_string(&projection).expect("response should serialize");

        assert!(json.contains("\"projections\""));
        assert!(json.contains("\"scenarios\""));
        assert!(json.contains("\"totals\""));
        assert!(json.contains("\"withdrawal\""));
        assert!(json.contains("\"warnings\""));
        assert!(json.contains("\"shareQuery\""));
        assert!(json.contains("\"timesIncreaseReal\""));
    }

    #[tokio::test]
    async fn get_projection_reads_query_codec() {
        let response =
            projection_get_handler(query(&[("years", "5"), ("inflation", "3"), ("rate1", "1")]))
                .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
            Some(&b"no-store"[..])
        );

        let json = body_json(response).await;
        assert_eq!(json["inputs"]["years"], 5);
        assert_eq!(json["projections"].as_array().map(Vec::len), Some(5));
        assert_eq!(json["scenarios"].as_array().map(Vec::len), Some(4));
        assert_eq!(json["warnings"].as_array().map(Vec::len), Some(1));
        assert!(json["shareQuery"].as_str().is_some_and(|q| q.contains("years=5")));
    }

    #[tokio::test]
    async fn post_projection_accepts_lenient_json() {
        let raw: RawInput = serde_json::from_str(
            r#"{"initialInvestment": "1200", "monthlyInvestment": 0, "years": 1,
                "inflationRate": 0, "rates": [0, 0, 0, 0],
                "startWithdrawalYear": 1, "monthlyWithdrawal": 200}"#,
        )
        .expect("lenient JSON");
        let response = projection_post_handler(Ok(Json(Some(raw)))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["withdrawal"]["depletionYear"], 1);
        assert_eq!(json["projections"][0]["realValues"][0], 0.0);
    }

    async fn post_body(content_type: &str, body: &'static str) -> Response {
        let request = Request::post("/api/projection")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .expect("request should build");
        router().oneshot(request).await.expect("router is infallible")
    }

    #[tokio::test]
    async fn post_projection_treats_null_body_as_defaults() {
        let response = post_body("application/json", "null").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
            Some(&b"no-store"[..])
        );

        let json = body_json(response).await;
        assert_eq!(json["inputs"]["years"], 30);
    }

    #[tokio::test]
    async fn post_projection_rejections_are_json_and_not_cached() {
        for (content_type, body) in [
            ("application/x-www-form-urlencoded", "years=5"),
            ("application/json", "{\"years\": "),
        ] {
            let response = post_body(content_type, body).await;
            assert!(response.status().is_client_error(), "{content_type}: {body}");
            assert_eq!(
                response.headers().get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
                Some(&b"no-store"[..])
            );

            let json = body_json(response).await;
            assert!(json["error"].as_str().is_some_and(|e| !e.is_empty()));
        }
    }

    #[tokio::test]
    async fn csv_endpoint_returns_attachment() {
        let response = projection_csv_handler(query(&[("years", "2"), ("view", "nominal")]))
            .await
            .expect("csv export");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).map(|v| v.as_bytes()),
            Some(&b"text/csv; charset=utf-8"[..])
        );

        let text = body_text(response).await;
        assert!(text.starts_with("Year,5% (nominal)"));
        assert_eq!(text.lines().count(), 3);
    }

    #[tokio::test]
    async fn csv_endpoint_rejects_unknown_view() {
        let err = projection_csv_handler(query(&[("view", "sideways")]))
            .await
            .expect_err("unknown view");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert!(json["error"].as_str().is_some_and(|e| e.contains("view")));
    }

    #[tokio::test]
    async fn defaults_endpoint_returns_default_configuration() {
        let json = body_json(defaults_handler().await).await;
        assert_eq!(json["years"], 30);
        assert_eq!(json["initialInvestment"], 5_000.0);
        assert!(json["startWithdrawalYear"].is_null());
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let response = not_found_handler().await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
