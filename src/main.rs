mod api;
mod dao;
mod model;
mod service;

use std::fs::OpenOptions;
use std::sync::Arc;

use crate::api::endpoints::{controls_get, dashboard_page, figures_get, query_config, summary_get};
use crate::api::middleware::timing_middleware;
use crate::api::state::AppState;
use crate::dao::sources::SourceDao;
use crate::model::apperror::{ApplicationError, ErrorType};
use crate::model::config::{ApplicationArguments, Config, LoggingConfig};
use crate::service::dashboard::DashboardService;
use crate::service::dataset::DatasetService;

use actix_web::middleware::from_fn;
use actix_web::{App, HttpServer, web};
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use clap::Parser;
use prometheus::IntGauge;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/**
 * Loads the configuration, merges the two sources once and serves the dashboard.
 * The server is never started when the merge fails.
 */
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let args = ApplicationArguments::parse();

    let config = get_config(args.config_file.as_deref())?;

    init_tracing(&config.logging)?;

    let dataset_service = DatasetService::new(SourceDao::new());
    let table = dataset_service
        .generate_meat_and_gdp_table(&config.sources)
        .await
        .map_err(|err| std::io::Error::other(format!("Failed to build the meat and GDP table: {err}")))?;
    let table = Arc::new(table);

    let prometheus = PrometheusMetricsBuilder::new("")
        .endpoint("/metrics")
        .mask_unmatched_patterns("UNKNOWN")
        .build()
        .map_err(|err| std::io::Error::other(format!("Failed to create Prometheus metrics: {err}")))?;

    let merged_rows_gauge = IntGauge::new("merged_rows", "Rows in the merged meat and GDP table").map_err(|err| std::io::Error::other(format!("Failed to create merged_rows gauge: {err}")))?;
    register_prometheus_metrics(&prometheus, &merged_rows_gauge)?;
    merged_rows_gauge.set(i64::try_from(table.len()).unwrap_or(i64::MAX));

    let state = web::Data::new(AppState::new(DashboardService::new(table)));

    info!("Serving dashboard on http://127.0.0.1:{}", config.server.http_port);

    HttpServer::new(move || {
        App::new()
            .wrap(prometheus.clone())
            .wrap(from_fn(timing_middleware))
            .app_data(query_config())
            .app_data(state.clone())
            .service(dashboard_page)
            .service(controls_get)
            .service(figures_get)
            .service(summary_get)
    })
    .workers(config.server.workers)
    .bind(("127.0.0.1", config.server.http_port))?
    .run()
    .await
}

/**
 * Initializes logging for the application.
 *
 * #Arguments
 * `logging`: Which fields to print, extra filter directives and the optional log file.
 *
 * #Returns
 * A `Result` indicating success or failure.
 */
fn init_tracing(logging: &LoggingConfig) -> Result<(), std::io::Error> {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    for directive in &logging.directives {
        let directive: Directive = directive.parse().map_err(|err| ApplicationError::new(ErrorType::Initialization, format!("Invalid logging directive '{directive}': {err}")))?;
        filter = filter.add_directive(directive);
    }

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(logging.target)
        .with_thread_ids(logging.thread_ids)
        .with_thread_names(logging.thread_names)
        .with_line_number(logging.line_number)
        .with_level(logging.level)
        .with_ansi(logging.ansi);

    let file_layer = if logging.file {
        let logfile = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&logging.logfile)
            .map_err(|err| std::io::Error::other(format!("Failed to open log file {}: {err}", logging.logfile)))?;
        Some(
            tracing_subscriber::fmt::layer()
                .with_target(logging.target)
                .with_thread_ids(logging.thread_ids)
                .with_thread_names(logging.thread_names)
                .with_line_number(logging.line_number)
                .with_level(logging.level)
                .with_ansi(false)
                .with_writer(Arc::new(logfile)),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|err| std::io::Error::other(format!("Failed to initialize logging: {err}")))
}

/**
 * Registers custom Prometheus metrics.
 *
 * #Arguments
 * `prometheus_metrics`: The Prometheus metrics instance to register the gauge with.
 * `gauge`: The gauge to register.
 */
fn register_prometheus_metrics(prometheus_metrics: &PrometheusMetrics, gauge: &IntGauge) -> Result<(), std::io::Error> {
    prometheus_metrics.registry.register(Box::new(gauge.clone())).map_err(|err| std::io::Error::other(format!("Failed to register Prometheus gauge: {err}")))?;
    Ok(())
}

/**
 * Reads the configuration from the specified file, or the built-in defaults when no file is given.
 *
 * #Arguments
 * `config_file`: The path to the configuration file.
 *
 * #Returns
 * A `Result` containing the parsed `Config` or an `std::io::Error` if reading or parsing fails.
*/
fn get_config(config_file: Option<&str>) -> Result<Config, std::io::Error> {
    let Some(config_file) = config_file else {
        return Ok(Config::default());
    };
    let config_str: String = std::fs::read_to_string(config_file).map_err(|err| std::io::Error::other(format!("Failed to read config file: {err}")))?;
    let config: Config = toml::from_str(&config_str).map_err(|err| std::io::Error::other(format!("Failed to parse config file: {err}")))?;
    Ok(config)
}
