use actix_web::{HttpRequest, HttpResponse, get, web};
use tracing::instrument;

use crate::{
    api::{
        rest::{ControlsResponse, FiguresQuery, FiguresResponse, SummaryResponse},
        state::AppState,
    },
    model::{
        apperror::{ApplicationError, ErrorType},
        models::Selection,
    },
};

/**
 * The dashboard page. Rendering happens in the browser with plotly.js.
 */
const DASHBOARD_PAGE: &str = include_str!("../../static/index.html");

/**
 * Serves the dashboard page.
 */
#[get("/")]
pub async fn dashboard_page() -> HttpResponse {
    HttpResponse::Ok().content_type("text/html; charset=utf-8").body(DASHBOARD_PAGE)
}

/**
 * Endpoint to retrieve the options of the subject, country and year controls.
 */
#[instrument(level = "info", skip(http_request, app_state), fields(service = "getControls", trace_id = get_trace_id(&http_request)))]
#[get("/api/services/v1_0/controls")]
pub async fn controls_get(http_request: HttpRequest, app_state: web::Data<AppState>) -> Result<HttpResponse, ApplicationError> {
    Ok(HttpResponse::Ok().json(ControlsResponse::from(app_state.dashboard_service.controls())))
}

/**
 * Endpoint to recompute the four figures for a selection.
 */
#[instrument(level = "info", skip(http_request, app_state), fields(service = "getFigures", trace_id = get_trace_id(&http_request), result))]
#[get("/api/services/v1_0/figures")]
pub async fn figures_get(http_request: HttpRequest, query: web::Query<FiguresQuery>, app_state: web::Data<AppState>) -> Result<HttpResponse, ApplicationError> {
    let selection = Selection::try_from(query.into_inner())?;
    let figures = app_state.dashboard_service.update_figures(selection)?;
    tracing::Span::current().record("result", "ok");
    Ok(HttpResponse::Ok().json(FiguresResponse::from(figures)))
}

/**
 * Endpoint describing the merged table.
 */
#[instrument(skip(http_request, app_state), fields(service = "getSummary", trace_id = get_trace_id(&http_request)))]
#[get("/api/services/v1_0/summary")]
pub async fn summary_get(http_request: HttpRequest, app_state: web::Data<AppState>) -> Result<HttpResponse, ApplicationError> {
    Ok(HttpResponse::Ok().json(SummaryResponse::from(app_state.dashboard_service.summary())))
}

/**
 * Query extractor configuration so malformed query strings get the same JSON error body as other validation errors.
 */
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| ApplicationError::new(ErrorType::Validation, err.to_string()).into())
}

/**
 * Retrieves the trace ID from the HTTP request headers.
 * If the trace ID is not present, a new UUID is generated.
 */
fn get_trace_id(http_request: &HttpRequest) -> String {
    http_request.headers().get("X-Trace-ID")
        .and_then(|v| v.to_str().ok().map(std::string::ToString::to_string))
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}
