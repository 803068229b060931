use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    model::{
        apperror::{ApplicationError, ErrorType},
        models::{ControlsOutputType, Selection, SubjectSelection, SummaryOutputType},
    },
    service::{dashboard::DashboardFigures, figures::Figure},
};

/***************** Figures models *********************/

/**
 * Query parameters for recomputing the dashboard figures.
 */
#[derive(Debug, Deserialize)]
pub struct FiguresQuery {
    /**
     * Meat type, or `ALL` for every meat type.
     */
    pub subject: String,
    /**
     * Country name as listed by the controls endpoint.
     */
    pub country: String,
    pub year: i32,
}

impl TryFrom<FiguresQuery> for Selection {
    type Error = ApplicationError;

    fn try_from(query: FiguresQuery) -> Result<Self, Self::Error> {
        let subject: SubjectSelection = query.subject.parse()?;
        Ok(Selection::new(subject, query.country, query.year))
    }
}

/**
 * The four figures, keyed by the id of the graph element they belong to.
 */
#[derive(Debug, Serialize)]
pub struct FiguresResponse {
    ts_fig: Figure,
    corr_fig: Figure,
    gdp_fig_high: Figure,
    gdp_fig_low: Figure,
}

impl From<DashboardFigures> for FiguresResponse {
    fn from(figures: DashboardFigures) -> Self {
        FiguresResponse { ts_fig: figures.ts_fig, corr_fig: figures.corr_fig, gdp_fig_high: figures.gdp_fig_high, gdp_fig_low: figures.gdp_fig_low }
    }
}

/***************** Controls models *********************/

/**
 * Response structure for the control options.
 */
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlsResponse {
    /**
     * Meat types followed by `ALL`.
     */
    subjects: Vec<String>,
    /**
     * Countries in alphabetical order.
     */
    countries: Vec<String>,
    /**
     * Years in ascending order.
     */
    years: Vec<i32>,
    /**
     * Initial selection.
     */
    defaults: SelectionDefaults,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionDefaults {
    subject: String,
    country: Option<String>,
    year: Option<i32>,
}

impl From<ControlsOutputType> for ControlsResponse {
    fn from(output: ControlsOutputType) -> Self {
        ControlsResponse {
            subjects: output.subjects,
            countries: output.countries,
            years: output.years,
            defaults: SelectionDefaults { subject: output.default_subject, country: output.default_country, year: output.default_year },
        }
    }
}

/***************** Summary models *********************/

/**
 * Response structure describing the merged table.
 */
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    rows: usize,
    countries: usize,
    subjects: Vec<String>,
    first_year: Option<i32>,
    last_year: Option<i32>,
    /**
     * When the sources were merged.
     */
    loaded_at: DateTime<Utc>,
}

impl From<SummaryOutputType> for SummaryResponse {
    fn from(output: SummaryOutputType) -> Self {
        SummaryResponse {
            rows: output.rows,
            countries: output.countries,
            subjects: output.subjects,
            first_year: output.first_year,
            last_year: output.last_year,
            loaded_at: output.loaded_at,
        }
    }
}

/***************** Error models *********************/

/**
 * Custom error response for the application.
 */
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /**
     * The error code associated with the error type.
     */
    pub code: u16,
    /**
     * A human-readable message describing the error.
     */
    pub message: String,
}

impl ResponseError for ApplicationError {
    fn status_code(&self) -> StatusCode {
        get_statuscode(&self.error_type)
    }

    /**
     * Generates an error response for the application error.
     */
    fn error_response(&self) -> HttpResponse {
        let error_response = ErrorResponse { code: get_error_code(&self.error_type), message: self.message.clone() };
        HttpResponse::build(get_statuscode(&self.error_type)).json(&error_response)
    }
}

/**
* Maps application errors to HTTP status codes.
*
* # Arguments
* `application_error`: The type of error that occurred.
*
* # Returns
* The corresponding HTTP status code.
*/
fn get_statuscode(application_error: &ErrorType) -> StatusCode {
    match application_error {
        ErrorType::Validation => StatusCode::BAD_REQUEST,
        ErrorType::Initialization | ErrorType::SourceRetrieval | ErrorType::Schema => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/**
 * Maps application errors to error codes.
 *
 * # Arguments
 * `application_error`: The type of error that occurred.
 *
 * # Returns
 * The corresponding error code.
 */
fn get_error_code(application_error: &ErrorType) -> u16 {
    match application_error {
        ErrorType::Initialization => 1001,
        ErrorType::SourceRetrieval => 1002,
        ErrorType::Schema => 1003,
        ErrorType::Validation => 1004,
    }
}
