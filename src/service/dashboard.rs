use std::sync::Arc;

use tracing::instrument;

use crate::{
    model::{
        apperror::ApplicationError,
        models::{ALL_SUBJECTS, ControlsOutputType, MeatAndGdpTable, Selection, SummaryOutputType},
    },
    service::{
        analysis::{RankingOrder, correlation_by_group, gdp_by_country, top_n},
        figures::{Figure, correlation_figure, gdp_ranking_figure, time_series_figure},
    },
};

/**
 * Number of countries shown in each GDP ranking.
 */
pub const RANKING_LENGTH: usize = 5;

const DEFAULT_SUBJECT: &str = "BEEF";
const DEFAULT_COUNTRY: &str = "Australia";
const DEFAULT_YEAR: i32 = 2021;

/**
 * The four figures shown for a selection.
 */
#[derive(Debug, Clone)]
pub struct DashboardFigures {
    pub ts_fig: Figure,
    pub corr_fig: Figure,
    pub gdp_fig_high: Figure,
    pub gdp_fig_low: Figure,
}

/**
 * Represents the service answering dashboard interactions from the merged table.
 */
pub struct DashboardService {
    /**
     * The merged table. Shared read-only for the lifetime of the process.
     */
    table: Arc<MeatAndGdpTable>,
}

impl DashboardService {
    /**
     * Creates a new instance of `DashboardService`.
     *
     * # Arguments
     * `table`: The merged table built at startup.
     *
     * # Returns
     * A new instance of `DashboardService`.
     */
    pub fn new(table: Arc<MeatAndGdpTable>) -> Self {
        DashboardService { table }
    }

    /**
     * Options and initial values of the subject, country and year controls.
     * A default that is not in the table falls back to the first option.
     */
    pub fn controls(&self) -> ControlsOutputType {
        let mut subjects = self.table.subjects();
        let countries = self.table.countries();
        let years = self.table.years();

        let default_subject = if subjects.iter().any(|subject| subject == DEFAULT_SUBJECT) {
            DEFAULT_SUBJECT.to_string()
        } else {
            subjects.first().cloned().unwrap_or_else(|| ALL_SUBJECTS.to_string())
        };
        let default_country = countries.iter().find(|country| country.as_str() == DEFAULT_COUNTRY).or_else(|| countries.first()).cloned();
        let default_year = if years.contains(&DEFAULT_YEAR) { Some(DEFAULT_YEAR) } else { years.first().copied() };
        subjects.push(ALL_SUBJECTS.to_string());

        ControlsOutputType { subjects, countries, years, default_subject, default_country, default_year }
    }

    /**
     * Recomputes the four figures for a selection.
     *
     * # Arguments
     * `selection`: State of the three controls.
     *
     * # Returns
     * A Result containing the figures or a validation error when the selection is not in the table.
     */
    #[instrument(skip(self), fields(result))]
    pub fn update_figures(&self, selection: Selection) -> Result<DashboardFigures, ApplicationError> {
        let selection = selection.validate(&self.table)?;
        let country_rows = self.table.for_country(&selection.country);

        let ts_fig = time_series_figure(&selection.subject, &selection.country, &country_rows);
        let corr_fig = correlation_figure(&selection.country, &correlation_by_group(&country_rows));

        let candidates = gdp_by_country(&self.table, selection.year);
        let gdp_fig_high = gdp_ranking_figure(&top_n(&candidates, RANKING_LENGTH, RankingOrder::Highest), RANKING_LENGTH, RankingOrder::Highest, selection.year);
        let gdp_fig_low = gdp_ranking_figure(&top_n(&candidates, RANKING_LENGTH, RankingOrder::Lowest), RANKING_LENGTH, RankingOrder::Lowest, selection.year);

        tracing::Span::current().record("result", "ok");
        Ok(DashboardFigures { ts_fig, corr_fig, gdp_fig_high, gdp_fig_low })
    }

    pub fn summary(&self) -> SummaryOutputType {
        let years = self.table.years();
        SummaryOutputType {
            rows: self.table.len(),
            countries: self.table.countries().len(),
            subjects: self.table.subjects(),
            first_year: years.first().copied(),
            last_year: years.last().copied(),
            loaded_at: self.table.loaded_at(),
        }
    }
}
