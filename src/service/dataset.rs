use tracing::{Instrument, info, instrument, warn};

use crate::{
    dao::sources::{SourceDao, SourceLocation},
    model::{apperror::ApplicationError, config::Sources, models::MeatAndGdpTable},
    service::merger::{merge_meat_and_gdp, reshape_gdp_to_long},
};

/**
 * Builds the merged meat consumption and GDP per capita table from the configured sources.
 */
pub struct DatasetService {
    /**
     * The DAO reading the raw sources.
     */
    source_dao: SourceDao,
}

impl DatasetService {
    /**
     * Creates a new instance of `DatasetService`.
     *
     * # Arguments
     * `source_dao`: The DAO reading the raw sources.
     *
     * # Returns
     * A new instance of `DatasetService`.
     */
    pub fn new(source_dao: SourceDao) -> Self {
        DatasetService { source_dao }
    }

    /**
     * Loads both sources, reshapes the GDP source to long form and merges the two.
     *
     * # Arguments
     * `sources`: Locations and layout of the sources.
     *
     * # Returns
     * A Result containing the merged table or an `ApplicationError` from reading or parsing either source.
     */
    #[instrument(skip(self, sources), fields(meat_source = %sources.meat_source, gdp_source = %sources.gdp_source))]
    pub async fn generate_meat_and_gdp_table(&self, sources: &Sources) -> Result<MeatAndGdpTable, ApplicationError> {
        let span = tracing::Span::current();
        let meat = self.source_dao.load_meat_consumption(&SourceLocation::from(sources.meat_source.as_str())).instrument(span.clone()).await?;
        let gdp_wide = self
            .source_dao
            .load_gdp_per_capita(&SourceLocation::from(sources.gdp_source.as_str()), sources.gdp_row_limit, &sources.missing_value_sentinel)
            .instrument(span)
            .await?;
        let gdp_long = reshape_gdp_to_long(&gdp_wide);
        let table = merge_meat_and_gdp(&meat, &gdp_long);
        if table.is_empty() {
            warn!("No meat consumption row matched a GDP row, the dashboard will have nothing to show");
        } else {
            info!("Merged table has {} rows for {} countries", table.len(), table.countries().len());
        }
        Ok(table)
    }
}
