use std::path::PathBuf;

use csv::StringRecord;
use tracing::{Instrument, debug, instrument};

use crate::model::{
    apperror::{ApplicationError, ErrorType},
    models::{GdpWideRow, GdpWideTable, MeatConsumptionRecord},
};

/**
 * Columns the meat consumption source must provide.
 */
const MEAT_COLUMNS: [&str; 7] = ["LOCATION", "INDICATOR", "SUBJECT", "MEASURE", "FREQUENCY", "TIME", "Value"];

const COUNTRY_CODE_COLUMN: &str = "Country Code";
const COUNTRY_NAME_COLUMN: &str = "Country Name";

/**
 * Descriptive GDP columns that are dropped before reshaping.
 */
const GDP_DISCARDED_COLUMNS: [&str; 2] = ["Series Name", "Series Code"];

const BYTE_ORDER_MARK: char = '\u{feff}';

/**
 * Where a source is read from.
 */
#[derive(Debug, Clone, PartialEq)]
pub enum SourceLocation {
    Url(String),
    Path(PathBuf),
}

impl From<&str> for SourceLocation {
    fn from(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            SourceLocation::Url(location.to_string())
        } else {
            SourceLocation::Path(PathBuf::from(location))
        }
    }
}

/**
 * DAO for reading the raw meat consumption and GDP sources.
 */
pub struct SourceDao {
    /**
     * HTTP client used for URL sources.
     */
    client: reqwest::Client,
}

impl SourceDao {
    /**
     * Creates a new instance of `SourceDao`.
     *
     * # Returns
     * A new instance of `SourceDao`.
     */
    pub fn new() -> Self {
        SourceDao { client: reqwest::Client::new() }
    }

    /**
     * Reads and parses the meat consumption source.
     *
     * # Arguments
     * `location`: Path or URL of the source.
     *
     * # Returns
     * A Result containing the source rows or an `ApplicationError`.
     */
    #[instrument(skip(self), fields(result))]
    pub async fn load_meat_consumption(&self, location: &SourceLocation) -> Result<Vec<MeatConsumptionRecord>, ApplicationError> {
        let span = tracing::Span::current();
        let text = self.read_source(location).instrument(span).await?;
        let records = parse_meat_consumption(&text)?;
        debug!("Read {} meat consumption rows", records.len());
        Ok(records)
    }

    /**
     * Reads and parses the GDP per capita source.
     *
     * # Arguments
     * `location`: Path or URL of the source.
     * `row_limit`: Number of data rows to keep. Later rows are footer.
     * `missing_value_sentinel`: Cell text that marks a missing value.
     *
     * # Returns
     * A Result containing the wide GDP table or an `ApplicationError`.
     */
    #[instrument(skip(self), fields(result))]
    pub async fn load_gdp_per_capita(&self, location: &SourceLocation, row_limit: usize, missing_value_sentinel: &str) -> Result<GdpWideTable, ApplicationError> {
        let span = tracing::Span::current();
        let text = self.read_source(location).instrument(span).await?;
        let table = parse_gdp_per_capita(&text, row_limit, missing_value_sentinel)?;
        debug!("Read {} GDP rows with {} year columns", table.rows.len(), table.years.len());
        Ok(table)
    }

    /**
     * Reads the whole source into memory.
     */
    async fn read_source(&self, location: &SourceLocation) -> Result<String, ApplicationError> {
        match location {
            SourceLocation::Url(url) => {
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .and_then(reqwest::Response::error_for_status)
                    .map_err(|err| ApplicationError::new(ErrorType::SourceRetrieval, format!("Failed to fetch {url}: {err}")))?;
                response.text().await.map_err(|err| ApplicationError::new(ErrorType::SourceRetrieval, format!("Failed to read body of {url}: {err}")))
            }
            SourceLocation::Path(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|err| ApplicationError::new(ErrorType::SourceRetrieval, format!("Failed to read {}: {err}", path.display()))),
        }
    }
}

/**
 * Parses the long-form meat consumption CSV.
 *
 * # Arguments
 * `text`: The CSV contents including the header row.
 *
 * # Returns
 * A Result containing the rows in source order or a schema error.
 */
pub fn parse_meat_consumption(text: &str) -> Result<Vec<MeatConsumptionRecord>, ApplicationError> {
    let mut reader = csv::ReaderBuilder::new().from_reader(strip_byte_order_mark(text).as_bytes());
    let headers = reader.headers().map_err(|err| ApplicationError::new(ErrorType::Schema, format!("Failed to read meat consumption header: {err}")))?.clone();
    for column in MEAT_COLUMNS {
        column_index(&headers, column, "meat consumption")?;
    }
    reader
        .deserialize::<MeatConsumptionRecord>()
        .enumerate()
        .map(|(row, result)| result.map_err(|err| ApplicationError::new(ErrorType::Schema, format!("Invalid meat consumption row {row}: {err}"))))
        .collect()
}

/**
 * Parses the wide-form GDP CSV.
 *
 * The two descriptive series columns are dropped, only the first `row_limit` data rows are read, and every
 * remaining column besides the country code and name must start with a four digit year.
 *
 * # Arguments
 * `text`: The CSV contents including the header row.
 * `row_limit`: Number of data rows to keep.
 * `missing_value_sentinel`: Cell text that marks a missing value.
 *
 * # Returns
 * A Result containing the wide GDP table or a schema error.
 */
pub fn parse_gdp_per_capita(text: &str, row_limit: usize, missing_value_sentinel: &str) -> Result<GdpWideTable, ApplicationError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(strip_byte_order_mark(text).as_bytes());
    let headers = reader.headers().map_err(|err| ApplicationError::new(ErrorType::Schema, format!("Failed to read GDP header: {err}")))?.clone();

    let code_index = column_index(&headers, COUNTRY_CODE_COLUMN, "GDP")?;
    let name_index = column_index(&headers, COUNTRY_NAME_COLUMN, "GDP")?;
    let mut discarded = vec![code_index, name_index];
    for column in GDP_DISCARDED_COLUMNS {
        discarded.push(column_index(&headers, column, "GDP")?);
    }

    let year_columns: Vec<(usize, i32)> = headers
        .iter()
        .enumerate()
        .filter(|(index, _)| !discarded.contains(index))
        .map(|(index, header)| year_of_column(header).map(|year| (index, year)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut rows = Vec::new();
    for (row, result) in reader.records().take(row_limit).enumerate() {
        let record = result.map_err(|err| ApplicationError::new(ErrorType::Schema, format!("Invalid GDP row {row}: {err}")))?;
        let values = year_columns
            .iter()
            .map(|(index, year)| parse_gdp_cell(record.get(*index).unwrap_or(""), missing_value_sentinel).map_err(|msg| ApplicationError::new(ErrorType::Schema, format!("GDP row {row}, year {year}: {msg}"))))
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(GdpWideRow {
            country_code: record.get(code_index).unwrap_or("").to_string(),
            country_name: record.get(name_index).unwrap_or("").to_string(),
            values,
        });
    }

    Ok(GdpWideTable { years: year_columns.into_iter().map(|(_, year)| year).collect(), rows })
}

/**
 * Reduces a year column header such as `2021 [YR2021]` to its year.
 */
fn year_of_column(header: &str) -> Result<i32, ApplicationError> {
    let prefix: String = header.chars().take(4).collect();
    prefix.trim().parse::<i32>().map_err(|_err| ApplicationError::new(ErrorType::Schema, format!("GDP column '{header}' does not start with a year")))
}

fn parse_gdp_cell(cell: &str, missing_value_sentinel: &str) -> Result<Option<f64>, String> {
    let cell = cell.trim();
    if cell.is_empty() || cell == missing_value_sentinel {
        return Ok(None);
    }
    cell.parse::<f64>().map(Some).map_err(|_err| format!("'{cell}' is not a number"))
}

fn column_index(headers: &StringRecord, column: &str, source: &str) -> Result<usize, ApplicationError> {
    headers
        .iter()
        .position(|header| header == column)
        .ok_or_else(|| ApplicationError::new(ErrorType::Schema, format!("The {source} source is missing the '{column}' column")))
}

fn strip_byte_order_mark(text: &str) -> &str {
    text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text)
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use super::*;

    const MEAT_CSV: &str = "LOCATION,INDICATOR,SUBJECT,MEASURE,FREQUENCY,TIME,Value,Flag Codes\n\
        AUS,MEATCONSUMP,BEEF,KG_CAP,A,2021,20.5,\n\
        AUS,MEATCONSUMP,BEEF,THND_TONNE,A,2021,1200.0,\n\
        JPN,MEATCONSUMP,PIG,KG_CAP,A,2020,13.1,E\n";

    const GDP_CSV: &str = "\u{feff}Country Name,Country Code,Series Name,Series Code,2020 [YR2020],2021 [YR2021]\n\
        Australia,AUS,GDP per capita (current US$),NY.GDP.PCAP.CD,51700.5,52000\n\
        Japan,JPN,GDP per capita (current US$),NY.GDP.PCAP.CD,40000,..\n\
        Data from database: World Development Indicators\n\
        Last Updated: 06/30/2022\n";

    #[test]
    fn test_source_location_from_str() {
        assert_eq!(SourceLocation::from("https://example.org/a.csv"), SourceLocation::Url("https://example.org/a.csv".to_string()));
        assert_eq!(SourceLocation::from("http://example.org/a.csv"), SourceLocation::Url("http://example.org/a.csv".to_string()));
        assert_eq!(SourceLocation::from("./data/a.csv"), SourceLocation::Path(PathBuf::from("./data/a.csv")));
    }

    #[test]
    fn test_parse_meat_consumption() {
        let records = parse_meat_consumption(MEAT_CSV).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].location, "AUS");
        assert_eq!(records[0].subject, "BEEF");
        assert_eq!(records[0].measure, "KG_CAP");
        assert_eq!(records[0].time, 2021);
        assert_eq!(records[0].value, 20.5);
        assert_eq!(records[0].flag_codes, None);
        assert_eq!(records[2].flag_codes, Some("E".to_string()));
    }

    #[test]
    fn test_parse_meat_consumption_missing_column() {
        let err = parse_meat_consumption("LOCATION,SUBJECT,TIME,Value\nAUS,BEEF,2021,1.0\n").unwrap_err();
        assert_eq!(err.error_type, ErrorType::Schema);
        assert!(err.message.contains("INDICATOR"));
    }

    #[test]
    fn test_parse_meat_consumption_bad_value() {
        let err = parse_meat_consumption("LOCATION,INDICATOR,SUBJECT,MEASURE,FREQUENCY,TIME,Value,Flag Codes\nAUS,M,BEEF,KG_CAP,A,2021,lots,\n").unwrap_err();
        assert_eq!(err.error_type, ErrorType::Schema);
    }

    #[test]
    fn test_parse_gdp_per_capita() {
        let table = parse_gdp_per_capita(GDP_CSV, 2, "..").unwrap();
        assert_eq!(table.years, vec![2020, 2021]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].country_code, "AUS");
        assert_eq!(table.rows[0].country_name, "Australia");
        assert_eq!(table.rows[0].values, vec![Some(51700.5), Some(52000.0)]);
        assert_eq!(table.rows[1].values, vec![Some(40000.0), None]);
    }

    #[test]
    fn test_parse_gdp_per_capita_truncates_footer() {
        let table = parse_gdp_per_capita(GDP_CSV, 1, "..").unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].country_code, "AUS");
    }

    #[test]
    fn test_parse_gdp_per_capita_footer_inside_limit() {
        let table = parse_gdp_per_capita(GDP_CSV, 266, "..").unwrap();
        assert_eq!(table.rows.len(), 4);
        assert_eq!(table.rows[2].country_code, "");
        assert!(table.rows[2].values.iter().all(Option::is_none));
    }

    #[test]
    fn test_parse_gdp_per_capita_missing_series_column() {
        let err = parse_gdp_per_capita("Country Name,Country Code,2021 [YR2021]\nAustralia,AUS,52000\n", 266, "..").unwrap_err();
        assert_eq!(err.error_type, ErrorType::Schema);
        assert!(err.message.contains("Series Name"));
    }

    #[test]
    fn test_parse_gdp_per_capita_non_year_column() {
        let err = parse_gdp_per_capita("Country Name,Country Code,Series Name,Series Code,Notes\nAustralia,AUS,a,b,c\n", 266, "..").unwrap_err();
        assert_eq!(err.error_type, ErrorType::Schema);
        assert!(err.message.contains("Notes"));
    }

    #[test]
    fn test_parse_gdp_per_capita_sentinel_is_never_a_number() {
        let table = parse_gdp_per_capita("Country Name,Country Code,Series Name,Series Code,2019 [YR2019]\nAruba,ABW,a,b,..\nChad,TCD,a,b,\n", 266, "..").unwrap();
        assert_eq!(table.rows[0].values, vec![None]);
        assert_eq!(table.rows[1].values, vec![None]);
    }

    #[actix_web::test]
    async fn test_load_sources_from_path() {
        let mut meat_file = tempfile::NamedTempFile::new().unwrap();
        meat_file.write_all(MEAT_CSV.as_bytes()).unwrap();
        let mut gdp_file = tempfile::NamedTempFile::new().unwrap();
        gdp_file.write_all(GDP_CSV.as_bytes()).unwrap();

        let dao = SourceDao::new();
        let meat = dao.load_meat_consumption(&SourceLocation::Path(meat_file.path().to_path_buf())).await.unwrap();
        assert_eq!(meat.len(), 3);
        let gdp = dao.load_gdp_per_capita(&SourceLocation::Path(gdp_file.path().to_path_buf()), 2, "..").await.unwrap();
        assert_eq!(gdp.rows.len(), 2);
    }

    #[actix_web::test]
    async fn test_load_source_missing_file() {
        let dao = SourceDao::new();
        let err = dao.load_meat_consumption(&SourceLocation::Path(PathBuf::from("/nonexistent/meat.csv"))).await.unwrap_err();
        assert_eq!(err.error_type, ErrorType::SourceRetrieval);
    }
}
