use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::apperror::{ApplicationError, ErrorType};

/**
 * Subject option meaning "every meat category".
 */
pub const ALL_SUBJECTS: &str = "ALL";

/**
 * The only measure kept in the merged table.
 */
pub const KG_PER_CAPITA_MEASURE: &str = "KG_CAP";

/**
 * One row of the OECD meat consumption source.
 */
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MeatConsumptionRecord {
    #[serde(rename = "LOCATION")]
    pub location: String,
    #[serde(rename = "INDICATOR")]
    pub indicator: String,
    #[serde(rename = "SUBJECT")]
    pub subject: String,
    #[serde(rename = "MEASURE")]
    pub measure: String,
    #[serde(rename = "FREQUENCY")]
    pub frequency: String,
    #[serde(rename = "TIME")]
    pub time: i32,
    #[serde(rename = "Value")]
    pub value: f64,
    #[serde(rename = "Flag Codes", default)]
    pub flag_codes: Option<String>,
}

/**
 * GDP per capita source in its wide form: one row per country, one value per year column.
 * `years` holds the year of each value column after the header was reduced to its first four characters.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct GdpWideTable {
    pub years: Vec<i32>,
    pub rows: Vec<GdpWideRow>,
}

/**
 * One country of the wide GDP table. `values` is aligned with `GdpWideTable::years`.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct GdpWideRow {
    pub country_code: String,
    pub country_name: String,
    pub values: Vec<Option<f64>>,
}

/**
 * One (country, year) pair of the GDP source in long form.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct GdpRecord {
    pub country_code: String,
    pub country_name: String,
    pub year: i32,
    pub gdp_per_capita: Option<f64>,
}

/**
 * One row of the merged analysis table.
 */
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeatAndGdpRecord {
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "SUBJECT")]
    pub subject: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Value")]
    pub value: f64,
    #[serde(rename = "GDP Per Capita")]
    pub gdp_per_capita: Option<f64>,
}

/**
 * The merged meat consumption and GDP per capita table.
 *
 * Built once at startup and never modified afterwards; every accessor borrows.
 */
#[derive(Debug, Clone)]
pub struct MeatAndGdpTable {
    records: Vec<MeatAndGdpRecord>,
    loaded_at: DateTime<Utc>,
}

impl MeatAndGdpTable {
    /**
     * Creates a new table from merged records.
     *
     * # Arguments
     * `records`: The merged records in source order.
     *
     * # Returns
     * A new instance of `MeatAndGdpTable` stamped with the current time.
     */
    pub fn new(records: Vec<MeatAndGdpRecord>) -> Self {
        MeatAndGdpTable { records, loaded_at: Utc::now() }
    }

    pub fn records(&self) -> &[MeatAndGdpRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /**
     * Unique country names in alphabetical order.
     */
    pub fn countries(&self) -> Vec<String> {
        self.records.iter().map(|record| record.country.clone()).collect::<BTreeSet<String>>().into_iter().collect()
    }

    /**
     * Unique years in ascending order.
     */
    pub fn years(&self) -> Vec<i32> {
        self.records.iter().map(|record| record.year).collect::<BTreeSet<i32>>().into_iter().collect()
    }

    /**
     * Unique subjects in the order they first appear.
     */
    pub fn subjects(&self) -> Vec<String> {
        let mut subjects: Vec<String> = Vec::new();
        for record in &self.records {
            if !subjects.contains(&record.subject) {
                subjects.push(record.subject.clone());
            }
        }
        subjects
    }

    pub fn for_country(&self, country: &str) -> Vec<&MeatAndGdpRecord> {
        self.records.iter().filter(|record| record.country == country).collect()
    }

    pub fn for_year(&self, year: i32) -> Vec<&MeatAndGdpRecord> {
        self.records.iter().filter(|record| record.year == year).collect()
    }
}

/**
 * Meat type selection: a single subject or every subject.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectSelection {
    All,
    Subject(String),
}

impl FromStr for SubjectSelection {
    type Err = ApplicationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "" => Err(ApplicationError::new(ErrorType::Validation, "Subject must not be empty".to_string())),
            ALL_SUBJECTS => Ok(SubjectSelection::All),
            subject => Ok(SubjectSelection::Subject(subject.to_string())),
        }
    }
}

impl fmt::Display for SubjectSelection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SubjectSelection::All => write!(f, "{ALL_SUBJECTS}"),
            SubjectSelection::Subject(subject) => write!(f, "{subject}"),
        }
    }
}

/**
 * The state of the three dashboard controls.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub subject: SubjectSelection,
    pub country: String,
    pub year: i32,
}

impl Selection {
    pub fn new(subject: SubjectSelection, country: String, year: i32) -> Self {
        Selection { subject, country, year }
    }

    /**
     * Checks that the selection refers to values present in the table.
     *
     * # Arguments
     * `table`: The merged table the selection is applied to.
     *
     * # Returns
     * The selection itself or a validation error naming the unknown value.
     */
    pub fn validate(self, table: &MeatAndGdpTable) -> Result<Self, ApplicationError> {
        if let SubjectSelection::Subject(subject) = &self.subject {
            if !table.records().iter().any(|record| &record.subject == subject) {
                return Err(ApplicationError::new(ErrorType::Validation, format!("Unknown subject: {subject}")));
            }
        }
        if !table.records().iter().any(|record| record.country == self.country) {
            return Err(ApplicationError::new(ErrorType::Validation, format!("Unknown country: {}", self.country)));
        }
        if !table.records().iter().any(|record| record.year == self.year) {
            return Err(ApplicationError::new(ErrorType::Validation, format!("Unknown year: {}", self.year)));
        }
        Ok(self)
    }
}

/**
 * Options and initial values for the three controls.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct ControlsOutputType {
    pub subjects: Vec<String>,
    pub countries: Vec<String>,
    pub years: Vec<i32>,
    pub default_subject: String,
    pub default_country: Option<String>,
    pub default_year: Option<i32>,
}

/**
 * Shape of the merged table.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryOutputType {
    pub rows: usize,
    pub countries: usize,
    pub subjects: Vec<String>,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
    pub loaded_at: DateTime<Utc>,
}
