use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    model::models::{MeatAndGdpRecord, SubjectSelection},
    service::analysis::{CountryGdp, RankingOrder, SubjectCorrelation},
};

/**
 * A plotly figure: traces plus layout, serialized as the JSON `Plotly.react` expects.
 */
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AxisValues {
    Years(Vec<i32>),
    Labels(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceType {
    Scattergl,
    Scatter,
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub trace_type: TraceType,
    pub x: AxisValues,
    pub y: Vec<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub texttemplate: Option<String>,
}

impl Trace {
    fn new(trace_type: TraceType, x: AxisValues, y: Vec<Option<f64>>) -> Self {
        Trace { trace_type, x, y, name: None, mode: None, line: None, marker: None, yaxis: None, texttemplate: None }
    }

    fn lines(trace_type: TraceType, name: String, points: Vec<(i32, Option<f64>)>) -> Self {
        let (years, values): (Vec<i32>, Vec<Option<f64>>) = points.into_iter().unzip();
        Trace { name: Some(name), mode: Some("lines".to_string()), ..Trace::new(trace_type, AxisValues::Years(years), values) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub color: String,
    pub width: u32,
    pub dash: String,
}

impl Line {
    fn dotted(color: &str) -> Self {
        Line { color: color.to_string(), width: 4, dash: "dot".to_string() }
    }
}

/**
 * Bar colouring. For the correlation chart `color` holds the values mapped onto `colorscale`.
 */
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub color: Vec<Option<f64>>,
    pub colorscale: Vec<(f64, String)>,
    pub cmin: f64,
    pub cmax: f64,
    pub showscale: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    pub plot_bgcolor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<AxisLayout>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<AxisLayout>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis2: Option<AxisLayout>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

impl Title {
    fn new(text: String) -> Option<Self> {
        Some(Title { text })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AxisLayout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlaying: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickformat: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub orientation: String,
    pub yanchor: String,
    pub y: f64,
    pub xanchor: String,
    pub x: f64,
}

const CONSUMPTION_COLOR: &str = "firebrick";
const GDP_COLOR: &str = "royalblue";
const BACKGROUND: &str = "white";

/**
 * Consumption against GDP per capita over time for one country, GDP on the secondary axis.
 *
 * # Arguments
 * `subject`: A single subject or all of them. With all subjects each gets its own consumption line.
 * `country`: Name of the country, used in the title.
 * `rows`: The rows of that country.
 *
 * # Returns
 * The time series figure.
 */
pub fn time_series_figure(subject: &SubjectSelection, country: &str, rows: &[&MeatAndGdpRecord]) -> Figure {
    let mut data = Vec::new();
    let gdp_points: Vec<(i32, Option<f64>)> = match subject {
        SubjectSelection::Subject(selected) => {
            let selected_rows = rows_sorted_by_year(rows.iter().copied().filter(|row| &row.subject == selected));
            let consumption = selected_rows.iter().map(|row| (row.year, Some(row.value))).collect();
            data.push(Trace { line: Some(Line::dotted(CONSUMPTION_COLOR)), ..Trace::lines(TraceType::Scattergl, "KG Consumed Per Capita".to_string(), consumption) });
            selected_rows.iter().map(|row| (row.year, row.gdp_per_capita)).collect()
        }
        SubjectSelection::All => {
            for subject in subjects_in_order(rows) {
                let consumption = rows_sorted_by_year(rows.iter().copied().filter(|row| row.subject == subject)).iter().map(|row| (row.year, Some(row.value))).collect();
                data.push(Trace::lines(TraceType::Scattergl, format!("KG {subject} Consumed Per Capita"), consumption));
            }
            gdp_per_year(rows)
        }
    };
    data.push(Trace { line: Some(Line::dotted(GDP_COLOR)), yaxis: Some("y2".to_string()), ..Trace::lines(TraceType::Scatter, "GDP Per Capita".to_string(), gdp_points) });

    Figure {
        data,
        layout: Layout {
            title: Title::new(format!("KG Consumed and GDP Per Capita for {subject} in {country}")),
            plot_bgcolor: BACKGROUND.to_string(),
            xaxis: Some(AxisLayout { title: Title::new("Year".to_string()), ..AxisLayout::default() }),
            yaxis: Some(AxisLayout { title: Title::new("KG Consumed Per Capita".to_string()), ..AxisLayout::default() }),
            yaxis2: Some(AxisLayout {
                title: Title::new("GDP Per Capita".to_string()),
                overlaying: Some("y".to_string()),
                side: Some("right".to_string()),
                ..AxisLayout::default()
            }),
            legend: Some(Legend { orientation: "h".to_string(), yanchor: "bottom".to_string(), y: 1.02, xanchor: "right".to_string(), x: 1.0 }),
        },
    }
}

/**
 * Bar chart of the per-subject correlations of one country, coloured from red (-1) to blue (1).
 */
pub fn correlation_figure(country: &str, correlations: &[SubjectCorrelation]) -> Figure {
    let subjects: Vec<String> = correlations.iter().map(|c| c.subject.clone()).collect();
    let values: Vec<Option<f64>> = correlations.iter().map(|c| c.correlation).collect();
    let trace = Trace {
        marker: Some(Marker { color: values.clone(), colorscale: vec![(0.0, "red".to_string()), (1.0, "blue".to_string())], cmin: -1.0, cmax: 1.0, showscale: true }),
        texttemplate: Some("%{y}".to_string()),
        ..Trace::new(TraceType::Bar, AxisValues::Labels(subjects), values)
    };
    Figure {
        data: vec![trace],
        layout: Layout {
            title: Title::new(format!("Correlation Bar Plot Between Value and GDP Per Capita for {country}")),
            plot_bgcolor: BACKGROUND.to_string(),
            xaxis: Some(AxisLayout { title: Title::new("SUBJECT".to_string()), ..AxisLayout::default() }),
            yaxis: Some(AxisLayout { visible: Some(false), ..AxisLayout::default() }),
            ..Layout::default()
        },
    }
}

/**
 * Bar chart of a GDP per capita ranking.
 *
 * # Arguments
 * `ranked`: The countries in ranking order, already cut to the wanted length.
 * `count`: The requested ranking length, used in the title.
 * `order`: Whether `ranked` holds the highest or the lowest values.
 * `year`: The ranked year.
 */
pub fn gdp_ranking_figure(ranked: &[CountryGdp], count: usize, order: RankingOrder, year: i32) -> Figure {
    let countries: Vec<String> = ranked.iter().map(|c| c.country.clone()).collect();
    let values: Vec<Option<f64>> = ranked.iter().map(|c| Some(c.gdp_per_capita)).collect();
    Figure {
        data: vec![Trace { texttemplate: Some("%{y:.3s}".to_string()), ..Trace::new(TraceType::Bar, AxisValues::Labels(countries), values) }],
        layout: Layout {
            title: Title::new(format!("Top {count} {} GDP Per Capitas for {year}", order.label())),
            plot_bgcolor: BACKGROUND.to_string(),
            xaxis: Some(AxisLayout::default()),
            yaxis: Some(AxisLayout { visible: Some(false), tickformat: Some(",".to_string()), ..AxisLayout::default() }),
            ..Layout::default()
        },
    }
}

fn rows_sorted_by_year<'a>(rows: impl Iterator<Item = &'a MeatAndGdpRecord>) -> Vec<&'a MeatAndGdpRecord> {
    let mut rows: Vec<&MeatAndGdpRecord> = rows.collect();
    rows.sort_by_key(|row| row.year);
    rows
}

fn subjects_in_order(rows: &[&MeatAndGdpRecord]) -> Vec<String> {
    let mut subjects: Vec<String> = Vec::new();
    for row in rows {
        if !subjects.contains(&row.subject) {
            subjects.push(row.subject.clone());
        }
    }
    subjects
}

/**
 * One GDP point per year: the first value present among the subjects of that year.
 */
fn gdp_per_year(rows: &[&MeatAndGdpRecord]) -> Vec<(i32, Option<f64>)> {
    let mut per_year: BTreeMap<i32, Option<f64>> = BTreeMap::new();
    for row in rows {
        let entry = per_year.entry(row.year).or_insert(None);
        if entry.is_none() {
            *entry = row.gdp_per_capita;
        }
    }
    per_year.into_iter().collect()
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    fn record(subject: &str, year: i32, value: f64, gdp: Option<f64>) -> MeatAndGdpRecord {
        MeatAndGdpRecord { country: "Australia".to_string(), subject: subject.to_string(), year, value, gdp_per_capita: gdp }
    }

    fn rows() -> Vec<MeatAndGdpRecord> {
        vec![
            record("BEEF", 2021, 20.5, Some(52000.0)),
            record("BEEF", 2020, 21.0, Some(51000.0)),
            record("PIG", 2020, 20.0, None),
            record("PIG", 2021, 21.5, Some(52000.0)),
        ]
    }

    #[test]
    fn test_time_series_single_subject() {
        let rows = rows();
        let refs: Vec<&MeatAndGdpRecord> = rows.iter().collect();
        let figure = time_series_figure(&SubjectSelection::Subject("BEEF".to_string()), "Australia", &refs);
        assert_eq!(figure.data.len(), 2);
        assert_eq!(figure.data[0].name.as_deref(), Some("KG Consumed Per Capita"));
        assert_eq!(figure.data[0].x, AxisValues::Years(vec![2020, 2021]));
        assert_eq!(figure.data[0].y, vec![Some(21.0), Some(20.5)]);
        assert_eq!(figure.data[1].yaxis.as_deref(), Some("y2"));
        assert_eq!(figure.data[1].y, vec![Some(51000.0), Some(52000.0)]);
        assert_eq!(figure.layout.title.as_ref().unwrap().text, "KG Consumed and GDP Per Capita for BEEF in Australia");
    }

    #[test]
    fn test_time_series_all_subjects() {
        let rows = rows();
        let refs: Vec<&MeatAndGdpRecord> = rows.iter().collect();
        let figure = time_series_figure(&SubjectSelection::All, "Australia", &refs);
        let names: Vec<&str> = figure.data.iter().filter_map(|t| t.name.as_deref()).collect();
        assert_eq!(names, vec!["KG BEEF Consumed Per Capita", "KG PIG Consumed Per Capita", "GDP Per Capita"]);
        assert_eq!(figure.data[2].x, AxisValues::Years(vec![2020, 2021]));
        assert_eq!(figure.data[2].y, vec![Some(51000.0), Some(52000.0)]);
        assert_eq!(figure.layout.title.as_ref().unwrap().text, "KG Consumed and GDP Per Capita for ALL in Australia");
    }

    #[test]
    fn test_correlation_figure() {
        let correlations = vec![
            SubjectCorrelation { country: "Australia".to_string(), subject: "BEEF".to_string(), correlation: Some(-0.42) },
            SubjectCorrelation { country: "Australia".to_string(), subject: "PIG".to_string(), correlation: None },
        ];
        let figure = correlation_figure("Australia", &correlations);
        assert_eq!(figure.data[0].x, AxisValues::Labels(vec!["BEEF".to_string(), "PIG".to_string()]));
        assert_eq!(figure.data[0].y, vec![Some(-0.42), None]);
        assert_eq!(figure.layout.yaxis.as_ref().unwrap().visible, Some(false));
        assert_eq!(figure.layout.title.as_ref().unwrap().text, "Correlation Bar Plot Between Value and GDP Per Capita for Australia");
    }

    #[test]
    fn test_gdp_ranking_figure_json() {
        let ranked = vec![CountryGdp { country: "Denmark".to_string(), gdp_per_capita: 68000.0 }];
        let figure = gdp_ranking_figure(&ranked, 5, RankingOrder::Highest, 2021);
        let value = serde_json::to_value(&figure).unwrap();
        assert_eq!(value["data"][0]["type"], json!("bar"));
        assert_eq!(value["data"][0]["x"], json!(["Denmark"]));
        assert_eq!(value["data"][0]["y"], json!([68000.0]));
        assert_eq!(value["data"][0]["texttemplate"], json!("%{y:.3s}"));
        assert!(value["data"][0].get("marker").is_none());
        assert_eq!(value["layout"]["title"]["text"], json!("Top 5 Highest GDP Per Capitas for 2021"));
        assert_eq!(value["layout"]["yaxis"]["tickformat"], json!(","));
        assert_eq!(value["layout"]["plot_bgcolor"], json!("white"));
    }
}
