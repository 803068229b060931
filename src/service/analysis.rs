use std::collections::BTreeMap;

use crate::model::models::{MeatAndGdpRecord, MeatAndGdpTable};

/**
 * Correlation between consumption and GDP per capita for one (country, subject) group.
 * `correlation` is `None` when it is undefined for the group.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectCorrelation {
    pub country: String,
    pub subject: String,
    pub correlation: Option<f64>,
}

/**
 * GDP per capita of one country in the ranked year.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct CountryGdp {
    pub country: String,
    pub gdp_per_capita: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingOrder {
    Highest,
    Lowest,
}

impl RankingOrder {
    pub fn label(self) -> &'static str {
        match self {
            RankingOrder::Highest => "Highest",
            RankingOrder::Lowest => "Lowest",
        }
    }
}

/**
 * Correlates `Value` with `GDP Per Capita` per (country, subject).
 *
 * Groups come back sorted by country then subject. Only rows with a GDP value take part, and the
 * correlation is rounded to two decimals.
 *
 * # Arguments
 * `rows`: The rows to group, usually one country of the merged table.
 *
 * # Returns
 * One entry per group.
 */
pub fn correlation_by_group(rows: &[&MeatAndGdpRecord]) -> Vec<SubjectCorrelation> {
    let mut groups: BTreeMap<(&str, &str), Vec<(f64, f64)>> = BTreeMap::new();
    for row in rows {
        let pairs = groups.entry((row.country.as_str(), row.subject.as_str())).or_default();
        if let Some(gdp) = row.gdp_per_capita {
            pairs.push((row.value, gdp));
        }
    }
    groups
        .into_iter()
        .map(|((country, subject), pairs)| SubjectCorrelation {
            country: country.to_string(),
            subject: subject.to_string(),
            correlation: pearson(&pairs).map(round_to_cents),
        })
        .collect()
}

/**
 * Pearson correlation of paired observations. Undefined below two pairs or without variance.
 */
pub fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let count = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / count;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / count;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in pairs {
        let (dx, dy) = (x - mean_x, y - mean_y);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/**
 * GDP per capita of every country in `year`, sorted by country name.
 *
 * A country contributes its first non-missing GDP value in the year. Countries without one are dropped,
 * never counted as zero. Values are rounded to two decimals.
 *
 * # Arguments
 * `table`: The merged table.
 * `year`: The year to rank.
 *
 * # Returns
 * The ranking candidates.
 */
pub fn gdp_by_country(table: &MeatAndGdpTable, year: i32) -> Vec<CountryGdp> {
    let mut first_gdp: BTreeMap<&str, Option<f64>> = BTreeMap::new();
    for row in table.for_year(year) {
        let entry = first_gdp.entry(row.country.as_str()).or_insert(None);
        if entry.is_none() {
            *entry = row.gdp_per_capita;
        }
    }
    first_gdp
        .into_iter()
        .filter_map(|(country, gdp)| gdp.map(|gdp_per_capita| CountryGdp { country: country.to_string(), gdp_per_capita: round_to_cents(gdp_per_capita) }))
        .collect()
}

/**
 * The `count` countries with the highest or lowest GDP per capita.
 *
 * The sort is stable, so ties keep country name order.
 */
pub fn top_n(candidates: &[CountryGdp], count: usize, order: RankingOrder) -> Vec<CountryGdp> {
    let mut ranked = candidates.to_vec();
    match order {
        RankingOrder::Highest => ranked.sort_by(|a, b| b.gdp_per_capita.total_cmp(&a.gdp_per_capita)),
        RankingOrder::Lowest => ranked.sort_by(|a, b| a.gdp_per_capita.total_cmp(&b.gdp_per_capita)),
    }
    ranked.truncate(count);
    ranked
}

pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod test {
    use super::*;

    fn record(country: &str, subject: &str, year: i32, value: f64, gdp: Option<f64>) -> MeatAndGdpRecord {
        MeatAndGdpRecord { country: country.to_string(), subject: subject.to_string(), year, value, gdp_per_capita: gdp }
    }

    fn ranking_table() -> MeatAndGdpTable {
        let countries = [("Australia", 52000.0), ("Brazil", 7500.0), ("Chile", 16000.123), ("Denmark", 68000.0), ("Egypt", 3800.0), ("France", 43500.0), ("Ghana", 2400.0), ("Haiti", 1800.0), ("India", 2250.0), ("Japan", 39000.0), ("Kenya", 2100.0)];
        let mut records: Vec<MeatAndGdpRecord> = countries.iter().map(|(country, gdp)| record(country, "BEEF", 2021, 10.0, Some(*gdp))).collect();
        records.push(record("Peru", "BEEF", 2021, 6.0, None));
        records.push(record("Denmark", "PIG", 2020, 50.0, Some(60000.0)));
        MeatAndGdpTable::new(records)
    }

    #[test]
    fn test_pearson() {
        assert_eq!(pearson(&[(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)]), Some(1.0));
        assert_eq!(pearson(&[(1.0, 6.0), (2.0, 4.0), (3.0, 2.0)]), Some(-1.0));
        assert_eq!(pearson(&[(1.0, 2.0)]), None);
        assert_eq!(pearson(&[(1.0, 2.0), (1.0, 3.0)]), None);
        let r = pearson(&[(1.0, 1.0), (2.0, 3.0), (3.0, 2.0), (4.0, 5.0)]).unwrap();
        assert!((r - 5.5 / 43.75_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_correlation_by_group() {
        let rows = [
            record("Australia", "PIG", 2019, 20.0, Some(50000.0)),
            record("Australia", "BEEF", 2019, 22.0, Some(50000.0)),
            record("Australia", "PIG", 2020, 21.0, Some(51000.0)),
            record("Australia", "BEEF", 2020, 21.0, Some(51000.0)),
            record("Australia", "BEEF", 2021, 20.0, Some(52000.0)),
            record("Australia", "PIG", 2021, 22.0, None),
            record("Australia", "SHEEP", 2021, 7.0, Some(52000.0)),
        ];
        let refs: Vec<&MeatAndGdpRecord> = rows.iter().collect();
        let correlations = correlation_by_group(&refs);
        let subjects: Vec<&str> = correlations.iter().map(|c| c.subject.as_str()).collect();
        assert_eq!(subjects, vec!["BEEF", "PIG", "SHEEP"]);
        assert_eq!(correlations[0].correlation, Some(-1.0));
        assert_eq!(correlations[1].correlation, Some(1.0));
        assert_eq!(correlations[2].correlation, None);
        assert!(correlations.iter().all(|c| c.country == "Australia"));
    }

    #[test]
    fn test_gdp_by_country_drops_missing() {
        let candidates = gdp_by_country(&ranking_table(), 2021);
        assert_eq!(candidates.len(), 11);
        assert!(candidates.iter().all(|c| c.country != "Peru"));
        assert_eq!(candidates[2], CountryGdp { country: "Chile".to_string(), gdp_per_capita: 16000.12 });
    }

    #[test]
    fn test_gdp_by_country_takes_first_present_value() {
        let table = MeatAndGdpTable::new(vec![record("Chad", "BEEF", 2021, 3.0, None), record("Chad", "PIG", 2021, 1.0, Some(700.0)), record("Chad", "SHEEP", 2021, 2.0, Some(800.0))]);
        assert_eq!(gdp_by_country(&table, 2021), vec![CountryGdp { country: "Chad".to_string(), gdp_per_capita: 700.0 }]);
        assert!(gdp_by_country(&table, 2020).is_empty());
    }

    #[test]
    fn test_top_n() {
        let candidates = gdp_by_country(&ranking_table(), 2021);
        let highest: Vec<String> = top_n(&candidates, 3, RankingOrder::Highest).into_iter().map(|c| c.country).collect();
        let lowest: Vec<String> = top_n(&candidates, 3, RankingOrder::Lowest).into_iter().map(|c| c.country).collect();
        assert_eq!(highest, vec!["Denmark", "Australia", "France"]);
        assert_eq!(lowest, vec!["Haiti", "Kenya", "India"]);
        assert_eq!(top_n(&candidates, 50, RankingOrder::Highest).len(), candidates.len());
    }

    #[test]
    fn test_top_n_tails_are_disjoint_and_match_full_ranking() {
        let candidates = gdp_by_country(&ranking_table(), 2021);
        let count = 5;
        assert!(candidates.len() > 2 * count);
        let highest = top_n(&candidates, count, RankingOrder::Highest);
        let lowest = top_n(&candidates, count, RankingOrder::Lowest);
        assert!(highest.iter().all(|h| lowest.iter().all(|l| l.country != h.country)));

        let full = top_n(&candidates, candidates.len(), RankingOrder::Lowest);
        let mut union: Vec<CountryGdp> = lowest.iter().chain(highest.iter()).cloned().collect();
        union.sort_by(|a, b| a.gdp_per_capita.total_cmp(&b.gdp_per_capita));
        let mut tails: Vec<CountryGdp> = full[..count].to_vec();
        tails.extend_from_slice(&full[full.len() - count..]);
        assert_eq!(union, tails);
    }

    #[test]
    fn test_round_to_cents() {
        assert_eq!(round_to_cents(52000.456), 52000.46);
        assert_eq!(round_to_cents(-0.7349), -0.73);
    }
}
