use std::collections::BTreeMap;

use tracing::info;

use crate::model::models::{GdpRecord, GdpWideTable, KG_PER_CAPITA_MEASURE, MeatAndGdpRecord, MeatConsumptionRecord, MeatAndGdpTable};

/**
 * Pivots the wide GDP table into one record per (country, year).
 *
 * Records are emitted year column by year column, countries in source order within each year.
 *
 * # Arguments
 * `wide`: The wide GDP table.
 *
 * # Returns
 * The long-form GDP records.
 */
pub fn reshape_gdp_to_long(wide: &GdpWideTable) -> Vec<GdpRecord> {
    wide.years
        .iter()
        .enumerate()
        .flat_map(|(column, year)| {
            wide.rows.iter().map(move |row| GdpRecord {
                country_code: row.country_code.clone(),
                country_name: row.country_name.clone(),
                year: *year,
                gdp_per_capita: row.values.get(column).copied().flatten(),
            })
        })
        .collect()
}

/**
 * Joins meat consumption rows with long GDP records and keeps the KG per capita, non-zero rows.
 *
 * This is an inner join on (`LOCATION`, `TIME`) = (`Country Code`, `Year`). Meat rows are visited in source
 * order and a key present several times on the GDP side yields one output row per match.
 *
 * # Arguments
 * `meat`: The meat consumption rows.
 * `gdp`: The long-form GDP records.
 *
 * # Returns
 * The merged analysis table.
 */
pub fn merge_meat_and_gdp(meat: &[MeatConsumptionRecord], gdp: &[GdpRecord]) -> MeatAndGdpTable {
    let mut gdp_by_key: BTreeMap<(&str, i32), Vec<&GdpRecord>> = BTreeMap::new();
    for record in gdp {
        gdp_by_key.entry((record.country_code.as_str(), record.year)).or_default().push(record);
    }

    let mut unmatched = 0usize;
    let mut records = Vec::new();
    for row in meat {
        let Some(matches) = gdp_by_key.get(&(row.location.as_str(), row.time)) else {
            unmatched += 1;
            continue;
        };
        if row.measure != KG_PER_CAPITA_MEASURE || row.value == 0.0 {
            continue;
        }
        records.extend(matches.iter().map(|gdp_record| MeatAndGdpRecord {
            country: gdp_record.country_name.clone(),
            subject: row.subject.clone(),
            year: row.time,
            value: row.value,
            gdp_per_capita: gdp_record.gdp_per_capita,
        }));
    }

    if unmatched > 0 {
        info!("{unmatched} of {} meat consumption rows have no GDP row for their country and year and were left out", meat.len());
    }
    MeatAndGdpTable::new(records)
}
