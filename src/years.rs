use std::collections::BTreeSet;

use crate::db::models::ChartRecord;

/// Distinct chart years in ascending order.
/// Rows whose week didn't parse have no year and are skipped.
pub fn available_years(charts: &[ChartRecord]) -> Vec<i32> {
    charts
        .iter()
        .filter_map(ChartRecord::year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Most recent chart year, used as the default selection.
pub fn latest_year(charts: &[ChartRecord]) -> Option<i32> {
    charts.iter().filter_map(ChartRecord::year).max()
}
