//! Descriptive statistics over the quantitative venue columns.
//!
//! Each column is summarized over the venues that have a value for it:
//! count, mean, sample standard deviation, min, quartiles and max.

use crate::analysis::correlation::{Column, COLUMNS};
use crate::models::{ColumnSummary, Venue};

/// Numeric columns described but left out of the correlation matrix.
const EXTRA_COLUMNS: [Column; 3] = [
    ("Latitude", |v: &Venue| v.latitude),
    ("Longitude", |v: &Venue| v.longitude),
    ("Admissions change 2020/2019 (%)", |v: &Venue| v.admissions_change),
];

/// Describe every quantitative column.
pub fn describe(venues: &[Venue]) -> Vec<ColumnSummary> {
    COLUMNS
        .iter()
        .chain(EXTRA_COLUMNS.iter())
        .map(|&(name, get)| {
            let mut values: Vec<f64> = venues.iter().filter_map(get).collect();
            values.sort_by(f64::total_cmp);
            summarize(name, &values)
        })
        .collect()
}

fn summarize(column: &str, sorted: &[f64]) -> ColumnSummary {
    let count = sorted.len();
    let mean = (count > 0).then(|| sorted.iter().sum::<f64>() / count as f64);

    let std = mean.filter(|_| count > 1).map(|mean| {
        let squares: f64 = sorted.iter().map(|x| (x - mean).powi(2)).sum();
        (squares / (count - 1) as f64).sqrt()
    });

    ColumnSummary {
        column: column.to_string(),
        count,
        mean,
        std,
        min: sorted.first().copied(),
        q1: quantile(sorted, 0.25),
        median: quantile(sorted, 0.5),
        q3: quantile(sorted, 0.75),
        max: sorted.last().copied(),
    }
}

/// Quantile of sorted values, interpolating linearly between ranks.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let position = q * last as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}
