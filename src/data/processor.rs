//! Data Processor Module
//! Percentage-change derivation and frequency resampling.

use crate::data::series::{
    Frequency, NormalizedSeries, PctChangeSeries, ResampledView, SeriesColumn,
};
use chrono::NaiveDate;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;
use tracing::debug;

/// Decimal places kept after percentage scaling.
pub const DECIMALS: i32 = 2;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Unknown column: {0}")]
    UnknownColumn(String),
}

/// First month kept in the percentage-change series.
pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Handles the transformation steps between the loaded sheet and the chart.
pub struct DataProcessor;

impl DataProcessor {
    /// Percentage change with the default 2020-01-01 start date.
    pub fn percent_change(series: &NormalizedSeries) -> PctChangeSeries {
        Self::percent_change_since(series, default_start_date())
    }

    /// Row-over-row percentage change, rounded to 2 decimals, keeping rows
    /// dated on or after `start`.
    ///
    /// The change is computed over the full history before filtering, so the
    /// first kept row compares against the last row before `start`.
    pub fn percent_change_since(series: &NormalizedSeries, start: NaiveDate) -> PctChangeSeries {
        let keep: Vec<usize> = series
            .dates
            .iter()
            .enumerate()
            .filter_map(|(i, d)| matches!(d, Some(d) if *d >= start).then_some(i))
            .collect();

        let columns = series
            .columns
            .par_iter()
            .map(|col| {
                let changes = pct_change(&col.values);
                let values = keep
                    .iter()
                    .map(|&i| changes[i].map(|v| round_half_even(v, DECIMALS)))
                    .collect();
                SeriesColumn::new(col.name.clone(), values)
            })
            .collect();

        let dates = keep.iter().filter_map(|&i| series.dates[i]).collect();
        PctChangeSeries { dates, columns }
    }

    /// Average `series` into `frequency` buckets and keep `columns` in the
    /// given order.
    ///
    /// Every bucket between the first and the last row is emitted; a bucket
    /// without any present value averages to missing.
    pub fn resample(
        series: &PctChangeSeries,
        frequency: Frequency,
        columns: &[String],
    ) -> Result<ResampledView, SelectionError> {
        let selected = Self::select_columns(series, columns)?;

        let mut rows_by_bucket: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();
        for (i, date) in series.dates.iter().enumerate() {
            rows_by_bucket
                .entry(frequency.bucket_end(*date))
                .or_default()
                .push(i);
        }

        let mut dates = Vec::with_capacity(rows_by_bucket.len());
        if let (Some(first), Some(last)) = (
            rows_by_bucket.keys().next().copied(),
            rows_by_bucket.keys().next_back().copied(),
        ) {
            let mut end = first;
            while end <= last {
                dates.push(end);
                match frequency.next_bucket_end(end) {
                    Some(next) => end = next,
                    None => break,
                }
            }
        }

        let columns = selected
            .into_iter()
            .map(|col| {
                let values = dates
                    .iter()
                    .map(|end| {
                        let rows = rows_by_bucket.get(end).map(Vec::as_slice).unwrap_or(&[]);
                        mean_present(rows.iter().map(|&i| col.values[i]))
                    })
                    .collect();
                SeriesColumn::new(col.name.clone(), values)
            })
            .collect();

        debug!(
            frequency = %frequency,
            buckets = dates.len(),
            "resampled percentage changes"
        );

        Ok(ResampledView {
            frequency,
            dates,
            columns,
        })
    }

    /// Resolve the requested names against the series, dropping repeats.
    fn select_columns<'a>(
        series: &'a PctChangeSeries,
        columns: &[String],
    ) -> Result<Vec<&'a SeriesColumn>, SelectionError> {
        let mut seen = HashSet::new();
        let mut selected = Vec::with_capacity(columns.len());
        for name in columns {
            let col = series
                .column(name)
                .ok_or_else(|| SelectionError::UnknownColumn(name.clone()))?;
            if seen.insert(name.as_str()) {
                selected.push(col);
            }
        }
        Ok(selected)
    }
}

/// `(x[t] - x[t-1]) / x[t-1] * 100`; missing when either side is missing or
/// the prior value is zero.
pub fn pct_change(values: &[Option<f64>]) -> Vec<Option<f64>> {
    if values.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(values.len());
    out.push(None);
    out.extend(values.windows(2).map(|w| match (w[0], w[1]) {
        (Some(prev), Some(cur)) if prev != 0.0 => {
            let change = (cur - prev) / prev * 100.0;
            change.is_finite().then_some(change)
        }
        _ => None,
    }));
    out
}

/// Round to `decimals` places, ties to even.
pub fn round_half_even(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}

fn mean_present(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, count) = values
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}
