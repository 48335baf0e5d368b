//! Time Series Types
//! Typed tables flowing through the pipeline: normalized prices, percentage
//! changes and resampled views.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name given to the period column after loading.
pub const DATE_COLUMN: &str = "Date";

/// One named numeric column. `None` marks a missing value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl SeriesColumn {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Non-missing values in row order.
    pub fn present_values(&self) -> Vec<f64> {
        self.values.iter().flatten().copied().collect()
    }
}

/// Monthly prices keyed by date. A date that failed to parse is `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedSeries {
    pub dates: Vec<Option<NaiveDate>>,
    pub columns: Vec<SeriesColumn>,
}

impl NormalizedSeries {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&SeriesColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

/// Period-over-period percentage changes, rounded to 2 decimals and
/// restricted to dates on or after the start date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PctChangeSeries {
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<SeriesColumn>,
}

impl PctChangeSeries {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&SeriesColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

/// Bucketed averages for the selected columns. Dates are period-end labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResampledView {
    pub frequency: Frequency,
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<SeriesColumn>,
}

impl ResampledView {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&SeriesColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// `(date, value)` pairs of one column, skipping missing buckets.
    pub fn points(&self, column: &SeriesColumn) -> Vec<(NaiveDate, f64)> {
        self.dates
            .iter()
            .zip(column.values.iter())
            .filter_map(|(d, v)| v.map(|v| (*d, v)))
            .collect()
    }

    /// Range of all present values, or `None` if every bucket is missing.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in self.columns.iter().flat_map(|c| c.values.iter().flatten()) {
            min = min.min(*v);
            max = max.max(*v);
        }
        if min.is_finite() && max.is_finite() {
            Some((min, max))
        } else {
            None
        }
    }
}

/// Resampling frequency. Buckets are labelled by their last calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Monthly,
    Quarterly,
    Yearly,
}

impl Default for Frequency {
    fn default() -> Self {
        Frequency::Monthly
    }
}

impl Frequency {
    pub const ALL: [Frequency; 3] = [Frequency::Monthly, Frequency::Quarterly, Frequency::Yearly];

    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Monthly => "Monthly",
            Frequency::Quarterly => "Quarterly",
            Frequency::Yearly => "Yearly",
        }
    }

    /// Period-end label of the bucket containing `date`.
    pub fn bucket_end(&self, date: NaiveDate) -> NaiveDate {
        let month = match self {
            Frequency::Monthly => date.month(),
            Frequency::Quarterly => (date.month() - 1) / 3 * 3 + 3,
            Frequency::Yearly => 12,
        };
        month_end(date.year(), month)
    }

    /// Period-end label of the bucket following the one ending at `end`.
    pub fn next_bucket_end(&self, end: NaiveDate) -> Option<NaiveDate> {
        end.succ_opt().map(|start| self.bucket_end(start))
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Last calendar day of `month` in `year`.
pub fn month_end(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// Plot coordinate for a date (days since 0001-01-01).
pub fn date_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

/// Inverse of [`date_to_x`], rounding to the nearest day.
pub fn x_to_date(x: f64) -> Option<NaiveDate> {
    if !x.is_finite() || x.abs() > i32::MAX as f64 {
        return None;
    }
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_end_handles_leap_years_and_december() {
        assert_eq!(month_end(2020, 2), ymd(2020, 2, 29));
        assert_eq!(month_end(2021, 2), ymd(2021, 2, 28));
        assert_eq!(month_end(2023, 12), ymd(2023, 12, 31));
        assert_eq!(month_end(2023, 4), ymd(2023, 4, 30));
    }

    #[test]
    fn bucket_end_uses_period_end_labels() {
        let d = ymd(2021, 5, 1);
        assert_eq!(Frequency::Monthly.bucket_end(d), ymd(2021, 5, 31));
        assert_eq!(Frequency::Quarterly.bucket_end(d), ymd(2021, 6, 30));
        assert_eq!(Frequency::Yearly.bucket_end(d), ymd(2021, 12, 31));
        assert_eq!(Frequency::Quarterly.bucket_end(ymd(2021, 12, 1)), ymd(2021, 12, 31));
        assert_eq!(Frequency::Quarterly.bucket_end(ymd(2021, 1, 1)), ymd(2021, 3, 31));
    }

    #[test]
    fn next_bucket_end_steps_one_period() {
        assert_eq!(
            Frequency::Monthly.next_bucket_end(ymd(2020, 1, 31)),
            Some(ymd(2020, 2, 29))
        );
        assert_eq!(
            Frequency::Quarterly.next_bucket_end(ymd(2020, 12, 31)),
            Some(ymd(2021, 3, 31))
        );
        assert_eq!(
            Frequency::Yearly.next_bucket_end(ymd(2020, 12, 31)),
            Some(ymd(2021, 12, 31))
        );
    }

    #[test]
    fn frequency_deserializes_from_lowercase() {
        let f: Frequency = serde_json::from_str("\"quarterly\"").unwrap();
        assert_eq!(f, Frequency::Quarterly);
        assert_eq!(Frequency::default(), Frequency::Monthly);
    }

    #[test]
    fn plot_coordinates_round_trip_dates() {
        let d = ymd(2022, 7, 31);
        assert_eq!(x_to_date(date_to_x(d)), Some(d));
        assert_eq!(x_to_date(f64::NAN), None);
    }

    #[test]
    fn view_points_skip_missing_buckets() {
        let column = SeriesColumn::new("Gold", vec![Some(1.0), None, Some(-2.5)]);
        let view = ResampledView {
            frequency: Frequency::Monthly,
            dates: vec![ymd(2020, 1, 31), ymd(2020, 2, 29), ymd(2020, 3, 31)],
            columns: vec![column.clone()],
        };
        assert_eq!(
            view.points(&column),
            vec![(ymd(2020, 1, 31), 1.0), (ymd(2020, 3, 31), -2.5)]
        );
        assert_eq!(view.value_range(), Some((-2.5, 1.0)));
    }
}
