//! Statistics Calculator Module
//! Per-series summaries and kernel density curves for the distribution view.

use crate::data::ResampledView;
use rayon::prelude::*;
use statrs::distribution::{Continuous, Normal};

/// Summary of one series' present values.
#[derive(Debug, Clone)]
pub struct SeriesSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub p25: f64,
    pub p75: f64,
}

impl Default for SeriesSummary {
    fn default() -> Self {
        Self {
            name: String::new(),
            count: 0,
            mean: f64::NAN,
            median: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
            p25: f64::NAN,
            p75: f64::NAN,
        }
    }
}

/// Handles statistical calculations with multi-threading support.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    pub fn compute_summary(values: &[f64]) -> SeriesSummary {
        let n = values.len();
        if n == 0 {
            return SeriesSummary::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mean = values.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };

        SeriesSummary {
            name: String::new(),
            count: n,
            mean,
            median: Self::percentile(&sorted, 50.0),
            std: variance.sqrt(),
            min: sorted[0],
            max: sorted[n - 1],
            p25: Self::percentile(&sorted, 25.0),
            p75: Self::percentile(&sorted, 75.0),
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Silverman's rule-of-thumb bandwidth; 1.0 when the spread is zero.
    pub fn bandwidth(values: &[f64]) -> f64 {
        let summary = Self::compute_summary(values);
        let iqr = summary.p75 - summary.p25;
        let spread = if iqr > 0.0 {
            summary.std.min(iqr / 1.34)
        } else {
            summary.std
        };
        let h = 0.9 * spread * (summary.count as f64).powf(-0.2);
        if h.is_finite() && h > 0.0 {
            h
        } else {
            1.0
        }
    }

    /// Gaussian kernel density at `points` evenly spaced positions between
    /// the smallest and largest value. Returns `[value, density]` pairs.
    pub fn density(values: &[f64], points: usize) -> Vec<[f64; 2]> {
        if values.is_empty() || points == 0 {
            return Vec::new();
        }
        let Ok(kernel) = Normal::new(0.0, 1.0) else {
            return Vec::new();
        };

        let h = Self::bandwidth(values);
        let n = values.len() as f64;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let step = if points > 1 {
            (max - min) / (points - 1) as f64
        } else {
            0.0
        };

        (0..points)
            .map(|i| {
                let y = min + step * i as f64;
                let d = values.iter().map(|v| kernel.pdf((y - v) / h)).sum::<f64>() / (n * h);
                [y, d]
            })
            .collect()
    }

    /// Compute summaries for every column of a view in parallel, in view order.
    pub fn summarize_view(view: &ResampledView) -> Vec<SeriesSummary> {
        view.columns
            .par_iter()
            .map(|col| {
                let mut summary = Self::compute_summary(&col.present_values());
                summary.name = col.name.clone();
                summary
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Frequency, SeriesColumn};
    use chrono::NaiveDate;

    #[test]
    fn test_summary_of_known_values() {
        let s = StatsCalculator::compute_summary(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(s.count, 4);
        assert_eq!(s.mean, 2.5);
        assert_eq!(s.median, 2.5);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 4.0);
        assert_eq!(s.p25, 1.75);
        assert_eq!(s.p75, 3.25);
        assert!((s.std - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_empty_summary_is_nan() {
        let s = StatsCalculator::compute_summary(&[]);
        assert_eq!(s.count, 0);
        assert!(s.mean.is_nan());
        assert!(s.median.is_nan());
    }

    #[test]
    fn test_density_area_is_close_to_one_inside_the_range() {
        let values: Vec<f64> = (0..200).map(|i| ((i * 37) % 101) as f64 / 10.0).collect();
        let curve = StatsCalculator::density(&values, 400);
        assert_eq!(curve.len(), 400);

        let area: f64 = curve
            .windows(2)
            .map(|w| (w[1][0] - w[0][0]) * (w[0][1] + w[1][1]) / 2.0)
            .sum();
        assert!(area > 0.8 && area <= 1.0, "area = {area}");
        assert!(curve.iter().all(|p| p[1] >= 0.0));
    }

    #[test]
    fn test_density_handles_constant_and_empty_input() {
        assert!(StatsCalculator::density(&[], 50).is_empty());
        let curve = StatsCalculator::density(&[2.0, 2.0, 2.0], 5);
        assert_eq!(curve.len(), 5);
        assert!(curve.iter().all(|p| p[0] == 2.0 && p[1] > 0.0));
        assert_eq!(StatsCalculator::bandwidth(&[2.0, 2.0]), 1.0);
    }

    #[test]
    fn test_summarize_view_keeps_column_order() {
        let view = ResampledView {
            frequency: Frequency::Monthly,
            dates: vec![
                NaiveDate::from_ymd_opt(2020, 1, 31).unwrap(),
                NaiveDate::from_ymd_opt(2020, 2, 29).unwrap(),
            ],
            columns: vec![
                SeriesColumn::new("Tin", vec![Some(1.0), None]),
                SeriesColumn::new("Gold", vec![None, None]),
            ],
        };
        let summaries = StatsCalculator::summarize_view(&view);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].name, "Tin");
        assert_eq!(summaries[0].count, 1);
        assert_eq!(summaries[1].name, "Gold");
        assert_eq!(summaries[1].count, 0);
        assert!(summaries[1].mean.is_nan());
    }
}
