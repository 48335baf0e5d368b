//! CSV Data Loader Module
//! Reads the monthly price sheet with Polars and normalizes it into typed
//! series: header noise dropped, period labels parsed, prices coerced.

use crate::data::series::{NormalizedSeries, SeriesColumn};
use chrono::NaiveDate;
use polars::prelude::*;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Rows under the column header that carry units and codes, not prices.
pub const HEADER_ROWS: usize = 2;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("CSV has no columns")]
    NoColumns,
}

/// Loads the price sheet into a [`NormalizedSeries`].
pub struct DataLoader;

impl DataLoader {
    /// Load and normalize a CSV file.
    ///
    /// The first column holds `YYYYMmm` period labels and becomes the date
    /// index. Unparseable dates and cells become missing values.
    pub fn load(path: impl AsRef<Path>) -> Result<NormalizedSeries, IngestError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(IngestError::FileNotFound(path.to_path_buf()));
        }

        // Read every column as text; coercion happens per cell below
        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .finish()?
            .collect()?;

        let series = Self::normalize(&df)?;
        info!(
            path = %path.display(),
            rows = series.len(),
            columns = series.columns.len(),
            "loaded price sheet"
        );
        Ok(series)
    }

    /// Normalize an all-text frame as read from disk.
    pub fn normalize(df: &DataFrame) -> Result<NormalizedSeries, IngestError> {
        let skip = df.height().min(HEADER_ROWS);
        let body = df.slice(skip as i64, df.height() - skip);

        let (date_col, value_cols) = body
            .get_columns()
            .split_first()
            .ok_or(IngestError::NoColumns)?;

        let dates = map_text(date_col, |s| s.and_then(parse_period))?;
        let bad_dates = dates.iter().filter(|d| d.is_none()).count();
        if bad_dates > 0 {
            warn!(count = bad_dates, "period labels failed to parse");
        }
        if dates
            .iter()
            .flatten()
            .zip(dates.iter().flatten().skip(1))
            .any(|(a, b)| b <= a)
        {
            warn!("period labels are not strictly increasing");
        }

        let columns = value_cols
            .par_iter()
            .map(|col| {
                let values = map_text(col, |s| s.and_then(parse_number))?;
                let raw_present = map_text(col, |s| s.is_some_and(|s| !s.trim().is_empty()))?;
                let coerced = raw_present
                    .iter()
                    .zip(values.iter())
                    .filter(|(present, v)| **present && v.is_none())
                    .count();
                if coerced > 0 {
                    debug!(column = %col.name(), coerced, "non-numeric cells set to missing");
                }
                Ok(SeriesColumn::new(col.name().to_string(), values))
            })
            .collect::<PolarsResult<Vec<_>>>()?;

        Ok(NormalizedSeries { dates, columns })
    }
}

/// Convenience wrapper around [`DataLoader::load`].
pub fn load(path: impl AsRef<Path>) -> Result<NormalizedSeries, IngestError> {
    DataLoader::load(path)
}

fn map_text<T>(col: &Column, f: impl Fn(Option<&str>) -> T) -> PolarsResult<Vec<T>> {
    let text = col.as_materialized_series().cast(&DataType::String)?;
    Ok(text.str()?.into_iter().map(f).collect())
}

/// Parse a `YYYYMmm` period label (e.g. `2020M01`) to the first of the month.
pub fn parse_period(s: &str) -> Option<NaiveDate> {
    let (year, month) = s.trim().split_once('M')?;
    if year.len() != 4 || month.len() != 2 {
        return None;
    }
    if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
}

/// Lenient numeric coercion: anything that is not a finite number is missing.
pub fn parse_number(s: &str) -> Option<f64> {
    let v = s.trim().parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const SHEET: &str = "\
,\"Crude oil, WTI\",Gold,Coffee
,($/bbl),($/troy oz),($/kg)
,CRUDE_WTI,GOLD,COFFEE
2019M12,60,1500,3
2020M01,57.5,…,n/a
2020M02,50,1600,
bad,55,1650,3.1
";

    #[test]
    fn test_parse_period() {
        assert_eq!(parse_period("2020M01"), Some(ymd(2020, 1, 1)));
        assert_eq!(parse_period(" 1960M12 "), Some(ymd(1960, 12, 1)));
        assert_eq!(parse_period("2020M13"), None);
        assert_eq!(parse_period("2020M1"), None);
        assert_eq!(parse_period("20M01"), None);
        assert_eq!(parse_period("2020-01"), None);
        assert_eq!(parse_period(""), None);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 12.5 "), Some(12.5));
        assert_eq!(parse_number("-3"), Some(-3.0));
        assert_eq!(parse_number("…"), None);
        assert_eq!(parse_number("1,234"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn test_load_drops_header_rows_and_coerces() {
        let file = write_csv(SHEET);
        let series = DataLoader::load(file.path()).unwrap();

        assert_eq!(series.column_names(), vec!["Crude oil, WTI", "Gold", "Coffee"]);
        assert_eq!(
            series.dates,
            vec![Some(ymd(2019, 12, 1)), Some(ymd(2020, 1, 1)), Some(ymd(2020, 2, 1)), None]
        );
        assert_eq!(
            series.column("Crude oil, WTI").unwrap().values,
            vec![Some(60.0), Some(57.5), Some(50.0), Some(55.0)]
        );
        assert_eq!(
            series.column("Gold").unwrap().values,
            vec![Some(1500.0), None, Some(1600.0), Some(1650.0)]
        );
        assert_eq!(
            series.column("Coffee").unwrap().values,
            vec![Some(3.0), None, None, Some(3.1)]
        );
    }

    #[test]
    fn test_header_only_file_gives_empty_series() {
        let file = write_csv(",Gold\n,($/troy oz)\n,GOLD\n");
        let series = DataLoader::load(file.path()).unwrap();
        assert!(series.is_empty());
        assert_eq!(series.column_names(), vec!["Gold"]);
    }

    #[test]
    fn test_file_not_found() {
        let result = load("definitely/not/here.csv");
        assert!(matches!(result, Err(IngestError::FileNotFound(_))));
    }

    #[test]
    fn test_empty_file_fails() {
        let file = write_csv("");
        assert!(DataLoader::load(file.path()).is_err());
    }
}
