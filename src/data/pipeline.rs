//! Pipeline Handle
//! The derived percentage-change table, built once per data source and shared
//! read-only with the UI.

use crate::config::Settings;
use crate::data::loader::{DataLoader, IngestError};
use crate::data::processor::{DataProcessor, SelectionError};
use crate::data::series::{Frequency, NormalizedSeries, PctChangeSeries, ResampledView};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Immutable base table plus the `(selection, frequency) -> view` query.
#[derive(Debug, Clone)]
pub struct Pipeline {
    base: Arc<PctChangeSeries>,
    start_date: NaiveDate,
    source: Option<PathBuf>,
}

impl Pipeline {
    /// Load `path` and derive the percentage-change table.
    pub fn load(path: impl AsRef<Path>, settings: &Settings) -> Result<Self, IngestError> {
        let path = path.as_ref();
        let normalized = DataLoader::load(path)?;
        let mut pipeline = Self::from_normalized(&normalized, settings.start_date);
        pipeline.source = Some(path.to_path_buf());
        Ok(pipeline)
    }

    pub fn from_normalized(series: &NormalizedSeries, start_date: NaiveDate) -> Self {
        let base = DataProcessor::percent_change_since(series, start_date);
        info!(
            start = %start_date,
            rows = base.len(),
            commodities = base.columns.len(),
            "derived percentage changes"
        );
        Self {
            base: Arc::new(base),
            start_date,
            source: None,
        }
    }

    pub fn base(&self) -> &PctChangeSeries {
        &self.base
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Commodity names in file order.
    pub fn commodities(&self) -> Vec<String> {
        self.base.column_names()
    }

    /// The preferred names that exist in this table, in preferred order.
    pub fn default_selection(&self, preferred: &[String]) -> Vec<String> {
        preferred
            .iter()
            .filter(|name| self.base.column(name).is_some())
            .cloned()
            .collect()
    }

    /// Resample the base table for one UI request.
    pub fn view(
        &self,
        selection: &[String],
        frequency: Frequency,
    ) -> Result<ResampledView, SelectionError> {
        DataProcessor::resample(&self.base, frequency, selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::series::SeriesColumn;
    use std::io::Write;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> NormalizedSeries {
        NormalizedSeries {
            dates: vec![
                Some(ymd(2019, 12, 1)),
                Some(ymd(2020, 1, 1)),
                Some(ymd(2020, 2, 1)),
                Some(ymd(2020, 3, 1)),
            ],
            columns: vec![
                SeriesColumn::new("Gold", vec![Some(100.0), Some(110.0), Some(121.0), Some(121.0)]),
                SeriesColumn::new("Tin", vec![Some(10.0), Some(5.0), Some(10.0), None]),
            ],
        }
    }

    #[test]
    fn test_view_is_repeatable_and_leaves_base_untouched() {
        let pipeline = Pipeline::from_normalized(&sample(), ymd(2020, 1, 1));
        let before = pipeline.base().clone();
        let selection = vec!["Tin".to_string(), "Gold".to_string()];

        let first = pipeline.view(&selection, Frequency::Quarterly).unwrap();
        let second = pipeline.view(&selection, Frequency::Quarterly).unwrap();

        assert_eq!(first, second);
        assert_eq!(pipeline.base(), &before);
        assert_eq!(first.dates, vec![ymd(2020, 3, 31)]);
        // Tin: -50, 100, missing; Gold: 10, 10, 0
        assert_eq!(first.column("Tin").unwrap().values, vec![Some(25.0)]);
        let gold = first.column("Gold").unwrap().values[0].unwrap();
        assert!((gold - 20.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_default_selection_keeps_known_names() {
        let pipeline = Pipeline::from_normalized(&sample(), ymd(2020, 1, 1));
        let preferred = vec!["Crude oil, WTI".to_string(), "Tin".to_string(), "Gold".to_string()];
        assert_eq!(pipeline.default_selection(&preferred), vec!["Tin", "Gold"]);
        assert_eq!(pipeline.commodities(), vec!["Gold", "Tin"]);
    }

    #[test]
    fn test_clones_share_the_base_table() {
        let pipeline = Pipeline::from_normalized(&sample(), ymd(2020, 1, 1));
        let clone = pipeline.clone();
        assert!(std::ptr::eq(pipeline.base(), clone.base()));

        let handle = std::thread::spawn(move || {
            clone.view(&["Gold".to_string()], Frequency::Yearly).map(|v| v.len())
        });
        assert_eq!(handle.join().unwrap(), Ok(1));
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(
            file,
            ",Gold\n,($/troy oz)\n,GOLD\n2019M12,100\n2020M01,100\n2020M02,110\n"
        )
        .unwrap();
        file.flush().unwrap();

        let pipeline = Pipeline::load(file.path(), &Settings::default()).unwrap();
        assert_eq!(pipeline.source(), Some(file.path()));
        let view = pipeline.view(&["Gold".to_string()], Frequency::Monthly).unwrap();
        assert_eq!(view.dates, vec![ymd(2020, 1, 31), ymd(2020, 2, 29)]);
        assert_eq!(view.column("Gold").unwrap().values, vec![Some(0.0), Some(10.0)]);
    }
}
