//! View Export Module
//! Writes the current resampled view to CSV through Polars.

use crate::data::series::{ResampledView, DATE_COLUMN};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build a frame with an ISO `Date` column followed by the selected series.
pub fn view_to_dataframe(view: &ResampledView) -> PolarsResult<DataFrame> {
    let dates: Vec<String> = view
        .dates
        .iter()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect();

    let mut columns = Vec::with_capacity(view.columns.len() + 1);
    columns.push(Column::new(DATE_COLUMN.into(), dates));
    for col in &view.columns {
        columns.push(Column::new(col.name.as_str().into(), col.values.clone()));
    }
    DataFrame::new(columns)
}

/// Write `view` to `path`; missing values become empty cells.
pub fn write_csv(view: &ResampledView, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let path = path.as_ref();
    let mut df = view_to_dataframe(view)?;
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)?;

    info!(path = %path.display(), rows = df.height(), "exported view to CSV");
    Ok(())
}
