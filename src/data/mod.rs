//! Data module - CSV loading, transformation and export

mod export;
mod loader;
mod pipeline;
mod processor;
mod series;

pub use export::{view_to_dataframe, write_csv, ExportError};
pub use loader::{load, parse_number, parse_period, DataLoader, IngestError, HEADER_ROWS};
pub use pipeline::Pipeline;
pub use processor::{
    default_start_date, pct_change, round_half_even, DataProcessor, SelectionError, DECIMALS,
};
pub use series::{
    date_to_x, month_end, x_to_date, Frequency, NormalizedSeries, PctChangeSeries, ResampledView,
    SeriesColumn, DATE_COLUMN,
};
