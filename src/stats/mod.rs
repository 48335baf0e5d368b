//! Stats module - Distribution summaries

mod calculator;

pub use calculator::{SeriesSummary, StatsCalculator};
