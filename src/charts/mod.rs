//! Charts module - Chart rendering

mod plotter;
mod renderer;

pub use plotter::{series_color, violin_outline, ChartData, ChartPlotter, PALETTE};
pub use renderer::{RenderError, StaticChartRenderer};
