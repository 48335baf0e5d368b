//! Static Chart Renderer
//! Draws the dashboard chart to a PNG file with plotters.
//!
//! Layout:
//! 1. Title centered over the scatter
//! 2. Left: scatter of bucket date vs. percentage change, one color per series
//! 3. Right: one violin per series on the same y-axis, median marked

use crate::charts::plotter::{series_color, violin_outline, ChartData, VIOLIN_HALF_WIDTH};
use crate::data::{date_to_x, x_to_date};
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;
use tracing::info;

const ZERO_LINE: RGBColor = RGBColor(199, 200, 201);
const AXIS_TEXT: RGBColor = RGBColor(82, 82, 82);

/// Share of the image width given to the scatter.
const SCATTER_SHARE: f64 = 0.78;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("No data to render")]
    Empty,
    #[error("Failed to draw chart: {0}")]
    Draw(String),
}

fn draw_err(e: impl std::fmt::Display) -> RenderError {
    RenderError::Draw(e.to_string())
}

fn rgb(index: usize) -> RGBColor {
    let c = series_color(index);
    RGBColor(c.r(), c.g(), c.b())
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render the scatter and violin views of `data` to `path`.
    pub fn render_png(
        data: &ChartData,
        path: &Path,
        (width, height): (u32, u32),
    ) -> Result<(), RenderError> {
        if data.view.is_empty() || data.view.columns.is_empty() {
            return Err(RenderError::Empty);
        }

        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;
        let split = (width as f64 * SCATTER_SHARE) as u32;
        let (scatter_area, violin_area) = root.split_horizontally(split);

        Self::draw_scatter(data, &scatter_area)?;
        Self::draw_violins(data, &violin_area)?;

        root.present().map_err(draw_err)?;
        info!(path = %path.display(), width, height, "rendered chart");
        Ok(())
    }

    fn draw_scatter<DB: DrawingBackend>(
        data: &ChartData,
        area: &DrawingArea<DB, plotters::coord::Shift>,
    ) -> Result<(), RenderError> {
        let (x_min, x_max) = data.x_bounds();
        let (y_min, y_max) = data.y_bounds();

        let mut chart = ChartBuilder::on(area)
            .caption(data.title(), ("sans-serif", 28))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(8)
            .x_label_formatter(&|x| {
                x_to_date(*x)
                    .map(|d| d.format("%Y-%m").to_string())
                    .unwrap_or_default()
            })
            .y_desc("Percentage Change")
            .label_style(("sans-serif", 16).into_font().color(&AXIS_TEXT))
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(LineSeries::new(
                vec![(x_min, 0.0), (x_max, 0.0)],
                &ZERO_LINE,
            ))
            .map_err(draw_err)?;

        for (i, col) in data.view.columns.iter().enumerate() {
            let color = rgb(i);
            chart
                .draw_series(
                    data.view
                        .points(col)
                        .into_iter()
                        .map(move |(d, v)| Circle::new((date_to_x(d), v), 7, color.filled())),
                )
                .map_err(draw_err)?
                .label(col.name.as_str())
                .legend(move |(x, y)| Circle::new((x, y), 5, color.filled()));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font(("sans-serif", 16))
            .draw()
            .map_err(draw_err)?;

        Ok(())
    }

    fn draw_violins<DB: DrawingBackend>(
        data: &ChartData,
        area: &DrawingArea<DB, plotters::coord::Shift>,
    ) -> Result<(), RenderError> {
        let (y_min, y_max) = data.y_bounds();
        let names = data.view.column_names();
        let count = names.len() as f64;

        let mut chart = ChartBuilder::on(area)
            .margin(15)
            .margin_top(58)
            .x_label_area_size(40)
            .y_label_area_size(10)
            .build_cartesian_2d(-0.5..count - 0.5, y_min..y_max)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(names.len())
            .y_labels(0)
            .x_label_formatter(&|x| {
                let idx = x.round();
                if (x - idx).abs() < 1e-6 && idx >= 0.0 {
                    names.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .label_style(("sans-serif", 14).into_font().color(&AXIS_TEXT))
            .draw()
            .map_err(draw_err)?;

        for (i, (summary, density)) in data.summaries.iter().zip(data.densities.iter()).enumerate() {
            let color = rgb(i);
            let center = i as f64;
            let outline: Vec<(f64, f64)> = violin_outline(center, density, VIOLIN_HALF_WIDTH)
                .into_iter()
                .map(|[x, y]| (x, y))
                .collect();
            if !outline.is_empty() {
                chart
                    .draw_series(std::iter::once(Polygon::new(
                        outline.clone(),
                        color.mix(0.3).filled(),
                    )))
                    .map_err(draw_err)?;
                chart
                    .draw_series(std::iter::once(PathElement::new(outline, color.stroke_width(2))))
                    .map_err(draw_err)?;
            }

            if summary.median.is_finite() {
                let half = VIOLIN_HALF_WIDTH / 2.0;
                chart
                    .draw_series(std::iter::once(PathElement::new(
                        vec![(center - half, summary.median), (center + half, summary.median)],
                        BLACK.stroke_width(2),
                    )))
                    .map_err(draw_err)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Frequency, ResampledView, SeriesColumn};

    #[test]
    fn test_empty_view_is_rejected_before_drawing() {
        let data = ChartData::from_view(ResampledView {
            frequency: Frequency::Monthly,
            dates: Vec::new(),
            columns: vec![SeriesColumn::new("Gold", Vec::new())],
        });
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");
        let result = StaticChartRenderer::render_png(&data, &path, (800, 600));
        assert!(matches!(result, Err(RenderError::Empty)));
        assert!(!path.exists());
    }

    #[test]
    fn test_series_colors_match_palette() {
        let c = series_color(1);
        assert_eq!(rgb(1), RGBColor(c.r(), c.g(), c.b()));
    }
}
