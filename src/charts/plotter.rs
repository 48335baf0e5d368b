//! Chart Plotter Module
//! Interactive scatter and violin views of a resampled table using egui_plot.

use crate::data::{date_to_x, x_to_date, ResampledView};
use crate::stats::{SeriesSummary, StatsCalculator};
use chrono::Datelike;
use egui::{Color32, RichText, Stroke};
use egui_plot::{HLine, Legend, Line, Plot, PlotPoints, Points, Polygon};
use rayon::prelude::*;

/// Samples per density curve.
pub const DENSITY_POINTS: usize = 64;

/// Half width of a violin at its widest point, in category units.
pub const VIOLIN_HALF_WIDTH: f64 = 0.4;

pub const ZERO_LINE_COLOR: Color32 = Color32::from_rgb(199, 200, 201);

/// Color palette for series
pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(52, 152, 219),  // Blue
    Color32::from_rgb(231, 76, 60),   // Red
    Color32::from_rgb(46, 204, 113),  // Green
    Color32::from_rgb(155, 89, 182),  // Purple
    Color32::from_rgb(243, 156, 18),  // Orange
    Color32::from_rgb(26, 188, 156),  // Teal
    Color32::from_rgb(233, 30, 99),   // Pink
    Color32::from_rgb(0, 188, 212),   // Cyan
    Color32::from_rgb(121, 85, 72),   // Brown
    Color32::from_rgb(96, 125, 139),  // Blue Grey
];

/// Everything needed to draw one selection at one frequency.
#[derive(Debug, Clone)]
pub struct ChartData {
    pub view: ResampledView,
    pub summaries: Vec<SeriesSummary>,
    pub densities: Vec<Vec<[f64; 2]>>,
}

impl ChartData {
    pub fn from_view(view: ResampledView) -> Self {
        let summaries = StatsCalculator::summarize_view(&view);
        let densities = view
            .columns
            .par_iter()
            .map(|col| StatsCalculator::density(&col.present_values(), DENSITY_POINTS))
            .collect();
        Self {
            view,
            summaries,
            densities,
        }
    }

    /// e.g. "Commodity Percentage Changes (2020-2024)".
    pub fn title(&self) -> String {
        match (self.view.dates.first(), self.view.dates.last()) {
            (Some(first), Some(last)) if first.year() != last.year() => format!(
                "Commodity Percentage Changes ({}-{})",
                first.year(),
                last.year()
            ),
            (Some(first), _) => format!("Commodity Percentage Changes ({})", first.year()),
            _ => "Commodity Percentage Changes".to_string(),
        }
    }

    /// Shared y-axis bounds with 10% padding.
    pub fn y_bounds(&self) -> (f64, f64) {
        match self.view.value_range() {
            Some((min, max)) if max > min => {
                let pad = (max - min) * 0.1;
                (min - pad, max + pad)
            }
            Some((v, _)) => (v - 1.0, v + 1.0),
            None => (-1.0, 1.0),
        }
    }

    /// Date-axis bounds in plot coordinates, padded by half a bucket.
    pub fn x_bounds(&self) -> (f64, f64) {
        match (self.view.dates.first(), self.view.dates.last()) {
            (Some(first), Some(last)) => {
                let pad = match self.view.dates.len() {
                    1 => 30.0,
                    n => (date_to_x(*last) - date_to_x(*first)) / (n - 1) as f64 / 2.0,
                };
                (date_to_x(*first) - pad, date_to_x(*last) + pad)
            }
            _ => (0.0, 1.0),
        }
    }
}

/// Color for the `index`-th selected series.
pub fn series_color(index: usize) -> Color32 {
    PALETTE[index % PALETTE.len()]
}

/// Closed violin outline around `center`: right half going up, left half
/// coming back down. Widths are scaled so the peak density spans
/// `half_width`.
pub fn violin_outline(center: f64, density: &[[f64; 2]], half_width: f64) -> Vec<[f64; 2]> {
    let peak = density.iter().map(|p| p[1]).fold(0.0, f64::max);
    if density.is_empty() || peak <= 0.0 {
        return Vec::new();
    }
    let scale = half_width / peak;
    let right = density.iter().map(|&[y, d]| [center + d * scale, y]);
    let left = density.iter().rev().map(|&[y, d]| [center - d * scale, y]);
    right.chain(left).collect()
}

fn format_date_tick(x: f64) -> String {
    x_to_date(x)
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_default()
}

/// Creates the dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Scatter of bucket date against averaged percentage change.
    pub fn draw_scatter_chart(ui: &mut egui::Ui, chart_data: &ChartData, height: f32) {
        let (y_min, y_max) = chart_data.y_bounds();
        let (x_min, x_max) = chart_data.x_bounds();

        Plot::new("pct_change_scatter")
            .height(height)
            .legend(Legend::default())
            .y_axis_label("Percentage Change")
            .include_x(x_min)
            .include_x(x_max)
            .include_y(y_min)
            .include_y(y_max)
            .show_grid([false, true])
            .x_axis_formatter(|mark, _range| format_date_tick(mark.value))
            .label_formatter(|name, value| {
                if name.is_empty() {
                    String::new()
                } else {
                    format!("{}\n{}\n{:.2}%", name, format_date_tick(value.x), value.y)
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.hline(HLine::new(0.0).color(ZERO_LINE_COLOR));

                for (i, col) in chart_data.view.columns.iter().enumerate() {
                    let points: PlotPoints = chart_data
                        .view
                        .points(col)
                        .iter()
                        .map(|(d, v)| [date_to_x(*d), *v])
                        .collect();
                    plot_ui.points(
                        Points::new(points)
                            .radius(7.5)
                            .color(series_color(i))
                            .name(&col.name),
                    );
                }
            });
    }

    /// One violin per series sharing the scatter's y-axis, median marked.
    pub fn draw_violin_chart(ui: &mut egui::Ui, chart_data: &ChartData, height: f32) {
        let (y_min, y_max) = chart_data.y_bounds();
        let names = chart_data.view.column_names();
        let count = names.len();

        Plot::new("pct_change_violin")
            .height(height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_x(-0.5)
            .include_x(count as f64 - 0.5)
            .include_y(y_min)
            .include_y(y_max)
            .show_grid([false, true])
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() < 1e-6 && idx >= 0.0 {
                    names.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                for (i, (summary, density)) in chart_data
                    .summaries
                    .iter()
                    .zip(chart_data.densities.iter())
                    .enumerate()
                {
                    let color = series_color(i);
                    let center = i as f64;
                    let outline = violin_outline(center, density, VIOLIN_HALF_WIDTH);
                    if !outline.is_empty() {
                        plot_ui.polygon(
                            Polygon::new(PlotPoints::from_iter(outline))
                                .fill_color(color.gamma_multiply(0.3))
                                .stroke(Stroke::new(1.5, color))
                                .name(&summary.name),
                        );
                    }

                    if summary.median.is_finite() {
                        plot_ui.line(
                            Line::new(PlotPoints::from_iter([
                                [center - VIOLIN_HALF_WIDTH / 2.0, summary.median],
                                [center + VIOLIN_HALF_WIDTH / 2.0, summary.median],
                            ]))
                            .color(Color32::BLACK)
                            .width(2.0),
                        );
                    }
                }
            });
    }

    /// Draw statistics table
    pub fn draw_stats_table(ui: &mut egui::Ui, summaries: &[SeriesSummary]) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new("series_summary_table")
                    .striped(true)
                    .min_col_width(55.0)
                    .spacing([8.0, 4.0])
                    .show(ui, |ui| {
                        for header in ["Commodity", "N", "Mean", "Median", "Std", "Min", "Max"] {
                            ui.label(RichText::new(header).strong().size(11.0));
                        }
                        ui.end_row();

                        for (i, s) in summaries.iter().enumerate() {
                            ui.label(RichText::new(&s.name).size(11.0).color(series_color(i)));
                            ui.label(RichText::new(s.count.to_string()).size(11.0));
                            for v in [s.mean, s.median, s.std, s.min, s.max] {
                                let text = if v.is_finite() {
                                    format!("{:.2}", v)
                                } else {
                                    "-".to_string()
                                };
                                ui.label(RichText::new(text).size(11.0));
                            }
                            ui.end_row();
                        }
                    });
            });
    }
}
