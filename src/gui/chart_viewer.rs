//! Chart Viewer Widget
//! Central panel showing the scatter chart, the per-series violins and the
//! summary table for the current selection.

use crate::charts::{ChartData, ChartPlotter};
use egui::{Color32, RichText, ScrollArea};

const CHART_SPACING: f32 = 15.0;
const CHART_HEIGHT: f32 = 520.0;
/// Share of the card width given to the scatter; violins take the rest.
const SCATTER_SHARE: f32 = 0.78;

/// Scrollable chart display area.
#[derive(Default)]
pub struct ChartViewer {
    pub chart_data: Option<ChartData>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.chart_data = None;
    }

    pub fn set_chart_data(&mut self, chart_data: ChartData) {
        self.chart_data = Some(chart_data);
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        let Some(chart_data) = &self.chart_data else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(10.0);
                    ui.label(RichText::new(chart_data.title()).size(24.0).strong());
                    ui.add_space(CHART_SPACING);
                    ui.label(
                        RichText::new(
                            "Monitoring the Fluctuations in Commodity Prices Through Comparative Percentage Analysis",
                        )
                        .size(16.0),
                    );
                });
                ui.add_space(CHART_SPACING);

                if chart_data.view.columns.is_empty() {
                    ui.label(
                        RichText::new("Select one or more commodities to plot.")
                            .color(Color32::GRAY),
                    );
                    return;
                }

                egui::Frame::none()
                    .rounding(8.0)
                    .stroke(egui::Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color))
                    .fill(ui.visuals().widgets.noninteractive.bg_fill)
                    .inner_margin(12.0)
                    .show(ui, |ui| {
                        let width = ui.available_width();
                        ui.horizontal(|ui| {
                            ui.vertical(|ui| {
                                ui.set_width(width * SCATTER_SHARE);
                                ChartPlotter::draw_scatter_chart(ui, chart_data, CHART_HEIGHT);
                            });
                            ui.vertical(|ui| {
                                ui.set_width(width * (1.0 - SCATTER_SHARE) - CHART_SPACING);
                                ChartPlotter::draw_violin_chart(ui, chart_data, CHART_HEIGHT);
                            });
                        });
                    });

                ui.add_space(CHART_SPACING);
                ChartPlotter::draw_stats_table(ui, &chart_data.summaries);
            });
    }
}
