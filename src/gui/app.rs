//! Commodity Dash Main Application
//! Main window with control panel and chart viewer.

use crate::charts::{ChartData, StaticChartRenderer};
use crate::config::Settings;
use crate::data::{write_csv, Pipeline};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use egui::SidePanel;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::thread;
use tracing::{debug, error, info, warn};

/// CSV loading result from background thread
enum LoadResult {
    Complete(Pipeline),
    Error(String),
}

/// Main application window.
pub struct DashboardApp {
    settings: Settings,
    pipeline: Option<Pipeline>,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async CSV loading
    load_rx: Option<Receiver<LoadResult>>,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, settings: Settings) -> Self {
        let mut app = Self {
            control_panel: ControlPanel::new(settings.default_frequency),
            settings,
            pipeline: None,
            chart_viewer: ChartViewer::new(),
            load_rx: None,
        };

        let default_path = app.settings.data_path.clone();
        if default_path.is_file() {
            app.start_loading(default_path);
        } else {
            warn!(path = %default_path.display(), "default price sheet not found");
            app.control_panel
                .set_status("Browse for a commodity price CSV to begin");
        }
        app
    }

    /// Handle CSV file selection
    fn handle_browse_csv(&mut self) {
        if self.load_rx.is_some() {
            return; // Already loading
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.start_loading(path);
        }
    }

    /// Load and derive the base table in a background thread
    fn start_loading(&mut self, path: PathBuf) {
        self.control_panel.csv_path = Some(path.clone());
        self.control_panel.busy = true;
        self.control_panel.set_status("Loading CSV file...");

        let (tx, rx) = channel();
        self.load_rx = Some(rx);
        let settings = self.settings.clone();

        thread::spawn(move || {
            let result = match Pipeline::load(&path, &settings) {
                Ok(pipeline) => LoadResult::Complete(pipeline),
                Err(e) => {
                    error!(path = %path.display(), error = %e, "failed to load price sheet");
                    LoadResult::Error(e.to_string())
                }
            };
            let _ = tx.send(result);
        });
    }

    /// Check for CSV loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(LoadResult::Complete(pipeline)) => {
                let commodities = pipeline.commodities();
                let selected = pipeline.default_selection(&self.settings.default_commodities);
                self.control_panel.set_status(format!(
                    "Loaded {} months, {} commodities",
                    pipeline.base().len(),
                    commodities.len()
                ));
                self.control_panel.update_commodities(commodities, selected);
                self.control_panel.busy = false;
                self.pipeline = Some(pipeline);
                self.refresh_view();
            }
            Ok(LoadResult::Error(error)) => {
                self.control_panel.set_status(format!("Error: {}", error));
                self.control_panel.busy = false;
            }
            Err(std::sync::mpsc::TryRecvError::Empty) => {
                self.load_rx = Some(rx);
            }
            Err(std::sync::mpsc::TryRecvError::Disconnected) => {
                self.control_panel.set_status("Error: loader stopped unexpectedly");
                self.control_panel.busy = false;
            }
        }
    }

    /// Recompute the view for the current selection and frequency
    fn refresh_view(&mut self) {
        let Some(pipeline) = &self.pipeline else {
            return;
        };

        let frequency = self.control_panel.frequency;
        match pipeline.view(&self.control_panel.selected, frequency) {
            Ok(view) => {
                debug!(
                    frequency = %frequency,
                    selected = self.control_panel.selected.len(),
                    buckets = view.len(),
                    "view updated"
                );
                self.control_panel.export_enabled = !view.columns.is_empty() && !view.is_empty();
                self.chart_viewer.set_chart_data(ChartData::from_view(view));
            }
            Err(e) => {
                error!(error = %e, "selection does not match the loaded sheet");
                self.control_panel.export_enabled = false;
                self.chart_viewer.clear();
                self.control_panel.set_status(format!("Error: {}", e));
            }
        }
    }

    /// Handle CSV export of the current view
    fn handle_export_csv(&mut self) {
        let Some(chart_data) = &self.chart_viewer.chart_data else {
            self.control_panel.set_status("Nothing to export");
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name("commodity_pct_change.csv")
            .save_file()
        else {
            return; // User cancelled
        };

        let status = match write_csv(&chart_data.view, &path) {
            Ok(()) => format!("Exported {}", path.display()),
            Err(e) => format!("Error: {}", e),
        };
        self.control_panel.set_status(status);
    }

    /// Handle PNG export of the current chart
    fn handle_export_png(&mut self) {
        let Some(chart_data) = &self.chart_viewer.chart_data else {
            self.control_panel.set_status("Nothing to export");
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name("commodity_pct_change.png")
            .save_file()
        else {
            return; // User cancelled
        };

        match StaticChartRenderer::render_png(chart_data, &path, self.settings.export_size) {
            Ok(()) => {
                self.control_panel
                    .set_status(format!("Exported {}", path.display()));
                if let Err(e) = open::that(&path) {
                    warn!(error = %e, "could not open exported chart");
                }
            }
            Err(e) => {
                self.control_panel.set_status(format!("Error: {}", e));
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        // Request repaint while loading
        if self.load_rx.is_some() {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::SelectionChanged => self.refresh_view(),
                        ControlPanelAction::ExportCsv => self.handle_export_csv(),
                        ControlPanelAction::ExportPng => self.handle_export_png(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui);
        });
    }
}

impl Drop for DashboardApp {
    fn drop(&mut self) {
        info!("dashboard closed");
    }
}
