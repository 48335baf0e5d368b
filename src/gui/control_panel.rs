//! Control Panel Widget
//! Left side panel with the data source, frequency and commodity controls.

use crate::data::Frequency;
use egui::{Color32, RichText, ScrollArea};
use std::path::PathBuf;

/// Left side control panel with file selection and chart controls.
pub struct ControlPanel {
    pub csv_path: Option<PathBuf>,
    pub frequency: Frequency,
    /// Every commodity in the loaded sheet, in file order.
    pub commodities: Vec<String>,
    /// Selected commodities in the order they were picked.
    pub selected: Vec<String>,
    pub filter: String,
    pub busy: bool,
    pub status: String,
    pub export_enabled: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            csv_path: None,
            frequency: Frequency::default(),
            commodities: Vec::new(),
            selected: Vec::new(),
            filter: String::new(),
            busy: false,
            status: "Ready".to_string(),
            export_enabled: false,
        }
    }
}

impl ControlPanel {
    pub fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            ..Self::default()
        }
    }

    /// Replace the commodity list after a sheet is loaded.
    pub fn update_commodities(&mut self, commodities: Vec<String>, selected: Vec<String>) {
        self.commodities = commodities;
        self.selected = selected;
        self.filter.clear();
    }

    /// Add or remove one commodity; additions go to the end of the selection.
    pub fn toggle(&mut self, name: &str, on: bool) {
        let present = self.selected.iter().any(|s| s == name);
        if on && !present {
            self.selected.push(name.to_string());
        } else if !on {
            self.selected.retain(|s| s != name);
        }
    }

    /// Commodities whose name contains the filter text, ignoring case.
    pub fn visible_commodities(&self) -> Vec<&String> {
        let needle = self.filter.trim().to_lowercase();
        self.commodities
            .iter()
            .filter(|c| needle.is_empty() || c.to_lowercase().contains(&needle))
            .collect()
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📈 Commodity Dash")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Percentage Change Explorer")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .csv_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if self.csv_path.is_some() {
                            Color32::WHITE
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.add_enabled_ui(!self.busy, |ui| {
                            if ui.button("📂 Browse").clicked() {
                                action = ControlPanelAction::BrowseCsv;
                            }
                        });
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Frequency Section =====
        ui.label(RichText::new("⏱ Frequency").size(14.0).strong());
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            for frequency in Frequency::ALL {
                if ui
                    .radio_value(&mut self.frequency, frequency, frequency.label())
                    .changed()
                {
                    action = ControlPanelAction::SelectionChanged;
                }
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Commodity Section =====
        ui.label(RichText::new("🛢 Commodities").size(14.0).strong());
        ui.add_space(5.0);

        ui.add(
            egui::TextEdit::singleline(&mut self.filter)
                .hint_text("Select a commodity")
                .desired_width(f32::INFINITY),
        )
        .on_hover_text("Filter the list, then tick the commodities to plot.");

        ui.add_space(5.0);

        let mut toggled: Option<(String, bool)> = None;
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(5.0)
            .show(ui, |ui| {
                ScrollArea::vertical().max_height(260.0).show(ui, |ui| {
                    for name in self.visible_commodities() {
                        let mut checked = self.selected.contains(name);
                        if ui.checkbox(&mut checked, name.as_str()).changed() {
                            toggled = Some((name.clone(), checked));
                        }
                    }
                });
            });

        if let Some((name, on)) = toggled {
            self.toggle(&name, on);
            action = ControlPanelAction::SelectionChanged;
        }

        ui.add_space(5.0);
        ui.horizontal(|ui| {
            if ui.small_button("Clear All").clicked() && !self.selected.is_empty() {
                self.selected.clear();
                action = ControlPanelAction::SelectionChanged;
            }
        });

        if !self.selected.is_empty() {
            ui.add_space(5.0);
            ui.label(RichText::new("Selected:").size(11.0).color(Color32::GRAY));
            let mut removed: Option<String> = None;
            ui.horizontal_wrapped(|ui| {
                for name in &self.selected {
                    if ui.small_button(format!("{} ✖", name)).clicked() {
                        removed = Some(name.clone());
                    }
                }
            });
            if let Some(name) = removed {
                self.toggle(&name, false);
                action = ControlPanelAction::SelectionChanged;
            }
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export Buttons =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.export_enabled && !self.busy, |ui| {
                let png_button = egui::Button::new(RichText::new("🖼 Export PNG").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(png_button).clicked() {
                    action = ControlPanelAction::ExportPng;
                }

                ui.add_space(8.0);

                let csv_button = egui::Button::new(RichText::new("📄 Export CSV").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(csv_button).clicked() {
                    action = ControlPanelAction::ExportCsv;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        ui.horizontal(|ui| {
            if self.busy {
                ui.spinner();
            }
            let status_color = if self.status.starts_with("Error") {
                Color32::from_rgb(220, 53, 69)
            } else {
                Color32::GRAY
            };
            ui.label(RichText::new(&self.status).size(11.0).color(status_color));
        });

        action
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    SelectionChanged,
    ExportCsv,
    ExportPng,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> ControlPanel {
        let mut panel = ControlPanel::new(Frequency::Quarterly);
        panel.update_commodities(
            vec!["Gold".into(), "Coffee, Arabica".into(), "Coffee, Robusta".into()],
            vec!["Gold".into()],
        );
        panel
    }

    #[test]
    fn test_toggle_keeps_pick_order() {
        let mut panel = panel();
        panel.toggle("Coffee, Robusta", true);
        panel.toggle("Coffee, Arabica", true);
        panel.toggle("Gold", true);
        assert_eq!(panel.selected, vec!["Gold", "Coffee, Robusta", "Coffee, Arabica"]);

        panel.toggle("Gold", false);
        assert_eq!(panel.selected, vec!["Coffee, Robusta", "Coffee, Arabica"]);
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let mut panel = panel();
        panel.filter = "  COFFEE ".into();
        assert_eq!(panel.visible_commodities(), vec!["Coffee, Arabica", "Coffee, Robusta"]);
        panel.filter.clear();
        assert_eq!(panel.visible_commodities().len(), 3);
        assert_eq!(panel.frequency, Frequency::Quarterly);
    }
}
