use eframe::egui;

use rusty_eda::config::DashboardConfig;

use crate::state::{AppState, Tab};
use crate::ui::{panels, plot, tables};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RustyEdaApp {
    pub state: AppState,
}

impl RustyEdaApp {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }
}

impl eframe::App for RustyEdaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: generation parameters and filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: tabs ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.state.tab, Tab::Data, "Data");
                ui.selectable_value(&mut self.state.tab, Tab::Statistics, "Statistics");
                ui.selectable_value(&mut self.state.tab, Tab::Plots, "Plots");
            });
            ui.separator();
            match self.state.tab {
                Tab::Data => tables::data_tab(ui, &self.state),
                Tab::Statistics => tables::statistics_tab(ui, &self.state),
                Tab::Plots => plot::plots_tab(ui, &mut self.state),
            }
        });
    }
}
