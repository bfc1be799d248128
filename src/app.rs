use std::sync::Arc;

use eframe::egui;

use crate::cache::Resources;
use crate::state::{AppState, Page};
use crate::ui::{explore, panels, predict};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct VehiclePriceApp {
    pub state: AppState,
}

impl VehiclePriceApp {
    pub fn new(resources: Arc<Resources>) -> Self {
        Self {
            state: AppState::new(resources),
        }
    }
}

impl eframe::App for VehiclePriceApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: status bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.state);
        });

        // ---- Left side panel: navigation ----
        egui::SidePanel::left("navigation_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: current page ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.page {
            Page::Explore => explore::explore_page(ui, &mut self.state),
            Page::Predict => predict::predict_page(ui, &mut self.state),
        });
    }
}
