use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot};

/// Window title.
pub const TITLE: &str = "Butterfly Loop with p1, n1, n2, p2 Regions";

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ButterflyApp {
    pub state: AppState,
}

impl ButterflyApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for ButterflyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: d33 results ----
        egui::SidePanel::left("results_panel")
            .default_width(280.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::loop_plot(ui, &self.state);
        });
    }
}

/// Open the viewer and block until the window is closed.
pub fn run(state: AppState) -> eframe::Result {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 600.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        TITLE,
        options,
        Box::new(|_cc| Ok(Box::new(ButterflyApp::new(state)))),
    )
}
