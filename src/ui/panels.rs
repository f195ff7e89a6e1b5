use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::region_color;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – d33 results
// ---------------------------------------------------------------------------

/// Render the left results panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("d33 estimates");
    ui.separator();

    let mut threshold = state.config.threshold;
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Zero-crossing threshold (V)");
        ui.add(
            egui::DragValue::new(&mut threshold)
                .speed(0.01)
                .range(0.0..=f64::MAX),
        );
    });
    if threshold != state.config.threshold {
        state.set_threshold(threshold);
    }
    ui.separator();

    let Some(analysis) = &state.analysis else {
        ui.label("No sweep loaded.");
        return;
    };
    let summary = &analysis.summary;

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in ["Region", "Samples", "d33 (pm/V)", "r²"] {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for r in &summary.regions {
                body.row(18.0, |mut row| {
                    row.col(|ui: &mut Ui| {
                        ui.label(RichText::new(r.region.label()).color(region_color(r.region)));
                    });
                    row.col(|ui: &mut Ui| {
                        match r.span {
                            Some((start, end)) => ui.label(format!("{start}–{end} ({})", end - start + 1)),
                            None => ui.label("empty"),
                        };
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(r.d33.map_or("—".to_string(), |v| format!("{v:.2}")));
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(r.r_squared.map_or("—".to_string(), |v| format!("{v:.4}")));
                    });
                });
            }
        });

    ui.separator();
    let fmt_avg = |v: Option<f64>| v.map_or("undefined".to_string(), |v| format!("{v:.2} pm/V"));
    ui.label(format!("Average positive d33: {}", fmt_avg(summary.average_positive)));
    ui.label(format!("Average negative d33: {}", fmt_avg(summary.average_negative)));

    if !summary.warnings.is_empty() {
        ui.separator();
        for w in &summary.warnings {
            ui.label(RichText::new(w).color(Color32::YELLOW));
        }
    }
    for notice in summary.regions.iter().filter_map(|r| r.notice.as_ref()) {
        ui.label(RichText::new(notice).weak());
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(sweep) = &state.sweep {
            ui.label(sweep.to_string());
            if let Some((lo, hi)) = sweep.voltage_range() {
                ui.label(format!("V ∈ [{lo:.2}, {hi:.2}]"));
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open hysteresis sweep")
        .add_filter(
            "Supported files",
            &["xlsx", "xlsm", "xls", "ods", "csv", "json", "parquet", "pq"],
        )
        .add_filter("Spreadsheet", &["xlsx", "xlsm", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load(&path);
    }
}
