use eframe::egui::Ui;
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

use crate::analysis::report::REPORT_ORDER;
use crate::app::TITLE;
use crate::color::{FULL_LOOP, region_color};
use crate::data::model::Sample;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Butterfly loop plot (central panel)
// ---------------------------------------------------------------------------

fn to_points(samples: &[Sample]) -> PlotPoints<'_> {
    samples
        .iter()
        .filter(|s| s.is_finite())
        .map(|s| [s.voltage, s.displacement])
        .collect()
}

/// Render the full loop with each non-empty region overplotted.
pub fn loop_plot(ui: &mut Ui, state: &AppState) {
    let (Some(sweep), Some(analysis)) = (&state.sweep, &state.analysis) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view a loop  (File → Open…)");
        });
        return;
    };

    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(TITLE);
    });

    Plot::new("butterfly_plot")
        .legend(Legend::default())
        .x_axis_label("Voltage (V)")
        .y_axis_label("Displacement (nm)")
        .show_grid(true)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(to_points(sweep.samples()))
                    .name("Full loop")
                    .color(FULL_LOOP)
                    .width(1.5),
            );

            for kind in REPORT_ORDER {
                let Some((start, end)) = analysis.partition.region(kind).span else {
                    continue;
                };
                plot_ui.points(
                    Points::new(to_points(sweep.slice(start, end)))
                        .name(kind.label())
                        .color(region_color(kind))
                        .radius(2.5),
                );
            }
        });
}
