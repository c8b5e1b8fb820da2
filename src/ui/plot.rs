use eframe::egui::Ui;
use egui_plot::{Line, Plot, PlotPoints};

use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Transmission plot (central panel)
// ---------------------------------------------------------------------------

/// Render the selected material's transmission-vs-wavelength figure.
pub fn transmission_plot(ui: &mut Ui, state: &ViewerState) {
    let Some(material) = state.selected else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No measurements to plot");
        });
        return;
    };

    ui.heading(format!(
        "{material} — Transmission vs Wavelength (r ≤ {} nm)",
        state.max_radius_nm
    ));

    Plot::new(("transmission_plot", material.column_name()))
        .legend(egui_plot::Legend::default())
        .x_axis_label("Wavelength (nm)")
        .y_axis_label("Transmission")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for curve in state.selected_curves() {
                if !state.is_visible(material, curve.radius_nm) {
                    continue;
                }
                let points: PlotPoints = curve.points.iter().copied().collect();
                let line = Line::new(points)
                    .name(format!("r = {} nm", curve.radius_nm))
                    .color(state.color_map.color_for(curve.radius_nm))
                    .width(1.5);

                plot_ui.line(line);
            }
        });
}
