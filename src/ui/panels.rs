use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Left side panel – material and radius selection
// ---------------------------------------------------------------------------

/// Render the left selection panel.
pub fn side_panel(ui: &mut Ui, state: &mut ViewerState) {
    ui.heading("Material");
    ui.separator();

    if state.curves.is_empty() {
        ui.label("No dataset loaded.");
        return;
    }

    // Collect what we need so we can mutate state inside the loop.
    let materials: Vec<_> = state.curves.iter().map(|(m, _)| *m).collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for material in &materials {
                let is_selected = state.selected == Some(*material);
                if ui
                    .selectable_label(is_selected, material.column_name())
                    .clicked()
                {
                    state.selected = Some(*material);
                }
            }
            ui.separator();

            if let Some(material) = state.selected {
                let radii: Vec<f64> = state
                    .selected_curves()
                    .iter()
                    .map(|c| c.radius_nm)
                    .collect();
                let n_visible = radii
                    .iter()
                    .filter(|&&r| state.is_visible(material, r))
                    .count();
                let header_text = format!("Radius  ({n_visible}/{})", radii.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(("radius", material.column_name()))
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.show_all(material);
                            }
                            if ui.small_button("None").clicked() {
                                state.hide_all(material);
                            }
                        });

                        for r in &radii {
                            let text = RichText::new(format!("r = {r} nm"))
                                .color(state.color_map.color_for(*r));
                            let mut checked = state.is_visible(material, *r);
                            if ui.checkbox(&mut checked, text).changed() {
                                state.toggle_radius(material, *r);
                            }
                        }
                    });
            }

            ui.separator();
            ui.strong(format!("avg_visible_T ≥ {}", state.threshold));
            if state.feasible.is_empty() {
                ui.label("none");
            }
            for m in &state.feasible {
                ui.label(format!(
                    "{} r = {} nm: {:.4}",
                    m.material, m.radius_nm, m.avg_visible_t
                ));
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top status bar.
pub fn top_bar(ui: &mut Ui, state: &ViewerState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        let n_curves: usize = state.curves.iter().map(|(_, c)| c.len()).sum();
        ui.label(format!(
            "{} materials, {} curves, r ≤ {} nm",
            state.curves.len(),
            n_curves,
            state.max_radius_nm
        ));
        ui.separator();
        ui.label(format!("{} feasible configurations", state.feasible.len()));
    });
}
