use std::sync::Arc;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use rusty_eda::data::generator::Profile;
use rusty_eda::data::model::FieldKind;
use rusty_eda::data::{loader, writer};

use crate::state::{AppState, Source};

// ---------------------------------------------------------------------------
// Left side panel – generation parameters and filter widgets
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Data settings");
    ui.separator();
    generation_controls(ui, state);

    ui.add_space(8.0);
    ui.horizontal(|ui: &mut Ui| {
        ui.heading("Filters");
        if ui.small_button("Reset").clicked() {
            state.reset_filters();
        }
    });
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| filter_widgets(ui, state));
}

fn generation_controls(ui: &mut Ui, state: &mut AppState) {
    let mut changed = false;

    egui::ComboBox::from_label("Profile")
        .selected_text(state.profile.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            for profile in Profile::ALL {
                changed |= ui
                    .selectable_value(&mut state.profile, profile, profile.to_string())
                    .changed();
            }
        });

    let (min, max) = (state.config.rows_min, state.config.rows_max);
    changed |= ui
        .add(egui::Slider::new(&mut state.n_rows, min..=max).text("Rows"))
        .changed();

    ui.horizontal(|ui: &mut Ui| {
        changed |= ui.checkbox(&mut state.use_seed, "Seed").changed();
        changed |= ui
            .add_enabled(state.use_seed, egui::DragValue::new(&mut state.seed))
            .changed();
    });

    ui.checkbox(&mut state.show_plot, "Show plots");

    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Regenerate").clicked() {
            changed = true;
        }
        if ui
            .small_button("Clear cache")
            .on_hover_text("Forget every seeded data set generated so far")
            .clicked()
        {
            state.clear_cache();
        }
    });

    if changed {
        state.regenerate();
    }
}

fn filter_widgets(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = state.dataset.clone() else {
        return;
    };

    for field in dataset.schema().fields() {
        let name = field.name.as_str();
        match field.kind {
            FieldKind::Categorical => categorical_filter(ui, state, name),
            FieldKind::Text => text_filter(ui, state, name),
            FieldKind::Integer | FieldKind::Float => numeric_filter(ui, state, name, field.kind),
            FieldKind::Date => date_filter(ui, state, name),
        }
    }
}

fn categorical_filter(ui: &mut Ui, state: &mut AppState, name: &str) {
    let Some(all_values) = state.full_filters.categories.get(name).cloned() else {
        return;
    };
    let n_selected = state.filters.categories.get(name).map_or(0, |s| s.len());
    let header_text = format!("{name}  ({n_selected}/{})", all_values.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(name)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all(name);
                }
                if ui.small_button("None").clicked() {
                    state.select_none(name);
                }
            });

            for value in &all_values {
                let mut checked = state
                    .filters
                    .categories
                    .get(name)
                    .is_some_and(|s| s.contains(value));

                // Show colour swatch if this is the colour field
                let mut text = RichText::new(value.as_str());
                if let Some(cm) = state.color_map.as_ref().filter(|cm| cm.column == name) {
                    text = text.color(cm.color_for(value));
                }

                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_category(name, value);
                }
            }
        });
}

fn text_filter(ui: &mut Ui, state: &mut AppState, name: &str) {
    let Some(all_values) = state.full_filters.categories.get(name).cloned() else {
        return;
    };
    let current = state
        .filters
        .categories
        .get(name)
        .and_then(|s| s.iter().next().cloned());

    let mut choice = current.clone();
    egui::ComboBox::from_label(format!("Filter by {name}"))
        .selected_text(choice.as_deref().unwrap_or("All"))
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut choice, None, "All");
            for value in &all_values {
                ui.selectable_value(&mut choice, Some(value.clone()), value.as_str());
            }
        });
    if choice != current {
        state.choose_text(name, choice);
    }
}

fn numeric_filter(ui: &mut Ui, state: &mut AppState, name: &str, kind: FieldKind) {
    let Some(bounds) = state.full_filters.ranges.get(name).copied() else {
        return;
    };
    let Some(mut range) = state.filters.ranges.get(name).copied() else {
        return;
    };

    ui.label(RichText::new(name).strong());
    let step = if kind == FieldKind::Integer { 1.0 } else { 0.01 };
    let min_changed = ui
        .add(
            egui::Slider::new(&mut range.min, bounds.min..=bounds.max)
                .step_by(step)
                .text("min"),
        )
        .changed();
    let max_changed = ui
        .add(
            egui::Slider::new(&mut range.max, bounds.min..=bounds.max)
                .step_by(step)
                .text("max"),
        )
        .changed();
    if min_changed || max_changed {
        state.set_range(name, range.min, range.max);
    }
}

fn date_filter(ui: &mut Ui, state: &mut AppState, name: &str) {
    let Some(mut range) = state.filters.dates.get(name).copied() else {
        return;
    };

    ui.label(RichText::new(name).strong());
    let mut changed = false;
    ui.horizontal(|ui: &mut Ui| {
        ui.label("from");
        changed |= ui
            .add(DatePickerButton::new(&mut range.start).id_salt(&format!("{name}_start")))
            .changed();
        ui.label("to");
        changed |= ui
            .add(DatePickerButton::new(&mut range.end).id_salt(&format!("{name}_end")))
            .changed();
    });
    if changed {
        state.set_date_range(name, range.start, range.end);
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
            let can_export = state.visible.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export visible…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            let origin = match &state.source {
                Some(Source::Generated { profile, seed }) => match seed {
                    Some(seed) => format!("generated {profile} data, seed {seed}"),
                    None => format!("generated {profile} data"),
                },
                Some(Source::File(name)) => name.clone(),
                None => String::new(),
            };
            ui.label(format!(
                "{} records ({origin}), {} visible",
                ds.len(),
                state.visible_len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open tabular data")
        .add_filter("Supported files", &["parquet", "pq", "json", "csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        match loader::load_file_with(&path, &state.config.load_options()) {
            Ok(dataset) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                state.set_dataset(Arc::new(dataset), Source::File(name));
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let Some(visible) = &state.visible else {
        return;
    };
    let file = rfd::FileDialog::new()
        .set_title("Export visible records")
        .set_file_name("records.csv")
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .save_file();

    if let Some(path) = file {
        if let Err(e) = writer::write_file(visible, &path) {
            log::error!("Failed to export: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
