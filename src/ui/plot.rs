use eframe::egui::{self, Align2, Color32, FontId, Rect, ScrollArea, Sense, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoints, Points};

use rusty_eda::data::filter::{filter, FilterSpec};
use rusty_eda::data::model::{FieldKind, RecordSet};
use rusty_eda::data::series::{histogram, scatter};
use rusty_eda::data::stats::{category_counts, CorrelationMatrix};

use crate::color::diverging;
use crate::state::AppState;

const PLOT_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Plots tab (central panel)
// ---------------------------------------------------------------------------

pub fn plots_tab(ui: &mut Ui, state: &mut AppState) {
    if !state.show_plot {
        ui.label("Plots are hidden (enable \"Show plots\" in the side panel).");
        return;
    }
    let Some(visible) = state.visible.clone() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Generate data or open a file  (File → Open…)");
        });
        return;
    };

    let numeric: Vec<String> = visible
        .schema()
        .numeric_fields()
        .map(|(_, f)| f.name.clone())
        .collect();
    let categorical: Vec<String> = visible
        .schema()
        .fields()
        .iter()
        .filter(|f| f.kind == FieldKind::Categorical)
        .map(|f| f.name.clone())
        .collect();

    ScrollArea::vertical().show(ui, |ui: &mut Ui| {
        ui.heading("Distribution");
        histogram_section(ui, state, &visible, &numeric);

        ui.add_space(12.0);
        ui.heading("Correlation matrix");
        match &state.correlation {
            Some(corr) if !corr.is_empty() => correlation_heatmap(ui, corr),
            _ => {
                ui.label("No numeric fields.");
            }
        }

        ui.add_space(12.0);
        ui.heading("Category counts");
        category_section(ui, state, &visible, &categorical);

        ui.add_space(12.0);
        ui.heading("Scatter");
        scatter_section(ui, state, &visible, &numeric);
    });
}

/// Combo box over `options` bound to `selected`; returns whether it changed.
fn field_picker(ui: &mut Ui, label: &str, selected: &mut Option<String>, options: &[String]) -> bool {
    let before = selected.clone();
    egui::ComboBox::from_label(label)
        .selected_text(selected.as_deref().unwrap_or("–"))
        .show_ui(ui, |ui: &mut Ui| {
            for option in options {
                ui.selectable_value(selected, Some(option.clone()), option.as_str());
            }
        });
    *selected != before
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

fn histogram_section(ui: &mut Ui, state: &mut AppState, visible: &RecordSet, numeric: &[String]) {
    ui.horizontal(|ui: &mut Ui| {
        field_picker(ui, "field", &mut state.hist_field, numeric);
        ui.add(egui::Slider::new(&mut state.histogram_bins, 1..=50).text("bins"));
    });
    let Some(field) = state.hist_field.as_deref() else {
        ui.label("No numeric fields.");
        return;
    };

    let hist = match histogram(visible, field, state.histogram_bins) {
        Ok(h) => h,
        Err(e) => {
            ui.label(format!("{e}"));
            return;
        }
    };
    let bars: Vec<Bar> = hist
        .bins()
        .map(|(left, width, count)| {
            Bar::new(left + width / 2.0, count as f64)
                .width(width)
                .name(format!("[{left:.2}, {:.2})", left + width))
        })
        .collect();

    Plot::new("histogram")
        .height(PLOT_HEIGHT)
        .x_axis_label(field)
        .y_axis_label("count")
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(Color32::LIGHT_BLUE).name(field));
        });
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

fn correlation_heatmap(ui: &mut Ui, corr: &CorrelationMatrix) {
    let n = corr.len();
    let label_width = 120.0;
    let header_height = 20.0;
    let cell = ((ui.available_width() - label_width) / n as f32).clamp(36.0, 90.0);
    let size = egui::vec2(label_width + cell * n as f32, header_height + cell * n as f32);
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let origin = response.rect.min;
    let font = FontId::proportional(11.0);
    let text_color = ui.visuals().text_color();

    for (j, name) in corr.fields().iter().enumerate() {
        let center = origin + egui::vec2(label_width + cell * (j as f32 + 0.5), header_height / 2.0);
        painter.text(center, Align2::CENTER_CENTER, truncate(name, 9), font.clone(), text_color);
    }

    for (i, row_name) in corr.fields().iter().enumerate() {
        let y = header_height + cell * i as f32;
        painter.text(
            origin + egui::vec2(label_width - 6.0, y + cell / 2.0),
            Align2::RIGHT_CENTER,
            truncate(row_name, 16),
            font.clone(),
            text_color,
        );
        for j in 0..n {
            let r = corr.get(i, j);
            let rect = Rect::from_min_size(
                origin + egui::vec2(label_width + cell * j as f32, y),
                egui::vec2(cell - 1.0, cell - 1.0),
            );
            painter.rect_filled(rect, 2.0, diverging(r));
            let label = if r.is_nan() { "NaN".to_string() } else { format!("{r:.2}") };
            painter.text(rect.center(), Align2::CENTER_CENTER, label, font.clone(), Color32::BLACK);
        }
    }
}

fn truncate(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        name.to_string()
    } else {
        let head: String = name.chars().take(max_chars - 1).collect();
        format!("{head}…")
    }
}

// ---------------------------------------------------------------------------
// Category counts
// ---------------------------------------------------------------------------

fn category_section(
    ui: &mut Ui,
    state: &mut AppState,
    visible: &RecordSet,
    categorical: &[String],
) {
    let mut selected = state.category_field.clone();
    if field_picker(ui, "categorical field", &mut selected, categorical) {
        if let Some(field) = selected {
            state.set_category_field(field);
        }
    }
    let Some(field) = state.category_field.as_deref() else {
        ui.label("No categorical fields.");
        return;
    };

    let counts = match category_counts(visible, field) {
        Ok(c) => c,
        Err(e) => {
            ui.label(format!("{e}"));
            return;
        }
    };
    let color_map = state.color_map.as_ref();

    Plot::new("category_counts")
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(field)
        .y_axis_label("count")
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            // One chart per value so each gets a legend entry.
            for (i, (value, count)) in counts.iter().enumerate() {
                let color = color_map.map_or(Color32::LIGHT_BLUE, |cm| cm.color_for(value));
                let bar = Bar::new(i as f64, *count as f64).width(0.8).name(value);
                plot_ui.bar_chart(BarChart::new(vec![bar]).color(color).name(value));
            }
        });
}

// ---------------------------------------------------------------------------
// Scatter
// ---------------------------------------------------------------------------

fn scatter_section(ui: &mut Ui, state: &mut AppState, visible: &RecordSet, numeric: &[String]) {
    ui.horizontal(|ui: &mut Ui| {
        field_picker(ui, "x", &mut state.scatter_x, numeric);
        field_picker(ui, "y", &mut state.scatter_y, numeric);
    });
    let (Some(x), Some(y)) = (state.scatter_x.as_deref(), state.scatter_y.as_deref()) else {
        ui.label("Need numeric fields for a scatter plot.");
        return;
    };

    // Split points by the colour field when there is one.
    let mut series: Vec<(String, Color32, Vec<[f64; 2]>)> = Vec::new();
    match &state.color_map {
        Some(cm) => {
            for (value, color) in cm.legend_entries() {
                let mut spec = FilterSpec::default().allow(&cm.column, [value.as_str()]);
                spec.keep_missing = false;
                let points = filter(visible, &spec).and_then(|group| scatter(&group, x, y));
                match points {
                    Ok(points) => series.push((value, color, points)),
                    Err(e) => log::warn!("scatter group '{value}' skipped: {e}"),
                }
            }
        }
        None => match scatter(visible, x, y) {
            Ok(points) => series.push((format!("{y} vs {x}"), Color32::LIGHT_BLUE, points)),
            Err(e) => {
                ui.label(format!("{e}"));
                return;
            }
        },
    }

    Plot::new("scatter")
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(x)
        .y_axis_label(y)
        .show(ui, |plot_ui| {
            for (name, color, points) in series {
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .radius(2.5)
                        .color(color)
                        .name(name),
                );
            }
        });
}

#[cfg(test)]
mod tests {
    use super::truncate;

    #[test]
    fn truncates_long_labels() {
        assert_eq!(truncate("age", 9), "age");
        assert_eq!(truncate("registration_date", 9), "registra…");
    }
}
