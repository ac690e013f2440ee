use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use rusty_eda::data::model::RecordSet;
use rusty_eda::data::stats::{CategoricalSummary, NumericSummary};

use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;

fn no_data(ui: &mut Ui) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading("Generate data or open a file  (File → Open…)");
    });
}

/// Render a float the way the statistics tables show them.
fn fmt_stat(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else {
        format!("{v:.2}")
    }
}

// ---------------------------------------------------------------------------
// Data tab: preview, shape, dtypes
// ---------------------------------------------------------------------------

pub fn data_tab(ui: &mut Ui, state: &AppState) {
    let Some(visible) = &state.visible else {
        no_data(ui);
        return;
    };

    let (rows, cols) = visible.shape();
    ui.label(format!("Shape: {rows} rows × {cols} fields"));

    ui.collapsing("Field types", |ui: &mut Ui| {
        egui::Grid::new("dtypes").striped(true).show(ui, |ui: &mut Ui| {
            for (name, kind) in visible.dtypes() {
                ui.label(name);
                ui.monospace(kind.to_string());
                ui.end_row();
            }
        });
    });

    ui.separator();
    ui.strong(format!(
        "Preview (first {} records)",
        rows.min(state.config.preview_rows)
    ));
    ui.push_id("preview", |ui: &mut Ui| {
        preview_table(ui, visible, state.config.preview_rows);
    });
}

fn preview_table(ui: &mut Ui, records: &RecordSet, limit: usize) {
    let names: Vec<&str> = records.schema().names().collect();
    let shown = records.len().min(limit);

    ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .columns(Column::auto().at_least(60.0), names.len())
            .header(20.0, |mut header| {
                for name in &names {
                    header.col(|ui: &mut Ui| {
                        ui.strong(*name);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, shown, |mut row| {
                    let record = &records.records()[row.index()];
                    for value in record.values() {
                        row.col(|ui: &mut Ui| {
                            ui.label(value.to_string());
                        });
                    }
                });
            });
    });
}

// ---------------------------------------------------------------------------
// Statistics tab: describe + null counts
// ---------------------------------------------------------------------------

pub fn statistics_tab(ui: &mut Ui, state: &AppState) {
    if state.visible.is_none() {
        no_data(ui);
        return;
    }

    ScrollArea::vertical().show(ui, |ui: &mut Ui| {
        ui.heading("Numeric fields");
        let numeric: Vec<&NumericSummary> = state.stats.numeric_fields().collect();
        ui.push_id("numeric_stats", |ui: &mut Ui| numeric_table(ui, &numeric));

        ui.add_space(12.0);
        ui.heading("Other fields");
        let categorical: Vec<&CategoricalSummary> = state.stats.categorical_fields().collect();
        ui.push_id("categorical_stats", |ui: &mut Ui| categorical_table(ui, &categorical));

        ui.add_space(12.0);
        ui.heading("Missing values");
        egui::Grid::new("null_counts").striped(true).show(ui, |ui: &mut Ui| {
            for (name, nulls) in &state.nulls {
                ui.label(name.as_str());
                ui.monospace(nulls.to_string());
                ui.end_row();
            }
        });
    });
}

fn numeric_table(ui: &mut Ui, rows: &[&NumericSummary]) {
    const HEADERS: [&str; 9] = ["field", "count", "mean", "std", "min", "25%", "50%", "75%", "max"];
    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .columns(Column::auto().at_least(60.0), HEADERS.len())
        .header(20.0, |mut header| {
            for h in HEADERS {
                header.col(|ui: &mut Ui| {
                    ui.strong(h);
                });
            }
        })
        .body(|mut body| {
            for s in rows {
                body.row(ROW_HEIGHT, |mut row| {
                    row.col(|ui: &mut Ui| {
                        ui.label(RichText::new(&s.field).strong());
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(s.count.to_string());
                    });
                    for v in [s.mean, s.std, s.min, s.p25, s.p50, s.p75, s.max] {
                        row.col(|ui: &mut Ui| {
                            ui.monospace(fmt_stat(v));
                        });
                    }
                });
            }
        });
}

fn categorical_table(ui: &mut Ui, rows: &[&CategoricalSummary]) {
    const HEADERS: [&str; 6] = ["field", "type", "count", "unique", "top", "freq"];
    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .columns(Column::auto().at_least(60.0), HEADERS.len())
        .header(20.0, |mut header| {
            for h in HEADERS {
                header.col(|ui: &mut Ui| {
                    ui.strong(h);
                });
            }
        })
        .body(|mut body| {
            for s in rows {
                body.row(ROW_HEIGHT, |mut row| {
                    row.col(|ui: &mut Ui| {
                        ui.label(RichText::new(&s.field).strong());
                    });
                    let cells = [
                        s.kind.to_string(),
                        s.count.to_string(),
                        s.unique.to_string(),
                        s.top.clone().unwrap_or_else(|| "–".to_string()),
                        s.freq.to_string(),
                    ];
                    for cell in cells {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell);
                        });
                    }
                });
            }
        });
}
