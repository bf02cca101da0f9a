use eframe::egui::{self, RichText, Ui};

use crate::interactome::InteractionRecord;
use crate::util::format_score;

use super::InteractomeApp;
use super::render_utils::edge_color;

const ROW_HEIGHT: f32 = 22.0;

fn evidence_label(record: &InteractionRecord) -> RichText {
    let text = if record.is_verified() {
        "verified"
    } else {
        "predicted"
    };
    RichText::new(text).color(edge_color(record.is_verified()))
}

fn interactions_involving(records: &[InteractionRecord], center: &str) -> usize {
    records.iter().filter(|record| record.involves(center)).count()
}

impl InteractomeApp {
    pub(super) fn draw_table(&mut self, ui: &mut Ui) {
        let state = self.controller.state();
        let Some(snapshot) = state.snapshot() else {
            return;
        };
        let center = snapshot.center();
        let records = state.records();

        ui.heading(format!(
            "{} interactions for {center}",
            interactions_involving(records, center)
        ));
        ui.label(format!(
            "More than {} interactions are shown as a table. Click a partner to focus it.",
            state.selector().table_threshold()
        ));
        ui.add_space(6.0);

        let mut activated = None;
        let column_width = (ui.available_width() / 4.0).max(90.0);

        egui::Grid::new("interaction_table_header")
            .num_columns(4)
            .min_col_width(column_width)
            .show(ui, |ui| {
                ui.label(RichText::new("Protein 1").strong());
                ui.label(RichText::new("Protein 2").strong());
                ui.label(RichText::new("Score").strong());
                ui.label(RichText::new("Evidence").strong());
                ui.end_row();
            });
        ui.separator();

        egui::ScrollArea::vertical()
            .id_salt("interaction_table_rows")
            .auto_shrink([false, false])
            .show_rows(ui, ROW_HEIGHT, records.len(), |ui, row_range| {
                egui::Grid::new(("interaction_table", row_range.start))
                    .num_columns(4)
                    .min_col_width(column_width)
                    .min_row_height(ROW_HEIGHT)
                    .striped(true)
                    .show(ui, |ui| {
                        for record in &records[row_range] {
                            for id in [record.entity_a(), record.entity_b()] {
                                if id == center {
                                    ui.label(RichText::new(id).strong());
                                } else if ui.link(id).clicked() {
                                    activated = Some(id.to_owned());
                                }
                            }
                            ui.label(format_score(record.score()));
                            ui.label(evidence_label(record));
                            ui.end_row();
                        }
                    });
            });

        if let Some(node_id) = activated {
            self.activate(&node_id);
        }
    }
}
