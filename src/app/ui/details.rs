use eframe::egui::{self, RichText, Sense, Ui, vec2};

use crate::data::{GraphNode, scalar_text};
use crate::util::truncate_chars;

use super::super::render_utils::NodeCategory;
use super::super::{OntologyGraphApp, PROPERTY_VALUE_MAX_CHARS};

/// Property rows for the details panel, values cut to the display limit.
fn property_rows(node: &GraphNode) -> Vec<(String, String)> {
    node.properties
        .iter()
        .map(|(key, value)| {
            let text = scalar_text(value).unwrap_or_else(|| "N/A".to_owned());
            (
                key.clone(),
                truncate_chars(&text, PROPERTY_VALUE_MAX_CHARS).to_owned(),
            )
        })
        .collect()
}

fn joined_labels(node: &GraphNode) -> String {
    if node.labels.is_empty() {
        "N/A".to_owned()
    } else {
        node.labels.join(", ")
    }
}

impl OntologyGraphApp {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Statistics");
        match self.controller.stats() {
            Some(stats) => {
                egui::Grid::new("stats_grid").num_columns(2).show(ui, |ui| {
                    ui.label("Nodes");
                    ui.label(stats.node_count.to_string());
                    ui.end_row();
                    ui.label("Relationships");
                    ui.label(stats.relationship_count.to_string());
                    ui.end_row();
                });
            }
            None => {
                ui.label("No graph loaded.");
            }
        }

        ui.separator();
        ui.heading("Legend");
        for category in NodeCategory::LEGEND {
            ui.horizontal(|ui| {
                let (rect, _) = ui.allocate_exact_size(vec2(14.0, 14.0), Sense::hover());
                ui.painter()
                    .circle_filled(rect.center(), 6.0, category.color());
                ui.label(category.legend_label());
            });
        }

        ui.separator();
        ui.heading("Node Details");
        ui.add_space(6.0);

        let Some(node) = self.controller.selected() else {
            ui.label("Click a node in the graph, or search, to see its details.");
            return;
        };

        let title = node.display_label();
        let node_id = node.id.clone();
        let labels = joined_labels(node);
        let properties = property_rows(node);
        let connections = self.controller.selected_connections();

        ui.label(RichText::new(title).strong());
        ui.small(node_id.as_str());
        ui.add_space(6.0);
        ui.label(format!("Labels: {labels}"));

        ui.separator();
        ui.label(RichText::new("Properties").strong());
        if properties.is_empty() {
            ui.label("No properties.");
        } else {
            egui::Grid::new("properties_grid")
                .num_columns(2)
                .striped(true)
                .show(ui, |ui| {
                    for (key, value) in &properties {
                        ui.label(key);
                        ui.label(value);
                        ui.end_row();
                    }
                });
        }

        ui.separator();
        ui.label(RichText::new("Connections").strong());
        if connections.is_empty() {
            ui.label("No drawable relationships.");
            return;
        }

        let mut pending_selection = None;
        egui::ScrollArea::vertical()
            .id_salt("connections_scroll")
            .max_height(280.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for connection in &connections {
                    let arrow = if connection.outgoing { "→" } else { "←" };
                    let text = format!(
                        "{arrow} {}  {}",
                        connection.suffix, connection.neighbor_label
                    );
                    if ui
                        .link(text)
                        .on_hover_text(format!("{}\n{}", connection.kind, connection.neighbor_id))
                        .clicked()
                    {
                        pending_selection = Some(connection.neighbor_id.clone());
                    }
                }
            });

        if let Some(id) = pending_selection {
            self.controller.select_by_id(&id);
        }
    }
}
