use eframe::egui::{self, Align, Button, Color32, Context, Key, Layout, TextEdit};

use super::super::OntologyGraphApp;
use super::super::graph::interaction::SearchOutcome;

const ERROR_COLOR: Color32 = Color32::from_rgb(0xc0, 0x39, 0x2b);
const NOTICE_COLOR: Color32 = Color32::from_rgb(0xd3, 0x54, 0x00);
const CANVAS_HINT: &str = "Drag nodes to adjust the layout, click a node to see its details";

impl OntologyGraphApp {
    pub(in crate::app) fn show(&mut self, ctx: &Context) {
        let is_loading = self.controller.is_loading();
        let mut reload_requested = false;

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Ontology Graph");
                    ui.separator();
                    ui.label(format!("source: {}", self.provider.describe()));

                    let refresh_text = if is_loading { "Loading..." } else { "Refresh" };
                    if ui
                        .add_enabled(!is_loading, Button::new(refresh_text))
                        .clicked()
                    {
                        reload_requested = true;
                    }
                    ui.separator();

                    let search_response = ui.add(
                        TextEdit::singleline(&mut self.search)
                            .hint_text("Search nodes...")
                            .desired_width(220.0),
                    );
                    if search_response.changed() {
                        self.notice = None;
                        self.controller.set_search_query(&self.search);
                    }
                    let submitted = search_response.lost_focus()
                        && ui.input(|input| input.key_pressed(Key::Enter));
                    if ui.button("Search").clicked() || submitted {
                        self.run_search();
                    }
                    if let Some(notice) = &self.notice {
                        ui.colored_label(NOTICE_COLOR, notice);
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(stats) = self.controller.stats() {
                            ui.label(format!("relationships: {}", stats.relationship_count));
                            ui.label(format!("nodes: {}", stats.node_count));
                        }
                    });
                });
            });

        if let Some(error) = &self.error {
            egui::TopBottomPanel::top("error_banner").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.colored_label(ERROR_COLOR, format!("Failed to load graph data: {error}"));
                    if ui.add_enabled(!is_loading, Button::new("Retry")).clicked() {
                        reload_requested = true;
                    }
                });
            });
        }

        egui::SidePanel::left("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if !self.controller.has_graph() {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    if is_loading {
                        ui.heading("Loading ontology graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    } else {
                        ui.heading("No graph loaded");
                        ui.label("Use Refresh to try again.");
                    }
                });
            } else if self.controller.is_empty() {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("No graph data");
                    ui.label("The data source returned no nodes.");
                });
            } else {
                ui.small(CANVAS_HINT);
                self.draw_graph(ui);
            }
        });

        if reload_requested {
            self.reload();
        }
    }

    fn run_search(&mut self) {
        let query = self.search.clone();
        if self.controller.search(&query) != SearchOutcome::Miss {
            self.notice = None;
        }
        self.handle_controller_events();
    }
}
