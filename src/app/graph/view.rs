use eframe::egui::{self, Sense, Ui};

use super::super::OntologyGraphApp;
use super::super::render_utils::{PainterSurface, Viewport};

impl OntologyGraphApp {
    /// Lays out the canvas, routes pointer input in logical coordinates and runs one frame.
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let viewport = Viewport::fit(rect, self.controller.bounds());

        let (pointer, pressed, released) = ui.input(|input| {
            (
                input.pointer.interact_pos(),
                input.pointer.primary_pressed(),
                input.pointer.primary_released(),
            )
        });

        if let Some(screen) = pointer {
            let logical = viewport.to_logical(screen);
            if pressed && response.hovered() {
                self.controller.pointer_down(logical);
            }
            if self.controller.is_dragging() {
                self.controller.pointer_move(logical);
            }
        }
        if released {
            self.controller.pointer_up();
        }

        let hover = ui
            .input(|input| input.pointer.hover_pos())
            .filter(|screen| rect.contains(*screen))
            .and_then(|screen| self.controller.hit_test(viewport.to_logical(screen)));
        if self.controller.is_dragging() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::Grabbing;
            });
        } else if hover.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        let painter = ui.painter_at(rect);
        let mut surface = PainterSurface::new(&painter, viewport);
        self.controller.on_frame(&mut surface, ui.ctx());
    }
}
