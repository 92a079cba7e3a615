use anyhow::{Result, ensure};
use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Stroke, Vec2};

use super::Bounds;
use super::render::Surface;

pub(super) const BACKGROUND_COLOR: Color32 = Color32::from_rgb(250, 251, 252);
pub(super) const LINK_COLOR: Color32 = Color32::from_rgb(0x95, 0xa5, 0xa6);
pub(super) const LINK_LABEL_COLOR: Color32 = Color32::from_rgb(0x7f, 0x8c, 0x8d);
pub(super) const NODE_LABEL_COLOR: Color32 = Color32::from_rgb(0x2c, 0x3e, 0x50);
pub(super) const OUTLINE_COLOR: Color32 = Color32::from_rgb(0x2c, 0x3e, 0x50);
pub(super) const SELECTED_OUTLINE_COLOR: Color32 = Color32::from_rgb(0xe7, 0x4c, 0x3c);
pub(super) const CANDIDATE_HALO_COLOR: Color32 = Color32::from_rgba_premultiplied(40, 120, 180, 150);

/// Color class of a node, decided by its first label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum NodeCategory {
    Class,
    Property,
    Individual,
    Ontology,
    Other,
    Unlabeled,
}

impl NodeCategory {
    pub(in crate::app) const LEGEND: [Self; 5] = [
        Self::Class,
        Self::Property,
        Self::Individual,
        Self::Ontology,
        Self::Other,
    ];

    /// Substring checks on the lower-cased first label, in priority order.
    pub(in crate::app) fn from_labels(labels: &[String]) -> Self {
        let Some(first) = labels.first() else {
            return Self::Unlabeled;
        };

        let label = first.to_lowercase();
        if label.contains("class") {
            Self::Class
        } else if label.contains("property") {
            Self::Property
        } else if label.contains("individual") || label.contains("instance") {
            Self::Individual
        } else if label.contains("ontology") {
            Self::Ontology
        } else {
            Self::Other
        }
    }

    pub(in crate::app) fn color(self) -> Color32 {
        match self {
            Self::Class => Color32::from_rgb(0x34, 0x98, 0xdb),
            Self::Property => Color32::from_rgb(0x2e, 0xcc, 0x71),
            Self::Individual => Color32::from_rgb(0xe7, 0x4c, 0x3c),
            Self::Ontology => Color32::from_rgb(0x9b, 0x59, 0xb6),
            Self::Other => Color32::from_rgb(0xf3, 0x9c, 0x12),
            Self::Unlabeled => Color32::from_rgb(0x95, 0xa5, 0xa6),
        }
    }

    pub(in crate::app) fn legend_label(self) -> &'static str {
        match self {
            Self::Class => "Class",
            Self::Property => "Property",
            Self::Individual => "Individual",
            Self::Ontology => "Ontology",
            Self::Other => "Other",
            Self::Unlabeled => "Unlabeled",
        }
    }
}

/// Maps the logical surface onto the canvas rect, preserving aspect ratio and centering it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Viewport {
    origin: Pos2,
    scale: f32,
    logical_size: Vec2,
}

impl Viewport {
    pub(super) fn fit(rect: Rect, bounds: Bounds) -> Self {
        let logical_size = bounds.size();
        let scale = (rect.width() / logical_size.x)
            .min(rect.height() / logical_size.y)
            .max(f32::EPSILON);
        let origin = rect.center() - (logical_size * scale) * 0.5;

        Self {
            origin,
            scale,
            logical_size,
        }
    }

    pub(super) fn scale(self) -> f32 {
        self.scale
    }

    pub(super) fn to_screen(self, logical: Pos2) -> Pos2 {
        self.origin + logical.to_vec2() * self.scale
    }

    pub(super) fn to_logical(self, screen: Pos2) -> Pos2 {
        ((screen - self.origin) / self.scale).to_pos2()
    }

    pub(super) fn screen_rect(self) -> Rect {
        Rect::from_min_size(self.origin, self.logical_size * self.scale)
    }
}

/// Draws logical-space primitives through an egui painter.
pub(super) struct PainterSurface<'a> {
    painter: &'a Painter,
    viewport: Viewport,
}

impl<'a> PainterSurface<'a> {
    pub(super) fn new(painter: &'a Painter, viewport: Viewport) -> Self {
        Self { painter, viewport }
    }

    fn scaled_stroke(&self, stroke: Stroke) -> Stroke {
        Stroke::new(stroke.width * self.viewport.scale(), stroke.color)
    }
}

fn ensure_finite(points: &[Pos2]) -> Result<()> {
    ensure!(
        points.iter().all(|point| point.x.is_finite() && point.y.is_finite()),
        "non-finite coordinate in draw call: {points:?}"
    );
    Ok(())
}

impl Surface for PainterSurface<'_> {
    fn clear(&mut self) -> Result<()> {
        self.painter
            .rect_filled(self.viewport.screen_rect(), 0.0, BACKGROUND_COLOR);
        Ok(())
    }

    fn line(&mut self, from: Pos2, to: Pos2, stroke: Stroke) -> Result<()> {
        ensure_finite(&[from, to])?;
        self.painter.line_segment(
            [self.viewport.to_screen(from), self.viewport.to_screen(to)],
            self.scaled_stroke(stroke),
        );
        Ok(())
    }

    fn circle(&mut self, center: Pos2, radius: f32, fill: Color32, stroke: Stroke) -> Result<()> {
        ensure_finite(&[center])?;
        self.painter.circle(
            self.viewport.to_screen(center),
            radius * self.viewport.scale(),
            fill,
            self.scaled_stroke(stroke),
        );
        Ok(())
    }

    fn text(
        &mut self,
        anchor: Pos2,
        align: Align2,
        text: &str,
        size: f32,
        color: Color32,
    ) -> Result<()> {
        ensure_finite(&[anchor])?;
        self.painter.text(
            self.viewport.to_screen(anchor),
            align,
            text,
            FontId::proportional((size * self.viewport.scale()).max(1.0)),
            color,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_owned()).collect()
    }

    #[test]
    fn category_priority_follows_first_label() {
        assert_eq!(NodeCategory::from_labels(&labels(&["Class"])), NodeCategory::Class);
        assert_eq!(
            NodeCategory::from_labels(&labels(&["ObjectProperty"])),
            NodeCategory::Property
        );
        assert_eq!(
            NodeCategory::from_labels(&labels(&["NamedIndividual", "Class"])),
            NodeCategory::Individual
        );
        assert_eq!(
            NodeCategory::from_labels(&labels(&["BaseStationInstance"])),
            NodeCategory::Individual
        );
        assert_eq!(
            NodeCategory::from_labels(&labels(&["Ontology"])),
            NodeCategory::Ontology
        );
        assert_eq!(
            NodeCategory::from_labels(&labels(&["PropertyClass"])),
            NodeCategory::Class
        );
        assert_eq!(NodeCategory::from_labels(&labels(&["Resource"])), NodeCategory::Other);
        assert_eq!(NodeCategory::from_labels(&[]), NodeCategory::Unlabeled);
    }

    #[test]
    fn category_colors_match_legend() {
        assert_eq!(NodeCategory::Class.color(), Color32::from_rgb(52, 152, 219));
        assert_eq!(NodeCategory::Individual.color(), Color32::from_rgb(231, 76, 60));
        assert_eq!(NodeCategory::Unlabeled.color(), Color32::from_rgb(149, 165, 166));
    }

    #[test]
    fn viewport_round_trips_and_letterboxes() {
        let rect = Rect::from_min_size(pos2(10.0, 20.0), Vec2::new(600.0, 600.0));
        let viewport = Viewport::fit(rect, Bounds::default());

        assert!((viewport.scale() - 0.5).abs() < 1e-6);
        assert_eq!(viewport.to_screen(pos2(0.0, 0.0)), pos2(10.0, 145.0));
        assert_eq!(viewport.to_screen(pos2(1200.0, 700.0)), pos2(610.0, 495.0));

        let logical = pos2(321.0, 123.0);
        let back = viewport.to_logical(viewport.to_screen(logical));
        assert!((back - logical).length() < 1e-3);
    }
}
