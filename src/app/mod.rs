use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use eframe::egui::{Context, Pos2, Vec2, pos2};
use log::{debug, info, warn};

use crate::data::{GraphDataProvider, GraphNode, Stats};

use controller::{ControllerEvent, GraphController};

mod controller;
mod frame_loop;
mod graph;
mod physics;
mod render;
mod render_utils;
mod ui;

/// Logical drawing surface, in drawing units. The canvas scales it to fit.
pub(in crate::app) const SURFACE_WIDTH: f32 = 1200.0;
pub(in crate::app) const SURFACE_HEIGHT: f32 = 700.0;
pub(in crate::app) const NODE_RADIUS: f32 = 20.0;
pub(in crate::app) const INITIAL_JITTER: f32 = 100.0;
pub(in crate::app) const LABEL_MAX_CHARS: usize = 15;
pub(in crate::app) const PROPERTY_VALUE_MAX_CHARS: usize = 50;

pub struct OntologyGraphApp {
    provider: Arc<dyn GraphDataProvider>,
    controller: GraphController,
    search: String,
    notice: Option<String>,
    error: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct Bounds {
    width: f32,
    height: f32,
}

pub(in crate::app) struct SimGraph {
    nodes: Vec<SimNode>,
    links: Vec<SimLink>,
    index_by_id: HashMap<String, usize>,
    stats: Stats,
    bounds: Bounds,
    physics_scratch: PhysicsScratch,
}

pub(in crate::app) struct SimNode {
    node: GraphNode,
    position: Pos2,
    velocity: Vec2,
    radius: f32,
    category: render_utils::NodeCategory,
    label: String,
}

/// Endpoints are indices into `SimGraph::nodes`; links never own nodes.
pub(in crate::app) struct SimLink {
    source: usize,
    target: usize,
    kind: String,
    suffix: String,
}

struct PhysicsScratch {
    forces: Vec<Vec2>,
    positions: Vec<Pos2>,
}

#[derive(Debug, Default)]
pub(in crate::app) struct InteractionState {
    selected: Option<usize>,
    dragged: Option<usize>,
    search_query: String,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct PhysicsConfig {
    repulsion: f32,
    rest_length: f32,
    spring_strength: f32,
    center_pull: f32,
    damping: f32,
    repulsion_mode: RepulsionMode,
}

/// How node-node repulsion is summed each tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) enum RepulsionMode {
    /// Every unordered pair, exactly.
    Pairwise,
    /// Quadtree approximation; cells narrower than `theta` times their distance act as one body.
    BarnesHut { theta: f32 },
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            repulsion: 1000.0,
            rest_length: 100.0,
            spring_strength: 0.01,
            center_pull: 0.001,
            damping: 0.85,
            repulsion_mode: RepulsionMode::Pairwise,
        }
    }
}

impl PhysicsConfig {
    /// Switches repulsion to the quadtree approximation when a positive `theta` is given.
    pub(in crate::app) fn with_barnes_hut(self, theta: Option<f32>) -> Self {
        match theta {
            Some(theta) if theta.is_finite() && theta > 0.0 => {
                info!("using Barnes-Hut repulsion with theta {theta}");
                Self {
                    repulsion_mode: RepulsionMode::BarnesHut { theta },
                    ..self
                }
            }
            Some(theta) => {
                warn!("ignoring invalid Barnes-Hut theta {theta}; using pairwise repulsion");
                self
            }
            None => self,
        }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            width: SURFACE_WIDTH,
            height: SURFACE_HEIGHT,
        }
    }
}

impl Bounds {
    pub(in crate::app) fn size(self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub(in crate::app) fn center(self) -> Pos2 {
        pos2(self.width / 2.0, self.height / 2.0)
    }

    /// Keeps a circle of `radius` fully inside the surface.
    pub(in crate::app) fn clamp(self, position: Pos2, radius: f32) -> Pos2 {
        pos2(
            position.x.max(radius).min(self.width - radius),
            position.y.max(radius).min(self.height - radius),
        )
    }
}

impl OntologyGraphApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        provider: Arc<dyn GraphDataProvider>,
        barnes_hut_theta: Option<f32>,
    ) -> Self {
        let physics = PhysicsConfig::default().with_barnes_hut(barnes_hut_theta);
        let mut controller = GraphController::new(Bounds::default(), physics);
        controller.load(Arc::clone(&provider));
        cc.egui_ctx.request_repaint();

        Self {
            provider,
            controller,
            search: String::new(),
            notice: None,
            error: None,
        }
    }

    pub(in crate::app) fn reload(&mut self) {
        self.notice = None;
        self.controller.load(Arc::clone(&self.provider));
    }

    fn handle_controller_events(&mut self) {
        for event in self.controller.drain_events() {
            match event {
                ControllerEvent::Loaded(_) => {
                    self.error = None;
                    self.notice = None;
                }
                ControllerEvent::LoadFailed(message) => {
                    self.error = Some(message);
                }
                ControllerEvent::SearchMiss(query) => {
                    self.notice = Some(format!("No node matches \"{query}\""));
                }
                ControllerEvent::SelectionChanged(selected) => {
                    debug!("selection changed to {selected:?}");
                }
            }
        }
    }
}

impl eframe::App for OntologyGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        if let Some(Err(error)) = self.controller.poll_load(ctx) {
            warn!("graph data load failed: {error}");
        }
        self.handle_controller_events();

        if self.controller.is_loading() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }

        self.show(ctx);
    }
}

impl Drop for OntologyGraphApp {
    fn drop(&mut self) {
        self.controller.teardown();
    }
}

#[cfg(test)]
pub(in crate::app) mod test_support {
    use std::cell::Cell;

    use eframe::egui::{Align2, Color32, Pos2, Stroke};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::data::GraphSnapshot;

    use super::frame_loop::FrameScheduler;
    use super::render::{DrawResult, Surface};
    use super::{Bounds, SimGraph};

    pub(in crate::app) fn snapshot(value: serde_json::Value) -> GraphSnapshot {
        serde_json::from_value(value).unwrap()
    }

    pub(in crate::app) fn build_graph(value: serde_json::Value) -> SimGraph {
        let mut rng = StdRng::seed_from_u64(7);
        SimGraph::from_snapshot(snapshot(value), Bounds::default(), &mut rng)
    }

    /// Stands in for the display's frame clock: counts how many frames were requested.
    #[derive(Default)]
    pub(in crate::app) struct CountingScheduler {
        requests: Cell<u64>,
    }

    impl CountingScheduler {
        pub(in crate::app) fn requests(&self) -> u64 {
            self.requests.get()
        }
    }

    impl FrameScheduler for CountingScheduler {
        fn request_frame(&self) {
            self.requests.set(self.requests.get() + 1);
        }
    }

    #[derive(Clone, Debug, PartialEq)]
    pub(in crate::app) enum DrawOp {
        Clear,
        Line {
            from: Pos2,
            to: Pos2,
            stroke: Stroke,
        },
        Circle {
            center: Pos2,
            radius: f32,
            fill: Color32,
            stroke: Stroke,
        },
        Text {
            anchor: Pos2,
            text: String,
            color: Color32,
        },
    }

    #[derive(Default)]
    pub(in crate::app) struct RecordingSurface {
        pub(in crate::app) ops: Vec<DrawOp>,
        pub(in crate::app) fail_on_text: bool,
    }

    impl RecordingSurface {
        pub(in crate::app) fn texts(&self) -> Vec<&str> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    DrawOp::Text { text, .. } => Some(text.as_str()),
                    _ => None,
                })
                .collect()
        }
    }

    impl Surface for RecordingSurface {
        fn clear(&mut self) -> DrawResult {
            self.ops.clear();
            self.ops.push(DrawOp::Clear);
            Ok(())
        }

        fn line(&mut self, from: Pos2, to: Pos2, stroke: Stroke) -> DrawResult {
            self.ops.push(DrawOp::Line { from, to, stroke });
            Ok(())
        }

        fn circle(&mut self, center: Pos2, radius: f32, fill: Color32, stroke: Stroke) -> DrawResult {
            self.ops.push(DrawOp::Circle {
                center,
                radius,
                fill,
                stroke,
            });
            Ok(())
        }

        fn text(
            &mut self,
            anchor: Pos2,
            _align: Align2,
            text: &str,
            _size: f32,
            color: Color32,
        ) -> DrawResult {
            if self.fail_on_text {
                anyhow::bail!("text rendering unavailable");
            }
            self.ops.push(DrawOp::Text {
                anchor,
                text: text.to_owned(),
                color,
            });
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn barnes_hut_needs_a_positive_theta() {
        let pairwise = PhysicsConfig::default();
        assert_eq!(pairwise.with_barnes_hut(None), pairwise);
        assert_eq!(pairwise.with_barnes_hut(Some(0.0)), pairwise);
        assert_eq!(pairwise.with_barnes_hut(Some(f32::NAN)), pairwise);
        assert_eq!(
            pairwise.with_barnes_hut(Some(0.8)).repulsion_mode,
            RepulsionMode::BarnesHut { theta: 0.8 }
        );
    }

    #[test]
    fn clamp_keeps_circle_inside_surface() {
        let bounds = Bounds::default();
        assert_eq!(bounds.clamp(pos2(-50.0, 900.0), 20.0), pos2(20.0, 680.0));
        assert_eq!(bounds.clamp(pos2(1300.0, 5.0), 20.0), pos2(1180.0, 20.0));
        assert_eq!(bounds.clamp(pos2(600.0, 350.0), 20.0), pos2(600.0, 350.0));
    }
}
