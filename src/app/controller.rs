use std::collections::HashSet;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::Result;
use eframe::egui::Pos2;
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::data::{GraphDataProvider, GraphNode, GraphSnapshot, Stats};

use super::frame_loop::{FrameLoop, FrameScheduler};
use super::graph::interaction::{SearchOutcome, fuzzy_candidates, hit_test};
use super::physics::step;
use super::render::{Surface, render_frame};
use super::{Bounds, InteractionState, PhysicsConfig, SimGraph};

/// What the controller reports to the surrounding UI.
#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) enum ControllerEvent {
    Loaded(Stats),
    SelectionChanged(Option<String>),
    LoadFailed(String),
    SearchMiss(String),
}

/// One link touching the selected node, seen from that node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(in crate::app) struct Connection {
    pub(in crate::app) outgoing: bool,
    pub(in crate::app) kind: String,
    pub(in crate::app) suffix: String,
    pub(in crate::app) neighbor_id: String,
    pub(in crate::app) neighbor_label: String,
}

struct SearchMatchCache {
    query: String,
    graph_revision: u64,
    matches: Arc<HashSet<usize>>,
}

/// Owns one view's graph, interaction and render-loop state.
pub(in crate::app) struct GraphController {
    bounds: Bounds,
    physics: PhysicsConfig,
    graph: Option<SimGraph>,
    graph_revision: u64,
    interaction: InteractionState,
    frame_loop: FrameLoop,
    search_match_cache: Option<SearchMatchCache>,
    pending_load: Option<Receiver<Result<GraphSnapshot, String>>>,
    events: Vec<ControllerEvent>,
    rng: StdRng,
}

impl GraphController {
    pub(in crate::app) fn new(bounds: Bounds, physics: PhysicsConfig) -> Self {
        Self::with_rng(bounds, physics, StdRng::from_entropy())
    }

    pub(in crate::app) fn with_rng(bounds: Bounds, physics: PhysicsConfig, rng: StdRng) -> Self {
        Self {
            bounds,
            physics,
            graph: None,
            graph_revision: 0,
            interaction: InteractionState::default(),
            frame_loop: FrameLoop::default(),
            search_match_cache: None,
            pending_load: None,
            events: Vec::new(),
            rng,
        }
    }

    /// Fetches a snapshot on a worker thread. A newer call supersedes an unfinished one.
    pub(in crate::app) fn load(&mut self, provider: Arc<dyn GraphDataProvider>) {
        info!("loading graph data from {}", provider.describe());
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = provider.fetch().map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        self.pending_load = Some(rx);
    }

    pub(in crate::app) fn is_loading(&self) -> bool {
        self.pending_load.is_some()
    }

    /// Applies a finished fetch, if any. On failure the current graph stays as it is.
    pub(in crate::app) fn poll_load(
        &mut self,
        scheduler: &dyn FrameScheduler,
    ) -> Option<Result<Stats, String>> {
        let rx = self.pending_load.take()?;
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => {
                self.pending_load = Some(rx);
                return None;
            }
            Err(TryRecvError::Disconnected) => Err("Background load worker disconnected".to_owned()),
        };

        Some(match result {
            Ok(snapshot) => Ok(self.apply_snapshot(snapshot, scheduler)),
            Err(message) => {
                self.fail_load(message.clone());
                Err(message)
            }
        })
    }

    #[cfg(test)]
    pub(in crate::app) fn load_blocking(
        &mut self,
        provider: &dyn GraphDataProvider,
        scheduler: &dyn FrameScheduler,
    ) -> Result<Stats> {
        info!("loading graph data from {}", provider.describe());
        match provider.fetch() {
            Ok(snapshot) => Ok(self.apply_snapshot(snapshot, scheduler)),
            Err(error) => {
                self.fail_load(format!("{error:#}"));
                Err(error)
            }
        }
    }

    fn fail_load(&mut self, message: String) {
        warn!("keeping previous graph after failed load: {message}");
        self.events.push(ControllerEvent::LoadFailed(message));
    }

    /// Replaces the current graph. The old render loop is cancelled before any state changes.
    pub(in crate::app) fn apply_snapshot(
        &mut self,
        snapshot: GraphSnapshot,
        scheduler: &dyn FrameScheduler,
    ) -> Stats {
        self.frame_loop.cancel();
        if snapshot.is_empty() {
            info!("graph data contains no nodes");
        }

        let graph = SimGraph::from_snapshot(snapshot, self.bounds, &mut self.rng);
        let stats = graph.stats;
        info!(
            "loaded {} nodes and {} relationships ({} drawable links)",
            stats.node_count,
            stats.relationship_count,
            graph.links.len()
        );

        let had_selection = self.interaction.selected().is_some();
        self.interaction = InteractionState::default();
        self.search_match_cache = None;
        self.graph = Some(graph);
        self.graph_revision = self.graph_revision.wrapping_add(1);

        if had_selection {
            self.events.push(ControllerEvent::SelectionChanged(None));
        }
        self.events.push(ControllerEvent::Loaded(stats));
        self.frame_loop.start(scheduler);
        stats
    }

    /// Stops the render loop and releases everything owned for the current graph.
    pub(in crate::app) fn teardown(&mut self) {
        self.frame_loop.cancel();
        self.pending_load = None;
        self.graph = None;
        self.interaction = InteractionState::default();
        self.search_match_cache = None;
        info!(
            "graph view torn down after {} frames",
            self.frame_loop.frames()
        );
    }

    /// One render-loop callback: draw the current state, advance one tick, schedule the next.
    ///
    /// Returns false when no frame was outstanding, e.g. after teardown.
    pub(in crate::app) fn on_frame(
        &mut self,
        surface: &mut impl Surface,
        scheduler: &dyn FrameScheduler,
    ) -> bool {
        if !self.frame_loop.begin_frame() {
            return false;
        }

        let candidates = self.cached_candidates();
        let Some(graph) = self.graph.as_mut() else {
            self.frame_loop.cancel();
            return false;
        };

        if let Err(error) = render_frame(surface, graph, &self.interaction, candidates.as_deref()) {
            warn!(
                "skipping drawing of frame {}: {error:#}",
                self.frame_loop.frames()
            );
        }

        step(graph, self.interaction.dragged, self.physics);
        self.frame_loop.schedule(scheduler);
        true
    }

    fn cached_candidates(&mut self) -> Option<Arc<HashSet<usize>>> {
        let query = self.interaction.search_query().trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.graph_revision == self.graph_revision
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let graph = self.graph.as_ref()?;
        let matches = Arc::new(fuzzy_candidates(graph, query));
        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            graph_revision: self.graph_revision,
            matches: Arc::clone(&matches),
        });
        Some(matches)
    }

    pub(in crate::app) fn pointer_down(&mut self, pointer: Pos2) {
        let Some(graph) = self.graph.as_mut() else {
            return;
        };
        if self.interaction.pointer_down(graph, pointer) {
            self.emit_selection();
        }
    }

    pub(in crate::app) fn pointer_move(&mut self, pointer: Pos2) {
        if let Some(graph) = self.graph.as_mut() {
            self.interaction.pointer_move(graph, pointer);
        }
    }

    pub(in crate::app) fn pointer_up(&mut self) {
        self.interaction.pointer_up();
    }

    pub(in crate::app) fn is_dragging(&self) -> bool {
        self.interaction.is_dragging()
    }

    pub(in crate::app) fn hit_test(&self, pointer: Pos2) -> Option<usize> {
        self.graph.as_ref().and_then(|graph| hit_test(graph, pointer))
    }

    /// Records the query being typed; drives candidate highlighting without selecting.
    pub(in crate::app) fn set_search_query(&mut self, query: &str) {
        if self.interaction.search_query() != query {
            self.interaction.search_query = query.to_owned();
        }
    }

    pub(in crate::app) fn search(&mut self, query: &str) -> SearchOutcome {
        let Some(graph) = self.graph.as_ref() else {
            return SearchOutcome::Blank;
        };

        let previous = self.interaction.selected();
        let outcome = self.interaction.search(graph, query);
        match outcome {
            SearchOutcome::Found(_) if previous != self.interaction.selected() => {
                self.emit_selection();
            }
            SearchOutcome::Miss => {
                info!("search for {query:?} matched no node");
                self.events
                    .push(ControllerEvent::SearchMiss(query.trim().to_owned()));
            }
            _ => {}
        }
        outcome
    }

    pub(in crate::app) fn select_by_id(&mut self, id: &str) -> bool {
        let Some(index) = self.graph.as_ref().and_then(|graph| graph.index_of(id)) else {
            return false;
        };
        if self.interaction.selected != Some(index) {
            self.interaction.selected = Some(index);
            self.emit_selection();
        }
        true
    }

    fn emit_selection(&mut self) {
        let selected = self.selected().map(|node| node.id.clone());
        self.events.push(ControllerEvent::SelectionChanged(selected));
    }

    pub(in crate::app) fn selected(&self) -> Option<&GraphNode> {
        let index = self.interaction.selected()?;
        self.graph
            .as_ref()
            .and_then(|graph| graph.node(index))
            .map(|sim_node| &sim_node.node)
    }

    pub(in crate::app) fn selected_connections(&self) -> Vec<Connection> {
        let (Some(graph), Some(selected)) = (self.graph.as_ref(), self.interaction.selected())
        else {
            return Vec::new();
        };

        graph
            .links
            .iter()
            .filter_map(|link| {
                let (outgoing, neighbor) = if link.source == selected {
                    (true, link.target)
                } else if link.target == selected {
                    (false, link.source)
                } else {
                    return None;
                };
                let neighbor = graph.node(neighbor)?;
                Some(Connection {
                    outgoing,
                    kind: link.kind.clone(),
                    suffix: link.suffix.clone(),
                    neighbor_id: neighbor.node.id.clone(),
                    neighbor_label: neighbor.label.clone(),
                })
            })
            .collect()
    }

    pub(in crate::app) fn stats(&self) -> Option<Stats> {
        self.graph.as_ref().map(|graph| graph.stats)
    }

    pub(in crate::app) fn has_graph(&self) -> bool {
        self.graph.is_some()
    }

    pub(in crate::app) fn is_empty(&self) -> bool {
        self.graph.as_ref().is_none_or(SimGraph::is_empty)
    }

    pub(in crate::app) fn bounds(&self) -> Bounds {
        self.bounds
    }

    #[cfg(test)]
    pub(in crate::app) fn is_animating(&self) -> bool {
        self.frame_loop.is_running()
    }

    pub(in crate::app) fn drain_events(&mut self) -> Vec<ControllerEvent> {
        std::mem::take(&mut self.events)
    }
}
