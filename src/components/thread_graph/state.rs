//! Per-session scene state: the layout engine plus drag and hover tracking.

use super::layout::LayoutEngine;
use super::types::{GraphNode, NormalizedGraph, ProgressStatus, RelationshipType};

pub const NODE_RADIUS: f64 = 12.0;
pub const CURRENT_NODE_RADIUS: f64 = 15.0;
/// Extra slack around a node circle that still counts as a hit.
pub const HIT_SLACK: f64 = 6.0;

/// Edge with endpoints resolved to arena indices, so the renderer never has
/// to chase ids during a tick.
#[derive(Clone, Debug)]
pub struct SceneEdge {
	pub source: usize,
	pub target: usize,
	pub relationship_type: RelationshipType,
	pub strength: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node: Option<usize>,
}

/// Everything the render loop and the gesture handlers share for one open
/// panel session. Owned behind `Rc<RefCell<...>>` by the canvas component.
pub struct GraphScene {
	pub nodes: Vec<GraphNode>,
	pub edges: Vec<SceneEdge>,
	pub layout: LayoutEngine,
	pub drag: DragState,
	pub hover: Option<usize>,
	pub width: f64,
	pub height: f64,
}

impl GraphScene {
	pub fn new(graph: &NormalizedGraph, width: f64, height: f64) -> Self {
		let layout = LayoutEngine::new(&graph.nodes, &graph.edges, width, height);
		let edges = graph
			.edges
			.iter()
			.filter_map(|e| {
				Some(SceneEdge {
					source: layout.index_of(&e.source)?,
					target: layout.index_of(&e.target)?,
					relationship_type: e.relationship_type,
					strength: e.strength,
				})
			})
			.collect();

		Self {
			nodes: graph.nodes.clone(),
			edges,
			layout,
			drag: DragState::default(),
			hover: None,
			width,
			height,
		}
	}

	pub fn tick(&mut self) {
		self.layout.tick();
	}

	pub fn node_radius(&self, idx: usize) -> f64 {
		if self.nodes[idx].progress_status == ProgressStatus::Current {
			CURRENT_NODE_RADIUS
		} else {
			NODE_RADIUS
		}
	}

	pub fn node_at_position(&self, x: f64, y: f64) -> Option<usize> {
		let mut found = None;
		for idx in 0..self.nodes.len() {
			let (nx, ny) = self.layout.position(idx);
			let hit = self.node_radius(idx) + HIT_SLACK;
			if (nx - x).hypot(ny - y) < hit {
				found = Some(idx);
			}
		}
		found
	}

	/// Drag start: pin the node where it currently sits and raise the
	/// simulation energy so neighbors adjust while it moves. Hover state is
	/// dropped so no hover ring sticks to the grabbed node mid-gesture.
	pub fn begin_drag(&mut self, idx: usize) {
		let (x, y) = self.layout.position(idx);
		self.drag.node = Some(idx);
		self.hover = None;
		self.layout.pin(idx, x, y);
		self.layout.reheat();
	}

	pub fn drag_to(&mut self, x: f64, y: f64) {
		if let Some(idx) = self.drag.node {
			self.layout.pin(idx, x, y);
		}
	}

	/// Drag end: release the pin and let the simulation cool back down.
	pub fn end_drag(&mut self) {
		if let Some(idx) = self.drag.node.take() {
			self.layout.unpin(idx);
			self.layout.cool();
		}
	}

	pub fn is_dragging(&self) -> bool {
		self.drag.node.is_some()
	}

	pub fn set_hover(&mut self, node: Option<usize>) {
		self.hover = node;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::thread_graph::types::{GraphEdge, GraphNode};

	fn graph(n: usize) -> NormalizedGraph {
		let nodes: Vec<GraphNode> = (0..n)
			.map(|i| GraphNode {
				id: format!("n{i}"),
				name: format!("Node {i}"),
				subject: "Science".into(),
				progress_status: if i == 0 {
					ProgressStatus::Current
				} else {
					ProgressStatus::Upcoming
				},
			})
			.collect();
		let edges = (1..n)
			.map(|i| GraphEdge {
				source: format!("n{}", i - 1),
				target: format!("n{i}"),
				relationship_type: RelationshipType::Prerequisite,
				strength: 0.8,
			})
			.collect();
		NormalizedGraph {
			nodes,
			edges,
			dropped_edges: 0,
		}
	}

	#[test]
	fn edges_resolve_to_arena_indices() {
		let scene = GraphScene::new(&graph(4), 500.0, 400.0);
		assert_eq!(scene.edges.len(), 3);
		for edge in &scene.edges {
			assert!(edge.source < scene.nodes.len());
			assert!(edge.target < scene.nodes.len());
		}
	}

	#[test]
	fn hit_test_finds_node_under_pointer() {
		// A single node seeds at (cx + 100, cy).
		let scene = GraphScene::new(&graph(1), 500.0, 400.0);
		let (x, y) = scene.layout.position(0);
		assert_eq!(scene.node_at_position(x + 2.0, y - 2.0), Some(0));
		assert_eq!(scene.node_at_position(x + 100.0, y), None);
	}

	#[test]
	fn current_node_gets_larger_radius() {
		let scene = GraphScene::new(&graph(2), 500.0, 400.0);
		assert_eq!(scene.node_radius(0), CURRENT_NODE_RADIUS);
		assert_eq!(scene.node_radius(1), NODE_RADIUS);
	}

	#[test]
	fn drag_pins_then_tracks_then_releases() {
		let mut scene = GraphScene::new(&graph(6), 500.0, 400.0);
		let start = scene.layout.position(2);

		scene.begin_drag(2);
		assert!(scene.is_dragging());
		// Pin starts at the node's own position, not the pointer.
		assert_eq!(scene.layout.position(2), start);

		scene.drag_to(42.0, 77.0);
		for _ in 0..20 {
			scene.tick();
			assert_eq!(scene.layout.position(2), (42.0, 77.0));
		}

		scene.end_drag();
		assert!(!scene.is_dragging());
		scene.end_drag(); // releasing twice is harmless
	}

	#[test]
	fn drag_start_clears_hover() {
		let mut scene = GraphScene::new(&graph(4), 500.0, 400.0);
		scene.set_hover(Some(2));

		scene.begin_drag(2);
		assert_eq!(scene.hover, None);

		// Hovering again after release behaves as usual.
		scene.end_drag();
		scene.set_hover(Some(1));
		assert_eq!(scene.hover, Some(1));
	}

	#[test]
	fn edges_track_pinned_endpoint_every_tick() {
		let mut scene = GraphScene::new(&graph(3), 500.0, 400.0);
		scene.begin_drag(1);
		scene.drag_to(10.0, 10.0);
		for _ in 0..10 {
			scene.tick();
			// Rendering reads endpoint positions from the layout, so the
			// drawn edge follows the pin with no lag.
			let edge = &scene.edges[0];
			let tracked = if edge.source == 1 {
				scene.layout.position(edge.source)
			} else {
				scene.layout.position(edge.target)
			};
			assert_eq!(tracked, (10.0, 10.0));
		}
	}
}
