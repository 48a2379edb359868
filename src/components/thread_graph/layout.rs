//! Force-directed layout engine.
//!
//! A small velocity-based integrator in the d3-force mold: link springs with
//! per-edge rest lengths, pairwise charge repulsion, centroid recentering,
//! and collision avoidance, all modulated by a decaying `alpha` so the
//! simulation settles instead of oscillating.
//!
//! Semantic nodes stay immutable; all mutable layout state (position,
//! velocity, pin) lives in an arena indexed in lockstep with the node list.

use std::collections::HashMap;
use std::f64::consts::PI;

use super::types::{GraphEdge, GraphNode};

/// Tuning knobs for the simulation. Defaults match the visual behavior the
/// panel was designed around; none of them are load-bearing exact values.
#[derive(Clone, Debug)]
pub struct LayoutConfig {
	/// Repulsion between every node pair. Negative repels.
	pub charge_strength: f64,
	/// Rest length of a link is `link_distance_base / strength`.
	pub link_distance_base: f64,
	/// Per-node radius used by the collision force.
	pub collision_radius: f64,
	/// Simulation stops once `alpha` decays below this with a zero target.
	pub alpha_min: f64,
	/// Fraction of velocity retained across a tick.
	pub velocity_retention: f64,
	/// How hard overlapping nodes push apart.
	pub collide_strength: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			charge_strength: -300.0,
			link_distance_base: 80.0,
			collision_radius: 25.0,
			alpha_min: 0.001,
			velocity_retention: 0.6,
			collide_strength: 0.7,
		}
	}
}

/// Alpha raised while a drag is in flight so the rest of the graph keeps
/// adjusting around the pinned node.
const REHEAT_ALPHA_TARGET: f64 = 0.3;

#[derive(Clone, Debug, Default)]
struct PointState {
	x: f64,
	y: f64,
	vx: f64,
	vy: f64,
	fixed: Option<(f64, f64)>,
}

#[derive(Clone, Copy, Debug)]
struct LinkState {
	source: usize,
	target: usize,
	rest: f64,
	stiffness: f64,
	/// Share of the correction absorbed by the target endpoint.
	bias: f64,
}

/// A running simulation over one normalized graph.
pub struct LayoutEngine {
	config: LayoutConfig,
	center: (f64, f64),
	points: Vec<PointState>,
	links: Vec<LinkState>,
	index: HashMap<String, usize>,
	alpha: f64,
	alpha_target: f64,
	alpha_decay: f64,
	running: bool,
}

impl LayoutEngine {
	pub fn new(nodes: &[GraphNode], edges: &[GraphEdge], width: f64, height: f64) -> Self {
		Self::with_config(nodes, edges, width, height, LayoutConfig::default())
	}

	pub fn with_config(
		nodes: &[GraphNode],
		edges: &[GraphEdge],
		width: f64,
		height: f64,
		config: LayoutConfig,
	) -> Self {
		let center = (width / 2.0, height / 2.0);
		let mut index = HashMap::with_capacity(nodes.len());
		let mut points = Vec::with_capacity(nodes.len());

		// Seed on a ring around the center so the first ticks pull inward
		// instead of exploding out of a single point.
		for (i, node) in nodes.iter().enumerate() {
			let angle = (i as f64) * 2.0 * PI / nodes.len().max(1) as f64;
			points.push(PointState {
				x: center.0 + 100.0 * angle.cos(),
				y: center.1 + 100.0 * angle.sin(),
				..PointState::default()
			});
			index.insert(node.id.clone(), i);
		}

		// The adapter guarantees resolvable endpoints; filter_map keeps a
		// hand-built edge list from panicking anyway.
		let resolved: Vec<(&GraphEdge, usize, usize)> = edges
			.iter()
			.filter_map(|e| Some((e, *index.get(&e.source)?, *index.get(&e.target)?)))
			.collect();
		let mut degree = vec![0usize; points.len()];
		for &(_, s, t) in &resolved {
			degree[s] += 1;
			degree[t] += 1;
		}

		let links = resolved
			.iter()
			.map(|&(edge, source, target)| {
				let (ds, dt) = (degree[source] as f64, degree[target] as f64);
				LinkState {
					source,
					target,
					rest: config.link_distance_base / edge.strength,
					stiffness: 1.0 / ds.min(dt).max(1.0),
					bias: ds / (ds + dt),
				}
			})
			.collect();

		let alpha_decay = 1.0 - config.alpha_min.powf(1.0 / 300.0);
		Self {
			config,
			center,
			points,
			links,
			index,
			alpha: 1.0,
			alpha_target: 0.0,
			alpha_decay,
			running: true,
		}
	}

	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	pub fn position(&self, idx: usize) -> (f64, f64) {
		let p = &self.points[idx];
		(p.x, p.y)
	}

	pub fn len(&self) -> usize {
		self.points.len()
	}

	pub fn is_empty(&self) -> bool {
		self.points.is_empty()
	}

	pub fn is_running(&self) -> bool {
		self.running
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Fix a node at the given coordinate. The simulation treats it as
	/// stationary until `unpin` releases it.
	pub fn pin(&mut self, idx: usize, x: f64, y: f64) {
		let p = &mut self.points[idx];
		p.fixed = Some((x, y));
		p.x = x;
		p.y = y;
		p.vx = 0.0;
		p.vy = 0.0;
	}

	pub fn unpin(&mut self, idx: usize) {
		self.points[idx].fixed = None;
	}

	/// Raise simulation energy so free nodes react smoothly to a drag.
	pub fn reheat(&mut self) {
		self.alpha_target = REHEAT_ALPHA_TARGET;
		self.running = true;
	}

	/// Let the simulation decay back to rest after a drag ends.
	pub fn cool(&mut self) {
		self.alpha_target = 0.0;
	}

	/// Halt the simulation and release kinetic state. Safe to call more
	/// than once; `tick` is a no-op afterwards until `reheat`.
	pub fn stop(&mut self) {
		self.running = false;
		for p in &mut self.points {
			p.vx = 0.0;
			p.vy = 0.0;
		}
	}

	/// Advance one step. Returns the total displacement applied to free
	/// nodes, which reaches zero as the layout settles.
	pub fn tick(&mut self) -> f64 {
		if !self.running || self.points.is_empty() {
			return 0.0;
		}
		self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
		if self.alpha < self.config.alpha_min {
			self.running = false;
			return 0.0;
		}

		self.apply_links();
		self.apply_charge();
		self.apply_center();
		self.apply_collide();
		self.integrate()
	}

	fn apply_links(&mut self) {
		for i in 0..self.links.len() {
			let link = self.links[i];
			let (s, t) = (link.source, link.target);
			let dx = self.points[t].x + self.points[t].vx - self.points[s].x - self.points[s].vx;
			let dy = self.points[t].y + self.points[t].vy - self.points[s].y - self.points[s].vy;
			let dist = (dx * dx + dy * dy).sqrt().max(1e-6);
			let l = (dist - link.rest) / dist * self.alpha * link.stiffness;
			let (fx, fy) = (dx * l, dy * l);

			self.points[t].vx -= fx * link.bias;
			self.points[t].vy -= fy * link.bias;
			self.points[s].vx += fx * (1.0 - link.bias);
			self.points[s].vy += fy * (1.0 - link.bias);
		}
	}

	fn apply_charge(&mut self) {
		let n = self.points.len();
		for i in 0..n {
			for j in (i + 1)..n {
				let dx = self.points[j].x - self.points[i].x;
				let dy = self.points[j].y - self.points[i].y;
				let d2 = (dx * dx + dy * dy).max(1.0);
				let w = self.config.charge_strength * self.alpha / d2;
				self.points[i].vx += dx * w;
				self.points[i].vy += dy * w;
				self.points[j].vx -= dx * w;
				self.points[j].vy -= dy * w;
			}
		}
	}

	fn apply_center(&mut self) {
		let n = self.points.len() as f64;
		let (mut mx, mut my) = (0.0, 0.0);
		for p in &self.points {
			mx += p.x;
			my += p.y;
		}
		let (sx, sy) = (mx / n - self.center.0, my / n - self.center.1);
		for p in &mut self.points {
			p.x -= sx;
			p.y -= sy;
		}
	}

	fn apply_collide(&mut self) {
		let sep = 2.0 * self.config.collision_radius;
		let n = self.points.len();
		for i in 0..n {
			for j in (i + 1)..n {
				let dx = self.points[j].x - self.points[i].x;
				let dy = self.points[j].y - self.points[i].y;
				let dist = (dx * dx + dy * dy).sqrt().max(1e-6);
				if dist >= sep {
					continue;
				}
				let l = (sep - dist) / dist * self.config.collide_strength * 0.5;
				self.points[j].vx += dx * l;
				self.points[j].vy += dy * l;
				self.points[i].vx -= dx * l;
				self.points[i].vy -= dy * l;
			}
		}
	}

	fn integrate(&mut self) -> f64 {
		let mut moved = 0.0;
		for p in &mut self.points {
			if let Some((fx, fy)) = p.fixed {
				p.x = fx;
				p.y = fy;
				p.vx = 0.0;
				p.vy = 0.0;
				continue;
			}
			p.vx *= self.config.velocity_retention;
			p.vy *= self.config.velocity_retention;
			p.x += p.vx;
			p.y += p.vy;
			moved += p.vx.hypot(p.vy);
		}
		moved
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::thread_graph::types::{ProgressStatus, RelationshipType};

	fn node(id: &str) -> GraphNode {
		GraphNode {
			id: id.into(),
			name: id.into(),
			subject: "Math".into(),
			progress_status: ProgressStatus::Upcoming,
		}
	}

	fn edge(source: &str, target: &str, strength: f64) -> GraphEdge {
		GraphEdge {
			source: source.into(),
			target: target.into(),
			relationship_type: RelationshipType::Prerequisite,
			strength,
		}
	}

	/// Chain plus a few cross links; moderate connectivity.
	fn medium_graph(n: usize) -> (Vec<GraphNode>, Vec<GraphEdge>) {
		let nodes: Vec<GraphNode> = (0..n).map(|i| node(&format!("n{i}"))).collect();
		let mut edges: Vec<GraphEdge> = (1..n)
			.map(|i| edge(&format!("n{}", i - 1), &format!("n{i}"), 0.8))
			.collect();
		for i in (0..n.saturating_sub(7)).step_by(7) {
			edges.push(edge(&format!("n{i}"), &format!("n{}", i + 7), 0.4));
		}
		(nodes, edges)
	}

	#[test]
	fn simulation_settles_within_tick_budget() {
		let (nodes, edges) = medium_graph(50);
		let mut engine = LayoutEngine::new(&nodes, &edges, 500.0, 400.0);
		let mut history = Vec::new();
		while engine.is_running() && history.len() < 1000 {
			history.push(engine.tick());
		}
		assert!(
			history.len() <= 320,
			"still running after {} ticks",
			history.len()
		);

		// Cooling alone would end the run even if the layout were thrashing,
		// so check the displacement itself: the closing stretch must barely
		// move and must be far below the opening stretch.
		let window = 20;
		let head: f64 = history[..window].iter().sum::<f64>() / window as f64;
		let tail_slice = &history[history.len() - window..];
		let tail: f64 = tail_slice.iter().sum::<f64>() / window as f64;
		let tail_peak = tail_slice.iter().copied().fold(0.0, f64::max);
		assert!(tail_peak < 5.0, "late ticks still moving: peak {tail_peak}");
		assert!(
			tail < head / 20.0,
			"displacement never trended down: head avg {head}, tail avg {tail}"
		);
	}

	#[test]
	fn pinned_node_holds_exact_position() {
		let (nodes, edges) = medium_graph(10);
		let mut engine = LayoutEngine::new(&nodes, &edges, 500.0, 400.0);
		let idx = engine.index_of("n3").unwrap();
		engine.pin(idx, 10.0, 20.0);
		engine.reheat();
		for _ in 0..50 {
			engine.tick();
			assert_eq!(engine.position(idx), (10.0, 20.0));
		}
		engine.unpin(idx);
		engine.tick();
		// Released nodes rejoin the simulation.
		assert!(engine.position(idx) != (10.0, 20.0) || !engine.is_running());
	}

	#[test]
	fn linked_pair_converges_near_rest_length() {
		let nodes = vec![node("n1"), node("n2")];
		let edges = vec![edge("n1", "n2", 0.7)];
		let mut engine = LayoutEngine::new(&nodes, &edges, 500.0, 400.0);
		let mut ticks = 0;
		while engine.is_running() && ticks < 2000 {
			engine.tick();
			ticks += 1;
		}
		let (x1, y1) = engine.position(0);
		let (x2, y2) = engine.position(1);
		let dist = (x2 - x1).hypot(y2 - y1);
		let rest = 80.0 / 0.7;
		assert!(
			(dist - rest).abs() < 25.0,
			"expected distance near {rest}, got {dist}"
		);
	}

	#[test]
	fn epsilon_strength_keeps_rest_length_finite() {
		let nodes = vec![node("a"), node("b")];
		let edges = vec![edge("a", "b", 0.05)];
		let mut engine = LayoutEngine::new(&nodes, &edges, 500.0, 400.0);
		for _ in 0..10 {
			engine.tick();
		}
		let (x, y) = engine.position(0);
		assert!(x.is_finite() && y.is_finite());
	}

	#[test]
	fn stop_is_idempotent_and_halts_ticks() {
		let (nodes, edges) = medium_graph(5);
		let mut engine = LayoutEngine::new(&nodes, &edges, 500.0, 400.0);
		engine.tick();
		engine.stop();
		engine.stop();
		assert!(!engine.is_running());
		let before: Vec<(f64, f64)> = (0..engine.len()).map(|i| engine.position(i)).collect();
		assert_eq!(engine.tick(), 0.0);
		let after: Vec<(f64, f64)> = (0..engine.len()).map(|i| engine.position(i)).collect();
		assert_eq!(before, after);
	}

	#[test]
	fn reheat_restarts_a_settled_simulation() {
		let (nodes, edges) = medium_graph(8);
		let mut engine = LayoutEngine::new(&nodes, &edges, 500.0, 400.0);
		while engine.is_running() {
			engine.tick();
		}
		assert!(engine.alpha() < 0.001);
		engine.reheat();
		assert!(engine.is_running());
		for _ in 0..100 {
			engine.tick();
		}
		// Alpha climbs back toward the drag target instead of staying cold.
		assert!(engine.alpha() > 0.05);
		engine.cool();
		while engine.is_running() {
			engine.tick();
		}
	}

	#[test]
	fn empty_graph_is_inert() {
		let mut engine = LayoutEngine::new(&[], &[], 500.0, 400.0);
		assert!(engine.is_empty());
		assert_eq!(engine.tick(), 0.0);
	}
}
