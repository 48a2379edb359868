//! Normalizes a raw graph response into the canonical node/edge model.
//!
//! Pure and deterministic: same input, same output, no side effects. The
//! caller decides what to do with the dropped-edge count (the panel logs it).

use std::collections::HashSet;

use super::types::{
	GraphEdge, GraphNode, NormalizedGraph, ProgressStatus, RelationshipType, ThreadGraphResponse,
};

/// Floor for edge strength. Keeps `base_distance / strength` finite for
/// zero, negative, or absent strengths.
pub const STRENGTH_EPSILON: f64 = 0.05;

/// Deduplicate nodes, drop edges whose endpoints are missing, and fill in
/// defaults for absent or unrecognized attribute values.
pub fn normalize(raw: &ThreadGraphResponse) -> NormalizedGraph {
	let mut seen = HashSet::new();
	let mut nodes = Vec::with_capacity(raw.nodes.len());

	for node in &raw.nodes {
		// Duplicate ids: first occurrence wins.
		if !seen.insert(node.id.as_str()) {
			continue;
		}
		nodes.push(GraphNode {
			id: node.id.clone(),
			name: node.name.clone().unwrap_or_else(|| node.id.clone()),
			subject: node.subject.clone().unwrap_or_default(),
			progress_status: ProgressStatus::parse(node.progress_status.as_deref()),
		});
	}

	let mut edges = Vec::with_capacity(raw.edges.len());
	let mut dropped_edges = 0;

	for edge in &raw.edges {
		if !seen.contains(edge.source.as_str()) || !seen.contains(edge.target.as_str()) {
			dropped_edges += 1;
			continue;
		}
		edges.push(GraphEdge {
			source: edge.source.clone(),
			target: edge.target.clone(),
			relationship_type: RelationshipType::parse(edge.relationship_type.as_deref()),
			strength: clamp_strength(edge.strength),
		});
	}

	NormalizedGraph {
		nodes,
		edges,
		dropped_edges,
	}
}

fn clamp_strength(raw: Option<f64>) -> f64 {
	match raw {
		Some(s) if s.is_finite() && s > STRENGTH_EPSILON => s.min(1.0),
		_ => STRENGTH_EPSILON,
	}
}
