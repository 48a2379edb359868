use serde::Deserialize;

/// Learner progress through a concept, as reported by the graph service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProgressStatus {
	Completed,
	Current,
	#[default]
	Upcoming,
}

impl ProgressStatus {
	/// Lenient wire parse; anything unrecognized counts as not-yet-reached.
	pub fn parse(raw: Option<&str>) -> Self {
		match raw {
			Some("completed") => Self::Completed,
			Some("current") => Self::Current,
			_ => Self::Upcoming,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Completed => "completed",
			Self::Current => "current",
			Self::Upcoming => "upcoming",
		}
	}
}

/// Semantic kind of a concept-to-concept relationship.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RelationshipType {
	Prerequisite,
	Bridge,
	Branch,
	#[default]
	Other,
}

impl RelationshipType {
	pub fn parse(raw: Option<&str>) -> Self {
		match raw {
			Some("prerequisite") => Self::Prerequisite,
			Some("bridge") => Self::Bridge,
			Some("branch") => Self::Branch,
			_ => Self::Other,
		}
	}
}

/// A node exactly as the graph endpoint serializes it. Everything except the
/// id is optional on the wire so one sloppy record cannot sink the response;
/// the adapter fills the gaps.
#[derive(Clone, Debug, Deserialize)]
pub struct RawNode {
	pub id: String,
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub subject: Option<String>,
	#[serde(default)]
	pub progress_status: Option<String>,
}

/// An edge as serialized by the graph endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct RawEdge {
	pub source: String,
	pub target: String,
	#[serde(default)]
	pub relationship_type: Option<String>,
	#[serde(default)]
	pub strength: Option<f64>,
}

/// Informational summary attached to a graph response. Not consumed by the
/// layout; surfaced in the panel footer.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GraphMetadata {
	#[serde(default)]
	pub thread_id: String,
	#[serde(default)]
	pub branching_opportunities: Vec<String>,
	#[serde(default)]
	pub cross_subject_bridges: Vec<String>,
}

/// Wire-level result of one thread-graph fetch.
#[derive(Clone, Debug, Deserialize)]
pub struct ThreadGraphResponse {
	#[serde(default)]
	pub nodes: Vec<RawNode>,
	#[serde(default)]
	pub edges: Vec<RawEdge>,
	#[serde(default)]
	pub metadata: Option<GraphMetadata>,
}

/// Canonical node after normalization. Immutable for the lifetime of one
/// panel session; layout state lives in a parallel arena inside the engine.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: String,
	pub name: String,
	pub subject: String,
	pub progress_status: ProgressStatus,
}

/// Canonical edge after normalization. Both endpoints are guaranteed to
/// resolve to a node in the same `NormalizedGraph`.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphEdge {
	pub source: String,
	pub target: String,
	pub relationship_type: RelationshipType,
	pub strength: f64,
}

/// Adapter output: deduplicated nodes, integrity-checked edges, and the
/// count of edges that had to be discarded.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NormalizedGraph {
	pub nodes: Vec<GraphNode>,
	pub edges: Vec<GraphEdge>,
	pub dropped_edges: usize,
}

impl NormalizedGraph {
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_parse_falls_back_to_upcoming() {
		assert_eq!(ProgressStatus::parse(Some("completed")), ProgressStatus::Completed);
		assert_eq!(ProgressStatus::parse(Some("current")), ProgressStatus::Current);
		assert_eq!(ProgressStatus::parse(Some("paused")), ProgressStatus::Upcoming);
		assert_eq!(ProgressStatus::parse(None), ProgressStatus::Upcoming);
	}

	#[test]
	fn relationship_parse_falls_back_to_other() {
		assert_eq!(
			RelationshipType::parse(Some("prerequisite")),
			RelationshipType::Prerequisite
		);
		assert_eq!(RelationshipType::parse(Some("bridge")), RelationshipType::Bridge);
		assert_eq!(RelationshipType::parse(Some("branch")), RelationshipType::Branch);
		assert_eq!(RelationshipType::parse(Some("sibling")), RelationshipType::Other);
		assert_eq!(RelationshipType::parse(None), RelationshipType::Other);
	}

	#[test]
	fn response_deserializes_with_camel_case_metadata() {
		let json = r#"{
			"nodes": [
				{"id": "n1", "name": "Algebra", "subject": "Math", "progress_status": "completed"},
				{"id": "n2"}
			],
			"edges": [
				{"source": "n1", "target": "n2", "relationship_type": "bridge", "strength": 0.7}
			],
			"metadata": {
				"threadId": "thread-1",
				"branchingOpportunities": ["Advanced Calculus"],
				"crossSubjectBridges": []
			}
		}"#;
		let resp: ThreadGraphResponse = serde_json::from_str(json).unwrap();
		assert_eq!(resp.nodes.len(), 2);
		assert_eq!(resp.nodes[1].name, None);
		assert_eq!(resp.edges[0].strength, Some(0.7));
		let meta = resp.metadata.unwrap();
		assert_eq!(meta.thread_id, "thread-1");
		assert_eq!(meta.branching_opportunities.len(), 1);
	}

	#[test]
	fn response_tolerates_missing_sections() {
		let resp: ThreadGraphResponse = serde_json::from_str("{}").unwrap();
		assert!(resp.nodes.is_empty());
		assert!(resp.edges.is_empty());
		assert!(resp.metadata.is_none());
	}
}
