//! Canvas drawing for one scene tick, plus the pure styling helpers.
//!
//! Styling lookups never fail: unknown subjects, statuses, and relationship
//! kinds all fall through to a default so one odd record cannot blank the
//! whole graph.

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::GraphScene;
use super::types::{ProgressStatus, RelationshipType};

const LABEL_MAX_CHARS: usize = 15;

pub fn subject_color(subject: &str) -> &'static str {
	match subject {
		"Math" => "#FF6B6B",
		"Science" => "#4ECDC4",
		"Literature" => "#45B7D1",
		"History" => "#96CEB4",
		"Arts" => "#FFEAA7",
		"Language" => "#DDA0DD",
		_ => "#95A5A6",
	}
}

pub fn status_stroke(status: ProgressStatus) -> &'static str {
	match status {
		ProgressStatus::Completed => "#27ae60",
		ProgressStatus::Current => "#f39c12",
		ProgressStatus::Upcoming => "#95a5a6",
	}
}

pub fn status_opacity(status: ProgressStatus) -> f64 {
	match status {
		ProgressStatus::Upcoming => 0.6,
		_ => 1.0,
	}
}

pub fn relationship_color(kind: RelationshipType) -> &'static str {
	match kind {
		RelationshipType::Prerequisite => "#3498db",
		RelationshipType::Bridge => "#e74c3c",
		RelationshipType::Branch => "#f39c12",
		RelationshipType::Other => "#95a5a6",
	}
}

/// Dash pattern per relationship kind; `None` draws solid.
pub fn relationship_dash(kind: RelationshipType) -> Option<(f64, f64)> {
	match kind {
		RelationshipType::Bridge => Some((8.0, 4.0)),
		RelationshipType::Branch => Some((2.0, 4.0)),
		_ => None,
	}
}

pub fn edge_width(strength: f64) -> f64 {
	(strength * 5.0).sqrt()
}

pub fn truncate_label(name: &str) -> String {
	if name.chars().count() > LABEL_MAX_CHARS {
		let truncated: String = name.chars().take(LABEL_MAX_CHARS).collect();
		format!("{truncated}...")
	} else {
		name.to_string()
	}
}

/// Redraw the whole scene. Invoked once per animation frame; reads layout
/// positions and never mutates the scene.
pub fn render(scene: &GraphScene, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str("#ffffff");
	ctx.fill_rect(0.0, 0.0, scene.width, scene.height);
	draw_edges(scene, ctx);
	draw_nodes(scene, ctx);
}

fn draw_edges(scene: &GraphScene, ctx: &CanvasRenderingContext2d) {
	for edge in &scene.edges {
		let (x1, y1) = scene.layout.position(edge.source);
		let (x2, y2) = scene.layout.position(edge.target);

		ctx.set_global_alpha(0.6);
		ctx.set_stroke_style_str(relationship_color(edge.relationship_type));
		ctx.set_line_width(edge_width(edge.strength));
		match relationship_dash(edge.relationship_type) {
			Some((dash, gap)) => {
				let _ = ctx.set_line_dash(&js_sys::Array::of2(
					&JsValue::from_f64(dash),
					&JsValue::from_f64(gap),
				));
			}
			None => {
				let _ = ctx.set_line_dash(&js_sys::Array::new());
			}
		}

		ctx.begin_path();
		ctx.move_to(x1, y1);
		ctx.line_to(x2, y2);
		ctx.stroke();
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
	ctx.set_global_alpha(1.0);
}

fn draw_nodes(scene: &GraphScene, ctx: &CanvasRenderingContext2d) {
	for (idx, node) in scene.nodes.iter().enumerate() {
		let (x, y) = scene.layout.position(idx);
		let radius = scene.node_radius(idx);

		ctx.set_global_alpha(status_opacity(node.progress_status));
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(subject_color(&node.subject));
		ctx.fill();
		ctx.set_stroke_style_str(status_stroke(node.progress_status));
		ctx.set_line_width(3.0);
		ctx.stroke();

		if scene.hover == Some(idx) {
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + 4.0, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str("rgba(44, 62, 80, 0.4)");
			ctx.set_line_width(1.5);
			ctx.stroke();
		}

		// Labels live on the canvas, so they can never steal pointer
		// events from the node circle.
		ctx.set_fill_style_str("#2c3e50");
		ctx.set_font("bold 10px sans-serif");
		ctx.set_text_align("center");
		let _ = ctx.fill_text(&truncate_label(&node.name), x, y + 4.0);
		ctx.set_global_alpha(1.0);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unknown_subject_falls_back_to_default_color() {
		assert_eq!(subject_color("Math"), "#FF6B6B");
		assert_eq!(subject_color("Astrology"), "#95A5A6");
		assert_eq!(subject_color(""), "#95A5A6");
	}

	#[test]
	fn relationship_styles_cover_every_kind() {
		assert_eq!(relationship_color(RelationshipType::Prerequisite), "#3498db");
		assert_eq!(relationship_color(RelationshipType::Bridge), "#e74c3c");
		assert_eq!(relationship_color(RelationshipType::Branch), "#f39c12");
		assert_eq!(relationship_color(RelationshipType::Other), "#95a5a6");
		assert_eq!(relationship_dash(RelationshipType::Prerequisite), None);
		assert!(relationship_dash(RelationshipType::Bridge).is_some());
	}

	#[test]
	fn upcoming_nodes_are_dimmed() {
		assert_eq!(status_opacity(ProgressStatus::Upcoming), 0.6);
		assert_eq!(status_opacity(ProgressStatus::Completed), 1.0);
		assert_eq!(status_opacity(ProgressStatus::Current), 1.0);
	}

	#[test]
	fn edge_width_scales_with_sqrt_of_strength() {
		assert!((edge_width(0.8) - 2.0).abs() < 1e-9);
		assert!(edge_width(0.05) > 0.0);
	}

	#[test]
	fn long_labels_are_truncated_with_ellipsis() {
		assert_eq!(truncate_label("Motion"), "Motion");
		assert_eq!(truncate_label("Exactly15Chars!"), "Exactly15Chars!");
		assert_eq!(
			truncate_label("Velocity & Acceleration"),
			"Velocity & Acce..."
		);
	}
}
