use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use send_wrapper::SendWrapper;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent};

use super::render;
use super::state::GraphScene;
use super::types::NormalizedGraph;

/// Hover details surfaced next to the pointer. Lives and dies with the
/// canvas component, so no tooltip element can outlive a closed panel.
#[derive(Clone, Debug, PartialEq)]
struct TooltipInfo {
	name: String,
	subject: String,
	status: &'static str,
	x: f64,
	y: f64,
}

/// Renders one normalized graph into a canvas and runs its simulation loop
/// until unmounted. Dragging a node pins it under the pointer; hovering one
/// shows a tooltip.
#[component]
pub fn ThreadGraphCanvas(
	graph: NormalizedGraph,
	#[prop(default = 500.0)] width: f64,
	#[prop(default = 400.0)] height: f64,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let tooltip: RwSignal<Option<TooltipInfo>> = RwSignal::new(None);
	let scene: Rc<RefCell<Option<GraphScene>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let raf_id: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
	let disposed: Rc<Cell<bool>> = Rc::new(Cell::new(false));

	let (scene_init, animate_init, raf_init, disposed_init) = (
		scene.clone(),
		animate.clone(),
		raf_id.clone(),
		disposed.clone(),
	);
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if scene_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		canvas.set_width(width as u32);
		canvas.set_height(height as u32);

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.unwrap()
			.unwrap()
			.dyn_into()
			.unwrap();
		*scene_init.borrow_mut() = Some(GraphScene::new(&graph, width, height));

		let (scene_anim, animate_inner, raf_inner, disposed_anim) = (
			scene_init.clone(),
			animate_init.clone(),
			raf_init.clone(),
			disposed_init.clone(),
		);
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if disposed_anim.get() {
				return;
			}
			if let Some(ref mut s) = *scene_anim.borrow_mut() {
				s.tick();
				render::render(s, &ctx);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				if let Ok(id) = web_sys::window()
					.unwrap()
					.request_animation_frame(cb.as_ref().unchecked_ref())
				{
					raf_inner.set(Some(id));
				}
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			if let Ok(id) = web_sys::window()
				.unwrap()
				.request_animation_frame(cb.as_ref().unchecked_ref())
			{
				raf_init.set(Some(id));
			}
		}
	});

	// Unmount: no further ticks, no orphaned frame callback, no leaked
	// closure across open/close cycles. The handles are browser-thread
	// only and the cleanup hook wants Send + Sync, so they cross into it
	// inside a SendWrapper; cleanup runs on the same thread that made it.
	let cleanup_state = SendWrapper::new((
		scene.clone(),
		animate.clone(),
		raf_id.clone(),
		disposed.clone(),
	));
	on_cleanup(move || {
		let (scene, animate, raf_id, disposed) = cleanup_state.take();
		disposed.set(true);
		if let Some(id) = raf_id.take() {
			if let Some(window) = web_sys::window() {
				let _ = window.cancel_animation_frame(id);
			}
		}
		if let Some(ref mut s) = *scene.borrow_mut() {
			s.layout.stop();
		}
		animate.borrow_mut().take();
	});

	let local_coords = move |ev: &MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		(
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		)
	};

	let scene_md = scene.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let (x, y) = local_coords(&ev);
		if let Some(ref mut s) = *scene_md.borrow_mut() {
			if let Some(idx) = s.node_at_position(x, y) {
				s.begin_drag(idx);
				tooltip.set(None);
			}
		}
	};

	let scene_mm = scene.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let (x, y) = local_coords(&ev);
		if let Some(ref mut s) = *scene_mm.borrow_mut() {
			if s.is_dragging() {
				s.drag_to(x, y);
				return;
			}
			let hovered = s.node_at_position(x, y);
			s.set_hover(hovered);
			tooltip.set(hovered.map(|idx| {
				let node = &s.nodes[idx];
				TooltipInfo {
					name: node.name.clone(),
					subject: node.subject.clone(),
					status: node.progress_status.as_str(),
					x: ev.client_x() as f64 + 10.0,
					y: ev.client_y() as f64 - 10.0,
				}
			}));
		}
	};

	let scene_mu = scene.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *scene_mu.borrow_mut() {
			s.end_drag();
		}
	};

	let scene_ml = scene.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *scene_ml.borrow_mut() {
			s.end_drag();
			s.set_hover(None);
		}
		tooltip.set(None);
	};

	view! {
		<div style="position: relative;">
			<canvas
				node_ref=canvas_ref
				class="thread-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				style="display: block; cursor: grab; border: 1px solid #f3f4f6; border-radius: 4px;"
			/>
			{move || {
				tooltip.get().map(|t| {
					view! {
						<div
							class="thread-graph-tooltip"
							style=format!(
								"position: fixed; left: {}px; top: {}px; background: rgba(0, 0, 0, 0.8); \
								color: white; padding: 8px; border-radius: 4px; font-size: 12px; \
								pointer-events: none; z-index: 1000;",
								t.x,
								t.y,
							)
						>
							<strong>{t.name.clone()}</strong>
							<br />
							{format!("Subject: {}", t.subject)}
							<br />
							{format!("Status: {}", t.status)}
						</div>
					}
				})
			}}
		</div>
	}
}
