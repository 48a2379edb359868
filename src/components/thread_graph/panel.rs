//! Floating panel that owns one visualization session: fetch, normalize,
//! simulate, render, tear down.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, warn};
use web_sys::MouseEvent;

use super::adapter;
use super::api::{self, FetchError, GraphCache};
use super::component::ThreadGraphCanvas;
use super::render::relationship_color;
use super::types::{GraphMetadata, NormalizedGraph, RelationshipType, ThreadGraphResponse};

pub const CANVAS_WIDTH: f64 = 500.0;
pub const CANVAS_HEIGHT: f64 = 400.0;
/// Canvas plus header/footer chrome.
pub const PANEL_WIDTH: f64 = CANVAS_WIDTH + 40.0;
pub const PANEL_HEIGHT: f64 = CANVAS_HEIGHT + 80.0;

/// Monotonic open-session counter. A fetch keeps the token it was started
/// with; by the time it resolves, the token is only honored if no close or
/// newer open happened in between.
#[derive(Clone, Default)]
pub struct SessionCounter(Rc<Cell<u64>>);

impl SessionCounter {
	pub fn begin(&self) -> SessionToken {
		self.0.set(self.0.get() + 1);
		SessionToken {
			counter: self.0.clone(),
			id: self.0.get(),
		}
	}

	pub fn invalidate(&self) {
		self.0.set(self.0.get() + 1);
	}
}

/// Handle for one open session; see [`SessionCounter`].
#[derive(Clone)]
pub struct SessionToken {
	counter: Rc<Cell<u64>>,
	id: u64,
}

impl SessionToken {
	pub fn is_current(&self) -> bool {
		self.counter.get() == self.id
	}
}

/// Place the panel next to its anchor without letting it leave the viewport.
pub fn clamp_to_viewport(anchor: (f64, f64), panel: (f64, f64), viewport: (f64, f64)) -> (f64, f64) {
	(
		anchor.0.min(viewport.0 - panel.0).max(0.0),
		anchor.1.min(viewport.1 - panel.1).max(0.0),
	)
}

#[derive(Clone)]
enum PanelPhase {
	Loading,
	Ready {
		graph: NormalizedGraph,
		metadata: Option<GraphMetadata>,
	},
	Empty,
	Error,
}

fn phase_from_response(thread_id: &str, response: &ThreadGraphResponse) -> PanelPhase {
	let graph = adapter::normalize(response);
	if graph.dropped_edges > 0 {
		warn!(
			"thread {thread_id}: dropped {} edge(s) referencing unknown nodes",
			graph.dropped_edges
		);
	}
	if graph.is_empty() {
		PanelPhase::Empty
	} else {
		PanelPhase::Ready {
			graph,
			metadata: response.metadata.clone(),
		}
	}
}

fn viewport_size() -> (f64, f64) {
	web_sys::window()
		.map(|w| {
			(
				w.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(1024.0),
				w.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(768.0),
			)
		})
		.unwrap_or((1024.0, 768.0))
}

/// Floating thread-graph panel. The host page controls `is_visible` and the
/// anchor; the panel reports back only through `on_close`, which fires once
/// per click on the close button and never on its own.
#[component]
pub fn ThreadGraphPanel(
	#[prop(into)] thread_id: Signal<String>,
	#[prop(into)] is_visible: Signal<bool>,
	#[prop(into)] anchor: Signal<(f64, f64)>,
	#[prop(into)] on_close: Callback<()>,
	#[prop(into, default = String::new())] api_base: String,
) -> impl IntoView {
	let phase = RwSignal::new(PanelPhase::Loading);
	let sessions = SessionCounter::default();
	let cache: Rc<RefCell<GraphCache>> = Rc::new(RefCell::new(GraphCache::new()));

	let (sessions_fx, cache_fx) = (sessions.clone(), cache.clone());
	Effect::new(move |_| {
		if !is_visible.get() {
			// A close made before the fetch resolves must orphan that
			// fetch; the token comparison below takes care of it.
			sessions_fx.invalidate();
			phase.set(PanelPhase::Loading);
			return;
		}
		let id = thread_id.get();
		let token = sessions_fx.begin();
		phase.set(PanelPhase::Loading);

		if let Some(cached) = cache_fx.borrow_mut().get(&id, js_sys::Date::now()) {
			debug!("thread {id}: serving graph from cache");
			phase.set(phase_from_response(&id, &cached));
			return;
		}

		let (cache_task, api_base) = (cache_fx.clone(), api_base.clone());
		spawn_local(async move {
			let result = fetch_and_store(&api_base, &id, &cache_task).await;
			if !token.is_current() {
				debug!("thread {id}: discarding response for a closed session");
				return;
			}
			match result {
				Ok(response) => phase.set(phase_from_response(&id, &response)),
				Err(err) => {
					warn!("thread {id}: graph fetch failed: {err}");
					phase.set(PanelPhase::Error);
				}
			}
		});
	});

	let panel_position = move || {
		clamp_to_viewport(anchor.get(), (PANEL_WIDTH, PANEL_HEIGHT), viewport_size())
	};
	let close = move |_: MouseEvent| on_close.run(());

	view! {
		<Show when=move || is_visible.get()>
			<div
				class="thread-graph-panel"
				style=move || {
					let (left, top) = panel_position();
					format!(
						"position: fixed; left: {left}px; top: {top}px; width: {PANEL_WIDTH}px; \
						z-index: 50; background: white; border: 1px solid #e5e7eb; \
						border-radius: 8px; box-shadow: 0 10px 25px rgba(0, 0, 0, 0.15);",
					)
				}
			>
				<div style="display: flex; justify-content: space-between; align-items: center; padding: 12px 16px; border-bottom: 1px solid #f3f4f6;">
					<h3 style="margin: 0; font-size: 16px; color: #1f2937;">"Thread Visualization"</h3>
					<button
						on:click=close
						style="border: none; background: none; color: #9ca3af; cursor: pointer; font-size: 14px;"
					>
						"✕"
					</button>
				</div>
				<div style="padding: 16px;">
					{move || match phase.get() {
						PanelPhase::Loading => {
							view! {
								<div
									class="thread-graph-loading"
									style=format!(
										"display: flex; align-items: center; justify-content: center; height: {CANVAS_HEIGHT}px; color: #4b5563;",
									)
								>
									"Loading thread graph..."
								</div>
							}
								.into_any()
						}
						PanelPhase::Error => {
							view! {
								<div
									class="thread-graph-error"
									style=format!(
										"display: flex; flex-direction: column; align-items: center; justify-content: center; height: {CANVAS_HEIGHT}px; color: #dc2626;",
									)
								>
									<p style="font-weight: 600; margin: 0;">"ThreadGraph Error"</p>
									<p style="margin: 4px 0 0;">"Unable to load thread visualization"</p>
								</div>
							}
								.into_any()
						}
						PanelPhase::Empty => {
							view! {
								<div
									class="thread-graph-empty"
									style=format!(
										"display: flex; align-items: center; justify-content: center; height: {CANVAS_HEIGHT}px; color: #6b7280;",
									)
								>
									"No graph data found for this thread"
								</div>
							}
								.into_any()
						}
						PanelPhase::Ready { graph, metadata } => {
							view! {
								<div style="position: relative;">
									<ThreadGraphCanvas graph=graph width=CANVAS_WIDTH height=CANVAS_HEIGHT />
									<Legend />
								</div>
								<MetadataFooter metadata=metadata />
							}
								.into_any()
						}
					}}
				</div>
			</div>
		</Show>
	}
}

#[component]
fn Legend() -> impl IntoView {
	let row = |kind: RelationshipType, label: &'static str| {
		view! {
			<div style="display: flex; align-items: center; gap: 6px;">
				<div style=format!(
					"width: 12px; height: 2px; background: {};",
					relationship_color(kind),
				) />
				<span>{label}</span>
			</div>
		}
	};
	view! {
		<div style="position: absolute; bottom: 8px; right: 8px; background: rgba(255, 255, 255, 0.9); padding: 8px; border-radius: 4px; font-size: 11px; color: #374151;">
			{row(RelationshipType::Prerequisite, "Prerequisite")}
			{row(RelationshipType::Bridge, "Bridge")}
			{row(RelationshipType::Branch, "Branch")}
		</div>
	}
}

#[component]
fn MetadataFooter(metadata: Option<GraphMetadata>) -> impl IntoView {
	metadata.map(|meta| {
		let bridges = meta.cross_subject_bridges.len();
		let branches = meta.branching_opportunities.len();
		(bridges > 0 || branches > 0).then(|| {
			view! {
				<div style="padding-top: 8px; font-size: 11px; color: #6b7280;">
					{(bridges > 0)
						.then(|| view! { <p style="margin: 0;">{format!("{bridges} cross-subject bridge(s)")}</p> })}
					{(branches > 0)
						.then(|| {
							view! {
								<p style="margin: 0;">{format!("{branches} branching opportunit(ies)")}</p>
							}
						})}
				</div>
			}
		})
	})
}

async fn fetch_and_store(
	api_base: &str,
	thread_id: &str,
	cache: &Rc<RefCell<GraphCache>>,
) -> Result<ThreadGraphResponse, FetchError> {
	let response = api::fetch_thread_graph(api_base, thread_id).await?;
	cache
		.borrow_mut()
		.insert(thread_id, response.clone(), js_sys::Date::now());
	Ok(response)
}
