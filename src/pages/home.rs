use leptos::prelude::*;
use web_sys::MouseEvent;

use crate::components::thread_graph::ThreadGraphPanel;

/// Default Home Page: pick a thread and open its graph next to the button.
#[component]
pub fn Home() -> impl IntoView {
	let (thread_id, set_thread_id) = signal("thread-1".to_string());
	let (visible, set_visible) = signal(false);
	let (anchor, set_anchor) = signal((0.0_f64, 0.0_f64));

	let open = move |ev: MouseEvent| {
		set_anchor.set((ev.client_x() as f64 + 12.0, ev.client_y() as f64));
		set_visible.set(true);
	};
	let on_close = Callback::new(move |_| set_visible.set(false));

	view! {
		<div class="home-page" style="padding: 2rem; font-family: sans-serif;">
			<h1>"Learning Threads"</h1>
			<p class="subtitle">
				"Open the graph to see how the concepts in a thread connect across subjects."
			</p>
			<div style="display: flex; gap: 8px; align-items: center;">
				<input
					prop:value=thread_id
					on:input=move |ev| set_thread_id.set(event_target_value(&ev))
					placeholder="thread id"
				/>
				<button on:click=open>"View thread graph"</button>
			</div>

			<ThreadGraphPanel
				thread_id=thread_id
				is_visible=visible
				anchor=anchor
				on_close=on_close
			/>
		</div>
	}
}
