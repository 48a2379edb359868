use leptos::prelude::*;

/// 404 page shown for unmatched routes.
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<div class="not-found" style="padding: 2rem; font-family: sans-serif;">
			<h1>"404"</h1>
			<p>"Page not found."</p>
			<a href="/">"Back home"</a>
		</div>
	}
}
