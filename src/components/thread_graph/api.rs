//! HTTP access to the thread-graph endpoint, plus a short-lived response
//! cache so reopening a panel does not refetch an unchanged graph.

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use super::types::ThreadGraphResponse;

/// Responses younger than this are served from cache, keyed by thread id.
pub const CACHE_TTL_MS: f64 = 10.0 * 60.0 * 1000.0;

/// Ways a thread-graph fetch can fail. All of them surface as the panel's
/// error state; none of them propagate past the panel boundary.
#[derive(Debug, Error)]
pub enum FetchError {
	#[error("network error: {0}")]
	Network(String),
	#[error("unexpected HTTP status {0}")]
	Status(u16),
	#[error("malformed response body: {0}")]
	Decode(#[from] serde_json::Error),
	#[error("graph service error: {0}")]
	Service(String),
	#[error("no browser window available")]
	NoWindow,
}

/// The envelope the graph service wraps every payload in.
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
	#[serde(default)]
	success: bool,
	#[serde(default)]
	data: Option<ThreadGraphResponse>,
	#[serde(default)]
	error: Option<String>,
	#[serde(default)]
	message: Option<String>,
}

fn js_error(value: JsValue) -> FetchError {
	FetchError::Network(format!("{value:?}"))
}

/// GET `{base_url}/api/thread/{thread_id}/graph` and unwrap the envelope.
pub async fn fetch_thread_graph(
	base_url: &str,
	thread_id: &str,
) -> Result<ThreadGraphResponse, FetchError> {
	let window = web_sys::window().ok_or(FetchError::NoWindow)?;
	let url = format!("{base_url}/api/thread/{thread_id}/graph");

	let response = JsFuture::from(window.fetch_with_str(&url))
		.await
		.map_err(js_error)?;
	let response: Response = response.dyn_into().map_err(js_error)?;
	if !response.ok() {
		return Err(FetchError::Status(response.status()));
	}

	let body = JsFuture::from(response.text().map_err(js_error)?)
		.await
		.map_err(js_error)?;
	parse_envelope(&body.as_string().unwrap_or_default())
}

fn parse_envelope(body: &str) -> Result<ThreadGraphResponse, FetchError> {
	let envelope: ApiEnvelope = serde_json::from_str(body)?;
	if !envelope.success {
		return Err(FetchError::Service(
			envelope
				.error
				.or(envelope.message)
				.unwrap_or_else(|| "unknown error".into()),
		));
	}
	envelope
		.data
		.ok_or_else(|| FetchError::Service("response missing data".into()))
}

/// In-memory TTL cache over raw responses. Time is supplied by the caller
/// as a millisecond stamp, which keeps the cache usable under both the
/// browser clock and plain test harnesses.
pub struct GraphCache {
	ttl_ms: f64,
	entries: HashMap<String, (f64, ThreadGraphResponse)>,
}

impl GraphCache {
	pub fn new() -> Self {
		Self::with_ttl(CACHE_TTL_MS)
	}

	pub fn with_ttl(ttl_ms: f64) -> Self {
		Self {
			ttl_ms,
			entries: HashMap::new(),
		}
	}

	pub fn get(&mut self, thread_id: &str, now_ms: f64) -> Option<ThreadGraphResponse> {
		match self.entries.get(thread_id) {
			Some((stored, response)) if now_ms - stored < self.ttl_ms => Some(response.clone()),
			Some(_) => {
				self.entries.remove(thread_id);
				None
			}
			None => None,
		}
	}

	pub fn insert(&mut self, thread_id: &str, response: ThreadGraphResponse, now_ms: f64) {
		self.entries.insert(thread_id.to_string(), (now_ms, response));
	}
}

impl Default for GraphCache {
	fn default() -> Self {
		Self::new()
	}
}
