//! Interactive thread-graph visualization: fetches a knowledge graph for a
//! learning thread, lays it out with a force simulation, and renders it in
//! a floating canvas panel.

mod adapter;
mod api;
mod component;
mod layout;
mod panel;
mod render;
mod state;
mod types;

pub use panel::ThreadGraphPanel;
