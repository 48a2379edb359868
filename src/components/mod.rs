//! Reusable UI components.

pub mod thread_graph;
