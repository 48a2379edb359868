//! Top-level routed pages.

pub mod home;
pub mod not_found;
