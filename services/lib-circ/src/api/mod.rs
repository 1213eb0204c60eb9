//! API 层

pub mod http;

pub use http::{AppState, build_router};
