//! HTTP API

pub mod dto;
mod handlers;
mod routes;

pub use routes::{AppState, build_router};
