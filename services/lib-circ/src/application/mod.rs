//! 流通应用层

pub mod commands;
pub mod handlers;
pub mod queries;
