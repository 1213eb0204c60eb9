//! lib-circ - 图书馆流通服务
//!
//! 负责借出/归还事务、借阅资格判定与逾期罚金计算

pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
