//! campus-bootstrap - 统一服务启动骨架
//!
//! 所有服务复用的启动逻辑

mod runtime;

pub use runtime::*;
