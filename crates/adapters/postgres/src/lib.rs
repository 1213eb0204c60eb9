//! campus-adapter-postgres - PostgreSQL 适配器

mod connection;
mod retry;

pub use connection::*;
pub use retry::*;
