//! 流通领域层

pub mod entities;
pub mod repositories;
pub mod services;
pub mod value_objects;
