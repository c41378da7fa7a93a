//! Command implementations

pub mod data;
pub mod flow;
pub mod profile;
pub mod resource;
