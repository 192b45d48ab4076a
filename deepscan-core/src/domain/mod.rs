//! Core domain types
//!
//! These types are shared between the runner (which produces them while a
//! scan executes) and the hosting surfaces (which render them).

pub mod log;
pub mod options;
pub mod task;
pub mod violation;
