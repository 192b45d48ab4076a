//! Service Module
//!
//! Business logic layer of the server.

pub mod scan;

pub use scan as scan_service;
