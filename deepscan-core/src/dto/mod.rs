//! Data Transfer Objects for the HTTP surface
//!
//! Lightweight request and response bodies exchanged between the web UI
//! and the scan server.

pub mod scan;
