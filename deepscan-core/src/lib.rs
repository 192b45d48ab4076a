//! Deepscan Core
//!
//! Core types shared by the deepscan engine and its hosting surfaces.
//!
//! This crate contains:
//! - Domain types: tasks, violations, the scan log and scan options
//! - DTOs: request/response bodies used by the HTTP surface

pub mod domain;
pub mod dto;
