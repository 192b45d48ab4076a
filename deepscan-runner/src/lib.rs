//! Deepscan scan engine
//!
//! Stages a container build context for a package, a local project or a
//! git project, runs the license scan container and collects the policy
//! violations it reports. Progress goes to a [`log::LogSink`].

pub mod config;
pub mod docker;
pub mod error;
pub mod log;
pub mod pipeline;
pub mod process;
pub mod report;
pub mod workspace;

pub use config::ScanConfig;
pub use error::{Result, ScanError};
pub use log::{LogSink, StreamSink, TerminalSink};
pub use pipeline::{ScanOutcome, ScanPipeline};
