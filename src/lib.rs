//! `poll-series` library crate.
//!
//! The binary (`polls`) is a thin wrapper around this library so that:
//!
//! - the transformation pipeline is testable without spawning processes
//! - callers that already hold an extracted poll table can use it directly
//!   (`app::pipeline::build_datasets`)

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod report;
pub mod transform;
