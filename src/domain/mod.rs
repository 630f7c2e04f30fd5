//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the closed party set and per-row shares (`Party`, `PartyShares`)
//! - raw input and normalized poll records (`RawTable`, `PollRecord`)
//! - output tables (`TableRow`, `PollTable`, `Datasets`)
//! - run configuration (`PipelineConfig`, `Coalition`)

pub mod types;

pub use types::*;
