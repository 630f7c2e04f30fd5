//! Input/output helpers.
//!
//! - CSV ingest into raw rows (`ingest`)
//! - table exports to CSV (`export`)
//! - run snapshot JSON read/write (`snapshot`)

pub mod export;
pub mod ingest;
pub mod snapshot;

pub use export::*;
pub use ingest::*;
pub use snapshot::*;
