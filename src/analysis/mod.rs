//! Analysis modules.
//!
//! Aggregation of nominee records into per-year summaries.

pub mod aggregator;

pub use aggregator::*;
