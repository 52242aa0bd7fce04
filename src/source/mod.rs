//! Dataset sources.
//!
//! This module resolves where the nominee CSV lives and reads its bytes,
//! either from disk or over HTTP.

pub mod loader;

pub use loader::*;
