//! Set-associative cache simulation.
//!
//! [`level::CacheLevel`] models one set-associative cache table;
//! [`hierarchy::CacheHierarchy`] composes up to three of them into the
//! L1 → L2 → L3 → memory lookup path with fixed miss penalties.

/// Multi-level composition and penalty accounting.
pub mod hierarchy;

/// Single set-associative cache level.
pub mod level;

pub use hierarchy::{AccessOutcome, CacheHierarchy, ServicedBy};
pub use level::{CacheLevel, CacheLine};
