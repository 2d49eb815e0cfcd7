//! # Engine Units
//!
//! This module organizes the unit tests by engine, mirroring the library's
//! module layout.


/// Tests for the single set-associative cache level.
pub mod cache_level;



/// Tests for the multi-level cache hierarchy (refill, penalties, write paths).
pub mod hierarchy;


/// Tests for demand paging (translation, faults, FIFO/LRU eviction).
pub mod vm;
