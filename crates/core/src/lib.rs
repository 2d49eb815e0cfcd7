//! Memory hierarchy simulator library.
//!
//! This crate implements the simulation engines of an educational memory
//! hierarchy simulator:
//! 1. **Allocators:** A contiguous free-list allocator (First/Best/Worst Fit,
//!    splitting, coalescing) and a binary buddy allocator (order-indexed free
//!    lists, recursive split/merge).
//! 2. **Paging:** A demand-paged virtual memory with page/frame tables and
//!    FIFO/LRU replacement.
//! 3. **Caches:** Set-associative levels with FIFO/LRU replacement and
//!    write-through/write-back policies, composed into an L1/L2/L3 hierarchy
//!    with fixed miss penalties.
//! 4. **The unified pipeline:** virtual address → page table → physical
//!    address → cache hierarchy → memory.
//!
//! No data is stored at any simulated address; the engines are pure
//! bookkeeping machines whose counters and tables are the observable output.

/// Physical memory allocators (contiguous free-list and buddy system).
pub mod alloc;
/// Set-associative cache levels and the multi-level hierarchy.
pub mod cache;
/// Configuration structures, policy enums, and token parsing.
pub mod config;
/// Recoverable error definitions.
pub mod error;
/// The unified access pipeline composing all engines.
pub mod system;
/// Demand-paged virtual memory.
pub mod vm;

/// Root configuration type; deserialize from JSON or build per command.
pub use crate::config::Config;
/// The composed simulator; owns the allocator, paging, and cache engines.
pub use crate::system::MemorySystem;
