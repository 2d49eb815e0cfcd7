//! Error definitions for the simulation engines.
//!
//! This module defines the recoverable failure conditions of the simulator. It provides:
//! 1. **Allocation errors:** Rejected or unsatisfiable allocator requests.
//! 2. **Translation errors:** Virtual addresses outside the configured space.
//! 3. **System errors:** Commands issued against missing components.
//!
//! Every error is local to one command; no failure leaves a component in a
//! partially mutated state (attempt/failure counters excepted).

use std::fmt;

/// Failure conditions of the allocators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// A zero-byte allocation was requested.
    ZeroSize,

    /// The request exceeds the whole arena.
    ///
    /// The associated values are the requested size and the arena size.
    ExceedsArena(usize, usize),

    /// No free block can satisfy the request.
    OutOfMemory(usize),

    /// `deallocate` was called with an id that is not live.
    UnknownBlock(u64),
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocError::ZeroSize => write!(f, "cannot allocate 0 bytes"),
            AllocError::ExceedsArena(req, arena) => {
                write!(f, "requested {} bytes exceeds arena of {} bytes", req, arena)
            }
            AllocError::OutOfMemory(req) => {
                write!(f, "not enough memory to allocate {} bytes", req)
            }
            AllocError::UnknownBlock(id) => write!(f, "block {} not found", id),
        }
    }
}

impl std::error::Error for AllocError {}

/// Failure conditions of address translation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TranslateError {
    /// The virtual address lies beyond the configured virtual space.
    ///
    /// The associated values are the address and the virtual space size.
    OutOfRange(usize, usize),
}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslateError::OutOfRange(addr, limit) => write!(
                f,
                "virtual address {:#x} exceeds virtual memory size {:#x}",
                addr, limit
            ),
        }
    }
}

impl std::error::Error for TranslateError {}

/// Failure conditions of the unified system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SystemError {
    /// An allocator command was issued before `init memory`.
    NoAllocator,

    /// Paging was requested before physical memory exists.
    NoPhysicalMemory,

    /// A strategy command was issued while the buddy allocator is active.
    NotContiguous,

    /// A paging command was issued while paging is disabled.
    NoVirtualMemory,

    /// A cache configuration without an L1 level.
    MissingL1,
}

impl fmt::Display for SystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemError::NoAllocator => write!(f, "no memory allocator initialized"),
            SystemError::NoPhysicalMemory => {
                write!(f, "initialize physical memory first")
            }
            SystemError::NotContiguous => {
                write!(f, "buddy allocator does not use placement strategies")
            }
            SystemError::NoVirtualMemory => write!(f, "virtual memory not initialized"),
            SystemError::MissingL1 => write!(f, "cache hierarchy requires an L1 level"),
        }
    }
}

impl std::error::Error for SystemError {}

/// Any failure surfaced by the unified system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimError {
    /// An allocator rejected a request.
    Alloc(AllocError),
    /// Address translation failed.
    Translate(TranslateError),
    /// A command was issued against a missing component.
    System(SystemError),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::Alloc(e) => e.fmt(f),
            SimError::Translate(e) => e.fmt(f),
            SimError::System(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for SimError {}

impl From<AllocError> for SimError {
    fn from(e: AllocError) -> Self {
        SimError::Alloc(e)
    }
}

impl From<TranslateError> for SimError {
    fn from(e: TranslateError) -> Self {
        SimError::Translate(e)
    }
}

impl From<SystemError> for SimError {
    fn from(e: SystemError) -> Self {
        SimError::System(e)
    }
}
