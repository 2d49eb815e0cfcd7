//! Unified memory system.
//!
//! Composes the allocator, paging, and cache engines into the single reference
//! path a user-issued access follows. It implements:
//! 1. **Component lifecycle:** `init`/`clear` for the allocator (contiguous or
//!    buddy), the paging engine, and the cache hierarchy.
//! 2. **The access pipeline:** virtual address → page table → physical address →
//!    cache hierarchy → memory, skipping the stages that are not enabled.
//! 3. **Allocator dispatch:** `malloc`/`free` commands against whichever
//!    allocator is active.
//!
//! Accesses return an [`AccessReport`] combining the translation and cache
//! outcomes, so presentation layers can narrate every step without reaching
//! into the engines mid-flight.

use crate::alloc::{Allocator, BuddyAllocator, FreeListAllocator};
use crate::cache::{AccessOutcome, CacheHierarchy};
use crate::config::{defaults, AllocationStrategy, CacheConfig, PageReplacement};
use crate::error::{SimError, SystemError};
use crate::vm::{Translation, VirtualMemory};

/// Everything observed along one unified access.
#[derive(Clone, Copy, Debug)]
pub struct AccessReport {
    /// The address as issued (virtual when paging is on).
    pub address: usize,
    /// Translation detail when paging is enabled.
    pub translation: Option<Translation>,
    /// Physical address after translation (equal to `address` otherwise).
    pub physical_address: usize,
    /// Whether the access was a write.
    pub is_write: bool,
    /// Cache walk detail when a hierarchy is enabled.
    pub cache: Option<AccessOutcome>,
    /// Whether the access reached main memory.
    pub memory_accessed: bool,
}

/// The composed simulator: one allocator, optional paging, optional caches.
#[derive(Default)]
pub struct MemorySystem {
    allocator: Option<Allocator>,
    vm: Option<VirtualMemory>,
    cache: Option<CacheHierarchy>,
    physical_memory: usize,
}

impl MemorySystem {
    /// Creates an empty system with no components enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the active allocator, if any.
    pub fn allocator(&self) -> Option<&Allocator> {
        self.allocator.as_ref()
    }

    /// Returns the paging engine, if enabled.
    pub fn vm(&self) -> Option<&VirtualMemory> {
        self.vm.as_ref()
    }

    /// Returns the cache hierarchy, if enabled.
    pub fn cache(&self) -> Option<&CacheHierarchy> {
        self.cache.as_ref()
    }

    /// Returns the physical arena size in bytes (zero before `init memory`).
    pub fn physical_memory(&self) -> usize {
        self.physical_memory
    }

    /// Creates the physical allocator, replacing any previous one.
    ///
    /// Buddy mode forces a power-of-two arena (rounded up when needed) with
    /// the default minimum block size. Returns the arena size actually used.
    pub fn init_memory(&mut self, size: usize, buddy: bool) -> usize {
        let arena = if buddy && !size.is_power_of_two() {
            size.max(1).next_power_of_two()
        } else {
            size
        };

        self.allocator = Some(if buddy {
            Allocator::Buddy(BuddyAllocator::new(arena, defaults::MIN_BLOCK_SIZE))
        } else {
            Allocator::Contiguous(FreeListAllocator::new(arena))
        });
        self.physical_memory = arena;
        arena
    }

    /// Enables paging over the configured physical memory.
    ///
    /// # Errors
    ///
    /// [`SystemError::NoPhysicalMemory`] before `init_memory`.
    pub fn init_vm(
        &mut self,
        vm_size: usize,
        page_size: usize,
        policy: PageReplacement,
    ) -> Result<(), SystemError> {
        if self.physical_memory == 0 {
            return Err(SystemError::NoPhysicalMemory);
        }
        self.vm = Some(VirtualMemory::new(
            vm_size,
            self.physical_memory,
            page_size,
            policy,
        ));
        Ok(())
    }

    /// Builds the cache hierarchy, replacing any previous one.
    ///
    /// # Errors
    ///
    /// [`SystemError::MissingL1`] when the L1 level is disabled.
    pub fn init_cache(&mut self, config: CacheConfig) -> Result<(), SystemError> {
        if !config.l1.enabled() {
            return Err(SystemError::MissingL1);
        }
        self.cache = Some(CacheHierarchy::new(&config));
        Ok(())
    }

    /// Sets the contiguous allocator's placement strategy.
    ///
    /// # Errors
    ///
    /// [`SystemError::NoAllocator`] with no allocator,
    /// [`SystemError::NotContiguous`] while the buddy system is active.
    pub fn set_strategy(&mut self, strategy: AllocationStrategy) -> Result<(), SystemError> {
        match self.allocator.as_mut() {
            None => Err(SystemError::NoAllocator),
            Some(Allocator::Buddy(_)) => Err(SystemError::NotContiguous),
            Some(Allocator::Contiguous(a)) => {
                a.set_strategy(strategy);
                Ok(())
            }
        }
    }

    /// Switches the page replacement policy.
    ///
    /// # Errors
    ///
    /// [`SystemError::NoVirtualMemory`] while paging is disabled.
    pub fn set_vm_policy(&mut self, policy: PageReplacement) -> Result<(), SystemError> {
        match self.vm.as_mut() {
            None => Err(SystemError::NoVirtualMemory),
            Some(vm) => {
                vm.set_policy(policy);
                Ok(())
            }
        }
    }

    /// Allocates `size` bytes from the active allocator.
    pub fn allocate(&mut self, size: usize) -> Result<u64, SimError> {
        let allocator = self.allocator.as_mut().ok_or(SystemError::NoAllocator)?;
        Ok(allocator.allocate(size)?)
    }

    /// Frees block `id` in the active allocator.
    pub fn deallocate(&mut self, id: u64) -> Result<(), SimError> {
        let allocator = self.allocator.as_mut().ok_or(SystemError::NoAllocator)?;
        Ok(allocator.deallocate(id)?)
    }

    /// Runs one access through the unified pipeline.
    ///
    /// With paging enabled the address is translated first (a failed
    /// translation aborts the access); a write also marks the resident page
    /// dirty. With a cache hierarchy enabled the physical address then walks
    /// the levels; otherwise the access goes straight to memory.
    ///
    /// # Errors
    ///
    /// [`SimError::Translate`] when the virtual address is out of range.
    pub fn access(&mut self, address: usize, is_write: bool) -> Result<AccessReport, SimError> {
        let mut translation = None;
        let mut physical_address = address;

        if let Some(vm) = self.vm.as_mut() {
            let t = vm.translate(address)?;
            if is_write {
                vm.mark_dirty(t.page);
            }
            physical_address = t.physical_address;
            translation = Some(t);
        }

        let cache = self.cache.as_mut().map(|hierarchy| {
            if is_write {
                hierarchy.write(physical_address)
            } else {
                hierarchy.read(physical_address)
            }
        });

        let memory_accessed = cache.map_or(true, |outcome| outcome.memory_fetch);

        Ok(AccessReport {
            address,
            translation,
            physical_address,
            is_write,
            cache,
            memory_accessed,
        })
    }

    /// Tears down every component, returning to the empty state.
    pub fn clear(&mut self) {
        self.allocator = None;
        self.vm = None;
        self.cache = None;
        self.physical_memory = 0;
    }
}
