//! Contiguous free-list allocator.
//!
//! Models a classic variable-partition allocator over a fixed byte arena. It
//! implements:
//! 1. **Placement:** First-Fit, Best-Fit, and Worst-Fit search over the block list.
//! 2. **Splitting:** Oversized free blocks are split, leaving a trailing free remainder.
//! 3. **Coalescing:** After every free, adjacent free blocks are fused in a single
//!    left-to-right pass.
//! 4. **Accounting:** Attempt/success/failure counts and fragmentation metrics.
//!
//! Blocks are kept in a vector ordered by start address, so the neighbour links of
//! the classic linked-list formulation become plain index arithmetic: the blocks
//! form a totally ordered cover of `[0, total_memory)` with no gaps or overlaps.

use crate::config::AllocationStrategy;
use crate::error::AllocError;

/// One partition of the arena.
#[derive(Clone, Copy, Debug)]
pub struct Block {
    /// First byte of the partition.
    pub start: usize,
    /// Partition length in bytes.
    pub size: usize,
    /// Whether the partition is currently allocated.
    pub allocated: bool,
    /// Live allocation id; meaningful only while `allocated`.
    pub id: u64,
}

/// Contiguous allocator state.
///
/// Construction produces a single free block covering the arena; the block
/// list only ever mutates through [`allocate`](FreeListAllocator::allocate)
/// and [`deallocate`](FreeListAllocator::deallocate).
pub struct FreeListAllocator {
    total_memory: usize,
    blocks: Vec<Block>,
    strategy: AllocationStrategy,
    next_block_id: u64,

    /// Allocation attempts, successful or not.
    pub attempts: u64,
    /// Allocations that returned a block id.
    pub successes: u64,
    /// Allocations that failed (zero size or no fit).
    pub failures: u64,
}

impl FreeListAllocator {
    /// Creates an allocator over an arena of `size` bytes.
    ///
    /// The arena starts as one free block at address 0. The initial
    /// placement strategy is First-Fit.
    pub fn new(size: usize) -> Self {
        Self {
            total_memory: size,
            blocks: vec![Block {
                start: 0,
                size,
                allocated: false,
                id: 0,
            }],
            strategy: AllocationStrategy::FirstFit,
            next_block_id: 1,
            attempts: 0,
            successes: 0,
            failures: 0,
        }
    }

    /// Sets the placement strategy for subsequent allocations.
    pub fn set_strategy(&mut self, strategy: AllocationStrategy) {
        self.strategy = strategy;
    }

    /// Returns the active placement strategy.
    pub fn strategy(&self) -> AllocationStrategy {
        self.strategy
    }

    /// Returns the arena size in bytes.
    pub fn total_memory(&self) -> usize {
        self.total_memory
    }

    /// Returns the block list, ordered by start address.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Index of the free block chosen by the active strategy, if any fits.
    ///
    /// First-Fit takes the lowest-address fit; Best-Fit minimises leftover
    /// space; Worst-Fit maximises block size. All ties resolve to the
    /// lowest address by traversal order.
    fn find_block(&self, size: usize) -> Option<usize> {
        let fits = self
            .blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| !b.allocated && b.size >= size);

        match self.strategy {
            AllocationStrategy::FirstFit => fits.map(|(i, _)| i).next(),
            AllocationStrategy::BestFit => {
                let mut best: Option<(usize, usize)> = None;
                for (i, b) in fits {
                    let diff = b.size - size;
                    if best.map_or(true, |(_, d)| diff < d) {
                        best = Some((i, diff));
                    }
                }
                best.map(|(i, _)| i)
            }
            AllocationStrategy::WorstFit => {
                let mut worst: Option<(usize, usize)> = None;
                for (i, b) in fits {
                    if worst.map_or(true, |(_, s)| b.size > s) {
                        worst = Some((i, b.size));
                    }
                }
                worst.map(|(i, _)| i)
            }
        }
    }

    /// Allocates `size` bytes and returns the new block id.
    ///
    /// The chosen free block is split when it is strictly larger than the
    /// request; the remainder stays free immediately after the new
    /// allocation. Ids are assigned from a monotone counter starting at 1.
    ///
    /// # Errors
    ///
    /// [`AllocError::ZeroSize`] for a zero-byte request,
    /// [`AllocError::OutOfMemory`] when no free block fits.
    pub fn allocate(&mut self, size: usize) -> Result<u64, AllocError> {
        self.attempts += 1;

        if size == 0 {
            self.failures += 1;
            return Err(AllocError::ZeroSize);
        }

        let Some(index) = self.find_block(size) else {
            self.failures += 1;
            return Err(AllocError::OutOfMemory(size));
        };

        if self.blocks[index].size > size {
            let tail = Block {
                start: self.blocks[index].start + size,
                size: self.blocks[index].size - size,
                allocated: false,
                id: 0,
            };
            self.blocks[index].size = size;
            self.blocks.insert(index + 1, tail);
        }

        let id = self.next_block_id;
        self.next_block_id += 1;
        self.blocks[index].allocated = true;
        self.blocks[index].id = id;
        self.successes += 1;

        Ok(id)
    }

    /// Frees the allocation identified by `id`, then coalesces.
    ///
    /// Coalescing is a single left-to-right pass that repeatedly fuses any
    /// free block with its free successor, so no two adjacent free blocks
    /// survive the call.
    ///
    /// # Errors
    ///
    /// [`AllocError::UnknownBlock`] when no allocated block carries `id`;
    /// the list is left untouched.
    pub fn deallocate(&mut self, id: u64) -> Result<(), AllocError> {
        let Some(index) = self
            .blocks
            .iter()
            .position(|b| b.allocated && b.id == id)
        else {
            return Err(AllocError::UnknownBlock(id));
        };

        self.blocks[index].allocated = false;
        self.blocks[index].id = 0;
        self.coalesce();
        Ok(())
    }

    /// Fuses adjacent free blocks, left to right.
    fn coalesce(&mut self) {
        let mut i = 0;
        while i + 1 < self.blocks.len() {
            if !self.blocks[i].allocated && !self.blocks[i + 1].allocated {
                self.blocks[i].size += self.blocks[i + 1].size;
                self.blocks.remove(i + 1);
            } else {
                i += 1;
            }
        }
    }

    /// Total bytes currently allocated.
    pub fn used_memory(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| b.allocated)
            .map(|b| b.size)
            .sum()
    }

    /// Total bytes currently free.
    pub fn free_memory(&self) -> usize {
        self.total_memory - self.used_memory()
    }

    /// Number of free blocks in the list.
    pub fn free_block_count(&self) -> usize {
        self.blocks.iter().filter(|b| !b.allocated).count()
    }

    /// External fragmentation as a percentage of free memory.
    ///
    /// Defined as the share of free memory that lies outside the largest
    /// free block; zero when nothing is free.
    pub fn external_fragmentation(&self) -> f64 {
        let mut total_free = 0usize;
        let mut largest_free = 0usize;
        for b in self.blocks.iter().filter(|b| !b.allocated) {
            total_free += b.size;
            largest_free = largest_free.max(b.size);
        }
        if total_free == 0 {
            return 0.0;
        }
        (total_free - largest_free) as f64 / total_free as f64 * 100.0
    }

    /// Share of allocation attempts that succeeded, as a percentage.
    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        self.successes as f64 / self.attempts as f64 * 100.0
    }
}
