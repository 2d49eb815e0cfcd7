//! Buddy system allocator.
//!
//! Models a binary buddy allocator over a power-of-two arena. It implements:
//! 1. **Order-indexed free lists:** One LIFO stack of block addresses per order,
//!    where order `k` blocks are `min_block_size · 2^k` bytes.
//! 2. **Recursive splitting:** An allocation with no block at its order splits the
//!    smallest larger block down, one order at a time.
//! 3. **Recursive merging:** A freed block fuses with its buddy (`address XOR size`)
//!    as long as the buddy is free, climbing one order per merge.
//! 4. **Accounting:** Split/merge counts and internal fragmentation totals.
//!
//! Every block address is a multiple of its size, so the buddy of a block is
//! always `address ^ size` at equal size. Splitting pushes the high buddy first
//! and the low buddy last, so allocation pops the low half and a fresh arena
//! serves its first request at address 0.

use std::collections::BTreeMap;

use crate::config::defaults;
use crate::error::AllocError;

/// Bookkeeping for one live allocation.
#[derive(Clone, Copy, Debug)]
pub struct AllocationRecord {
    /// Block start address.
    pub address: usize,
    /// Size the caller asked for.
    pub requested_size: usize,
    /// Power-of-two size actually reserved.
    pub actual_size: usize,
    /// Order of the reserved block.
    pub order: usize,
}

/// Buddy allocator state.
pub struct BuddyAllocator {
    total_memory: usize,
    min_block_size: usize,
    max_order: usize,
    /// `free_lists[k]` holds the free block addresses of order `k`, LIFO.
    free_lists: Vec<Vec<usize>>,
    records: BTreeMap<u64, AllocationRecord>,
    next_block_id: u64,

    /// Allocation attempts, successful or not.
    pub attempts: u64,
    /// Allocations that returned a block id.
    pub successes: u64,
    /// Allocations that failed (zero size, oversize, or out of memory).
    pub failures: u64,
    /// Completed deallocations.
    pub deallocations: u64,
    /// Block splits performed while serving allocations.
    pub splits: u64,
    /// Buddy merges performed while serving deallocations.
    pub merges: u64,
    /// Sum of `actual - requested` over live allocations.
    pub internal_fragmentation: usize,
}

impl BuddyAllocator {
    /// Creates a buddy allocator over `total_memory` bytes with the given
    /// minimum block size.
    ///
    /// Both values must be powers of two; a non-power-of-two arena is
    /// replaced by [`defaults::BUDDY_ARENA`] and a non-power-of-two minimum
    /// block by [`defaults::MIN_BLOCK_SIZE`]. The whole arena starts as a
    /// single free block of the maximum order at address 0.
    pub fn new(total_memory: usize, min_block_size: usize) -> Self {
        let total_memory = if total_memory.is_power_of_two() {
            total_memory
        } else {
            defaults::BUDDY_ARENA
        };
        let min_block_size = if min_block_size.is_power_of_two() {
            min_block_size
        } else {
            defaults::MIN_BLOCK_SIZE
        };

        let max_order = (total_memory / min_block_size).trailing_zeros() as usize;
        let mut free_lists = vec![Vec::new(); max_order + 1];
        free_lists[max_order].push(0);

        Self {
            total_memory,
            min_block_size,
            max_order,
            free_lists,
            records: BTreeMap::new(),
            next_block_id: 1,
            attempts: 0,
            successes: 0,
            failures: 0,
            deallocations: 0,
            splits: 0,
            merges: 0,
            internal_fragmentation: 0,
        }
    }

    /// Returns the arena size in bytes.
    pub fn total_memory(&self) -> usize {
        self.total_memory
    }

    /// Returns the minimum block size in bytes.
    pub fn min_block_size(&self) -> usize {
        self.min_block_size
    }

    /// Returns the maximum order (the whole arena as one block).
    pub fn max_order(&self) -> usize {
        self.max_order
    }

    /// Returns the free lists, indexed by order.
    pub fn free_lists(&self) -> &[Vec<usize>] {
        &self.free_lists
    }

    /// Returns the live allocation records, ordered by block id.
    pub fn records(&self) -> &BTreeMap<u64, AllocationRecord> {
        &self.records
    }

    /// Block size in bytes for a given order.
    pub fn block_size(&self, order: usize) -> usize {
        self.min_block_size << order
    }

    /// Rounds a request up to the next power-of-two block size, at least
    /// the minimum block size.
    fn round_up(&self, requested: usize) -> usize {
        if requested <= self.min_block_size {
            self.min_block_size
        } else {
            requested.next_power_of_two()
        }
    }

    /// Order whose block size equals `actual` (an exact multiple of the
    /// minimum block size by construction).
    fn order_of(&self, actual: usize) -> usize {
        (actual / self.min_block_size).trailing_zeros() as usize
    }

    /// Splits blocks down until `order` has a free block.
    ///
    /// Finds the smallest order above `order` with a free block, then splits
    /// one block per step: the head block of order `k` becomes two buddies on
    /// order `k-1`, high half pushed first so the low half is the new head.
    ///
    /// Returns `false` when every order above is empty.
    fn split_to(&mut self, order: usize) -> bool {
        let Some(from) = (order + 1..=self.max_order).find(|&k| !self.free_lists[k].is_empty())
        else {
            return false;
        };

        for k in (order + 1..=from).rev() {
            let addr = self.free_lists[k].pop().expect("source order has a free block");
            let half = self.block_size(k - 1);
            self.free_lists[k - 1].push(addr + half);
            self.free_lists[k - 1].push(addr);
            self.splits += 1;
        }
        true
    }

    /// Allocates at least `requested_size` bytes and returns the block id.
    ///
    /// The request is rounded up to the next power-of-two block size; the
    /// difference is accounted as internal fragmentation for the lifetime of
    /// the allocation.
    ///
    /// # Errors
    ///
    /// [`AllocError::ZeroSize`] for a zero-byte request,
    /// [`AllocError::ExceedsArena`] when the request is larger than the
    /// arena, [`AllocError::OutOfMemory`] when no block can be split down
    /// to the required order.
    pub fn allocate(&mut self, requested_size: usize) -> Result<u64, AllocError> {
        self.attempts += 1;

        if requested_size == 0 {
            self.failures += 1;
            return Err(AllocError::ZeroSize);
        }
        if requested_size > self.total_memory {
            self.failures += 1;
            return Err(AllocError::ExceedsArena(requested_size, self.total_memory));
        }

        let actual_size = self.round_up(requested_size);
        let order = self.order_of(actual_size);

        if self.free_lists[order].is_empty() && !self.split_to(order) {
            self.failures += 1;
            return Err(AllocError::OutOfMemory(requested_size));
        }

        let address = self
            .free_lists[order]
            .pop()
            .expect("free list populated by split_to");

        let id = self.next_block_id;
        self.next_block_id += 1;
        self.internal_fragmentation += actual_size - requested_size;
        self.successes += 1;
        self.records.insert(
            id,
            AllocationRecord {
                address,
                requested_size,
                actual_size,
                order,
            },
        );

        Ok(id)
    }

    /// Frees the allocation identified by `id`, merging with free buddies.
    ///
    /// The freed block goes back on its order's free list, then merges with
    /// its buddy (`address ^ size`) while the buddy is free, climbing one
    /// order per merge until the top order or a busy buddy stops it.
    ///
    /// # Errors
    ///
    /// [`AllocError::UnknownBlock`] when `id` has no live record; nothing
    /// is mutated.
    pub fn deallocate(&mut self, id: u64) -> Result<(), AllocError> {
        let Some(record) = self.records.remove(&id) else {
            return Err(AllocError::UnknownBlock(id));
        };

        self.deallocations += 1;
        self.internal_fragmentation -= record.actual_size - record.requested_size;

        let mut address = record.address;
        let mut order = record.order;
        self.free_lists[order].push(address);

        while order < self.max_order {
            let size = self.block_size(order);
            let buddy = address ^ size;

            let Some(buddy_pos) = self.free_lists[order].iter().position(|&a| a == buddy)
            else {
                break;
            };
            self.free_lists[order].remove(buddy_pos);

            let own_pos = self.free_lists[order]
                .iter()
                .position(|&a| a == address)
                .expect("freed block is on its order's list");
            self.free_lists[order].remove(own_pos);

            address = address.min(buddy);
            order += 1;
            self.free_lists[order].push(address);
            self.merges += 1;
        }

        Ok(())
    }

    /// Total bytes on the free lists.
    pub fn free_memory(&self) -> usize {
        self.free_lists
            .iter()
            .enumerate()
            .map(|(order, list)| list.len() * self.block_size(order))
            .sum()
    }

    /// Total bytes reserved (including internal fragmentation).
    pub fn used_memory(&self) -> usize {
        self.total_memory - self.free_memory()
    }

    /// Used share of the arena, as a percentage.
    pub fn utilization(&self) -> f64 {
        self.used_memory() as f64 / self.total_memory as f64 * 100.0
    }

    /// Share of allocation attempts that succeeded, as a percentage.
    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        self.successes as f64 / self.attempts as f64 * 100.0
    }

    /// Number of free blocks below the maximum order.
    ///
    /// A non-zero count means the free memory is scattered across buddy
    /// fragments rather than one maximal block.
    pub fn fragmented_free_blocks(&self) -> usize {
        self.free_lists[..self.max_order]
            .iter()
            .map(Vec::len)
            .sum()
    }
}
