//! Single set-associative cache level.
//!
//! Models one cache as a 2-D table of lines indexed by `[set][way]`. It
//! implements:
//! 1. **Lookup:** Read and write probes with per-level hit/miss/write counters.
//! 2. **Write-allocate:** A write miss installs the block, writing back a dirty
//!    victim first under write-back.
//! 3. **Refill:** An `insert` hook for the hierarchy to fill or upgrade lines.
//! 4. **Victim selection:** Invalid ways first, then FIFO by fill order or LRU by
//!    access time, lowest way index on ties.
//!
//! Two per-level monotone counters order fills and accesses; they are strictly
//! increasing across the level's lifetime (until `clear`), so a full set always
//! has a unique victim.

use crate::config::{defaults, Associativity, ReplacementPolicy, WritePolicy};

/// One cache line's metadata.
///
/// A valid line identifies the memory block `tag · num_sets + set_index` of
/// `block_size` bytes; byte offsets within a block are not tracked.
#[derive(Clone, Copy, Debug, Default)]
pub struct CacheLine {
    /// Whether the line holds a block.
    pub valid: bool,
    /// Block tag (block number divided by the set count).
    pub tag: usize,
    /// Whether the line holds data newer than memory (write-back only).
    pub dirty: bool,
    /// Value of the fill counter when the line was last installed.
    pub insertion_order: u64,
    /// Value of the access counter when the line was last hit or installed.
    pub last_access_time: u64,
}

/// One set-associative cache level.
pub struct CacheLevel {
    name: String,
    capacity: usize,
    block_size: usize,
    associativity: Associativity,
    replacement: ReplacementPolicy,
    write_policy: WritePolicy,
    num_sets: usize,
    ways: usize,
    sets: Vec<Vec<CacheLine>>,
    next_insertion_order: u64,
    access_counter: u64,

    /// Probe hits (read and write).
    pub hits: u64,
    /// Probe misses (read and write).
    pub misses: u64,
    /// Write probes, hit or miss.
    pub writes: u64,
    /// Write probes that hit.
    pub write_hits: u64,
    /// Write probes that missed.
    pub write_misses: u64,
    /// Dirty victims replaced or evicted under write-back.
    pub writebacks: u64,
}

impl CacheLevel {
    /// Creates a cache level of `capacity` lines.
    ///
    /// The number of sets and ways follows from the associativity class
    /// (`num_sets · ways = capacity`). A zero block size is substituted with
    /// [`defaults::BLOCK_SIZE`]; ways are clamped to the capacity so a
    /// degenerate configuration still yields at least one set of at least
    /// one way.
    pub fn new(
        name: &str,
        capacity: usize,
        block_size: usize,
        associativity: Associativity,
        replacement: ReplacementPolicy,
        write_policy: WritePolicy,
    ) -> Self {
        let capacity = if capacity == 0 { 1 } else { capacity };
        let block_size = if block_size == 0 {
            defaults::BLOCK_SIZE
        } else {
            block_size
        };

        let ways = associativity.ways(capacity).clamp(1, capacity);
        let num_sets = (capacity / ways).max(1);

        Self {
            name: name.to_string(),
            capacity,
            block_size,
            associativity,
            replacement,
            write_policy,
            num_sets,
            ways,
            sets: vec![vec![CacheLine::default(); ways]; num_sets],
            next_insertion_order: 0,
            access_counter: 0,
            hits: 0,
            misses: 0,
            writes: 0,
            write_hits: 0,
            write_misses: 0,
            writebacks: 0,
        }
    }

    /// Returns the level name (`"L1"`, `"L2"`, `"L3"`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the capacity in lines.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the block size in bytes.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Returns the associativity class.
    pub fn associativity(&self) -> Associativity {
        self.associativity
    }

    /// Returns the replacement policy.
    pub fn replacement(&self) -> ReplacementPolicy {
        self.replacement
    }

    /// Returns the write policy.
    pub fn write_policy(&self) -> WritePolicy {
        self.write_policy
    }

    /// Returns the number of sets.
    pub fn num_sets(&self) -> usize {
        self.num_sets
    }

    /// Returns the number of ways per set.
    pub fn ways(&self) -> usize {
        self.ways
    }

    /// Returns the line table, indexed by `[set][way]`.
    pub fn sets(&self) -> &[Vec<CacheLine>] {
        &self.sets
    }

    /// Total probes served (`hits + misses`).
    pub fn total_accesses(&self) -> u64 {
        self.hits + self.misses
    }

    /// Hit share of all probes, as a percentage.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64 * 100.0
    }

    fn set_index(&self, address: usize) -> usize {
        (address / self.block_size) % self.num_sets
    }

    fn tag(&self, address: usize) -> usize {
        (address / self.block_size) / self.num_sets
    }

    /// Way holding `tag` in `set`, if any.
    fn lookup(&self, set: usize, tag: usize) -> Option<usize> {
        self.sets[set]
            .iter()
            .position(|line| line.valid && line.tag == tag)
    }

    /// Way to replace in `set`.
    ///
    /// Prefers the lowest-index invalid way; with the set full, FIFO takes
    /// the smallest fill order and LRU the smallest access time. Strict
    /// comparison keeps ties at the lowest way index.
    fn find_victim_in_set(&self, set: usize) -> usize {
        if let Some(way) = self.sets[set].iter().position(|line| !line.valid) {
            return way;
        }

        let mut victim = 0;
        for way in 1..self.ways {
            let better = match self.replacement {
                ReplacementPolicy::Fifo => {
                    self.sets[set][way].insertion_order < self.sets[set][victim].insertion_order
                }
                ReplacementPolicy::Lru => {
                    self.sets[set][way].last_access_time < self.sets[set][victim].last_access_time
                }
            };
            if better {
                victim = way;
            }
        }
        victim
    }

    /// Counts the writeback for a dirty write-back victim, then overwrites
    /// the way with a freshly installed line.
    fn replace(&mut self, set: usize, way: usize, tag: usize, dirty: bool) {
        let victim = self.sets[set][way];
        if victim.valid && victim.dirty && self.write_policy == WritePolicy::WriteBack {
            self.writebacks += 1;
        }

        self.sets[set][way] = CacheLine {
            valid: true,
            tag,
            dirty,
            insertion_order: self.next_insertion_order,
            last_access_time: self.access_counter,
        };
        self.next_insertion_order += 1;
    }

    /// Probes the level for a read.
    ///
    /// Returns `true` on a hit. A miss only counts; the hierarchy decides
    /// where the refill comes from and calls [`insert`](Self::insert).
    pub fn read(&mut self, address: usize) -> bool {
        self.access_counter += 1;

        let set = self.set_index(address);
        let tag = self.tag(address);

        if let Some(way) = self.lookup(set, tag) {
            self.hits += 1;
            if self.replacement == ReplacementPolicy::Lru {
                self.sets[set][way].last_access_time = self.access_counter;
            }
            return true;
        }

        self.misses += 1;
        false
    }

    /// Probes the level for a write.
    ///
    /// On a hit the line is touched and, under write-back, marked dirty. On
    /// a miss the block is write-allocated: a victim is selected (counting a
    /// writeback for a dirty write-back victim) and the line installed,
    /// dirty exactly when the policy is write-back.
    ///
    /// Returns `true` on a hit.
    pub fn write(&mut self, address: usize) -> bool {
        self.access_counter += 1;
        self.writes += 1;

        let set = self.set_index(address);
        let tag = self.tag(address);

        if let Some(way) = self.lookup(set, tag) {
            self.write_hits += 1;
            self.hits += 1;
            if self.replacement == ReplacementPolicy::Lru {
                self.sets[set][way].last_access_time = self.access_counter;
            }
            if self.write_policy == WritePolicy::WriteBack {
                self.sets[set][way].dirty = true;
            }
            return true;
        }

        self.write_misses += 1;
        self.misses += 1;

        let way = self.find_victim_in_set(set);
        let dirty = self.write_policy == WritePolicy::WriteBack;
        self.replace(set, way, tag, dirty);
        false
    }

    /// Fills or upgrades a line on behalf of the hierarchy.
    ///
    /// A present line is touched; `is_dirty` upgrades it under write-back.
    /// An absent line is installed over the set's victim. Write-through
    /// levels ignore `is_dirty` entirely, so their lines are never dirty.
    pub fn insert(&mut self, address: usize, is_dirty: bool) {
        let set = self.set_index(address);
        let tag = self.tag(address);
        let dirty = is_dirty && self.write_policy == WritePolicy::WriteBack;

        if let Some(way) = self.lookup(set, tag) {
            if self.replacement == ReplacementPolicy::Lru {
                self.access_counter += 1;
                self.sets[set][way].last_access_time = self.access_counter;
            }
            if dirty {
                self.sets[set][way].dirty = true;
            }
            return;
        }

        let way = self.find_victim_in_set(set);
        self.access_counter += 1;
        self.replace(set, way, tag, dirty);
    }

    /// Invalidates the line holding `address`, if present.
    ///
    /// Returns `Some(was_dirty)` when a line was evicted; a dirty
    /// write-back line counts one writeback.
    pub fn evict(&mut self, address: usize) -> Option<bool> {
        let set = self.set_index(address);
        let tag = self.tag(address);

        let way = self.lookup(set, tag)?;
        let was_dirty = self.sets[set][way].dirty;
        self.sets[set][way].valid = false;
        self.sets[set][way].dirty = false;

        if was_dirty && self.write_policy == WritePolicy::WriteBack {
            self.writebacks += 1;
        }
        Some(was_dirty)
    }

    /// Invalidates every line and zeroes all counters.
    pub fn clear(&mut self) {
        for set in &mut self.sets {
            for line in set.iter_mut() {
                line.valid = false;
                line.dirty = false;
            }
        }
        self.hits = 0;
        self.misses = 0;
        self.writes = 0;
        self.write_hits = 0;
        self.write_misses = 0;
        self.writebacks = 0;
        self.next_insertion_order = 0;
        self.access_counter = 0;
    }
}
