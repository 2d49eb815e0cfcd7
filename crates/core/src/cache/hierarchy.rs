//! Multi-level cache hierarchy.
//!
//! Composes one to three [`CacheLevel`]s into a single lookup path. It
//! implements:
//! 1. **Probe order:** L1 → L2 → L3 → memory, stopping at the first hit.
//! 2. **Inclusive refill:** A hit below L1 (or a memory fetch) refills every
//!    level above the point of discovery.
//! 3. **Write policy propagation:** L1's write policy decides whether a write
//!    becomes visible to memory immediately (write-through) or is absorbed as
//!    a dirty line (write-back); each level's own policy decides refill
//!    dirtiness at that level.
//! 4. **Penalty accounting:** Fixed costs per level probe and memory access
//!    (1/10/50/100 cycles), accumulated per access and in total.
//!
//! Every access returns an [`AccessOutcome`] describing where it was serviced
//! and what it cost, so callers can narrate the walk without touching any
//! counter.

use crate::config::{defaults, CacheConfig, WritePolicy};

use super::level::CacheLevel;

/// Where an access was ultimately serviced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServicedBy {
    /// Hit in L1.
    L1,
    /// Hit in L2.
    L2,
    /// Hit in L3.
    L3,
    /// Missed every level; main memory serviced the access.
    Memory,
}

impl ServicedBy {
    /// Returns the display name of the servicing tier.
    pub fn name(self) -> &'static str {
        match self {
            ServicedBy::L1 => "L1",
            ServicedBy::L2 => "L2",
            ServicedBy::L3 => "L3",
            ServicedBy::Memory => "MEMORY",
        }
    }
}

/// Result of one hierarchy access.
#[derive(Clone, Copy, Debug)]
pub struct AccessOutcome {
    /// Tier that serviced the access.
    pub serviced_by: ServicedBy,
    /// Penalty cycles charged for this access.
    pub penalty: u64,
    /// Whether a block was fetched from main memory.
    pub memory_fetch: bool,
    /// Whether the access wrote main memory (write-through visibility).
    pub memory_write: bool,
}

/// The composed cache hierarchy.
///
/// L1 is always present; L2 is optional; L3 requires L2.
pub struct CacheHierarchy {
    l1: CacheLevel,
    l2: Option<CacheLevel>,
    l3: Option<CacheLevel>,

    /// Accesses routed through the hierarchy.
    pub total_accesses: u64,
    /// Read accesses.
    pub total_reads: u64,
    /// Write accesses.
    pub total_writes: u64,
    /// Accesses serviced by L1.
    pub l1_hits: u64,
    /// Accesses serviced by L2.
    pub l2_hits: u64,
    /// Accesses serviced by L3.
    pub l3_hits: u64,
    /// Block fetches from main memory.
    pub memory_accesses: u64,
    /// Stores that reached main memory.
    pub memory_writes: u64,
    /// Penalty cycles accumulated over all accesses.
    pub total_penalty_cycles: u64,
}

impl CacheHierarchy {
    /// Builds the hierarchy described by `config`.
    ///
    /// Levels with zero lines are left out; L3 is only built when L2 is.
    pub fn new(config: &CacheConfig) -> Self {
        let l1 = CacheLevel::new(
            "L1",
            config.l1.lines,
            config.l1.block_size,
            config.l1.associativity,
            config.l1.replacement,
            config.l1.write,
        );

        let l2 = config.l2.enabled().then(|| {
            CacheLevel::new(
                "L2",
                config.l2.lines,
                config.l2.block_size,
                config.l2.associativity,
                config.l2.replacement,
                config.l2.write,
            )
        });

        let l3 = (l2.is_some() && config.l3.enabled()).then(|| {
            CacheLevel::new(
                "L3",
                config.l3.lines,
                config.l3.block_size,
                config.l3.associativity,
                config.l3.replacement,
                config.l3.write,
            )
        });

        Self {
            l1,
            l2,
            l3,
            total_accesses: 0,
            total_reads: 0,
            total_writes: 0,
            l1_hits: 0,
            l2_hits: 0,
            l3_hits: 0,
            memory_accesses: 0,
            memory_writes: 0,
            total_penalty_cycles: 0,
        }
    }

    /// Returns the L1 level.
    pub fn l1(&self) -> &CacheLevel {
        &self.l1
    }

    /// Returns the L2 level, if configured.
    pub fn l2(&self) -> Option<&CacheLevel> {
        self.l2.as_ref()
    }

    /// Returns the L3 level, if configured.
    pub fn l3(&self) -> Option<&CacheLevel> {
        self.l3.as_ref()
    }

    /// Whether an L2 level is configured.
    pub fn has_l2(&self) -> bool {
        self.l2.is_some()
    }

    /// Whether an L3 level is configured.
    pub fn has_l3(&self) -> bool {
        self.l3.is_some()
    }

    /// Reads `address` through the hierarchy.
    ///
    /// Probes levels in order; the first hit refills every level above it
    /// with a clean line and ends the walk. A total miss fetches the block
    /// from memory and refills all levels top-down.
    pub fn read(&mut self, address: usize) -> AccessOutcome {
        self.total_accesses += 1;
        self.total_reads += 1;
        let mut penalty = 0;

        if self.l1.read(address) {
            self.l1_hits += 1;
            penalty += defaults::L1_PENALTY;
            self.total_penalty_cycles += penalty;
            return AccessOutcome {
                serviced_by: ServicedBy::L1,
                penalty,
                memory_fetch: false,
                memory_write: false,
            };
        }
        penalty += defaults::L1_PENALTY;

        if let Some(l2) = self.l2.as_mut() {
            if l2.read(address) {
                self.l2_hits += 1;
                penalty += defaults::L2_PENALTY;
                self.l1.insert(address, false);
                self.total_penalty_cycles += penalty;
                return AccessOutcome {
                    serviced_by: ServicedBy::L2,
                    penalty,
                    memory_fetch: false,
                    memory_write: false,
                };
            }
            penalty += defaults::L2_PENALTY;
        }

        if let Some(l3) = self.l3.as_mut() {
            if l3.read(address) {
                self.l3_hits += 1;
                penalty += defaults::L3_PENALTY;
                if let Some(l2) = self.l2.as_mut() {
                    l2.insert(address, false);
                }
                self.l1.insert(address, false);
                self.total_penalty_cycles += penalty;
                return AccessOutcome {
                    serviced_by: ServicedBy::L3,
                    penalty,
                    memory_fetch: false,
                    memory_write: false,
                };
            }
            penalty += defaults::L3_PENALTY;
        }

        self.memory_accesses += 1;
        penalty += defaults::MEMORY_PENALTY;

        if let Some(l3) = self.l3.as_mut() {
            l3.insert(address, false);
        }
        if let Some(l2) = self.l2.as_mut() {
            l2.insert(address, false);
        }
        self.l1.insert(address, false);

        self.total_penalty_cycles += penalty;
        AccessOutcome {
            serviced_by: ServicedBy::Memory,
            penalty,
            memory_fetch: true,
            memory_write: false,
        }
    }

    /// Writes `address` through the hierarchy.
    ///
    /// The probe walk mirrors [`read`](Self::read). Memory visibility is
    /// driven by L1's write policy: under write-through every serviced write
    /// also stores to memory; under write-back the write is absorbed as a
    /// dirty line at the topmost level. A total miss write-allocates: one
    /// memory fetch brings the block in, plus one memory store when L1 is
    /// write-through.
    pub fn write(&mut self, address: usize) -> AccessOutcome {
        self.total_accesses += 1;
        self.total_writes += 1;
        let through = self.l1.write_policy() == WritePolicy::WriteThrough;
        let mut penalty = 0;

        if self.l1.write(address) {
            self.l1_hits += 1;
            penalty += defaults::L1_PENALTY;
            if through {
                self.memory_writes += 1;
            }
            self.total_penalty_cycles += penalty;
            return AccessOutcome {
                serviced_by: ServicedBy::L1,
                penalty,
                memory_fetch: false,
                memory_write: through,
            };
        }
        penalty += defaults::L1_PENALTY;

        if let Some(l2) = self.l2.as_mut() {
            if l2.write(address) {
                self.l2_hits += 1;
                penalty += defaults::L2_PENALTY;
                if through {
                    self.memory_writes += 1;
                }
                self.l1.insert(address, !through);
                self.total_penalty_cycles += penalty;
                return AccessOutcome {
                    serviced_by: ServicedBy::L2,
                    penalty,
                    memory_fetch: false,
                    memory_write: through,
                };
            }
            penalty += defaults::L2_PENALTY;
        }

        if let Some(l3) = self.l3.as_mut() {
            if l3.write(address) {
                self.l3_hits += 1;
                penalty += defaults::L3_PENALTY;
                if through {
                    self.memory_writes += 1;
                }
                if let Some(l2) = self.l2.as_mut() {
                    l2.insert(address, !through);
                }
                self.l1.insert(address, !through);
                self.total_penalty_cycles += penalty;
                return AccessOutcome {
                    serviced_by: ServicedBy::L3,
                    penalty,
                    memory_fetch: false,
                    memory_write: through,
                };
            }
            penalty += defaults::L3_PENALTY;
        }

        // Write-allocate: fetch the block, then store through if L1 is WT.
        self.memory_accesses += 1;
        penalty += defaults::MEMORY_PENALTY;
        if through {
            self.memory_writes += 1;
        }

        if let Some(l3) = self.l3.as_mut() {
            l3.insert(address, !through);
        }
        if let Some(l2) = self.l2.as_mut() {
            l2.insert(address, !through);
        }
        self.l1.insert(address, !through);

        self.total_penalty_cycles += penalty;
        AccessOutcome {
            serviced_by: ServicedBy::Memory,
            penalty,
            memory_fetch: true,
            memory_write: through,
        }
    }

    /// Sum of writebacks across all levels.
    pub fn total_writebacks(&self) -> u64 {
        self.l1.writebacks
            + self.l2.as_ref().map_or(0, |l| l.writebacks)
            + self.l3.as_ref().map_or(0, |l| l.writebacks)
    }

    /// Share of accesses serviced by any cache level, as a percentage.
    pub fn overall_hit_ratio(&self) -> f64 {
        if self.total_accesses == 0 {
            return 0.0;
        }
        let hits = self.l1_hits + self.l2_hits + self.l3_hits;
        hits as f64 / self.total_accesses as f64 * 100.0
    }

    /// Mean penalty cycles per access.
    pub fn average_penalty(&self) -> f64 {
        if self.total_accesses == 0 {
            return 0.0;
        }
        self.total_penalty_cycles as f64 / self.total_accesses as f64
    }

    /// Clears every level and zeroes all hierarchy counters.
    pub fn clear_all(&mut self) {
        self.l1.clear();
        if let Some(l2) = self.l2.as_mut() {
            l2.clear();
        }
        if let Some(l3) = self.l3.as_mut() {
            l3.clear();
        }
        self.total_accesses = 0;
        self.total_reads = 0;
        self.total_writes = 0;
        self.l1_hits = 0;
        self.l2_hits = 0;
        self.l3_hits = 0;
        self.memory_accesses = 0;
        self.memory_writes = 0;
        self.total_penalty_cycles = 0;
    }
}
