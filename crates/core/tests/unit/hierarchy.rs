//! Cache Hierarchy Unit Tests.
//!
//! Verifies the multi-level composition: probe order, inclusive refill, the
//! fixed penalty accounting (1/10/50/100), and the write paths under
//! write-through and write-back L1 policies. Includes the three-level refill
//! seed scenario.

use memsim_core::cache::{CacheHierarchy, ServicedBy};
use memsim_core::config::{
    Associativity, CacheConfig, CacheLevelConfig, ReplacementPolicy, WritePolicy,
};

// ──────────────────────────────────────────────────────────
// Helpers: hierarchy builders
// ──────────────────────────────────────────────────────────

fn level(lines: usize, write: WritePolicy) -> CacheLevelConfig {
    CacheLevelConfig {
        lines,
        block_size: 64,
        associativity: Associativity::Fully,
        replacement: ReplacementPolicy::Lru,
        write,
    }
}

/// L1-only hierarchy.
fn one_level(write: WritePolicy) -> CacheHierarchy {
    CacheHierarchy::new(&CacheConfig {
        l1: level(4, write),
        l2: CacheLevelConfig::disabled(),
        l3: CacheLevelConfig::disabled(),
    })
}

/// L1=1, L2=2, L3=4 lines, all the same write policy.
fn three_levels(write: WritePolicy) -> CacheHierarchy {
    CacheHierarchy::new(&CacheConfig {
        l1: level(1, write),
        l2: level(2, write),
        l3: level(4, write),
    })
}

// ══════════════════════════════════════════════════════════
// 1. Construction
// ══════════════════════════════════════════════════════════

/// L3 requires L2: a config with L2 disabled yields an L1-only hierarchy.
#[test]
fn l3_requires_l2() {
    let cache = CacheHierarchy::new(&CacheConfig {
        l1: level(4, WritePolicy::WriteBack),
        l2: CacheLevelConfig::disabled(),
        l3: level(8, WritePolicy::WriteBack),
    });
    assert!(!cache.has_l2());
    assert!(!cache.has_l3());
}

// ══════════════════════════════════════════════════════════
// 2. Read path and penalties
// ══════════════════════════════════════════════════════════

/// An L1-only read misses to memory (1 + 100 cycles), then hits (1 cycle).
#[test]
fn single_level_read_penalties() {
    let mut cache = one_level(WritePolicy::WriteBack);

    let miss = cache.read(0);
    assert_eq!(miss.serviced_by, ServicedBy::Memory);
    assert!(miss.memory_fetch);
    assert_eq!(miss.penalty, 101);

    let hit = cache.read(0);
    assert_eq!(hit.serviced_by, ServicedBy::L1);
    assert!(!hit.memory_fetch);
    assert_eq!(hit.penalty, 1);

    assert_eq!(cache.l1_hits, 1);
    assert_eq!(cache.memory_accesses, 1);
    assert_eq!(cache.total_penalty_cycles, 102);
}

/// Three-level refill (seed scenario): two cold misses through every level
/// cost 1+10+50+100 each; the third read misses the one-line L1 but hits L2
/// and refills L1.
#[test]
fn three_level_refill() {
    let mut cache = three_levels(WritePolicy::WriteBack);

    assert_eq!(cache.read(0).penalty, 161);
    assert_eq!(cache.read(64).penalty, 161); // evicts block 0 from the 1-line L1

    let back = cache.read(0);
    assert_eq!(back.serviced_by, ServicedBy::L2);
    assert_eq!(back.penalty, 11);

    assert_eq!(cache.l1_hits, 0);
    assert_eq!(cache.l2_hits, 1);
    assert_eq!(cache.l3_hits, 0);
    assert_eq!(cache.memory_accesses, 2);
    assert_eq!(cache.total_penalty_cycles, 161 + 161 + 11);

    // L1 was refilled from L2; the next read hits at the top.
    assert_eq!(cache.read(0).serviced_by, ServicedBy::L1);
}

/// An L3 hit refills both L2 and L1.
#[test]
fn l3_hit_refills_upper_levels() {
    let mut cache = three_levels(WritePolicy::WriteBack);

    cache.read(0);
    cache.read(64);
    cache.read(128); // L2 (2 lines) now holds 64,128; L3 holds all three

    let outcome = cache.read(0);
    assert_eq!(outcome.serviced_by, ServicedBy::L3);
    assert_eq!(outcome.penalty, 1 + 10 + 50);

    // Both upper levels now hold block 0.
    assert_eq!(cache.read(0).serviced_by, ServicedBy::L1);
}

// ══════════════════════════════════════════════════════════
// 3. Write path, L1 write-through
// ══════════════════════════════════════════════════════════

/// With L1 write-through, every serviced write stores to memory; a total
/// miss additionally fetches the block (write-allocate), two separate
/// memory events.
#[test]
fn write_through_memory_visibility() {
    let mut cache = one_level(WritePolicy::WriteThrough);

    let miss = cache.write(0);
    assert_eq!(miss.serviced_by, ServicedBy::Memory);
    assert!(miss.memory_fetch);
    assert!(miss.memory_write);
    assert_eq!(cache.memory_accesses, 1);
    assert_eq!(cache.memory_writes, 1);

    let hit = cache.write(0);
    assert_eq!(hit.serviced_by, ServicedBy::L1);
    assert!(!hit.memory_fetch);
    assert!(hit.memory_write);
    assert_eq!(cache.memory_accesses, 1);
    assert_eq!(cache.memory_writes, 2);

    assert_eq!(cache.total_writebacks(), 0);
}

/// A write serviced by a lower level still stores through when L1 is
/// write-through, and the L1 refill stays clean.
#[test]
fn write_through_partial_hit() {
    let mut cache = three_levels(WritePolicy::WriteThrough);

    cache.read(0);
    cache.read(64); // L1 now holds 64; L2 holds 0 and 64

    let outcome = cache.write(0); // L1 miss, L2 write hit
    assert_eq!(outcome.serviced_by, ServicedBy::L2);
    assert!(outcome.memory_write);
    assert_eq!(cache.memory_writes, 1);

    // The refilled L1 line is clean under write-through.
    assert!(!cache.l1().sets()[0][0].dirty);
}

// ══════════════════════════════════════════════════════════
// 4. Write path, L1 write-back
// ══════════════════════════════════════════════════════════

/// With L1 write-back, writes are absorbed as dirty lines and nothing
/// reaches memory until an eviction.
#[test]
fn write_back_absorbs_writes() {
    let mut cache = one_level(WritePolicy::WriteBack);

    let miss = cache.write(0);
    assert!(miss.memory_fetch); // write-allocate fetch
    assert!(!miss.memory_write);

    let hit = cache.write(0);
    assert!(!hit.memory_write);

    assert_eq!(cache.memory_writes, 0);
    assert!(cache.l1().sets()[0][0].dirty);
}

/// A write hit in L2 under write-back refills L1 dirty, so evicting that
/// line later writes back.
#[test]
fn write_back_partial_hit_refills_dirty() {
    let mut cache = three_levels(WritePolicy::WriteBack);

    cache.read(0);
    cache.read(64); // L1 (1 line) holds 64; L2 holds 0 and 64

    let outcome = cache.write(0); // L1 miss, L2 write hit; L1 refilled dirty
    assert_eq!(outcome.serviced_by, ServicedBy::L2);
    assert!(!outcome.memory_write);
    assert!(cache.l1().sets()[0][0].dirty);

    cache.read(128); // evicts the dirty L1 line
    assert_eq!(cache.l1().writebacks, 1);
    assert_eq!(cache.total_writebacks(), 1);
}

/// A write-allocate total miss under write-back refills every level dirty
/// at the write-back levels only.
#[test]
fn write_back_total_miss_refills_dirty() {
    let mut cache = three_levels(WritePolicy::WriteBack);

    let outcome = cache.write(0);
    assert_eq!(outcome.serviced_by, ServicedBy::Memory);
    assert!(outcome.memory_fetch);
    assert!(!outcome.memory_write);

    assert!(cache.l1().sets()[0][0].dirty);
    assert!(cache.l2().unwrap().sets()[0][0].dirty);
    assert!(cache.l3().unwrap().sets()[0][0].dirty);
}

// ══════════════════════════════════════════════════════════
// 5. Aggregate counters
// ══════════════════════════════════════════════════════════

/// Reads and writes are tallied separately; every access is one of them.
#[test]
fn access_tallies() {
    let mut cache = one_level(WritePolicy::WriteBack);

    cache.read(0);
    cache.write(64);
    cache.read(64);
    cache.write(0);

    assert_eq!(cache.total_accesses, 4);
    assert_eq!(cache.total_reads, 2);
    assert_eq!(cache.total_writes, 2);
}

/// `clear_all` resets the levels and the aggregate counters.
#[test]
fn clear_all_resets() {
    let mut cache = three_levels(WritePolicy::WriteBack);

    cache.write(0);
    cache.read(64);
    cache.clear_all();

    assert_eq!(cache.total_accesses, 0);
    assert_eq!(cache.total_penalty_cycles, 0);
    assert_eq!(cache.memory_accesses, 0);
    assert_eq!(cache.l1().total_accesses(), 0);
    assert_eq!(cache.total_writebacks(), 0);

    // Everything misses again after the wipe.
    assert_eq!(cache.read(0).serviced_by, ServicedBy::Memory);
}
