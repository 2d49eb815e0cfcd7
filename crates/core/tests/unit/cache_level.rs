//! Cache Level Unit Tests.
//!
//! Verifies one set-associative level: address decomposition, read/write
//! probes, write-allocate, the refill hook, victim selection, and the
//! writeback accounting. Tests pin the documented invariants (`hits + misses
//! = accesses`, write-through lines never dirty) and the write-back
//! eviction seed scenario.

use memsim_core::cache::CacheLevel;
use memsim_core::config::{Associativity, ReplacementPolicy, WritePolicy};

// ──────────────────────────────────────────────────────────
// Helper: build a small test level
// ──────────────────────────────────────────────────────────

/// 4 lines, 64-byte blocks, 2-way, LRU, write-back.
///
/// With these parameters:
///   - num_sets = 4 / 2 = 2
///   - set index = (addr / 64) % 2
///   - tag       = (addr / 64) / 2
fn test_level(replacement: ReplacementPolicy, write: WritePolicy) -> CacheLevel {
    CacheLevel::new("L1", 4, 64, Associativity::TwoWay, replacement, write)
}

/// True when some valid line in the level holds the block of `addr`.
fn contains(level: &CacheLevel, addr: usize) -> bool {
    let block = addr / level.block_size();
    let set = block % level.num_sets();
    let tag = block / level.num_sets();
    level.sets()[set].iter().any(|l| l.valid && l.tag == tag)
}

// ══════════════════════════════════════════════════════════
// 1. Geometry
// ══════════════════════════════════════════════════════════

/// Sets and ways follow from the associativity class.
#[test]
fn geometry_follows_associativity() {
    let direct = CacheLevel::new(
        "L1",
        8,
        64,
        Associativity::DirectMapped,
        ReplacementPolicy::Lru,
        WritePolicy::WriteThrough,
    );
    assert_eq!((direct.num_sets(), direct.ways()), (8, 1));

    let four = CacheLevel::new(
        "L1",
        8,
        64,
        Associativity::FourWay,
        ReplacementPolicy::Lru,
        WritePolicy::WriteThrough,
    );
    assert_eq!((four.num_sets(), four.ways()), (2, 4));

    let full = CacheLevel::new(
        "L1",
        8,
        64,
        Associativity::Fully,
        ReplacementPolicy::Lru,
        WritePolicy::WriteThrough,
    );
    assert_eq!((full.num_sets(), full.ways()), (1, 8));
}

/// A zero block size falls back to the 64-byte default.
#[test]
fn zero_block_size_uses_default() {
    let level = CacheLevel::new(
        "L1",
        4,
        0,
        Associativity::Fully,
        ReplacementPolicy::Lru,
        WritePolicy::WriteThrough,
    );
    assert_eq!(level.block_size(), 64);
}

// ══════════════════════════════════════════════════════════
// 2. Read probes never insert
// ══════════════════════════════════════════════════════════

/// A read miss only counts; repeating it still misses until the hierarchy
/// refills the line.
#[test]
fn read_miss_does_not_install() {
    let mut level = test_level(ReplacementPolicy::Lru, WritePolicy::WriteThrough);

    assert!(!level.read(0x100));
    assert!(!level.read(0x100));
    assert_eq!(level.misses, 2);
    assert_eq!(level.hits, 0);
    assert!(!contains(&level, 0x100));
}

/// Insert installs the line; the next read hits, at any offset in the block.
#[test]
fn insert_then_read_hits() {
    let mut level = test_level(ReplacementPolicy::Lru, WritePolicy::WriteThrough);

    level.insert(0x100, false);
    assert!(level.read(0x100));
    assert!(level.read(0x100 + 32));
    assert_eq!(level.hits, 2);
    assert_eq!(level.total_accesses(), 2);
}

// ══════════════════════════════════════════════════════════
// 3. Write-allocate
// ══════════════════════════════════════════════════════════

/// A write miss installs the block (write-allocate); the next read hits.
#[test]
fn write_miss_allocates() {
    let mut level = test_level(ReplacementPolicy::Lru, WritePolicy::WriteBack);

    assert!(!level.write(0x40));
    assert_eq!(level.writes, 1);
    assert_eq!(level.write_misses, 1);
    assert!(contains(&level, 0x40));
    assert!(level.read(0x40));
}

/// Write-back marks lines dirty on write hits and write-allocated misses.
#[test]
fn write_back_sets_dirty() {
    let mut level = test_level(ReplacementPolicy::Lru, WritePolicy::WriteBack);

    level.write(0); // miss, allocated dirty
    assert!(level.sets()[0][0].dirty);

    level.insert(64, false); // clean refill in set 1
    level.write(64); // hit, becomes dirty
    assert!(level.sets()[1][0].dirty);
    assert_eq!(level.write_hits, 1);
}

/// Write-through lines are never dirty, and the level never writes back.
#[test]
fn write_through_never_dirty() {
    let mut level = test_level(ReplacementPolicy::Lru, WritePolicy::WriteThrough);

    level.write(0);
    level.write(0);
    level.insert(64, true); // dirty hint ignored under write-through
    level.write(128);
    level.write(256);

    for set in level.sets() {
        for line in set {
            assert!(!line.dirty, "write-through lines must stay clean");
        }
    }
    assert_eq!(level.writebacks, 0);
    assert_eq!(level.hits + level.misses, level.total_accesses());
}

// ══════════════════════════════════════════════════════════
// 4. Dirty eviction (seed scenario)
// ══════════════════════════════════════════════════════════

/// Direct-mapped write-back cache, 4 lines, 64-byte blocks: writes to 0 and
/// 256 collide in set 0; replacing the dirty line counts one writeback.
#[test]
fn dirty_eviction_counts_writeback() {
    let mut level = CacheLevel::new(
        "L1",
        4,
        64,
        Associativity::DirectMapped,
        ReplacementPolicy::Lru,
        WritePolicy::WriteBack,
    );

    assert!(!level.write(0)); // set 0, tag 0, dirty
    assert!(!level.write(256)); // set 0, tag 1 — evicts the dirty line
    assert_eq!(level.writebacks, 1);
    assert!(contains(&level, 256));
    assert!(!contains(&level, 0));
}

/// Replacing a clean victim writes nothing back.
#[test]
fn clean_eviction_no_writeback() {
    let mut level = CacheLevel::new(
        "L1",
        4,
        64,
        Associativity::DirectMapped,
        ReplacementPolicy::Lru,
        WritePolicy::WriteBack,
    );

    level.insert(0, false);
    level.write(256); // evicts the clean line in set 0
    assert_eq!(level.writebacks, 0);
}

// ══════════════════════════════════════════════════════════
// 5. Victim selection
// ══════════════════════════════════════════════════════════

/// Invalid ways are filled first, lowest index first.
#[test]
fn invalid_ways_fill_first() {
    let mut level = test_level(ReplacementPolicy::Lru, WritePolicy::WriteThrough);

    level.insert(0, false); // set 0, way 0
    level.insert(128, false); // set 0, way 1
    assert!(level.sets()[0][0].valid);
    assert!(level.sets()[0][1].valid);
    assert_eq!(level.sets()[0][0].tag, 0);
    assert_eq!(level.sets()[0][1].tag, 1);
}

/// FIFO evicts by fill order even when the oldest line was just touched.
#[test]
fn fifo_evicts_oldest_fill() {
    let mut level = test_level(ReplacementPolicy::Fifo, WritePolicy::WriteThrough);

    level.insert(0, false); // set 0, filled first
    level.insert(128, false); // set 0, filled second
    assert!(level.read(0)); // touch the oldest; FIFO must ignore this

    level.insert(256, false); // set 0 full — evicts tag 0
    assert!(!contains(&level, 0));
    assert!(contains(&level, 128));
    assert!(contains(&level, 256));
}

/// LRU evicts the least recently touched line.
#[test]
fn lru_evicts_least_recently_used() {
    let mut level = test_level(ReplacementPolicy::Lru, WritePolicy::WriteThrough);

    level.insert(0, false);
    level.insert(128, false);
    assert!(level.read(0)); // tag 1 is now the least recent

    level.insert(256, false);
    assert!(contains(&level, 0));
    assert!(!contains(&level, 128));
    assert!(contains(&level, 256));
}

// ══════════════════════════════════════════════════════════
// 6. Explicit eviction
// ══════════════════════════════════════════════════════════

/// Evict invalidates a present line and reports its dirty state; a dirty
/// write-back line counts one writeback.
#[test]
fn evict_reports_dirty_state() {
    let mut level = test_level(ReplacementPolicy::Lru, WritePolicy::WriteBack);

    level.write(0); // dirty line
    assert_eq!(level.evict(0), Some(true));
    assert_eq!(level.writebacks, 1);
    assert!(!contains(&level, 0));

    level.insert(64, false);
    assert_eq!(level.evict(64), Some(false));
    assert_eq!(level.writebacks, 1);

    assert_eq!(level.evict(0x1000), None);
}

// ══════════════════════════════════════════════════════════
// 7. Clear
// ══════════════════════════════════════════════════════════

/// Clear invalidates every line and zeroes every counter.
#[test]
fn clear_resets_everything() {
    let mut level = test_level(ReplacementPolicy::Lru, WritePolicy::WriteBack);

    level.write(0);
    level.read(0);
    level.read(999);
    level.clear();

    assert_eq!(level.hits, 0);
    assert_eq!(level.misses, 0);
    assert_eq!(level.writes, 0);
    assert_eq!(level.writebacks, 0);
    assert_eq!(level.total_accesses(), 0);
    for set in level.sets() {
        for line in set {
            assert!(!line.valid);
            assert!(!line.dirty);
        }
    }
}

/// `hits + misses` always equals the probe count.
#[test]
fn hits_plus_misses_is_accesses() {
    let mut level = test_level(ReplacementPolicy::Fifo, WritePolicy::WriteBack);

    for addr in [0usize, 64, 0, 128, 256, 64, 512] {
        level.read(addr);
        level.write(addr);
    }
    assert_eq!(level.hits + level.misses, level.total_accesses());
    assert_eq!(level.writes, 7);
}
