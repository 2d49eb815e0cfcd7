//! Virtual Memory Unit Tests.
//!
//! Verifies demand paging: translation arithmetic, fault handling, FIFO/LRU
//! victim selection, dirty-eviction disk writes, and the page/frame
//! residency bijection.

use memsim_core::config::PageReplacement;
use memsim_core::error::TranslateError;
use memsim_core::vm::VirtualMemory;

// ──────────────────────────────────────────────────────────
// Helper: residency bijection
// ──────────────────────────────────────────────────────────

/// Asserts frames and valid page table entries describe the same bijection.
fn assert_residency_consistent(vm: &VirtualMemory) {
    for (frame, mapped) in vm.frame_to_page().iter().enumerate() {
        if let Some(page) = mapped {
            let pte = &vm.page_table()[*page];
            assert!(pte.valid, "mapped frame {} must point at a valid page", frame);
            assert_eq!(pte.frame, Some(frame));
        }
    }
    for (page, pte) in vm.page_table().iter().enumerate() {
        if pte.valid {
            let frame = pte.frame.expect("valid entry has a frame");
            assert_eq!(vm.frame_to_page()[frame], Some(page));
        } else {
            assert_eq!(pte.frame, None);
        }
    }
}

// ══════════════════════════════════════════════════════════
// 1. Construction
// ══════════════════════════════════════════════════════════

/// Pages and frames follow from the sizes; frames never exceed pages.
#[test]
fn geometry_and_frame_clamp() {
    let vm = VirtualMemory::new(16, 8, 4, PageReplacement::Fifo);
    assert_eq!(vm.num_pages(), 4);
    assert_eq!(vm.num_frames(), 2);

    // Physical larger than virtual: clamped down to the page count.
    let clamped = VirtualMemory::new(16, 64, 4, PageReplacement::Fifo);
    assert_eq!(clamped.num_frames(), 4);
    assert_eq!(clamped.physical_size(), 16);
}

// ══════════════════════════════════════════════════════════
// 2. Translation
// ══════════════════════════════════════════════════════════

/// A faulting translation loads the page and still produces the address;
/// the repeat access hits the same frame.
#[test]
fn fault_then_hit() {
    let mut vm = VirtualMemory::new(1024, 512, 256, PageReplacement::Fifo);

    let first = vm.translate(300).unwrap();
    assert!(first.fault.is_some());
    assert_eq!(first.page, 1);
    assert_eq!(first.offset, 44);
    assert_eq!(first.physical_address, 44); // frame 0
    assert_eq!(vm.page_faults, 1);
    assert_eq!(vm.disk_reads, 1);

    let again = vm.translate(300).unwrap();
    assert!(again.fault.is_none());
    assert_eq!(again.physical_address, 44);
    assert_eq!(vm.page_hits, 1);
    assert_residency_consistent(&vm);
}

/// Out-of-range addresses fail; only the access counter moves.
#[test]
fn out_of_range_fails() {
    let mut vm = VirtualMemory::new(1024, 512, 256, PageReplacement::Fifo);

    assert_eq!(
        vm.translate(1024).unwrap_err(),
        TranslateError::OutOfRange(1024, 1024)
    );
    assert_eq!(vm.total_accesses, 1);
    assert_eq!(vm.page_hits, 0);
    assert_eq!(vm.page_faults, 0);
    assert_eq!(vm.disk_reads, 0);
}

// ══════════════════════════════════════════════════════════
// 3. LRU paging (seed scenario)
// ══════════════════════════════════════════════════════════

/// 4 pages over 2 frames, LRU. Accessing pages 0, 1, 0, 2 faults three
/// times and evicts page 1 (page 0 was touched more recently).
#[test]
fn lru_evicts_least_recent_page() {
    let mut vm = VirtualMemory::new(16, 8, 4, PageReplacement::Lru);

    vm.translate(0).unwrap(); // fault, page 0 -> frame 0
    vm.translate(4).unwrap(); // fault, page 1 -> frame 1
    vm.translate(0).unwrap(); // hit, refreshes page 0
    let third = vm.translate(8).unwrap(); // fault, evicts page 1

    let fault = third.fault.expect("page 2 faults");
    let victim = fault.evicted.expect("a full frame table evicts");
    assert_eq!(victim.page, 1);
    assert!(!victim.dirty);

    assert_eq!(vm.page_hits, 1);
    assert_eq!(vm.page_faults, 3);
    assert_eq!(vm.disk_reads, 3);
    assert_eq!(vm.disk_writes, 0);

    assert!(!vm.page_table()[1].valid);
    assert_eq!(vm.page_table()[1].frame, None);
    assert_residency_consistent(&vm);
}

/// FIFO evicts by load time even when the oldest page was just touched.
#[test]
fn fifo_evicts_earliest_load() {
    let mut vm = VirtualMemory::new(16, 8, 4, PageReplacement::Fifo);

    vm.translate(0).unwrap(); // page 0 loaded first
    vm.translate(4).unwrap(); // page 1
    vm.translate(0).unwrap(); // hit; FIFO must ignore the touch
    let third = vm.translate(8).unwrap();

    let victim = third.fault.unwrap().evicted.unwrap();
    assert_eq!(victim.page, 0, "FIFO evicts the earliest load");
    assert_residency_consistent(&vm);
}

// ══════════════════════════════════════════════════════════
// 4. Dirty evictions
// ══════════════════════════════════════════════════════════

/// Evicting a dirty page costs exactly one disk write.
#[test]
fn dirty_eviction_writes_disk_once() {
    let mut vm = VirtualMemory::new(16, 8, 4, PageReplacement::Fifo);

    vm.translate(0).unwrap();
    vm.mark_dirty(0);
    vm.translate(4).unwrap();
    let outcome = vm.translate(8).unwrap(); // evicts dirty page 0

    let victim = outcome.fault.unwrap().evicted.unwrap();
    assert_eq!(victim.page, 0);
    assert!(victim.dirty);
    assert_eq!(vm.disk_writes, 1);

    // The reloaded entry starts clean again.
    assert!(!vm.page_table()[2].dirty);
}

/// Marking a non-resident page dirty is a no-op.
#[test]
fn mark_dirty_ignores_non_resident_pages() {
    let mut vm = VirtualMemory::new(16, 8, 4, PageReplacement::Fifo);
    vm.mark_dirty(3);
    assert!(!vm.page_table()[3].dirty);
    assert_eq!(vm.disk_writes, 0);
}

// ══════════════════════════════════════════════════════════
// 5. Bookkeeping
// ══════════════════════════════════════════════════════════

/// Hits update the access metadata of the entry.
#[test]
fn hits_touch_access_metadata() {
    let mut vm = VirtualMemory::new(16, 8, 4, PageReplacement::Lru);

    vm.translate(0).unwrap();
    let loaded_at = vm.page_table()[0].last_access_time;
    vm.translate(0).unwrap();

    let pte = &vm.page_table()[0];
    assert!(pte.last_access_time > loaded_at);
    assert_eq!(pte.access_count, 2);
}

/// `page_hits + page_faults` equals the in-range access count.
#[test]
fn hits_plus_faults_is_accesses() {
    let mut vm = VirtualMemory::new(64, 16, 4, PageReplacement::Lru);

    for addr in [0usize, 4, 8, 0, 12, 16, 4, 32] {
        vm.translate(addr).unwrap();
    }
    assert_eq!(vm.page_hits + vm.page_faults, vm.total_accesses);
    assert_residency_consistent(&vm);
}

/// Reset drops residency and zeroes the statistics.
#[test]
fn reset_restores_initial_state() {
    let mut vm = VirtualMemory::new(16, 8, 4, PageReplacement::Lru);

    vm.translate(0).unwrap();
    vm.translate(4).unwrap();
    vm.reset();

    assert_eq!(vm.total_accesses, 0);
    assert_eq!(vm.page_faults, 0);
    assert_eq!(vm.disk_reads, 0);
    assert_eq!(vm.frames_used(), 0);
    for pte in vm.page_table() {
        assert!(!pte.valid);
    }
}

/// Policy switches apply to subsequent evictions.
#[test]
fn policy_switch_changes_victims() {
    let mut vm = VirtualMemory::new(16, 8, 4, PageReplacement::Fifo);

    vm.translate(0).unwrap();
    vm.translate(4).unwrap();
    vm.translate(0).unwrap(); // touch page 0

    vm.set_policy(PageReplacement::Lru);
    let outcome = vm.translate(8).unwrap();
    let victim = outcome.fault.unwrap().evicted.unwrap();
    assert_eq!(victim.page, 1, "LRU now protects the recently touched page");
}
