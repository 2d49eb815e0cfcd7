//! Presentation formatting for the simulator state.
//!
//! Renders every user-facing view of the system: initialization banners, the
//! memory layout dump, the page table, cache contents, statistics blocks, and
//! the per-access narration. All functions read public state from the core
//! engines; nothing in here mutates a counter.

use memsim_core::alloc::{Allocator, BuddyAllocator, FreeListAllocator};
use memsim_core::cache::{CacheHierarchy, CacheLevel, ServicedBy};
use memsim_core::config::{ReplacementPolicy, WritePolicy};
use memsim_core::system::{AccessReport, MemorySystem};
use memsim_core::vm::VirtualMemory;

/// Address of the live allocation `id`, if the active allocator knows it.
pub fn block_address(system: &MemorySystem, id: u64) -> Option<usize> {
    match system.allocator()? {
        Allocator::Contiguous(a) => a
            .blocks()
            .iter()
            .find(|b| b.allocated && b.id == id)
            .map(|b| b.start),
        Allocator::Buddy(a) => a.records().get(&id).map(|r| r.address),
    }
}

/// Banner after `init memory`.
pub fn print_memory_init(system: &MemorySystem) {
    match system.allocator() {
        Some(Allocator::Buddy(a)) => {
            println!("Buddy allocator initialized:");
            println!("  Total memory: {} bytes", a.total_memory());
            println!("  Min block size: {} bytes", a.min_block_size());
            println!(
                "  Orders: 0 ({} bytes) to {} ({} bytes)",
                a.min_block_size(),
                a.max_order(),
                a.total_memory()
            );
        }
        Some(Allocator::Contiguous(a)) => {
            println!("Memory initialized: {} bytes", a.total_memory());
            println!("Allocator: contiguous (First/Best/Worst Fit)");
        }
        None => {}
    }
}

/// Banner after `init vm`.
pub fn print_vm_init(vm: &VirtualMemory) {
    println!("=== Virtual memory initialized ===");
    println!("Virtual memory size: {} bytes", vm.virtual_size());
    println!("Physical memory size: {} bytes", vm.physical_size());
    println!("Page size: {} bytes", vm.page_size());
    println!("Virtual pages: {}", vm.num_pages());
    println!("Physical frames: {}", vm.num_frames());
    println!("Replacement policy: {}", vm.policy().name());
}

/// Banner after `init cache` / the wizard.
pub fn print_cache_init(cache: &CacheHierarchy) {
    print!("Cache hierarchy initialized: L1");
    if cache.has_l2() {
        print!(" -> L2");
    }
    if cache.has_l3() {
        print!(" -> L3");
    }
    println!(" -> Memory");
}

/// The `status` report: which components exist and how they are configured.
pub fn print_status(system: &MemorySystem, verbose: bool) {
    println!("\n=== SYSTEM CONFIGURATION ===");

    println!("\nMemory allocator:");
    match system.allocator() {
        Some(Allocator::Buddy(a)) => {
            println!("  Type: buddy system");
            println!("  Size: {} bytes (power-of-2)", a.total_memory());
            println!("  Min block: {} bytes", a.min_block_size());
        }
        Some(Allocator::Contiguous(a)) => {
            println!("  Type: contiguous");
            println!("  Size: {} bytes", a.total_memory());
            println!("  Strategy: {}", a.strategy().name());
        }
        None => println!("  Status: NOT INITIALIZED"),
    }

    println!("\nVirtual memory:");
    match system.vm() {
        Some(vm) => {
            println!("  Status: ENABLED ({})", vm.policy().name());
            println!(
                "  {} pages of {} bytes over {} frames",
                vm.num_pages(),
                vm.page_size(),
                vm.num_frames()
            );
        }
        None => println!("  Status: DISABLED (direct physical addressing)"),
    }

    println!("\nCache hierarchy:");
    match system.cache() {
        Some(cache) => {
            print!("  Status: ENABLED (L1");
            if cache.has_l2() {
                print!(", L2");
            }
            if cache.has_l3() {
                print!(", L3");
            }
            println!(")");
        }
        None => println!("  Status: DISABLED (direct memory access)"),
    }

    print!("\nIntegration flow: ");
    if system.vm().is_some() {
        print!("Virtual Address -> Page Table -> ");
    }
    print!("Physical Address");
    if system.cache().is_some() {
        print!(" -> Cache Hierarchy");
    }
    println!(" -> Memory");

    println!("Verbose mode: {}", if verbose { "ON" } else { "OFF" });
    println!();
}

/// The `stats` report: every component's statistics block.
pub fn print_stats(system: &MemorySystem) {
    println!("\n=== COMPREHENSIVE STATISTICS ===");

    match system.allocator() {
        Some(Allocator::Contiguous(a)) => print_contiguous_stats(a),
        Some(Allocator::Buddy(a)) => print_buddy_stats(a),
        None => println!("\nNo memory allocator initialized"),
    }

    if let Some(vm) = system.vm() {
        print_vm_stats(vm);
    }

    if let Some(cache) = system.cache() {
        print_cache_stats(cache);
    }
}

fn print_contiguous_stats(a: &FreeListAllocator) {
    println!("\n--- MEMORY ALLOCATOR (contiguous) ---");
    println!("Total memory: {} bytes", a.total_memory());
    println!("Used memory: {} bytes", a.used_memory());
    println!("Free memory: {} bytes", a.free_memory());
    println!("Free blocks: {}", a.free_block_count());
    println!(
        "External fragmentation: {:.2}%",
        a.external_fragmentation()
    );
    println!("Internal fragmentation: 0 bytes (exact allocation)");
    println!("Allocation attempts: {}", a.attempts);
    println!("  Successful: {}", a.successes);
    println!("  Failed: {}", a.failures);
    println!("  Success rate: {:.2}%", a.success_rate());
}

fn print_buddy_stats(a: &BuddyAllocator) {
    println!("\n--- MEMORY ALLOCATOR (buddy) ---");
    println!("Total memory: {} bytes", a.total_memory());
    println!("Min block size: {} bytes", a.min_block_size());
    println!("Max order: {}", a.max_order());
    println!("Allocation attempts: {}", a.attempts);
    println!("  Successful: {}", a.successes);
    println!("  Failed: {}", a.failures);
    println!("  Success rate: {:.2}%", a.success_rate());
    println!("Deallocations: {}", a.deallocations);
    println!("Live blocks: {}", a.records().len());
    println!("Block splits: {}", a.splits);
    println!("Block merges: {}", a.merges);
    println!("Used memory: {} bytes", a.used_memory());
    println!("Free memory: {} bytes", a.free_memory());
    println!("Utilization: {:.2}%", a.utilization());
    println!(
        "Internal fragmentation: {} bytes",
        a.internal_fragmentation
    );
    let fragments = a.fragmented_free_blocks();
    if fragments > 0 {
        println!(
            "External fragmentation: {} free block(s) smaller than max size",
            fragments
        );
    } else if a.free_memory() == 0 {
        println!("External fragmentation: N/A (no free memory)");
    } else {
        println!("External fragmentation: none (all free memory in one block)");
    }
}

fn print_vm_stats(vm: &VirtualMemory) {
    println!("\n--- VIRTUAL MEMORY ---");
    println!(
        "Virtual memory: {} bytes ({} pages)",
        vm.virtual_size(),
        vm.num_pages()
    );
    println!(
        "Physical memory: {} bytes ({} frames)",
        vm.physical_size(),
        vm.num_frames()
    );
    println!("Page size: {} bytes", vm.page_size());
    println!("Replacement policy: {}", vm.policy().name());
    println!("Total accesses: {}", vm.total_accesses);
    println!("Page hits: {}", vm.page_hits);
    println!("Page faults: {}", vm.page_faults);
    println!("Hit rate: {:.2}%", vm.hit_rate());
    println!("Fault rate: {:.2}%", vm.fault_rate());
    println!("Disk reads: {}", vm.disk_reads);
    println!("Disk writes: {}", vm.disk_writes);
    println!(
        "Frames used: {} / {}",
        vm.frames_used(),
        vm.num_frames()
    );
}

fn print_level_stats(level: &CacheLevel) {
    println!("\n{} statistics:", level.name());
    println!("  Capacity: {} lines", level.capacity());
    println!("  Block size: {} bytes", level.block_size());
    println!("  Associativity: {}", level.associativity().name());
    println!("  Sets: {}, Ways: {}", level.num_sets(), level.ways());
    println!("  Replacement policy: {}", level.replacement().name());
    println!("  Write policy: {}", level.write_policy().name());
    println!("  Hits: {}", level.hits);
    println!("  Misses: {}", level.misses);
    println!("  Total accesses: {}", level.total_accesses());
    println!("  Hit ratio: {:.2}%", level.hit_ratio());
    if level.writes > 0 {
        println!(
            "  Writes: {} (hits: {}, misses: {})",
            level.writes, level.write_hits, level.write_misses
        );
    }
    if level.write_policy() == WritePolicy::WriteBack {
        println!("  Write-backs to memory: {}", level.writebacks);
    }
}

fn print_cache_stats(cache: &CacheHierarchy) {
    println!("\n--- CACHE HIERARCHY ---");
    print_level_stats(cache.l1());
    if let Some(l2) = cache.l2() {
        print_level_stats(l2);
    }
    if let Some(l3) = cache.l3() {
        print_level_stats(l3);
    }

    println!("\nOverall:");
    println!("  Total accesses: {}", cache.total_accesses);
    println!("  Total reads: {}", cache.total_reads);
    println!("  Total writes: {}", cache.total_writes);
    println!("  L1 hits: {}", cache.l1_hits);
    if cache.has_l2() {
        println!("  L2 hits: {}", cache.l2_hits);
    }
    if cache.has_l3() {
        println!("  L3 hits: {}", cache.l3_hits);
    }
    println!("  Memory accesses: {}", cache.memory_accesses);
    println!("  Memory writes: {}", cache.memory_writes);
    println!("  Overall hit ratio: {:.2}%", cache.overall_hit_ratio());
    let writebacks = cache.total_writebacks();
    if writebacks > 0 {
        println!("  Total write-backs: {}", writebacks);
    }
    println!("  Total penalty cycles: {}", cache.total_penalty_cycles);
    println!("  Average cycles per access: {:.2}", cache.average_penalty());
    println!("  (L1 hit=1, L2 hit=10, L3 hit=50, Memory=100 cycles)");
}

/// The `dump` report: the arena as the active allocator sees it.
pub fn print_memory_layout(system: &MemorySystem) {
    match system.allocator() {
        Some(Allocator::Contiguous(a)) => {
            println!("\n=== Memory layout ===");
            for block in a.blocks() {
                let end = block.start + block.size - 1;
                if block.allocated {
                    println!(
                        "[{:#06x} - {:#06x}] USED (id={})",
                        block.start, end, block.id
                    );
                } else {
                    println!("[{:#06x} - {:#06x}] FREE", block.start, end);
                }
            }
        }
        Some(Allocator::Buddy(a)) => {
            println!("\n=== Allocated blocks ===");
            if a.records().is_empty() {
                println!("No blocks currently allocated");
            } else {
                println!("Format: block_id | address | requested -> actual | internal frag");
                for (id, rec) in a.records() {
                    println!(
                        "Block {:3} | {:#06x} | {:5} -> {:5} | {:4} bytes",
                        id,
                        rec.address,
                        rec.requested_size,
                        rec.actual_size,
                        rec.actual_size - rec.requested_size
                    );
                }
            }

            println!("\n=== Free lists ===");
            for (order, list) in a.free_lists().iter().enumerate() {
                print!(
                    "Order {:2} ({:6} bytes): ",
                    order,
                    a.block_size(order)
                );
                if list.is_empty() {
                    println!("empty");
                } else {
                    // LIFO: the newest (head) entry is the last pushed.
                    for addr in list.iter().rev() {
                        print!("[{:#06x}] ", addr);
                    }
                    println!("({} block{})", list.len(), if list.len() > 1 { "s" } else { "" });
                }
            }
        }
        None => println!("No memory allocator initialized"),
    }
}

/// The `page_table` report.
pub fn print_page_table(system: &MemorySystem) {
    let Some(vm) = system.vm() else {
        println!("Virtual memory not enabled");
        return;
    };

    println!("\n=== PAGE TABLE ===");
    println!("Page | Valid | Frame | Dirty | Load | Last access | Accesses");
    for (page, pte) in vm.page_table().iter().enumerate() {
        if pte.valid {
            println!(
                "{:4} |  YES  | {:5} | {:5} | {:4} | {:11} | {:8}",
                page,
                pte.frame.map_or(-1, |f| f as i64),
                if pte.dirty { "YES" } else { "NO" },
                pte.load_time,
                pte.last_access_time,
                pte.access_count
            );
        } else {
            println!("{:4} |  NO   |     - |     - |    - |           - |        -", page);
        }
    }

    let resident: Vec<String> = vm
        .page_table()
        .iter()
        .enumerate()
        .filter(|(_, pte)| pte.valid)
        .map(|(page, _)| page.to_string())
        .collect();
    if resident.is_empty() {
        println!("\nPages in memory: none (0/{} frames used)", vm.num_frames());
    } else {
        println!(
            "\nPages in memory: {} ({}/{} frames used)",
            resident.join(", "),
            resident.len(),
            vm.num_frames()
        );
    }
}

/// The `cache_contents` report.
pub fn print_cache_contents(system: &MemorySystem) {
    let Some(cache) = system.cache() else {
        println!("Cache not enabled");
        return;
    };

    print_level_contents(cache.l1());
    if let Some(l2) = cache.l2() {
        print_level_contents(l2);
    }
    if let Some(l3) = cache.l3() {
        print_level_contents(l3);
    }
}

fn print_level_contents(level: &CacheLevel) {
    println!("\n{} contents:", level.name());
    for (set, ways) in level.sets().iter().enumerate() {
        println!("  Set {}:", set);
        for (way, line) in ways.iter().enumerate() {
            if line.valid {
                print!(
                    "    Way {}: Tag={} {} (order={}",
                    way,
                    line.tag,
                    if line.dirty { "[DIRTY]" } else { "[CLEAN]" },
                    line.insertion_order
                );
                if level.replacement() == ReplacementPolicy::Lru {
                    print!(", lru={}", line.last_access_time);
                }
                println!(")");
            } else {
                println!("    Way {}: EMPTY", way);
            }
        }
    }
}

/// Narrates one unified access.
///
/// Non-verbose prints a compact summary; verbose walks the translation and
/// cache steps the way they happened. Both read only the [`AccessReport`].
pub fn print_access(report: &AccessReport, verbose: bool) {
    let op = if report.is_write { "WRITE" } else { "READ" };

    if !verbose {
        if let Some(t) = report.translation {
            println!(
                "Virtual {:#x} -> Physical {:#x} [{}]",
                report.address,
                t.physical_address,
                if t.fault.is_some() { "FAULT" } else { "HIT" }
            );
        }
        match report.cache {
            Some(outcome) => println!(
                "{} {:#x}: {} ({} cycles)",
                op,
                report.physical_address,
                if outcome.serviced_by == ServicedBy::Memory {
                    "MISS -> memory".to_string()
                } else {
                    format!("{} HIT", outcome.serviced_by.name())
                },
                outcome.penalty
            ),
            None => println!("{} {:#x}: direct memory access", op, report.physical_address),
        }
        if report.cache.map_or(false, |o| o.memory_write) {
            println!("  write-through to memory");
        }
        return;
    }

    println!("\n=== UNIFIED MEMORY ACCESS ===");

    match report.translation {
        Some(t) => {
            println!("[STEP 1] Virtual memory translation");
            println!(
                "  Virtual address: {:#x}  (page {}, offset {})",
                report.address, t.page, t.offset
            );
            match t.fault {
                None => println!("  PAGE HIT in frame {}", t.frame),
                Some(fault) => {
                    println!("  PAGE FAULT");
                    if let Some(victim) = fault.evicted {
                        print!("  Evicted page {} from frame {}", victim.page, fault.frame);
                        if victim.dirty {
                            print!(" (dirty - written to disk)");
                        }
                        println!();
                    }
                    println!("  Loaded page {} into frame {}", t.page, fault.frame);
                }
            }
            println!("  Physical address: {:#x}", t.physical_address);
        }
        None => {
            println!("[STEP 1] Virtual memory disabled, direct physical addressing");
            println!("  Physical address: {:#x}", report.physical_address);
        }
    }

    match report.cache {
        Some(outcome) => {
            println!("[STEP 2] Cache hierarchy ({})", op);
            match outcome.serviced_by {
                ServicedBy::Memory => {
                    println!("  Missed every level -> MEMORY ACCESS");
                    println!("  All levels refilled");
                }
                tier => println!("  {} HIT, upper levels refilled", tier.name()),
            }
            if outcome.memory_write {
                println!("  Write-through: data written to memory");
            }
            println!("  Penalty: {} cycles", outcome.penalty);
        }
        None => println!("[STEP 2] Cache hierarchy disabled, direct memory access"),
    }

    if report.memory_accessed {
        println!("[STEP 3] Physical memory accessed at {:#x}", report.physical_address);
    }
    println!("Access complete ({})", op);
}
