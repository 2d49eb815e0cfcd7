//! Configuration system for the memory hierarchy simulator.
//!
//! This module defines all configuration structures and enums used to parameterize
//! the simulation engines. It provides:
//! 1. **Defaults:** Baseline constants (arena sizes, block sizes, miss penalties).
//! 2. **Structures:** Hierarchical config for the allocator, paging, and cache levels.
//! 3. **Enums:** Placement strategy, associativity, replacement, and write policy types.
//! 4. **Token parsing:** The command vocabulary accepted by the CLI, with the
//!    documented fallbacks (unknown associativity → fully, unknown write policy →
//!    write-through).
//!
//! Configuration is supplied as REPL commands, via JSON (`memsim --config`), or use
//! `Config::default()` for an empty system.

use serde::Deserialize;

/// Default configuration constants for the simulator.
///
/// These values define the baseline setup when a command or config file
/// does not override them.
pub mod defaults {
    /// Cycles charged for a hit in (or a probe of) the L1 cache.
    pub const L1_PENALTY: u64 = 1;

    /// Cycles charged for a hit in (or a probe of) the L2 cache.
    pub const L2_PENALTY: u64 = 10;

    /// Cycles charged for a hit in (or a probe of) the L3 cache.
    pub const L3_PENALTY: u64 = 50;

    /// Cycles charged for a main-memory access.
    pub const MEMORY_PENALTY: u64 = 100;

    /// Default cache block size in bytes.
    ///
    /// Matches typical cache line sizes; substituted when a level is
    /// configured with a zero block size.
    pub const BLOCK_SIZE: usize = 64;

    /// Default L1 capacity in lines (cache wizard default).
    pub const L1_LINES: usize = 4;

    /// Default L2 capacity in lines (cache wizard default).
    pub const L2_LINES: usize = 8;

    /// Default L3 capacity in lines (cache wizard default).
    pub const L3_LINES: usize = 16;

    /// Default buddy arena size in bytes.
    ///
    /// Substituted when a buddy allocator is constructed over a
    /// non-power-of-two arena.
    pub const BUDDY_ARENA: usize = 1024;

    /// Default buddy minimum block size in bytes.
    ///
    /// Substituted for non-power-of-two minimum block sizes, and used by
    /// the unified system whenever buddy mode is selected.
    pub const MIN_BLOCK_SIZE: usize = 16;

    /// Default page size in bytes.
    ///
    /// Substituted when paging is configured with a zero page size.
    pub const PAGE_SIZE: usize = 256;
}

/// Placement strategies for the contiguous allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStrategy {
    /// Lowest-address free block that fits.
    #[default]
    FirstFit,
    /// Free block minimising leftover space (ties go to the lowest address).
    BestFit,
    /// Largest free block (ties go to the lowest address).
    WorstFit,
}

impl AllocationStrategy {
    /// Parses a strategy token (`first_fit`, `best_fit`, `worst_fit`).
    ///
    /// # Returns
    ///
    /// The matching strategy, or `None` for an unrecognised token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "first_fit" => Some(AllocationStrategy::FirstFit),
            "best_fit" => Some(AllocationStrategy::BestFit),
            "worst_fit" => Some(AllocationStrategy::WorstFit),
            _ => None,
        }
    }

    /// Returns the human-readable name of the strategy.
    pub fn name(self) -> &'static str {
        match self {
            AllocationStrategy::FirstFit => "First Fit",
            AllocationStrategy::BestFit => "Best Fit",
            AllocationStrategy::WorstFit => "Worst Fit",
        }
    }
}

/// Cache associativity classes.
///
/// The class fixes the number of ways; the number of sets follows from the
/// level capacity (`num_sets · ways = capacity_lines`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Associativity {
    /// Direct-mapped (one way per set).
    #[serde(alias = "direct")]
    DirectMapped,
    /// Two-way set associative.
    #[serde(alias = "2way")]
    TwoWay,
    /// Four-way set associative.
    #[serde(alias = "4way")]
    FourWay,
    /// Fully associative (a single set spanning every line).
    #[default]
    Fully,
}

impl Associativity {
    /// Parses an associativity token (`direct`, `2way`, `4way`, `fully`).
    ///
    /// Unknown tokens fall back to fully-associative.
    pub fn from_token(token: &str) -> Self {
        match token {
            "direct" => Associativity::DirectMapped,
            "2way" => Associativity::TwoWay,
            "4way" => Associativity::FourWay,
            "fully" => Associativity::Fully,
            _ => Associativity::Fully,
        }
    }

    /// Number of ways implied for a level of `capacity_lines` lines.
    pub fn ways(self, capacity_lines: usize) -> usize {
        match self {
            Associativity::DirectMapped => 1,
            Associativity::TwoWay => 2,
            Associativity::FourWay => 4,
            Associativity::Fully => capacity_lines,
        }
    }

    /// Returns the human-readable name of the associativity class.
    pub fn name(self) -> &'static str {
        match self {
            Associativity::DirectMapped => "Direct-mapped (1-way)",
            Associativity::TwoWay => "2-way set associative",
            Associativity::FourWay => "4-way set associative",
            Associativity::Fully => "Fully associative",
        }
    }
}

/// Cache replacement policy algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplacementPolicy {
    /// Least Recently Used: evict the line with the oldest access time.
    #[default]
    Lru,
    /// First In First Out: evict the line with the oldest fill order.
    Fifo,
}

impl ReplacementPolicy {
    /// Parses a replacement token (`fifo`, `lru`).
    ///
    /// Unknown tokens fall back to LRU.
    pub fn from_token(token: &str) -> Self {
        match token {
            "fifo" => ReplacementPolicy::Fifo,
            _ => ReplacementPolicy::Lru,
        }
    }

    /// Returns the policy name as printed in reports.
    pub fn name(self) -> &'static str {
        match self {
            ReplacementPolicy::Lru => "LRU",
            ReplacementPolicy::Fifo => "FIFO",
        }
    }
}

/// Cache write policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicy {
    /// Every write reaches main memory immediately; lines are never dirty.
    #[default]
    #[serde(alias = "wt")]
    WriteThrough,
    /// Writes mark the line dirty; memory is updated on eviction.
    #[serde(alias = "wb")]
    WriteBack,
}

impl WritePolicy {
    /// Parses a write-policy token.
    ///
    /// Accepts `wt`, `write-through`, `writethrough`, `wb`, `write-back`,
    /// `writeback`; unknown tokens fall back to write-through.
    pub fn from_token(token: &str) -> Self {
        match token {
            "wt" | "write-through" | "writethrough" => WritePolicy::WriteThrough,
            "wb" | "write-back" | "writeback" => WritePolicy::WriteBack,
            _ => WritePolicy::WriteThrough,
        }
    }

    /// Returns the policy name as printed in reports.
    pub fn name(self) -> &'static str {
        match self {
            WritePolicy::WriteThrough => "Write-Through",
            WritePolicy::WriteBack => "Write-Back",
        }
    }
}

/// Page replacement policies for the paging engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageReplacement {
    /// Evict the resident page with the earliest load time.
    #[default]
    Fifo,
    /// Evict the resident page with the oldest access time.
    Lru,
}

impl PageReplacement {
    /// Parses a paging-policy token (`fifo`, `lru`).
    ///
    /// # Returns
    ///
    /// The matching policy, or `None` for an unrecognised token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "fifo" => Some(PageReplacement::Fifo),
            "lru" => Some(PageReplacement::Lru),
            _ => None,
        }
    }

    /// Returns the policy name as printed in reports.
    pub fn name(self) -> &'static str {
        match self {
            PageReplacement::Fifo => "FIFO",
            PageReplacement::Lru => "LRU",
        }
    }
}

/// Configuration for a single cache level.
///
/// A level with `lines == 0` is disabled; the hierarchy skips it entirely.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CacheLevelConfig {
    /// Capacity in lines. Zero disables the level.
    pub lines: usize,

    /// Block size in bytes (zero is substituted with [`defaults::BLOCK_SIZE`]).
    #[serde(default = "CacheLevelConfig::default_block_size")]
    pub block_size: usize,

    /// Associativity class.
    #[serde(default)]
    pub associativity: Associativity,

    /// Replacement policy.
    #[serde(default)]
    pub replacement: ReplacementPolicy,

    /// Write policy.
    #[serde(default)]
    pub write: WritePolicy,
}

impl CacheLevelConfig {
    fn default_block_size() -> usize {
        defaults::BLOCK_SIZE
    }

    /// A disabled level (zero lines).
    pub fn disabled() -> Self {
        Self {
            lines: 0,
            block_size: defaults::BLOCK_SIZE,
            associativity: Associativity::Fully,
            replacement: ReplacementPolicy::Lru,
            write: WritePolicy::WriteThrough,
        }
    }

    /// Whether the level participates in the hierarchy.
    pub fn enabled(&self) -> bool {
        self.lines > 0
    }
}

/// Configuration for the full cache hierarchy.
///
/// L1 is mandatory; L2 is optional; L3 requires L2.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CacheConfig {
    /// L1 level (required; `lines` must be non-zero).
    pub l1: CacheLevelConfig,

    /// Optional L2 level.
    #[serde(default = "CacheLevelConfig::disabled")]
    pub l2: CacheLevelConfig,

    /// Optional L3 level (ignored unless L2 is enabled).
    #[serde(default = "CacheLevelConfig::disabled")]
    pub l3: CacheLevelConfig,
}

/// Configuration for the paging engine.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct VmConfig {
    /// Virtual address space size in bytes.
    pub vm_size: usize,

    /// Page size in bytes (zero is substituted with [`defaults::PAGE_SIZE`]).
    #[serde(default = "VmConfig::default_page_size")]
    pub page_size: usize,

    /// Page replacement policy.
    #[serde(default)]
    pub policy: PageReplacement,
}

impl VmConfig {
    fn default_page_size() -> usize {
        defaults::PAGE_SIZE
    }
}

/// Configuration for the physical memory allocator.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MemoryConfig {
    /// Arena size in bytes. Buddy mode rounds this up to a power of two.
    pub size: usize,

    /// Select the buddy system instead of the contiguous free-list allocator.
    #[serde(default)]
    pub buddy: bool,

    /// Minimum buddy block size (buddy mode only).
    #[serde(default = "MemoryConfig::default_min_block")]
    pub min_block_size: usize,
}

impl MemoryConfig {
    fn default_min_block() -> usize {
        defaults::MIN_BLOCK_SIZE
    }
}

/// Root configuration for a whole simulated system.
///
/// Every component is optional; the REPL normally builds the system one
/// `init` command at a time, while `--config` supplies all of it up front.
///
/// # Examples
///
/// ```
/// use memsim_core::config::Config;
///
/// let json = r#"{
///     "memory": { "size": 1024, "buddy": true },
///     "vm": { "vm_size": 65536, "page_size": 256, "policy": "lru" },
///     "cache": {
///         "l1": { "lines": 4, "block_size": 64, "associativity": "2way",
///                 "replacement": "lru", "write": "wb" },
///         "l2": { "lines": 8, "block_size": 64, "associativity": "2way",
///                 "replacement": "lru", "write": "wb" }
///     }
/// }"#;
///
/// let config: Config = serde_json::from_str(json).unwrap();
/// assert!(config.memory.unwrap().buddy);
/// assert_eq!(config.cache.unwrap().l1.lines, 4);
/// ```
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Config {
    /// Physical memory allocator setup.
    #[serde(default)]
    pub memory: Option<MemoryConfig>,

    /// Paging setup (requires `memory`).
    #[serde(default)]
    pub vm: Option<VmConfig>,

    /// Cache hierarchy setup.
    #[serde(default)]
    pub cache: Option<CacheConfig>,
}
