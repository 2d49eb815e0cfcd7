//! Interactive command processor.
//!
//! Implements the simulator's line-oriented command language. It provides:
//! 1. **Dispatch:** Whitespace-tokenised commands (`init`, `malloc`, `read`, ...).
//! 2. **The cache wizard:** A step-by-step interactive `setup cache` flow.
//! 3. **Presets:** Applying a JSON [`Config`] as if the matching `init` commands
//!    had been typed.
//!
//! Every failure is reported and the prompt returns; no command aborts the
//! process.

use std::io::{self, BufRead, Write};

use memsim_core::config::{
    defaults, AllocationStrategy, Associativity, CacheConfig, CacheLevelConfig, PageReplacement,
    ReplacementPolicy, WritePolicy,
};
use memsim_core::{Config, MemorySystem};

use crate::report;

/// Whether the command loop should keep running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    /// Keep reading commands.
    Continue,
    /// Leave the loop (`exit` / `quit`).
    Exit,
}

/// REPL state: the simulated system plus presentation flags.
pub struct Repl {
    system: MemorySystem,
    verbose: bool,
}

impl Repl {
    /// Creates a REPL over an empty system.
    pub fn new() -> Self {
        Self {
            system: MemorySystem::new(),
            verbose: false,
        }
    }

    /// Returns the simulated system (used by reports and tests).
    pub fn system(&self) -> &MemorySystem {
        &self.system
    }

    /// Applies a preset configuration as if typed as `init` commands.
    pub fn apply_config(&mut self, config: &Config) {
        if let Some(memory) = config.memory {
            self.init_memory(memory.size, memory.buddy);
        }
        if let Some(vm) = config.vm {
            match self.system.init_vm(vm.vm_size, vm.page_size, vm.policy) {
                Ok(()) => report::print_vm_init(self.system.vm().expect("vm just initialized")),
                Err(e) => println!("Error: {}", e),
            }
        }
        if let Some(cache) = config.cache {
            match self.system.init_cache(cache) {
                Ok(()) => report::print_cache_init(self.system.cache().expect("cache just initialized")),
                Err(e) => println!("Error: {}", e),
            }
        }
    }

    /// Executes one command line.
    pub fn process_line(&mut self, line: &str) -> Control {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(&cmd) = tokens.first() else {
            return Control::Continue;
        };

        match cmd {
            "exit" | "quit" => {
                println!("Exiting memory hierarchy simulator");
                return Control::Exit;
            }
            "help" => print_help(),
            "status" => report::print_status(&self.system, self.verbose),
            "stats" => report::print_stats(&self.system),
            "dump" => report::print_memory_layout(&self.system),
            "page_table" => report::print_page_table(&self.system),
            "cache_contents" => report::print_cache_contents(&self.system),
            "verbose" => match tokens.get(1) {
                Some(&"on") => {
                    self.verbose = true;
                    println!("Verbose mode: ON");
                }
                Some(&"off") => {
                    self.verbose = false;
                    println!("Verbose mode: OFF");
                }
                _ => println!("Usage: verbose on|off"),
            },
            "clear" => {
                self.system.clear();
                println!("System cleared");
            }
            "init" => self.cmd_init(&tokens),
            "setup" => {
                if tokens.get(1) == Some(&"cache") {
                    let stdin = io::stdin();
                    self.setup_cache(&mut stdin.lock());
                } else {
                    println!("Usage: setup cache");
                }
            }
            "set" => self.cmd_set(&tokens),
            "malloc" => self.cmd_malloc(&tokens),
            "free" => self.cmd_free(&tokens),
            "read" => self.cmd_access(&tokens, false, "read <address>"),
            "write" => self.cmd_access(&tokens, true, "write <address>"),
            "access" => self.cmd_access(&tokens, false, "access <address>"),
            _ => println!("Unknown command. Type 'help' for available commands."),
        }

        Control::Continue
    }

    fn cmd_init(&mut self, tokens: &[&str]) {
        match tokens.get(1) {
            Some(&"memory") => {
                let Some(size) = tokens.get(2).and_then(|t| parse_number(t)) else {
                    println!("Usage: init memory <size> [buddy]");
                    return;
                };
                let buddy = tokens.get(3) == Some(&"buddy");
                self.init_memory(size, buddy);
            }
            Some(&"vm") => {
                let vm_size = tokens.get(2).and_then(|t| parse_number(t));
                let page_size = tokens.get(3).and_then(|t| parse_number(t));
                let (Some(vm_size), Some(page_size)) = (vm_size, page_size) else {
                    println!("Usage: init vm <vm_size> <page_size> [fifo|lru]");
                    return;
                };
                let policy = tokens
                    .get(4)
                    .and_then(|t| PageReplacement::from_token(t))
                    .unwrap_or_default();

                match self.system.init_vm(vm_size, page_size, policy) {
                    Ok(()) => {
                        report::print_vm_init(self.system.vm().expect("vm just initialized"))
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            Some(&"cache") => {
                let Some(config) = parse_cache_tokens(&tokens[2..]) else {
                    println!("Usage: init cache <l1_lines> <l1_block> <l1_assoc> <l1_pol> <l1_write>");
                    println!("                  <l2_lines> <l2_block> <l2_assoc> <l2_pol> <l2_write>");
                    println!("                  <l3_lines> <l3_block> <l3_assoc> <l3_pol> <l3_write>");
                    println!("Example: init cache 8 64 2way lru wt 16 64 2way lru wb 0 64 fully lru wb");
                    println!("  (use lines=0 to disable a level)");
                    return;
                };
                match self.system.init_cache(config) {
                    Ok(()) => {
                        report::print_cache_init(self.system.cache().expect("cache just initialized"))
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            _ => println!("Usage: init memory|vm|cache ..."),
        }
    }

    fn init_memory(&mut self, size: usize, buddy: bool) {
        let arena = self.system.init_memory(size, buddy);
        if buddy && arena != size {
            println!(
                "Warning: buddy allocator requires a power-of-2 size; adjusting to {} bytes",
                arena
            );
        }
        report::print_memory_init(&self.system);
    }

    fn cmd_set(&mut self, tokens: &[&str]) {
        match tokens.get(1) {
            Some(&"strategy") => {
                let Some(strategy) = tokens.get(2).and_then(|t| AllocationStrategy::from_token(t))
                else {
                    println!("Unknown strategy. Use: first_fit, best_fit, or worst_fit");
                    return;
                };
                match self.system.set_strategy(strategy) {
                    Ok(()) => println!("Allocation strategy set to: {}", strategy.name()),
                    Err(e) => println!("Error: {}", e),
                }
            }
            Some(&"vm_policy") => {
                let Some(policy) = tokens.get(2).and_then(|t| PageReplacement::from_token(t))
                else {
                    println!("Unknown policy. Available: fifo, lru");
                    return;
                };
                match self.system.set_vm_policy(policy) {
                    Ok(()) => println!("Replacement policy set to: {}", policy.name()),
                    Err(e) => println!("Error: {}", e),
                }
            }
            _ => println!("Usage: set strategy|vm_policy <value>"),
        }
    }

    fn cmd_malloc(&mut self, tokens: &[&str]) {
        let Some(size) = tokens.get(1).and_then(|t| parse_number(t)) else {
            println!("Usage: malloc <size>");
            return;
        };
        match self.system.allocate(size) {
            Ok(id) => {
                let address = report::block_address(&self.system, id);
                match address {
                    Some(addr) => println!(
                        "Allocated block id={} at address {:#06x} ({} bytes)",
                        id, addr, size
                    ),
                    None => println!("Allocated block id={} ({} bytes)", id, size),
                }
            }
            Err(e) => println!("Error: {}", e),
        }
    }

    fn cmd_free(&mut self, tokens: &[&str]) {
        let Some(id) = tokens.get(1).and_then(|t| t.parse::<u64>().ok()) else {
            println!("Usage: free <block_id>");
            return;
        };
        match self.system.deallocate(id) {
            Ok(()) => println!("Block {} freed and merged", id),
            Err(e) => println!("Error: {}", e),
        }
    }

    fn cmd_access(&mut self, tokens: &[&str], is_write: bool, usage: &str) {
        let Some(address) = tokens.get(1).and_then(|t| parse_number(t)) else {
            println!("Usage: {}", usage);
            return;
        };
        match self.system.access(address, is_write) {
            Ok(outcome) => report::print_access(&outcome, self.verbose),
            Err(e) => {
                println!("Error: {}", e);
                println!("Access terminated.");
            }
        }
    }

    /// Interactive cache configuration wizard.
    ///
    /// Prompts for each L1/L2/L3 parameter with the usual defaults; empty
    /// input keeps a default, and L3 is only offered once L2 is enabled.
    pub fn setup_cache(&mut self, input: &mut impl BufRead) {
        println!("\n=== Cache configuration wizard ===\n");

        println!("L1 cache (required):");
        let l1 = prompt_level(input, defaults::L1_LINES);

        let mut l2 = CacheLevelConfig::disabled();
        let mut l3 = CacheLevelConfig::disabled();

        if prompt_yes_no(input, "Do you want an L2 cache? (y/n) [default: n]: ") {
            println!("L2 cache:");
            l2 = prompt_level(input, defaults::L2_LINES);

            if prompt_yes_no(input, "Do you want an L3 cache? (y/n) [default: n]: ") {
                println!("L3 cache:");
                l3 = prompt_level(input, defaults::L3_LINES);
            } else {
                println!("L3: disabled");
            }
        } else {
            println!("L2: disabled");
            println!("L3: disabled (requires L2)");
        }

        let config = CacheConfig { l1, l2, l3 };

        println!("\nConfiguration summary:");
        print_level_summary("L1", &config.l1);
        if config.l2.enabled() {
            print_level_summary("L2", &config.l2);
        }
        if config.l3.enabled() {
            print_level_summary("L3", &config.l3);
        }

        let line = prompt(input, "\nApply this configuration? (y/n) [default: y]: ");
        if line.is_empty() || matches!(line.as_str(), "y" | "Y" | "yes") {
            match self.system.init_cache(config) {
                Ok(()) => {
                    report::print_cache_init(self.system.cache().expect("cache just initialized"))
                }
                Err(e) => println!("Error: {}", e),
            }
        } else {
            println!("Configuration cancelled.");
        }
    }
}

impl Default for Repl {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses a decimal or `0x`-prefixed hexadecimal number.
fn parse_number(token: &str) -> Option<usize> {
    if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        usize::from_str_radix(hex, 16).ok()
    } else {
        token.parse().ok()
    }
}

/// Parses the 15-token `init cache` argument list (three levels of five).
fn parse_cache_tokens(tokens: &[&str]) -> Option<CacheConfig> {
    if tokens.len() < 15 {
        return None;
    }

    let level = |chunk: &[&str]| -> Option<CacheLevelConfig> {
        Some(CacheLevelConfig {
            lines: parse_number(chunk[0])?,
            block_size: parse_number(chunk[1])?,
            associativity: Associativity::from_token(chunk[2]),
            replacement: ReplacementPolicy::from_token(chunk[3]),
            write: WritePolicy::from_token(chunk[4]),
        })
    };

    Some(CacheConfig {
        l1: level(&tokens[0..5])?,
        l2: level(&tokens[5..10])?,
        l3: level(&tokens[10..15])?,
    })
}

/// Prints `text`, then reads and trims one line.
fn prompt(input: &mut impl BufRead, text: &str) -> String {
    print!("{}", text);
    io::stdout().flush().ok();

    let mut line = String::new();
    input.read_line(&mut line).ok();
    line.trim().to_string()
}

fn prompt_yes_no(input: &mut impl BufRead, text: &str) -> bool {
    matches!(prompt(input, text).as_str(), "y" | "Y" | "yes")
}

/// Prompts for one cache level's parameters.
fn prompt_level(input: &mut impl BufRead, default_lines: usize) -> CacheLevelConfig {
    let lines = prompt(
        input,
        &format!("  Number of cache lines [default: {}]: ", default_lines),
    );
    let lines = parse_number(&lines).unwrap_or(default_lines);

    let block = prompt(
        input,
        &format!("  Block size in bytes [default: {}]: ", defaults::BLOCK_SIZE),
    );
    let block_size = parse_number(&block).unwrap_or(defaults::BLOCK_SIZE);

    let assoc = prompt(
        input,
        "  Associativity (direct/2way/4way/fully) [default: fully]: ",
    );
    let associativity = if assoc.is_empty() {
        Associativity::Fully
    } else {
        Associativity::from_token(&assoc)
    };

    let repl = prompt(input, "  Replacement policy (lru/fifo) [default: lru]: ");
    let replacement = if repl.is_empty() {
        ReplacementPolicy::Lru
    } else {
        ReplacementPolicy::from_token(&repl)
    };

    let write = prompt(
        input,
        "  Write policy (wt=write-through / wb=write-back) [default: wb]: ",
    );
    let write = if write.is_empty() {
        WritePolicy::WriteBack
    } else {
        WritePolicy::from_token(&write)
    };

    CacheLevelConfig {
        lines,
        block_size,
        associativity,
        replacement,
        write,
    }
}

fn print_level_summary(name: &str, level: &CacheLevelConfig) {
    println!(
        "  {}: {} lines x {} B = {} bytes | {} | {} | {}",
        name,
        level.lines,
        level.block_size,
        level.lines * level.block_size,
        level.associativity.name(),
        level.replacement.name(),
        level.write.name()
    );
}

/// Prints the startup banner.
pub fn print_welcome() {
    println!("==========================================================");
    println!("          MEMORY HIERARCHY SIMULATOR");
    println!("==========================================================");
    println!();
    println!("  Access flow:");
    println!("  Virtual Address -> Page Table -> Physical Address -> Cache -> Memory");
    println!();
    println!("  Components (enable as needed):");
    println!("  - Memory allocator: contiguous OR buddy (required for malloc/free)");
    println!("  - Virtual memory:   optional (enables address translation)");
    println!("  - Cache hierarchy:  optional (enables L1/L2/L3 caching)");
    println!();
    println!("  Type 'help' for commands");
    println!("==========================================================");
}

/// Prints the command reference.
pub fn print_help() {
    println!();
    println!("SYSTEM INITIALIZATION");
    println!("  init memory <size> [buddy]      Create the allocator; 'buddy' selects the");
    println!("                                  buddy system (min block size {})", defaults::MIN_BLOCK_SIZE);
    println!("  init vm <vm_size> <page_size> [fifo|lru]");
    println!("                                  Enable paging (default policy: fifo)");
    println!("  init cache <l1...> <l2...> <l3...>");
    println!("                                  15 tokens, five per level:");
    println!("                                  lines block assoc policy write");
    println!("                                  (lines=0 disables a level)");
    println!("  setup cache                     Interactive cache wizard");
    println!();
    println!("MEMORY OPERATIONS");
    println!("  malloc <size>                   Allocate memory");
    println!("  free <block_id>                 Deallocate memory");
    println!("  read <address>                  Read through the unified flow");
    println!("  write <address>                 Write through the unified flow");
    println!("  access <address>                Same as read");
    println!("  dump                            Show the memory layout");
    println!();
    println!("CONFIGURATION");
    println!("  set strategy <first_fit|best_fit|worst_fit>   (contiguous only)");
    println!("  set vm_policy <fifo|lru>                      (paging only)");
    println!("  verbose on|off                  Toggle per-access detail");
    println!();
    println!("INFORMATION");
    println!("  status                          System configuration");
    println!("  stats                           All statistics");
    println!("  page_table                      Page table (paging only)");
    println!("  cache_contents                  Cache lines (cache only)");
    println!();
    println!("SYSTEM CONTROL");
    println!("  clear                           Tear down all components");
    println!("  help                            This text");
    println!("  exit | quit                     Leave the simulator");
    println!();
    println!("Token vocabulary: assoc = direct|2way|4way|fully,");
    println!("policy = fifo|lru, write = wt|write-through|writethrough|wb|write-back|writeback");
    println!();
}
