//! Memory hierarchy simulator CLI.
//!
//! This binary provides the interactive front end for the simulator. It performs:
//! 1. **Interactive run:** A line-oriented REPL (`init`, `malloc`, `read`, `stats`, ...).
//! 2. **Script run:** Execute a command file non-interactively (`--script`).
//! 3. **Preset config:** Apply a JSON system configuration at startup (`--config`).

use std::io::{self, BufRead, Write};
use std::{fs, process};

use clap::Parser;

use memsim_core::Config;

mod repl;
mod report;

use repl::{Control, Repl};

#[derive(Parser, Debug)]
#[command(
    name = "memsim",
    author,
    version,
    about = "Educational memory hierarchy simulator",
    long_about = "Simulates the full path of a memory reference: virtual address -> page table -> \
physical address -> cache hierarchy -> main memory, over an allocator-managed arena.\n\n\
Start interactively and type 'help', or drive it from a command script.\n\n\
Examples:\n  memsim\n  memsim --script demo.cmds\n  memsim --config system.json"
)]
struct Cli {
    /// JSON system configuration applied before the first command.
    #[arg(long)]
    config: Option<String>,

    /// Command file to execute instead of the interactive prompt.
    #[arg(long)]
    script: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    let mut repl = Repl::new();

    if let Some(path) = cli.config {
        let text = fs::read_to_string(&path).unwrap_or_else(|e| {
            eprintln!("Error reading config {}: {}", path, e);
            process::exit(1);
        });
        let config: Config = serde_json::from_str(&text).unwrap_or_else(|e| {
            eprintln!("Error parsing config {}: {}", path, e);
            process::exit(1);
        });
        repl.apply_config(&config);
    }

    if let Some(path) = cli.script {
        let text = fs::read_to_string(&path).unwrap_or_else(|e| {
            eprintln!("Error reading script {}: {}", path, e);
            process::exit(1);
        });
        for line in text.lines() {
            if repl.process_line(line) == Control::Exit {
                break;
            }
        }
        return;
    }

    repl::print_welcome();

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        if repl.process_line(line.trim_end()) == Control::Exit {
            break;
        }
    }
}
