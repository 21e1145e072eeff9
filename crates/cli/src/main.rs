//! RV32 pipeline model CLI.
//!
//! This binary drives the pipeline model from the command line. It performs:
//! 1. **Configuration:** Reads an optional JSON config and applies command-line overrides.
//! 2. **Loading:** Places a raw binary or an ELF32 image in the reference memories.
//! 3. **Run:** Clocks the pipeline until a trap or the cycle limit, then prints statistics.
//!
//! Logging goes through `tracing`; set `RUST_LOG=rvpipe_core=debug` for per-cycle traces.

use std::path::{Path, PathBuf};
use std::process;

use clap::builder::PossibleValuesParser;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rvpipe_core::common::error::SimError;
use rvpipe_core::config::Config;
use rvpipe_core::sim::{ExitReason, Simulator};
use rvpipe_core::stats::STATS_SECTIONS;

#[derive(Parser, Debug)]
#[command(
    name = "rvpipe",
    author,
    version,
    about = "Cycle-level RV32 pipeline control-path model",
    long_about = "Run a program on the five-stage pipeline model and report hazard, flush, and coprocessor statistics.\n\nExamples:\n  rvpipe run -f software/sum.bin\n  rvpipe run -f software/sum.elf --elf --config configs/slow_fpu.json\n  RUST_LOG=rvpipe_core=debug rvpipe run -f software/sum.bin --max-cycles 200"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a program until it traps or reaches the cycle limit.
    Run {
        /// Program to execute (raw binary, or ELF32 when it carries the ELF magic).
        #[arg(short, long)]
        file: PathBuf,

        /// JSON configuration file; omitted fields keep their defaults.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override `general.max_cycles`.
        #[arg(long)]
        max_cycles: Option<u64>,

        /// Parse the program as ELF even without the magic number.
        #[arg(long)]
        elf: bool,

        /// Statistics sections to print (default: all).
        #[arg(
            long,
            value_delimiter = ',',
            value_parser = PossibleValuesParser::new(STATS_SECTIONS.iter().copied())
        )]
        stats: Vec<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run {
            file,
            config,
            max_cycles,
            elf,
            stats,
        } => cmd_run(&file, config.as_deref(), max_cycles, elf, &stats),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

/// Reads the configuration file, or returns the defaults.
fn load_config(path: Option<&Path>) -> Result<Config, SimError> {
    path.map_or_else(|| Ok(Config::default()), |p| Ok(Config::from_file(p)?))
}

/// Loads the program, runs it, and prints the final state and statistics.
fn cmd_run(
    file: &Path,
    config: Option<&Path>,
    max_cycles: Option<u64>,
    elf: bool,
    stats: &[String],
) -> Result<(), SimError> {
    let mut config = load_config(config)?;
    if let Some(limit) = max_cycles {
        config.general.max_cycles = limit;
    }

    println!("[*] Program: {}", file.display());
    println!(
        "    Reset PC: {:#010x}  Forwarding: {}  CP latency: {:?}",
        config.pipeline.reset_pc, config.pipeline.forwarding, config.coprocessors.latency
    );

    let mut sim = Simulator::from_file(config, file, elf)?;
    match sim.run() {
        ExitReason::Trap(trap) => println!("\n[*] Halted: {trap}"),
        ExitReason::CycleLimit => println!("\n[*] Cycle limit reached"),
    }

    println!();
    sim.pipeline().regs().dump();
    sim.stats().print_sections(stats);
    Ok(())
}
