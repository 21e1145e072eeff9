//! Simulator: owns the pipeline, its reference collaborators, and the run loop.
//!
//! The run loop is the only bound on a starved pipeline; the core itself never
//! aborts. It stops at the configured cycle limit or, when `general.halt_on_trap`
//! is set, at the first trap.

use std::path::Path;

use tracing::info;

use crate::common::constants::STATUS_UPDATE_INTERVAL;
use crate::common::error::{SimError, Trap};
use crate::config::Config;
use crate::core::pipeline::{PipelineSequencer, TickInputs, TickReport};
use crate::core::units::coproc::CoprocessorBank;
use crate::sim::loader::{self, Program};
use crate::soc::memory::Memory;
use crate::stats::SimStats;

/// Why [`Simulator::run`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitReason {
    /// A trap was taken and `halt_on_trap` is set.
    Trap(Trap),
    /// `general.max_cycles` cycles elapsed.
    CycleLimit,
}

/// Top-level simulator: pipeline plus reference memories and coprocessors.
#[derive(Debug)]
pub struct Simulator {
    pipeline: PipelineSequencer,
    config: Config,
}

impl Simulator {
    /// Builds a simulator with `program` placed in both the instruction and data
    /// memories. An ELF entry point replaces `pipeline.reset_pc`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError`] if the configuration is invalid or the image does not fit.
    pub fn new(mut config: Config, program: &Program) -> Result<Self, SimError> {
        config.validate()?;
        if let Some(entry) = program.entry {
            config.pipeline.reset_pc = entry;
        }

        let mut imem = Memory::new(config.memory.size_bytes, config.memory.fetch_latency);
        let mut dmem = Memory::new(config.memory.size_bytes, config.memory.data_latency);
        program.load_into(&mut imem)?;
        program.load_into(&mut dmem)?;

        let pipeline = PipelineSequencer::new(
            &config,
            Box::new(imem),
            Box::new(dmem),
            CoprocessorBank::reference(config.coprocessors.latency),
        );
        Ok(Self { pipeline, config })
    }

    /// Loads a program file and builds a simulator for it.
    ///
    /// # Errors
    ///
    /// Returns [`SimError`] if the file cannot be loaded or the configuration is invalid.
    pub fn from_file(config: Config, path: &Path, force_elf: bool) -> Result<Self, SimError> {
        let program = loader::load_program(path, force_elf, config.pipeline.reset_pc)?;
        Self::new(config, &program)
    }

    /// Advances the pipeline by one cycle.
    pub fn tick(&mut self, inputs: TickInputs) -> TickReport {
        self.pipeline.tick(inputs)
    }

    /// Runs with quiet inputs until a stop condition.
    ///
    /// # Returns
    ///
    /// The reason the loop stopped.
    pub fn run(&mut self) -> ExitReason {
        while self.pipeline.cycles() < self.config.general.max_cycles {
            let report = self.pipeline.tick(TickInputs::default());

            if let Some(trap) = report.trap.filter(|_| self.config.general.halt_on_trap) {
                info!(cycle = report.cycle, "halted on {trap}");
                return ExitReason::Trap(trap);
            }
            if (report.cycle + 1) % STATUS_UPDATE_INTERVAL == 0 {
                info!(
                    cycles = report.cycle + 1,
                    retired = self.pipeline.stats().instructions_retired,
                    pc = %format_args!("{:#010x}", report.pc_after),
                    "status"
                );
            }
        }
        info!(cycles = self.pipeline.cycles(), "cycle limit reached");
        ExitReason::CycleLimit
    }

    /// The pipeline being simulated.
    pub const fn pipeline(&self) -> &PipelineSequencer {
        &self.pipeline
    }

    /// Statistics of the run so far.
    pub const fn stats(&self) -> &SimStats {
        self.pipeline.stats()
    }

    /// The effective configuration (after an ELF entry override).
    pub const fn config(&self) -> &Config {
        &self.config
    }
}
