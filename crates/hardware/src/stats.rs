//! Simulation statistics collection and reporting.
//!
//! This module tracks the control-path metrics of a run. It provides:
//! 1. **Cycle and IPC:** Total cycles, retired instructions, and derived metrics (CPI, IPC).
//! 2. **Instruction mix:** Counts by category (ALU, load, store, branch, system, coprocessor).
//! 3. **Stalls and flushes:** Cycles per stall reason and events per flush reason.
//! 4. **Forwarding:** Operands bypassed from EX and MEM.
//! 5. **Coprocessors:** Issue cycles per unit and traps taken.

use std::time::Instant;

use crate::core::pipeline::hazards::ForwardSource;
use crate::core::pipeline::reasons::{FlushReason, StallReason};
use crate::core::pipeline::sequencer::TickReport;
use crate::core::units::coproc::NUM_COPROCESSORS;

/// Simulation statistics structure tracking all control-path metrics.
#[derive(Clone, Debug)]
pub struct SimStats {
    start_time: Instant,
    /// Total simulated cycles.
    pub cycles: u64,
    /// Number of instructions retired from WB.
    pub instructions_retired: u64,

    /// Count of load instructions retired.
    pub inst_load: u64,
    /// Count of store instructions retired.
    pub inst_store: u64,
    /// Count of branch/jump instructions retired.
    pub inst_branch: u64,
    /// Count of integer ALU instructions retired.
    pub inst_alu: u64,
    /// Count of SYSTEM instructions retired.
    pub inst_system: u64,
    /// Count of CP1-CP3 instructions retired.
    pub inst_coprocessor: u64,

    /// Cycles stalled on a RAW hazard with forwarding disabled.
    pub stalls_raw: u64,
    /// Cycles stalled on a load-use hazard.
    pub stalls_load_use: u64,
    /// Cycles stalled waiting for a coprocessor.
    pub stalls_coprocessor: u64,
    /// Cycles stalled waiting for a memory port.
    pub stalls_memory: u64,
    /// Cycles stalled by the environment.
    pub stalls_external: u64,

    /// Flushes caused by taken branches and jumps.
    pub flushes_branch: u64,
    /// Flushes caused by coprocessor exceptions.
    pub flushes_exception: u64,
    /// Flushes caused by interrupts.
    pub flushes_interrupt: u64,

    /// Operands forwarded from the EX result.
    pub forwards_ex: u64,
    /// Operands forwarded from the MEM ALU result.
    pub forwards_mem_alu: u64,
    /// Operands forwarded from MEM load data.
    pub forwards_mem_load: u64,

    /// Cycles a request was presented to each coprocessor.
    pub coprocessor_issues: [u64; NUM_COPROCESSORS],

    /// Number of traps (exceptions or interrupts) taken.
    pub traps_taken: u64,
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            instructions_retired: 0,
            inst_load: 0,
            inst_store: 0,
            inst_branch: 0,
            inst_alu: 0,
            inst_system: 0,
            inst_coprocessor: 0,
            stalls_raw: 0,
            stalls_load_use: 0,
            stalls_coprocessor: 0,
            stalls_memory: 0,
            stalls_external: 0,
            flushes_branch: 0,
            flushes_exception: 0,
            flushes_interrupt: 0,
            forwards_ex: 0,
            forwards_mem_alu: 0,
            forwards_mem_load: 0,
            coprocessor_issues: [0; NUM_COPROCESSORS],
            traps_taken: 0,
        }
    }
}

/// Section names for selective stats output.
///
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "hazards", "instruction_mix", "coprocessors"];

impl SimStats {
    /// Accumulates one cycle's report.
    pub fn record(&mut self, report: &TickReport) {
        self.cycles += 1;

        for reason in report.stalls.iter() {
            let counter = match reason {
                StallReason::RawHazard => &mut self.stalls_raw,
                StallReason::LoadUseHazard => &mut self.stalls_load_use,
                StallReason::CoprocessorNotReady => &mut self.stalls_coprocessor,
                StallReason::MemoryNotReady => &mut self.stalls_memory,
                StallReason::ExternalStall => &mut self.stalls_external,
            };
            *counter += 1;
        }
        for reason in report.flushes.iter() {
            let counter = match reason {
                FlushReason::BranchMispredict => &mut self.flushes_branch,
                FlushReason::Exception => &mut self.flushes_exception,
                FlushReason::Interrupt => &mut self.flushes_interrupt,
            };
            *counter += 1;
        }

        for source in [report.forward_rs1, report.forward_rs2] {
            match source {
                ForwardSource::ExResult => self.forwards_ex += 1,
                ForwardSource::MemAlu => self.forwards_mem_alu += 1,
                ForwardSource::MemLoad => self.forwards_mem_load += 1,
                ForwardSource::RegFile => {}
            }
        }

        if let Some(slot) = report.dispatch.cp_select.filter(|_| report.dispatch.cp_valid) {
            self.coprocessor_issues[slot.index()] += 1;
        }

        if report.trap.is_some() {
            self.traps_taken += 1;
        }

        if let Some(retired) = &report.retired {
            self.instructions_retired += 1;
            let ctrl = &retired.ctrl;
            if retired.coprocessor.is_some() && !ctrl.system {
                self.inst_coprocessor += 1;
            } else if ctrl.system {
                self.inst_system += 1;
            } else if ctrl.mem_read {
                self.inst_load += 1;
            } else if ctrl.mem_write {
                self.inst_store += 1;
            } else if ctrl.is_control_transfer() {
                self.inst_branch += 1;
            } else {
                self.inst_alu += 1;
            }
        }
    }

    /// Cycles per retired instruction (0 before anything retires).
    pub fn cpi(&self) -> f64 {
        if self.instructions_retired == 0 {
            0.0
        } else {
            self.cycles as f64 / self.instructions_retired as f64
        }
    }

    /// Retired instructions per cycle.
    pub fn ipc(&self) -> f64 {
        if self.cycles == 0 {
            0.0
        } else {
            self.instructions_retired as f64 / self.cycles as f64
        }
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// Each element of `sections` should be one of [`STATS_SECTIONS`]. Pass an empty
    /// slice to print all sections (same as `print()`).
    pub fn print_sections(&self, sections: &[String]) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let seconds = self.start_time.elapsed().as_secs_f64();
        let cyc = self.cycles.max(1) as f64;
        let instr = self.instructions_retired.max(1) as f64;
        let pct = |n: u64, of: f64| (n as f64 / of) * 100.0;

        println!("\n==========================================================");
        println!("RV32 PIPELINE CONTROL-PATH STATISTICS");
        println!("==========================================================");
        if want("summary") {
            println!("host_seconds             {seconds:.4} s");
            println!("sim_cycles               {}", self.cycles);
            println!("sim_insts                {}", self.instructions_retired);
            println!("sim_ipc                  {:.4}", self.ipc());
            println!("sim_cpi                  {:.4}", self.cpi());
            println!("traps_taken              {}", self.traps_taken);
            println!("----------------------------------------------------------");
        }
        if want("hazards") {
            println!("STALLS AND FLUSHES");
            for (name, n) in [
                ("stalls.raw", self.stalls_raw),
                ("stalls.load_use", self.stalls_load_use),
                ("stalls.coprocessor", self.stalls_coprocessor),
                ("stalls.memory", self.stalls_memory),
                ("stalls.external", self.stalls_external),
            ] {
                println!("  {name:<22} {n} ({:.2}%)", pct(n, cyc));
            }
            println!("  flush.branch           {}", self.flushes_branch);
            println!("  flush.exception        {}", self.flushes_exception);
            println!("  flush.interrupt        {}", self.flushes_interrupt);
            println!("  forward.ex             {}", self.forwards_ex);
            println!("  forward.mem_alu        {}", self.forwards_mem_alu);
            println!("  forward.mem_load       {}", self.forwards_mem_load);
            println!("----------------------------------------------------------");
        }
        if want("instruction_mix") {
            println!("INSTRUCTION MIX");
            for (name, n) in [
                ("op.alu", self.inst_alu),
                ("op.load", self.inst_load),
                ("op.store", self.inst_store),
                ("op.branch", self.inst_branch),
                ("op.system", self.inst_system),
                ("op.coprocessor", self.inst_coprocessor),
            ] {
                println!("  {name:<22} {n} ({:.2}%)", pct(n, instr));
            }
            println!("----------------------------------------------------------");
        }
        if want("coprocessors") {
            println!("COPROCESSOR ISSUE CYCLES");
            for (i, n) in self.coprocessor_issues.iter().enumerate() {
                println!("  cp{i}.issue              {n}");
            }
        }
        println!("==========================================================");
    }

    /// Prints all statistics sections to stdout.
    ///
    /// Equivalent to `print_sections(&[])`.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
