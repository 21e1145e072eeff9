//! System Coprocessor (CP0).
//!
//! Reference unit for the SYSTEM opcode. It performs the following:
//! 1. **CSR Access:** `CSRRW`/`CSRRS`/`CSRRC` and their immediate forms over a small
//!    machine-mode CSR file.
//! 2. **Counters:** Read-only `cycle` and `instret`, advanced by the clock and by
//!    retirement notices.
//! 3. **Exceptions:** Every `funct3 == 0` encoding (ECALL, EBREAK, xRET, WFI, fences),
//!    the reserved `funct3 == 4`, unimplemented CSRs, and writes to read-only CSRs
//!    raise the exception line.
//!
//! The unit always answers in the cycle it is addressed.

use crate::common::error::Trap;
use crate::core::units::coproc::{Coprocessor, CoprocessorRequest, CoprocessorResponse};
use crate::isa::instruction::InstructionBits;
use crate::isa::privileged::csr;
use crate::isa::privileged::opcodes as sys_op;

/// Reserved SYSTEM `funct3` encoding.
const FUNCT3_RESERVED: u32 = 0b100;

/// CSR file and counters of the system coprocessor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SystemUnit {
    mstatus: u32,
    mtvec: u32,
    mscratch: u32,
    mepc: u32,
    mcause: u32,
    cycle: u32,
    instret: u32,
}

impl SystemUnit {
    /// Creates a unit with every CSR cleared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a CSR.
    ///
    /// # Returns
    ///
    /// `None` if `addr` is not implemented.
    pub const fn read_csr(&self, addr: u32) -> Option<u32> {
        match addr {
            csr::MSTATUS => Some(self.mstatus),
            csr::MTVEC => Some(self.mtvec),
            csr::MSCRATCH => Some(self.mscratch),
            csr::MEPC => Some(self.mepc),
            csr::MCAUSE => Some(self.mcause),
            csr::CYCLE => Some(self.cycle),
            csr::INSTRET => Some(self.instret),
            _ => None,
        }
    }

    /// Writes a writable CSR. Returns `false` for read-only or unimplemented addresses.
    const fn write_csr(&mut self, addr: u32, val: u32) -> bool {
        let slot = match addr {
            csr::MSTATUS => &mut self.mstatus,
            csr::MTVEC => &mut self.mtvec,
            csr::MSCRATCH => &mut self.mscratch,
            csr::MEPC => &mut self.mepc,
            csr::MCAUSE => &mut self.mcause,
            _ => return false,
        };
        *slot = val;
        true
    }

    fn execute(&mut self, req: &CoprocessorRequest) -> CoprocessorResponse {
        let inst = req.instruction;
        let f3 = inst.funct3();
        if f3 == sys_op::PRIV || f3 == FUNCT3_RESERVED {
            return raise();
        }

        let addr = inst.csr();
        let Some(old) = self.read_csr(addr) else {
            return raise();
        };

        let zimm = inst.rs1() as u32;
        let (src, op) = match f3 {
            sys_op::CSRRW | sys_op::CSRRS | sys_op::CSRRC => (req.operand_a, f3),
            // Immediate forms share the low two funct3 bits with their register forms.
            _ => (zimm, f3 & 0b011),
        };
        let writes = op == sys_op::CSRRW || inst.rs1() != 0;

        if writes {
            if csr::is_read_only(addr) {
                return raise();
            }
            let new = match op {
                sys_op::CSRRW => src,
                sys_op::CSRRS => old | src,
                _ => old & !src,
            };
            if !self.write_csr(addr, new) {
                return raise();
            }
        }

        CoprocessorResponse {
            ready: true,
            data_out: old,
            exception: false,
        }
    }
}

/// Exception response: ready, no data.
const fn raise() -> CoprocessorResponse {
    CoprocessorResponse {
        ready: true,
        data_out: 0,
        exception: true,
    }
}

impl Coprocessor for SystemUnit {
    fn respond(&mut self, req: &CoprocessorRequest) -> CoprocessorResponse {
        self.cycle = self.cycle.wrapping_add(1);
        if req.valid {
            self.execute(req)
        } else {
            CoprocessorResponse {
                ready: true,
                ..CoprocessorResponse::default()
            }
        }
    }

    fn name(&self) -> &str {
        "system"
    }

    fn retired(&mut self) {
        self.instret = self.instret.wrapping_add(1);
    }

    fn trap_taken(&mut self, trap: &Trap) {
        self.mepc = trap.pc;
        self.mcause = trap.cause.mcause();
    }
}
