//! Fixed-Latency Coprocessor.
//!
//! Reference model for CP1-CP3: an opaque unit that asserts `ready` a configured number
//! of cycles after a request first appears. It performs the following:
//! 1. **Timing:** Counts consecutive cycles of the same request; `latency == 1` answers
//!    in the cycle of issue.
//! 2. **Abort/Pause:** A trap, or a request that differs from the one in flight, abandons
//!    the partial operation; a re-issue starts from zero. A dropped `valid` pauses the count.
//! 3. **Computation:** Delegates the result to a pluggable operation function.

use tracing::trace;

use crate::common::error::Trap;
use crate::core::units::coproc::{Coprocessor, CoprocessorRequest, CoprocessorResponse};
use crate::isa::instruction::InstructionBits;
use crate::isa::rv32f::funct7 as fp_funct7;

/// Result of a coprocessor operation: `Some(data)` or `None` to raise an exception.
pub type Operation = fn(&CoprocessorRequest) -> Option<u32>;

/// Operation key for the request currently in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct InFlight {
    instruction: u32,
    operand_a: u32,
    operand_b: u32,
    elapsed: u32,
}

/// A coprocessor with a fixed latency and a pluggable operation.
#[derive(Clone, Debug)]
pub struct LatencyUnit {
    name: &'static str,
    latency: u32,
    op: Operation,
    in_flight: Option<InFlight>,
}

impl LatencyUnit {
    /// Creates a unit.
    ///
    /// # Arguments
    ///
    /// * `name` - Trace name.
    /// * `latency` - Cycles from first request to `ready` (values below 1 act as 1).
    /// * `op` - Computes the result when the unit completes.
    pub fn new(name: &'static str, latency: u32, op: Operation) -> Self {
        Self {
            name,
            latency: latency.max(1),
            op,
            in_flight: None,
        }
    }

    /// Single-precision arithmetic unit (FADD.S, FSUB.S, FMUL.S, FDIV.S on `f32` bit
    /// patterns). Any other `funct7` raises an exception.
    pub fn single_precision(latency: u32) -> Self {
        Self::new("fpu", latency, fp_single)
    }

    /// Unit that returns operand A unchanged.
    pub fn passthrough(name: &'static str, latency: u32) -> Self {
        Self::new(name, latency, |req| Some(req.operand_a))
    }

    /// Configured latency in cycles.
    pub const fn latency(&self) -> u32 {
        self.latency
    }

    /// Returns `true` while an operation has been started but not completed.
    pub const fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }
}

impl Coprocessor for LatencyUnit {
    fn respond(&mut self, req: &CoprocessorRequest) -> CoprocessorResponse {
        if !req.valid {
            return CoprocessorResponse {
                ready: self.in_flight.is_none(),
                ..CoprocessorResponse::default()
            };
        }

        let same = self.in_flight.is_some_and(|f| {
            f.instruction == req.instruction
                && f.operand_a == req.operand_a
                && f.operand_b == req.operand_b
        });
        let elapsed = match self.in_flight {
            Some(f) if same => f.elapsed + 1,
            _ => 1,
        };

        if elapsed < self.latency {
            self.in_flight = Some(InFlight {
                instruction: req.instruction,
                operand_a: req.operand_a,
                operand_b: req.operand_b,
                elapsed,
            });
            return CoprocessorResponse::default();
        }

        self.in_flight = None;
        match (self.op)(req) {
            Some(data_out) => CoprocessorResponse {
                ready: true,
                data_out,
                exception: false,
            },
            None => CoprocessorResponse {
                ready: true,
                data_out: 0,
                exception: true,
            },
        }
    }

    fn name(&self) -> &str {
        self.name
    }

    fn trap_taken(&mut self, _trap: &Trap) {
        if let Some(f) = self.in_flight.take() {
            trace!(unit = self.name, elapsed = f.elapsed, "operation aborted by trap");
        }
    }
}

/// Basic single-precision arithmetic on raw `f32` bit patterns.
fn fp_single(req: &CoprocessorRequest) -> Option<u32> {
    let a = f32::from_bits(req.operand_a);
    let b = f32::from_bits(req.operand_b);
    let r = match req.instruction.funct7() {
        fp_funct7::FADD_S => a + b,
        fp_funct7::FSUB_S => a - b,
        fp_funct7::FMUL_S => a * b,
        fp_funct7::FDIV_S => a / b,
        _ => return None,
    };
    Some(r.to_bits())
}
