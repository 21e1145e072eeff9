//! Pipeline control signals and operation types.
//!
//! This module defines the bundle the decoder produces for every instruction. It performs:
//! 1. **Operation Classification:** Selects the reference ALU operation.
//! 2. **Operand Selection:** Chooses between a register and the immediate for operand B.
//! 3. **Control Flow Marking:** Flags branches, jumps, and SYSTEM instructions.
//!
//! The all-zero bundle (`ControlSignals::default()`) is a bubble: it writes nothing,
//! accesses no memory, and redirects nothing.

pub use crate::isa::decode::ImmType;

/// ALU operation types for the integer datapath.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AluOp {
    /// Addition (also address generation and the zero bundle's value).
    #[default]
    Add,

    /// Integer subtraction.
    Sub,

    /// Shift left logical.
    Sll,

    /// Set less than (signed).
    Slt,

    /// Set less than unsigned.
    Sltu,

    /// Bitwise XOR.
    Xor,

    /// Shift right logical.
    Srl,

    /// Shift right arithmetic.
    Sra,

    /// Bitwise OR.
    Or,

    /// Bitwise AND.
    And,

    /// Pass operand B through (LUI).
    CopyB,
}

/// Control signals for pipeline stage execution.
///
/// Contains all signals generated during instruction decode that control execution
/// and memory access throughout the pipeline stages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ControlSignals {
    /// Enable write to the integer destination register.
    pub reg_write: bool,
    /// Enable memory read operation (load).
    pub mem_read: bool,
    /// Enable memory write operation (store).
    pub mem_write: bool,
    /// ALU operand B comes from the immediate rather than `rs2`.
    pub alu_src: bool,
    /// Instruction is a conditional branch.
    pub branch: bool,
    /// Instruction is `JAL`.
    pub jump: bool,
    /// Instruction is `JALR`.
    pub jalr: bool,
    /// Instruction is `LUI`.
    pub lui: bool,
    /// Instruction is `AUIPC` (operand A is the PC).
    pub auipc: bool,
    /// Instruction is a SYSTEM-opcode instruction.
    pub system: bool,
    /// Immediate format to extract.
    pub imm_type: ImmType,
    /// ALU operation to perform.
    pub alu_op: AluOp,
}

impl ControlSignals {
    /// Returns `true` if this bundle redirects control flow when resolved.
    pub const fn is_control_transfer(&self) -> bool {
        self.branch || self.jump || self.jalr
    }
}
