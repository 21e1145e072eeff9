//! RISC-V Immediate Decoder.
//!
//! This module extracts the sign-extended immediate for every RV32I instruction
//! format (I, S, B, U, J); R-type carries none.
//!
//! Every extractor takes the full 32-bit instruction word and returns an `i32`;
//! the doc comment of each states how many immediate bits it reassembles and the
//! bit from which it sign-extends.

/// Total width of a RISC-V instruction in bits.
const INSTRUCTION_WIDTH: u32 = 32;

/// Bit shift for extracting I-Type immediate field (bits 20-31).
///
/// I-Type format: `imm[11:0] | rs1 | funct3 | rd | opcode`
const I_IMM_SHIFT: u32 = 20;

/// Bit shift for extracting S-Type immediate low field (bits 7-11).
///
/// S-Type format: `imm[11:5] | rs2 | rs1 | funct3 | imm[4:0] | opcode`
const S_IMM_LOW_SHIFT: u32 = 7;

/// Bit mask for S-Type immediate low field (5 bits: imm[4:0]).
const S_IMM_LOW_MASK: u32 = 0x1F;

/// Bit shift for extracting S-Type immediate high field (bits 25-31).
const S_IMM_HIGH_SHIFT: u32 = 25;

/// Bit mask for S-Type immediate high field (7 bits: imm[11:5]).
const S_IMM_HIGH_MASK: u32 = 0x7F;

/// Bit shift for combining S-Type immediate fields after extraction.
const S_IMM_COMBINED_SHIFT: u32 = 5;

/// Total number of bits in S-Type immediate (12 bits).
const S_IMM_BITS: u32 = 12;

/// B-Type: `imm[12] | imm[10:5] | rs2 | rs1 | funct3 | imm[4:1] | imm[11] | opcode`
const B_IMM_11_SHIFT: u32 = 7;
const B_IMM_4_1_SHIFT: u32 = 8;
const B_IMM_4_1_MASK: u32 = 0xF;
const B_IMM_10_5_SHIFT: u32 = 25;
const B_IMM_10_5_MASK: u32 = 0x3F;
const B_IMM_12_SHIFT: u32 = 31;

/// Total number of bits in B-Type immediate (13 bits, sign-extended).
const B_IMM_BITS: u32 = 13;

const B_IMM_12_POS: u32 = 12;
const B_IMM_11_POS: u32 = 11;
const B_IMM_10_5_POS: u32 = 5;
const B_IMM_4_1_POS: u32 = 1;

/// Bit mask for extracting U-Type immediate field (bits 12-31).
///
/// U-Type format: `imm[31:12] | rd | opcode`
const U_IMM_MASK: u32 = 0xFFFF_F000;

/// J-Type: `imm[20] | imm[10:1] | imm[11] | imm[19:12] | rd | opcode`
const J_IMM_19_12_SHIFT: u32 = 12;
const J_IMM_19_12_MASK: u32 = 0xFF;
const J_IMM_11_SHIFT: u32 = 20;
const J_IMM_10_1_SHIFT: u32 = 21;
const J_IMM_10_1_MASK: u32 = 0x3FF;
const J_IMM_20_SHIFT: u32 = 31;

/// Total number of bits in J-Type immediate (21 bits, sign-extended).
const J_IMM_BITS: u32 = 21;

const J_IMM_20_POS: u32 = 20;
const J_IMM_19_12_POS: u32 = 12;
const J_IMM_11_POS: u32 = 11;
const J_IMM_10_1_POS: u32 = 1;

/// Immediate format selector carried in the control bundle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ImmType {
    /// No immediate (R-type or unrecognised).
    #[default]
    None,
    /// 12-bit I-type immediate.
    I,
    /// 12-bit S-type immediate.
    S,
    /// 13-bit B-type branch offset.
    B,
    /// 20-bit U-type upper immediate.
    U,
    /// 21-bit J-type jump offset.
    J,
}

/// Extracts the immediate selected by `imm_type`, or 0 for [`ImmType::None`].
pub fn immediate(inst: u32, imm_type: ImmType) -> i32 {
    match imm_type {
        ImmType::None => 0,
        ImmType::I => i_imm(inst),
        ImmType::S => s_imm(inst),
        ImmType::B => b_imm(inst),
        ImmType::U => u_imm(inst),
        ImmType::J => j_imm(inst),
    }
}

/// I-Type immediate: 12 bits from `inst[31:20]`, sign-extended from bit 11.
///
/// Used for loads, JALR, immediate arithmetic and CSR addresses.
pub const fn i_imm(inst: u32) -> i32 {
    (inst as i32) >> I_IMM_SHIFT
}

/// S-Type immediate: 12 bits from `inst[31:25] ++ inst[11:7]`, sign-extended from bit 11.
pub const fn s_imm(inst: u32) -> i32 {
    let low = (inst >> S_IMM_LOW_SHIFT) & S_IMM_LOW_MASK;
    let high = (inst >> S_IMM_HIGH_SHIFT) & S_IMM_HIGH_MASK;
    let combined = (high << S_IMM_COMBINED_SHIFT) | low;
    sign_extend(combined, S_IMM_BITS)
}

/// B-Type immediate: 13 bits from `inst[31] ++ inst[7] ++ inst[30:25] ++ inst[11:8] ++ 0`,
/// sign-extended from bit 12. Always even.
pub const fn b_imm(inst: u32) -> i32 {
    let bit_11 = (inst >> B_IMM_11_SHIFT) & 1;
    let bits_4_1 = (inst >> B_IMM_4_1_SHIFT) & B_IMM_4_1_MASK;
    let bits_10_5 = (inst >> B_IMM_10_5_SHIFT) & B_IMM_10_5_MASK;
    let bit_12 = (inst >> B_IMM_12_SHIFT) & 1;

    let combined = (bit_12 << B_IMM_12_POS)
        | (bit_11 << B_IMM_11_POS)
        | (bits_10_5 << B_IMM_10_5_POS)
        | (bits_4_1 << B_IMM_4_1_POS);
    sign_extend(combined, B_IMM_BITS)
}

/// U-Type immediate: `inst[31:12] << 12`. Already 32 bits wide, so no extension.
pub const fn u_imm(inst: u32) -> i32 {
    (inst & U_IMM_MASK) as i32
}

/// J-Type immediate: 21 bits from `inst[31] ++ inst[19:12] ++ inst[20] ++ inst[30:21] ++ 0`,
/// sign-extended from bit 20. Always even.
pub const fn j_imm(inst: u32) -> i32 {
    let bits_19_12 = (inst >> J_IMM_19_12_SHIFT) & J_IMM_19_12_MASK;
    let bit_11 = (inst >> J_IMM_11_SHIFT) & 1;
    let bits_10_1 = (inst >> J_IMM_10_1_SHIFT) & J_IMM_10_1_MASK;
    let bit_20 = (inst >> J_IMM_20_SHIFT) & 1;

    let combined = (bit_20 << J_IMM_20_POS)
        | (bits_19_12 << J_IMM_19_12_POS)
        | (bit_11 << J_IMM_11_POS)
        | (bits_10_1 << J_IMM_10_1_POS);
    sign_extend(combined, J_IMM_BITS)
}

/// Sign extends the low `bits` bits of `val` to a 32-bit signed integer.
///
/// # Arguments
///
/// * `val` - The value to extend; bits above `bits` are ignored.
/// * `bits` - The number of valid bits in `val` (1..=32).
const fn sign_extend(val: u32, bits: u32) -> i32 {
    let shift = INSTRUCTION_WIDTH - bits;
    ((val << shift) as i32) >> shift
}
