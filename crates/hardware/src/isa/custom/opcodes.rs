//! Custom Opcodes.

/// First custom opcode space (custom-0), routed to CP2.
pub const OP_CUSTOM_0: u32 = 0b0001011;

/// Second custom opcode space (custom-1), routed to CP3.
pub const OP_CUSTOM_1: u32 = 0b0101011;
