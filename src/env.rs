//! Raw x87 environment image as stored by `FNSAVE`.

/// Size in bytes of the `FNSAVE` image with a 32-bit operand size: a 28-byte
/// environment header followed by eight 10-byte register slots.
pub const FSAVE_IMAGE_SIZE: usize = 108;

/// One 80-bit extended-precision register image.
pub type RawExtended = [u8; 10];

/// The x87 environment captured at snapshot time.
///
/// This is an opaque reinterpretation of the saved bytes. Nothing is
/// validated on capture; every bit pattern of every field is a legal input
/// to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEnvironment {
    pub control: u16,
    pub status: u16,
    pub tag: u16,
    /// Offset of the last executed non-control FPU instruction.
    pub instruction_offset: u32,
    pub instruction_selector: u16,
    /// Low 11 bits of the last non-control opcode.
    pub opcode: u16,
    /// Offset of the last memory operand, if any.
    pub operand_offset: u32,
    pub operand_selector: u16,
    /// Register images in physical order (R0..R7), not stack order.
    pub registers: [RawExtended; 8],
}

impl RawEnvironment {
    /// Split a 108-byte `FNSAVE` image into its fields.
    ///
    /// Offsets follow the 32-bit protected-mode layout: the seven
    /// environment words sit at a 4-byte stride (the upper half of each
    /// dword is reserved), and the register file starts at offset 28.
    ///
    /// `FNSAVE` stores the register file in stack order (ST0 first), while
    /// `registers` is physical order, so the slots are de-rotated by the
    /// TOP field of the saved status word.
    pub fn from_fsave_image(image: &[u8; FSAVE_IMAGE_SIZE]) -> Self {
        let u16_at = |off: usize| u16::from_le_bytes(image[off..off + 2].try_into().unwrap());
        let u32_at = |off: usize| u32::from_le_bytes(image[off..off + 4].try_into().unwrap());

        let top = ((u16_at(4) >> 11) & 0b111) as usize;
        let mut registers = [[0u8; 10]; 8];
        for slot in 0..8 {
            let start = 28 + slot * 10;
            registers[(slot + top) & 7].copy_from_slice(&image[start..start + 10]);
        }

        Self {
            control: u16_at(0),
            status: u16_at(4),
            tag: u16_at(8),
            instruction_offset: u32_at(12),
            instruction_selector: u16_at(16),
            opcode: u16_at(18),
            operand_offset: u32_at(20),
            operand_selector: u16_at(24),
            registers,
        }
    }

    /// Reassemble the 108-byte `FNSAVE` image, suitable for `FRSTOR`.
    ///
    /// The inverse of [`Self::from_fsave_image`]: physical registers are
    /// rotated back into the stack-ordered slots `FRSTOR` expects. Reserved
    /// bytes are written as zero; `FRSTOR` ignores them.
    pub fn to_fsave_image(&self) -> [u8; FSAVE_IMAGE_SIZE] {
        let mut out = [0u8; FSAVE_IMAGE_SIZE];
        out[0..2].copy_from_slice(&self.control.to_le_bytes());
        out[4..6].copy_from_slice(&self.status.to_le_bytes());
        out[8..10].copy_from_slice(&self.tag.to_le_bytes());
        out[12..16].copy_from_slice(&self.instruction_offset.to_le_bytes());
        out[16..18].copy_from_slice(&self.instruction_selector.to_le_bytes());
        out[18..20].copy_from_slice(&self.opcode.to_le_bytes());
        out[20..24].copy_from_slice(&self.operand_offset.to_le_bytes());
        out[24..26].copy_from_slice(&self.operand_selector.to_le_bytes());
        let top = ((self.status >> 11) & 0b111) as usize;
        for slot in 0..8 {
            let start = 28 + slot * 10;
            out[start..start + 10].copy_from_slice(&self.registers[(slot + top) & 7]);
        }
        out
    }
}

impl Default for RawEnvironment {
    /// The post-`FNINIT` environment: default control word, empty stack.
    fn default() -> Self {
        Self {
            control: 0x037F,
            status: 0,
            tag: 0xFFFF,
            instruction_offset: 0,
            instruction_selector: 0,
            opcode: 0,
            operand_offset: 0,
            operand_selector: 0,
            registers: [[0u8; 10]; 8],
        }
    }
}
