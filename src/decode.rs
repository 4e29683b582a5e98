//! Decoders for the packed control, status and tag words.
//!
//! Every function here is total: all 16-bit inputs are legal and decode to a
//! defined value, including the reserved precision-control encoding and the
//! condition-code combinations the architecture leaves undefined for
//! comparisons. Decoding allocates nothing and keeps no state between calls.

use crate::env::RawEnvironment;
use crate::ext80;

fn bit(word: u16, n: u16) -> bool {
    (word >> n) & 1 != 0
}

/// Precision-control field of the control word (bits 8-9).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrecisionControl {
    /// 24-bit significand.
    Single,
    /// Encoding `0b01`, reserved by the architecture.
    Reserved,
    /// 53-bit significand.
    Double,
    /// 64-bit significand.
    Extended,
}

impl PrecisionControl {
    pub fn from_bits(bits: u16) -> Self {
        match bits & 0b11 {
            0b00 => PrecisionControl::Single,
            0b01 => PrecisionControl::Reserved,
            0b10 => PrecisionControl::Double,
            _ => PrecisionControl::Extended,
        }
    }

    /// Significand width in bits; `None` for the reserved encoding.
    pub fn mantissa_bits(self) -> Option<u32> {
        match self {
            PrecisionControl::Single => Some(24),
            PrecisionControl::Reserved => None,
            PrecisionControl::Double => Some(53),
            PrecisionControl::Extended => Some(64),
        }
    }
}

/// Rounding-control field of the control word (bits 10-11).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundingControl {
    NearestEven,
    Down,
    Up,
    TowardZero,
}

impl RoundingControl {
    pub fn from_fcw(fcw: u16) -> Self {
        match (fcw >> 10) & 0b11 {
            0b00 => RoundingControl::NearestEven,
            0b01 => RoundingControl::Down,
            0b10 => RoundingControl::Up,
            _ => RoundingControl::TowardZero,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            RoundingControl::NearestEven => "NEAR",
            RoundingControl::Down => "DOWN",
            RoundingControl::Up => "UP",
            RoundingControl::TowardZero => "ZERO",
        }
    }
}

/// Per-register occupancy state from the tag word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u16)]
pub enum Tag {
    Valid = 0b00,
    Zero = 0b01,
    Special = 0b10,
    Empty = 0b11,
}

impl Tag {
    pub fn from_bits(bits: u16) -> Self {
        match bits & 0b11 {
            0b00 => Tag::Valid,
            0b01 => Tag::Zero,
            0b10 => Tag::Special,
            _ => Tag::Empty,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Tag::Valid => "VALID",
            Tag::Zero => "ZERO",
            Tag::Special => "SPEC",
            Tag::Empty => "EMPTY",
        }
    }
}

/// Tags for physical registers R0..R7, two bits per register.
pub fn decode_tags(tag_word: u16) -> [Tag; 8] {
    core::array::from_fn(|i| Tag::from_bits(tag_word >> (2 * i)))
}

/// Control word, unpacked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedControl {
    pub raw: u16,
    pub invalid_mask: bool,
    pub denormal_mask: bool,
    pub zero_divide_mask: bool,
    pub overflow_mask: bool,
    pub underflow_mask: bool,
    pub precision_mask: bool,
    pub precision: PrecisionControl,
    pub rounding: RoundingControl,
    pub infinity_control: bool,
}

impl DecodedControl {
    pub fn from_word(control: u16) -> Self {
        Self {
            raw: control,
            invalid_mask: bit(control, 0),
            denormal_mask: bit(control, 1),
            zero_divide_mask: bit(control, 2),
            overflow_mask: bit(control, 3),
            underflow_mask: bit(control, 4),
            precision_mask: bit(control, 5),
            precision: PrecisionControl::from_bits(control >> 8),
            rounding: RoundingControl::from_fcw(control),
            infinity_control: bit(control, 12),
        }
    }
}

/// The four condition-code bits of the status word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConditionCodes {
    pub c0: bool,
    pub c1: bool,
    pub c2: bool,
    pub c3: bool,
}

/// Status word, unpacked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedStatus {
    pub raw: u16,
    pub invalid: bool,
    pub denormal: bool,
    pub zero_divide: bool,
    pub overflow: bool,
    pub underflow: bool,
    pub precision: bool,
    pub stack_fault: bool,
    pub error_summary: bool,
    pub condition_codes: ConditionCodes,
    /// Stack-top pointer, 0..=7.
    pub top: u8,
    pub busy: bool,
}

impl DecodedStatus {
    pub fn from_word(status: u16) -> Self {
        Self {
            raw: status,
            invalid: bit(status, 0),
            denormal: bit(status, 1),
            zero_divide: bit(status, 2),
            overflow: bit(status, 3),
            underflow: bit(status, 4),
            precision: bit(status, 5),
            stack_fault: bit(status, 6),
            error_summary: bit(status, 7),
            condition_codes: ConditionCodes {
                c0: bit(status, 8),
                c1: bit(status, 9),
                c2: bit(status, 10),
                c3: bit(status, 14),
            },
            top: ((status >> 11) & 0b111) as u8,
            busy: bit(status, 15),
        }
    }
}

/// Outcome of the most recent FCOM-family comparison, read from (C3, C2, C0).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    Unordered,
    GreaterThan,
    LessThan,
    /// Covers the defined equal encoding (C3=1, C2=0, C0=0) and every
    /// combination the architecture does not define for comparisons; the
    /// bits alias unrelated instructions, so no further meaning is invented.
    EqualOrUnsupported,
}

impl Comparison {
    pub fn classify(cc: ConditionCodes) -> Self {
        match (cc.c3, cc.c2, cc.c0) {
            (true, true, true) => Comparison::Unordered,
            (false, false, false) => Comparison::GreaterThan,
            (false, false, true) => Comparison::LessThan,
            _ => Comparison::EqualOrUnsupported,
        }
    }
}

/// Physical register backing stack position `st` when the TOP field is `top`.
/// Total like the rest of the module: out-of-range arguments wrap.
pub fn phys_index(st: u8, top: u8) -> u8 {
    st.wrapping_add(top) & 7
}

/// One register slot, viewed at its stack position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecodedRegister {
    pub stack_index: u8,
    pub physical_index: u8,
    pub tag: Tag,
    /// Display value, narrowed from the 80-bit image (lossy).
    pub value: f64,
    pub sign_exponent: u16,
    pub mantissa_high: u32,
    pub mantissa_low: u32,
}

/// A fully decoded environment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecodedState {
    pub control: DecodedControl,
    pub status: DecodedStatus,
    /// Tags in physical register order.
    pub tags: [Tag; 8],
    /// Registers in stack order: index 0 is ST0.
    pub registers: [DecodedRegister; 8],
    pub comparison: Comparison,
}

/// Decode a captured environment into structured values.
///
/// Pure and deterministic: the same input always yields the same output,
/// and the input is never modified.
pub fn decode(env: &RawEnvironment) -> DecodedState {
    let control = DecodedControl::from_word(env.control);
    let status = DecodedStatus::from_word(env.status);
    let tags = decode_tags(env.tag);

    let registers = core::array::from_fn(|st| {
        let phys = phys_index(st as u8, status.top);
        let raw = env.registers[phys as usize];
        DecodedRegister {
            stack_index: st as u8,
            physical_index: phys,
            tag: tags[phys as usize],
            value: ext80::to_f64(raw),
            sign_exponent: ext80::sign_exponent(raw),
            mantissa_high: ext80::mantissa_high(raw),
            mantissa_low: ext80::mantissa_low(raw),
        }
    });

    DecodedState {
        control,
        status,
        tags,
        registers,
        comparison: Comparison::classify(status.condition_codes),
    }
}
