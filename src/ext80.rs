//! Helpers for the 80-bit extended-precision register format.
//!
//! Layout (little-endian): bytes 0..8 hold the 64-bit significand with an
//! explicit integer bit at bit 63, bytes 8..10 hold the sign bit and the
//! 15-bit biased exponent.

use crate::env::RawExtended;

/// Pad a 10-byte register image out to the 12-byte in-memory layout used
/// for 80-bit floats on the target platform, appending two zero bytes above
/// the sign/exponent word. The low 80 bits are the source bytes verbatim.
pub fn widen(raw: RawExtended) -> [u8; 12] {
    let mut out = [0u8; 12];
    out[..10].copy_from_slice(&raw);
    out
}

/// Sign bit plus 15-bit biased exponent (bytes 8..10).
pub fn sign_exponent(raw: RawExtended) -> u16 {
    u16::from_le_bytes(raw[8..10].try_into().unwrap())
}

/// Upper half of the 64-bit significand (bytes 4..8).
pub fn mantissa_high(raw: RawExtended) -> u32 {
    u32::from_le_bytes(raw[4..8].try_into().unwrap())
}

/// Lower half of the 64-bit significand (bytes 0..4).
pub fn mantissa_low(raw: RawExtended) -> u32 {
    u32::from_le_bytes(raw[0..4].try_into().unwrap())
}

/// Narrow an 80-bit register image to `f64` for display.
///
/// Lossy by nature (the significand drops from 64 to 53 bits); total over
/// every input pattern, including pseudo-denormals and unnormals, which are
/// evaluated as a plain significand-times-power-of-two product.
pub fn to_f64(raw: RawExtended) -> f64 {
    let mant = u64::from_le_bytes(raw[0..8].try_into().unwrap());
    let sign_exp = sign_exponent(raw);
    let negative = sign_exp & 0x8000 != 0;
    let exp = sign_exp & 0x7FFF;

    if exp == 0 && mant == 0 {
        return if negative { -0.0 } else { 0.0 };
    }

    if exp == 0x7FFF {
        let int_bit = mant >> 63;
        let frac = mant & ((1u64 << 63) - 1);
        if int_bit == 1 && frac == 0 {
            return if negative {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            };
        }
        // NaNs (and the pre-387 pseudo-NaN/pseudo-infinity encodings).
        let nan = f64::NAN;
        return if negative { -nan } else { nan };
    }

    // The explicit integer bit means the significand is a fixed-point value
    // in [0, 2); denormals (exp == 0) use the minimum exponent.
    let m = (mant as f64) / ((1u64 << 63) as f64);
    let exp_unbiased = if exp == 0 {
        1i32 - 16383
    } else {
        i32::from(exp) - 16383
    };

    let magnitude = m * 2f64.powi(exp_unbiased);
    if negative {
        -magnitude
    } else {
        magnitude
    }
}
