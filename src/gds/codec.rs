// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Numeric conversions for GDSII payloads
//!
//! GDSII stores every integer big-endian and every real as an 8-byte
//! excess-64 base-16 float ("SEM"): one sign bit, a 7-bit exponent and a
//! 56-bit mantissa read as a fraction of 2^56.

use crate::error::{GdsError, Result};

const SIGN_MASK: u64 = 0x8000_0000_0000_0000;
const EXPONENT_MASK: u64 = 0x7F00_0000_0000_0000;
const MANTISSA_MASK: u64 = 0x00FF_FFFF_FFFF_FFFF;
const MANTISSA_SCALE: f64 = (1u64 << 56) as f64;
const EXPONENT_BIAS: i32 = 64;

/// Interpret a 16-bit value read from big-endian storage as a native integer.
#[inline]
pub fn swap_endian16(raw: u16) -> u16 {
    u16::from_be(raw)
}

#[inline]
pub fn swap_endian32(raw: u32) -> u32 {
    u32::from_be(raw)
}

#[inline]
pub fn swap_endian64(raw: u64) -> u64 {
    u64::from_be(raw)
}

/// Decode a SEM real whose bits are already in native order
/// (sign in bit 63, exponent in bits 62..56).
pub fn sem_to_f64(raw: u64) -> f64 {
    let mantissa = raw & MANTISSA_MASK;
    if mantissa == 0 {
        return 0.0;
    }

    let exponent = ((raw & EXPONENT_MASK) >> 56) as i32 - EXPONENT_BIAS;
    let value = (mantissa as f64 / MANTISSA_SCALE) * 16f64.powi(exponent);

    if raw & SIGN_MASK != 0 {
        -value
    } else {
        value
    }
}

/// Decode a SEM real straight from its 8 stored bytes.
pub fn sem_from_be_bytes(bytes: [u8; 8]) -> f64 {
    sem_to_f64(u64::from_be_bytes(bytes))
}

/// Encode a value as a SEM real in native bit order.
///
/// The mantissa is normalized into [1/16, 1) by stepping the base-16
/// exponent; values too small or too large for the 7-bit exponent fail with
/// [`GdsError::Range`].
pub fn f64_to_sem(value: f64) -> Result<u64> {
    if value == 0.0 {
        return Ok(0);
    }
    if !value.is_finite() {
        return Err(GdsError::Range { value });
    }

    let mut mantissa = value.abs();
    let mut exponent: i32 = EXPONENT_BIAS;

    while mantissa < 0.0625 {
        if exponent == 0 {
            return Err(GdsError::Range { value });
        }
        mantissa *= 16.0;
        exponent -= 1;
    }
    while mantissa >= 1.0 {
        if exponent == 127 {
            return Err(GdsError::Range { value });
        }
        mantissa /= 16.0;
        exponent += 1;
    }

    let mut bits = (mantissa * MANTISSA_SCALE).round() as u64;
    if bits > MANTISSA_MASK {
        // rounding carried into a 57th bit
        bits >>= 4;
        exponent += 1;
        if exponent > 127 {
            return Err(GdsError::Range { value });
        }
    }

    let sign = if value < 0.0 { SIGN_MASK } else { 0 };
    Ok(sign | ((exponent as u64) << 56) | bits)
}
