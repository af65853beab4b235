//! Fixed-point math utilities for deterministic rules.
//!
//! The rules corpus is almost entirely integer, but battle value and a few
//! damage formulas need fractional multipliers. Those use fixed-point
//! arithmetic so every client computes bit-identical results.

use fixed::types::I32F32;

/// Fixed-point number type for all fractional rules math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// Build a fixed-point value from hundredths (`hundredths(125)` is 1.25).
#[must_use]
pub fn hundredths(value: i32) -> Fixed {
    Fixed::from_num(value) / Fixed::from_num(100)
}

/// Round a non-negative fixed-point value to the nearest integer, halves up.
///
/// Negative values round to zero.
#[must_use]
pub fn round_to_u32(value: Fixed) -> u32 {
    if value <= Fixed::ZERO {
        return 0;
    }
    let half = Fixed::ONE / Fixed::from_num(2);
    (value + half).to_num::<i64>().clamp(0, i64::from(u32::MAX)) as u32
}

/// Integer division rounding up, for the many "round fractions up" rules.
#[must_use]
pub const fn div_ceil(numerator: u32, denominator: u32) -> u32 {
    (numerator + denominator - 1) / denominator
}

/// Multiply by one and a half, rounding up (walk MP to run MP).
#[must_use]
pub const fn times_one_and_half_ceil(value: u32) -> u32 {
    div_ceil(value * 3, 2)
}
