//! Block difficulty data structures and calculations.
//!
//! The block difficulty "target threshold" is stored in the block header as a
//! 32-bit `CompactDifficulty`. The block hash must be less than or equal to
//! the `ExpandedDifficulty` threshold, when represented as a 256-bit integer
//! in little-endian order.

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

pub use crate::work::u256::U256;

/// A 32-bit "compact bits" value, which represents the difficulty threshold
/// for a block header.
///
/// This is a floating-point encoding, with a 24-bit signed mantissa, an 8-bit
/// exponent, an offset of 3, and a radix of 256. (IEEE 754 32-bit
/// floating-point values use a separate sign bit, an implicit leading
/// mantissa bit, an offset of 127, and a radix of 2.)
///
/// The precise bit pattern of a `CompactDifficulty` value is
/// consensus-critical: it is part of the block header, and some
/// `ExpandedDifficulty` values have multiple equivalent compact encodings due
/// to redundancy in the floating-point format.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct CompactDifficulty(pub u32);

impl fmt::Debug for CompactDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CompactDifficulty")
            // Use hex, because it's a float
            .field(&format_args!("{:#010x}", self.0))
            // Use expanded difficulty, for bitwise difficulty comparisons
            .field(&format_args!("{:?}", self.to_expanded()))
            .finish()
    }
}

/// A 256-bit unsigned "expanded difficulty" value.
///
/// Used as a target threshold for the difficulty of a block hash. The RPC
/// layer renders it as 64 lowercase hex digits in big-endian order.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
pub struct ExpandedDifficulty(U256);

impl CompactDifficulty {
    /// CompactDifficulty exponent base.
    const BASE: u32 = 256;

    /// CompactDifficulty exponent offset.
    const OFFSET: i32 = 3;

    /// CompactDifficulty floating-point precision.
    const PRECISION: u32 = 24;

    /// CompactDifficulty sign bit, part of the signed mantissa.
    const SIGN_BIT: u32 = 1 << (CompactDifficulty::PRECISION - 1);

    /// CompactDifficulty unsigned mantissa mask.
    ///
    /// Also the maximum unsigned mantissa value.
    const UNSIGNED_MANTISSA_MASK: u32 = CompactDifficulty::SIGN_BIT - 1;

    /// Calculate the ExpandedDifficulty for a compact representation.
    ///
    /// Returns None for negative, zero, and overflow values, which the
    /// consensus rules reject before comparing the hash.
    #[allow(clippy::unwrap_in_result)]
    pub fn to_expanded(self) -> Option<ExpandedDifficulty> {
        // Alias the struct constants here, so the code is easier to read.
        const BASE: u32 = CompactDifficulty::BASE;
        const OFFSET: i32 = CompactDifficulty::OFFSET;
        const PRECISION: u32 = CompactDifficulty::PRECISION;
        const SIGN_BIT: u32 = CompactDifficulty::SIGN_BIT;
        const UNSIGNED_MANTISSA_MASK: u32 = CompactDifficulty::UNSIGNED_MANTISSA_MASK;

        // Negative values in this floating-point representation.
        // 0 if (x & 2^23 == 2^23)
        if self.0 & SIGN_BIT == SIGN_BIT {
            return None;
        }

        // The fractional part of the floating-point number: x & (2^23 - 1)
        let mantissa = self.0 & UNSIGNED_MANTISSA_MASK;

        // The exponent for the multiplier in the floating-point number:
        // 256^(floor(x/(2^24)) - 3)
        //
        // The i32 conversion is safe, because we've just divided self by 2^24.
        let exponent = i32::try_from(self.0 >> PRECISION).expect("fits in i32") - OFFSET;

        // Normalise the mantissa and exponent before multiplying.
        //
        // Non-zero overflow values are rejected, but overflows where all the
        // overflowing bits are zero are accepted, as are underflows.
        let (mantissa, exponent) = match (mantissa, exponent) {
            // Overflow: check for non-zero overflow bits
            //
            // If m is non-zero, overflow. If m is zero, invalid.
            (_, e) if (e >= 32) => return None,
            // If m is larger than the remaining bytes, overflow.
            // Otherwise, avoid overflows in base^exponent.
            (m, e) if (e == 31 && m > u8::MAX.into()) => return None,
            (m, e) if (e == 31 && m <= u8::MAX.into()) => (m << 16, e - 2),
            (m, e) if (e == 30 && m > u16::MAX.into()) => return None,
            (m, e) if (e == 30 && m <= u16::MAX.into()) => (m << 8, e - 1),

            // Underflow: perform the right shift.
            // The abs is safe, because we've just divided by 2^24, and offset
            // is small.
            (m, e) if (e < 0) => (m >> ((e.abs() * 8) as u32), 0),
            (m, e) => (m, e),
        };

        // Now calculate the result: mantissa*base^exponent
        // Earlier code should make sure all these values are in range.
        let mantissa: U256 = mantissa.into();
        let base: U256 = BASE.into();
        let exponent: U256 = exponent.into();
        let result = mantissa * base.pow(exponent);

        if result == U256::zero() {
            // Zero values are rejected without comparing the hash
            None
        } else {
            Some(ExpandedDifficulty(result))
        }
    }
}

impl ExpandedDifficulty {
    /// Returns the target threshold bytes in big-endian order.
    pub fn bytes_in_big_endian_order(&self) -> [u8; 32] {
        let mut buf = [0; 32];
        self.0.to_big_endian(&mut buf);
        buf
    }
}

impl From<U256> for ExpandedDifficulty {
    fn from(value: U256) -> Self {
        ExpandedDifficulty(value)
    }
}

impl From<ExpandedDifficulty> for U256 {
    fn from(value: ExpandedDifficulty) -> Self {
        value.0
    }
}

impl fmt::Display for ExpandedDifficulty {
    /// The 64-hex-digit big-endian rendering used by the RPC `target` field.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.bytes_in_big_endian_order()))
    }
}

impl fmt::Debug for ExpandedDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ExpandedDifficulty")
            .field(&hex::encode(self.bytes_in_big_endian_order()))
            .finish()
    }
}

impl Serialize for ExpandedDifficulty {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ExpandedDifficulty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex_target = String::deserialize(deserializer)?;
        let bytes: [u8; 32] = hex::FromHex::from_hex(&hex_target).map_err(de::Error::custom)?;
        Ok(ExpandedDifficulty(U256::from_big_endian(&bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_the_bitcoin_genesis_threshold() {
        let target = CompactDifficulty(0x1d00_ffff)
            .to_expanded()
            .expect("valid compact value");

        assert_eq!(
            target.to_string(),
            "00000000ffff0000000000000000000000000000000000000000000000000000",
        );
    }

    #[test]
    fn expands_a_minimum_difficulty_threshold() {
        let target = CompactDifficulty(0x207f_ffff)
            .to_expanded()
            .expect("valid compact value");

        assert_eq!(
            target.to_string(),
            "7fffff0000000000000000000000000000000000000000000000000000000000",
        );
    }

    #[test]
    fn rejects_invalid_compact_values() {
        // zero mantissa
        assert_eq!(CompactDifficulty(0).to_expanded(), None);
        // sign bit set
        assert_eq!(CompactDifficulty(0x0180_0000).to_expanded(), None);
        // non-zero overflow bits
        assert_eq!(CompactDifficulty(0x2201_0000).to_expanded(), None);
    }
}
