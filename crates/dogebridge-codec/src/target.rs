use crate::PowHash;
use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};
use std::fmt;
use std::ops::Add;

fn two_pow_256() -> BigUint {
    BigUint::one() << 256usize
}

/// 256-bit proof-of-work target.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Target(BigUint);

impl Target {
    /// Decodes compact difficulty bits.
    ///
    /// The mantissa is the low 24 bits and the exponent the high 8 bits, the target being
    /// `mantissa * 256^(exponent - 3)`. Exponents below 3 shift the mantissa right and the
    /// result is truncated to 256 bits.
    pub fn from_bits(bits: u32) -> Self {
        let exponent = (bits >> 24) as usize;
        let mantissa = BigUint::from(bits & 0x00ff_ffff);
        let value = if exponent <= 3 {
            mantissa >> (8 * (3 - exponent))
        } else {
            mantissa << (8 * (exponent - 3))
        };
        Self::from_biguint(value)
    }

    /// Wraps an integer as a target, truncating it to 256 bits.
    pub fn from_biguint(value: BigUint) -> Self {
        Self(value % two_pow_256())
    }

    /// Encodes the target into compact bits, losing precision below the top 3 bytes.
    pub fn to_compact(&self) -> u32 {
        let mut size = if self.0.is_zero() {
            0
        } else {
            self.0.to_bytes_be().len()
        };
        let mut compact = if size <= 3 {
            self.0
                .to_u32()
                .expect("Value of at most 3 bytes fits in u32; qed")
                << (8 * (3 - size))
        } else {
            (&self.0 >> (8 * (size - 3)))
                .to_u32()
                .expect("Value shifted down to 3 bytes fits in u32; qed")
        };
        // The high mantissa bit is a sign bit in the compact format.
        if compact & 0x0080_0000 != 0 {
            compact >>= 8;
            size += 1;
        }
        compact | ((size as u32) << 24)
    }

    /// Returns whether the proof-of-work hash is numerically at or below the target.
    pub fn is_met_by(&self, pow_hash: &PowHash) -> bool {
        BigUint::from_bytes_le(&pow_hash.0) <= self.0
    }

    /// Expected number of hashes needed to meet this target, `2^256 / (target + 1)`.
    pub fn work(&self) -> ChainWork {
        ChainWork(two_pow_256() / (&self.0 + 1u32))
    }

    /// Returns the target as a big-endian 32-byte word.
    pub fn to_be_bytes(&self) -> [u8; 32] {
        crate::bytes_to_bytes32(&self.0.to_bytes_be())
    }

    /// Returns the underlying integer.
    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.to_be_bytes()))
    }
}

/// Decodes compact difficulty bits into a 256-bit target.
pub fn target_from_bits(bits: u32) -> Target {
    Target::from_bits(bits)
}

/// Work represented by a header with the given compact bits.
pub fn work_from_bits(bits: u32) -> ChainWork {
    Target::from_bits(bits).work()
}

/// Accumulated proof-of-work of a chain of headers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct ChainWork(BigUint);

impl ChainWork {
    /// Zero work.
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    /// Returns the underlying integer.
    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }
}

impl From<u64> for ChainWork {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl Add<&ChainWork> for &ChainWork {
    type Output = ChainWork;

    fn add(self, rhs: &ChainWork) -> ChainWork {
        ChainWork(&self.0 + &rhs.0)
    }
}

impl fmt::Display for ChainWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}
