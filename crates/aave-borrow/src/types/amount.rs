//! Smallest-unit token amounts and their conversion to human `Decimal`s.
//!
//! On-chain values are integers in a token's smallest unit (wei for 18
//! decimal tokens). Arithmetic happens on `Decimal`s. The two meet only
//! through [`Amount::to_decimal`] and [`Amount::from_decimal`], so every
//! value crosses the boundary exactly once, in a visible place.
//!
//! Conversion to `Decimal` is exact or fails with
//! [`BorrowError::AmountOverflow`]; it never saturates to zero.
//! Conversion back truncates toward zero, so a value sized from a capacity
//! never exceeds that capacity through rounding.

use alloy::primitives::U256;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::fmt;

use crate::constants::{MAX_DECIMALS, WAD_DECIMALS};
use crate::errors::BorrowError;

/// Widest integer mantissa a `Decimal` can hold.
const DECIMAL_MANTISSA_BITS: usize = 96;

/// Token amount in its smallest indivisible unit.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount {
    raw: U256,
    decimals: u8,
}

impl Amount {
    /// Wrap a raw smallest-unit integer.
    pub fn from_raw(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    /// WAD-scaled (18 decimal) raw value, e.g. wei.
    pub fn wad(raw: U256) -> Self {
        Self::from_raw(raw, WAD_DECIMALS)
    }

    /// Inner `U256`.
    pub fn raw(self) -> U256 {
        self.raw
    }

    pub fn decimals(self) -> u8 {
        self.decimals
    }

    pub fn is_zero(self) -> bool {
        self.raw.is_zero()
    }

    /// Exact conversion to a human-readable `Decimal`.
    pub fn to_decimal(self) -> Result<Decimal, BorrowError> {
        let overflow = || BorrowError::AmountOverflow {
            value: self.raw.to_string(),
            decimals: self.decimals,
        };

        if self.decimals > MAX_DECIMALS || self.raw.bit_len() > DECIMAL_MANTISSA_BITS {
            return Err(overflow());
        }

        let mantissa = self.raw.to::<u128>() as i128;
        Decimal::try_from_i128_with_scale(mantissa, u32::from(self.decimals))
            .map_err(|_| overflow())
    }

    /// Convert a human-readable value into smallest units.
    ///
    /// Negative values are rejected. Digits beyond `decimals` are dropped
    /// (round toward zero).
    pub fn from_decimal(value: Decimal, decimals: u8) -> Result<Self, BorrowError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(BorrowError::InvalidAmount {
                reason: format!("negative amount {value}"),
            });
        }
        if decimals > MAX_DECIMALS {
            return Err(BorrowError::AmountOverflow {
                value: value.to_string(),
                decimals,
            });
        }

        let scaled = value
            .checked_mul(pow10(decimals))
            .ok_or_else(|| BorrowError::AmountOverflow {
                value: value.to_string(),
                decimals,
            })?;

        let raw = scaled.trunc().to_u128().ok_or_else(|| BorrowError::AmountOverflow {
            value: value.to_string(),
            decimals,
        })?;

        Ok(Self::from_raw(U256::from(raw), decimals))
    }
}

/// `10^decimals` as a `Decimal`. Callers keep `decimals <= 28`.
fn pow10(decimals: u8) -> Decimal {
    Decimal::from_i128_with_scale(10i128.pow(u32::from(decimals)), 0)
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({} @ {}dp)", self.raw, self.decimals)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_decimal() {
            Ok(d) => write!(f, "{d}"),
            Err(_) => write!(f, "{}e-{}", self.raw, self.decimals),
        }
    }
}
