use crate::error::LedgerError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of decimal places between a minor unit and a major unit (paise to rupees).
pub const MINOR_UNIT_SCALE: u32 = 2;

/// A monetary value in major currency units.
///
/// Wraps `rust_decimal::Decimal` so wallet arithmetic never goes through floats.
/// Arithmetic is only available through [`Balance::checked_add`] and
/// [`Balance::checked_sub`]; neither panics and the latter refuses to produce a
/// negative value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Balance(pub Decimal);

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Builds a balance that must not be negative, e.g. an entry fee or a seeded wallet.
    pub fn non_negative(amount: Decimal) -> Result<Self, LedgerError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            Err(LedgerError::InvalidRequest(format!(
                "amount must not be negative, got {amount}"
            )))
        } else {
            Ok(Self(amount))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Returns `None` when the sum overflows the decimal range.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Returns `None` when the result would drop below zero.
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        let result = self.0.checked_sub(rhs.0)?;
        if result.is_sign_negative() && !result.is_zero() {
            None
        } else {
            Some(Self(result))
        }
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

/// An amount expressed in the currency's smallest indivisible unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinorUnits(pub u64);

impl MinorUnits {
    /// Rejects zero; a payment or order always moves money.
    pub fn ensure_positive(self) -> Result<Self, LedgerError> {
        if self.0 == 0 {
            Err(LedgerError::InvalidRequest(
                "amount must be positive".to_string(),
            ))
        } else {
            Ok(self)
        }
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Converts to major units. Exact: an integer count of minor units always
    /// fits in two decimal places, so no rounding is applied.
    pub fn to_major(self) -> Balance {
        Balance(Decimal::from_i128_with_scale(
            i128::from(self.0),
            MINOR_UNIT_SCALE,
        ))
    }
}

impl fmt::Display for MinorUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
