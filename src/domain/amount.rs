use crate::error::{PaymentError, Result};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of fractional digits in one bitcoin (1 satoshi = 0.00000001 BTC).
pub const SATOSHI_SCALE: u32 = 8;

/// Fixed BTC/USD exchange rate used for display conversions.
pub const BITCOIN_USD_RATE: Decimal = dec!(62000);

/// A non-negative bitcoin amount with satoshi precision.
///
/// The inner value is always rounded to 8 fractional digits and normalized, so
/// its `Display` form is the plain decimal used in payment URIs: no exponent,
/// no grouping separators and no trailing zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct BtcAmount(Decimal);

impl BtcAmount {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self> {
        if value.is_zero() {
            return Ok(Self::ZERO);
        }
        if value.is_sign_negative() {
            return Err(PaymentError::InvalidAmount(format!(
                "amount must not be negative, got {value}"
            )));
        }
        let rounded = value
            .round_dp_with_strategy(SATOSHI_SCALE, RoundingStrategy::MidpointAwayFromZero)
            .normalize();
        Ok(Self(rounded))
    }

    /// Converts a floating point amount, rejecting NaN, infinities and
    /// negative values before any rounding happens.
    pub fn from_f64(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(PaymentError::InvalidAmount(format!(
                "amount must be finite, got {value}"
            )));
        }
        if value < 0.0 {
            return Err(PaymentError::InvalidAmount(format!(
                "amount must not be negative, got {value}"
            )));
        }
        let decimal = Decimal::from_f64(value).ok_or_else(|| {
            PaymentError::InvalidAmount(format!("amount {value} is out of range"))
        })?;
        Self::new(decimal)
    }

    /// Converts a USD value to bitcoin at [`BITCOIN_USD_RATE`].
    pub fn from_usd(usd: Decimal) -> Result<Self> {
        Self::new(usd / BITCOIN_USD_RATE)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn to_usd(&self) -> Decimal {
        self.0 * BITCOIN_USD_RATE
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for BtcAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BtcAmount {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self> {
        let decimal = Decimal::from_str(s.trim())
            .map_err(|e| PaymentError::InvalidAmount(format!("'{s}': {e}")))?;
        Self::new(decimal)
    }
}

impl TryFrom<Decimal> for BtcAmount {
    type Error = PaymentError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<f64> for BtcAmount {
    type Error = PaymentError;

    fn try_from(value: f64) -> Result<Self> {
        Self::from_f64(value)
    }
}

impl From<BtcAmount> for Decimal {
    fn from(amount: BtcAmount) -> Self {
        amount.0
    }
}
