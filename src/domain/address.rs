use crate::error::{PaymentError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Receiving address used for every payment request.
pub const DEFAULT_ADDRESS: &str = "bc1qmrnkpa98xajxezxp2clqehavxxr55h8kfq9cjd";

/// Well-known addresses of each encoding, handy for exercising the builder.
pub const SAMPLE_ADDRESSES: [&str; 4] = [
    DEFAULT_ADDRESS,
    "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa",
    "3E8ociqZa9mZUSwGdSmAEMAoAxBK3FNDcd",
    "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4",
];

/// An opaque, non-empty receiving address.
///
/// No checksum or network validation is performed; the string is inserted
/// into the payment URI verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(PaymentError::InvalidAddress);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Address {
    fn default() -> Self {
        Self(DEFAULT_ADDRESS.to_string())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for Address {
    type Error = PaymentError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
