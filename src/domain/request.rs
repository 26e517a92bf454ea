use super::address::Address;
use super::amount::BtcAmount;
use crate::error::{PaymentError, Result};
use serde::{Deserialize, Serialize};

pub const URI_SCHEME: &str = "bitcoin";

/// An immutable snapshot of what the payer is asked to send, and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub address: Address,
    pub amount: BtcAmount,
}

impl PaymentRequest {
    pub fn new(address: Address, amount: BtcAmount) -> Self {
        Self { address, amount }
    }

    /// Validates raw inputs. The amount is checked first so a bad amount is
    /// always reported as such.
    pub fn from_parts(address: &str, amount: f64) -> Result<Self> {
        let amount = BtcAmount::from_f64(amount)?;
        let address = Address::new(address)?;
        Ok(Self { address, amount })
    }

    /// Canonical payment URI: `bitcoin:<address>?amount=<amount>`.
    pub fn uri(&self) -> String {
        format!("{URI_SCHEME}:{}?amount={}", self.address, self.amount)
    }

    /// Reads a payment URI back into a request.
    ///
    /// The scheme is matched case-insensitively. Unknown parameters are
    /// ignored unless they carry the `req-` prefix, which marks them as
    /// mandatory and therefore unsupported.
    pub fn from_uri(uri: &str) -> Result<Self> {
        let (scheme, rest) = uri
            .split_once(':')
            .ok_or_else(|| PaymentError::InvalidUri(format!("missing scheme in '{uri}'")))?;
        if !scheme.eq_ignore_ascii_case(URI_SCHEME) {
            return Err(PaymentError::InvalidUri(format!(
                "expected '{URI_SCHEME}' scheme, got '{scheme}'"
            )));
        }

        let (address, query) = rest.split_once('?').unwrap_or((rest, ""));
        let address = Address::new(address)?;

        let mut amount = None;
        for param in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = param.split_once('=').unwrap_or((param, ""));
            match key {
                "amount" => amount = Some(value.parse::<BtcAmount>()?),
                _ if key.starts_with("req-") => {
                    return Err(PaymentError::InvalidUri(format!(
                        "unsupported required parameter '{key}'"
                    )));
                }
                _ => {}
            }
        }

        let amount = amount.ok_or_else(|| PaymentError::InvalidUri("missing amount".to_string()))?;
        Ok(Self { address, amount })
    }
}
