use serde::{Deserialize, Serialize};

/// Confirmations needed before a payment counts as settled.
pub const REQUIRED_CONFIRMATIONS: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Processing,
    Confirmed,
    Failed,
}

impl PaymentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Confirmed | PaymentStatus::Failed)
    }
}

/// Result of delivering one timer tick to a [`ConfirmationState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The state was not processing; nothing changed.
    Ignored,
    /// One more confirmation, still below the threshold.
    Progressed(u32),
    /// The threshold was reached and the payment is now confirmed.
    Confirmed,
}

/// Payment status plus its confirmation count.
///
/// Fields are private so the count always agrees with the status:
/// Pending has 0, Processing has 1..6 (exclusive) and Confirmed has exactly
/// [`REQUIRED_CONFIRMATIONS`]. Failed keeps whatever count it was reached with.
/// Deserialization enforces the same rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawState")]
pub struct ConfirmationState {
    status: PaymentStatus,
    confirmations: u32,
}

#[derive(Deserialize)]
struct RawState {
    status: PaymentStatus,
    confirmations: u32,
}

impl TryFrom<RawState> for ConfirmationState {
    type Error = String;

    fn try_from(raw: RawState) -> Result<Self, Self::Error> {
        let valid = match raw.status {
            PaymentStatus::Pending => raw.confirmations == 0,
            PaymentStatus::Processing => (1..REQUIRED_CONFIRMATIONS).contains(&raw.confirmations),
            PaymentStatus::Confirmed => raw.confirmations == REQUIRED_CONFIRMATIONS,
            PaymentStatus::Failed => raw.confirmations < REQUIRED_CONFIRMATIONS,
        };
        if !valid {
            return Err(format!(
                "{:?} payment cannot have {} confirmations",
                raw.status, raw.confirmations
            ));
        }
        Ok(Self {
            status: raw.status,
            confirmations: raw.confirmations,
        })
    }
}

impl ConfirmationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    pub fn confirmations(&self) -> u32 {
        self.confirmations
    }

    /// Confirmations still missing, zero once confirmed.
    pub fn remaining_confirmations(&self) -> u32 {
        REQUIRED_CONFIRMATIONS.saturating_sub(self.confirmations)
    }

    /// Pending -> Processing with the first confirmation.
    pub fn start(&mut self) -> bool {
        if self.status != PaymentStatus::Pending {
            return false;
        }
        self.status = PaymentStatus::Processing;
        self.confirmations = 1;
        true
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.status != PaymentStatus::Processing {
            return TickOutcome::Ignored;
        }
        let next = self.confirmations + 1;
        if next >= REQUIRED_CONFIRMATIONS {
            self.confirmations = REQUIRED_CONFIRMATIONS;
            self.status = PaymentStatus::Confirmed;
            TickOutcome::Confirmed
        } else {
            self.confirmations = next;
            TickOutcome::Progressed(next)
        }
    }

    /// Confirmed or Failed -> Pending.
    pub fn reset(&mut self) -> bool {
        if !self.status.is_terminal() {
            return false;
        }
        *self = Self::default();
        true
    }

    /// Pending or Processing -> Failed.
    pub fn fail(&mut self) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = PaymentStatus::Failed;
        true
    }

    /// Back to Pending from any state. Returns whether anything changed.
    pub fn restart(&mut self) -> bool {
        let changed = *self != Self::default();
        *self = Self::default();
        changed
    }
}
