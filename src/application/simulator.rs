use crate::domain::status::{ConfirmationState, PaymentStatus, TickOutcome};
use crate::error::{PaymentError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Time between two simulated confirmations.
    pub tick_interval_ms: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 2_000,
        }
    }
}

impl SimulatorConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(PaymentError::InvalidConfig(
                "tick interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Notifications published by a [`ConfirmationSimulator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimulatorEvent {
    /// Emitted after every state change.
    StatusChanged(ConfirmationState),
    /// Emitted once per session, right after the final confirmation.
    PaymentConfirmed { confirmations: u32 },
}

pub type EventReceiver = mpsc::UnboundedReceiver<SimulatorEvent>;

struct Shared {
    state: ConfirmationState,
    /// Bumped whenever a ticker is started or cancelled; a ticker only acts
    /// while the epoch it was spawned with is still current.
    epoch: u64,
    ticker: Option<CancellationToken>,
    events: mpsc::UnboundedSender<SimulatorEvent>,
}

impl Shared {
    fn emit(&self, event: SimulatorEvent) {
        // Nobody listening is fine.
        let _ = self.events.send(event);
    }

    fn cancel_ticker(&mut self) {
        self.epoch += 1;
        if let Some(token) = self.ticker.take() {
            token.cancel();
        }
    }
}

/// Fakes the confirmation progress of a payment.
///
/// `start` moves a pending payment to processing with one confirmation and
/// spawns a ticker that adds one confirmation per interval until the
/// threshold is reached. At most one ticker runs at a time, and resetting or
/// dropping the simulator cancels it. Must be used within a tokio runtime.
///
/// Construction fails with [`PaymentError::InvalidConfig`] for a zero tick
/// interval.
pub struct ConfirmationSimulator {
    config: SimulatorConfig,
    shared: Arc<Mutex<Shared>>,
    shutdown: CancellationToken,
}

impl ConfirmationSimulator {
    pub fn new(config: SimulatorConfig) -> Result<(Self, EventReceiver)> {
        config.validate()?;
        let (events, receiver) = mpsc::unbounded_channel();
        let shared = Shared {
            state: ConfirmationState::new(),
            epoch: 0,
            ticker: None,
            events,
        };
        let simulator = Self {
            config,
            shared: Arc::new(Mutex::new(shared)),
            shutdown: CancellationToken::new(),
        };
        Ok((simulator, receiver))
    }

    pub async fn state(&self) -> ConfirmationState {
        self.shared.lock().await.state
    }

    pub async fn is_ticking(&self) -> bool {
        self.shared.lock().await.ticker.is_some()
    }

    /// The single user action: starts a pending payment, resets a confirmed
    /// or failed one, and does nothing while processing.
    pub async fn trigger(&self) -> PaymentStatus {
        let status = self.state().await.status();
        match status {
            PaymentStatus::Pending => {
                self.start().await;
            }
            PaymentStatus::Confirmed | PaymentStatus::Failed => {
                self.reset().await;
            }
            PaymentStatus::Processing => {
                debug!("payment already processing, trigger ignored");
            }
        }
        self.state().await.status()
    }

    /// Pending -> Processing. Returns false if the payment was not pending.
    pub async fn start(&self) -> bool {
        let mut shared = self.shared.lock().await;
        if !shared.state.start() {
            debug!(status = ?shared.state.status(), "start ignored");
            return false;
        }

        shared.cancel_ticker();
        let token = self.shutdown.child_token();
        shared.ticker = Some(token.clone());
        let epoch = shared.epoch;
        info!(confirmations = shared.state.confirmations(), "payment processing");
        shared.emit(SimulatorEvent::StatusChanged(shared.state));

        self.spawn_ticker(epoch, token);
        true
    }

    /// Confirmed or Failed -> Pending. Returns false otherwise.
    pub async fn reset(&self) -> bool {
        let mut shared = self.shared.lock().await;
        if !shared.state.reset() {
            debug!(status = ?shared.state.status(), "reset ignored");
            return false;
        }
        shared.cancel_ticker();
        info!("payment reset");
        shared.emit(SimulatorEvent::StatusChanged(shared.state));
        true
    }

    /// Marks a pending or processing payment as failed and stops the ticker.
    pub async fn fail(&self) -> bool {
        let mut shared = self.shared.lock().await;
        if !shared.state.fail() {
            debug!(status = ?shared.state.status(), "fail ignored");
            return false;
        }
        shared.cancel_ticker();
        info!(confirmations = shared.state.confirmations(), "payment failed");
        shared.emit(SimulatorEvent::StatusChanged(shared.state));
        true
    }

    /// Discards the current session from any state and starts over at Pending.
    pub async fn new_session(&self) {
        let mut shared = self.shared.lock().await;
        shared.cancel_ticker();
        if shared.state.restart() {
            info!("new payment session");
            shared.emit(SimulatorEvent::StatusChanged(shared.state));
        }
    }

    fn spawn_ticker(&self, epoch: u64, token: CancellationToken) {
        let handle = Arc::clone(&self.shared);
        let period = self.config.tick_interval();
        let first_tick = Instant::now() + period;

        tokio::spawn(async move {
            let mut interval = time::interval_at(first_tick, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {}
                }

                let mut shared = handle.lock().await;
                if token.is_cancelled() || shared.epoch != epoch {
                    break;
                }

                match shared.state.tick() {
                    TickOutcome::Progressed(confirmations) => {
                        debug!(confirmations, "confirmation received");
                        shared.emit(SimulatorEvent::StatusChanged(shared.state));
                    }
                    TickOutcome::Confirmed => {
                        shared.ticker = None;
                        token.cancel();
                        let confirmations = shared.state.confirmations();
                        info!(confirmations, "payment confirmed");
                        shared.emit(SimulatorEvent::StatusChanged(shared.state));
                        shared.emit(SimulatorEvent::PaymentConfirmed { confirmations });
                        break;
                    }
                    TickOutcome::Ignored => break,
                }
            }
        });
    }
}

impl Drop for ConfirmationSimulator {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
