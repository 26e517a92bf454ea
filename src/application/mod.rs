//! Application layer: the QR builder, the last-request-wins build session and
//! the confirmation simulator.
//!
//! The simulator runs its confirmation timer as a spawned `tokio` task that
//! owns a cancellation token and reports progress over an `mpsc` channel.

pub mod builder;
pub mod session;
pub mod simulator;
