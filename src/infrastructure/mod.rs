//! Adapters implementing the domain ports.

pub mod qr_renderer;
