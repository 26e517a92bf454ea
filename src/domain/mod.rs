//! Domain types: payment requests, render settings and confirmation state.

pub mod address;
pub mod amount;
pub mod ports;
pub mod render;
pub mod request;
pub mod status;
