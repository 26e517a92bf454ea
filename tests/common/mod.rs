use async_trait::async_trait;
use btcqr::domain::ports::QrRenderer;
use btcqr::domain::render::{QrImage, RenderOptions};
use btcqr::error::{PaymentError, Result};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Renderer double that echoes the text back after a per-payload delay.
///
/// Payloads listed in `failing` return `EncodingFailure` once their delay
/// has elapsed.
#[derive(Default)]
pub struct DelayedRenderer {
    pub delays: HashMap<String, Duration>,
    pub failing: HashSet<String>,
    pub calls: AtomicUsize,
}

impl DelayedRenderer {
    pub fn with_delay(mut self, payload: &str, delay: Duration) -> Self {
        self.delays.insert(payload.to_string(), delay);
        self
    }

    pub fn failing_on(mut self, payload: &str) -> Self {
        self.failing.insert(payload.to_string());
        self
    }
}

#[async_trait]
impl QrRenderer for DelayedRenderer {
    async fn render(&self, text: &str, options: &RenderOptions) -> Result<QrImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(text) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(text) {
            return Err(PaymentError::EncodingFailure(format!("cannot encode {text}")));
        }
        Ok(QrImage {
            payload: text.to_string(),
            format: options.format,
            bytes: text.as_bytes().to_vec(),
        })
    }
}

/// Plain decimal form of a satoshi amount, computed without `rust_decimal`.
pub fn sats_to_btc_string(sats: u64) -> String {
    let whole = sats / 100_000_000;
    let frac = sats % 100_000_000;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:08}");
    format!("{whole}.{}", frac.trim_end_matches('0'))
}
