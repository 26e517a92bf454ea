use super::builder::QrBuilder;
use crate::domain::render::{QrImage, RenderOverrides};
use crate::error::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

/// What happened to a build request once its render finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The request was still the newest one; its image is now current.
    Applied(QrImage),
    /// A newer request was issued while this one was rendering.
    Superseded,
}

/// Rebuilds the QR code whenever the address or amount changes, keeping only
/// the result of the most recent request.
///
/// Every call to [`update`](Self::update) takes a new generation number. When
/// a render completes, its result is applied only if no newer generation has
/// been issued in the meantime; otherwise it is dropped, errors included.
pub struct BuildSession {
    builder: QrBuilder,
    generation: AtomicU64,
    current: RwLock<Option<QrImage>>,
}

impl BuildSession {
    pub fn new(builder: QrBuilder) -> Self {
        Self {
            builder,
            generation: AtomicU64::new(0),
            current: RwLock::new(None),
        }
    }

    pub async fn update(
        &self,
        address: &str,
        amount: f64,
        overrides: Option<&RenderOverrides>,
    ) -> Result<BuildOutcome> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let result = self.builder.build(address, amount, overrides).await;

        // Checked under the write lock so an older request can never overwrite
        // the image of a newer one.
        let mut current = self.current.write().await;
        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!(ticket, "discarding superseded QR build");
            return Ok(BuildOutcome::Superseded);
        }

        let image = result?;
        *current = Some(image.clone());
        Ok(BuildOutcome::Applied(image))
    }

    /// The image of the latest request that completed successfully.
    pub async fn current(&self) -> Option<QrImage> {
        self.current.read().await.clone()
    }

    /// Number of build requests issued so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}
