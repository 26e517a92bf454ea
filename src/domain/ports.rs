use super::render::{QrImage, RenderOptions};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Turns text into a QR code image.
///
/// Implementations report any failure to encode the text, such as exceeding
/// symbol capacity, as [`PaymentError::EncodingFailure`](crate::error::PaymentError::EncodingFailure).
#[async_trait]
pub trait QrRenderer: Send + Sync {
    async fn render(&self, text: &str, options: &RenderOptions) -> Result<QrImage>;
}

pub type QrRendererBox = Box<dyn QrRenderer>;

#[async_trait]
impl<T: QrRenderer + ?Sized> QrRenderer for Arc<T> {
    async fn render(&self, text: &str, options: &RenderOptions) -> Result<QrImage> {
        (**self).render(text, options).await
    }
}
