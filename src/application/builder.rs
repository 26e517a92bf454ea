use crate::domain::ports::QrRendererBox;
use crate::domain::render::{QrImage, RenderOptions, RenderOverrides};
use crate::domain::request::PaymentRequest;
use crate::error::Result;
use tracing::{debug, warn};

/// Builds payment URIs and renders them as QR codes.
///
/// `QrBuilder` owns the rendering backend and a set of default render options;
/// per-call overrides are merged on top of the defaults.
pub struct QrBuilder {
    renderer: QrRendererBox,
    defaults: RenderOptions,
}

impl QrBuilder {
    /// Creates a builder using [`RenderOptions::default`]: 300 px wide, one
    /// module of margin, high error correction, black on white PNG.
    pub fn new(renderer: QrRendererBox) -> Self {
        Self::with_defaults(renderer, RenderOptions::default())
    }

    pub fn with_defaults(renderer: QrRendererBox, defaults: RenderOptions) -> Self {
        Self { renderer, defaults }
    }

    pub fn defaults(&self) -> &RenderOptions {
        &self.defaults
    }

    /// Validates the raw inputs and renders `bitcoin:<address>?amount=<amount>`.
    ///
    /// Fails with `InvalidAmount` for negative, NaN or infinite amounts before
    /// anything is rendered, and with `EncodingFailure` when the renderer
    /// cannot encode the URI.
    pub async fn build(
        &self,
        address: &str,
        amount: f64,
        overrides: Option<&RenderOverrides>,
    ) -> Result<QrImage> {
        let request = PaymentRequest::from_parts(address, amount)?;
        self.build_request(&request, overrides).await
    }

    pub async fn build_request(
        &self,
        request: &PaymentRequest,
        overrides: Option<&RenderOverrides>,
    ) -> Result<QrImage> {
        let options = match overrides {
            Some(overrides) => self.defaults.merged(overrides),
            None => self.defaults.clone(),
        };
        options.validate()?;

        let uri = request.uri();
        debug!(%uri, format = ?options.format, width = options.width, "rendering payment QR code");
        self.renderer
            .render(&uri, &options)
            .await
            .inspect_err(|e| warn!(%uri, error = %e, "failed to render payment QR code"))
    }
}
