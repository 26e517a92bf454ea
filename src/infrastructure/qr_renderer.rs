use crate::domain::ports::QrRenderer;
use crate::domain::render::{Color, ErrorCorrection, ImageFormat, QrImage, RenderOptions};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use qrcode::{EcLevel, QrCode};
use std::fmt::Write as _;

/// Renders QR codes with the `qrcode` crate and encodes them as PNG, SVG or
/// terminal text.
///
/// Encoding is CPU bound, so it runs on tokio's blocking pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct QrCodeRenderer;

impl QrCodeRenderer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl QrRenderer for QrCodeRenderer {
    async fn render(&self, text: &str, options: &RenderOptions) -> Result<QrImage> {
        let text = text.to_owned();
        let options = options.clone();
        tokio::task::spawn_blocking(move || render_blocking(&text, &options))
            .await
            .map_err(|e| PaymentError::EncodingFailure(format!("render task failed: {e}")))?
    }
}

/// Synchronous rendering, usable outside a runtime.
pub fn render_blocking(text: &str, options: &RenderOptions) -> Result<QrImage> {
    options.validate()?;
    let code = QrCode::with_error_correction_level(text.as_bytes(), ec_level(options.error_correction))
        .map_err(|e| PaymentError::EncodingFailure(e.to_string()))?;
    let grid = ModuleGrid::new(&code, options.margin);

    let bytes = match options.format {
        ImageFormat::Png => encode_png(&grid, options)?,
        ImageFormat::Svg => encode_svg(&grid, options).into_bytes(),
        ImageFormat::Terminal => encode_terminal(&grid).into_bytes(),
    };

    Ok(QrImage {
        payload: text.to_owned(),
        format: options.format,
        bytes,
    })
}

fn ec_level(level: ErrorCorrection) -> EcLevel {
    match level {
        ErrorCorrection::L => EcLevel::L,
        ErrorCorrection::M => EcLevel::M,
        ErrorCorrection::Q => EcLevel::Q,
        ErrorCorrection::H => EcLevel::H,
    }
}

/// Dark/light modules of a symbol including its quiet zone.
struct ModuleGrid {
    size: usize,
    dark: Vec<bool>,
}

impl ModuleGrid {
    fn new(code: &QrCode, margin: u32) -> Self {
        let width = code.width();
        let margin = margin as usize;
        let size = width + 2 * margin;
        let colors = code.to_colors();

        let mut dark = vec![false; size * size];
        for y in 0..width {
            for x in 0..width {
                if colors[y * width + x] == qrcode::Color::Dark {
                    dark[(y + margin) * size + x + margin] = true;
                }
            }
        }
        Self { size, dark }
    }

    fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.size && y < self.size && self.dark[y * self.size + x]
    }
}

/// Scales the grid to exactly `options.width` pixels with nearest-neighbour
/// sampling. The width is raised to one pixel per module when too small.
fn encode_png(grid: &ModuleGrid, options: &RenderOptions) -> Result<Vec<u8>> {
    let size = grid.size as u32;
    let width = options.width.max(size);
    let dark = Rgba(options.color.dark.rgba());
    let light = Rgba(options.color.light.rgba());

    let image = RgbaImage::from_fn(width, width, |x, y| {
        let mx = (u64::from(x) * u64::from(size) / u64::from(width)) as usize;
        let my = (u64::from(y) * u64::from(size) / u64::from(width)) as usize;
        if grid.is_dark(mx, my) { dark } else { light }
    });

    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| PaymentError::EncodingFailure(format!("PNG encoding failed: {e}")))?;
    Ok(bytes)
}

fn encode_svg(grid: &ModuleGrid, options: &RenderOptions) -> String {
    let size = grid.size;
    let mut path = String::new();
    for y in 0..size {
        for x in 0..size {
            if grid.is_dark(x, y) {
                let _ = write!(path, "M{x} {y}h1v1h-1z");
            }
        }
    }

    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{w}" "#,
            r#"viewBox="0 0 {s} {s}" shape-rendering="crispEdges">"#,
            r#"<path {light} d="M0 0h{s}v{s}H0z"/>"#,
            r#"<path {dark} d="{path}"/></svg>"#,
        ),
        w = options.width,
        s = size,
        light = svg_fill(options.color.light),
        dark = svg_fill(options.color.dark),
        path = path,
    )
}

fn svg_fill(color: Color) -> String {
    let mut attrs = format!(r#"fill="{}""#, color.to_rgb_hex());
    if color.a != 0xff {
        let _ = write!(attrs, r#" fill-opacity="{:.3}""#, f64::from(color.a) / 255.0);
    }
    attrs
}

/// Two module rows per line using half-block characters.
fn encode_terminal(grid: &ModuleGrid) -> String {
    let mut out = String::new();
    for y in (0..grid.size).step_by(2) {
        for x in 0..grid.size {
            let ch = match (grid.is_dark(x, y), grid.is_dark(x, y + 1)) {
                (true, true) => '█',
                (true, false) => '▀',
                (false, true) => '▄',
                (false, false) => ' ',
            };
            out.push(ch);
        }
        out.push('\n');
    }
    out
}
