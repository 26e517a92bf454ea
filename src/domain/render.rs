use crate::error::{PaymentError, Result};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest accepted output width in pixels.
pub const MAX_WIDTH: u32 = 4096;
/// Largest accepted quiet zone in modules.
pub const MAX_MARGIN: u32 = 64;

/// QR error correction level. `H` survives roughly 30% damaged modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ErrorCorrection {
    L,
    M,
    Q,
    #[default]
    H,
}

impl FromStr for ErrorCorrection {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "L" | "LOW" => Ok(Self::L),
            "M" | "MEDIUM" => Ok(Self::M),
            "Q" | "QUARTILE" => Ok(Self::Q),
            "H" | "HIGH" => Ok(Self::H),
            _ => Err(PaymentError::InvalidOption(format!(
                "unknown error correction level '{s}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Svg,
    Terminal,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Svg => "image/svg+xml",
            ImageFormat::Terminal => "text/plain;charset=utf-8",
        }
    }
}

impl FromStr for ImageFormat {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            "terminal" | "text" => Ok(Self::Terminal),
            _ => Err(PaymentError::InvalidOption(format!("unknown image format '{s}'"))),
        }
    }
}

/// An RGBA colour written as `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(0xff, 0xff, 0xff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    pub fn rgba(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// `#rrggbb` without the alpha channel.
    pub fn to_rgb_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 0xff {
            f.write_str(&self.to_rgb_hex())
        } else {
            write!(f, "{}{:02x}", self.to_rgb_hex(), self.a)
        }
    }
}

impl FromStr for Color {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || PaymentError::InvalidOption(format!("invalid colour '{s}'"));
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        // Shorthand forms double every digit: "#f0c" == "#ff00cc".
        let expanded: String = match hex.len() {
            3 | 4 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 | 8 => hex.to_string(),
            _ => return Err(invalid()),
        };
        let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).map_err(|_| invalid());

        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: if expanded.len() == 8 { channel(6)? } else { 0xff },
        })
    }
}

impl TryFrom<String> for Color {
    type Error = PaymentError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrColors {
    pub dark: Color,
    pub light: Color,
}

impl Default for QrColors {
    fn default() -> Self {
        Self {
            dark: Color::BLACK,
            light: Color::WHITE,
        }
    }
}

/// Fully resolved settings handed to a [`QrRenderer`](super::ports::QrRenderer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    /// Quiet zone around the symbol, in modules.
    pub margin: u32,
    /// Output width in pixels. Ignored by the terminal format.
    pub width: u32,
    pub color: QrColors,
    #[serde(rename = "errorCorrectionLevel")]
    pub error_correction: ErrorCorrection,
    pub format: ImageFormat,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            margin: 1,
            width: 300,
            color: QrColors::default(),
            error_correction: ErrorCorrection::H,
            format: ImageFormat::Png,
        }
    }
}

impl RenderOptions {
    /// Applies caller overrides on top of these options. Overrides win.
    pub fn merged(&self, overrides: &RenderOverrides) -> Self {
        let color = overrides.color.unwrap_or_default();
        Self {
            margin: overrides.margin.unwrap_or(self.margin),
            width: overrides.width.unwrap_or(self.width),
            color: QrColors {
                dark: color.dark.unwrap_or(self.color.dark),
                light: color.light.unwrap_or(self.color.light),
            },
            error_correction: overrides
                .error_correction
                .unwrap_or(self.error_correction),
            format: overrides.format.unwrap_or(self.format),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 {
            return Err(PaymentError::InvalidOption(
                "width must be greater than zero".to_string(),
            ));
        }
        if self.width > MAX_WIDTH {
            return Err(PaymentError::InvalidOption(format!(
                "width {} exceeds the maximum of {MAX_WIDTH}",
                self.width
            )));
        }
        if self.margin > MAX_MARGIN {
            return Err(PaymentError::InvalidOption(format!(
                "margin {} exceeds the maximum of {MAX_MARGIN}",
                self.margin
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorOverrides {
    pub dark: Option<Color>,
    pub light: Option<Color>,
}

/// Partial [`RenderOptions`], as supplied by a caller or an options file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct RenderOverrides {
    pub margin: Option<u32>,
    pub width: Option<u32>,
    pub color: Option<ColorOverrides>,
    #[serde(rename = "errorCorrectionLevel")]
    pub error_correction: Option<ErrorCorrection>,
    pub format: Option<ImageFormat>,
}

/// A rendered QR code together with the exact text it encodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrImage {
    pub payload: String,
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

impl QrImage {
    /// Self-contained `data:` URI suitable for an `<img src>`.
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            STANDARD.encode(&self.bytes)
        )
    }
}
