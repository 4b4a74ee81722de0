//! QR image rendering
//!
//! The codec only produces payload text. Turning it into pixels goes through
//! the [`QrRenderer`] trait; [`QrCodeRenderer`] is the default implementation
//! built on the `qrcode` crate.

use std::fmt::Write as _;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};
use qrcode::{Color, EcLevel, QrCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error correction is always level M (~15%)
pub const ERROR_CORRECTION: EcLevel = EcLevel::M;

/// Rendering errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("QR encode error: {0}")]
    Encode(String),
    #[error("Invalid color: {0:?}")]
    InvalidColor(String),
    #[error("Image error: {0}")]
    Image(String),
}

/// Output encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// `data:image/png;base64,...`
    Png,
    /// Standalone SVG markup
    Svg,
}

/// Rendering configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    /// Output width and height in pixels
    pub width: u32,
    /// Quiet zone in modules
    pub margin: u32,
    /// Foreground color (`#RRGGBB` or `#RGB`)
    pub dark_color: String,
    /// Background color (`#RRGGBB` or `#RGB`)
    pub light_color: String,
    pub format: ImageFormat,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 280,
            margin: 2,
            dark_color: "#1A1A1A".to_string(),
            light_color: "#FFFFFF".to_string(),
            format: ImageFormat::Png,
        }
    }
}

impl RenderOptions {
    pub fn svg() -> Self {
        Self {
            format: ImageFormat::Svg,
            ..Self::default()
        }
    }
}

/// Rendered QR image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum RenderedQr {
    DataUrl(String),
    Svg(String),
}

impl RenderedQr {
    /// Embeddable URL for either variant; SVG markup is percent-encoded
    pub fn to_data_url(&self) -> String {
        match self {
            RenderedQr::DataUrl(url) => url.clone(),
            RenderedQr::Svg(markup) => {
                format!("data:image/svg+xml;charset=utf-8,{}", urlencoding::encode(markup))
            }
        }
    }
}

/// Turns a finished payload into an image
pub trait QrRenderer {
    fn render(&self, payload: &str, options: &RenderOptions) -> Result<RenderedQr, RenderError>;
}

/// Default renderer backed by the `qrcode` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct QrCodeRenderer;

impl QrCodeRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl QrRenderer for QrCodeRenderer {
    fn render(&self, payload: &str, options: &RenderOptions) -> Result<RenderedQr, RenderError> {
        let code = QrCode::with_error_correction_level(payload.as_bytes(), ERROR_CORRECTION)
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        let grid = ModuleGrid::new(&code, options.margin);

        let dark = parse_color(&options.dark_color)?;
        let light = parse_color(&options.light_color)?;

        if options.width < grid.size {
            return Err(RenderError::Image(format!(
                "width {} is smaller than the {} modules of the symbol",
                options.width, grid.size
            )));
        }

        log::debug!(
            "Rendering {} byte payload as {:?}, {} modules, {}px",
            payload.len(),
            options.format,
            grid.size,
            options.width
        );

        match options.format {
            ImageFormat::Png => render_png(&grid, options.width, dark, light).map(RenderedQr::DataUrl),
            ImageFormat::Svg => Ok(RenderedQr::Svg(render_svg(
                &grid,
                options.width,
                &options.dark_color,
                &options.light_color,
            ))),
        }
    }
}

/// Module matrix including the quiet zone
struct ModuleGrid {
    colors: Vec<Color>,
    symbol: u32,
    margin: u32,
    size: u32,
}

impl ModuleGrid {
    fn new(code: &QrCode, margin: u32) -> Self {
        let symbol = code.width() as u32;
        Self {
            colors: code.to_colors(),
            symbol,
            margin,
            size: symbol + 2 * margin,
        }
    }

    /// Whether the module at (x, y), quiet zone included, is dark
    fn is_dark(&self, x: u32, y: u32) -> bool {
        let (Some(x), Some(y)) = (x.checked_sub(self.margin), y.checked_sub(self.margin)) else {
            return false;
        };
        if x >= self.symbol || y >= self.symbol {
            return false;
        }
        self.colors[(y * self.symbol + x) as usize] == Color::Dark
    }
}

fn render_png(grid: &ModuleGrid, width: u32, dark: [u8; 3], light: [u8; 3]) -> Result<String, RenderError> {
    // One pixel per module, then scale up
    let modules = RgbImage::from_fn(grid.size, grid.size, |x, y| {
        if grid.is_dark(x, y) {
            Rgb(dark)
        } else {
            Rgb(light)
        }
    });
    let img = imageops::resize(&modules, width, width, FilterType::Nearest);

    let mut png_bytes = Vec::new();
    PngEncoder::new(&mut png_bytes)
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgb8)
        .map_err(|e| RenderError::Image(e.to_string()))?;

    Ok(format!("data:image/png;base64,{}", STANDARD.encode(&png_bytes)))
}

// qrcode's svg renderer only knows a fixed 4-module quiet zone
fn render_svg(grid: &ModuleGrid, width: u32, dark: &str, light: &str) -> String {
    let mut path = String::new();
    for y in 0..grid.size {
        for x in 0..grid.size {
            if grid.is_dark(x, y) {
                // Writing into a String cannot fail
                let _ = write!(path, "M{} {}h1v1h-1z", x, y);
            }
        }
    }

    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{w}" "#,
            r#"viewBox="0 0 {n} {n}" shape-rendering="crispEdges">"#,
            r#"<rect width="{n}" height="{n}" fill="{light}"/>"#,
            r#"<path fill="{dark}" d="{path}"/></svg>"#
        ),
        w = width,
        n = grid.size,
        light = light,
        dark = dark,
        path = path
    )
}

/// Parse `#RRGGBB` or `#RGB`
fn parse_color(color: &str) -> Result<[u8; 3], RenderError> {
    let invalid = || RenderError::InvalidColor(color.to_string());
    let hex = color.strip_prefix('#').ok_or_else(invalid)?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
    match hex.len() {
        6 => Ok([channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?]),
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16).ok_or_else(invalid)? as u8;
                rgb[i] = v * 17;
            }
            Ok(rgb)
        }
        _ => Err(invalid()),
    }
}
