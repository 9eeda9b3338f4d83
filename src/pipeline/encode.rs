//! Page raster encoding: `DynamicImage` → base64 PNG string.
//!
//! The encoded raster travels with the page so downstream consumers
//! (table detectors, layout models) can work from the exact pixels whose
//! size `Page::scale` describes. PNG keeps glyph edges lossless.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode a rendered page as base64 PNG.
pub fn encode_page(img: &DynamicImage) -> Result<String, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let b64 = STANDARD.encode(&buf);
    debug!(
        "Encoded {}x{} page image → {} bytes base64",
        img.width(),
        img.height(),
        b64.len()
    );
    Ok(b64)
}
