use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{CharsheetError, CharsheetResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// One decoded sheet, premultiplied RGBA8, row-major. Pixel data is shared between clones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpriteImage {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl SpriteImage {
    /// Wrap an already premultiplied RGBA8 buffer.
    pub fn from_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> CharsheetResult<Self> {
        let expected = u64::from(width) * u64::from(height) * 4;
        if rgba8_premul.len() as u64 != expected {
            return Err(CharsheetError::validation(format!(
                "{width}x{height} sheet needs {expected} bytes, got {}",
                rgba8_premul.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }
}

/// Decode a PNG (or any format `image` recognises) into premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> CharsheetResult<SpriteImage> {
    let rgba = image::load_from_memory(bytes)
        .context("decode sheet image")?
        .into_rgba8();
    let (width, height) = rgba.dimensions();
    let mut pixels = rgba.into_raw();
    premultiply_rgba8_in_place(&mut pixels);
    SpriteImage::from_premul(width, height, pixels)
}

/// Canonical form of a sheet path relative to the asset root.
///
/// Backslashes become `/`, empty and `.` segments are dropped. Absolute paths and `..` are
/// rejected so a catalog can never reach outside the root.
pub fn normalize_rel_path(source: &str) -> CharsheetResult<String> {
    let unified = source.replace('\\', "/");
    if unified.starts_with('/') {
        return Err(CharsheetError::validation(format!(
            "sheet path '{source}' is absolute"
        )));
    }
    let segments = unified
        .split('/')
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .map(|seg| {
            if seg == ".." {
                Err(CharsheetError::validation(format!(
                    "sheet path '{source}' leaves the asset root"
                )))
            } else {
                Ok(seg)
            }
        })
        .collect::<CharsheetResult<Vec<&str>>>()?;
    if segments.is_empty() {
        return Err(CharsheetError::validation(format!(
            "sheet path '{source}' names no file"
        )));
    }
    Ok(segments.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
