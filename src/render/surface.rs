use std::io::Cursor;

use anyhow::Context;

use crate::assets::decode::SpriteImage;
use crate::foundation::core::{PixelRect, Size};
use crate::foundation::error::{CharsheetError, CharsheetResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;
use crate::render::blend::{PremulRgba8, over};

/// Opaque pink used as a mask color in some source sheets.
pub const PINK_MASK: [u8; 3] = [255, 44, 230];

/// Anything that can be read as premultiplied RGBA8 pixels.
pub trait PixelSource {
    fn size(&self) -> Size;
    fn rgba8_premul(&self) -> &[u8];

    fn pixel(&self, x: u32, y: u32) -> PremulRgba8 {
        let size = self.size();
        if x >= size.width || y >= size.height {
            return [0; 4];
        }
        let i = ((y as usize) * (size.width as usize) + x as usize) * 4;
        let d = self.rgba8_premul();
        [d[i], d[i + 1], d[i + 2], d[i + 3]]
    }
}

impl PixelSource for SpriteImage {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    fn rgba8_premul(&self) -> &[u8] {
        &self.rgba8_premul
    }
}

/// CPU drawing surface, premultiplied RGBA8, row-major.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Surface {
    size: Size,
    data: Vec<u8>,
}

impl PixelSource for Surface {
    fn size(&self) -> Size {
        self.size
    }

    fn rgba8_premul(&self) -> &[u8] {
        &self.data
    }
}

impl Surface {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            data: vec![0; byte_len(size)],
        }
    }

    pub fn width(&self) -> u32 {
        self.size.width
    }

    pub fn height(&self) -> u32 {
        self.size.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Reallocate to `size`; the contents are cleared.
    pub fn resize(&mut self, size: Size) {
        self.size = size;
        self.data.clear();
        self.data.resize(byte_len(size), 0);
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    pub fn bounds(&self) -> PixelRect {
        PixelRect::new(0, 0, self.size.width, self.size.height)
    }

    /// Draw `src_rect` of `src` scaled into `dst_rect` (nearest neighbour, source-over).
    ///
    /// Pixels outside either the source image or this surface are clipped.
    pub fn draw_image_region(&mut self, src: &dyn PixelSource, src_rect: PixelRect, dst_rect: PixelRect) {
        if src_rect.width == 0 || src_rect.height == 0 || dst_rect.width == 0 || dst_rect.height == 0 {
            return;
        }
        let src_size = src.size();
        let x_end = dst_rect.x.saturating_add(dst_rect.width).min(self.size.width);
        let y_end = dst_rect.y.saturating_add(dst_rect.height).min(self.size.height);
        let stride = self.size.width as usize;

        for dy in dst_rect.y..y_end {
            let v = u64::from(dy - dst_rect.y) * u64::from(src_rect.height) / u64::from(dst_rect.height);
            let sy = src_rect.y as u64 + v;
            if sy >= u64::from(src_size.height) {
                continue;
            }
            for dx in dst_rect.x..x_end {
                let u = u64::from(dx - dst_rect.x) * u64::from(src_rect.width) / u64::from(dst_rect.width);
                let sx = src_rect.x as u64 + u;
                if sx >= u64::from(src_size.width) {
                    continue;
                }
                let s = src.pixel(sx as u32, sy as u32);
                if s[3] == 0 {
                    continue;
                }
                let i = (dy as usize * stride + dx as usize) * 4;
                let d = &mut self.data[i..i + 4];
                let out = over([d[0], d[1], d[2], d[3]], s);
                d.copy_from_slice(&out);
            }
        }
    }

    /// Draw the whole of `src` unscaled with its top-left corner at `(x, y)`.
    pub fn draw_image(&mut self, src: &dyn PixelSource, x: u32, y: u32) {
        let size = src.size();
        self.draw_image_region(
            src,
            PixelRect::new(0, 0, size.width, size.height),
            PixelRect::new(x, y, size.width, size.height),
        );
    }

    /// Copy a region of this surface onto another region of itself.
    pub fn draw_self_region(&mut self, src_rect: PixelRect, dst_rect: PixelRect) {
        let patch = self.crop(src_rect);
        self.draw_image_region(&patch, patch.bounds(), dst_rect);
    }

    /// New surface holding `rect`; parts outside this surface are transparent.
    pub fn crop(&self, rect: PixelRect) -> Surface {
        let mut out = Surface::new(rect.size());
        let x_end = rect.x.saturating_add(rect.width).min(self.size.width);
        let y_end = rect.y.saturating_add(rect.height).min(self.size.height);
        if rect.x >= x_end || rect.y >= y_end {
            return out;
        }
        let run = (x_end - rect.x) as usize * 4;
        for y in rect.y..y_end {
            let src = (y as usize * self.size.width as usize + rect.x as usize) * 4;
            let dst = ((y - rect.y) as usize * rect.width as usize) * 4;
            out.data[dst..dst + run].copy_from_slice(&self.data[src..src + run]);
        }
        out
    }

    /// True when any pixel is not fully transparent.
    pub fn has_content(&self) -> bool {
        self.data.chunks_exact(4).any(|px| px[3] != 0)
    }

    pub fn region_has_content(&self, rect: PixelRect) -> bool {
        self.crop(rect).has_content()
    }

    /// Make every pixel of straight color `rgb` fully transparent. Returns the count replaced.
    pub fn remove_color(&mut self, rgb: [u8; 3]) -> usize {
        let mut replaced = 0;
        for px in self.data.chunks_exact_mut(4) {
            if px[3] == 0 {
                continue;
            }
            let mut straight = [px[0], px[1], px[2], px[3]];
            unpremultiply_rgba8_in_place(&mut straight);
            if straight[..3] == rgb {
                px.fill(0);
                replaced += 1;
            }
        }
        replaced
    }

    /// Straight-alpha RGBA8 copy of the pixels.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut rgba = self.data.clone();
        unpremultiply_rgba8_in_place(&mut rgba);
        rgba
    }

    pub fn to_sprite_image(&self) -> CharsheetResult<SpriteImage> {
        SpriteImage::from_premul(self.size.width, self.size.height, self.data.clone())
    }

    pub fn encode_png(&self) -> CharsheetResult<Vec<u8>> {
        if self.size.is_empty() {
            return Err(CharsheetError::render("cannot encode an empty surface"));
        }
        let img = image::RgbaImage::from_raw(self.size.width, self.size.height, self.to_straight_rgba8())
            .ok_or_else(|| CharsheetError::render("surface buffer does not match its size"))?;
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png)
            .context("encode png")?;
        Ok(out.into_inner())
    }
}

fn byte_len(size: Size) -> usize {
    size.width as usize * size.height as usize * 4
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
