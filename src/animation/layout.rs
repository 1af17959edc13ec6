//! Canonical sheet layout: the standard block on top, custom-animation bands stacked below it.
//!
//! Bands are placed in first-seen order and each starts where the previous one ends. Compositor,
//! previewer and exporter all read band positions from here.

use crate::animation::custom::AnimationRegistry;
use crate::foundation::core::{PixelRect, Size, UNIVERSAL_SHEET_HEIGHT, UNIVERSAL_SHEET_WIDTH};
use crate::foundation::error::CharsheetResult;

/// Vertical band reserved for one custom animation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomBand {
    pub name: String,
    pub y: u32,
    pub size: Size,
    pub frame_size: u32,
}

impl CustomBand {
    pub fn region(&self) -> PixelRect {
        PixelRect::new(0, self.y, self.size.width, self.size.height)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetLayout {
    pub size: Size,
    pub bands: Vec<CustomBand>,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self::standard_only()
    }
}

impl SheetLayout {
    pub fn standard_only() -> Self {
        Self {
            size: Size::universal_sheet(),
            bands: Vec::new(),
        }
    }

    /// Lay out `custom_names` (distinct, first-seen order) below the standard block.
    pub fn new<S: AsRef<str>>(
        registry: &AnimationRegistry,
        custom_names: &[S],
    ) -> CharsheetResult<Self> {
        let mut width = UNIVERSAL_SHEET_WIDTH;
        let mut y = UNIVERSAL_SHEET_HEIGHT;
        let mut bands = Vec::with_capacity(custom_names.len());
        for name in custom_names {
            let name = name.as_ref();
            let anim = registry.require_custom(name)?;
            let size = anim.size();
            width = width.max(size.width);
            bands.push(CustomBand {
                name: name.to_string(),
                y,
                size,
                frame_size: anim.frame_size,
            });
            y += size.height;
        }
        Ok(Self {
            size: Size::new(width, y),
            bands,
        })
    }

    pub fn band(&self, name: &str) -> Option<&CustomBand> {
        self.bands.iter().find(|b| b.name == name)
    }

    pub fn custom_names(&self) -> impl Iterator<Item = &str> {
        self.bands.iter().map(|b| b.name.as_str())
    }
}

/// Total composite size for the given custom animations.
pub fn total_sheet_size<S: AsRef<str>>(
    registry: &AnimationRegistry,
    custom_names: &[S],
) -> CharsheetResult<Size> {
    Ok(SheetLayout::new(registry, custom_names)?.size)
}

/// Distinct custom-animation ids in first-seen order.
pub fn distinct_custom_animations<'a>(ids: impl IntoIterator<Item = Option<&'a str>>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for id in ids.into_iter().flatten() {
        if !out.iter().any(|seen| seen == id) {
            out.push(id.to_string());
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/animation/layout.rs"]
mod tests;
