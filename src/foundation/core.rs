use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{CharsheetError, CharsheetResult};

/// Edge length of one frame square in the universal sheet.
pub const UNIVERSAL_FRAME_SIZE: u32 = 64;
/// Width of the universal sheet (13 columns).
pub const UNIVERSAL_SHEET_WIDTH: u32 = 832;
/// Height of the universal sheet (54 rows, one row-block per standard animation).
pub const UNIVERSAL_SHEET_HEIGHT: u32 = 3456;

/// Width and height in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn universal_sheet() -> Self {
        Self::new(UNIVERSAL_SHEET_WIDTH, UNIVERSAL_SHEET_HEIGHT)
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Axis-aligned pixel rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn size(self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Character base selecting which file variant of each layer is drawn.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum BodyType {
    #[default]
    Male,
    Female,
    Teen,
    Child,
    Muscular,
    Pregnant,
}

impl BodyType {
    pub const ALL: [BodyType; 6] = [
        BodyType::Male,
        BodyType::Female,
        BodyType::Teen,
        BodyType::Child,
        BodyType::Muscular,
        BodyType::Pregnant,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BodyType::Male => "male",
            BodyType::Female => "female",
            BodyType::Teen => "teen",
            BodyType::Child => "child",
            BodyType::Muscular => "muscular",
            BodyType::Pregnant => "pregnant",
        }
    }
}

impl fmt::Display for BodyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BodyType {
    type Err = CharsheetError;

    fn from_str(s: &str) -> CharsheetResult<Self> {
        BodyType::ALL
            .into_iter()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| CharsheetError::validation(format!("unknown body type '{s}'")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
