use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::animation::standard::{DIRECTIONS, STANDARD_ANIMATIONS, standard_animation};
use crate::foundation::core::Size;
use crate::foundation::error::{CharsheetError, CharsheetResult};

/// Reference to one source frame: a named sheet row and a column, written `"row,column"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FrameRef {
    pub row: String,
    pub column: u32,
}

impl FromStr for FrameRef {
    type Err = CharsheetError;

    fn from_str(s: &str) -> CharsheetResult<Self> {
        let (row, column) = s.split_once(',').ok_or_else(|| {
            CharsheetError::validation(format!("frame ref '{s}' must be 'row,column'"))
        })?;
        let column = column.trim().parse().map_err(|_| {
            CharsheetError::validation(format!("frame ref '{s}' has a non-numeric column"))
        })?;
        Ok(Self {
            row: row.trim().to_string(),
            column,
        })
    }
}

impl TryFrom<String> for FrameRef {
    type Error = CharsheetError;

    fn try_from(value: String) -> CharsheetResult<Self> {
        value.parse()
    }
}

impl From<FrameRef> for String {
    fn from(value: FrameRef) -> Self {
        value.to_string()
    }
}

impl fmt::Display for FrameRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.row, self.column)
    }
}

fn default_base() -> String {
    "walk".to_string()
}

/// Content-defined animation with its own frame size, assembled from frames of the standard block.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomAnimation {
    pub frame_size: u32,
    /// Rows of frames; rows may be ragged.
    pub frames: Vec<Vec<FrameRef>>,
    /// Standard animation whose drawing triggers this animation's frame copy.
    #[serde(default = "default_base")]
    pub base: String,
    #[serde(default)]
    pub skip_first_frame_in_preview: bool,
}

impl CustomAnimation {
    pub fn widest_row(&self) -> usize {
        self.frames.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Pixel size of this animation's band: widest row × frame size by row count × frame size.
    pub fn size(&self) -> Size {
        Size::new(
            self.widest_row() as u32 * self.frame_size,
            self.frames.len() as u32 * self.frame_size,
        )
    }

    pub fn is_based_on(&self, standard: &str) -> bool {
        self.base == standard
    }

    pub fn validate(&self, name: &str, rows: &AnimationRowsLayout) -> CharsheetResult<()> {
        if self.frame_size == 0 {
            return Err(CharsheetError::validation(format!(
                "custom animation '{name}' has frameSize 0"
            )));
        }
        if self.frames.is_empty() || self.frames.iter().any(Vec::is_empty) {
            return Err(CharsheetError::validation(format!(
                "custom animation '{name}' has an empty frame row"
            )));
        }
        if standard_animation(&self.base).is_none() {
            return Err(CharsheetError::validation(format!(
                "custom animation '{name}' is based on unknown animation '{}'",
                self.base
            )));
        }
        for frame in self.frames.iter().flatten() {
            if rows.row(&frame.row).is_none() {
                return Err(CharsheetError::validation(format!(
                    "custom animation '{name}' references unknown row '{}'",
                    frame.row
                )));
            }
        }
        Ok(())
    }
}

/// Row names of the universal sheet mapped to absolute row indices.
///
/// Four-direction animations name their rows `<animation>-<n|w|s|e>`; single-row animations
/// use the bare animation name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimationRowsLayout {
    rows: HashMap<String, u32>,
}

impl Default for AnimationRowsLayout {
    fn default() -> Self {
        Self::standard()
    }
}

impl AnimationRowsLayout {
    pub fn standard() -> Self {
        let mut rows = HashMap::new();
        for anim in &STANDARD_ANIMATIONS {
            if anim.rows == 1 {
                rows.insert(anim.name.to_string(), anim.row);
                continue;
            }
            for (i, dir) in DIRECTIONS.iter().enumerate().take(anim.rows as usize) {
                rows.insert(format!("{}-{dir}", anim.name), anim.row + i as u32);
            }
        }
        Self { rows }
    }

    pub fn row(&self, name: &str) -> Option<u32> {
        self.rows.get(name).copied()
    }
}

/// Geometry lookups for custom animations, on top of the fixed standard table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnimationRegistry {
    custom: BTreeMap<String, CustomAnimation>,
    rows: AnimationRowsLayout,
}

impl AnimationRegistry {
    pub fn new(custom: BTreeMap<String, CustomAnimation>) -> Self {
        Self {
            custom,
            rows: AnimationRowsLayout::standard(),
        }
    }

    pub fn custom(&self, name: &str) -> Option<&CustomAnimation> {
        self.custom.get(name)
    }

    pub fn require_custom(&self, name: &str) -> CharsheetResult<&CustomAnimation> {
        self.custom(name).ok_or_else(|| {
            CharsheetError::validation(format!("unknown custom animation '{name}'"))
        })
    }

    pub fn custom_names(&self) -> impl Iterator<Item = &str> {
        self.custom.keys().map(String::as_str)
    }

    pub fn rows_layout(&self) -> &AnimationRowsLayout {
        &self.rows
    }

    pub fn validate(&self) -> CharsheetResult<()> {
        for (name, anim) in &self.custom {
            anim.validate(name, &self.rows)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/custom.rs"]
mod tests;
