use crate::foundation::core::{PixelRect, UNIVERSAL_FRAME_SIZE};
use crate::foundation::error::{CharsheetError, CharsheetResult};

/// Facing directions of a four-row animation block, top to bottom.
pub const DIRECTIONS: [&str; 4] = ["n", "w", "s", "e"];

/// One standard animation's place in the universal sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationDescriptor {
    pub name: &'static str,
    /// First sheet row (in frames) of this animation's block.
    pub row: u32,
    pub frame_count: u32,
    /// Number of direction rows (4, or 1 for `hurt`/`climb`).
    pub rows: u32,
}

impl AnimationDescriptor {
    const fn new(name: &'static str, row: u32, frame_count: u32, rows: u32) -> Self {
        Self {
            name,
            row,
            frame_count,
            rows,
        }
    }

    pub fn row_offset_px(&self) -> u32 {
        self.row * UNIVERSAL_FRAME_SIZE
    }

    /// Pixel region holding this animation's frames in the universal sheet.
    pub fn region(&self) -> PixelRect {
        PixelRect::new(
            0,
            self.row_offset_px(),
            self.frame_count * UNIVERSAL_FRAME_SIZE,
            self.rows * UNIVERSAL_FRAME_SIZE,
        )
    }

    /// Key looked up in a layer's supported-animation list.
    pub fn support_key(&self) -> &'static str {
        support_key(self.name)
    }

    pub fn is_supported_by<S: AsRef<str>>(&self, supported: &[S]) -> bool {
        let key = self.support_key();
        supported.iter().any(|s| s.as_ref() == key)
    }
}

/// The fixed standard animation table, in draw order.
pub static STANDARD_ANIMATIONS: [AnimationDescriptor; 15] = [
    AnimationDescriptor::new("spellcast", 0, 7, 4),
    AnimationDescriptor::new("thrust", 4, 8, 4),
    AnimationDescriptor::new("walk", 8, 9, 4),
    AnimationDescriptor::new("slash", 12, 6, 4),
    AnimationDescriptor::new("shoot", 16, 13, 4),
    AnimationDescriptor::new("hurt", 20, 6, 1),
    AnimationDescriptor::new("climb", 21, 6, 1),
    AnimationDescriptor::new("idle", 22, 2, 4),
    AnimationDescriptor::new("jump", 26, 5, 4),
    AnimationDescriptor::new("sit", 30, 3, 4),
    AnimationDescriptor::new("emote", 34, 3, 4),
    AnimationDescriptor::new("run", 38, 8, 4),
    AnimationDescriptor::new("combat_idle", 42, 2, 4),
    AnimationDescriptor::new("backslash", 46, 13, 4),
    AnimationDescriptor::new("halfslash", 50, 7, 4),
];

/// `walk`, the animation previewed by default.
pub fn walk() -> &'static AnimationDescriptor {
    &STANDARD_ANIMATIONS[2]
}

pub fn standard_animation(name: &str) -> Option<&'static AnimationDescriptor> {
    STANDARD_ANIMATIONS.iter().find(|a| a.name == name)
}

/// Name under which item metadata lists support for a standard animation.
pub fn support_key(animation: &str) -> &str {
    match animation {
        "combat_idle" => "combat",
        "backslash" => "1h_slash",
        "halfslash" => "1h_halfslash",
        other => other,
    }
}

/// Split `dir/file.png` at the last `/`.
pub fn split_file_path(file_path: &str) -> CharsheetResult<(&str, &str)> {
    file_path.rsplit_once('/').ok_or_else(|| {
        CharsheetError::validation(format!(
            "could not split '{file_path}' into directory and file"
        ))
    })
}

/// Path of a layer's sub-image for one standard animation: `dir/<animation>/file`.
pub fn animation_sheet_path(file_path: &str, animation: &AnimationDescriptor) -> CharsheetResult<String> {
    let (dir, file) = split_file_path(file_path)?;
    Ok(format!("{dir}/{}/{file}", animation.name))
}

#[cfg(test)]
#[path = "../../tests/unit/animation/standard.rs"]
mod tests;
