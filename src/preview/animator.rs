//! Looping preview of one animation, cut from the composite sheet.
//!
//! Each tick draws the current frame column of every direction row side by side into a small
//! strip surface. Playback begins once the first composite pass has completed.

use std::time::{Duration, Instant};

use crate::animation::custom::AnimationRegistry;
use crate::animation::standard::{AnimationDescriptor, standard_animation, walk};
use crate::foundation::core::{PixelRect, Size, UNIVERSAL_FRAME_SIZE};
use crate::foundation::error::{CharsheetError, CharsheetResult};
use crate::render::compositor::CompositeSheet;
use crate::render::surface::Surface;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreviewState {
    Idle,
    Playing,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PreviewTarget {
    Standard(&'static AnimationDescriptor),
    Custom { name: String, skip_first_frame: bool },
}

pub struct Animator {
    interval: Duration,
    state: PreviewState,
    target: PreviewTarget,
    cycle: Vec<u32>,
    frame_index: usize,
    frame_size: u32,
    rows: u32,
    past: Option<Instant>,
    strip: Surface,
}

impl std::fmt::Debug for Animator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Animator")
            .field("state", &self.state)
            .field("target", &self.target)
            .field("frame_index", &self.frame_index)
            .finish_non_exhaustive()
    }
}

/// Frame columns played for a standard animation when no cycle is given.
///
/// Frame 0 is a rest pose and is always skipped, so two-frame animations hold frame 1.
pub fn default_cycle(animation: &AnimationDescriptor) -> Vec<u32> {
    (1..animation.frame_count).collect()
}

impl Animator {
    /// Idle animator previewing `walk`.
    pub fn new(interval: Duration) -> Self {
        let walk = walk();
        let mut animator = Self {
            interval,
            state: PreviewState::Idle,
            target: PreviewTarget::Standard(walk),
            cycle: Vec::new(),
            frame_index: 0,
            frame_size: UNIVERSAL_FRAME_SIZE,
            rows: 0,
            past: None,
            strip: Surface::default(),
        };
        animator.apply_standard(walk, None);
        animator
    }

    pub fn state(&self) -> PreviewState {
        self.state
    }

    pub fn target(&self) -> &PreviewTarget {
        &self.target
    }

    pub fn cycle(&self) -> &[u32] {
        &self.cycle
    }

    /// Frame column shown by the last tick.
    pub fn current_frame(&self) -> u32 {
        self.cycle.get(self.frame_index).copied().unwrap_or(0)
    }

    pub fn strip(&self) -> &Surface {
        &self.strip
    }

    /// Leave `Idle`; the first frame is drawn on the next tick past the interval.
    pub fn start(&mut self, now: Instant) {
        if self.state == PreviewState::Idle {
            self.state = PreviewState::Playing;
            self.past = Some(now);
            tracing::debug!("preview started");
        }
    }

    /// Preview a standard animation, optionally with an explicit frame cycle.
    pub fn select_standard(&mut self, name: &str, cycle: Option<Vec<u32>>) -> CharsheetResult<()> {
        let animation = standard_animation(name).ok_or_else(|| {
            CharsheetError::validation(format!("unknown animation '{name}'"))
        })?;
        if let Some(cycle) = &cycle {
            if cycle.is_empty() || cycle.iter().any(|&c| c >= animation.frame_count) {
                return Err(CharsheetError::validation(format!(
                    "invalid preview cycle for '{name}'"
                )));
            }
        }
        self.apply_standard(animation, cycle);
        Ok(())
    }

    /// Preview a custom animation band.
    pub fn select_custom(&mut self, name: &str, registry: &AnimationRegistry) -> CharsheetResult<()> {
        let custom = registry.require_custom(name)?;
        let start = u32::from(custom.skip_first_frame_in_preview);
        self.cycle = (start..custom.widest_row() as u32).collect();
        if self.cycle.is_empty() {
            self.cycle.push(0);
        }
        self.frame_size = custom.frame_size;
        self.rows = custom.frames.len() as u32;
        self.target = PreviewTarget::Custom {
            name: name.to_string(),
            skip_first_frame: custom.skip_first_frame_in_preview,
        };
        self.reset_strip();
        Ok(())
    }

    /// Advance one frame when more than an interval has passed since the last advance.
    ///
    /// Returns `true` when the strip was redrawn.
    pub fn tick(&mut self, now: Instant, sheet: &CompositeSheet) -> bool {
        if self.state != PreviewState::Playing {
            return false;
        }
        let past = *self.past.get_or_insert(now);
        let elapsed = now.saturating_duration_since(past);
        if elapsed <= self.interval {
            return false;
        }
        let interval_ns = self.interval.as_nanos().max(1);
        let remainder = (elapsed.as_nanos() % interval_ns) as u64;
        self.past = Some(now - Duration::from_nanos(remainder));

        self.frame_index = (self.frame_index + 1) % self.cycle.len().max(1);
        self.draw_frame(sheet);
        true
    }

    fn draw_frame(&mut self, sheet: &CompositeSheet) {
        self.strip.clear();
        let fs = self.frame_size;
        let (offset, row_start) = match &self.target {
            PreviewTarget::Standard(animation) => (0, animation.row),
            PreviewTarget::Custom { name, .. } => match sheet.layout.band(name) {
                Some(band) => (band.y, 0),
                None => return,
            },
        };
        let column = self.current_frame();
        for i in 0..self.rows {
            let src = PixelRect::new(column * fs, offset + (row_start + i) * fs, fs, fs);
            let dst = PixelRect::new(i * fs, 0, fs, fs);
            self.strip.draw_image_region(&sheet.surface, src, dst);
        }
    }

    fn apply_standard(&mut self, animation: &'static AnimationDescriptor, cycle: Option<Vec<u32>>) {
        self.cycle = cycle.unwrap_or_else(|| default_cycle(animation));
        self.frame_size = UNIVERSAL_FRAME_SIZE;
        self.rows = animation.rows;
        self.target = PreviewTarget::Standard(animation);
        self.reset_strip();
    }

    fn reset_strip(&mut self) {
        self.frame_index = 0;
        self.strip
            .resize(Size::new(self.rows * self.frame_size, self.frame_size));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/preview/animator.rs"]
mod tests;
