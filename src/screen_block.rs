use std::num::NonZeroU32;
use std::ops::Range;

use crate::geometry::ScreenSize;

/// Band of full-width image rows, `min_y` inclusive, `max_y` exclusive.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScreenBlock {
    pub width: u32,
    pub min_y: u32,
    pub max_y: u32,
}

impl ScreenBlock {
    /// Block covering the whole image.
    pub fn from_size(size: ScreenSize) -> Self {
        ScreenBlock {
            width: size.x,
            min_y: 0,
            max_y: size.y,
        }
    }

    pub fn height(&self) -> u32 {
        self.max_y.saturating_sub(self.min_y)
    }

    pub fn rows(&self) -> Range<u32> {
        self.min_y..self.max_y
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.pixel_count() == 0
    }

    /// Splits the block into bands of `tile_rows` rows, top to bottom.
    /// The last band may be shorter.
    pub fn tile_ordering(&self, tile_rows: NonZeroU32) -> Vec<ScreenBlock> {
        if self.is_empty() {
            return Vec::new();
        }

        self.rows()
            .step_by(tile_rows.get() as usize)
            .map(|min_y| ScreenBlock {
                width: self.width,
                min_y,
                max_y: min_y.saturating_add(tile_rows.get()).min(self.max_y),
            })
            .collect()
    }
}
