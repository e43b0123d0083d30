//! Page layout analysis: reading order of placed images.

mod reading_order;

pub use reading_order::ImageLocator;

use crate::pdf::PageImage;

/// Anything with a position on a page and a stable extraction index.
pub trait Placed {
    /// Horizontal position.
    fn x(&self) -> f32;

    /// Vertical position, in the coordinate convention of the page.
    fn y(&self) -> f32;

    /// Original extraction index, used to break ties.
    fn order_index(&self) -> usize;
}

impl Placed for PageImage {
    fn x(&self) -> f32 {
        self.bbox.x
    }

    fn y(&self) -> f32 {
        self.bbox.y
    }

    fn order_index(&self) -> usize {
        self.index
    }
}
