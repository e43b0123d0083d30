//! Row-major reading order with a row tolerance.

use std::cmp::Ordering;

use super::Placed;
use crate::models::config::{LayoutConfig, VerticalOrigin};

/// Orders page images top-to-bottom, then left-to-right within a row.
#[derive(Debug, Clone)]
pub struct ImageLocator {
    row_tolerance: f32,
    origin: VerticalOrigin,
}

impl ImageLocator {
    /// Create a locator from configuration.
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            row_tolerance: config.row_tolerance,
            origin: config.origin,
        }
    }

    /// Sort items into reading order.
    ///
    /// Items are first ordered from the visual top down. The topmost item
    /// not yet in a row anchors a new row; following items join it while
    /// their vertical distance to the anchor is within the row tolerance.
    /// Each row is then ordered left to right. Ties break on the
    /// extraction index, so the result does not depend on input order.
    pub fn order<T: Placed>(&self, mut items: Vec<T>) -> Vec<T> {
        items.sort_by(|a, b| {
            self.depth(a)
                .total_cmp(&self.depth(b))
                .then_with(|| a.order_index().cmp(&b.order_index()))
        });

        let mut rows: Vec<Vec<T>> = Vec::new();
        let mut anchor = f32::NEG_INFINITY;

        for item in items {
            let depth = self.depth(&item);
            match rows.last_mut() {
                Some(row) if depth - anchor <= self.row_tolerance => row.push(item),
                _ => {
                    anchor = depth;
                    rows.push(vec![item]);
                }
            }
        }

        rows.into_iter()
            .flat_map(|mut row| {
                row.sort_by(horizontal);
                row
            })
            .collect()
    }

    /// Distance from the visual top; smaller is higher on the page.
    fn depth<T: Placed>(&self, item: &T) -> f32 {
        match self.origin {
            VerticalOrigin::BottomLeft => -item.y(),
            VerticalOrigin::TopLeft => item.y(),
        }
    }
}

impl Default for ImageLocator {
    fn default() -> Self {
        Self::new(&LayoutConfig::default())
    }
}

fn horizontal<T: Placed>(a: &T, b: &T) -> Ordering {
    a.x()
        .total_cmp(&b.x())
        .then_with(|| a.order_index().cmp(&b.order_index()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        x: f32,
        y: f32,
        index: usize,
    }

    impl Placed for Item {
        fn x(&self) -> f32 {
            self.x
        }
        fn y(&self) -> f32 {
            self.y
        }
        fn order_index(&self) -> usize {
            self.index
        }
    }

    fn item(index: usize, x: f32, y: f32) -> Item {
        Item { x, y, index }
    }

    fn indices(items: &[Item]) -> Vec<usize> {
        items.iter().map(|i| i.index).collect()
    }

    /// 3x3 photo grid in PDF space (y grows upwards), extracted column-wise.
    fn grid() -> Vec<Item> {
        vec![
            item(0, 50.0, 700.0),
            item(1, 50.0, 500.0),
            item(2, 50.0, 300.0),
            item(3, 250.0, 703.0),
            item(4, 250.0, 498.0),
            item(5, 250.0, 305.0),
            item(6, 450.0, 695.0),
            item(7, 450.0, 502.0),
            item(8, 450.0, 300.0),
        ]
    }

    #[test]
    fn test_grid_reading_order() {
        let ordered = ImageLocator::default().order(grid());
        assert_eq!(indices(&ordered), vec![0, 3, 6, 1, 4, 7, 2, 5, 8]);
    }

    #[test]
    fn test_top_left_origin() {
        let config = LayoutConfig {
            origin: VerticalOrigin::TopLeft,
            ..LayoutConfig::default()
        };
        let items = vec![item(0, 10.0, 300.0), item(1, 10.0, 100.0), item(2, 200.0, 105.0)];
        let ordered = ImageLocator::new(&config).order(items);
        assert_eq!(indices(&ordered), vec![1, 2, 0]);
    }

    #[test]
    fn test_row_tolerance_boundary() {
        let locator = ImageLocator::default();

        // 20 units apart: same row, so left-to-right wins
        let same_row = vec![item(0, 300.0, 500.0), item(1, 100.0, 480.0)];
        assert_eq!(indices(&locator.order(same_row)), vec![1, 0]);

        // 21 units apart: different rows, so the higher one comes first
        let two_rows = vec![item(0, 300.0, 500.0), item(1, 100.0, 479.0)];
        assert_eq!(indices(&locator.order(two_rows)), vec![0, 1]);
    }

    #[test]
    fn test_idempotent() {
        let locator = ImageLocator::default();
        let once = locator.order(grid());
        let twice = locator.order(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_independent_of_input_permutation() {
        let locator = ImageLocator::default();
        let expected = locator.order(grid());

        let mut reversed = grid();
        reversed.reverse();
        assert_eq!(locator.order(reversed), expected);

        let mut rotated = grid();
        rotated.rotate_left(4);
        assert_eq!(locator.order(rotated), expected);
    }

    #[test]
    fn test_ties_break_on_index() {
        let items = vec![item(2, 10.0, 100.0), item(0, 10.0, 100.0), item(1, 10.0, 100.0)];
        let ordered = ImageLocator::default().order(items);
        assert_eq!(indices(&ordered), vec![0, 1, 2]);
    }

    #[test]
    fn test_rows_anchor_on_topmost_member() {
        // Each step is within tolerance of the previous item, but the third
        // is 30 units below the first and starts a new row.
        let items = vec![item(0, 300.0, 500.0), item(1, 200.0, 485.0), item(2, 100.0, 470.0)];
        let ordered = ImageLocator::default().order(items);
        assert_eq!(indices(&ordered), vec![1, 0, 2]);
    }

    #[test]
    fn test_empty() {
        let ordered: Vec<Item> = ImageLocator::default().order(Vec::new());
        assert!(ordered.is_empty());
    }
}
