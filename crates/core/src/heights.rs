//! Column heights over the visible rows, for the roughness metrics.

use smallvec::SmallVec;

/// Column heights over a list of rows, counted in rows.
///
/// Rows marked as filled are left out of the list by the caller, so the
/// rows above them count as already collapsed onto what lies below. Every
/// roughness metric measures the field the same way.
/// Use for scoring metrics only, not for collision.
#[derive(Clone, Debug)]
pub struct ColumnHeights {
    heights: SmallVec<[i32; 32]>,
}

impl ColumnHeights {
    /// `rows` lists the counted rows bottom first; `solid(x, y)` answers
    /// whether the cell counts as filled. A height of `h` means the top
    /// filled cell sits in `rows[h - 1]`.
    pub fn measure(columns: usize, rows: &[i32], solid: impl Fn(i32, i32) -> bool) -> Self {
        let mut heights = SmallVec::with_capacity(columns);
        for x in 0..columns as i32 {
            let top = rows.iter().rposition(|&y| solid(x, y));
            heights.push(top.map_or(0, |index| index as i32 + 1));
        }
        Self { heights }
    }

    #[inline(always)]
    pub fn height(&self, x: usize) -> i32 {
        self.heights[x]
    }

    pub fn max_height(&self) -> i32 {
        self.heights.iter().copied().max().unwrap_or(0)
    }

    pub fn bumpiness(&self) -> i32 {
        self.heights.windows(2).map(|w| (w[0] - w[1]).abs()).sum()
    }

    /// How far column `x` sits below the lower of its neighbours.
    /// Walls count as infinitely high.
    pub fn well_depth(&self, x: usize) -> i32 {
        let left = if x == 0 { i32::MAX } else { self.heights[x - 1] };
        let right = if x + 1 == self.heights.len() {
            i32::MAX
        } else {
            self.heights[x + 1]
        };
        let min_neighbor = left.min(right);
        if min_neighbor == i32::MAX {
            return 0;
        }
        (min_neighbor - self.heights[x]).max(0)
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(lowest: i32, top: i32) -> Vec<i32> {
        (lowest..top).collect()
    }

    #[test]
    fn test_empty_heights() {
        let h = ColumnHeights::measure(10, &rows(0, 20), |_, _| false);
        assert_eq!(h.len(), 10);
        assert_eq!(h.max_height(), 0);
        assert_eq!(h.bumpiness(), 0);
        assert_eq!(h.well_depth(0), 0);
    }

    #[test]
    fn test_heights_relative_to_lowest_row() {
        let h = ColumnHeights::measure(3, &rows(2, 10), |x, y| x == 1 && y == 4);
        assert_eq!(h.height(0), 0);
        assert_eq!(h.height(1), 3);
        assert_eq!(h.bumpiness(), 6);
    }

    #[test]
    fn test_well_depth() {
        // Heights: [3, 0, 2]
        let h = ColumnHeights::measure(3, &rows(0, 10), |x, y| (x == 0 && y < 3) || (x == 2 && y < 2));
        assert_eq!(h.well_depth(1), 2);
        assert_eq!(h.well_depth(0), 0);
        // Right wall is infinitely high, left neighbour is 0
        assert_eq!(h.well_depth(2), 0);
    }

    #[test]
    fn test_left_out_rows_collapse() {
        // Row 1 left out: the cell at row 2 rests on row 0
        let h = ColumnHeights::measure(2, &[0, 2, 3], |x, y| x == 0 && (y == 0 || y == 2));
        assert_eq!(h.height(0), 2);
        assert_eq!(h.height(1), 0);
        assert_eq!(h.well_depth(1), 2);
    }
}
