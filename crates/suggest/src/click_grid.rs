//! Coarse grid of click cells; each field cell covers 2x2 of them.

use blocks_core::{PieceType, Placement, CLICK_CELLS_PER_CELL};

/// Which visible button owns each click cell.
#[derive(Clone, Debug, Default)]
pub struct ClickGrid {
    width: i32,
    height: i32,
    owners: Vec<Option<u8>>,
}

impl ClickGrid {
    pub fn new(columns: usize, rows: usize) -> Self {
        let width = columns as i32 * CLICK_CELLS_PER_CELL;
        let height = rows as i32 * CLICK_CELLS_PER_CELL;
        Self {
            width,
            height,
            owners: vec![None; (width * height).max(0) as usize],
        }
    }

    pub fn clear(&mut self) {
        self.owners.iter_mut().for_each(|owner| *owner = None);
    }

    #[inline(always)]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        (x >= 0 && y >= 0 && x < self.width && y < self.height).then(|| (y * self.width + x) as usize)
    }

    /// Click cells covered by `piece` at `placement`.
    pub fn footprint<'a>(piece: &'a PieceType, placement: Placement) -> impl Iterator<Item = (i32, i32)> + 'a {
        let origin_x = placement.position.x * CLICK_CELLS_PER_CELL;
        let origin_y = placement.position.y * CLICK_CELLS_PER_CELL;
        piece
            .shape(placement.rotation)
            .click_cells()
            .iter()
            .map(move |&(dx, dy)| (origin_x + dx, origin_y + dy))
    }

    /// True when no click cell of the footprint is taken.
    pub fn fits(&self, piece: &PieceType, placement: Placement) -> bool {
        Self::footprint(piece, placement).all(|(x, y)| {
            self.index(x, y)
                .map_or(true, |idx| self.owners[idx].is_none())
        })
    }

    pub fn occupy(&mut self, piece: &PieceType, placement: Placement, button: u8) {
        for (x, y) in Self::footprint(piece, placement) {
            if let Some(idx) = self.index(x, y) {
                self.owners[idx] = Some(button);
            }
        }
    }

    /// Button under a point given in field cell units.
    pub fn button_at(&self, x: f32, y: f32) -> Option<u8> {
        let cx = (x * CLICK_CELLS_PER_CELL as f32).floor() as i32;
        let cy = (y * CLICK_CELLS_PER_CELL as f32).floor() as i32;
        self.index(cx, cy).and_then(|idx| self.owners[idx])
    }

    pub fn occupied_count(&self) -> usize {
        self.owners.iter().filter(|owner| owner.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blocks_core::{PieceCatalog, Position, Rotation};

    #[test]
    fn test_occupy_and_hit() {
        let catalog = PieceCatalog::standard();
        let o = catalog.get("O").unwrap();
        let mut grid = ClickGrid::new(10, 20);
        let placement = Placement::new(Position::new(2, 0), Rotation::ZERO);
        assert!(grid.fits(o, placement));
        grid.occupy(o, placement, 3);
        assert_eq!(grid.occupied_count(), 16);
        assert_eq!(grid.button_at(2.1, 0.2), Some(3));
        assert_eq!(grid.button_at(3.9, 1.9), Some(3));
        assert_eq!(grid.button_at(4.0, 0.5), None);
        assert_eq!(grid.button_at(-0.5, 0.5), None);

        assert!(!grid.fits(o, Placement::new(Position::new(3, 1), Rotation::ZERO)));
        assert!(grid.fits(o, Placement::new(Position::new(4, 0), Rotation::ZERO)));

        grid.clear();
        assert_eq!(grid.occupied_count(), 0);
    }
}
