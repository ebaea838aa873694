//! Browser pixel to terminal cell mapping.
//!
//! The DOM grid reports mouse positions in CSS pixels; the reducer works in
//! cells. Kept free of `web_sys` so it can be tested natively.

/// Pixel bounds of the rendered grid plus its size in cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub columns: u16,
    pub rows: u16,
    /// Measured size of one cell, when the DOM exposes it.
    pub cell: Option<(f64, f64)>,
}

impl GridGeometry {
    /// Cell under the pixel `(x, y)`, or `None` outside the grid.
    pub fn cell_at(&self, x: f64, y: f64) -> Option<(u16, u16)> {
        if self.width <= 0.0 || self.height <= 0.0 || self.columns == 0 || self.rows == 0 {
            return None;
        }

        let (dx, dy) = (x - self.left, y - self.top);
        if !(0.0..self.width).contains(&dx) || !(0.0..self.height).contains(&dy) {
            return None;
        }

        let (column, row) = match self.cell {
            Some((w, h)) if w > 0.0 && h > 0.0 => ((dx / w).floor(), (dy / h).floor()),
            _ => (
                (dx / self.width * f64::from(self.columns)).floor(),
                (dy / self.height * f64::from(self.rows)).floor(),
            ),
        };

        Some((
            (column as u16).min(self.columns - 1),
            (row as u16).min(self.rows - 1),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::GridGeometry;

    fn grid(cell: Option<(f64, f64)>) -> GridGeometry {
        GridGeometry {
            left: 100.0,
            top: 50.0,
            width: 400.0,
            height: 200.0,
            columns: 40,
            rows: 10,
            cell,
        }
    }

    #[test]
    fn maps_with_measured_cell() {
        assert_eq!(grid(Some((10.0, 20.0))).cell_at(149.9, 89.9), Some((4, 1)));
    }

    #[test]
    fn clamps_to_grid_size() {
        // A cell measurement slightly smaller than the real pitch overshoots.
        assert_eq!(grid(Some((9.0, 19.0))).cell_at(499.0, 249.0), Some((39, 9)));
    }

    #[test]
    fn proportional_without_cell_size() {
        assert_eq!(grid(None).cell_at(150.0, 70.0), Some((5, 1)));
    }

    #[test]
    fn outside_grid_is_none() {
        assert_eq!(grid(None).cell_at(99.0, 60.0), None);
        assert_eq!(grid(None).cell_at(200.0, 250.0), None);
    }

    #[test]
    fn empty_grid_is_none() {
        let mut g = grid(None);
        g.columns = 0;
        assert_eq!(g.cell_at(150.0, 60.0), None);
    }
}
