// Uniform spatial hash over the canvas. Each cell lists the ids of the boxes
// touching it, so a collision check only visits local neighbours.

use super::types::LabelBox;
use crate::config::Canvas;

#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    rows: usize,
    cols: usize,
    padding: f32,
    cells: Vec<Vec<usize>>,
    boxes: Vec<LabelBox>,
}

impl SpatialGrid {
    pub fn new(canvas: &Canvas, cell_size: f32, padding: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size >= 1.0 {
            cell_size
        } else {
            1.0
        };
        let cols = ((canvas.width / cell_size).ceil() as usize).max(1);
        let rows = ((canvas.height / cell_size).ceil() as usize).max(1);
        Self {
            cell_size,
            rows,
            cols,
            padding: padding.max(0.0),
            cells: vec![Vec::new(); rows * cols],
            boxes: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&LabelBox> {
        self.boxes.get(id)
    }

    pub fn padding(&self) -> f32 {
        self.padding
    }

    fn axis_range(&self, lo: f32, hi: f32, limit: usize) -> (usize, usize) {
        let last = limit - 1;
        let to_cell = |value: f32| -> usize {
            let cell = (value / self.cell_size).floor();
            if cell <= 0.0 {
                0
            } else {
                (cell as usize).min(last)
            }
        };
        (to_cell(lo), to_cell(hi))
    }

    /// Every `(row, col)` whose square intersects the box, clamped to the grid.
    pub fn cells_for(&self, bbox: &LabelBox) -> Vec<(usize, usize)> {
        let (col_start, col_end) = self.axis_range(bbox.left(), bbox.right(), self.cols);
        let (row_start, row_end) = self.axis_range(bbox.top(), bbox.bottom(), self.rows);
        let mut cells = Vec::with_capacity((row_end - row_start + 1) * (col_end - col_start + 1));
        for row in row_start..=row_end {
            for col in col_start..=col_end {
                cells.push((row, col));
            }
        }
        cells
    }

    /// Register a box and return its id.
    pub fn insert(&mut self, bbox: LabelBox) -> usize {
        let id = self.boxes.len();
        for (row, col) in self.cells_for(&bbox) {
            self.cells[row * self.cols + col].push(id);
        }
        self.boxes.push(bbox);
        id
    }

    /// Ids of every box sharing a cell with `bbox`, each reported once.
    /// Candidates only; callers still run the exact test.
    pub fn query(&self, bbox: &LabelBox) -> Vec<usize> {
        let mut found = Vec::new();
        for (row, col) in self.cells_for(bbox) {
            found.extend_from_slice(&self.cells[row * self.cols + col]);
        }
        found.sort_unstable();
        found.dedup();
        found
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
        self.boxes.clear();
    }

    /// Replace the contents with `boxes`; ids follow iteration order.
    pub fn rebuild(&mut self, boxes: impl IntoIterator<Item = LabelBox>) {
        self.clear();
        for bbox in boxes {
            self.insert(bbox);
        }
    }

    /// Ids of stored boxes whose padded extent intersects the padded `bbox`.
    pub fn colliding(&self, bbox: &LabelBox) -> Vec<usize> {
        // Two boxes interact when their gap is under twice the padding, so the
        // cell lookup has to reach that far.
        self.query(&bbox.inflate(self.padding * 2.0))
            .into_iter()
            .filter(|&id| bbox.overlaps(&self.boxes[id], self.padding))
            .collect()
    }

    pub fn has_collision(&self, bbox: &LabelBox) -> bool {
        self.query(&bbox.inflate(self.padding * 2.0))
            .into_iter()
            .any(|id| bbox.overlaps(&self.boxes[id], self.padding))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> SpatialGrid {
        SpatialGrid::new(&Canvas::default(), 50.0, 2.0)
    }

    #[test]
    fn cells_cover_box_extent() {
        let grid = grid();
        let cells = grid.cells_for(&LabelBox::new(75.0, 25.0, 30.0, 10.0));
        assert_eq!(cells, vec![(0, 0), (0, 1), (0, 2)]);
    }

    #[test]
    fn cells_are_clamped_to_grid() {
        let grid = grid();
        let cells = grid.cells_for(&LabelBox::new(-100.0, 700.0, 10.0, 10.0));
        assert_eq!(cells, vec![(11, 0)]);
        let cells = grid.cells_for(&LabelBox::new(1250.0, 10.0, 10.0, 10.0));
        assert_eq!(cells, vec![(0, 23)]);
    }

    #[test]
    fn query_reports_spanning_box_once() {
        let mut grid = grid();
        let wide = grid.insert(LabelBox::new(300.0, 300.0, 200.0, 60.0));
        let far = grid.insert(LabelBox::new(1100.0, 50.0, 10.0, 10.0));
        let found = grid.query(&LabelBox::new(300.0, 300.0, 150.0, 50.0));
        assert_eq!(found, vec![wide]);
        assert!(!found.contains(&far));
    }

    #[test]
    fn collision_respects_padding() {
        let mut grid = grid();
        grid.insert(LabelBox::new(100.0, 100.0, 20.0, 10.0));
        // Gap of 3 units: inside 2 * padding.
        assert!(grid.has_collision(&LabelBox::new(143.0, 100.0, 20.0, 10.0)));
        // Gap of 5 units: clear.
        assert!(!grid.has_collision(&LabelBox::new(145.0, 100.0, 20.0, 10.0)));
    }

    #[test]
    fn collision_found_across_cell_boundary() {
        let mut grid = grid();
        // Right edge at 49, candidate left edge at 51: different cells.
        grid.insert(LabelBox::new(39.0, 20.0, 10.0, 5.0));
        assert!(grid.has_collision(&LabelBox::new(61.0, 20.0, 10.0, 5.0)));
    }

    #[test]
    fn rebuild_replaces_contents() {
        let mut grid = grid();
        grid.insert(LabelBox::new(100.0, 100.0, 20.0, 10.0));
        grid.rebuild([
            LabelBox::new(500.0, 300.0, 20.0, 10.0),
            LabelBox::new(700.0, 300.0, 20.0, 10.0),
        ]);
        assert_eq!(grid.len(), 2);
        assert!(!grid.has_collision(&LabelBox::new(100.0, 100.0, 20.0, 10.0)));
        assert_eq!(grid.colliding(&LabelBox::new(505.0, 300.0, 5.0, 5.0)), vec![0]);
    }
}
