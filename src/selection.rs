/// Boolean matrix of selected (row, validation column) cells.
///
/// Rows follow the displayed window and columns follow the validation
/// columns. Both axes change independently, so every accessor is bounds
/// checked and out-of-range cells read as unselected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionGrid {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl SelectionGrid {
    pub fn build(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![false; rows * cols],
        }
    }

    /// New grid of `new_rows x new_cols`. Cells inside both the old and the
    /// new bounds, with a row below `previous_rows`, keep their value.
    pub fn resize(&self, previous_rows: usize, new_rows: usize, new_cols: usize) -> Self {
        if previous_rows == self.rows && new_rows == self.rows && new_cols == self.cols {
            return self.clone();
        }
        let mut next = Self::build(new_rows, new_cols);
        let keep_rows = previous_rows.min(self.rows).min(new_rows);
        let keep_cols = self.cols.min(new_cols);
        for x in 0..keep_rows {
            for y in 0..keep_cols {
                if self.get(x, y) {
                    next.set(x, y, true);
                }
            }
        }
        next
    }

    fn offset(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.rows && y < self.cols).then(|| x * self.cols + y)
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        self.offset(x, y).is_some_and(|i| self.cells[i])
    }

    /// Returns false when `(x, y)` is out of bounds and nothing changed.
    pub fn set(&mut self, x: usize, y: usize, value: bool) -> bool {
        match self.offset(x, y) {
            Some(i) => {
                self.cells[i] = value;
                true
            }
            None => false,
        }
    }

    pub fn toggle(&mut self, x: usize, y: usize) -> bool {
        let value = !self.get(x, y);
        self.set(x, y, value)
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = false);
    }

    /// Drop row `x`, shifting later rows up.
    pub fn remove_row(&mut self, x: usize) {
        if x >= self.rows {
            return;
        }
        let start = x * self.cols;
        self.cells.drain(start..start + self.cols);
        self.rows -= 1;
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Selected cells in row-major order.
    pub fn selected(&self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c)
            .map(|(i, _)| (i / self.cols, i % self.cols))
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }
}
