//! Dense integer matrix used for the EP and AP weight tables.

use crate::domain::error::{DomainError, DomainResult};

/// Row-major integer matrix.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<i32>,
}

impl Matrix {
    /// Zero-filled matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0; rows * cols],
        }
    }

    /// Build from a list of rows.
    ///
    /// Ragged rows are padded with zeros to the longest row. When there are rows
    /// but all of them are empty the width is 1, so the matrix keeps one column.
    pub fn from_rows<R: AsRef<[i32]>>(rows: &[R]) -> Self {
        if rows.is_empty() {
            return Self::default();
        }
        let cols = rows.iter().map(|r| r.as_ref().len()).max().unwrap_or(0).max(1);
        let mut m = Self::zeros(rows.len(), cols);
        for (i, row) in rows.iter().enumerate() {
            for (j, &v) in row.as_ref().iter().enumerate() {
                m.data[i * cols + j] = v;
            }
        }
        m
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Unchecked read; callers are expected to stay within `rows` x `cols`.
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> i32 {
        self.data[row * self.cols + col]
    }

    pub fn get(&self, row: usize, col: usize) -> Option<i32> {
        (row < self.rows && col < self.cols).then(|| self.at(row, col))
    }

    pub fn set(&mut self, row: usize, col: usize, value: i32) -> DomainResult<()> {
        if row >= self.rows || col >= self.cols {
            return Err(DomainError::CellOutOfBounds {
                matrix: "matrix",
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        self.data[row * self.cols + col] = value;
        Ok(())
    }

    pub fn to_rows(&self) -> Vec<Vec<i32>> {
        (0..self.rows)
            .map(|r| self.data[r * self.cols..(r + 1) * self.cols].to_vec())
            .collect()
    }

    /// Insert a zero row before `row` (or append when `row == rows`).
    pub fn insert_row(&mut self, row: usize) {
        let row = row.min(self.rows);
        if self.cols == 0 {
            self.cols = 1;
            self.data = vec![0; self.rows];
        }
        let at = row * self.cols;
        self.data.splice(at..at, std::iter::repeat(0).take(self.cols));
        self.rows += 1;
    }

    pub fn remove_row(&mut self, row: usize) {
        if row >= self.rows {
            return;
        }
        let at = row * self.cols;
        self.data.drain(at..at + self.cols);
        self.rows -= 1;
    }

    /// Resize, keeping the overlapping cells and zero-filling new ones.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        let mut next = Self::zeros(rows, cols);
        for r in 0..self.rows.min(rows) {
            for c in 0..self.cols.min(cols) {
                next.data[r * cols + c] = self.at(r, c);
            }
        }
        *self = next;
    }
}
