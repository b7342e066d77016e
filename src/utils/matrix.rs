//! A dense, row-major matrix of `f64` owned in a single buffer.

use std::ops::{Index, IndexMut};

use savefile_derive::Savefile;

#[derive(Debug, Clone, PartialEq, Savefile)]
/// A dense matrix stored row-major in one contiguous buffer.
///
/// Every accessor checks bounds on both the row and the column, so a swapped index fails loudly
/// instead of silently reading some other cell of the buffer.
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Creates a matrix filled with zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Creates a matrix where every cell is computed by `f(row, col)`, visited row-major.
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut data = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                data.push(f(row, col));
            }
        }

        Matrix { rows, cols, data }
    }

    /// Wraps an already row-major buffer, returning None if its length is not `rows * cols`.
    pub fn from_row_major(rows: usize, cols: usize, data: Vec<f64>) -> Option<Self> {
        if data.len() != rows * cols {
            return None;
        }

        Some(Matrix { rows, cols, data })
    }

    /// The amount of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// The amount of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    fn offset(&self, row: usize, col: usize) -> Option<usize> {
        if row < self.rows && col < self.cols {
            Some(row * self.cols + col)
        } else {
            None
        }
    }

    /// Gets the value at `(row, col)` or None if it is out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.offset(row, col).map(|offset| self.data[offset])
    }

    /// Borrows one full row.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    pub fn row(&self, row: usize) -> &[f64] {
        assert!(row < self.rows, "row {} out of bounds for {} rows", row, self.rows);
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Mutably borrows one full row.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        assert!(row < self.rows, "row {} out of bounds for {} rows", row, self.rows);
        let cols = self.cols;
        &mut self.data[row * cols..(row + 1) * cols]
    }

    /// The whole buffer in row-major order.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Multiplies a row vector by this matrix, `result[col] = sum_row vector[row] * self[row, col]`,
    /// which is how inputs flow through an `inputs x outputs` weight matrix.
    ///
    /// # Panics
    ///
    /// Panics if the vector's length differs from the amount of rows.
    pub fn vector_product(&self, vector: &[f64]) -> Vec<f64> {
        assert_eq!(self.rows, vector.len());

        let mut result = vec![0.0_f64; self.cols];
        for (row, value) in vector.iter().enumerate() {
            for (col, weight) in self.row(row).iter().enumerate() {
                result[col] += value * weight;
            }
        }

        result
    }

    /// Multiplies this matrix by a column vector, `result[row] = sum_col self[row, col] * vector[col]`,
    /// which is how errors flow backwards through an `inputs x outputs` weight matrix.
    ///
    /// # Panics
    ///
    /// Panics if the vector's length differs from the amount of columns.
    pub fn product_with(&self, vector: &[f64]) -> Vec<f64> {
        assert_eq!(self.cols, vector.len());

        (0..self.rows)
            .map(|row| {
                self.row(row)
                    .iter()
                    .zip(vector)
                    .map(|(weight, value)| weight * value)
                    .sum::<f64>()
            })
            .collect()
    }

    /// Creates the transposed matrix.
    pub fn transpose(&self) -> Self {
        Matrix::from_fn(self.cols, self.rows, |row, col| self[(col, row)])
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        match self.offset(row, col) {
            Some(offset) => &self.data[offset],
            None => panic!(
                "index ({}, {}) out of bounds for a {}x{} matrix",
                row, col, self.rows, self.cols
            ),
        }
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        let (rows, cols) = (self.rows, self.cols);
        match self.offset(row, col) {
            Some(offset) => &mut self.data[offset],
            None => panic!(
                "index ({}, {}) out of bounds for a {}x{} matrix",
                row, col, rows, cols
            ),
        }
    }
}
