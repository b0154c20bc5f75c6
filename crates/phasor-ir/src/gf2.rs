//! Dense matrices over GF(2).
//!
//! Used for CNOT parity maps (an `n × n` invertible matrix `A` such that a
//! CNOT circuit sends the basis state `|x⟩` to `|A·x⟩`) and as the storage of
//! the Clifford tableau.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A dense binary matrix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitMatrix {
    data: Array2<bool>,
}

impl BitMatrix {
    /// All-zero `rows × cols` matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: Array2::from_elem((rows, cols), false),
        }
    }

    /// `n × n` identity.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.data[[i, i]] = true;
        }
        m
    }

    /// Build from row vectors. All rows must have equal length.
    pub fn from_rows(rows: &[Vec<bool>]) -> Self {
        let cols = rows.first().map_or(0, Vec::len);
        let mut m = Self::zeros(rows.len(), cols);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), cols, "ragged rows");
            for (j, &bit) in row.iter().enumerate() {
                m.data[[i, j]] = bit;
            }
        }
        m
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Entry `(i, j)`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> bool {
        self.data[[i, j]]
    }

    /// Set entry `(i, j)`.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: bool) {
        self.data[[i, j]] = value;
    }

    /// Flip entry `(i, j)`.
    #[inline]
    pub fn toggle(&mut self, i: usize, j: usize) {
        self.data[[i, j]] ^= true;
    }

    /// Borrow the underlying array.
    pub fn as_array(&self) -> &Array2<bool> {
        &self.data
    }

    /// Row `i` as a vector.
    pub fn row(&self, i: usize) -> Vec<bool> {
        self.data.row(i).to_vec()
    }

    /// Column `j` as a vector.
    pub fn column(&self, j: usize) -> Vec<bool> {
        self.data.column(j).to_vec()
    }

    /// `row[target] ^= row[source]`.
    pub fn add_row(&mut self, source: usize, target: usize) {
        debug_assert_ne!(source, target);
        for j in 0..self.cols() {
            if self.data[[source, j]] {
                self.data[[target, j]] ^= true;
            }
        }
    }

    /// `col[target] ^= col[source]`.
    pub fn add_col(&mut self, source: usize, target: usize) {
        debug_assert_ne!(source, target);
        for i in 0..self.rows() {
            if self.data[[i, source]] {
                self.data[[i, target]] ^= true;
            }
        }
    }

    /// Swap two rows.
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for j in 0..self.cols() {
            self.data.swap([a, j], [b, j]);
        }
    }

    /// Swap two columns.
    pub fn swap_cols(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for i in 0..self.rows() {
            self.data.swap([i, a], [i, b]);
        }
    }

    /// Transposed copy.
    #[must_use]
    pub fn transpose(&self) -> Self {
        Self {
            data: self.data.t().to_owned(),
        }
    }

    /// Matrix product over GF(2).
    ///
    /// # Panics
    /// If the inner dimensions disagree.
    #[must_use]
    pub fn mul(&self, rhs: &BitMatrix) -> BitMatrix {
        assert_eq!(self.cols(), rhs.rows(), "dimension mismatch in GF(2) product");
        let mut out = BitMatrix::zeros(self.rows(), rhs.cols());
        for i in 0..self.rows() {
            for k in 0..self.cols() {
                if self.data[[i, k]] {
                    for j in 0..rhs.cols() {
                        if rhs.data[[k, j]] {
                            out.data[[i, j]] ^= true;
                        }
                    }
                }
            }
        }
        out
    }

    /// Matrix-vector product over GF(2).
    pub fn mul_vec(&self, v: &[bool]) -> Vec<bool> {
        assert_eq!(self.cols(), v.len(), "dimension mismatch in GF(2) product");
        (0..self.rows())
            .map(|i| {
                (0..self.cols()).fold(false, |acc, j| acc ^ (self.data[[i, j]] & v[j]))
            })
            .collect()
    }

    /// Rank over GF(2).
    pub fn rank(&self) -> usize {
        let mut m = self.clone();
        let mut rank = 0;
        for col in 0..m.cols() {
            let Some(pivot) = (rank..m.rows()).find(|&r| m.get(r, col)) else {
                continue;
            };
            m.swap_rows(rank, pivot);
            for r in 0..m.rows() {
                if r != rank && m.get(r, col) {
                    m.add_row(rank, r);
                }
            }
            rank += 1;
        }
        rank
    }

    /// True if square and full rank.
    pub fn is_invertible(&self) -> bool {
        self.rows() == self.cols() && self.rank() == self.rows()
    }

    /// Inverse by Gauss–Jordan elimination, or `None` if singular.
    pub fn inverse(&self) -> Option<BitMatrix> {
        if self.rows() != self.cols() {
            return None;
        }
        let n = self.rows();
        let mut m = self.clone();
        let mut inv = BitMatrix::identity(n);
        for col in 0..n {
            let pivot = (col..n).find(|&r| m.get(r, col))?;
            m.swap_rows(col, pivot);
            inv.swap_rows(col, pivot);
            for r in 0..n {
                if r != col && m.get(r, col) {
                    m.add_row(col, r);
                    inv.add_row(col, r);
                }
            }
        }
        Some(inv)
    }

    /// Solve `self · x = b` for a square invertible matrix.
    pub fn solve(&self, b: &[bool]) -> Option<Vec<bool>> {
        self.inverse().map(|inv| inv.mul_vec(b))
    }

    /// The square submatrix on the given row and column index lists.
    pub fn submatrix(&self, rows: &[usize], cols: &[usize]) -> BitMatrix {
        let mut out = BitMatrix::zeros(rows.len(), cols.len());
        for (i, &r) in rows.iter().enumerate() {
            for (j, &c) in cols.iter().enumerate() {
                out.data[[i, j]] = self.data[[r, c]];
            }
        }
        out
    }
}

impl fmt::Display for BitMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.data.rows() {
            let line: String = row.iter().map(|&b| if b { '1' } else { '0' }).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(rows: &[&str]) -> BitMatrix {
        let rows: Vec<Vec<bool>> = rows
            .iter()
            .map(|r| r.chars().map(|c| c == '1').collect())
            .collect();
        BitMatrix::from_rows(&rows)
    }

    #[test]
    fn test_inverse_roundtrip() {
        let a = m(&["110", "011", "001"]);
        let inv = a.inverse().unwrap();
        assert_eq!(a.mul(&inv), BitMatrix::identity(3));
        assert_eq!(inv.mul(&a), BitMatrix::identity(3));
    }

    #[test]
    fn test_singular_has_no_inverse() {
        let a = m(&["110", "110", "001"]);
        assert!(a.inverse().is_none());
        assert_eq!(a.rank(), 2);
        assert!(!a.is_invertible());
    }

    #[test]
    fn test_row_and_col_ops() {
        let mut a = BitMatrix::identity(3);
        a.add_row(0, 2);
        assert_eq!(a, m(&["100", "010", "101"]));
        a.add_col(2, 1);
        assert_eq!(a, m(&["100", "010", "111"]));
    }

    #[test]
    fn test_solve() {
        let a = m(&["101", "011", "001"]);
        let x = a.solve(&[false, true, true]).unwrap();
        assert_eq!(a.mul_vec(&x), vec![false, true, true]);
    }

    #[test]
    fn test_transpose_and_display() {
        let a = m(&["10", "11"]);
        assert_eq!(a.transpose(), m(&["11", "01"]));
        assert_eq!(a.to_string(), "10\n11\n");
    }
}
