use std::fmt;
use std::ops::{Index, IndexMut};

use rayon::prelude::*;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{NnError, Result};
use crate::math::scalar::Scalar;

/// Dense, row-major, two-dimensional matrix.
///
/// Every row holds exactly `cols` elements. Operations that produce a new
/// matrix allocate fresh storage; the few that mutate take `&mut self`
/// (`set`, `broadcast`, `apply_by_element`).
///
/// The column-indexed operations (`add`, `multiply`, `transpose`, `clip`, ...)
/// fan out one rayon task per output column and join before returning.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T = f64> {
    rows: usize,
    cols: usize,
    data: Vec<Vec<T>>,
}

impl<T> Default for Matrix<T> {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

impl<T: Scalar> Matrix<T> {
    /// Builds a matrix from literal rows. Fails on empty input or ragged rows.
    pub fn new(data: Vec<Vec<T>>) -> Result<Matrix<T>> {
        let cols = match data.first() {
            Some(first) => first.len(),
            None => return Err(NnError::InvalidData("at least one row is required".into())),
        };
        if let Some(i) = data.iter().position(|row| row.len() != cols) {
            return Err(NnError::InvalidData(format!(
                "row {i} has {} columns, expected {cols}",
                data[i].len()
            )));
        }
        Ok(Matrix { rows: data.len(), cols, data })
    }

    pub fn zeros(rows: usize, cols: usize) -> Matrix<T> {
        Matrix::filled(rows, cols, T::zero())
    }

    pub fn ones(rows: usize, cols: usize) -> Matrix<T> {
        Matrix::filled(rows, cols, T::one())
    }

    pub fn filled(rows: usize, cols: usize, value: T) -> Matrix<T> {
        Matrix { rows, cols, data: vec![vec![value; cols]; rows] }
    }

    pub fn identity(n: usize) -> Matrix<T> {
        Matrix::from_fn(n, n, |i, j| if i == j { T::one() } else { T::zero() })
    }

    /// Fills a `rows x cols` matrix by calling `f(row, col)` in row-major order.
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Matrix<T>
    where
        F: FnMut(usize, usize) -> T,
    {
        let data = (0..rows)
            .map(|i| (0..cols).map(|j| f(i, j)).collect())
            .collect();
        Matrix { rows, cols, data }
    }

    /// Runs `column(j)` for every output column in parallel, then stitches the
    /// columns back into row-major storage once all tasks have finished.
    fn from_columns<F>(rows: usize, cols: usize, column: F) -> Matrix<T>
    where
        F: Fn(usize) -> Vec<T> + Sync + Send,
    {
        let columns: Vec<Vec<T>> = (0..cols).into_par_iter().map(column).collect();

        let mut data: Vec<Vec<T>> = (0..rows).map(|_| Vec::with_capacity(cols)).collect();
        for values in columns {
            for (row, value) in data.iter_mut().zip(values) {
                row.push(value);
            }
        }
        Matrix { rows, cols, data }
    }

    // ------------------------------------------------------------------
    // Shape
    // ------------------------------------------------------------------

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`
    pub fn size(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn are_same_size(&self, other: &Matrix<T>) -> bool {
        self.size() == other.size()
    }

    fn in_range(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    fn out_of_range(&self, row: usize, col: usize) -> NnError {
        NnError::IndexOutOfRange { row, col, rows: self.rows, cols: self.cols }
    }

    fn require_same_size(&self, other: &Matrix<T>) -> Result<()> {
        if self.are_same_size(other) {
            Ok(())
        } else {
            Err(NnError::DimensionMismatch { left: self.size(), right: other.size() })
        }
    }

    // ------------------------------------------------------------------
    // Element access
    // ------------------------------------------------------------------

    pub fn at(&self, row: usize, col: usize) -> Result<T> {
        if !self.in_range(row, col) {
            return Err(self.out_of_range(row, col));
        }
        Ok(self.data[row][col])
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        if !self.in_range(row, col) {
            return Err(self.out_of_range(row, col));
        }
        self.data[row][col] = value;
        Ok(())
    }

    pub fn row(&self, row: usize) -> Option<&[T]> {
        self.data.get(row).map(Vec::as_slice)
    }

    pub fn column(&self, col: usize) -> Option<Vec<T>> {
        (col < self.cols).then(|| self.data.iter().map(|row| row[col]).collect())
    }

    pub fn data(&self) -> &[Vec<T>] {
        &self.data
    }

    pub fn into_data(self) -> Vec<Vec<T>> {
        self.data
    }

    /// Sum of every element.
    pub fn sum(&self) -> T {
        self.data
            .iter()
            .flat_map(|row| row.iter())
            .fold(T::zero(), |acc, &v| acc + v)
    }

    /// Exact comparison: dimensions first, then every element.
    pub fn equals(&self, other: &Matrix<T>) -> bool {
        self == other
    }

    // ------------------------------------------------------------------
    // Algebra
    // ------------------------------------------------------------------

    /// Combines two same-size matrices element by element.
    pub fn zip_map<F>(&self, other: &Matrix<T>, op: F) -> Result<Matrix<T>>
    where
        F: Fn(T, T) -> T + Sync + Send,
    {
        self.require_same_size(other)?;
        Ok(Matrix::from_columns(self.rows, self.cols, |j| {
            (0..self.rows)
                .map(|i| op(self.data[i][j], other.data[i][j]))
                .collect()
        }))
    }

    pub fn add(&self, other: &Matrix<T>) -> Result<Matrix<T>> {
        self.zip_map(other, |a, b| a + b)
    }

    pub fn subtract(&self, other: &Matrix<T>) -> Result<Matrix<T>> {
        self.zip_map(other, |a, b| a - b)
    }

    /// Hadamard product.
    pub fn multiply_elementwise(&self, other: &Matrix<T>) -> Result<Matrix<T>> {
        self.zip_map(other, |a, b| a * b)
    }

    pub fn add_scalar(&self, k: T) -> Matrix<T> {
        self.map(|v| v + k)
    }

    pub fn multiply_by_scalar(&self, k: T) -> Matrix<T> {
        self.map(|v| v * k)
    }

    /// Standard matrix product `self · other`.
    pub fn multiply(&self, other: &Matrix<T>) -> Result<Matrix<T>> {
        if self.cols != other.rows {
            return Err(NnError::NotConformable { left: self.size(), right: other.size() });
        }
        Ok(Matrix::from_columns(self.rows, other.cols, |j| {
            (0..self.rows)
                .map(|i| {
                    (0..self.cols).fold(T::zero(), |acc, k| acc + self.data[i][k] * other.data[k][j])
                })
                .collect()
        }))
    }

    pub fn transpose(&self) -> Matrix<T> {
        Matrix::from_columns(self.cols, self.rows, |j| self.data[j].clone())
    }

    /// Applies `f` to every element, returning a new matrix.
    pub fn map<F>(&self, f: F) -> Matrix<T>
    where
        F: Fn(T) -> T + Sync + Send,
    {
        Matrix::from_columns(self.rows, self.cols, |j| {
            (0..self.rows).map(|i| f(self.data[i][j])).collect()
        })
    }

    /// Maps every column (one sample, in a column-batched matrix) through `f`
    /// in parallel. `f` must return a column of the same length.
    pub fn map_columns<F>(&self, f: F) -> Matrix<T>
    where
        F: Fn(Vec<T>) -> Vec<T> + Sync + Send,
    {
        Matrix::from_columns(self.rows, self.cols, |j| {
            f((0..self.rows).map(|i| self.data[i][j]).collect())
        })
    }

    /// Applies `f` to every element in place.
    pub fn apply_by_element<F>(&mut self, mut f: F)
    where
        F: FnMut(T) -> T,
    {
        for value in self.data.iter_mut().flat_map(|row| row.iter_mut()) {
            *value = f(*value);
        }
    }

    /// Bounds every element to `[lower, upper]`.
    pub fn clip(&self, lower: T, upper: T) -> Matrix<T> {
        self.map(|v| {
            if v < lower {
                lower
            } else if v > upper {
                upper
            } else {
                v
            }
        })
    }

    /// Shallow copy. Rust storage is never shared, so this is a plain clone.
    pub fn copy(&self) -> Matrix<T> {
        self.clone()
    }

    /// Independent copy built column by column.
    pub fn deep_copy(&self) -> Matrix<T> {
        Matrix::from_columns(self.rows, self.cols, |j| {
            (0..self.rows).map(|i| self.data[i][j]).collect()
        })
    }

    /// Tiles the matrix in place to `new_rows x new_cols`.
    ///
    /// Both targets must be positive multiples of the current dimensions:
    /// a 1x1 matrix holding `3` broadcast to 2x3 becomes `[[3, 3, 3], [3, 3, 3]]`.
    pub fn broadcast(&mut self, new_rows: usize, new_cols: usize) -> Result<()> {
        let (rows, cols) = self.size();
        if rows == 0
            || cols == 0
            || new_rows < rows
            || new_cols < cols
            || new_rows % rows != 0
            || new_cols % cols != 0
        {
            return Err(NnError::InvalidBroadcast { from: (rows, cols), to: (new_rows, new_cols) });
        }

        for row in &mut self.data {
            let original = row.clone();
            row.reserve(new_cols - cols);
            for _ in 1..new_cols / cols {
                row.extend_from_slice(&original);
            }
        }
        let tile = self.data.clone();
        for _ in 1..new_rows / rows {
            self.data.extend(tile.iter().cloned());
        }

        self.rows = new_rows;
        self.cols = new_cols;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Square-matrix helpers (cofactor expansion; not used while training)
    // ------------------------------------------------------------------

    /// The `(rows-1) x (cols-1)` matrix left after removing `row` and `col`.
    pub fn minor(&self, row: usize, col: usize) -> Result<Matrix<T>> {
        if !self.in_range(row, col) {
            return Err(self.out_of_range(row, col));
        }
        let data = self
            .data
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != row)
            .map(|(_, values)| {
                values
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != col)
                    .map(|(_, v)| *v)
                    .collect()
            })
            .collect();
        Ok(Matrix { rows: self.rows - 1, cols: self.cols - 1, data })
    }

    fn cofactor(&self, row: usize, col: usize) -> Result<T> {
        let minor_det = self.minor(row, col)?.determinant()?;
        Ok(if (row + col) % 2 == 0 { minor_det } else { -minor_det })
    }

    pub fn determinant(&self) -> Result<T> {
        if self.rows != self.cols {
            return Err(NnError::NotSquare { rows: self.rows, cols: self.cols });
        }
        match self.rows {
            0 => Err(NnError::InvalidData("determinant of an empty matrix".into())),
            1 => Ok(self.data[0][0]),
            2 => Ok(self.data[0][0] * self.data[1][1] - self.data[0][1] * self.data[1][0]),
            n => {
                let mut det = T::zero();
                for col in 0..n {
                    det = det + self.data[0][col] * self.cofactor(0, col)?;
                }
                Ok(det)
            }
        }
    }

    /// Inverse through the adjugate. Integer element types truncate on division.
    pub fn inverse(&self) -> Result<Matrix<T>> {
        let det = self.determinant()?;
        if det.is_zero() {
            return Err(NnError::SingularMatrix);
        }
        if self.rows == 1 {
            return Ok(Matrix::filled(1, 1, T::one() / det));
        }

        let mut cofactors = Matrix::zeros(self.rows, self.cols);
        for i in 0..self.rows {
            for j in 0..self.cols {
                cofactors.data[i][j] = self.cofactor(i, j)?;
            }
        }
        Ok(cofactors.transpose().map(|v| v / det))
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        &self.data[row][col]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        &mut self.data[row][col]
    }
}

impl<T: fmt::Display> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, row) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "[")?;
            for (j, value) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{value}")?;
            }
            write!(f, "]")?;
        }
        write!(f, "]")
    }
}

// Serialized as a bare array of rows: `[[1.0, 2.0], [3.0, 4.0]]`.
impl<T: Serialize> Serialize for Matrix<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.data.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Matrix<T>
where
    T: Scalar + Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let data = Vec::<Vec<T>>::deserialize(deserializer)?;
        Matrix::new(data).map_err(D::Error::custom)
    }
}
