use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::ops::{Index, IndexMut, Range};
use std::path::Path;

use rand::Rng;

use crate::element::Element;
use crate::error::{MatrixError, MultiplyError};
use crate::partition::RowRange;

/// Upper bound on the element reservation made from a file header.
const MAX_PREALLOCATED: usize = 1 << 20;

/// Dense row-major matrix. `data.len() == rows * cols` always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T: Element> Matrix<T> {
    /// Create a zero-filled matrix with the given dimensions
    pub fn new(rows: usize, cols: usize) -> Self {
        Matrix {
            data: vec![T::zero(); rows * cols],
            rows,
            cols,
        }
    }

    /// Create a matrix from a row-major vector of data
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize) -> Result<Self, MatrixError> {
        if rows.checked_mul(cols) != Some(data.len()) {
            return Err(MatrixError::LengthMismatch {
                len: data.len(),
                rows,
                cols,
            });
        }
        Ok(Matrix { data, rows, cols })
    }

    /// Create a matrix from nested rows. All rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, MatrixError> {
        let cols = rows.first().map_or(0, Vec::len);
        let row_count = rows.len();
        let mut data = Vec::with_capacity(row_count * cols);

        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != cols {
                return Err(MatrixError::RaggedRows {
                    row,
                    expected: cols,
                    found: values.len(),
                });
            }
            data.extend(values);
        }

        Ok(Matrix {
            data,
            rows: row_count,
            cols,
        })
    }

    /// Create a matrix of uniform samples from `[low, high]`
    pub fn random<R: Rng + ?Sized>(rows: usize, cols: usize, low: T, high: T, rng: &mut R) -> Self {
        let mut matrix = Matrix::new(rows, cols);
        matrix.fill_random(low, high, rng);
        matrix
    }

    pub fn fill_random<R: Rng + ?Sized>(&mut self, low: T, high: T, rng: &mut R) {
        for value in &mut self.data {
            *value = T::sample(rng, low, high);
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Raw row-major storage
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Raw row-major storage, for receiving bulk transfers in place
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Get a value at a specific position
    pub fn get(&self, row: usize, col: usize) -> Result<T, MatrixError> {
        self.check_index(row, col)?;
        Ok(self.data[row * self.cols + col])
    }

    /// Set a value at a specific position
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<(), MatrixError> {
        self.check_index(row, col)?;
        self.data[row * self.cols + col] = value;
        Ok(())
    }

    /// Get a row as a slice
    pub fn get_row(&self, row: usize) -> Result<&[T], MatrixError> {
        self.row_block(RowRange {
            start: row,
            end: row + 1,
        })
    }

    /// Serialized form of rows `[start, end)`: `range.len() * cols` values,
    /// row-major. This is the payload a worker ships to the coordinator.
    pub fn row_block(&self, range: RowRange) -> Result<&[T], MatrixError> {
        let span = self.block_span(range.start, range.len())?;
        Ok(&self.data[span])
    }

    /// Deserialize a row-major block into the rows starting at `start_row`.
    /// `block.len()` must be a whole number of rows.
    pub fn write_row_block(&mut self, start_row: usize, block: &[T]) -> Result<(), MatrixError> {
        if self.cols == 0 {
            return if block.is_empty() {
                Ok(())
            } else {
                Err(MatrixError::Shape {
                    expected: 0,
                    found: block.len(),
                })
            };
        }
        if block.len() % self.cols != 0 {
            return Err(MatrixError::Shape {
                expected: (block.len() / self.cols + 1) * self.cols,
                found: block.len(),
            });
        }
        let span = self.block_span(start_row, block.len() / self.cols)?;
        self.data[span].copy_from_slice(block);
        Ok(())
    }

    /// Multiply two matrices (A * B)
    /// Returns a new matrix C where C[i][j] = sum(A[i][k] * B[k][j])
    pub fn multiply(&self, other: &Matrix<T>) -> Result<Matrix<T>, MultiplyError> {
        check_inner_dimensions(self, other)?;

        let mut result = Matrix::new(self.rows, other.cols);
        self.product_rows_into(other, 0..self.rows, &mut result.data);
        Ok(result)
    }

    /// Compute rows `rows` of `self * other` into `out`, which must hold
    /// exactly `rows.len() * other.cols` values. Inner dimensions must
    /// already have been checked.
    pub fn product_rows_into(&self, other: &Matrix<T>, rows: Range<usize>, out: &mut [T]) {
        debug_assert_eq!(self.cols, other.rows);
        debug_assert_eq!(out.len(), rows.len() * other.cols);

        let inner = self.cols;
        let width = other.cols;
        for (local, i) in rows.enumerate() {
            let lhs = &self.data[i * inner..(i + 1) * inner];
            for j in 0..width {
                let mut sum = T::zero();
                for (k, &a) in lhs.iter().enumerate() {
                    sum = sum.mul_acc(a, other.data[k * width + j]);
                }
                out[local * width + j] = sum;
            }
        }
    }

    /// Write the textual form: a `rows cols` header, then one line per row
    /// of space-separated values.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), MatrixError> {
        writeln!(writer, "{} {}", self.rows, self.cols)?;
        for i in 0..self.rows {
            let row = &self.data[i * self.cols..(i + 1) * self.cols];
            for (j, value) in row.iter().enumerate() {
                if j > 0 {
                    write!(writer, " ")?;
                }
                write!(writer, "{}", value)?;
            }
            writeln!(writer)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Parse the format produced by [`Matrix::write_to`]. Blank lines are
    /// skipped.
    pub fn read_from<R: BufRead>(reader: R) -> Result<Self, MatrixError> {
        let mut lines = reader
            .lines()
            .enumerate()
            .map(|(index, line)| line.map(|text| (index + 1, text)))
            .filter(|line| !matches!(line, Ok((_, text)) if text.trim().is_empty()));

        let (header_line, header) = lines.next().ok_or(MatrixError::MissingHeader)??;
        let dims: Vec<usize> = header
            .split_whitespace()
            .map(|token| token.parse::<usize>())
            .collect::<Result<_, _>>()
            .map_err(|e| MatrixError::Parse {
                line: header_line,
                msg: format!("invalid header: {}", e),
            })?;
        let [rows, cols] = dims[..] else {
            return Err(MatrixError::MissingHeader);
        };

        let expected = rows.checked_mul(cols).ok_or_else(|| MatrixError::Parse {
            line: header_line,
            msg: format!("dimensions {}x{} overflow", rows, cols),
        })?;

        // The header is untrusted; grow with the data actually read.
        let mut data = Vec::with_capacity(expected.min(MAX_PREALLOCATED));
        let mut rows_read = 0;
        for line in lines {
            let (line_num, text) = line?;
            if rows_read == rows {
                return Err(MatrixError::Shape {
                    expected,
                    found: expected + text.split_whitespace().count(),
                });
            }

            let before = data.len();
            for token in text.split_whitespace() {
                let value = T::parse_token(token).ok_or_else(|| MatrixError::Parse {
                    line: line_num,
                    msg: format!("invalid value `{}`", token),
                })?;
                data.push(value);
            }
            if data.len() - before != cols {
                return Err(MatrixError::RaggedRows {
                    row: rows_read,
                    expected: cols,
                    found: data.len() - before,
                });
            }
            rows_read += 1;
        }

        // Zero-width rows are written as blank lines, which are skipped above.
        if rows_read != rows && cols != 0 {
            return Err(MatrixError::Shape {
                expected,
                found: data.len(),
            });
        }

        Matrix::from_vec(data, rows, cols)
    }

    /// Save a matrix to a text file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), MatrixError> {
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file))
    }

    /// Load a matrix from a text file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, MatrixError> {
        let file = File::open(path)?;
        Matrix::read_from(BufReader::new(file))
    }

    fn check_index(&self, row: usize, col: usize) -> Result<(), MatrixError> {
        if row >= self.rows || col >= self.cols {
            return Err(MatrixError::IndexOutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    fn block_span(&self, start_row: usize, num_rows: usize) -> Result<Range<usize>, MatrixError> {
        let end_row = start_row + num_rows;
        if end_row > self.rows {
            return Err(MatrixError::RowBlockOutOfBounds {
                start: start_row,
                end: end_row,
                rows: self.rows,
            });
        }
        Ok(start_row * self.cols..end_row * self.cols)
    }
}

/// Fails with `DimensionMismatch` unless `a.cols == b.rows`.
pub fn check_inner_dimensions<T>(a: &Matrix<T>, b: &Matrix<T>) -> Result<(), MultiplyError> {
    if a.cols != b.rows {
        return Err(MultiplyError::DimensionMismatch {
            left_rows: a.rows,
            left_cols: a.cols,
            right_rows: b.rows,
            right_cols: b.cols,
        });
    }
    Ok(())
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(row < self.rows && col < self.cols, "index ({}, {}) out of bounds", row, col);
        &self.data[row * self.cols + col]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        assert!(row < self.rows && col < self.cols, "index ({}, {}) out of bounds", row, col);
        &mut self.data[row * self.cols + col]
    }
}
