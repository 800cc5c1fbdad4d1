//! Configuration objects for type-dependent tension coefficients and initial
//! demographics.
//!
//! Both resources share one plain-text format: two leading integers giving
//! the dimensions followed by the entries in row-major order, separated by
//! arbitrary whitespace. Content after the expected number of entries is
//! ignored. All parsing failures are [SetupError]s and occur before any
//! simulation work is done.

use std::path::Path;

use itertools::Itertools;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, SetupError};

/// Reads a dense row-major matrix from the shared text format.
fn read_dense_matrix(path: &Path) -> Result<DMatrix<f64>, SetupError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| SetupError(format!("unable to read {}: {}", path.display(), e)))?;
    let mut tokens = content.split_whitespace();
    let mut read_dimension = |name: &str| -> Result<usize, SetupError> {
        let token = tokens
            .next()
            .ok_or(SetupError(format!(
                "{} ends before the {} count",
                path.display(),
                name
            )))?;
        let value = token.parse::<usize>().map_err(|_| {
            SetupError(format!(
                "{} contains a non-numeric {} count {:?}",
                path.display(),
                name,
                token
            ))
        })?;
        if value == 0 {
            return Err(SetupError(format!(
                "{} declares an empty matrix",
                path.display()
            )));
        }
        Ok(value)
    };
    let rows = read_dimension("row")?;
    let cols = read_dimension("column")?;
    let n_entries = rows.checked_mul(cols).ok_or(SetupError(format!(
        "{} declares an oversized {}x{} matrix",
        path.display(),
        rows,
        cols
    )))?;
    // sized by parsed entries, not by the declared dimensions
    let mut values = Vec::new();
    for n in 0..n_entries {
        let token = tokens.next().ok_or(SetupError(format!(
            "{} is truncated: expected {} entries but found {}",
            path.display(),
            n_entries,
            n
        )))?;
        let value = token.parse::<f64>().map_err(|_| {
            SetupError(format!(
                "{} contains a non-numeric entry {:?} at position {}",
                path.display(),
                token,
                n
            ))
        })?;
        values.push(value);
    }
    Ok(DMatrix::from_row_slice(rows, cols, &values))
}

/// Writes a dense matrix in the shared text format.
///
/// The output reloads to an identical matrix via [read_dense_matrix].
fn write_dense_matrix(matrix: &DMatrix<f64>, path: &Path) -> Result<(), SetupError> {
    let mut out = format!("{} {}\n", matrix.nrows(), matrix.ncols());
    for i in 0..matrix.nrows() {
        let line = (0..matrix.ncols()).map(|j| matrix[(i, j)].to_string()).join(" ");
        out.push_str(&line);
        out.push('\n');
    }
    std::fs::write(path, out)
        .map_err(|e| SetupError(format!("unable to write {}: {}", path.display(), e)))
}

/// Square matrix of line-tension coefficients indexed by demographic type.
///
/// Entry `(i, j)` is the tension coefficient of an edge between a type `i`
/// and a type `j` cell. The diagonal entries double as the boundary
/// coefficients of the respective types. Symmetry is common but not
/// required; [CostMatrix::is_symmetric] reports it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CostMatrix {
    matrix: DMatrix<f64>,
}

impl CostMatrix {
    /// Wraps a square coefficient matrix.
    pub fn new(matrix: DMatrix<f64>) -> Result<Self, SetupError> {
        if matrix.nrows() != matrix.ncols() {
            return Err(SetupError(format!(
                "cost matrix must be square but has shape {}x{}",
                matrix.nrows(),
                matrix.ncols()
            )));
        }
        if matrix.nrows() == 0 {
            return Err(SetupError("cost matrix must not be empty".into()));
        }
        Ok(CostMatrix { matrix })
    }

    /// Creates a matrix where every pairing shares one coefficient.
    pub fn from_element(n_types: usize, coefficient: f64) -> Result<Self, SetupError> {
        CostMatrix::new(DMatrix::from_element(n_types, n_types, coefficient))
    }

    /// Loads a matrix from the text format described in the module docs.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SetupError> {
        CostMatrix::new(read_dense_matrix(path.as_ref())?)
    }

    /// Writes the matrix so that [CostMatrix::from_path] reproduces it.
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<(), SetupError> {
        write_dense_matrix(&self.matrix, path.as_ref())
    }

    /// Number of demographic types the matrix covers.
    pub fn n_types(&self) -> usize {
        self.matrix.nrows()
    }

    /// Coefficient for the type pair `(i, j)`.
    pub fn get(&self, i: usize, j: usize) -> Result<f64, CalcError> {
        if i >= self.n_types() || j >= self.n_types() {
            return Err(CalcError(format!(
                "cost matrix entry ({}, {}) requested but only {} types are configured",
                i,
                j,
                self.n_types()
            )));
        }
        Ok(self.matrix[(i, j)])
    }

    /// Checks whether the matrix equals its transpose.
    pub fn is_symmetric(&self) -> bool {
        self.matrix == self.matrix.transpose()
    }

    /// Access to the underlying coefficient matrix.
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }
}

/// Initial proportions of the demographic types.
///
/// The proportions do not need to sum to one. [Demographics::sample_type]
/// divides by the total, so scaled proportions behave identically.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Demographics {
    proportions: DVector<f64>,
}

impl Demographics {
    /// Wraps a vector of non-negative proportions with positive total.
    pub fn new(proportions: DVector<f64>) -> Result<Self, SetupError> {
        if proportions.is_empty() {
            return Err(SetupError("demographics must not be empty".into()));
        }
        if proportions.iter().any(|p| *p < 0.0 || !p.is_finite()) {
            return Err(SetupError(
                "demographic proportions must be finite and non-negative".into(),
            ));
        }
        let total: f64 = proportions.iter().sum();
        if total <= 0.0 {
            return Err(SetupError(
                "demographic proportions must have a positive sum".into(),
            ));
        }
        #[cfg(feature = "tracing")]
        if (total - 1.0).abs() > 1e-9 {
            tracing::warn!("demographic proportions sum to {total}, sampling renormalizes");
        }
        Ok(Demographics { proportions })
    }

    /// Equal proportions for `n_types` types.
    pub fn uniform(n_types: usize) -> Result<Self, SetupError> {
        Demographics::new(DVector::from_element(n_types, 1.0))
    }

    /// Loads proportions from an `n 1` column resource in the text format.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SetupError> {
        let path = path.as_ref();
        let matrix = read_dense_matrix(path)?;
        if matrix.ncols() != 1 {
            return Err(SetupError(format!(
                "{} must contain a single column but has {}",
                path.display(),
                matrix.ncols()
            )));
        }
        Demographics::new(DVector::from_column_slice(matrix.as_slice()))
    }

    /// Writes the proportions so that [Demographics::from_path] reproduces
    /// them.
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<(), SetupError> {
        let matrix =
            DMatrix::from_column_slice(self.proportions.len(), 1, self.proportions.as_slice());
        write_dense_matrix(&matrix, path.as_ref())
    }

    /// Number of demographic types.
    pub fn n_types(&self) -> usize {
        self.proportions.len()
    }

    /// Access to the raw proportions.
    pub fn proportions(&self) -> &DVector<f64> {
        &self.proportions
    }

    /// Draws one type index with probability proportional to its proportion.
    pub fn sample_type(&self, rng: &mut rand_chacha::ChaCha8Rng) -> usize {
        use rand::Rng;
        let total: f64 = self.proportions.iter().sum();
        let sample = rng.gen_range(0.0..1.0) * total;
        let mut cumulative = 0.0;
        for (index, proportion) in self.proportions.iter().enumerate() {
            cumulative += proportion;
            if cumulative >= sample {
                return index;
            }
        }
        self.proportions.len() - 1
    }
}
