use std::ops::{Index, IndexMut};

use log::warn;

use crate::error::SimError;

/// Square dense matrix with flat row-major storage, element `(i, j)` at
/// `i * n + j`. Contiguous layout keeps the O(n³) elimination cache-friendly
/// once n leaves single digits.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    n: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0.0; n * n],
        }
    }

    /// Side length of the matrix.
    pub fn n(&self) -> usize {
        self.n
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.data[i * self.n + j]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.data[i * self.n + j]
    }
}

/// What to do when elimination leaves a zero diagonal pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SingularPolicy {
    /// Log a warning and return the zero vector so integration continues;
    /// the accelerations freeze for that sub-stage instead of the whole
    /// simulation aborting.
    #[default]
    ZeroFallback,
    /// Surface [`SimError::SingularSystem`]; the current step is abandoned.
    Reject,
}

/// Solves `a · x = b` by Gaussian elimination with partial pivoting on the
/// augmented matrix `[a | b]`.
///
/// Pivot selection compares absolute values with strict `>`, so the first
/// candidate row wins ties. A column whose pivot is zero after the row
/// exchange is skipped during elimination; if a zero diagonal survives to
/// back-substitution the system is singular and `policy` decides the
/// outcome. Stateless and reentrant; the inputs are never mutated.
pub fn solve(a: &Matrix, b: &[f64], policy: SingularPolicy) -> Result<Vec<f64>, SimError> {
    let n = b.len();
    debug_assert_eq!(a.n(), n);
    if n == 0 {
        return Ok(Vec::new());
    }

    // Working copy of [a | b], flat with stride n + 1.
    let stride = n + 1;
    let mut aug = vec![0.0; n * stride];
    for i in 0..n {
        for j in 0..n {
            aug[i * stride + j] = a[(i, j)];
        }
        aug[i * stride + n] = b[i];
    }

    for i in 0..n {
        let mut max_row = i;
        for k in (i + 1)..n {
            if aug[k * stride + i].abs() > aug[max_row * stride + i].abs() {
                max_row = k;
            }
        }
        if max_row != i {
            for j in 0..stride {
                aug.swap(i * stride + j, max_row * stride + j);
            }
        }

        if aug[i * stride + i] == 0.0 {
            // Degenerate column; nothing below it can be eliminated.
            continue;
        }
        for k in (i + 1)..n {
            let factor = aug[k * stride + i] / aug[i * stride + i];
            for j in i..stride {
                aug[k * stride + j] -= factor * aug[i * stride + j];
            }
        }
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += aug[i * stride + j] * x[j];
        }
        let pivot = aug[i * stride + i];
        if pivot == 0.0 {
            return match policy {
                SingularPolicy::ZeroFallback => {
                    warn!("singular {n}x{n} system at pivot column {i}; returning zero solution");
                    Ok(vec![0.0; n])
                }
                SingularPolicy::Reject => Err(SimError::SingularSystem { column: i }),
            };
        }
        x[i] = (aug[i * stride + n] - sum) / pivot;
    }

    Ok(x)
}
