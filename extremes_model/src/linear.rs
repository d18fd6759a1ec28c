//! Ordinary least squares with an intercept, solved through the normal
//! equations.
//!
//! Columns are mean-centred before forming `X'X`, so the intercept drops out
//! of the system and is recovered as `mean(y) - mean(x) . beta`. A tiny ridge
//! term keeps constant feature columns solvable (their coefficient goes to
//! zero). Cholesky is tried first; Gaussian elimination with partial pivoting
//! handles matrices that are not numerically positive definite.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

const RIDGE: f64 = 1e-10;
const PIVOT_EPSILON: f64 = 1e-12;

/// Fitted coefficients for one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearFit {
    pub fn fit(x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<Self, ModelError> {
        if x.nrows() != y.len() {
            return Err(ModelError::DimensionMismatch {
                expected: x.nrows(),
                got: y.len(),
            });
        }
        let needed = x.ncols() + 1;
        if x.nrows() < needed {
            return Err(ModelError::NotEnoughSamples {
                needed,
                found: x.nrows(),
            });
        }

        let x_mean = x.mean_axis(Axis(0)).ok_or(ModelError::NotEnoughSamples {
            needed,
            found: 0,
        })?;
        let y_mean = y.mean().ok_or(ModelError::NotEnoughSamples { needed, found: 0 })?;

        let xc = &x - &x_mean;
        let yc = &y - y_mean;

        let mut xtx = xc.t().dot(&xc);
        for i in 0..xtx.nrows() {
            xtx[[i, i]] += RIDGE;
        }
        let xty = xc.t().dot(&yc);

        let beta = match cholesky_solve(&xtx, &xty) {
            Some(beta) => beta,
            None => gaussian_solve(xtx, xty)?,
        };

        Ok(Self {
            intercept: y_mean - x_mean.dot(&beta),
            coefficients: beta.to_vec(),
        })
    }

    pub fn predict_one(&self, x: &[f64]) -> f64 {
        self.intercept + self.coefficients.iter().zip(x).map(|(c, v)| c * v).sum::<f64>()
    }

    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>, ModelError> {
        if x.ncols() != self.coefficients.len() {
            return Err(ModelError::DimensionMismatch {
                expected: self.coefficients.len(),
                got: x.ncols(),
            });
        }
        let coefficients = ArrayView1::from(self.coefficients.as_slice());
        Ok(x.dot(&coefficients) + self.intercept)
    }
}

/// `None` when `a` is not positive definite.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[[i, k]] * l[[j, k]]).sum();
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 || !diag.is_finite() {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // L z = b
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let sum: f64 = (0..i).map(|j| l[[i, j]] * z[j]).sum();
        z[i] = (b[i] - sum) / l[[i, i]];
    }

    // L^T x = z
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let sum: f64 = ((i + 1)..n).map(|j| l[[j, i]] * x[j]).sum();
        x[i] = (z[i] - sum) / l[[i, i]];
    }

    Some(x)
}

fn gaussian_solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Result<Array1<f64>, ModelError> {
    let n = a.nrows();

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&r, &s| a[[r, col]].abs().total_cmp(&a[[s, col]].abs()))
            .ok_or(ModelError::SingularMatrix)?;
        if a[[pivot, col]].abs() < PIVOT_EPSILON {
            return Err(ModelError::SingularMatrix);
        }
        if pivot != col {
            for k in 0..n {
                a.swap([col, k], [pivot, k]);
            }
            b.swap(col, pivot);
        }

        for row in (col + 1)..n {
            let factor = a[[row, col]] / a[[col, col]];
            for k in col..n {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let sum: f64 = ((i + 1)..n).map(|j| a[[i, j]] * x[j]).sum();
        x[i] = (b[i] - sum) / a[[i, i]];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn design(n: usize) -> Array2<f64> {
        Array2::from_shape_fn((n, 4), |(i, j)| {
            let t = i as f64;
            match j {
                0 => (i % 7) as f64,
                1 => (t * 0.7).sin() * 10.0,
                2 => (i % 5) as f64,
                _ => (t * 1.3).cos() * 4.0 + t * 0.1,
            }
        })
    }

    #[test]
    fn recovers_exact_linear_relationship() {
        let x = design(40);
        let y = x.map_axis(Axis(1), |r| 2.0 + 3.0 * r[0] - r[1] + 0.5 * r[2]);

        let fit = LinearFit::fit(x.view(), y.view()).unwrap();

        assert!((fit.intercept - 2.0).abs() < 1e-6, "{fit:?}");
        let expected = [3.0, -1.0, 0.5, 0.0];
        for (c, e) in fit.coefficients.iter().zip(expected) {
            assert!((c - e).abs() < 1e-6, "{fit:?}");
        }
        let predicted = fit.predict(x.view()).unwrap();
        for (p, t) in predicted.iter().zip(y.iter()) {
            assert!((p - t).abs() < 1e-6);
        }
    }

    #[test]
    fn constant_feature_column_gets_zero_weight() {
        let mut x = design(30);
        x.column_mut(2).fill(4.0);
        let y = x.map_axis(Axis(1), |r| -1.0 + r[0] + 2.0 * r[3]);

        let fit = LinearFit::fit(x.view(), y.view()).unwrap();

        assert!(fit.coefficients[2].abs() < 1e-6);
        assert!((fit.predict_one(&[3.0, 0.0, 4.0, 1.0]) - 4.0).abs() < 1e-6);
    }

    #[test]
    fn too_few_rows_is_rejected() {
        let x = design(4);
        let y = Array1::zeros(4);
        assert!(matches!(
            LinearFit::fit(x.view(), y.view()),
            Err(ModelError::NotEnoughSamples { needed: 5, found: 4 })
        ));
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let x = design(10);
        let y = Array1::zeros(9);
        assert!(matches!(
            LinearFit::fit(x.view(), y.view()),
            Err(ModelError::DimensionMismatch { expected: 10, got: 9 })
        ));
    }

    #[test]
    fn gaussian_fallback_solves_indefinite_system() {
        let a = array![[0.0, 2.0], [3.0, 1.0]];
        let b = array![4.0, 5.0];
        assert!(cholesky_solve(&a, &b).is_none());

        let x = gaussian_solve(a, b).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-12);
        assert!((x[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn gaussian_fallback_reports_singular_matrix() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        let b = array![1.0, 2.0];
        assert!(matches!(gaussian_solve(a, b), Err(ModelError::SingularMatrix)));
    }
}
