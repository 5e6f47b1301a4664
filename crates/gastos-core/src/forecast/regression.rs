//! Ordinary least squares with an intercept
//!
//! Columns are centered and scaled before solving the normal equations with
//! a pivoted Cholesky pass. A column that is constant, or that adds nothing
//! beyond the columns before it, gets a zero coefficient instead of blowing
//! up the solve; with few rows and seven inputs that is the common case.

use serde::{Deserialize, Serialize};

/// Relative size below which a Cholesky pivot counts as zero
const PIVOT_TOLERANCE: f64 = 1e-9;

/// A fitted linear model `y = intercept + sum(coefficients[j] * x[j])`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    /// Fit on rows of features `x` against targets `y`.
    ///
    /// Returns `None` when there are no rows or the row widths disagree.
    pub fn fit(x: &[Vec<f64>], y: &[f64]) -> Option<Self> {
        let n = x.len();
        if n == 0 || n != y.len() {
            return None;
        }
        let p = x[0].len();
        if x.iter().any(|row| row.len() != p) {
            return None;
        }

        let nf = n as f64;
        let y_mean = y.iter().sum::<f64>() / nf;
        let means: Vec<f64> = (0..p)
            .map(|j| x.iter().map(|row| row[j]).sum::<f64>() / nf)
            .collect();
        let scales: Vec<f64> = (0..p)
            .map(|j| {
                let var = x.iter().map(|row| (row[j] - means[j]).powi(2)).sum::<f64>() / nf;
                let sd = var.sqrt();
                // Rounding noise on a constant column is not signal
                if sd <= f64::EPSILON * 16.0 * means[j].abs().max(1.0) {
                    0.0
                } else {
                    sd
                }
            })
            .collect();

        // Standardized design matrix, column-major
        let z: Vec<Vec<f64>> = (0..p)
            .map(|j| {
                x.iter()
                    .map(|row| {
                        if scales[j] > 0.0 {
                            (row[j] - means[j]) / scales[j]
                        } else {
                            0.0
                        }
                    })
                    .collect()
            })
            .collect();
        let yc: Vec<f64> = y.iter().map(|v| v - y_mean).collect();

        let gram = |a: &[f64], b: &[f64]| a.iter().zip(b).map(|(u, v)| u * v).sum::<f64>();
        let scaled = solve_normal_equations(
            &(0..p)
                .map(|i| (0..p).map(|j| gram(&z[i], &z[j])).collect())
                .collect::<Vec<Vec<f64>>>(),
            &(0..p).map(|j| gram(&z[j], &yc)).collect::<Vec<f64>>(),
        );

        let coefficients: Vec<f64> = scaled
            .iter()
            .zip(&scales)
            .map(|(b, s)| if *s > 0.0 { b / s } else { 0.0 })
            .collect();
        let intercept = y_mean
            - coefficients
                .iter()
                .zip(&means)
                .map(|(c, m)| c * m)
                .sum::<f64>();

        Some(Self {
            intercept,
            coefficients,
        })
    }

    pub fn predict(&self, features: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }
}

/// Solve `G b = r` for a symmetric positive semi-definite `G`.
///
/// Columns are admitted in order; one whose remaining pivot is negligible
/// relative to its diagonal is left out with a zero coefficient.
fn solve_normal_equations(g: &[Vec<f64>], r: &[f64]) -> Vec<f64> {
    let p = r.len();
    let mut active: Vec<usize> = Vec::with_capacity(p);
    // Lower-triangular factor rows for the active columns
    let mut l: Vec<Vec<f64>> = Vec::with_capacity(p);

    for j in 0..p {
        if g[j][j] <= 0.0 {
            continue;
        }
        let mut row = Vec::with_capacity(active.len() + 1);
        for (k, &col) in active.iter().enumerate() {
            let dot: f64 = (0..k).map(|m| row[m] * l[k][m]).sum();
            row.push((g[j][col] - dot) / l[k][k]);
        }
        let pivot = g[j][j] - row.iter().map(|v| v * v).sum::<f64>();
        if pivot <= PIVOT_TOLERANCE * g[j][j] {
            continue;
        }
        row.push(pivot.sqrt());
        active.push(j);
        l.push(row);
    }

    let q = active.len();
    // Forward substitution: L w = r
    let mut w = vec![0.0; q];
    for i in 0..q {
        let dot: f64 = (0..i).map(|m| l[i][m] * w[m]).sum();
        w[i] = (r[active[i]] - dot) / l[i][i];
    }
    // Back substitution: L^T b = w
    let mut b = vec![0.0; q];
    for i in (0..q).rev() {
        let dot: f64 = (i + 1..q).map(|m| l[m][i] * b[m]).sum();
        b[i] = (w[i] - dot) / l[i][i];
    }

    let mut solution = vec![0.0; p];
    for (i, &col) in active.iter().enumerate() {
        solution[col] = b[i];
    }
    solution
}

/// Mean absolute error and root mean squared error of predictions
pub fn error_metrics(predicted: &[f64], actual: &[f64]) -> (f64, f64) {
    let n = predicted.len().min(actual.len());
    if n == 0 {
        return (0.0, 0.0);
    }
    let (abs, sq) = predicted
        .iter()
        .zip(actual)
        .fold((0.0, 0.0), |(abs, sq), (p, a)| {
            let e = p - a;
            (abs + e.abs(), sq + e * e)
        });
    (abs / n as f64, (sq / n as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_exact_linear_relationship() {
        // y = 3 + 2a - b
        let x: Vec<Vec<f64>> = vec![
            vec![1.0, 5.0],
            vec![2.0, 3.0],
            vec![3.0, 8.0],
            vec![4.0, 1.0],
            vec![5.0, 2.0],
        ];
        let y: Vec<f64> = x.iter().map(|r| 3.0 + 2.0 * r[0] - r[1]).collect();

        let model = LinearModel::fit(&x, &y).unwrap();
        assert!(close(model.intercept, 3.0));
        assert!(close(model.coefficients[0], 2.0));
        assert!(close(model.coefficients[1], -1.0));
        assert!(close(model.predict(&[10.0, 4.0]), 19.0));
    }

    #[test]
    fn test_constant_target_predicts_mean() {
        let x = vec![vec![1.0, 7.0], vec![2.0, 7.0], vec![3.0, 7.0]];
        let y = vec![1000.0, 1000.0, 1000.0];

        let model = LinearModel::fit(&x, &y).unwrap();
        assert!(close(model.predict(&[12.0, 7.0]), 1000.0));
        assert!(close(model.predict(&[1.0, 99.0]), 1000.0));
    }

    #[test]
    fn test_collinear_columns_do_not_break_the_fit() {
        // Second column duplicates the first
        let x: Vec<Vec<f64>> = (1..=4).map(|i| vec![i as f64, i as f64 * 2.0]).collect();
        let y: Vec<f64> = (1..=4).map(|i| 10.0 * i as f64).collect();

        let model = LinearModel::fit(&x, &y).unwrap();
        assert!(model.coefficients.iter().all(|c| c.is_finite()));
        assert_eq!(model.coefficients[1], 0.0);
        assert!(close(model.predict(&[5.0, 10.0]), 50.0));
    }

    #[test]
    fn test_more_columns_than_rows() {
        let x = vec![
            vec![1.0, 4.0, 9.0, 2.0],
            vec![2.0, 1.0, 3.0, 8.0],
            vec![3.0, 7.0, 5.0, 1.0],
        ];
        let y = vec![10.0, 20.0, 30.0];

        let model = LinearModel::fit(&x, &y).unwrap();
        // Interpolates the training rows
        for (row, target) in x.iter().zip(&y) {
            assert!(close(model.predict(row), *target));
        }
    }

    #[test]
    fn test_fit_rejects_bad_shapes() {
        assert!(LinearModel::fit(&[], &[]).is_none());
        assert!(LinearModel::fit(&[vec![1.0]], &[1.0, 2.0]).is_none());
        assert!(LinearModel::fit(&[vec![1.0], vec![1.0, 2.0]], &[1.0, 2.0]).is_none());
    }

    #[test]
    fn test_error_metrics() {
        let (mae, rmse) = error_metrics(&[1.0, 2.0, 3.0], &[2.0, 2.0, 5.0]);
        assert!(close(mae, 1.0));
        assert!(close(rmse, (5.0f64 / 3.0).sqrt()));
        assert_eq!(error_metrics(&[], &[]), (0.0, 0.0));
    }
}
