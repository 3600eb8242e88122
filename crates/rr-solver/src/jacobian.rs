//! Finite difference Jacobian computation.

use crate::error::{SolverError, SolverResult};
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

/// Difference scheme used to approximate the Jacobian.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JacobianMethod {
    /// One extra residual evaluation per column.
    #[default]
    Forward,
    /// Two extra residual evaluations per column, second-order accurate.
    Central,
}

impl JacobianMethod {
    pub fn evaluate<F>(self, x: &DVector<f64>, f: F, epsilon: f64) -> SolverResult<DMatrix<f64>>
    where
        F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>> + Sync,
    {
        match self {
            JacobianMethod::Forward => finite_difference_jacobian(x, f, epsilon),
            JacobianMethod::Central => central_difference_jacobian(x, f, epsilon),
        }
    }
}

/// Compute Jacobian using forward finite differences.
///
/// For each column j, perturbs x[j] by epsilon and computes (f(x+e) - f(x))/epsilon.
/// Columns are independent and evaluated in parallel.
pub fn finite_difference_jacobian<F>(
    x: &DVector<f64>,
    f: F,
    epsilon: f64,
) -> SolverResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>> + Sync,
{
    let n = x.len();
    let f_x = f(x)?;
    let m = f_x.len();
    if n == 0 {
        return Ok(DMatrix::zeros(m, 0));
    }

    let columns = (0..n)
        .into_par_iter()
        .map(|j| -> SolverResult<DVector<f64>> {
            let mut x_perturbed = x.clone();
            let dx = epsilon * x[j].abs().max(1.0);
            x_perturbed[j] += dx;

            let f_perturbed = f(&x_perturbed)?;
            check_len(&f_perturbed, m)?;
            Ok((f_perturbed - &f_x) / dx)
        })
        .collect::<SolverResult<Vec<DVector<f64>>>>()?;

    Ok(DMatrix::from_columns(&columns))
}

/// Compute Jacobian using central finite differences (more accurate but 2x cost).
pub fn central_difference_jacobian<F>(
    x: &DVector<f64>,
    f: F,
    epsilon: f64,
) -> SolverResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>> + Sync,
{
    let n = x.len();
    let m = f(x)?.len();
    if n == 0 {
        return Ok(DMatrix::zeros(m, 0));
    }

    let columns = (0..n)
        .into_par_iter()
        .map(|j| -> SolverResult<DVector<f64>> {
            let dx = epsilon * x[j].abs().max(1.0);

            let mut x_plus = x.clone();
            x_plus[j] += dx;
            let f_plus = f(&x_plus)?;
            check_len(&f_plus, m)?;

            let mut x_minus = x.clone();
            x_minus[j] -= dx;
            let f_minus = f(&x_minus)?;
            check_len(&f_minus, m)?;

            Ok((f_plus - f_minus) / (2.0 * dx))
        })
        .collect::<SolverResult<Vec<DVector<f64>>>>()?;

    Ok(DMatrix::from_columns(&columns))
}

fn check_len(v: &DVector<f64>, expected: usize) -> SolverResult<()> {
    if v.len() != expected {
        return Err(SolverError::ProblemSetup {
            what: format!(
                "residual length changed between evaluations: {} != {}",
                v.len(),
                expected
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jacobian_linear() {
        // f(x) = 2*x, J = 2
        let f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, 2.0 * x[0]))
        };

        let x = DVector::from_element(1, 3.0);
        let jac = finite_difference_jacobian(&x, f, 1e-7).unwrap();

        assert!((jac[(0, 0)] - 2.0).abs() < 1e-5);
    }

    #[test]
    fn jacobian_quadratic() {
        // f(x) = x^2, J = 2*x
        let f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0]))
        };

        let x = DVector::from_element(1, 3.0);
        let jac = finite_difference_jacobian(&x, f, 1e-7).unwrap();

        assert!((jac[(0, 0)] - 6.0).abs() < 1e-5);
    }

    #[test]
    fn central_matches_analytic_two_by_two() {
        // f(x, y) = (x*y, x + y^3), J = [[y, x], [1, 3y^2]]
        let f = |v: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_vec(vec![v[0] * v[1], v[0] + v[1].powi(3)]))
        };

        let x = DVector::from_vec(vec![2.0, 0.5]);
        let jac = JacobianMethod::Central.evaluate(&x, f, 1e-6).unwrap();

        assert!((jac[(0, 0)] - 0.5).abs() < 1e-8);
        assert!((jac[(0, 1)] - 2.0).abs() < 1e-8);
        assert!((jac[(1, 0)] - 1.0).abs() < 1e-8);
        assert!((jac[(1, 1)] - 0.75).abs() < 1e-8);
    }

    #[test]
    fn domain_error_in_column_propagates() {
        let f = |v: &DVector<f64>| -> SolverResult<DVector<f64>> {
            if v[0] > 1.0 {
                return Err(SolverError::Domain {
                    what: "x above 1".to_string(),
                });
            }
            Ok(DVector::from_element(1, v[0]))
        };

        let x = DVector::from_element(1, 1.0);
        let err = finite_difference_jacobian(&x, f, 1e-7).unwrap_err();
        assert!(err.is_domain());
    }
}
