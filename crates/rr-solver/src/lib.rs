//! General-purpose nonlinear root finder.
//!
//! Given a residual function `F: R^m -> R^m` and an initial guess, finds `x`
//! with `F(x) ≈ 0` by damped Newton iteration. Jacobians are formed by finite
//! differences, and residual functions may reject iterates outside their
//! domain; the line search then shortens the step instead of feeding
//! non-finite values into the linear solve.

pub mod error;
pub mod jacobian;
pub mod newton;
pub mod problem;
pub mod solve;

pub use error::{SolverError, SolverResult};
pub use jacobian::JacobianMethod;
pub use newton::{NewtonConfig, NewtonResult};
pub use problem::RootProblem;
pub use solve::solve;
