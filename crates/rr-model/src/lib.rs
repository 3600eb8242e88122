//! Ramsey growth model solved by relaxation.
//!
//! The continuous-time system
//!
//! ```text
//! dK/dt = r K + w L - C
//! dC/dt = C (r - rho) / sigma
//! r     = alpha K^(alpha-1) (A L)^(1-alpha) - delta
//! w     = (1-alpha) K^alpha (A L)^(-alpha)
//! ```
//!
//! is discretized with forward differences on `n` unit-spaced nodes and solved
//! for the whole trajectory at once, pinned by the initial capital stock and by
//! steady-state consumption at the last node. Forward shooting is avoided
//! because the system is saddle-path stable.

pub mod error;
pub mod params;
pub mod path;
pub mod steady;
pub mod technology;
pub mod transition;

pub use error::{ModelError, ModelResult};
pub use params::ModelParameters;
pub use path::{NodeValues, TimePath, Variable};
pub use rr_solver::{JacobianMethod, NewtonConfig};
pub use steady::{SteadySolution, SteadyState, solve_steady_state, steady_state};
pub use transition::{
    TransitionProblem, TransitionSolution, initial_guess, solve_transition,
    steady_state_tolerance, transition, transition_from_parameters,
};
