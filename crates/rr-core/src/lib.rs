//! rr-core: shared foundation for the Ramsey relaxation workspace.
//!
//! Contains:
//! - numeric (finiteness checks)
//! - error (shared error types)
//! - timing (wall-clock timers for solve summaries)

pub mod error;
pub mod numeric;
pub mod timing;

pub use error::CoreError;
pub use numeric::ensure_finite;
pub use timing::Timer;
