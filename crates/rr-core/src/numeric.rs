use crate::CoreError;

/// Pass `v` through unchanged, or report it as non-finite.
pub fn ensure_finite(v: f64, what: &'static str) -> Result<f64, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}
