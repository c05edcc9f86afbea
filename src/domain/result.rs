//! Result type alias for fhirstage
//!
//! This module provides a convenient Result type alias that uses StageError
//! as the error type.

use super::errors::StageError;

/// Result type alias for fhirstage operations
///
/// This is a convenience type alias that uses `StageError` as the error type.
/// Use this throughout the codebase for fallible operations.
///
/// # Examples
///
/// ```
/// use fhirstage::domain::result::Result;
/// use fhirstage::domain::errors::StageError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(StageError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, StageError>;
