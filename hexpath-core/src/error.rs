//! Grid construction errors

use crate::hex::Hex;

/// Error types for grid construction
///
/// Lookups and searches never fail; only building a grid from bad input does.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    #[error("Invalid hex size: {0} (must be finite and positive)")]
    InvalidHexSize(f64),

    #[error("Invalid grid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Duplicate tile at {0}")]
    DuplicateTile(Hex),
}
