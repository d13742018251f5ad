//! Error types for the render cache
//!
//! Cache and tree operations never fail. Errors only surface at the
//! conversion boundary: building structured keys and exporting trees to JSON.

use thiserror::Error;

// == Error Enum ==
/// Unified error type for the crate's conversion surface.
#[derive(Error, Debug)]
pub enum Error {
    /// A structured key could not be serialized
    #[error("Key serialization failed: {0}")]
    KeySerialization(#[from] serde_json::Error),

    /// A tree holding opaque values cannot be represented as JSON
    #[error("Opaque value at {0} has no JSON representation")]
    OpaqueValue(String),

    /// A float that JSON cannot carry (NaN or infinite)
    #[error("Non-finite float at {0}")]
    NonFiniteFloat(String),
}

// == Result Type Alias ==
/// Convenience Result type for the crate.
pub type Result<T> = std::result::Result<T, Error>;
