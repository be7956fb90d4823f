//! Error types for compressed bitmap operations.

use thiserror::Error;

use crate::domain::{Domain, Integer};

/// Error variants for bitmap operations.
///
/// Only the boundary (value validation, mixed-domain algebra) and the
/// decoder can fail. Membership, algebra, iteration and optimization are
/// total once a value has been accepted.
#[derive(Debug, Error)]
pub enum Error {
    /// An integer outside the domain's inclusive range was presented.
    #[error("integer {value} is outside the {domain} domain [0, {max}]", max = .domain.max())]
    OutOfRange {
        /// The rejected value.
        value: Integer,
        /// The domain it was checked against.
        domain: Domain,
    },

    /// A value that is not an integer was presented where one is required.
    #[error("wrong argument type {found} (expected Integer)")]
    TypeMismatch {
        /// Name of the type that was presented.
        found: &'static str,
    },

    /// Set algebra was attempted between bitmaps of different domains.
    #[error("incompatible operands: {left} bitmap with {right} bitmap")]
    DomainMismatch {
        /// Domain of the receiver.
        left: Domain,
        /// Domain of the argument.
        right: Domain,
    },

    /// Serialized input was malformed.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    /// An I/O error occurred during serialization or deserialization.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for bitmap operations.
pub type Result<T> = std::result::Result<T, Error>;
