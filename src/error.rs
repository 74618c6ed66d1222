//! Failure classification for the OpenFlow codec.
//!
//! The codec never retries or recovers on its own: every failure is returned
//! to the caller, which decides whether to drop the message or the connection.

use thiserror::Error;

use crate::registry::Family;

/// Errors produced while decoding or encoding OpenFlow 1.0 structures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OfpError {
    /// A field or header extends past the end of the buffer.
    #[error("truncated input: needed {needed} bytes, {available} available")]
    TruncatedInput {
        /// Bytes the read required.
        needed: usize,
        /// Bytes left in the buffer.
        available: usize,
    },

    /// A declared length disagrees with the record's fixed size or with the buffer.
    #[error("malformed length {length} for {what}")]
    MalformedLength {
        /// Record whose length is wrong.
        what: &'static str,
        /// Length found on the wire (or in the buffer).
        length: usize,
    },

    /// A list's byte budget does not divide into whole elements.
    #[error("malformed {family} list: {remaining} bytes left over")]
    MalformedListLength {
        /// Family of the list elements.
        family: Family,
        /// Bytes of budget that could not be consumed.
        remaining: usize,
    },

    /// A discriminant that no decoder is registered for.
    #[error("unknown {family} discriminant {discriminant:#x}")]
    UnknownVariant {
        /// Family the lookup was performed in.
        family: Family,
        /// Type, stats type, property or vendor id found on the wire.
        discriminant: u32,
    },

    /// A fixed field holds a value outside its closed enumeration.
    #[error("unexpected value {value:#x} in field '{field}'")]
    UnexpectedValue {
        /// Name of the field.
        field: &'static str,
        /// Raw value found on the wire.
        value: u32,
    },

    /// The header announces a protocol version this codec does not speak.
    #[error("unsupported OpenFlow version: {0:#04x}")]
    UnsupportedVersion(u8),
}

impl OfpError {
    /// Whether a list decoder may skip the element that produced this error.
    pub fn is_skippable(&self) -> bool {
        matches!(*self, OfpError::UnknownVariant { .. })
    }
}

/// Convenient Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, OfpError>;
