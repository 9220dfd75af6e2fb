//! Declare an error type for soxide-bytes.

use thiserror::Error;

/// Error type for decoding objects from bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The message ended before the object did.  Waiting for more bytes
    /// may make it parseable.
    #[error("object truncated (or not fully present)")]
    Truncated,
    /// The object was parsed, but bytes were left over afterwards.
    #[error("extra bytes at end of object")]
    ExtraneousBytes,
    /// The bytes cannot be decoded as the object we wanted.
    #[error("bad object: {0}")]
    BadMessage(&'static str),
    /// A programming mistake in this crate or its caller.
    #[error("internal programming error")]
    Internal,
}
