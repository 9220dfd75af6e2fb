//! Declare an error type for soxide-proto.

use thiserror::Error;

/// An error that occurs while driving a SOCKS handshake.
///
/// Note that a proxy refusing a request is not an error in this sense:
/// refusals are reported as ordinary events whose status fields carry
/// the proxy's verdict.  These errors mean that the handshake itself
/// cannot proceed as asked.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A message from the proxy wasn't complete yet.
    ///
    /// `receive_data` handles this internally by keeping its buffer and
    /// reporting that no event is available; callers should not
    /// ordinarily see it.
    #[error("message truncated; need to wait for more")]
    Truncated,

    /// The proxy sent bytes that don't conform to the protocol.
    ///
    /// Once this is reported, the connection is of no further use.
    #[error("SOCKS protocol syntax violation")]
    Syntax,

    /// The proxy declared a version number that isn't the one this
    /// conversation is supposed to be using.
    ///
    /// In all likelihood, the other end isn't speaking SOCKS at all.
    #[error("unrecognized SOCKS protocol version {0}")]
    BadProtocol(u8),

    /// An operation was invoked that the current handshake state
    /// forbids.
    #[error("operation not valid in the current handshake state")]
    BadState,

    /// An operation was invoked on a handshake that already reached a
    /// terminal state.
    #[error("SOCKS handshake was finished; no need to call this again")]
    AlreadyFinished,

    /// The caller asked for a SOCKS feature we don't implement.
    #[error("SOCKS feature not supported: {0}")]
    NoSupport(&'static str),

    /// A caller-provided value cannot be represented on the wire.
    #[error("invalid request: {0}")]
    Invalid(&'static str),

    /// Something went wrong inside this crate.
    #[error("internal programming error while handling SOCKS handshake")]
    Internal,
}

impl From<soxide_bytes::Error> for Error {
    fn from(e: soxide_bytes::Error) -> Error {
        use soxide_bytes::Error as E;
        match e {
            E::Truncated => Error::Truncated,
            _ => Error::Syntax,
        }
    }
}
