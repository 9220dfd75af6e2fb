//! Client-side implementation of the SOCKS proxy protocols, with no I/O.
//!
//! SOCKS is an old and somewhat janky family of protocols for asking a
//! TCP proxy to make a connection on your behalf.  Versions 4, 4a, and
//! 5 are all still encountered in the wild.
//!
//! # Overview
//!
//! This crate speaks the client side of SOCKS4 and SOCKS4a
//! ([`Socks4Connection`]) and SOCKS5 ([`Socks5Connection`]) as pure
//! state machines.  A connection never opens a socket, resolves a name,
//! or waits for anything: you call an intent method to queue a protocol
//! message, drain the queued bytes with `data_to_send`, ship them over
//! a transport you own, and feed whatever the proxy sends back into
//! `receive_data` to get typed events out.  Input may be fragmented
//! arbitrarily; a partially received message is simply held until the
//! rest of it arrives.
//!
//! Because of that shape, the same connection types work over a
//! blocking socket, an async stream, or an in-memory test harness; the
//! transport, along with any timeouts or retries, belongs entirely to
//! the caller.  Once a handshake reports success, the connection's job
//! is done and the transport carries the tunneled protocol.
//!
//! For more information about SOCKS:
//!
//!   * SOCKS5 is specified in
//!     [RFC 1928](https://tools.ietf.org/html/rfc1928), and see also
//!     [RFC 1929](https://tools.ietf.org/html/rfc1929) for
//!     Username/Password authentication in SOCKS5.
//!   * [The wikipedia article](https://en.wikipedia.org/wiki/SOCKS)
//!     is the best surviving documentation for SOCKS4 and SOCKS4a.
//!
//! # Limitations
//!
//! Server-side SOCKS is not implemented, and neither are GSS-API
//! authentication or UDP ASSOCIATE.  A connection drives exactly one
//! handshake and is not reusable afterwards.

#![deny(missing_docs)]
#![warn(noop_method_call)]
#![deny(unreachable_pub)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(clippy::cognitive_complexity)]
#![deny(clippy::debug_assert_with_mut_call)]
#![deny(clippy::exhaustive_enums)]
#![deny(clippy::exhaustive_structs)]
#![deny(clippy::expl_impl_clone_on_copy)]
#![deny(clippy::fallible_impl_from)]
#![deny(clippy::large_stack_arrays)]
#![warn(clippy::manual_ok_or)]
#![deny(clippy::missing_docs_in_private_items)]
#![warn(clippy::needless_borrow)]
#![warn(clippy::option_option)]
#![warn(clippy::rc_buffer)]
#![deny(clippy::ref_option_ref)]
#![warn(clippy::trait_duplication_in_bounds)]
#![warn(clippy::unseparated_literal_suffix)]

mod err;
mod msg;
mod socks4;
mod socks5;

pub use err::Error;
pub use msg::{
    Socks4Reply, Socks4Status, Socks5Atype, Socks5AuthMethod, Socks5Event, Socks5Reply,
    Socks5Status, SocksAddr, SocksCmd, SocksHostname,
};
pub use socks4::{Socks4Connection, Socks4State};
pub use socks5::{Socks5Connection, Socks5State};

/// A Result type for the soxide_proto crate.
pub type Result<T> = std::result::Result<T, Error>;
