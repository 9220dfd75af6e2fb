//! Client-side handshake for SOCKS4 and SOCKS4a.
//!
//! SOCKS4 can only name its target by a literal IPv4 address.  The 4a
//! extension lets the client send a hostname for the proxy to resolve,
//! signalled by a sentinel destination address of the form 0.0.0.x.

use crate::msg::{Socks4Reply, Socks4Status, SocksAddr, SocksCmd};
use crate::{Error, Result};

use bytes::{Buf, BytesMut};
use soxide_bytes::{Reader, Writer};
use std::net::{IpAddr, Ipv4Addr};
use tracing::{debug, trace};

/// Sentinel destination address telling a SOCKS4a proxy that a hostname
/// follows the user id.
const SOCKS4A_SENTINEL: Ipv4Addr = Ipv4Addr::new(0, 0, 0, 1);

/// Progress of a SOCKS4 or SOCKS4a client handshake.
///
/// States only ever advance; once the handshake reaches `Succeeded` or
/// `Failed` it is over, and the connection cannot be reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(clippy::exhaustive_enums)]
pub enum Socks4State {
    /// No request has been sent yet.
    Init,
    /// The request has been queued; we are waiting for the 8-byte
    /// reply.
    AwaitingReply,
    /// Terminal: the proxy granted the request.
    Succeeded,
    /// Terminal: the proxy rejected the request.
    Failed,
}

/// Which flavor of the version-4 protocol this connection speaks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flavor {
    /// Plain SOCKS4: IPv4 targets only.
    Socks4,
    /// SOCKS4a: hostname targets are also allowed.
    Socks4a,
}

/// A single SOCKS4 or SOCKS4a client handshake, with no I/O.
///
/// The connection never touches a socket.  Call [`request`](Socks4Connection::request)
/// to queue the outgoing request, drain it with
/// [`data_to_send`](Socks4Connection::data_to_send), ship the bytes over
/// a transport you own, and feed whatever comes back into
/// [`receive_data`](Socks4Connection::receive_data) until it produces a
/// [`Socks4Reply`].  Input may arrive in any fragmentation.
///
/// # Example
///
/// ```
/// use soxide_proto::{Socks4Connection, SocksCmd};
///
/// let mut conn = Socks4Connection::new(&b"alice"[..]);
/// conn.request(SocksCmd::CONNECT, "192.0.2.10", 443)?;
/// let outgoing = conn.data_to_send();
/// // ... write `outgoing` to the proxy, read its reply,
/// // and feed the reply into conn.receive_data() ...
/// # assert_eq!(outgoing[0], 4);
/// # soxide_proto::Result::Ok(())
/// ```
#[derive(Clone, Debug)]
pub struct Socks4Connection {
    /// Protocol flavor fixed at construction.
    flavor: Flavor,
    /// Current progress of the handshake.
    state: Socks4State,
    /// User id to send with the request.  May be empty.
    user_id: Vec<u8>,
    /// Bytes received from the proxy but not yet parsed.
    recv: BytesMut,
    /// Bytes queued for the caller to send to the proxy.
    send: Vec<u8>,
}

impl Socks4Connection {
    /// Construct a new plain SOCKS4 connection with a given user id.
    ///
    /// The user id may be empty; most proxies ignore it.
    pub fn new<U: Into<Vec<u8>>>(user_id: U) -> Self {
        Socks4Connection {
            flavor: Flavor::Socks4,
            state: Socks4State::Init,
            user_id: user_id.into(),
            recv: BytesMut::new(),
            send: Vec::new(),
        }
    }

    /// Construct a new SOCKS4a connection with a given user id.
    ///
    /// Unlike plain SOCKS4, a SOCKS4a connection may request connection
    /// to a hostname, leaving resolution to the proxy.
    pub fn new_socks4a<U: Into<Vec<u8>>>(user_id: U) -> Self {
        Socks4Connection {
            flavor: Flavor::Socks4a,
            ..Socks4Connection::new(user_id)
        }
    }

    /// Queue a request to perform `cmd` on `addr`:`port` through the
    /// proxy.
    ///
    /// Valid only before any other request has been made.  Plain SOCKS4
    /// accepts only literal IPv4 addresses; SOCKS4a also accepts
    /// hostnames.  Neither flavor can carry an IPv6 target.
    pub fn request(&mut self, cmd: SocksCmd, addr: &str, port: u16) -> Result<()> {
        match self.state {
            Socks4State::Init => (),
            Socks4State::Succeeded | Socks4State::Failed => return Err(Error::AlreadyFinished),
            Socks4State::AwaitingReply => return Err(Error::BadState),
        }
        if !cmd.supported() {
            return Err(Error::NoSupport("command"));
        }
        let target: SocksAddr = addr.parse()?;
        let (dst_ip, hostname) = match (target, self.flavor) {
            (SocksAddr::Ip(IpAddr::V4(ip)), _) => (ip, None),
            (SocksAddr::Ip(IpAddr::V6(_)), _) => {
                return Err(Error::Invalid("IPv6 addresses cannot be used with SOCKS4"))
            }
            (SocksAddr::Hostname(_), Flavor::Socks4) => {
                return Err(Error::Invalid("SOCKS4 requires a literal IPv4 address"))
            }
            (SocksAddr::Hostname(h), Flavor::Socks4a) => (SOCKS4A_SENTINEL, Some(h)),
        };

        let w = &mut self.send;
        w.write_u8(4); // version
        w.write_u8(cmd.into());
        w.write_u16(port);
        w.write(&dst_ip);
        w.write_all(&self.user_id);
        w.write_u8(0); // terminates the user id
        if let Some(h) = hostname {
            w.write_all(h.as_ref().as_bytes());
            w.write_u8(0); // terminates the hostname
        }

        trace!("queued SOCKS4 {} request for {}:{}", cmd, addr, port);
        self.state = Socks4State::AwaitingReply;
        Ok(())
    }

    /// Feed bytes received from the proxy into the handshake.
    ///
    /// Returns the proxy's reply once all 8 bytes of it have arrived,
    /// and `None` until then.  Bytes beyond the reply are retained
    /// unparsed; see
    /// [`take_unparsed_data`](Socks4Connection::take_unparsed_data).
    ///
    /// A reply that cannot be parsed leaves an error; the connection is
    /// of no further use afterwards.
    pub fn receive_data(&mut self, input: &[u8]) -> Result<Option<Socks4Reply>> {
        self.recv.extend_from_slice(input);
        if self.state != Socks4State::AwaitingReply {
            // Nothing is expected from the proxy right now.  Keep the
            // bytes for the caller.
            return Ok(None);
        }
        let (drain, reply) = match self.parse_reply() {
            Ok(parsed) => parsed,
            Err(Error::Truncated) => return Ok(None),
            Err(e) => return Err(e),
        };
        self.recv.advance(drain);
        self.state = if reply.status.success() {
            Socks4State::Succeeded
        } else {
            debug!("SOCKS4 proxy rejected our request: {}", reply.status);
            Socks4State::Failed
        };
        trace!("SOCKS4 handshake finished: {:?}", self.state);
        Ok(Some(reply))
    }

    /// Try to parse a complete 8-byte reply from the receive buffer.
    ///
    /// On success, return the parsed reply along with the number of
    /// bytes it occupied.  Does not modify the connection.
    fn parse_reply(&self) -> Result<(usize, Socks4Reply)> {
        let mut r = Reader::from_slice(&self.recv[..]);
        let version = r.take_u8()?;
        if version != 0 {
            // Replies carry version 0, not 4.
            return Err(Error::BadProtocol(version));
        }
        let status: Socks4Status = r.take_u8()?.into();
        if !status.is_recognized() {
            return Err(Error::Syntax);
        }
        let port = r.take_u16()?;
        let addr: Ipv4Addr = r.extract()?;
        Ok((r.consumed(), Socks4Reply { status, port, addr }))
    }

    /// Return the bytes that should now be sent to the proxy, removing
    /// them from the connection.
    ///
    /// The caller is responsible for getting every byte onto the
    /// transport, in order.
    pub fn data_to_send(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.send)
    }

    /// Hand back any received bytes that the handshake did not consume.
    ///
    /// Once the handshake has succeeded, any bytes the proxy sent after
    /// its reply already belong to the tunneled connection; use this to
    /// retrieve them before taking over the transport.
    pub fn take_unparsed_data(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.recv).to_vec()
    }

    /// Return the current progress of this handshake.
    pub fn state(&self) -> Socks4State {
        self.state
    }
}
