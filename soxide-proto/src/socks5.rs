//! Client-side handshake for SOCKS5.
//!
//! SOCKS5 (RFC 1928) is a short conversation: the client advertises the
//! authentication methods it can speak, the server picks one, an
//! optional sub-negotiation authenticates the client, and finally the
//! client sends its request and the server answers it.  Each phase has
//! exactly one message the server can send us, so parsing is dispatched
//! on the handshake state.

use crate::msg::{Socks5AuthMethod, Socks5Event, Socks5Reply, Socks5Status, SocksAddr, SocksCmd};
use crate::{Error, Result};

use bytes::{Buf, BytesMut};
use soxide_bytes::{Reader, Writer};
use tracing::{debug, trace};

/// Progress of a SOCKS5 client handshake.
///
/// States only ever advance; once the handshake reaches `Succeeded` or
/// `Failed` it is over, and the connection cannot be reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(clippy::exhaustive_enums)]
pub enum Socks5State {
    /// No method negotiation has been started yet.
    Init,
    /// Our list of methods is queued; waiting for the server's pick.
    MethodsSent,
    /// The server picked a method.  Depending on the method, the next
    /// step is either authentication or the request itself.
    MethodAccepted,
    /// Username/password credentials are queued; waiting for the
    /// verdict.
    AuthSent,
    /// The server accepted our credentials.
    AuthAccepted,
    /// The request is queued; waiting for the server's reply.
    RequestSent,
    /// Terminal: the server granted the request.
    Succeeded,
    /// Terminal: the server turned us down at some phase.
    Failed,
}

/// A single SOCKS5 client handshake, with no I/O.
///
/// The connection never touches a socket.  Intent methods
/// ([`negotiate_auth_methods`](Socks5Connection::negotiate_auth_methods),
/// [`authenticate_username_password`](Socks5Connection::authenticate_username_password),
/// [`request`](Socks5Connection::request)) queue outgoing bytes, which
/// the caller drains with [`data_to_send`](Socks5Connection::data_to_send)
/// and ships over a transport it owns.  Bytes the server sends back go
/// into [`receive_data`](Socks5Connection::receive_data), which parses
/// at most one [`Socks5Event`] per call.  Input may arrive in any
/// fragmentation; a partial message is held until the rest shows up.
///
/// # Example
///
/// ```
/// use soxide_proto::{Socks5AuthMethod, Socks5Connection, Socks5Event, SocksCmd};
///
/// let mut conn = Socks5Connection::new();
/// conn.negotiate_auth_methods(&[Socks5AuthMethod::NO_AUTH_REQUIRED])?;
/// assert_eq!(conn.data_to_send(), vec![5, 1, 0]);
///
/// // The server picks "no authentication required"...
/// let event = conn.receive_data(&[5, 0])?;
/// assert_eq!(
///     event,
///     Some(Socks5Event::AuthMethodsReply(
///         Socks5AuthMethod::NO_AUTH_REQUIRED
///     ))
/// );
///
/// // ...so we can send the request directly.
/// conn.request(SocksCmd::CONNECT, "192.0.2.10", 80)?;
/// let outgoing = conn.data_to_send();
/// // ... ship `outgoing`, then feed the reply into receive_data ...
/// # assert_eq!(outgoing[0], 5);
/// # soxide_proto::Result::Ok(())
/// ```
#[derive(Clone, Debug)]
pub struct Socks5Connection {
    /// Current progress of the handshake.
    state: Socks5State,
    /// The method the server selected, once it has told us.
    selected_method: Option<Socks5AuthMethod>,
    /// Bytes received from the server but not yet parsed.
    recv: BytesMut,
    /// Bytes queued for the caller to send to the server.
    send: Vec<u8>,
}

impl Socks5Connection {
    /// Construct a new SOCKS5 connection in its initial state.
    pub fn new() -> Self {
        Socks5Connection {
            state: Socks5State::Init,
            selected_method: None,
            recv: BytesMut::new(),
            send: Vec::new(),
        }
    }

    /// Queue the initial negotiation, offering `methods` to the server.
    ///
    /// Between 1 and 255 methods may be offered.  Valid only before any
    /// negotiation has happened on this connection.
    pub fn negotiate_auth_methods(&mut self, methods: &[Socks5AuthMethod]) -> Result<()> {
        match self.state {
            Socks5State::Init => (),
            Socks5State::Succeeded | Socks5State::Failed => return Err(Error::AlreadyFinished),
            _ => return Err(Error::BadState),
        }
        if methods.is_empty() {
            return Err(Error::Invalid("no authentication methods offered"));
        }
        if methods.len() > 255 {
            return Err(Error::Invalid("too many authentication methods"));
        }

        let w = &mut self.send;
        w.write_u8(5); // version
        w.write_u8(methods.len() as u8);
        for method in methods {
            w.write_u8((*method).into());
        }

        trace!("queued SOCKS5 negotiation offering {} methods", methods.len());
        self.state = Socks5State::MethodsSent;
        Ok(())
    }

    /// Queue username/password credentials (RFC 1929).
    ///
    /// Valid only after the server has selected
    /// [`Socks5AuthMethod::USERNAME_PASSWORD`].  Both fields must be
    /// between 1 and 255 bytes.
    pub fn authenticate_username_password(
        &mut self,
        username: &[u8],
        password: &[u8],
    ) -> Result<()> {
        match self.state {
            Socks5State::MethodAccepted => (),
            Socks5State::Succeeded | Socks5State::Failed => return Err(Error::AlreadyFinished),
            _ => return Err(Error::BadState),
        }
        if self.selected_method != Some(Socks5AuthMethod::USERNAME_PASSWORD) {
            return Err(Error::BadState);
        }
        if username.is_empty() || username.len() > 255 {
            return Err(Error::Invalid("username must be between 1 and 255 bytes"));
        }
        if password.is_empty() || password.len() > 255 {
            return Err(Error::Invalid("password must be between 1 and 255 bytes"));
        }

        let w = &mut self.send;
        w.write_u8(1); // the sub-negotiation has its own version
        w.write_u8(username.len() as u8);
        w.write_all(username);
        w.write_u8(password.len() as u8);
        w.write_all(password);

        self.state = Socks5State::AuthSent;
        Ok(())
    }

    /// Queue a request to perform `cmd` on `addr`:`port` through the
    /// proxy.
    ///
    /// Valid once negotiation (and authentication, if the server asked
    /// for it) is complete.  `addr` may be a literal IPv4 or IPv6
    /// address or a hostname of at most 255 bytes; hostnames are passed
    /// to the proxy for resolution.
    pub fn request(&mut self, cmd: SocksCmd, addr: &str, port: u16) -> Result<()> {
        match (self.state, self.selected_method) {
            (Socks5State::MethodAccepted, Some(Socks5AuthMethod::NO_AUTH_REQUIRED)) => (),
            (Socks5State::AuthAccepted, _) => (),
            (Socks5State::Succeeded, _) | (Socks5State::Failed, _) => {
                return Err(Error::AlreadyFinished)
            }
            (_, _) => return Err(Error::BadState),
        }
        if !cmd.supported() {
            return Err(Error::NoSupport("command"));
        }
        let target: SocksAddr = addr.parse()?;

        let w = &mut self.send;
        w.write_u8(5); // version
        w.write_u8(cmd.into());
        w.write_u8(0); // reserved
        w.write(&target);
        w.write_u16(port);

        trace!("queued SOCKS5 {} request for {}:{}", cmd, target, port);
        self.state = Socks5State::RequestSent;
        Ok(())
    }

    /// Feed bytes received from the server into the handshake.
    ///
    /// Parses at most one event per call: whichever message the current
    /// state expects.  Returns `None` when that message has not fully
    /// arrived; the partial bytes are retained and nothing is consumed
    /// or changed.  Bytes beyond one message, or bytes arriving when no
    /// message is expected, are likewise retained; see
    /// [`take_unparsed_data`](Socks5Connection::take_unparsed_data).
    ///
    /// A message that cannot be parsed leaves an error; the connection
    /// is of no further use afterwards.
    pub fn receive_data(&mut self, input: &[u8]) -> Result<Option<Socks5Event>> {
        self.recv.extend_from_slice(input);
        let parsed = match self.state {
            Socks5State::MethodsSent => self.parse_method_selection(),
            Socks5State::AuthSent => self.parse_auth_reply(),
            Socks5State::RequestSent => self.parse_reply(),
            // No message is expected in any other state.  Keep the
            // bytes for the caller.
            _ => return Ok(None),
        };
        let (drain, event, next) = match parsed {
            Ok(parsed) => parsed,
            Err(Error::Truncated) => return Ok(None),
            Err(e) => return Err(e),
        };
        self.recv.advance(drain);
        if let Socks5Event::AuthMethodsReply(method) = &event {
            if *method != Socks5AuthMethod::NO_ACCEPTABLE {
                self.selected_method = Some(*method);
            }
        }
        trace!("SOCKS5 state {:?} -> {:?}", self.state, next);
        self.state = next;
        Ok(Some(event))
    }

    /// Try to parse the two-byte method-selection reply.
    ///
    /// On success, return the bytes consumed, the event to report, and
    /// the state to move to.  Does not modify the connection.  (The
    /// same contract applies to the other parse functions below.)
    fn parse_method_selection(&self) -> Result<(usize, Socks5Event, Socks5State)> {
        let mut r = Reader::from_slice(&self.recv[..]);
        let version = r.take_u8()?;
        if version != 5 {
            return Err(Error::BadProtocol(version));
        }
        let method: Socks5AuthMethod = r.take_u8()?.into();
        let next = if method == Socks5AuthMethod::NO_ACCEPTABLE {
            debug!("SOCKS5 server accepted none of our authentication methods");
            Socks5State::Failed
        } else if method.is_recognized() {
            Socks5State::MethodAccepted
        } else {
            return Err(Error::Syntax);
        };
        Ok((r.consumed(), Socks5Event::AuthMethodsReply(method), next))
    }

    /// Try to parse the two-byte username/password verdict.
    fn parse_auth_reply(&self) -> Result<(usize, Socks5Event, Socks5State)> {
        let mut r = Reader::from_slice(&self.recv[..]);
        let version = r.take_u8()?;
        if version != 1 {
            // The sub-negotiation's own version, not the SOCKS version.
            return Err(Error::BadProtocol(version));
        }
        // Any nonzero status is a refusal.
        let success = r.take_u8()? == 0;
        let next = if success {
            Socks5State::AuthAccepted
        } else {
            debug!("SOCKS5 server rejected our credentials");
            Socks5State::Failed
        };
        Ok((
            r.consumed(),
            Socks5Event::UsernamePasswordReply { success },
            next,
        ))
    }

    /// Try to parse the variable-length reply to our request.
    fn parse_reply(&self) -> Result<(usize, Socks5Event, Socks5State)> {
        let mut r = Reader::from_slice(&self.recv[..]);
        let version = r.take_u8()?;
        if version != 5 {
            return Err(Error::BadProtocol(version));
        }
        let status: Socks5Status = r.take_u8()?.into();
        if !status.is_recognized() {
            return Err(Error::Syntax);
        }
        if r.take_u8()? != 0 {
            // The reserved byte must be zero.
            return Err(Error::Syntax);
        }
        let addr: SocksAddr = r.extract()?;
        let port = r.take_u16()?;
        let next = if status.success() {
            Socks5State::Succeeded
        } else {
            debug!("SOCKS5 server refused our request: {}", status);
            Socks5State::Failed
        };
        Ok((
            r.consumed(),
            Socks5Event::Reply(Socks5Reply { status, addr, port }),
            next,
        ))
    }

    /// Return the bytes that should now be sent to the server, removing
    /// them from the connection.
    ///
    /// The caller is responsible for getting every byte onto the
    /// transport, in order.
    pub fn data_to_send(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.send)
    }

    /// Hand back any received bytes that the handshake did not consume.
    ///
    /// Once the handshake has succeeded, any bytes the server sent
    /// after its reply already belong to the tunneled connection; use
    /// this to retrieve them before taking over the transport.
    pub fn take_unparsed_data(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.recv).to_vec()
    }

    /// Return the current progress of this handshake.
    pub fn state(&self) -> Socks5State {
        self.state
    }

    /// Return the authentication method the server selected, if
    /// negotiation has gotten that far.
    pub fn selected_auth_method(&self) -> Option<Socks5AuthMethod> {
        self.selected_method
    }
}

impl Default for Socks5Connection {
    fn default() -> Self {
        Self::new()
    }
}
