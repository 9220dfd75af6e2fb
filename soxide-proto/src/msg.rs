//! Structures that represent SOCKS messages.

use crate::{Error, Result};

use caret::caret_int;
use soxide_bytes::{Error as BytesError, Readable, Reader, Writeable, Writer};
use soxide_bytes::Result as BytesResult;
use std::convert::TryFrom;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

caret_int! {
    /// A command the client can ask the proxy to perform.
    pub struct SocksCmd(u8) {
        /// Connect to a remote TCP address:port.
        CONNECT = 1,
        /// Listen for an inbound TCP connection on the proxy.
        BIND = 2,
        /// Relay UDP datagrams through the proxy.  Defined by RFC 1928,
        /// but not implemented here.
        UDP_ASSOCIATE = 3,
    }
}

impl SocksCmd {
    /// Return true if this is a command we are willing to send.
    pub(crate) fn supported(self) -> bool {
        matches!(self, SocksCmd::CONNECT | SocksCmd::BIND)
    }
}

caret_int! {
    /// Reply code in the 8-byte response to a SOCKS4 request.
    ///
    /// SOCKS4 can only distinguish success from a few causes of
    /// rejection; the identd codes concern an identity protocol that is
    /// essentially extinct.
    pub struct Socks4Status(u8) {
        /// The request was granted.
        REQUEST_GRANTED = 0x5A,
        /// The request was rejected, or the connection attempt failed.
        REQUEST_REJECTED_OR_FAILED = 0x5B,
        /// The proxy could not reach the client's identd service.
        REQUEST_REJECTED_NO_IDENTD = 0x5C,
        /// The client's identd reported a different user id.
        REQUEST_REJECTED_IDENTD_MISMATCH = 0x5D,
    }
}

impl Socks4Status {
    /// Return true if this status says the request was granted.
    pub fn success(self) -> bool {
        self == Socks4Status::REQUEST_GRANTED
    }
}

caret_int! {
    /// An authentication method, as used in SOCKS5 negotiation
    /// (RFC 1928 section 3).
    ///
    /// Values 0x80 through 0xFE are reserved for private methods: they
    /// can be represented and sent, but have no named constant here.
    pub struct Socks5AuthMethod(u8) {
        /// No authentication required.
        NO_AUTH_REQUIRED = 0x00,
        /// GSS-API authentication (RFC 1961).  Recognized on the wire,
        /// but this crate implements no sub-negotiation for it.
        GSSAPI = 0x01,
        /// Username/password authentication (RFC 1929).
        USERNAME_PASSWORD = 0x02,
        /// The server found none of the offered methods acceptable.
        NO_ACCEPTABLE = 0xFF,
    }
}

caret_int! {
    /// Status code in a SOCKS5 reply (RFC 1928 section 6).
    ///
    /// The documentation for these values is limited to what the RFC
    /// itself says.
    pub struct Socks5Status(u8) {
        /// RFC 1928: "succeeded"
        SUCCEEDED = 0x00,
        /// RFC 1928: "general SOCKS server failure"
        GENERAL_FAILURE = 0x01,
        /// RFC 1928: "connection not allowed by ruleset"
        NOT_ALLOWED = 0x02,
        /// RFC 1928: "Network unreachable"
        NETWORK_UNREACHABLE = 0x03,
        /// RFC 1928: "Host unreachable"
        HOST_UNREACHABLE = 0x04,
        /// RFC 1928: "Connection refused"
        CONNECTION_REFUSED = 0x05,
        /// RFC 1928: "TTL expired"
        TTL_EXPIRED = 0x06,
        /// RFC 1928: "Command not supported"
        COMMAND_NOT_SUPPORTED = 0x07,
        /// RFC 1928: "Address type not supported"
        ADDRTYPE_NOT_SUPPORTED = 0x08,
    }
}

impl Socks5Status {
    /// Return true if this status says the request succeeded.
    pub fn success(self) -> bool {
        self == Socks5Status::SUCCEEDED
    }
}

caret_int! {
    /// The address-type byte used in SOCKS5 requests and replies
    /// (RFC 1928 section 4).
    pub struct Socks5Atype(u8) {
        /// A 4-byte IPv4 address.
        IPV4 = 0x01,
        /// One length byte, then that many bytes of hostname.
        DOMAIN_NAME = 0x03,
        /// A 16-byte IPv6 address.
        IPV6 = 0x04,
    }
}

/// An address to hand a SOCKS proxy as a connection target, or to
/// receive from one in a reply.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::exhaustive_enums)]
pub enum SocksAddr {
    /// An IP address, for the proxy to connect to directly.
    Ip(IpAddr),
    /// A hostname, for the proxy to resolve on our behalf.
    Hostname(SocksHostname),
}

/// A hostname for use with SOCKS.  It is limited in length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SocksHostname(String);

impl SocksAddr {
    /// Return the SOCKS5 address type that encodes this address.
    pub fn atype(&self) -> Socks5Atype {
        match self {
            SocksAddr::Ip(IpAddr::V4(_)) => Socks5Atype::IPV4,
            SocksAddr::Ip(IpAddr::V6(_)) => Socks5Atype::IPV6,
            SocksAddr::Hostname(_) => Socks5Atype::DOMAIN_NAME,
        }
    }
}

impl FromStr for SocksAddr {
    type Err = Error;

    /// Classify a target string: anything that parses as a numeric
    /// IPv4 or IPv6 address becomes [`SocksAddr::Ip`], and everything
    /// else is treated as a hostname.
    fn from_str(s: &str) -> Result<SocksAddr> {
        if let Ok(ip) = s.parse::<IpAddr>() {
            Ok(SocksAddr::Ip(ip))
        } else {
            Ok(SocksAddr::Hostname(SocksHostname::try_from(s.to_owned())?))
        }
    }
}

impl TryFrom<String> for SocksHostname {
    type Error = Error;
    fn try_from(s: String) -> Result<SocksHostname> {
        if s.is_empty() {
            Err(Error::Invalid("hostname may not be empty"))
        } else if s.len() > 255 {
            Err(Error::Invalid("hostname too long for SOCKS"))
        } else {
            Ok(SocksHostname(s))
        }
    }
}

impl AsRef<str> for SocksHostname {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}

impl From<SocksHostname> for String {
    fn from(s: SocksHostname) -> String {
        s.0
    }
}

impl fmt::Display for SocksAddr {
    /// Format the hostname or IP address this SocksAddr holds.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocksAddr::Ip(a) => write!(f, "{}", a),
            SocksAddr::Hostname(h) => write!(f, "{}", h.0),
        }
    }
}

impl Readable for SocksAddr {
    fn take_from(r: &mut Reader<'_>) -> BytesResult<SocksAddr> {
        let atype: Socks5Atype = r.take_u8()?.into();
        match atype {
            Socks5Atype::IPV4 => {
                let ip4: std::net::Ipv4Addr = r.extract()?;
                Ok(SocksAddr::Ip(ip4.into()))
            }
            Socks5Atype::DOMAIN_NAME => {
                let hlen = r.take_u8()?;
                if hlen == 0 {
                    return Err(BytesError::BadMessage("zero-length hostname"));
                }
                let hostname = r.take(hlen as usize)?;
                let hostname = std::str::from_utf8(hostname)
                    .map_err(|_| BytesError::BadMessage("bad utf8 on hostname"))?
                    .to_string();
                // A single length byte can never exceed the 255-byte
                // hostname bound, so no further check is needed.
                Ok(SocksAddr::Hostname(SocksHostname(hostname)))
            }
            Socks5Atype::IPV6 => {
                let ip6: std::net::Ipv6Addr = r.extract()?;
                Ok(SocksAddr::Ip(ip6.into()))
            }
            _ => Err(BytesError::BadMessage("unrecognized address type")),
        }
    }
}

impl Writeable for SocksAddr {
    fn write_onto<W: Writer + ?Sized>(&self, w: &mut W) {
        match self {
            SocksAddr::Ip(IpAddr::V4(ip)) => {
                w.write_u8(Socks5Atype::IPV4.into());
                w.write(ip);
            }
            SocksAddr::Ip(IpAddr::V6(ip)) => {
                w.write_u8(Socks5Atype::IPV6.into());
                w.write(ip);
            }
            SocksAddr::Hostname(h) => {
                // Construction keeps hostnames within 255 bytes, so the
                // length always fits in the prefix byte.
                w.write_u8(Socks5Atype::DOMAIN_NAME.into());
                w.write_u8(h.0.len() as u8);
                w.write_all(h.0.as_bytes());
            }
        }
    }
}

/// The parsed form of the 8-byte reply to a SOCKS4 request.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::exhaustive_structs)]
pub struct Socks4Reply {
    /// Whether the proxy granted the request.
    pub status: Socks4Status,
    /// Port number echoed back by the proxy.  Chiefly meaningful for
    /// BIND, where it names the port the proxy is listening on.
    pub port: u16,
    /// Address echoed back by the proxy; as with `port`, chiefly
    /// meaningful for BIND.
    pub addr: std::net::Ipv4Addr,
}

/// The parsed form of the reply to a SOCKS5 request.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::exhaustive_structs)]
pub struct Socks5Reply {
    /// The outcome the proxy reported for the request.
    pub status: Socks5Status,
    /// The address the proxy bound for this request (BND.ADDR).
    pub addr: SocksAddr,
    /// The port the proxy bound for this request (BND.PORT).
    pub port: u16,
}

/// An event parsed out of the bytes a SOCKS5 proxy sent us.
///
/// A refusal from the proxy is an event, not an error: the status
/// fields carry the proxy's verdict, and the caller decides what to do
/// about it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::exhaustive_enums)]
pub enum Socks5Event {
    /// The proxy answered method negotiation with the single method it
    /// selected (possibly [`Socks5AuthMethod::NO_ACCEPTABLE`]).
    AuthMethodsReply(Socks5AuthMethod),
    /// The proxy answered username/password sub-negotiation.
    UsernamePasswordReply {
        /// True if the proxy accepted the credentials.
        success: bool,
    },
    /// The proxy answered a CONNECT or BIND request.
    Reply(Socks5Reply),
}

#[cfg(test)]
mod test {
    use super::*;
    use std::convert::TryInto;

    #[test]
    fn classify() {
        let a: SocksAddr = "203.0.113.7".parse().unwrap();
        assert_eq!(a, SocksAddr::Ip("203.0.113.7".parse::<IpAddr>().unwrap()));
        assert_eq!(a.atype(), Socks5Atype::IPV4);

        let a: SocksAddr = "2001:db8::2:1".parse().unwrap();
        assert_eq!(a.atype(), Socks5Atype::IPV6);

        let a: SocksAddr = "www.example.com".parse().unwrap();
        assert_eq!(a.atype(), Socks5Atype::DOMAIN_NAME);

        // Not _quite_ numeric strings classify as hostnames.
        let a: SocksAddr = "203.0.113.256".parse().unwrap();
        assert_eq!(a.atype(), Socks5Atype::DOMAIN_NAME);
    }

    #[test]
    fn hostname_bounds() {
        let h: Result<SocksHostname> = "".to_string().try_into();
        assert!(matches!(h, Err(Error::Invalid(_))));

        let h: Result<SocksHostname> = "x".repeat(256).try_into();
        assert!(matches!(h, Err(Error::Invalid(_))));

        let h: SocksHostname = "x".repeat(255).try_into().unwrap();
        assert_eq!(h.as_ref().len(), 255);

        let too_long: Result<SocksAddr> = "y".repeat(300).parse();
        assert!(too_long.is_err());
    }

    #[test]
    fn display_addr() {
        let a = SocksAddr::Ip("192.0.2.33".parse().unwrap());
        assert_eq!(a.to_string(), "192.0.2.33");

        let a = SocksAddr::Ip("2001:db8::33".parse().unwrap());
        assert_eq!(a.to_string(), "2001:db8::33");

        let a: SocksAddr = "proxy.example.net".parse().unwrap();
        assert_eq!(a.to_string(), "proxy.example.net");
    }

    #[test]
    fn addr_wire_form() {
        let mut v = Vec::new();
        let a: SocksAddr = "127.0.0.1".parse().unwrap();
        v.write(&a);
        assert_eq!(v, [0x01, 0x7f, 0x00, 0x00, 0x01]);

        let mut v = Vec::new();
        let a: SocksAddr = "example.com".parse().unwrap();
        v.write(&a);
        assert_eq!(v, b"\x03\x0bexample.com");

        let mut v = Vec::new();
        let a: SocksAddr = "::1".parse().unwrap();
        v.write(&a);
        assert_eq!(v.len(), 17);
        assert_eq!(v[0], 0x04);
        assert_eq!(v[16], 1);
    }

    #[test]
    fn addr_parse_rejects() {
        // Unknown address type.
        let mut r = Reader::from_slice(&[0x02, 0, 0, 0, 0]);
        let e = r.extract::<SocksAddr>().unwrap_err();
        assert!(matches!(e, BytesError::BadMessage(_)));

        // Zero-length hostname.
        let mut r = Reader::from_slice(&[0x03, 0x00]);
        let e = r.extract::<SocksAddr>().unwrap_err();
        assert!(matches!(e, BytesError::BadMessage(_)));

        // Hostname cut short is just truncation.
        let mut r = Reader::from_slice(&[0x03, 0x05, b'a', b'b']);
        let e = r.extract::<SocksAddr>().unwrap_err();
        assert_eq!(e, BytesError::Truncated);
    }

    #[test]
    fn status_predicates() {
        assert!(Socks4Status::REQUEST_GRANTED.success());
        assert!(!Socks4Status::REQUEST_REJECTED_OR_FAILED.success());
        assert!(Socks5Status::SUCCEEDED.success());
        assert!(!Socks5Status::CONNECTION_REFUSED.success());
        assert!(!Socks5Status::from(0x09).is_recognized());
    }

    #[test]
    fn display_wire_constants() {
        assert_eq!(SocksCmd::CONNECT.to_string(), "CONNECT");
        assert_eq!(SocksCmd::from(0x77).to_string(), "119");
        assert_eq!(
            Socks5AuthMethod::USERNAME_PASSWORD.to_string(),
            "USERNAME_PASSWORD"
        );
    }
}
