//! Golden byte vectors for SOCKS4 and SOCKS4a client handshakes.
//!
//! Each test scripts a whole handshake against literal wire bytes, so
//! that any change to the encoder or parser that alters the wire format
//! shows up here.

use hex_literal::hex;

use soxide_proto::{Socks4Connection, Socks4State, Socks4Status, SocksCmd};

#[test]
fn socks4_connect_success() {
    let mut conn = Socks4Connection::new(&b"alice"[..]);
    conn.request(SocksCmd::CONNECT, "216.58.204.78", 80).unwrap();

    // VN=4, CD=1, port 80, 216.58.204.78, "alice", NUL.
    assert_eq!(
        conn.data_to_send(),
        hex!("04 01 0050 d83acc4e 616c696365 00")
    );

    // VN=0, CD=0x5A (granted), port 80, 216.58.204.78.
    let reply = conn
        .receive_data(&hex!("00 5a 0050 d83acc4e"))
        .unwrap()
        .unwrap();
    assert_eq!(reply.status, Socks4Status::REQUEST_GRANTED);
    assert_eq!(reply.port, 80);
    assert_eq!(reply.addr.octets(), [216, 58, 204, 78]);
    assert_eq!(conn.state(), Socks4State::Succeeded);
}

#[test]
fn socks4a_connect_rejected() {
    let mut conn = Socks4Connection::new_socks4a(&b""[..]);
    conn.request(SocksCmd::CONNECT, "example.com", 80).unwrap();

    // The sentinel address 0.0.0.1 flags the hostname after the empty
    // user id.
    assert_eq!(
        conn.data_to_send(),
        hex!("04 01 0050 00000001 00 6578616d706c652e636f6d 00")
    );

    let reply = conn
        .receive_data(&hex!("00 5b 0000 00000000"))
        .unwrap()
        .unwrap();
    assert_eq!(reply.status, Socks4Status::REQUEST_REJECTED_OR_FAILED);
    assert_eq!(conn.state(), Socks4State::Failed);
}

#[test]
fn socks4_all_rejection_codes() {
    for (byte, code) in [
        (0x5b_u8, Socks4Status::REQUEST_REJECTED_OR_FAILED),
        (0x5c, Socks4Status::REQUEST_REJECTED_NO_IDENTD),
        (0x5d, Socks4Status::REQUEST_REJECTED_IDENTD_MISMATCH),
    ] {
        let mut conn = Socks4Connection::new(&b"id"[..]);
        conn.request(SocksCmd::CONNECT, "198.51.100.1", 1080).unwrap();
        conn.data_to_send();
        let mut wire = vec![0x00, byte];
        wire.extend_from_slice(&hex!("0438 c6336401"));
        let reply = conn.receive_data(&wire).unwrap().unwrap();
        assert_eq!(reply.status, code);
        assert_eq!(reply.port, 1080);
        assert_eq!(conn.state(), Socks4State::Failed);
    }
}

#[test]
fn fragmentation_does_not_matter() {
    let wire = hex!("00 5a 0050 d83acc4e");
    // Whatever way the reply is chopped up, exactly one event comes
    // out, and only once the final chunk is in.
    for split in 1..wire.len() {
        let mut conn = Socks4Connection::new(&b"alice"[..]);
        conn.request(SocksCmd::CONNECT, "216.58.204.78", 80).unwrap();
        conn.data_to_send();

        assert_eq!(conn.receive_data(&wire[..split]).unwrap(), None);
        assert_eq!(conn.state(), Socks4State::AwaitingReply);
        let reply = conn.receive_data(&wire[split..]).unwrap().unwrap();
        assert_eq!(reply.status, Socks4Status::REQUEST_GRANTED);
        assert_eq!(conn.state(), Socks4State::Succeeded);
    }
}
