//! Golden byte vectors for SOCKS5 client handshakes.

use hex_literal::hex;

use soxide_proto::{
    Socks5AuthMethod, Socks5Connection, Socks5Event, Socks5State, Socks5Status, SocksCmd,
};

#[test]
fn no_auth_connect_by_ip() {
    let mut conn = Socks5Connection::new();

    conn.negotiate_auth_methods(&[Socks5AuthMethod::NO_AUTH_REQUIRED])
        .unwrap();
    assert_eq!(conn.data_to_send(), hex!("05 01 00"));

    let event = conn.receive_data(&hex!("05 00")).unwrap();
    assert_eq!(
        event,
        Some(Socks5Event::AuthMethodsReply(
            Socks5AuthMethod::NO_AUTH_REQUIRED
        ))
    );

    conn.request(SocksCmd::CONNECT, "127.0.0.1", 443).unwrap();
    assert_eq!(conn.data_to_send(), hex!("05 01 00 01 7f000001 01bb"));

    let event = conn
        .receive_data(&hex!("05 00 00 01 7f000001 01bb"))
        .unwrap()
        .unwrap();
    match event {
        Socks5Event::Reply(reply) => {
            assert_eq!(reply.status, Socks5Status::SUCCEEDED);
            assert_eq!(reply.addr.to_string(), "127.0.0.1");
            assert_eq!(reply.port, 443);
        }
        other => panic!("unexpected event {:?}", other),
    }
    assert_eq!(conn.state(), Socks5State::Succeeded);
}

#[test]
fn username_password_connect_by_hostname() {
    let mut conn = Socks5Connection::new();

    conn.negotiate_auth_methods(&[Socks5AuthMethod::USERNAME_PASSWORD])
        .unwrap();
    assert_eq!(conn.data_to_send(), hex!("05 01 02"));

    conn.receive_data(&hex!("05 02")).unwrap();
    assert_eq!(
        conn.selected_auth_method(),
        Some(Socks5AuthMethod::USERNAME_PASSWORD)
    );

    conn.authenticate_username_password(b"u", b"p").unwrap();
    assert_eq!(conn.data_to_send(), hex!("01 01 75 01 70"));

    let event = conn.receive_data(&hex!("01 00")).unwrap();
    assert_eq!(
        event,
        Some(Socks5Event::UsernamePasswordReply { success: true })
    );
    assert_eq!(conn.state(), Socks5State::AuthAccepted);

    conn.request(SocksCmd::CONNECT, "example.com", 80).unwrap();
    assert_eq!(
        conn.data_to_send(),
        hex!("05 01 00 03 0b 6578616d706c652e636f6d 0050")
    );
}

#[test]
fn no_acceptable_methods() {
    let mut conn = Socks5Connection::new();
    conn.negotiate_auth_methods(&[Socks5AuthMethod::NO_AUTH_REQUIRED])
        .unwrap();
    conn.data_to_send();

    let event = conn.receive_data(&hex!("05 ff")).unwrap();
    assert_eq!(
        event,
        Some(Socks5Event::AuthMethodsReply(
            Socks5AuthMethod::NO_ACCEPTABLE
        ))
    );
    assert_eq!(conn.state(), Socks5State::Failed);
}

#[test]
fn reply_fed_one_byte_at_a_time() {
    let mut conn = Socks5Connection::new();
    conn.negotiate_auth_methods(&[Socks5AuthMethod::NO_AUTH_REQUIRED])
        .unwrap();
    conn.data_to_send();
    conn.receive_data(&hex!("05 00")).unwrap();
    conn.request(SocksCmd::CONNECT, "127.0.0.1", 443).unwrap();
    conn.data_to_send();

    let wire = hex!("05 00 00 01 7f000001 01bb");
    let mut events = 0;
    for (i, byte) in wire.iter().enumerate() {
        let event = conn.receive_data(&[*byte]).unwrap();
        if i + 1 < wire.len() {
            assert_eq!(event, None);
        } else {
            assert!(matches!(event, Some(Socks5Event::Reply(_))));
            events += 1;
        }
    }
    assert_eq!(events, 1);
    assert_eq!(conn.state(), Socks5State::Succeeded);
}

#[test]
fn every_chunking_yields_the_same_events() {
    // Split the whole server side of a handshake at every pair of
    // points and check that the event sequence never changes.
    let method = hex!("05 02");
    let auth = hex!("01 00");
    let reply = hex!("05 00 00 03 09 6c6f63616c686f7374 0438");

    let run = |splits: (usize, usize)| -> Vec<Socks5Event> {
        let mut conn = Socks5Connection::new();
        let mut events = Vec::new();
        conn.negotiate_auth_methods(&[Socks5AuthMethod::USERNAME_PASSWORD])
            .unwrap();
        conn.data_to_send();
        events.extend(conn.receive_data(&method).unwrap());
        conn.authenticate_username_password(b"user", b"hunter2")
            .unwrap();
        conn.data_to_send();
        events.extend(conn.receive_data(&auth).unwrap());
        conn.request(SocksCmd::CONNECT, "localhost", 1080).unwrap();
        conn.data_to_send();
        let (a, b) = splits;
        events.extend(conn.receive_data(&reply[..a]).unwrap());
        events.extend(conn.receive_data(&reply[a..b]).unwrap());
        events.extend(conn.receive_data(&reply[b..]).unwrap());
        assert_eq!(conn.state(), Socks5State::Succeeded);
        events
    };

    let baseline = run((0, reply.len()));
    assert_eq!(baseline.len(), 3);
    for a in 0..reply.len() {
        for b in a..reply.len() {
            assert_eq!(run((a, b)), baseline);
        }
    }
}
