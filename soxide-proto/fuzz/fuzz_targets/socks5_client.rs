#![no_main]
use libfuzzer_sys::fuzz_target;

use soxide_proto::{Socks5AuthMethod, Socks5Connection, Socks5State, SocksCmd};

fuzz_target!(|data: Vec<Vec<u8>>| {
    let mut conn = Socks5Connection::new();
    let _ = conn.negotiate_auth_methods(&[
        Socks5AuthMethod::NO_AUTH_REQUIRED,
        Socks5AuthMethod::USERNAME_PASSWORD,
    ]);
    let _ = conn.data_to_send();
    for d in data {
        let _ = conn.receive_data(&d);
        // Keep the handshake moving so that every parser gets a chance
        // to see fuzzed input.
        match conn.state() {
            Socks5State::MethodAccepted => {
                let _ = conn.authenticate_username_password(b"u", b"p");
                let _ = conn.request(SocksCmd::CONNECT, "fuzz.invalid", 80);
            }
            Socks5State::AuthAccepted => {
                let _ = conn.request(SocksCmd::CONNECT, "198.51.100.77", 443);
            }
            _ => {}
        }
        let _ = conn.data_to_send();
    }
});
