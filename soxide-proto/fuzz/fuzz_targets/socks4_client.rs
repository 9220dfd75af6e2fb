#![no_main]
use libfuzzer_sys::fuzz_target;

use soxide_proto::{Socks4Connection, SocksCmd};

fuzz_target!(|data: Vec<Vec<u8>>| {
    let mut conn = Socks4Connection::new_socks4a(&b"fuzz"[..]);
    let _ = conn.request(SocksCmd::CONNECT, "fuzz.invalid", 80);
    let _ = conn.data_to_send();
    for d in data {
        let _ = conn.receive_data(&d);
    }
});
