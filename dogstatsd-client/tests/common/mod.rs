use std::net::UdpSocket;
use std::time::{Duration, Instant};

/// A local UDP socket standing in for the aggregation daemon.
pub struct DummyStatsDServer {
    socket: UdpSocket,
}

impl DummyStatsDServer {
    pub fn new() -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").expect("failed to bind server socket");
        socket
            .set_read_timeout(Some(Duration::from_millis(100)))
            .expect("failed to set read timeout");
        Self { socket }
    }

    pub fn port(&self) -> u16 {
        self.socket.local_addr().expect("failed to get local addr").port()
    }

    /// Receives datagrams until `expected` newline-delimited messages have arrived.
    pub fn wait_for_messages(&self, expected: usize) -> Vec<String> {
        let mut messages = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut buf = [0u8; 8192];

        while messages.len() < expected {
            assert!(
                Instant::now() < deadline,
                "timed out waiting for {expected} messages, got {messages:?}"
            );
            if let Ok((len, _)) = self.socket.recv_from(&mut buf) {
                let datagram = std::str::from_utf8(&buf[..len]).expect("non-utf8 datagram");
                messages.extend(datagram.lines().map(ToString::to_string));
            }
        }

        messages
    }

    /// Asserts that nothing further arrives within the read timeout.
    #[allow(dead_code)]
    pub fn assert_no_more_messages(&self) {
        let mut buf = [0u8; 8192];
        if let Ok((len, _)) = self.socket.recv_from(&mut buf) {
            panic!("unexpected message: {:?}", String::from_utf8_lossy(&buf[..len]));
        }
    }
}
