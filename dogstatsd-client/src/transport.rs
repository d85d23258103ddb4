//! Transport strategy and address resolution.
//!
//! The batching sender writes through a [`Transport`], a strategy object injected at construction
//! time. Production clients use [`UdpTransport`]; tests inject their own implementation to observe
//! or stall transmissions without touching the network.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs as _, UdpSocket};

/// A capability yielding the current destination address.
///
/// [`UdpTransport`] invokes this on every send, so an implementation that re-resolves a hostname
/// picks up DNS changes without the client being restarted. Closures returning
/// `io::Result<SocketAddr>` implement this trait directly.
pub trait AddressResolver: Send + 'static {
    /// Resolves the current destination address.
    ///
    /// # Errors
    ///
    /// Returns an error when no address can currently be resolved.
    fn resolve(&self) -> io::Result<SocketAddr>;
}

impl<F> AddressResolver for F
where
    F: Fn() -> io::Result<SocketAddr> + Send + 'static,
{
    fn resolve(&self) -> io::Result<SocketAddr> {
        self()
    }
}

/// Resolves a host/port pair through the system resolver on every call.
pub struct DnsResolver {
    host: String,
    port: u16,
}

impl DnsResolver {
    /// Creates a resolver for the given host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }
}

impl AddressResolver for DnsResolver {
    fn resolve(&self) -> io::Result<SocketAddr> {
        let mut addrs = (self.host.as_str(), self.port).to_socket_addrs()?;
        addrs.next().ok_or_else(|| {
            io::Error::new(io::ErrorKind::AddrNotAvailable, "host resolved to no addresses")
        })
    }
}

/// Where batched payloads go.
///
/// Exactly one instance exists per client and it is owned by the background sender thread, so
/// implementations need `Send` but never any internal synchronization. Sends are fire-and-forget:
/// a returned error is reported and the payload dropped, never retried.
pub trait Transport: Send + 'static {
    /// Transmits one payload, returning the number of bytes sent.
    ///
    /// # Errors
    ///
    /// Returns an error when the payload could not be handed to the underlying medium.
    fn send(&mut self, payload: &[u8]) -> io::Result<usize>;
}

/// The default transport: connectionless UDP datagrams.
pub struct UdpTransport {
    socket: UdpSocket,
    resolver: Box<dyn AddressResolver>,
}

impl UdpTransport {
    /// Binds a local socket and wraps it around the given resolver.
    ///
    /// # Errors
    ///
    /// Returns an error when the local socket cannot be bound.
    pub fn new(resolver: Box<dyn AddressResolver>) -> io::Result<Self> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        Ok(Self { socket, resolver })
    }
}

impl Transport for UdpTransport {
    // The destination is re-resolved on every send so daemon address changes take effect
    // mid-flight.
    fn send(&mut self, payload: &[u8]) -> io::Result<usize> {
        let addr = self.resolver.resolve()?;
        self.socket.send_to(payload, addr)
    }
}
