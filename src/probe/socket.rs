use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::io::{self, Read};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;
use tracing::debug;

use crate::error::{TraceError, TraceResult};

/// The socket operations one probe needs.
///
/// `SocketPair` is the OS-backed implementation; tests substitute an
/// in-memory one.
pub trait ProbeSockets {
    /// Set the IP TTL used for subsequent sends
    fn set_ttl(&mut self, ttl: u8) -> io::Result<()>;

    /// Send a UDP datagram to `target`
    fn send_to(&mut self, payload: &[u8], target: SocketAddrV4) -> io::Result<usize>;

    /// Block until an ICMP datagram arrives or the receive timeout expires
    fn recv(&mut self, buffer: &mut [u8]) -> io::Result<usize>;
}

/// UDP send socket plus raw ICMP receive socket, released together on drop
#[derive(Debug)]
pub struct SocketPair {
    send: Socket,
    recv: Socket,
}

impl SocketPair {
    /// Open both sockets and bind the receiver to `0.0.0.0:port`
    pub fn open(port: u16, timeout: Duration) -> TraceResult<Self> {
        let recv = create_raw_icmp_socket(timeout)?;
        let bind_addr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port));
        recv.bind(&SockAddr::from(bind_addr))
            .map_err(|source| TraceError::SocketBind {
                addr: bind_addr,
                source,
            })?;

        let send = create_udp_send_socket()?;

        debug!(port, timeout_secs = timeout.as_secs_f64(), "opened probe sockets");
        Ok(Self { send, recv })
    }
}

impl Drop for SocketPair {
    fn drop(&mut self) {
        debug!("closing probe sockets");
    }
}

impl ProbeSockets for SocketPair {
    fn set_ttl(&mut self, ttl: u8) -> io::Result<()> {
        self.send.set_ttl(ttl as u32)
    }

    fn send_to(&mut self, payload: &[u8], target: SocketAddrV4) -> io::Result<usize> {
        self.send
            .send_to(payload, &SockAddr::from(SocketAddr::V4(target)))
    }

    fn recv(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        (&self.recv).read(buffer)
    }
}

/// Create a raw ICMPv4 socket with a blocking read timeout
pub fn create_raw_icmp_socket(timeout: Duration) -> TraceResult<Socket> {
    let socket = Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::ICMPV4)).map_err(|e| {
        if e.kind() == io::ErrorKind::PermissionDenied {
            TraceError::PermissionDenied(e)
        } else {
            TraceError::SocketCreation {
                kind: "raw ICMP",
                source: e,
            }
        }
    })?;

    socket
        .set_nonblocking(false)
        .and_then(|_| socket.set_read_timeout(Some(timeout)))
        .map_err(|source| TraceError::SocketCreation {
            kind: "raw ICMP",
            source,
        })?;

    Ok(socket)
}

/// Create a DGRAM UDP socket for sending probes
pub fn create_udp_send_socket() -> TraceResult<Socket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP)).map_err(|source| {
        TraceError::SocketCreation {
            kind: "UDP",
            source,
        }
    })?;
    socket
        .set_nonblocking(false)
        .map_err(|source| TraceError::SocketCreation {
            kind: "UDP",
            source,
        })?;
    Ok(socket)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_udp_send_socket_ttl() {
        // Unprivileged; should work anywhere sockets are available
        let socket = create_udp_send_socket().unwrap();
        socket.set_ttl(7).unwrap();
        assert_eq!(socket.ttl().unwrap(), 7);
    }

    #[test]
    fn test_raw_socket_permission_mapping() {
        // Without CAP_NET_RAW this must map to PermissionDenied, with it the
        // socket opens; anything else is unexpected.
        match create_raw_icmp_socket(Duration::from_secs(5)) {
            Ok(socket) => {
                assert_eq!(socket.read_timeout().unwrap(), Some(Duration::from_secs(5)));
            }
            Err(TraceError::PermissionDenied(_)) => {}
            Err(TraceError::SocketCreation { source, .. }) => {
                // Sandboxes may refuse raw sockets with other errnos
                assert_ne!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
}
