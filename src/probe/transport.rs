use std::net::{Ipv4Addr, SocketAddrV4};
use tracing::{debug, warn};

use crate::error::TraceError;
use crate::probe::clock::{Clock, elapsed_ms};
use crate::probe::header::{ICMP_HEADER_SIZE, ICMP_TIME_EXCEEDED, IPV4_HEADER_SIZE, decode_response};
use crate::probe::socket::ProbeSockets;

/// Receive buffer size for one ICMP response
pub const RECV_BUFFER_SIZE: usize = 512;

/// Probes carry no payload; the TTL is the only thing being tested
const PROBE_PAYLOAD: &[u8] = &[];

/// Result of one probe
#[derive(Debug)]
pub enum ProbeOutcome {
    /// An intermediate router answered with Time Exceeded
    Forwarded { responder: Ipv4Addr, elapsed_ms: u64 },
    /// Anything else answered; treated as the destination
    Reached { responder: Ipv4Addr, elapsed_ms: u64 },
    /// Nothing arrived before the receive timeout
    Filtered,
    /// Socket failure; ends the session
    NetworkError(TraceError),
}

/// Which side of the trace an ICMP reply puts us on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyClass {
    Forwarded,
    Reached,
}

/// Decide whether an ICMP type means "keep going" or "destination".
///
/// Every type other than Time Exceeded counts as the destination,
/// including Port Unreachable from the target and any unrelated ICMP the
/// raw socket happens to see.
pub fn classify_icmp_type(icmp_type: u8) -> ReplyClass {
    if icmp_type == ICMP_TIME_EXCEEDED {
        ReplyClass::Forwarded
    } else {
        ReplyClass::Reached
    }
}

/// Performs one send+receive cycle per TTL
pub trait Transport {
    fn probe(&mut self, ttl: u8, destination: Ipv4Addr, port: u16) -> ProbeOutcome;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn probe(&mut self, ttl: u8, destination: Ipv4Addr, port: u16) -> ProbeOutcome {
        (**self).probe(ttl, destination, port)
    }
}

/// UDP-out, ICMP-in prober over a socket pair and a clock
pub struct Prober<S, C> {
    sockets: S,
    clock: C,
}

impl<S: ProbeSockets, C: Clock> Prober<S, C> {
    pub fn new(sockets: S, clock: C) -> Self {
        Self { sockets, clock }
    }
}

#[cfg(test)]
impl<S, C> Prober<S, C> {
    fn into_sockets(self) -> S {
        self.sockets
    }
}

impl<S: ProbeSockets, C: Clock> Transport for Prober<S, C> {
    fn probe(&mut self, ttl: u8, destination: Ipv4Addr, port: u16) -> ProbeOutcome {
        if let Err(source) = self.sockets.set_ttl(ttl) {
            return ProbeOutcome::NetworkError(TraceError::SetTtl { ttl, source });
        }

        let started = self.clock.now();

        if let Err(e) = self
            .sockets
            .send_to(PROBE_PAYLOAD, SocketAddrV4::new(destination, port))
        {
            return ProbeOutcome::NetworkError(TraceError::Send(e));
        }

        let mut buffer = [0u8; RECV_BUFFER_SIZE];
        let len = match self.sockets.recv(&mut buffer) {
            Ok(len) => len,
            Err(e) if TraceError::is_timeout(&e) => {
                debug!(ttl, "no response before timeout");
                return ProbeOutcome::Filtered;
            }
            Err(e) => return ProbeOutcome::NetworkError(TraceError::Receive(e)),
        };

        let finished = self.clock.now();
        let elapsed_ms = elapsed_ms(started, finished);

        // Anything shorter would be classified from the zeroed buffer
        let required = IPV4_HEADER_SIZE + ICMP_HEADER_SIZE;
        if len < required {
            warn!(ttl, len, "short ICMP datagram");
            return ProbeOutcome::NetworkError(TraceError::PacketTooShort {
                expected: required,
                actual: len,
            });
        }

        let (ip, icmp) = match decode_response(&buffer) {
            Ok(headers) => headers,
            Err(e) => return ProbeOutcome::NetworkError(e),
        };

        debug!(
            ttl,
            responder = %ip.source,
            icmp_type = icmp.icmp_type,
            icmp_code = icmp.code,
            elapsed_ms,
            "probe answered"
        );

        match classify_icmp_type(icmp.icmp_type) {
            ReplyClass::Forwarded => ProbeOutcome::Forwarded {
                responder: ip.source,
                elapsed_ms,
            },
            ReplyClass::Reached => ProbeOutcome::Reached {
                responder: ip.source,
                elapsed_ms,
            },
        }
    }
}
