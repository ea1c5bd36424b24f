//! Error types for trace sessions.

use std::io;
use std::net::SocketAddr;
use thiserror::Error;

/// Main error type for trace operations.
#[derive(Error, Debug)]
pub enum TraceError {
    // Startup errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{destination} is an invalid destination name: {reason}")]
    Resolve { destination: String, reason: String },

    // Socket errors
    #[error("Failed to create {kind} socket: {source}")]
    SocketCreation {
        kind: &'static str,
        #[source]
        source: io::Error,
    },

    #[error(
        "Insufficient permissions for raw ICMP sockets.\n\n\
         Fix options:\n\
         \u{2022} Run with sudo: sudo hoptrace <destination>\n\
         \u{2022} Add capability: sudo setcap cap_net_raw+ep <path to hoptrace>"
    )]
    PermissionDenied(#[source] io::Error),

    #[error("Failed to bind receive socket to {addr}: {source}")]
    SocketBind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    // Probe errors
    #[error("Failed to set TTL {ttl}: {source}")]
    SetTtl {
        ttl: u8,
        #[source]
        source: io::Error,
    },

    #[error("Send failed: {0}")]
    Send(#[source] io::Error),

    #[error("Receive failed: {0}")]
    Receive(#[source] io::Error),

    // Packet errors
    #[error("Packet too short: expected at least {expected} bytes, got {actual}")]
    PacketTooShort { expected: usize, actual: usize },
}

impl TraceError {
    /// Process exit status for errors that end the program before a trace
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidArgument(_) => 2,
            Self::Resolve { .. } => 3,
            _ => 1,
        }
    }

    /// True if `err` is the receive-timeout condition of a blocking socket
    pub fn is_timeout(err: &io::Error) -> bool {
        matches!(
            err.kind(),
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
        )
    }
}

/// Result type alias for trace operations.
pub type TraceResult<T> = Result<T, TraceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(TraceError::InvalidArgument("-m".into()).exit_code(), 2);
        assert_eq!(
            TraceError::Resolve {
                destination: "nowhere.invalid".into(),
                reason: "no addresses".into()
            }
            .exit_code(),
            3
        );
        assert_eq!(
            TraceError::Send(io::Error::from(io::ErrorKind::PermissionDenied)).exit_code(),
            1
        );
    }

    #[test]
    fn test_timeout_kinds() {
        assert!(TraceError::is_timeout(&io::Error::from(
            io::ErrorKind::WouldBlock
        )));
        assert!(TraceError::is_timeout(&io::Error::from(
            io::ErrorKind::TimedOut
        )));
        assert!(!TraceError::is_timeout(&io::Error::from(
            io::ErrorKind::ConnectionRefused
        )));
    }

    #[test]
    fn test_resolve_message() {
        let err = TraceError::Resolve {
            destination: "nowhere.invalid".into(),
            reason: "no addresses".into(),
        };
        assert!(
            err.to_string()
                .starts_with("nowhere.invalid is an invalid destination name")
        );
    }
}
