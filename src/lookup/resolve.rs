use std::net::{IpAddr, Ipv4Addr, ToSocketAddrs};
use tracing::debug;

use crate::error::{TraceError, TraceResult};
use crate::state::Target;

/// Resolve a destination given as a name or an IPv4 literal.
///
/// The original string is kept as the display name. Only IPv4 addresses
/// are usable; a name that resolves to IPv6 alone is an error.
pub fn resolve_destination(destination: &str) -> TraceResult<Target> {
    let resolved = resolve_ipv4(destination).map_err(|reason| TraceError::Resolve {
        destination: destination.to_string(),
        reason,
    })?;
    debug!(destination, %resolved, "resolved destination");
    Ok(Target::new(destination.to_string(), resolved))
}

fn resolve_ipv4(destination: &str) -> Result<Ipv4Addr, String> {
    // Try parsing as IP address first
    match destination.parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => return Ok(ip),
        Ok(IpAddr::V6(_)) => return Err("IPv6 destinations are not supported".into()),
        Err(_) => {}
    }

    let addrs = format!("{}:0", destination)
        .to_socket_addrs()
        .map_err(|e| e.to_string())?;

    addrs
        .filter_map(|s| match s.ip() {
            IpAddr::V4(ip) => Some(ip),
            IpAddr::V6(_) => None,
        })
        .next()
        .ok_or_else(|| "no IPv4 addresses found".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_ipv4() {
        let target = resolve_destination("192.0.2.33").unwrap();
        assert_eq!(target.original, "192.0.2.33");
        assert_eq!(target.resolved, Ipv4Addr::new(192, 0, 2, 33));
    }

    #[test]
    fn test_localhost_name() {
        let target = resolve_destination("localhost").unwrap();
        assert_eq!(target.original, "localhost");
        assert!(target.resolved.is_loopback());
    }

    #[test]
    fn test_ipv6_literal_rejected() {
        let err = resolve_destination("::1").unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_unresolvable_name() {
        // .invalid is reserved and never resolves (RFC 2606)
        let err = resolve_destination("no-such-host.invalid").unwrap_err();
        assert!(matches!(err, TraceError::Resolve { .. }));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(resolve_destination("not a host name").is_err());
    }
}
