use clap::Parser;

use crate::config::{DEFAULT_MAX_HOPS, DEFAULT_PORT};

/// Traceroute that sends one UDP probe per TTL and listens for ICMP replies
#[derive(Parser, Debug, Clone)]
#[command(name = "hoptrace")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Destination host (name or IPv4 address)
    #[arg(required = true)]
    pub destination: String,

    /// Maximum number of hops
    #[arg(short = 'm', long = "max-hops", default_value_t = DEFAULT_MAX_HOPS)]
    pub max_hops: u8,

    /// UDP destination port for probes
    #[arg(short = 'p', long = "port", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Print the finished trace as JSON instead of hop lines
    #[arg(long = "json")]
    pub json: bool,

    /// Enable debug logging on stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Args {
    /// Validate arguments
    pub fn validate(&self) -> Result<(), String> {
        if self.destination.trim().is_empty() {
            return Err("Destination cannot be empty".into());
        }

        if self.max_hops == 0 {
            return Err("Max hops must be at least 1".into());
        }

        if self.port == 0 {
            return Err("Port must be non-zero".into());
        }

        Ok(())
    }
}
