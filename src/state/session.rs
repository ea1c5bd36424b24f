use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

use crate::config::Config;

/// What a single probe turned up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HopKind {
    /// Router answered with Time Exceeded
    Router,
    /// Destination-class reply
    Destination,
    /// No answer before the timeout
    Filtered,
}

/// One line of trace output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HopRecord {
    pub ttl: u8,
    pub kind: HopKind,
    pub responder: Option<Ipv4Addr>,
    pub elapsed_ms: Option<u64>,
}

impl HopRecord {
    pub fn responded(ttl: u8, kind: HopKind, responder: Ipv4Addr, elapsed_ms: u64) -> Self {
        Self {
            ttl,
            kind,
            responder: Some(responder),
            elapsed_ms: Some(elapsed_ms),
        }
    }

    pub fn filtered(ttl: u8) -> Self {
        Self {
            ttl,
            kind: HopKind::Filtered,
            responder: None,
            elapsed_ms: None,
        }
    }
}

/// Where a trace ended up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TraceStatus {
    Running,
    Reached { hop: u8 },
    Aborted { hop: u8, reason: String },
    HopLimitExhausted { hops: u8 },
}

/// Destination as given by the user and as resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub original: String,
    pub resolved: Ipv4Addr,
}

impl Target {
    pub fn new(original: String, resolved: Ipv4Addr) -> Self {
        Self { original, resolved }
    }
}

/// Record of one trace, filled in hop by hop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub target: Target,
    pub started_at: DateTime<Utc>,
    pub config: Config,
    pub hops: Vec<HopRecord>,
    pub status: TraceStatus,
}

impl Session {
    pub fn new(target: Target, config: Config) -> Self {
        let capacity = config.max_hops as usize;
        Self {
            target,
            started_at: Utc::now(),
            config,
            hops: Vec::with_capacity(capacity),
            status: TraceStatus::Running,
        }
    }

    pub fn record_hop(&mut self, hop: HopRecord) {
        self.hops.push(hop);
    }

    pub fn finish(&mut self, status: TraceStatus) {
        self.status = status;
    }
}
