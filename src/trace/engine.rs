use std::io::Write;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::export::{write_banner, write_footer, write_hop};
use crate::probe::{ProbeOutcome, Transport};
use crate::state::{HopKind, HopRecord, Session, Target, TraceStatus};

/// What the engine does after a probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Probe the next TTL
    Continue(u8),
    /// Stop with this status
    Finish(TraceStatus),
}

/// Transition after a probe that produced a hop line
pub fn next_step(ttl: u8, max_hops: u8, kind: HopKind) -> Step {
    match kind {
        HopKind::Destination => Step::Finish(TraceStatus::Reached { hop: ttl }),
        HopKind::Router | HopKind::Filtered if ttl >= max_hops => {
            Step::Finish(TraceStatus::HopLimitExhausted { hops: ttl })
        }
        HopKind::Router | HopKind::Filtered => Step::Continue(ttl + 1),
    }
}

/// Drives the TTL loop for one destination.
///
/// The engine owns the transport for the whole trace; the sockets behind
/// it are closed when `run` returns, whichever way the trace ended.
pub struct TraceEngine<T> {
    transport: T,
    session: Session,
}

impl<T: Transport> TraceEngine<T> {
    pub fn new(transport: T, target: Target, config: Config) -> Self {
        Self {
            transport,
            session: Session::new(target, config),
        }
    }

    /// Probe TTL 1, 2, ... until the destination answers, a probe fails,
    /// or the hop ceiling is reached. Hop lines go to `out` as they happen.
    pub fn run<W: Write>(mut self, out: &mut W) -> std::io::Result<Session> {
        let destination = self.session.target.resolved;
        let port = self.session.config.port;
        let max_hops = self.session.config.max_hops;

        write_banner(out, &self.session.target, max_hops)?;
        info!(%destination, port, max_hops, "starting trace");

        let mut ttl: u8 = 1;
        let status = loop {
            let hop = match self.transport.probe(ttl, destination, port) {
                ProbeOutcome::Forwarded {
                    responder,
                    elapsed_ms,
                } => HopRecord::responded(ttl, HopKind::Router, responder, elapsed_ms),
                ProbeOutcome::Reached {
                    responder,
                    elapsed_ms,
                } => HopRecord::responded(ttl, HopKind::Destination, responder, elapsed_ms),
                ProbeOutcome::Filtered => HopRecord::filtered(ttl),
                ProbeOutcome::NetworkError(e) => {
                    warn!(ttl, error = %e, "probe failed, aborting trace");
                    break TraceStatus::Aborted {
                        hop: ttl,
                        reason: e.to_string(),
                    };
                }
            };

            write_hop(out, &hop)?;
            let kind = hop.kind;
            self.session.record_hop(hop);

            match next_step(ttl, max_hops, kind) {
                Step::Continue(next) => ttl = next,
                Step::Finish(status) => break status,
            }
        };

        debug!(?status, "trace finished");
        write_footer(out, &self.session.target, &status)?;
        self.session.finish(status);
        Ok(self.session)
    }
}
